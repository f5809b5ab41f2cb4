//! Shared handler state.

use imgest_ingest::IngestService;
use imgest_telemetry::Metrics;

pub(crate) struct ApiState {
    pub(crate) ingest: IngestService,
    pub(crate) telemetry: Metrics,
}

impl ApiState {
    pub(crate) const fn new(ingest: IngestService, telemetry: Metrics) -> Self {
        Self { ingest, telemetry }
    }
}
