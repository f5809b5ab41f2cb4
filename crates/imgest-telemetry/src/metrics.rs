//! Prometheus-backed metrics registry.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes only the counters the HTTP surface and ingestion service record.

use std::fmt;
use std::sync::Arc;

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Terminal state of an ingestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestOutcome {
    /// The request produced a report.
    Success,
    /// The request was refused because of caller input or upstream refusal.
    Rejected,
    /// The request failed on a local fault.
    Failed,
}

impl IngestOutcome {
    /// Stable label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for IngestOutcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    ingest_requests_total: IntCounterVec,
    ingest_files_saved_total: IntCounterVec,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be built or
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = counter_vec(
            &registry,
            "http_requests_total",
            "Total HTTP requests received",
            &["route", "code"],
        )?;
        let ingest_requests_total = counter_vec(
            &registry,
            "ingest_requests_total",
            "Ingestion requests handled by kind and outcome",
            &["kind", "outcome"],
        )?;
        let ingest_files_saved_total = counter_vec(
            &registry,
            "ingest_files_saved_total",
            "Files written to the ingestion root by kind",
            &["kind"],
        )?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                ingest_requests_total,
                ingest_files_saved_total,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Increment the ingestion request counter.
    pub fn inc_ingest_request(&self, kind: &str, outcome: IngestOutcome) {
        self.inner
            .ingest_requests_total
            .with_label_values(&[kind, outcome.as_str()])
            .inc();
    }

    /// Add the number of files persisted for a request kind.
    pub fn add_files_saved(&self, kind: &str, count: usize) {
        self.inner
            .ingest_files_saved_total
            .with_label_values(&[kind])
            .inc_by(u64::try_from(count).unwrap_or(u64::MAX));
    }

    /// Current value of the ingestion request counter.
    #[must_use]
    pub fn ingest_requests(&self, kind: &str, outcome: IngestOutcome) -> u64 {
        self.inner
            .ingest_requests_total
            .with_label_values(&[kind, outcome.as_str()])
            .get()
    }

    /// Current value of the saved-file counter.
    #[must_use]
    pub fn files_saved(&self, kind: &str) -> u64 {
        self.inner
            .ingest_files_saved_total
            .with_label_values(&[kind])
            .get()
    }

    /// Render the metrics registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }
}

fn counter_vec(
    registry: &Registry,
    name: &'static str,
    help: &str,
    labels: &[&str],
) -> Result<IntCounterVec> {
    let counter = IntCounterVec::new(Opts::new(name, help), labels)
        .map_err(|source| TelemetryError::MetricsCollector { name, source })?;
    registry
        .register(Box::new(counter.clone()))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })?;
    Ok(counter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_updates() -> Result<()> {
        let metrics = Metrics::new()?;
        metrics.inc_http_request("/upload", 200);
        metrics.inc_ingest_request("zip", IngestOutcome::Success);
        metrics.inc_ingest_request("zip", IngestOutcome::Success);
        metrics.inc_ingest_request("drive", IngestOutcome::Rejected);
        metrics.add_files_saved("zip", 3);

        assert_eq!(metrics.ingest_requests("zip", IngestOutcome::Success), 2);
        assert_eq!(metrics.ingest_requests("drive", IngestOutcome::Rejected), 1);
        assert_eq!(metrics.ingest_requests("drive", IngestOutcome::Failed), 0);
        assert_eq!(metrics.files_saved("zip"), 3);

        let rendered = metrics.render()?;
        assert!(rendered.contains("http_requests_total"));
        assert!(rendered.contains("ingest_requests_total"));
        assert!(rendered.contains("ingest_files_saved_total"));
        Ok(())
    }

    #[test]
    fn registries_are_independent_per_instance() -> Result<()> {
        let first = Metrics::new()?;
        let second = Metrics::new()?;
        first.add_files_saved("image", 1);
        assert_eq!(second.files_saved("image"), 0);
        Ok(())
    }

    #[test]
    fn outcome_labels_are_stable() -> std::result::Result<(), serde_json::Error> {
        assert_eq!(IngestOutcome::Rejected.to_string(), "rejected");
        assert_eq!(serde_json::to_string(&IngestOutcome::Failed)?, "\"failed\"");
        Ok(())
    }
}
