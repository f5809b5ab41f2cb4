//! Shared HTTP constants (headers, problem URIs, routes).

pub(crate) const HEADER_REQUEST_ID: &str = imgest_telemetry::REQUEST_ID_HEADER;

pub(crate) const ROUTE_UPLOAD: &str = "/upload";
pub(crate) const ROUTE_HEALTH: &str = "/health";
pub(crate) const ROUTE_METRICS: &str = "/metrics";

pub(crate) const PROBLEM_INTERNAL: &str = "https://imgest.dev/problems/internal";
pub(crate) const PROBLEM_BAD_REQUEST: &str = "https://imgest.dev/problems/bad-request";
pub(crate) const PROBLEM_PAYLOAD_TOO_LARGE: &str = "https://imgest.dev/problems/payload-too-large";
pub(crate) const PROBLEM_UPSTREAM: &str = "https://imgest.dev/problems/upstream";

pub(crate) const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";
