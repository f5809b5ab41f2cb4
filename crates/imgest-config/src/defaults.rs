//! Environment variable names and default values.
//!
//! # Design
//! - Centralize names so the loader, docs and tests stay consistent.
//! - Defaults match a local single-node deployment.

/// Root ingestion directory.
pub const UPLOAD_DIR_VAR: &str = "IMGEST_UPLOAD_DIR";
/// Listener IP address.
pub const BIND_ADDR_VAR: &str = "IMGEST_BIND_ADDR";
/// Listener port.
pub const HTTP_PORT_VAR: &str = "IMGEST_HTTP_PORT";
/// Drive API credential.
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
/// Drive v3 API base URL.
pub const DRIVE_API_BASE_VAR: &str = "IMGEST_DRIVE_API_BASE";
/// Direct-download base URL.
pub const DRIVE_DOWNLOAD_BASE_VAR: &str = "IMGEST_DRIVE_DOWNLOAD_BASE";
/// Remote call timeout in seconds.
pub const REMOTE_TIMEOUT_VAR: &str = "IMGEST_REMOTE_TIMEOUT_SECS";
/// Request body limit in bytes.
pub const MAX_UPLOAD_BYTES_VAR: &str = "IMGEST_MAX_UPLOAD_BYTES";
/// Opt-in request-scoped destination suffix.
pub const ISOLATE_DESTINATIONS_VAR: &str = "IMGEST_ISOLATE_DESTINATIONS";
/// Default log filter when `RUST_LOG` is unset.
pub const LOG_LEVEL_VAR: &str = "IMGEST_LOG_LEVEL";
/// Log output format override.
pub const LOG_FORMAT_VAR: &str = "IMGEST_LOG_FORMAT";

pub(crate) const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub(crate) const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub(crate) const DEFAULT_HTTP_PORT: u16 = 8000;
pub(crate) const DEFAULT_DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
pub(crate) const DEFAULT_DRIVE_DOWNLOAD_BASE: &str = "https://drive.google.com";
pub(crate) const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;
/// 512 MiB.
pub(crate) const DEFAULT_MAX_UPLOAD_BYTES: usize = 536_870_912;
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";
