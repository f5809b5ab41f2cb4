//! # Design
//!
//! - Centralize application-level errors for bootstrap and serving.
//! - Keep error messages constant while carrying the failing operation as a field.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Loading configuration failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: imgest_config::ConfigError,
    },
    /// Telemetry setup failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: imgest_telemetry::TelemetryError,
    },
    /// Preparing the ingestion root failed.
    #[error("filesystem operation failed")]
    FsOps {
        /// Operation identifier.
        operation: &'static str,
        /// Source fsops error.
        source: imgest_fsops::FsOpsError,
    },
    /// Building the Drive client failed.
    #[error("drive client operation failed")]
    Drive {
        /// Operation identifier.
        operation: &'static str,
        /// Source Drive error.
        source: imgest_drive::DriveError,
    },
    /// Compiling the link patterns failed.
    #[error("link parser operation failed")]
    Link {
        /// Operation identifier.
        operation: &'static str,
        /// Source link error.
        source: imgest_drive::LinkError,
    },
    /// Binding or serving the API failed.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source API server error.
        source: imgest_api::ApiServerError,
    },
}

impl AppError {
    pub(crate) const fn config(operation: &'static str, source: imgest_config::ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: imgest_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn fsops(operation: &'static str, source: imgest_fsops::FsOpsError) -> Self {
        Self::FsOps { operation, source }
    }

    pub(crate) const fn drive(operation: &'static str, source: imgest_drive::DriveError) -> Self {
        Self::Drive { operation, source }
    }

    pub(crate) const fn link(operation: &'static str, source: imgest_drive::LinkError) -> Self {
        Self::Link { operation, source }
    }

    pub(crate) const fn api_server(
        operation: &'static str,
        source: imgest_api::ApiServerError,
    ) -> Self {
        Self::ApiServer { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn app_error_helpers_build_variants() -> Result<(), Box<dyn Error>> {
        let config = AppError::config(
            "config.from_env",
            imgest_config::ConfigError::InvalidField {
                field: "IMGEST_HTTP_PORT",
                reason: "out_of_range",
                value: Some("0".to_string()),
            },
        );
        assert!(matches!(
            config,
            AppError::Config {
                operation: "config.from_env",
                ..
            }
        ));
        assert_eq!(config.to_string(), "configuration operation failed");
        assert!(config.source().is_some());

        let fsops = AppError::fsops(
            "layout.ensure",
            imgest_fsops::FsOpsError::Io {
                operation: "create_dir",
                path: "uploads".into(),
                source: io::Error::other("read-only"),
            },
        );
        assert!(matches!(fsops, AppError::FsOps { .. }));

        let drive = AppError::drive(
            "drive.client",
            imgest_drive::DriveError::InvalidBaseUrl {
                url: "mailto:x".to_string(),
            },
        );
        assert!(matches!(drive, AppError::Drive { .. }));

        let link = AppError::link(
            "links.compile",
            imgest_drive::LinkError::InvalidLink {
                kind: imgest_drive::LinkKind::File,
            },
        );
        assert!(matches!(link, AppError::Link { .. }));

        let api = AppError::api_server(
            "api_server.serve",
            imgest_api::ApiServerError::Serve {
                source: io::Error::other("io"),
            },
        );
        assert!(matches!(api, AppError::ApiServer { .. }));
        assert_eq!(api.to_string(), "api server operation failed");

        let Err(utf8) = String::from_utf8(vec![0xFF]) else {
            return Err(io::Error::other("expected invalid utf-8").into());
        };
        let telemetry = AppError::telemetry(
            "telemetry.render",
            imgest_telemetry::TelemetryError::MetricsUtf8 { source: utf8 },
        );
        assert!(matches!(telemetry, AppError::Telemetry { .. }));
        Ok(())
    }
}
