//! Typed configuration consumed by the application bootstrap.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use url::Url;

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Root ingestion directory.
    pub upload_dir: PathBuf,
    /// Listener IP address.
    pub bind_addr: IpAddr,
    /// Listener port.
    pub http_port: u16,
    /// Remote Drive settings.
    pub drive: DriveSettings,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
    /// Append a request-scoped suffix to destination folders.
    pub isolate_destinations: bool,
    /// Logging preferences.
    pub logging: LoggingSettings,
}

impl IngestConfig {
    /// Socket address the HTTP listener binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }
}

/// Settings injected into the Drive client.
#[derive(Clone)]
pub struct DriveSettings {
    /// API key sent with listing and download calls.
    pub api_key: Option<String>,
    /// Drive v3 API base URL.
    pub api_base: Url,
    /// Base URL for the direct-download endpoint.
    pub download_base: Url,
    /// Ceiling applied to every remote call.
    pub timeout: Duration,
}

impl fmt::Debug for DriveSettings {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DriveSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base.as_str())
            .field("download_base", &self.download_base.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Log output format requested through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormatSetting {
    /// Structured JSON lines.
    Json,
    /// Human-readable output.
    Pretty,
}

/// Logging preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Explicit format; `None` defers to the build profile.
    pub format: Option<LogFormatSetting>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn debug_output_redacts_api_key() -> anyhow::Result<()> {
        let settings = DriveSettings {
            api_key: Some("secret-key".to_string()),
            api_base: Url::parse("https://example.com/drive/v3")?,
            download_base: Url::parse("https://example.com")?,
            timeout: Duration::from_secs(5),
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
        Ok(())
    }

    #[test]
    fn log_format_serializes_snake_case() -> anyhow::Result<()> {
        assert_eq!(
            serde_json::to_string(&LogFormatSetting::Pretty)?,
            "\"pretty\""
        );
        Ok(())
    }

    #[test]
    fn socket_addr_combines_ip_and_port() -> anyhow::Result<()> {
        let config = IngestConfig {
            upload_dir: PathBuf::from("uploads"),
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            http_port: 9001,
            drive: DriveSettings {
                api_key: None,
                api_base: Url::parse("https://example.com/drive/v3")?,
                download_base: Url::parse("https://example.com")?,
                timeout: Duration::from_secs(1),
            },
            max_upload_bytes: 1024,
            isolate_destinations: false,
            logging: LoggingSettings {
                level: "info".to_string(),
                format: None,
            },
        };
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9001");
        Ok(())
    }
}
