//! Lookup-driven configuration loading.
//!
//! # Design
//! - Parse from an injected lookup so tests never mutate process state.
//! - Unset or blank variables fall back to defaults; malformed values fail fast.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::defaults::{
    API_KEY_VAR, BIND_ADDR_VAR, DEFAULT_BIND_ADDR, DEFAULT_DRIVE_API_BASE,
    DEFAULT_DRIVE_DOWNLOAD_BASE, DEFAULT_HTTP_PORT, DEFAULT_LOG_LEVEL, DEFAULT_MAX_UPLOAD_BYTES,
    DEFAULT_REMOTE_TIMEOUT_SECS, DEFAULT_UPLOAD_DIR, DRIVE_API_BASE_VAR, DRIVE_DOWNLOAD_BASE_VAR,
    HTTP_PORT_VAR, ISOLATE_DESTINATIONS_VAR, LOG_FORMAT_VAR, LOG_LEVEL_VAR, MAX_UPLOAD_BYTES_VAR,
    REMOTE_TIMEOUT_VAR, UPLOAD_DIR_VAR,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{DriveSettings, IngestConfig, LogFormatSetting, LoggingSettings};

impl IngestConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when a variable holds a malformed value.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when a variable holds a malformed value.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let upload_dir = read(UPLOAD_DIR_VAR).unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string());
        let bind_addr = parse_bind_addr(read(BIND_ADDR_VAR).as_deref())?;
        let http_port = parse_port(read(HTTP_PORT_VAR).as_deref())?;
        let timeout = parse_timeout(read(REMOTE_TIMEOUT_VAR).as_deref())?;
        let max_upload_bytes = parse_max_upload(read(MAX_UPLOAD_BYTES_VAR).as_deref())?;
        let isolate_destinations = parse_flag(
            ISOLATE_DESTINATIONS_VAR,
            read(ISOLATE_DESTINATIONS_VAR).as_deref(),
        )?;

        let drive = DriveSettings {
            api_key: read(API_KEY_VAR),
            api_base: parse_base_url(
                DRIVE_API_BASE_VAR,
                read(DRIVE_API_BASE_VAR).as_deref(),
                DEFAULT_DRIVE_API_BASE,
            )?,
            download_base: parse_base_url(
                DRIVE_DOWNLOAD_BASE_VAR,
                read(DRIVE_DOWNLOAD_BASE_VAR).as_deref(),
                DEFAULT_DRIVE_DOWNLOAD_BASE,
            )?,
            timeout,
        };

        let logging = LoggingSettings {
            level: read(LOG_LEVEL_VAR).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            format: parse_log_format(read(LOG_FORMAT_VAR).as_deref())?,
        };

        if drive.api_key.is_none() {
            debug!("no drive api key configured; drive listing calls will be unauthenticated");
        }

        Ok(Self {
            upload_dir: PathBuf::from(upload_dir),
            bind_addr,
            http_port,
            drive,
            max_upload_bytes,
            isolate_destinations,
            logging,
        })
    }
}

fn parse_bind_addr(value: Option<&str>) -> ConfigResult<IpAddr> {
    let raw = value.unwrap_or(DEFAULT_BIND_ADDR);
    raw.parse::<IpAddr>()
        .map_err(|_| ConfigError::invalid(BIND_ADDR_VAR, "not_an_ip_address", raw))
}

fn parse_port(value: Option<&str>) -> ConfigResult<u16> {
    let Some(raw) = value else {
        return Ok(DEFAULT_HTTP_PORT);
    };
    let port = raw
        .parse::<u16>()
        .map_err(|_| ConfigError::invalid(HTTP_PORT_VAR, "not_a_port", raw))?;
    if port == 0 {
        return Err(ConfigError::invalid(HTTP_PORT_VAR, "out_of_range", raw));
    }
    Ok(port)
}

fn parse_timeout(value: Option<&str>) -> ConfigResult<Duration> {
    let Some(raw) = value else {
        return Ok(Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS));
    };
    match raw.parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid(REMOTE_TIMEOUT_VAR, "must_be_positive", raw)),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err(ConfigError::invalid(REMOTE_TIMEOUT_VAR, "not_an_integer", raw)),
    }
}

fn parse_max_upload(value: Option<&str>) -> ConfigResult<usize> {
    let Some(raw) = value else {
        return Ok(DEFAULT_MAX_UPLOAD_BYTES);
    };
    match raw.parse::<usize>() {
        Ok(0) => Err(ConfigError::invalid(
            MAX_UPLOAD_BYTES_VAR,
            "must_be_positive",
            raw,
        )),
        Ok(bytes) => Ok(bytes),
        Err(_) => Err(ConfigError::invalid(
            MAX_UPLOAD_BYTES_VAR,
            "not_an_integer",
            raw,
        )),
    }
}

fn parse_flag(field: &'static str, value: Option<&str>) -> ConfigResult<bool> {
    let Some(raw) = value else {
        return Ok(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(field, "not_a_boolean", raw)),
    }
}

fn parse_base_url(field: &'static str, value: Option<&str>, default: &str) -> ConfigResult<Url> {
    let raw = value.unwrap_or(default);
    let url = Url::parse(raw).map_err(|_| ConfigError::invalid(field, "not_a_url", raw))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(field, "unsupported_scheme", raw));
    }
    Ok(url)
}

fn parse_log_format(value: Option<&str>) -> ConfigResult<Option<LogFormatSetting>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "json" => Ok(Some(LogFormatSetting::Json)),
        "pretty" => Ok(Some(LogFormatSetting::Pretty)),
        _ => Err(ConfigError::invalid(LOG_FORMAT_VAR, "unknown_format", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> ConfigResult<IngestConfig> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        IngestConfig::from_lookup(|name| values.get(name).cloned())
    }

    fn expect_invalid(pairs: &[(&str, &str)]) -> anyhow::Result<(&'static str, &'static str)> {
        let err = load(pairs)
            .err()
            .ok_or_else(|| anyhow::anyhow!("expected configuration error"))?;
        let ConfigError::InvalidField { field, reason, .. } = err;
        Ok((field, reason))
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() -> anyhow::Result<()> {
        let config = load(&[])?;
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8000");
        assert_eq!(config.drive.api_key, None);
        assert_eq!(
            config.drive.api_base.as_str(),
            "https://www.googleapis.com/drive/v3"
        );
        assert_eq!(config.drive.download_base.as_str(), "https://drive.google.com/");
        assert_eq!(config.drive.timeout, Duration::from_secs(30));
        assert_eq!(config.max_upload_bytes, 536_870_912);
        assert!(!config.isolate_destinations);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, None);
        Ok(())
    }

    #[test]
    fn explicit_values_override_defaults() -> anyhow::Result<()> {
        let config = load(&[
            (UPLOAD_DIR_VAR, "/srv/ingest"),
            (BIND_ADDR_VAR, "0.0.0.0"),
            (HTTP_PORT_VAR, "9090"),
            (API_KEY_VAR, " key-123 "),
            (DRIVE_API_BASE_VAR, "http://127.0.0.1:4010/drive/v3"),
            (REMOTE_TIMEOUT_VAR, "5"),
            (MAX_UPLOAD_BYTES_VAR, "1024"),
            (ISOLATE_DESTINATIONS_VAR, "Yes"),
            (LOG_LEVEL_VAR, "debug"),
            (LOG_FORMAT_VAR, "JSON"),
        ])?;
        assert_eq!(config.upload_dir, PathBuf::from("/srv/ingest"));
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:9090");
        assert_eq!(config.drive.api_key.as_deref(), Some("key-123"));
        assert_eq!(config.drive.api_base.port(), Some(4010));
        assert_eq!(config.drive.timeout, Duration::from_secs(5));
        assert_eq!(config.max_upload_bytes, 1024);
        assert!(config.isolate_destinations);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, Some(LogFormatSetting::Json));
        Ok(())
    }

    #[test]
    fn blank_values_fall_back_to_defaults() -> anyhow::Result<()> {
        let config = load(&[(HTTP_PORT_VAR, "   "), (API_KEY_VAR, "")])?;
        assert_eq!(config.http_port, 8000);
        assert_eq!(config.drive.api_key, None);
        Ok(())
    }

    #[test]
    fn malformed_values_are_rejected() -> anyhow::Result<()> {
        assert_eq!(
            expect_invalid(&[(HTTP_PORT_VAR, "0")])?,
            (HTTP_PORT_VAR, "out_of_range")
        );
        assert_eq!(
            expect_invalid(&[(HTTP_PORT_VAR, "70000")])?,
            (HTTP_PORT_VAR, "not_a_port")
        );
        assert_eq!(
            expect_invalid(&[(BIND_ADDR_VAR, "localhost")])?,
            (BIND_ADDR_VAR, "not_an_ip_address")
        );
        assert_eq!(
            expect_invalid(&[(REMOTE_TIMEOUT_VAR, "0")])?,
            (REMOTE_TIMEOUT_VAR, "must_be_positive")
        );
        assert_eq!(
            expect_invalid(&[(MAX_UPLOAD_BYTES_VAR, "lots")])?,
            (MAX_UPLOAD_BYTES_VAR, "not_an_integer")
        );
        assert_eq!(
            expect_invalid(&[(ISOLATE_DESTINATIONS_VAR, "maybe")])?,
            (ISOLATE_DESTINATIONS_VAR, "not_a_boolean")
        );
        assert_eq!(
            expect_invalid(&[(DRIVE_DOWNLOAD_BASE_VAR, "ftp://drive.example")])?,
            (DRIVE_DOWNLOAD_BASE_VAR, "unsupported_scheme")
        );
        assert_eq!(
            expect_invalid(&[(DRIVE_API_BASE_VAR, "not a url")])?,
            (DRIVE_API_BASE_VAR, "not_a_url")
        );
        assert_eq!(
            expect_invalid(&[(LOG_FORMAT_VAR, "xml")])?,
            (LOG_FORMAT_VAR, "unknown_format")
        );
        Ok(())
    }

    #[test]
    fn flag_parsing_handles_truthy_and_falsey() -> anyhow::Result<()> {
        assert!(parse_flag(ISOLATE_DESTINATIONS_VAR, Some("TrUe"))?);
        assert!(!parse_flag(ISOLATE_DESTINATIONS_VAR, Some("off"))?);
        assert!(!parse_flag(ISOLATE_DESTINATIONS_VAR, None)?);
        Ok(())
    }
}
