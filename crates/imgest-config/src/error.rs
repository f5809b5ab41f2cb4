//! Error types for configuration loading.

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Environment variable that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str, value: &str) -> Self {
        Self::InvalidField {
            field,
            reason,
            value: Some(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_field_keeps_context() {
        let err = ConfigError::invalid("IMGEST_HTTP_PORT", "out_of_range", "0");
        assert_eq!(err.to_string(), "invalid configuration field");
        let ConfigError::InvalidField {
            field,
            reason,
            value,
        } = err;
        assert_eq!(field, "IMGEST_HTTP_PORT");
        assert_eq!(reason, "out_of_range");
        assert_eq!(value.as_deref(), Some("0"));
    }
}
