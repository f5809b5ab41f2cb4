//! # Design
//!
//! - Separate link-parsing failures (pure, user input) from remote call failures.
//! - Keep error messages constant; capture operation context in structured fields.
//! - Upstream response bodies are retained verbatim for the caller to surface.

use std::fmt;

use thiserror::Error;

/// Result alias for remote Drive operations.
pub type DriveResult<T> = Result<T, DriveError>;

/// Which identifier a link was expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// A shared folder link (`/folders/<id>`).
    Folder,
    /// A shared file link (`/file/d/<id>`, `open?id=`, `uc?id=`).
    File,
}

impl LinkKind {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::File => "file",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Remote call that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOperation {
    /// Folder listing through the files API.
    ListImages,
    /// File content download through the files API.
    DownloadFile,
    /// Shared-file fetch through the direct-download endpoint.
    FetchSharedFile,
}

impl DriveOperation {
    /// Stable dotted label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListImages => "drive.list_images",
            Self::DownloadFile => "drive.download_file",
            Self::FetchSharedFile => "drive.fetch_shared_file",
        }
    }

    /// Returns `true` when the call was fetching file content rather than a listing.
    #[must_use]
    pub const fn is_download(self) -> bool {
        matches!(self, Self::DownloadFile | Self::FetchSharedFile)
    }
}

impl fmt::Display for DriveOperation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Failures raised while extracting identifiers from shared links.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The link matched none of the recognised shapes.
    #[error("link does not match a known drive shape")]
    InvalidLink {
        /// Identifier kind the caller asked for.
        kind: LinkKind,
    },
    /// The extracted identifier failed the plausibility check.
    #[error("drive identifier failed plausibility check")]
    InvalidIdentifier {
        /// Identifier kind the caller asked for.
        kind: LinkKind,
        /// Identifier that was rejected.
        value: String,
    },
    /// A built-in link pattern failed to compile.
    #[error("link pattern failed to compile")]
    RegexCompile {
        /// Pattern that failed.
        pattern: &'static str,
        /// Underlying regex error.
        source: regex::Error,
    },
}

/// Failures raised by remote Drive calls.
#[derive(Debug, Error)]
pub enum DriveError {
    /// The remote API answered with a non-success status.
    #[error("drive api returned an error status")]
    Api {
        /// Operation that issued the call.
        operation: DriveOperation,
        /// HTTP status returned upstream.
        status: u16,
        /// Upstream response body.
        body: String,
    },
    /// The remote call exceeded the configured timeout.
    #[error("drive request timed out")]
    Timeout {
        /// Operation that issued the call.
        operation: DriveOperation,
        /// Endpoint without its query string.
        endpoint: String,
    },
    /// Transport-level failure other than a timeout.
    #[error("drive transport failure")]
    Transport {
        /// Operation that issued the call.
        operation: DriveOperation,
        /// Endpoint without its query string.
        endpoint: String,
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },
    /// A direct download resolved to a content type outside the accepted set.
    #[error("unsupported drive content type")]
    UnsupportedContentType {
        /// Content type reported (or assumed) for the response.
        content_type: String,
    },
    /// The listing response could not be decoded.
    #[error("drive response decode failed")]
    Decode {
        /// Operation that issued the call.
        operation: DriveOperation,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// A configured base URL cannot carry path segments.
    #[error("drive base url is not usable")]
    InvalidBaseUrl {
        /// Offending base URL.
        url: String,
    },
    /// Building the HTTP client failed.
    #[error("drive client construction failed")]
    Client {
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },
}

impl DriveError {
    pub(crate) fn from_transport(
        operation: DriveOperation,
        endpoint: impl Into<String>,
        source: reqwest::Error,
    ) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                operation,
                endpoint: endpoint.into(),
            }
        } else {
            Self::Transport {
                operation,
                endpoint: endpoint.into(),
                source,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn link_errors_keep_constant_messages() {
        let invalid = LinkError::InvalidLink {
            kind: LinkKind::Folder,
        };
        assert_eq!(invalid.to_string(), "link does not match a known drive shape");

        let identifier = LinkError::InvalidIdentifier {
            kind: LinkKind::File,
            value: "short".to_string(),
        };
        assert_eq!(
            identifier.to_string(),
            "drive identifier failed plausibility check"
        );
        assert!(identifier.source().is_none());
        assert_eq!(LinkKind::File.to_string(), "file");
    }

    #[test]
    fn drive_errors_keep_upstream_context() {
        let api = DriveError::Api {
            operation: DriveOperation::ListImages,
            status: 403,
            body: "{\"error\":\"forbidden\"}".to_string(),
        };
        assert_eq!(api.to_string(), "drive api returned an error status");
        assert!(matches!(api, DriveError::Api { status: 403, .. }));

        assert!(!DriveOperation::ListImages.is_download());
        assert!(DriveOperation::DownloadFile.is_download());
        assert!(DriveOperation::FetchSharedFile.is_download());
        assert_eq!(
            DriveOperation::FetchSharedFile.to_string(),
            "drive.fetch_shared_file"
        );

        let unsupported = DriveError::UnsupportedContentType {
            content_type: "text/html".to_string(),
        };
        assert!(unsupported.source().is_none());
    }
}
