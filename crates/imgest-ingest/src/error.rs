//! # Design
//!
//! - One taxonomy for every way an upload can fail; the HTTP layer maps it to responses.
//! - Caller-facing kinds carry exactly the context needed to render a message.
//! - Local faults keep their sources for logs and never leak into client text.

use std::fmt;

use imgest_drive::{DriveError, DriveOperation, LinkError, LinkKind};
use imgest_fsops::{ArchiveKind, FsOpsError};
use imgest_telemetry::IngestOutcome;
use thiserror::Error;
use tokio::task::JoinError;

/// Result alias for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Form field whose absence made an upload unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadField {
    /// Shared link for the Drive kinds.
    Link,
    /// Image list for the image kind.
    Files,
    /// Single file for archive and opaque kinds.
    File,
}

impl PayloadField {
    /// Form field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Files => "files",
            Self::File => "file",
        }
    }
}

impl fmt::Display for PayloadField {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Failures raised while handling one upload.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The upload lacked the payload its kind requires.
    #[error("upload payload missing")]
    MissingPayload {
        /// Field that was expected.
        field: PayloadField,
    },
    /// The shared link matched no recognised shape.
    #[error("drive link not recognised")]
    InvalidLink {
        /// Identifier kind the link was expected to carry.
        kind: LinkKind,
    },
    /// The extracted identifier failed the plausibility check.
    #[error("drive identifier rejected")]
    InvalidIdentifier {
        /// Identifier kind.
        kind: LinkKind,
        /// Rejected identifier.
        value: String,
    },
    /// A direct download resolved to an unsupported content type.
    #[error("unsupported content type")]
    UnsupportedContentType {
        /// Reported content type.
        content_type: String,
    },
    /// The uploaded or downloaded archive could not be parsed.
    #[error("archive could not be read")]
    CorruptArchive {
        /// Declared archive kind.
        kind: ArchiveKind,
        /// Underlying archive error.
        source: FsOpsError,
    },
    /// The remote API refused a call.
    #[error("remote api rejected the request")]
    RemoteApi {
        /// Remote operation.
        operation: DriveOperation,
        /// Upstream HTTP status.
        status: u16,
        /// Upstream response body.
        body: String,
    },
    /// A remote call exceeded its timeout.
    #[error("remote request timed out")]
    RemoteTimeout {
        /// Remote operation.
        operation: DriveOperation,
    },
    /// Any other remote failure (transport, decoding, client setup).
    #[error("remote transport failure")]
    Transport {
        /// Underlying Drive error.
        source: DriveError,
    },
    /// Writing to the ingestion root failed.
    #[error("storage failure")]
    Storage {
        /// Storage step that failed.
        operation: &'static str,
        /// Underlying filesystem error.
        source: FsOpsError,
    },
    /// A blocking filesystem task panicked or was cancelled.
    #[error("blocking task failed")]
    Join {
        /// Storage step that was running.
        operation: &'static str,
        /// Underlying join error.
        source: JoinError,
    },
    /// A built-in link pattern could not be used.
    #[error("link parser unavailable")]
    LinkParser {
        /// Underlying link error.
        source: LinkError,
    },
}

impl IngestError {
    /// Outcome label recorded in metrics for this failure.
    #[must_use]
    pub const fn outcome(&self) -> IngestOutcome {
        if self.is_client_error() {
            IngestOutcome::Rejected
        } else {
            IngestOutcome::Failed
        }
    }

    /// Returns `true` for failures caused by the caller's input or an upstream refusal.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingPayload { .. }
                | Self::InvalidLink { .. }
                | Self::InvalidIdentifier { .. }
                | Self::UnsupportedContentType { .. }
                | Self::CorruptArchive { .. }
                | Self::RemoteApi { .. }
                | Self::RemoteTimeout { .. }
        )
    }

    pub(crate) fn storage(operation: &'static str) -> impl FnOnce(FsOpsError) -> Self {
        move |source| Self::Storage { operation, source }
    }

    pub(crate) fn extraction(kind: ArchiveKind) -> impl FnOnce(FsOpsError) -> Self {
        move |source| {
            if source.is_corrupt_archive() {
                Self::CorruptArchive { kind, source }
            } else {
                Self::Storage {
                    operation: "archive.extract",
                    source,
                }
            }
        }
    }
}

impl From<DriveError> for IngestError {
    fn from(error: DriveError) -> Self {
        match error {
            DriveError::Api {
                operation,
                status,
                body,
            } => Self::RemoteApi {
                operation,
                status,
                body,
            },
            DriveError::Timeout { operation, .. } => Self::RemoteTimeout { operation },
            DriveError::UnsupportedContentType { content_type } => {
                Self::UnsupportedContentType { content_type }
            }
            source => Self::Transport { source },
        }
    }
}

impl From<LinkError> for IngestError {
    fn from(error: LinkError) -> Self {
        match error {
            LinkError::InvalidLink { kind } => Self::InvalidLink { kind },
            LinkError::InvalidIdentifier { kind, value } => Self::InvalidIdentifier { kind, value },
            source @ LinkError::RegexCompile { .. } => Self::LinkParser { source },
        }
    }
}
