//! # Design
//!
//! - Provide structured, constant-message errors for filesystem and archive work.
//! - Capture operation context (paths, fields, inputs) to make failures reproducible in tests.
//! - Preserve source errors without interpolating context into error messages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for filesystem operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Errors produced while laying out, extracting, or writing ingested files.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// IO failures while interacting with the filesystem.
    #[error("fsops io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The ZIP container could not be decoded.
    #[error("fsops zip failure")]
    Zip {
        /// Operation that triggered the archive failure.
        operation: &'static str,
        /// Underlying zip error.
        source: zip::result::ZipError,
    },
    /// The TAR container could not be decoded.
    #[error("fsops tar failure")]
    Tar {
        /// Operation that triggered the archive failure.
        operation: &'static str,
        /// Underlying IO error raised by the tar reader.
        source: io::Error,
    },
    /// Input validation failures.
    #[error("fsops invalid input")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) const fn zip(operation: &'static str, source: zip::result::ZipError) -> Self {
        Self::Zip { operation, source }
    }

    pub(crate) const fn tar(operation: &'static str, source: io::Error) -> Self {
        Self::Tar { operation, source }
    }

    /// Returns `true` when the failure means the archive container itself was unreadable.
    #[must_use]
    pub const fn is_corrupt_archive(&self) -> bool {
        matches!(self, Self::Zip { .. } | Self::Tar { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn fsops_error_helpers_build_variants() {
        let io_err = FsOpsError::io("write", "path", io::Error::other("io"));
        assert!(matches!(io_err, FsOpsError::Io { .. }));
        assert!(io_err.source().is_some());
        assert!(!io_err.is_corrupt_archive());

        let zip_err = FsOpsError::zip("decode", zip::result::ZipError::FileNotFound);
        assert!(matches!(zip_err, FsOpsError::Zip { .. }));
        assert!(zip_err.source().is_some());
        assert!(zip_err.is_corrupt_archive());

        let tar_err = FsOpsError::tar("entries", io::Error::other("checksum"));
        assert!(tar_err.is_corrupt_archive());
        assert_eq!(tar_err.to_string(), "fsops tar failure");

        let invalid = FsOpsError::InvalidInput {
            field: "file_name",
            reason: "empty",
            value: None,
        };
        assert!(invalid.source().is_none());
        assert!(!invalid.is_corrupt_archive());
    }
}
