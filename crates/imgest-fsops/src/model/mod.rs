//! Domain models for archive extraction.
//!
//! # Design
//! - Keep request/response types lightweight; no IO handles or extracted bytes.
//! - Results are owned by the caller and discarded after report assembly.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Archive container formats accepted by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveKind {
    /// PKZIP container.
    Zip,
    /// POSIX tar container (optionally gzip-compressed).
    Tar,
}

impl ArchiveKind {
    /// Stable lowercase label used in logs and directory names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Metadata for one archive member, as read from the container index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path of the member as recorded in the archive.
    pub relative_path: String,
    /// Whether the member is a regular file.
    pub is_file: bool,
}

/// Outcome of an extraction or download batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Relative paths written under the destination, in archive order.
    pub saved_relative_paths: Vec<String>,
    /// Folder that received the files.
    pub destination_folder: PathBuf,
}

impl ExtractionResult {
    /// Number of files written.
    #[must_use]
    pub fn count(&self) -> usize {
        self.saved_relative_paths.len()
    }
}
