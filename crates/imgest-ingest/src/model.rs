//! Upload requests and ingestion reports.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status returned when a Drive folder listing is empty.
pub const STATUS_NO_IMAGES: &str = "No images found in folder.";
/// Status returned after a Drive folder download.
pub const STATUS_DRIVE_FOLDER: &str = "Drive images downloaded.";
/// Status returned after a shared Drive image download.
pub const STATUS_DRIVE_FILE: &str = "Drive file downloaded.";
/// Status returned after loose image uploads.
pub const STATUS_IMAGES_UPLOADED: &str = "Images uploaded.";
/// Status returned after archive extraction.
pub const STATUS_EXTRACTED: &str = "Images extracted from archive.";
/// Status returned after storing an opaque file.
pub const STATUS_FILE_SAVED: &str = "File saved.";

/// Declared kind of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadKind {
    /// Shared Drive folder link.
    DriveFolder,
    /// Shared Drive file link.
    DriveLink,
    /// One or more loose images.
    Image,
    /// A ZIP archive.
    Zip,
    /// A TAR archive.
    Tar,
    /// Any other declared type; the file is stored verbatim.
    Opaque(String),
}

impl UploadKind {
    /// Classify the `type` form field.
    #[must_use]
    pub fn from_form_type(value: &str) -> Self {
        match value.trim() {
            "drive" => Self::DriveFolder,
            "drive_link" => Self::DriveLink,
            "image" => Self::Image,
            "zip" => Self::Zip,
            "tar" => Self::Tar,
            other => Self::Opaque(other.to_string()),
        }
    }

    /// Stable label used in logs and metrics. Opaque types share one label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DriveFolder => "drive",
            Self::DriveLink => "drive_link",
            Self::Image => "image",
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::Opaque(_) => "other",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A file received from the client.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Client-supplied file name, unsanitized.
    pub file_name: String,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// Raw contents.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Payload attached to an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPayload {
    /// A shared link (Drive kinds).
    Link(String),
    /// One or more files (image, archive and opaque kinds).
    Files(Vec<UploadedFile>),
    /// Nothing usable was supplied.
    Missing,
}

/// One upload as seen by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Declared kind.
    pub kind: UploadKind,
    /// Attached payload.
    pub payload: UploadPayload,
}

impl UploadRequest {
    /// Build a request from a declared kind and payload.
    #[must_use]
    pub const fn new(kind: UploadKind, payload: UploadPayload) -> Self {
        Self { kind, payload }
    }
}

/// Summary returned to the client after a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionReport {
    /// Human-readable status line.
    pub status: String,
    /// Number of saved files; always equals `files.len()` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Destination folder the files were written to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    /// Saved files relative to `folder`, in processing order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    /// Stored file name (opaque uploads).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Stored file path (opaque uploads).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl IngestionReport {
    /// Report listing the files saved into `folder`.
    #[must_use]
    pub fn files(status: &str, folder: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            status: status.to_string(),
            count: Some(files.len()),
            folder: Some(folder.into()),
            files: Some(files),
            filename: None,
            path: None,
        }
    }

    /// Report carrying only a status line.
    #[must_use]
    pub fn status_only(status: &str) -> Self {
        Self {
            status: status.to_string(),
            count: None,
            folder: None,
            files: None,
            filename: None,
            path: None,
        }
    }

    /// Report for a single stored file.
    #[must_use]
    pub fn stored(status: &str, filename: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            count: None,
            folder: None,
            files: None,
            filename: Some(filename.into()),
            path: Some(path.into()),
        }
    }

    /// Number of files this report says were written.
    #[must_use]
    pub fn saved_count(&self) -> usize {
        self.count
            .unwrap_or_else(|| usize::from(self.path.is_some()))
    }
}
