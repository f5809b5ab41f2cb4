//! Root ingestion directory layout and file writes.
//!
//! # Design
//! - The root holds one subdirectory per storage kind, created at startup.
//! - Destination folders are derived through [`crate::naming::folder_name`] only.
//! - Writes refuse names that are not a single normal path component.

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{FsOpsError, FsOpsResult};
use crate::naming::folder_name;

/// Per-kind subdirectories under the ingestion root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Loose image uploads.
    Image,
    /// Images extracted from ZIP uploads.
    Zip,
    /// Images extracted from TAR uploads.
    Tar,
    /// Images fetched from Google Drive.
    Drive,
}

impl StorageKind {
    /// All storage kinds, in layout order.
    pub const ALL: [Self; 4] = [Self::Image, Self::Zip, Self::Tar, Self::Drive];

    /// Directory name for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::Drive => "drive",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Deterministic folder layout rooted at the configured ingestion directory.
#[derive(Debug, Clone)]
pub struct IngestLayout {
    root: PathBuf,
}

impl IngestLayout {
    /// Build a layout rooted at `root`. Nothing is created until [`Self::ensure`].
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root ingestion directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root and every per-kind subdirectory.
    ///
    /// # Errors
    ///
    /// Returns an IO error if any directory cannot be created.
    pub fn ensure(&self) -> FsOpsResult<()> {
        for kind in StorageKind::ALL {
            let dir = self.kind_dir(kind);
            fs::create_dir_all(&dir)
                .map_err(|source| FsOpsError::io("layout.ensure", &dir, source))?;
        }
        Ok(())
    }

    /// Directory holding every upload of `kind`.
    #[must_use]
    pub fn kind_dir(&self, kind: StorageKind) -> PathBuf {
        self.root.join(kind.as_str())
    }

    /// Per-request destination folder for `base`, optionally suffixed for isolation.
    ///
    /// The folder is not created here.
    #[must_use]
    pub fn destination(&self, kind: StorageKind, base: &str, suffix: Option<&str>) -> PathBuf {
        let mut name = folder_name(base);
        if let Some(suffix) = suffix {
            name.push('-');
            name.push_str(&folder_name(suffix));
        }
        self.kind_dir(kind).join(name)
    }
}

/// Create `dir` (and parents) if it does not exist yet.
///
/// # Errors
///
/// Returns an IO error if the directory cannot be created.
pub fn create_dir(dir: &Path) -> FsOpsResult<()> {
    fs::create_dir_all(dir).map_err(|source| FsOpsError::io("create_dir", dir, source))
}

/// Write `bytes` to `dir/name`, creating `dir` when needed. Existing files are replaced.
///
/// # Errors
///
/// Returns [`FsOpsError::InvalidInput`] when `name` is not a single plain file name,
/// or an IO error when the write fails.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> FsOpsResult<PathBuf> {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single || name.contains(['/', '\\']) {
        return Err(FsOpsError::InvalidInput {
            field: "file_name",
            reason: "not_a_plain_name",
            value: Some(name.to_string()),
        });
    }

    create_dir(dir)?;
    let target = dir.join(name);
    fs::write(&target, bytes).map_err(|source| FsOpsError::io("write_file", &target, source))?;
    debug!(path = %target.display(), bytes = bytes.len(), "wrote ingested file");
    Ok(target)
}
