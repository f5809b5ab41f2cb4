//! Test fixtures: in-memory archive builders, sample payloads and temp roots.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use anyhow::{Result, ensure};
use flate2::{Compression, write::GzEncoder};
use tar::{EntryType, Header};
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::FileOptions;

/// Smallest byte prefix recognised as a JPEG.
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
/// Smallest byte prefix recognised as a PNG.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];

/// One member of a tar fixture.
#[derive(Debug, Clone, Copy)]
pub enum TarMember<'a> {
    /// Regular file with contents. The name is written verbatim, unsafe paths included.
    File(&'a str, &'a [u8]),
    /// Directory entry.
    Dir(&'a str),
    /// Symbolic link pointing at the given target.
    Symlink(&'a str, &'a str),
}

/// Build a ZIP archive in memory. Names ending in `/` become directory entries.
///
/// # Errors
///
/// Returns an error if the zip writer fails.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options)?;
        } else {
            writer.start_file(*name, options)?;
            writer.write_all(contents)?;
        }
    }
    Ok(writer.finish()?.into_inner())
}

/// Build a tar archive in memory without validating member names.
///
/// # Errors
///
/// Returns an error if a name does not fit the legacy header or the builder fails.
pub fn tar_bytes(members: &[TarMember<'_>]) -> Result<Vec<u8>> {
    let mut builder = tar::Builder::new(Vec::new());
    for member in members {
        let mut header = Header::new_gnu();
        let (name, entry_type, data): (&str, EntryType, &[u8]) = match *member {
            TarMember::File(name, data) => (name, EntryType::Regular, data),
            TarMember::Dir(name) => (name, EntryType::Directory, Default::default()),
            TarMember::Symlink(name, target) => {
                header.set_link_name(target)?;
                (name, EntryType::Symlink, Default::default())
            }
        };
        write_raw_name(&mut header, name)?;
        header.set_entry_type(entry_type);
        header.set_size(data.len() as u64);
        header.set_mode(if entry_type.is_dir() { 0o755 } else { 0o644 });
        header.set_mtime(0);
        header.set_cksum();
        builder.append(&header, data)?;
    }
    Ok(builder.into_inner()?)
}

fn write_raw_name(header: &mut Header, name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    let slot = &mut header.as_old_mut().name;
    ensure!(bytes.len() < slot.len(), "tar fixture name too long: {name}");
    slot.fill(0);
    slot[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

/// Gzip-compress a buffer (used for `.tar.gz` fixtures).
///
/// # Errors
///
/// Returns an error if compression fails.
pub fn gzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

/// Create a fresh temporary ingestion root.
///
/// # Errors
///
/// Returns an error if the temp directory cannot be created.
pub fn temp_root() -> Result<TempDir> {
    Ok(tempfile::Builder::new().prefix("imgest-").tempdir()?)
}

/// Every regular file under `root`, as paths relative to `root`, sorted.
#[must_use]
pub fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect();
    files.sort();
    files
}
