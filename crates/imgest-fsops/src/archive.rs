//! ZIP/TAR image extraction.
//!
//! # Design
//! - Archives arrive as in-memory buffers; nothing is staged on disk first.
//! - Entries are visited in archive order and that order is preserved in the result.
//! - Only image members are written; unsafe member paths are skipped, never written.

use std::fs;
use std::io::{self, Cursor, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::{info, warn};
use zip::ZipArchive;

use crate::error::{FsOpsError, FsOpsResult};
use crate::layout::create_dir;
use crate::model::{ArchiveEntry, ArchiveKind, ExtractionResult};
use crate::naming::{display_relative, is_image_name, sanitize_relative_path};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Extract every image member of `bytes` into `destination`.
///
/// The destination is created even when no member matches. When the container
/// turns out to be unreadable and the destination did not exist beforehand, it is
/// removed again.
///
/// # Errors
///
/// Returns [`FsOpsError::Zip`] or [`FsOpsError::Tar`] when the container cannot be
/// parsed, and [`FsOpsError::Io`] when writing an extracted member fails.
pub fn extract(
    bytes: &[u8],
    kind: ArchiveKind,
    destination: &Path,
) -> FsOpsResult<ExtractionResult> {
    let existed = destination.exists();
    create_dir(destination)?;

    let outcome = match kind {
        ArchiveKind::Zip => extract_zip(bytes, destination),
        ArchiveKind::Tar => extract_tar(bytes, destination),
    };

    let saved_relative_paths = match outcome {
        Ok(saved) => saved,
        Err(err) => {
            if err.is_corrupt_archive() && !existed {
                if let Err(cleanup) = fs::remove_dir_all(destination) {
                    warn!(
                        path = %destination.display(),
                        error = %cleanup,
                        "failed to remove destination after corrupt archive"
                    );
                }
            }
            return Err(err);
        }
    };

    info!(
        kind = %kind,
        destination = %destination.display(),
        extracted = saved_relative_paths.len(),
        "archive extraction complete"
    );
    Ok(ExtractionResult {
        saved_relative_paths,
        destination_folder: destination.to_path_buf(),
    })
}

/// Walk the archive index without extracting anything.
///
/// # Errors
///
/// Returns [`FsOpsError::Zip`] or [`FsOpsError::Tar`] when the container cannot be parsed.
pub fn list_entries(bytes: &[u8], kind: ArchiveKind) -> FsOpsResult<Vec<ArchiveEntry>> {
    match kind {
        ArchiveKind::Zip => {
            let mut archive = open_zip(bytes)?;
            let mut entries = Vec::with_capacity(archive.len());
            for index in 0..archive.len() {
                let entry = archive
                    .by_index(index)
                    .map_err(|source| FsOpsError::zip("list_entries.zip_entry", source))?;
                entries.push(ArchiveEntry {
                    relative_path: entry.name().to_string(),
                    is_file: !entry.is_dir(),
                });
            }
            Ok(entries)
        }
        ArchiveKind::Tar => {
            let mut archive = open_tar(bytes)?;
            let mut entries = Vec::new();
            for entry in archive
                .entries()
                .map_err(|source| FsOpsError::tar("list_entries.tar_entries", source))?
            {
                let entry =
                    entry.map_err(|source| FsOpsError::tar("list_entries.tar_entry", source))?;
                let relative_path = entry
                    .path()
                    .map_err(|source| FsOpsError::tar("list_entries.tar_path", source))?
                    .to_string_lossy()
                    .into_owned();
                entries.push(ArchiveEntry {
                    relative_path,
                    is_file: is_regular_tar_file(&entry),
                });
            }
            Ok(entries)
        }
    }
}

fn open_zip(bytes: &[u8]) -> FsOpsResult<ZipArchive<Cursor<&[u8]>>> {
    ZipArchive::new(Cursor::new(bytes)).map_err(|source| FsOpsError::zip("zip.decode", source))
}

fn open_tar(bytes: &[u8]) -> FsOpsResult<tar::Archive<Box<dyn Read + '_>>> {
    if bytes.is_empty() {
        return Err(FsOpsError::tar(
            "tar.decode",
            io::Error::new(io::ErrorKind::UnexpectedEof, "empty archive"),
        ));
    }
    let reader: Box<dyn Read + '_> = if bytes.starts_with(&GZIP_MAGIC) {
        Box::new(GzDecoder::new(bytes))
    } else {
        Box::new(bytes)
    };
    Ok(tar::Archive::new(reader))
}

fn extract_zip(bytes: &[u8], destination: &Path) -> FsOpsResult<Vec<String>> {
    let mut archive = open_zip(bytes)?;
    let mut saved = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|source| FsOpsError::zip("extract_zip.read_entry", source))?;
        if entry.is_dir() || !is_image_name(entry.name()) {
            continue;
        }
        let Some(relative) = safe_member_path(entry.name()) else {
            continue;
        };

        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .map_err(|source| FsOpsError::zip("extract_zip.inflate", source.into()))?;
        write_member(destination, &relative, &contents)?;
        saved.push(display_relative(&relative));
    }

    Ok(saved)
}

fn extract_tar(bytes: &[u8], destination: &Path) -> FsOpsResult<Vec<String>> {
    let mut archive = open_tar(bytes)?;
    let mut saved = Vec::new();

    let entries = archive
        .entries()
        .map_err(|source| FsOpsError::tar("extract_tar.entries", source))?;
    for entry in entries {
        let mut entry = entry.map_err(|source| FsOpsError::tar("extract_tar.read_entry", source))?;
        if !is_regular_tar_file(&entry) {
            continue;
        }
        let name = entry
            .path()
            .map_err(|source| FsOpsError::tar("extract_tar.entry_path", source))?
            .to_string_lossy()
            .into_owned();
        if !is_image_name(&name) {
            continue;
        }
        let Some(relative) = safe_member_path(&name) else {
            continue;
        };

        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .map_err(|source| FsOpsError::tar("extract_tar.read_contents", source))?;
        write_member(destination, &relative, &contents)?;
        saved.push(display_relative(&relative));
    }

    Ok(saved)
}

/// Old-style archives mark directories as regular files whose name ends in `/`.
fn is_regular_tar_file<R: Read>(entry: &tar::Entry<'_, R>) -> bool {
    entry.header().entry_type().is_file() && !entry.path_bytes().ends_with(b"/")
}

fn safe_member_path(name: &str) -> Option<std::path::PathBuf> {
    match sanitize_relative_path(name) {
        Ok(relative) => Some(relative),
        Err(err) => {
            warn!(entry = name, error = ?err, "skipping unsafe archive entry");
            None
        }
    }
}

fn write_member(destination: &Path, relative: &Path, contents: &[u8]) -> FsOpsResult<()> {
    let target = destination.join(relative);
    if let Some(parent) = target.parent() {
        create_dir(parent)?;
    }
    fs::write(&target, contents)
        .map_err(|source| FsOpsError::io("extract.write_member", &target, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use imgest_test_support::fixtures::{
        JPEG_BYTES, PNG_BYTES, TarMember, files_under, gzip, tar_bytes, temp_root, zip_bytes,
    };
    use std::path::PathBuf;

    #[test]
    fn zip_extraction_keeps_only_images_in_archive_order() -> Result<()> {
        let temp = temp_root()?;
        let archive = zip_bytes(&[
            ("a.jpg", JPEG_BYTES),
            ("b.txt", b"notes"),
            ("sub/", &[]),
            ("sub/c.png", PNG_BYTES),
            ("UPPER.JPEG", JPEG_BYTES),
        ])?;
        let destination = temp.path().join("zip/bundle");

        let result = extract(&archive, ArchiveKind::Zip, &destination)?;
        assert_eq!(
            result.saved_relative_paths,
            vec!["a.jpg", "sub/c.png", "UPPER.JPEG"]
        );
        assert_eq!(result.destination_folder, destination);
        assert_eq!(result.count(), 3);
        assert_eq!(fs::read(destination.join("sub/c.png"))?, PNG_BYTES);
        assert!(!destination.join("b.txt").exists());
        Ok(())
    }

    #[test]
    fn zip_without_images_yields_empty_result() -> Result<()> {
        let temp = temp_root()?;
        let archive = zip_bytes(&[("readme.md", b"# hi")])?;
        let destination = temp.path().join("zip/docs");
        let result = extract(&archive, ArchiveKind::Zip, &destination)?;
        assert!(result.saved_relative_paths.is_empty());
        assert!(destination.is_dir());
        Ok(())
    }

    #[test]
    fn tar_extraction_skips_directories_and_links() -> Result<()> {
        let temp = temp_root()?;
        let archive = tar_bytes(&[
            TarMember::Dir("folder.jpg/"),
            TarMember::File("folder.jpg/inner.png", PNG_BYTES),
            TarMember::Symlink("link.jpg", "folder.jpg/inner.png"),
            TarMember::File("plain.jpeg", JPEG_BYTES),
            TarMember::File("skip.gif", b"GIF89a"),
        ])?;
        let destination = temp.path().join("tar/mixed");

        let result = extract(&archive, ArchiveKind::Tar, &destination)?;
        assert_eq!(
            result.saved_relative_paths,
            vec!["folder.jpg/inner.png", "plain.jpeg"]
        );
        assert_eq!(
            files_under(&destination),
            vec![
                PathBuf::from("folder.jpg/inner.png"),
                PathBuf::from("plain.jpeg")
            ]
        );
        Ok(())
    }

    #[test]
    fn gzip_compressed_tar_is_accepted() -> Result<()> {
        let temp = temp_root()?;
        let archive = gzip(&tar_bytes(&[TarMember::File("g.png", PNG_BYTES)])?)?;
        let result = extract(&archive, ArchiveKind::Tar, &temp.path().join("tar/gz"))?;
        assert_eq!(result.saved_relative_paths, vec!["g.png"]);
        Ok(())
    }

    #[test]
    fn traversal_entries_never_leave_the_destination() -> Result<()> {
        let temp = temp_root()?;
        let destination = temp.path().join("root/zip/evil");
        let zip_archive = zip_bytes(&[
            ("../escape.jpg", JPEG_BYTES),
            ("/abs.jpg", JPEG_BYTES),
            ("ok/../../up.png", PNG_BYTES),
            ("safe.jpg", JPEG_BYTES),
        ])?;
        let result = extract(&zip_archive, ArchiveKind::Zip, &destination)?;
        assert_eq!(result.saved_relative_paths, vec!["safe.jpg"]);

        let tar_destination = temp.path().join("root/tar/evil");
        let tar_archive = tar_bytes(&[
            TarMember::File("../../escape.jpg", JPEG_BYTES),
            TarMember::File("/etc/abs.png", PNG_BYTES),
            TarMember::File("nested/ok.png", PNG_BYTES),
        ])?;
        let result = extract(&tar_archive, ArchiveKind::Tar, &tar_destination)?;
        assert_eq!(result.saved_relative_paths, vec!["nested/ok.png"]);

        assert_eq!(
            files_under(temp.path()),
            vec![
                PathBuf::from("root/tar/evil/nested/ok.png"),
                PathBuf::from("root/zip/evil/safe.jpg"),
            ]
        );
        Ok(())
    }

    #[test]
    fn corrupt_containers_fail_and_leave_no_folder() -> Result<()> {
        let temp = temp_root()?;
        let garbage = b"definitely not an archive ".repeat(64);

        let zip_dest = temp.path().join("zip/broken");
        let err = extract(&garbage, ArchiveKind::Zip, &zip_dest)
            .err()
            .ok_or_else(|| anyhow!("expected zip failure"))?;
        assert!(err.is_corrupt_archive());
        assert!(!zip_dest.exists());

        let tar_dest = temp.path().join("tar/broken");
        let err = extract(&garbage, ArchiveKind::Tar, &tar_dest)
            .err()
            .ok_or_else(|| anyhow!("expected tar failure"))?;
        assert!(err.is_corrupt_archive());
        assert!(!tar_dest.exists());

        let err = extract(&[], ArchiveKind::Tar, &tar_dest)
            .err()
            .ok_or_else(|| anyhow!("expected empty tar failure"))?;
        assert!(err.is_corrupt_archive());
        Ok(())
    }

    #[test]
    fn list_entries_reports_kinds() -> Result<()> {
        let archive = tar_bytes(&[
            TarMember::Dir("d/"),
            TarMember::File("d/x.jpg", JPEG_BYTES),
        ])?;
        let entries = list_entries(&archive, ArchiveKind::Tar)?;
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_file);
        assert_eq!(entries[1].relative_path, "d/x.jpg");
        assert!(entries[1].is_file);

        let zipped = zip_bytes(&[("a/", &[]), ("a/b.png", PNG_BYTES)])?;
        let entries = list_entries(&zipped, ArchiveKind::Zip)?;
        assert_eq!(
            entries,
            vec![
                ArchiveEntry {
                    relative_path: "a/".to_string(),
                    is_file: false
                },
                ArchiveEntry {
                    relative_path: "a/b.png".to_string(),
                    is_file: true
                },
            ]
        );
        Ok(())
    }
}
