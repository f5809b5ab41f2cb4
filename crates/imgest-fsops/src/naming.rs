//! Path safety and destination naming.
//!
//! # Design
//! - Every name that reaches the filesystem passes through this module first.
//! - Folder names collapse to a single safe segment; file names to their last component.
//! - Archive paths keep their subdirectories but never escape the destination.

use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::error::{FsOpsError, FsOpsResult};

/// Extensions (lowercase, without the dot) treated as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
/// Upper bound on generated folder name length.
pub const MAX_FOLDER_NAME_LEN: usize = 128;
const FALLBACK_FOLDER_NAME: &str = "upload";

/// Returns `true` when the name carries one of the [`IMAGE_EXTENSIONS`].
#[must_use]
pub fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Derive a single safe path segment from an archive stem or remote identifier.
#[must_use]
pub fn folder_name(base: &str) -> String {
    let mapped: String = base
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let mut name = mapped.trim_start_matches('.').to_string();
    name.truncate(MAX_FOLDER_NAME_LEN);
    if name.is_empty() || name.chars().all(|ch| ch == '_') {
        FALLBACK_FOLDER_NAME.to_string()
    } else {
        name
    }
}

/// Reduce a client- or remote-supplied file name to its final component.
///
/// Returns `None` when nothing usable remains (empty, `.` or `..`).
#[must_use]
pub fn file_name(name: &str) -> Option<String> {
    let normalised = name.replace('\\', "/");
    let last = normalised.rsplit('/').next().unwrap_or_default().trim();
    if last.is_empty() || last == "." || last == ".." || last.contains('\0') {
        return None;
    }
    Some(last.to_string())
}

/// Stem of an uploaded file name, used as the base of archive destinations.
#[must_use]
pub fn file_stem(name: &str) -> String {
    let last = file_name(name).unwrap_or_default();
    Path::new(&last)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Normalise an archive member path, rejecting absolute paths and parent traversal.
///
/// # Errors
///
/// Returns [`FsOpsError::InvalidInput`] when the entry is absolute, climbs out of
/// its root, or normalises to nothing.
pub fn sanitize_relative_path(entry: &str) -> FsOpsResult<PathBuf> {
    let unified = entry.replace('\\', "/");
    let path = Path::new(&unified);
    if path.is_absolute() || unified.starts_with('/') {
        return Err(FsOpsError::InvalidInput {
            field: "archive_entry",
            reason: "absolute_path",
            value: Some(entry.to_string()),
        });
    }

    let mut sanitized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => sanitized.push(segment),
            Component::CurDir => {}
            _ => {
                return Err(FsOpsError::InvalidInput {
                    field: "archive_entry",
                    reason: "invalid_segment",
                    value: Some(entry.to_string()),
                });
            }
        }
    }

    if sanitized.as_os_str().is_empty() {
        return Err(FsOpsError::InvalidInput {
            field: "archive_entry",
            reason: "empty",
            value: Some(entry.to_string()),
        });
    }
    Ok(sanitized)
}

/// Render a sanitized relative path with `/` separators for reports.
#[must_use]
pub fn display_relative(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Short request-scoped suffix for isolated destination folders.
#[must_use]
pub fn unique_suffix() -> String {
    let mut simple = Uuid::new_v4().simple().to_string();
    simple.truncate(8);
    simple
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_names_match_case_insensitively() {
        assert!(is_image_name("photo.JPG"));
        assert!(is_image_name("nested/dir/pic.jpeg"));
        assert!(is_image_name("x.png"));
        assert!(!is_image_name("anim.gif"));
        assert!(!is_image_name("jpg"));
        assert!(!is_image_name("notes.txt"));
    }

    #[test]
    fn folder_name_collapses_unsafe_characters() {
        assert_eq!(folder_name("holiday photos"), "holiday_photos");
        assert_eq!(folder_name("../../etc"), "_.._etc");
        assert_eq!(folder_name("1AbC-def_ghi"), "1AbC-def_ghi");
        assert_eq!(folder_name(""), "upload");
        assert_eq!(folder_name("///"), "upload");
        assert_eq!(folder_name("..."), "upload");
        assert_eq!(folder_name(&"a".repeat(400)).len(), MAX_FOLDER_NAME_LEN);
    }

    #[test]
    fn file_name_keeps_only_the_last_component() {
        assert_eq!(file_name("x.jpg").as_deref(), Some("x.jpg"));
        assert_eq!(file_name("../../x.jpg").as_deref(), Some("x.jpg"));
        assert_eq!(file_name("C:\\Users\\me\\x.png").as_deref(), Some("x.png"));
        assert_eq!(file_name("dir/"), None);
        assert_eq!(file_name(".."), None);
        assert_eq!(file_name(""), None);
    }

    #[test]
    fn file_stem_drops_directories_and_extension() {
        assert_eq!(file_stem("bundle.zip"), "bundle");
        assert_eq!(file_stem("dir/photos.tar"), "photos");
        assert_eq!(file_stem("noext"), "noext");
    }

    #[test]
    fn sanitize_relative_path_rejects_unsafe_inputs() -> FsOpsResult<()> {
        assert!(
            sanitize_relative_path("/abs/path.jpg").is_err(),
            "absolute entries should be rejected"
        );
        assert!(
            sanitize_relative_path("../escape.jpg").is_err(),
            "parent traversal should be rejected"
        );
        assert!(sanitize_relative_path("a/../../b.jpg").is_err());
        assert!(sanitize_relative_path("..\\win.jpg").is_err());
        assert!(sanitize_relative_path("./").is_err());
        let normalised = sanitize_relative_path("nested/./file.jpg")?;
        assert_eq!(normalised, PathBuf::from("nested/file.jpg"));
        assert_eq!(display_relative(&normalised), "nested/file.jpg");
        Ok(())
    }

    #[test]
    fn unique_suffix_is_short_hex() {
        let suffix = unique_suffix();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
