//! Content kinds accepted from direct Drive downloads.

use std::fmt;

const OCTET_STREAM: &str = "application/octet-stream";
const TAR_MAGIC_OFFSET: usize = 257;

/// Accepted payload kinds for a shared-file download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// JPEG image.
    Jpeg,
    /// PNG image.
    Png,
    /// ZIP archive.
    Zip,
    /// TAR archive (optionally gzip-compressed).
    Tar,
}

impl ContentKind {
    /// Map a MIME type (parameters ignored) onto an accepted kind.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "application/zip" | "application/x-zip-compressed" => Some(Self::Zip),
            "application/x-tar" | "application/tar" | "application/gzip"
            | "application/x-gzip" | "application/x-gtar" => Some(Self::Tar),
            _ => None,
        }
    }

    /// Identify a payload from its leading bytes.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if bytes.starts_with(b"PK\x03\x04") || bytes.starts_with(b"PK\x05\x06") {
            Some(Self::Zip)
        } else if bytes.starts_with(&[0x1F, 0x8B])
            || bytes
                .get(TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 5)
                .is_some_and(|magic| magic == b"ustar")
        {
            Some(Self::Tar)
        } else {
            None
        }
    }

    /// Resolve the kind of a download from its declared type, sniffing when
    /// the header is missing or generic.
    ///
    /// # Errors
    ///
    /// Returns the content type to report when nothing acceptable is found.
    pub fn resolve(declared: Option<&str>, bytes: &[u8]) -> Result<Self, String> {
        let declared = declared.map(str::trim).filter(|value| !value.is_empty());
        match declared {
            Some(mime) if !mime.to_ascii_lowercase().starts_with(OCTET_STREAM) => {
                Self::from_mime(mime).ok_or_else(|| mime.to_string())
            }
            _ => Self::sniff(bytes).ok_or_else(|| declared.unwrap_or(OCTET_STREAM).to_string()),
        }
    }

    /// File extension used for synthesized names.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Zip => "zip",
            Self::Tar => "tar",
        }
    }

    /// Whether the payload must be extracted rather than stored.
    #[must_use]
    pub const fn is_archive(self) -> bool {
        matches!(self, Self::Zip | Self::Tar)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_mapping_ignores_parameters_and_case() {
        assert_eq!(
            ContentKind::from_mime("Image/JPEG; charset=binary"),
            Some(ContentKind::Jpeg)
        );
        assert_eq!(ContentKind::from_mime("image/png"), Some(ContentKind::Png));
        assert_eq!(
            ContentKind::from_mime("application/x-zip-compressed"),
            Some(ContentKind::Zip)
        );
        assert_eq!(ContentKind::from_mime("application/x-tar"), Some(ContentKind::Tar));
        assert_eq!(ContentKind::from_mime("text/html"), None);
    }

    #[test]
    fn sniffing_recognises_magic_bytes() {
        assert_eq!(ContentKind::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ContentKind::Jpeg));
        assert_eq!(
            ContentKind::sniff(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
            Some(ContentKind::Png)
        );
        assert_eq!(ContentKind::sniff(b"PK\x03\x04rest"), Some(ContentKind::Zip));
        assert_eq!(ContentKind::sniff(&[0x1F, 0x8B, 0x08]), Some(ContentKind::Tar));

        let mut tar_header = vec![0_u8; 512];
        tar_header[257..262].copy_from_slice(b"ustar");
        assert_eq!(ContentKind::sniff(&tar_header), Some(ContentKind::Tar));

        assert_eq!(ContentKind::sniff(b"<html>"), None);
        assert_eq!(ContentKind::sniff(&[]), None);
    }

    #[test]
    fn resolve_prefers_declared_type_and_sniffs_generic_ones() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(ContentKind::resolve(Some("image/jpeg"), &png), Ok(ContentKind::Jpeg));
        assert_eq!(
            ContentKind::resolve(Some("application/octet-stream"), &png),
            Ok(ContentKind::Png)
        );
        assert_eq!(ContentKind::resolve(None, &png), Ok(ContentKind::Png));
        assert_eq!(
            ContentKind::resolve(Some("text/html; charset=utf-8"), b"<html>"),
            Err("text/html; charset=utf-8".to_string())
        );
        assert_eq!(
            ContentKind::resolve(None, b"plain"),
            Err("application/octet-stream".to_string())
        );
    }

    #[test]
    fn extensions_and_archive_flags() {
        assert_eq!(ContentKind::Jpeg.extension(), "jpg");
        assert!(!ContentKind::Png.is_archive());
        assert!(ContentKind::Zip.is_archive());
        assert_eq!(ContentKind::Tar.to_string(), "tar");
    }
}
