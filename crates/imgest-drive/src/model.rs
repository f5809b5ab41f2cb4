//! Wire and result types for Drive calls.

use serde::{Deserialize, Serialize};

use crate::content::ContentKind;

/// A file reference produced by a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFileRef {
    /// Drive file identifier.
    pub id: String,
    /// Original file name.
    pub name: String,
    /// MIME type reported by Drive.
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
}

/// One page of the `files.list` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileListPage {
    #[serde(default)]
    pub(crate) files: Vec<RemoteFileRef>,
    #[serde(default)]
    pub(crate) next_page_token: Option<String>,
}

/// Payload retrieved through the direct-download endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedFile {
    /// Synthesized `<id>.<ext>` file name.
    pub file_name: String,
    /// Resolved content kind.
    pub kind: ContentKind,
    /// Raw payload bytes.
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_page_decodes_drive_payload() -> Result<(), serde_json::Error> {
        let page: FileListPage = serde_json::from_str(
            r#"{
                "nextPageToken": "tok-2",
                "files": [
                    {"id": "a1", "name": "one.jpg", "mimeType": "image/jpeg"},
                    {"id": "b2", "name": "two.png", "mimeType": "image/png"}
                ]
            }"#,
        )?;
        assert_eq!(page.next_page_token.as_deref(), Some("tok-2"));
        assert_eq!(page.files.len(), 2);
        assert_eq!(page.files[1].mime_type, "image/png");
        Ok(())
    }

    #[test]
    fn list_page_tolerates_missing_fields() -> Result<(), serde_json::Error> {
        let page: FileListPage = serde_json::from_str("{}")?;
        assert!(page.files.is_empty());
        assert!(page.next_page_token.is_none());
        Ok(())
    }
}
