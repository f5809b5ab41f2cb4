//! RFC9457-style API error wrapper and the upload error mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use imgest_drive::{DriveOperation, LinkKind};
use imgest_ingest::{IngestError, PayloadField};

use crate::http::constants::{
    PROBLEM_BAD_REQUEST, PROBLEM_INTERNAL, PROBLEM_PAYLOAD_TOO_LARGE, PROBLEM_UPSTREAM,
};
use crate::models::{ProblemDetails, ProblemInvalidParam};

/// Structured API error with optional RFC9457 fields.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) kind: &'static str,
    title: &'static str,
    detail: Option<String>,
    pub(crate) invalid_params: Option<Vec<ProblemInvalidParam>>,
}

impl ApiError {
    const fn new(status: StatusCode, kind: &'static str, title: &'static str) -> Self {
        Self {
            status,
            kind,
            title,
            detail: None,
            invalid_params: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub(crate) fn with_invalid_param(mut self, pointer: &str, message: impl Into<String>) -> Self {
        self.invalid_params
            .get_or_insert_with(Vec::new)
            .push(ProblemInvalidParam {
                pointer: pointer.to_string(),
                message: message.into(),
            });
        self
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            PROBLEM_INTERNAL,
            "internal server error",
        )
        .with_detail(message)
    }

    pub(crate) fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, PROBLEM_BAD_REQUEST, "bad request").with_detail(detail)
    }

    pub(crate) fn payload_too_large(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            PROBLEM_PAYLOAD_TOO_LARGE,
            "payload too large",
        )
        .with_detail(detail)
    }

    pub(crate) fn upstream(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            PROBLEM_UPSTREAM,
            "upstream request failed",
        )
        .with_detail(detail)
    }

    #[cfg(test)]
    pub(crate) fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl From<IngestError> for ApiError {
    fn from(error: IngestError) -> Self {
        match error {
            IngestError::MissingPayload { field } => {
                let detail = match field {
                    PayloadField::Link => "Drive link missing.",
                    PayloadField::Files => "No image files provided.",
                    PayloadField::File => "No valid input provided.",
                };
                Self::bad_request(detail).with_invalid_param(field.as_str(), "field is required")
            }
            IngestError::InvalidLink { kind } => {
                let detail = match kind {
                    LinkKind::Folder => "Invalid Drive folder link.",
                    LinkKind::File => "Invalid Drive file link.",
                };
                Self::bad_request(detail).with_invalid_param("link", "link not recognised")
            }
            IngestError::InvalidIdentifier { kind, .. } => {
                let detail = match kind {
                    LinkKind::Folder => "Invalid Drive folder ID.",
                    LinkKind::File => "Invalid Drive file ID.",
                };
                Self::bad_request(detail).with_invalid_param("link", "identifier too short")
            }
            IngestError::UnsupportedContentType { content_type } => {
                Self::bad_request(format!("Unsupported content type: {content_type}."))
            }
            IngestError::CorruptArchive { .. } => {
                Self::bad_request("Archive could not be read.")
                    .with_invalid_param("file", "archive could not be parsed")
            }
            IngestError::RemoteApi {
                operation, body, ..
            } => {
                if operation.is_download() {
                    Self::upstream(format!("Drive file download error: {body}"))
                } else {
                    Self::upstream(format!("Drive API error: {body}"))
                }
            }
            IngestError::RemoteTimeout { .. } => Self::upstream("Drive request timed out."),
            IngestError::Transport { .. } => Self::internal("remote request failed"),
            IngestError::Storage { .. } | IngestError::Join { .. } => {
                Self::internal("upload could not be stored")
            }
            IngestError::LinkParser { .. } => Self::internal("link parser unavailable"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ProblemDetails {
            kind: self.kind.to_string(),
            title: self.title.to_string(),
            status: self.status.as_u16(),
            detail: self.detail,
            invalid_params: self.invalid_params,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgest_drive::DriveError;
    use imgest_fsops::{ArchiveKind, FsOpsError};
    use std::io;

    #[test]
    fn link_errors_render_kind_specific_details() {
        let folder = ApiError::from(IngestError::InvalidLink {
            kind: LinkKind::Folder,
        });
        assert_eq!(folder.status, StatusCode::BAD_REQUEST);
        assert_eq!(folder.detail(), Some("Invalid Drive folder link."));
        assert_eq!(
            folder.invalid_params.as_ref().map(|params| params[0].pointer.as_str()),
            Some("link")
        );

        let file = ApiError::from(IngestError::InvalidIdentifier {
            kind: LinkKind::File,
            value: "short".to_string(),
        });
        assert_eq!(file.detail(), Some("Invalid Drive file ID."));
    }

    #[test]
    fn missing_payload_names_the_field() {
        let cases = [
            (PayloadField::Link, "Drive link missing."),
            (PayloadField::Files, "No image files provided."),
            (PayloadField::File, "No valid input provided."),
        ];
        for (field, detail) in cases {
            let error = ApiError::from(IngestError::MissingPayload { field });
            assert_eq!(error.detail(), Some(detail));
            assert_eq!(error.kind, PROBLEM_BAD_REQUEST);
        }
    }

    #[test]
    fn remote_failures_carry_upstream_bodies() {
        let listing = ApiError::from(IngestError::RemoteApi {
            operation: DriveOperation::ListImages,
            status: 403,
            body: "forbidden".to_string(),
        });
        assert_eq!(listing.status, StatusCode::BAD_REQUEST);
        assert_eq!(listing.kind, PROBLEM_UPSTREAM);
        assert_eq!(listing.detail(), Some("Drive API error: forbidden"));

        let download = ApiError::from(IngestError::RemoteApi {
            operation: DriveOperation::DownloadFile,
            status: 404,
            body: "gone".to_string(),
        });
        assert_eq!(download.detail(), Some("Drive file download error: gone"));

        let shared = ApiError::from(IngestError::RemoteApi {
            operation: DriveOperation::FetchSharedFile,
            status: 403,
            body: "quota".to_string(),
        });
        assert_eq!(shared.detail(), Some("Drive file download error: quota"));

        let timeout = ApiError::from(IngestError::RemoteTimeout {
            operation: DriveOperation::ListImages,
        });
        assert_eq!(timeout.detail(), Some("Drive request timed out."));

        let unsupported = ApiError::from(IngestError::UnsupportedContentType {
            content_type: "text/html".to_string(),
        });
        assert_eq!(
            unsupported.detail(),
            Some("Unsupported content type: text/html.")
        );
    }

    #[test]
    fn local_faults_become_opaque_internal_errors() {
        let storage = ApiError::from(IngestError::Storage {
            operation: "image.write",
            source: FsOpsError::Io {
                operation: "write_file",
                path: "/srv/uploads/image/x.jpg".into(),
                source: io::Error::other("disk full"),
            },
        });
        assert_eq!(storage.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(storage.detail(), Some("upload could not be stored"));

        let transport = ApiError::from(IngestError::Transport {
            source: DriveError::InvalidBaseUrl {
                url: "mailto:x".to_string(),
            },
        });
        assert_eq!(transport.status, StatusCode::INTERNAL_SERVER_ERROR);

        let corrupt = ApiError::from(IngestError::CorruptArchive {
            kind: ArchiveKind::Zip,
            source: FsOpsError::Tar {
                operation: "tar.entries",
                source: io::Error::other("bad header"),
            },
        });
        assert_eq!(corrupt.status, StatusCode::BAD_REQUEST);
        assert_eq!(corrupt.detail(), Some("Archive could not be read."));
    }

    #[test]
    fn problem_documents_render_with_type_and_status() {
        let response = ApiError::payload_too_large("too big").into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
