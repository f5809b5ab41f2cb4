//! `POST /upload` multipart handler.
//!
//! # Design
//! - The form is read completely before routing; fields arrive in any order.
//! - Unknown fields are ignored. A repeated `file` part is a 400. Empty file parts (a form submitted with no file
//!   chosen) are dropped before they reach the router.
//! - Body-limit violations surface as 413, every other multipart fault as 400.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use imgest_ingest::{IngestionReport, UploadKind, UploadPayload, UploadRequest, UploadedFile};
use tracing::{debug, warn};

use crate::http::errors::ApiError;
use crate::state::ApiState;

const FIELD_TYPE: &str = "type";
const FIELD_LINK: &str = "link";
const FIELD_FILES: &str = "files";
const FIELD_FILE: &str = "file";

pub(crate) async fn upload(
    State(state): State<Arc<ApiState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<IngestionReport>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!(error = %rejection, "upload is not a multipart form");
        ApiError::bad_request(rejection.body_text())
    })?;
    let request = UploadForm::read(&mut multipart).await?.into_request()?;
    let report = state.ingest.handle(request).await?;
    Ok(Json(report))
}

#[derive(Debug, Default)]
struct UploadForm {
    kind: Option<String>,
    link: Option<String>,
    files: Vec<UploadedFile>,
    file: Option<UploadedFile>,
}

impl UploadForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                FIELD_TYPE => form.kind = Some(field.text().await?),
                FIELD_LINK => form.link = Some(field.text().await?),
                FIELD_FILES => {
                    if let Some(file) = read_file(field).await? {
                        form.files.push(file);
                    }
                }
                FIELD_FILE => {
                    if let Some(file) = read_file(field).await? {
                        if form.file.is_some() {
                            warn!("upload carried more than one file part");
                            return Err(ApiError::bad_request("Only one file may be uploaded.")
                                .with_invalid_param(FIELD_FILE, "field must appear once"));
                        }
                        form.file = Some(file);
                    }
                }
                other => debug!(field = %other, "ignoring unknown form field"),
            }
        }
        Ok(form)
    }

    fn into_request(self) -> Result<UploadRequest, ApiError> {
        let kind = self
            .kind
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(UploadKind::from_form_type)
            .ok_or_else(|| {
                ApiError::bad_request("Upload type missing.")
                    .with_invalid_param(FIELD_TYPE, "field is required")
            })?;

        let payload = match kind {
            UploadKind::DriveFolder | UploadKind::DriveLink => self
                .link
                .filter(|link| !link.trim().is_empty())
                .map_or(UploadPayload::Missing, UploadPayload::Link),
            UploadKind::Image => {
                let mut files = self.files;
                files.extend(self.file);
                if files.is_empty() {
                    UploadPayload::Missing
                } else {
                    UploadPayload::Files(files)
                }
            }
            UploadKind::Zip | UploadKind::Tar | UploadKind::Opaque(_) => self
                .file
                .map_or(UploadPayload::Missing, |file| UploadPayload::Files(vec![file])),
        };
        Ok(UploadRequest::new(kind, payload))
    }
}

async fn read_file(field: Field<'_>) -> Result<Option<UploadedFile>, ApiError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(ToString::to_string);
    let bytes = field.bytes().await?;
    if file_name.is_empty() && bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(UploadedFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    }))
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            warn!(error = %err, "upload exceeded the body limit");
            Self::payload_too_large("Upload exceeds the configured size limit.")
        } else {
            warn!(error = %err, "malformed multipart body");
            Self::bad_request(err.body_text())
        }
    }
}
