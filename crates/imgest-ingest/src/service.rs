//! Upload router.
//!
//! # Design
//! - One request is handled in a single sequential pass; remote downloads and
//!   writes happen one at a time in listing order.
//! - Filesystem work runs on the blocking pool so archive extraction never stalls
//!   the async runtime.
//! - Any failure fails the whole request. Files already written stay on disk.
//! - Per-request destination suffixes are opt-in; without them concurrent uploads
//!   that share a base name write into the same folder.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use imgest_drive::{ContentKind, DriveSource, LinkKind, LinkParser};
use imgest_fsops::naming::{file_name, file_stem, folder_name, is_image_name, unique_suffix};
use imgest_fsops::{ArchiveKind, IngestLayout, StorageKind, extract, write_file};
use imgest_telemetry::{IngestOutcome, Metrics, current_request_id, current_route};
use tokio::task;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::error::{IngestError, IngestResult, PayloadField};
use crate::model::{
    IngestionReport, STATUS_DRIVE_FILE, STATUS_DRIVE_FOLDER, STATUS_EXTRACTED, STATUS_FILE_SAVED,
    STATUS_IMAGES_UPLOADED, STATUS_NO_IMAGES, UploadKind, UploadPayload, UploadRequest,
    UploadedFile,
};

/// Routes uploads to the extractor, the Drive source, or plain writes.
#[derive(Clone)]
pub struct IngestService {
    layout: IngestLayout,
    drive: Arc<dyn DriveSource>,
    links: LinkParser,
    metrics: Metrics,
    isolate_destinations: bool,
}

impl IngestService {
    /// Build a router over an ingestion layout and a Drive source.
    #[must_use]
    pub fn new(
        layout: IngestLayout,
        drive: Arc<dyn DriveSource>,
        links: LinkParser,
        metrics: Metrics,
    ) -> Self {
        Self {
            layout,
            drive,
            links,
            metrics,
            isolate_destinations: false,
        }
    }

    /// Append a request-scoped suffix to every per-request destination folder.
    #[must_use]
    pub const fn with_isolated_destinations(mut self, enabled: bool) -> Self {
        self.isolate_destinations = enabled;
        self
    }

    /// Ingestion root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    /// Handle one upload end to end.
    ///
    /// # Errors
    ///
    /// Returns an [`IngestError`] describing the first failure encountered.
    pub async fn handle(&self, request: UploadRequest) -> IngestResult<IngestionReport> {
        let label = request.kind.as_str();
        let span = info_span!(
            "ingest.handle",
            kind = label,
            request_id = %current_request_id().unwrap_or_default(),
            route = %current_route().unwrap_or_default()
        );
        let result = self.dispatch(request).instrument(span.clone()).await;

        let _entered = span.enter();
        match &result {
            Ok(report) => {
                self.metrics.inc_ingest_request(label, IngestOutcome::Success);
                self.metrics.add_files_saved(label, report.saved_count());
                info!(
                    status = %report.status,
                    saved = report.saved_count(),
                    "upload ingested"
                );
            }
            Err(err) => {
                self.metrics.inc_ingest_request(label, err.outcome());
                if err.is_client_error() {
                    warn!(error = %err, "upload rejected");
                } else {
                    error!(error = %err, error_debug = ?err, "upload failed");
                }
            }
        }
        result
    }

    async fn dispatch(&self, request: UploadRequest) -> IngestResult<IngestionReport> {
        let UploadRequest { kind, payload } = request;
        match kind {
            UploadKind::DriveFolder => self.drive_folder(payload).await,
            UploadKind::DriveLink => self.drive_link(payload).await,
            UploadKind::Image => self.images(payload).await,
            UploadKind::Zip => self.archive(payload, ArchiveKind::Zip).await,
            UploadKind::Tar => self.archive(payload, ArchiveKind::Tar).await,
            UploadKind::Opaque(declared) => self.opaque(payload, &declared).await,
        }
    }

    async fn drive_folder(&self, payload: UploadPayload) -> IngestResult<IngestionReport> {
        let link = require_link(payload)?;
        let folder_id = self.links.parse_folder_id(&link)?;
        self.links.ensure_plausible(LinkKind::Folder, &folder_id)?;

        let listing = self.drive.list_images(&folder_id).await?;
        if listing.is_empty() {
            info!(folder_id = %folder_id, "drive folder has no images");
            return Ok(IngestionReport::status_only(STATUS_NO_IMAGES));
        }

        let destination = self.destination(StorageKind::Drive, &folder_id);
        let mut saved = Vec::with_capacity(listing.len());
        for remote in listing {
            let bytes = self.drive.download_file(&remote.id).await?;
            let name = file_name(&remote.name).unwrap_or_else(|| folder_name(&remote.id));
            write_blocking("drive.write", destination.clone(), name.clone(), bytes).await?;
            debug!(file_id = %remote.id, name = %name, "drive image stored");
            saved.push(name);
        }

        Ok(IngestionReport::files(
            STATUS_DRIVE_FOLDER,
            display(&destination),
            saved,
        ))
    }

    async fn drive_link(&self, payload: UploadPayload) -> IngestResult<IngestionReport> {
        let link = require_link(payload)?;
        let file_id = self.links.parse_file_id(&link)?;
        self.links.ensure_plausible(LinkKind::File, &file_id)?;

        let shared = self.drive.fetch_shared_file(&file_id).await?;
        let destination = self.destination(StorageKind::Drive, &file_id);
        match shared.kind {
            ContentKind::Zip => {
                extract_blocking(shared.bytes, ArchiveKind::Zip, destination).await
            }
            ContentKind::Tar => {
                extract_blocking(shared.bytes, ArchiveKind::Tar, destination).await
            }
            ContentKind::Jpeg | ContentKind::Png => {
                let name = folder_name(&shared.file_name);
                write_blocking("drive.write", destination.clone(), name.clone(), shared.bytes)
                    .await?;
                Ok(IngestionReport::files(
                    STATUS_DRIVE_FILE,
                    display(&destination),
                    vec![name],
                ))
            }
        }
    }

    async fn images(&self, payload: UploadPayload) -> IngestResult<IngestionReport> {
        let files = require_files(payload, PayloadField::Files)?;
        let directory = self.layout.kind_dir(StorageKind::Image);

        let selected: Vec<(String, Vec<u8>)> = files
            .into_iter()
            .filter_map(|file| {
                let name = file_name(&file.file_name).filter(|name| is_image_name(name));
                if name.is_none() {
                    debug!(file_name = %file.file_name, "skipping non-image upload");
                }
                name.map(|name| (name, file.bytes))
            })
            .collect();

        let target = directory.clone();
        let saved = run_blocking("image.write", move || {
            let mut saved = Vec::with_capacity(selected.len());
            for (name, bytes) in selected {
                write_file(&target, &name, &bytes).map_err(IngestError::storage("image.write"))?;
                saved.push(name);
            }
            Ok(saved)
        })
        .await?;

        Ok(IngestionReport::files(
            STATUS_IMAGES_UPLOADED,
            display(&directory),
            saved,
        ))
    }

    async fn archive(
        &self,
        payload: UploadPayload,
        kind: ArchiveKind,
    ) -> IngestResult<IngestionReport> {
        let file = require_single_file(payload)?;
        let storage = match kind {
            ArchiveKind::Zip => StorageKind::Zip,
            ArchiveKind::Tar => StorageKind::Tar,
        };
        let destination = self.destination(storage, &file_stem(&file.file_name));
        extract_blocking(file.bytes, kind, destination).await
    }

    async fn opaque(&self, payload: UploadPayload, declared: &str) -> IngestResult<IngestionReport> {
        let file = require_single_file(payload)?;
        let name = file_name(&file.file_name).unwrap_or_else(|| folder_name(""));
        let root = self.layout.root().to_path_buf();
        let path = write_blocking("opaque.write", root, name.clone(), file.bytes).await?;
        debug!(declared_type = declared, name = %name, "opaque upload stored");
        Ok(IngestionReport::stored(
            STATUS_FILE_SAVED,
            name,
            display(&path),
        ))
    }

    fn destination(&self, kind: StorageKind, base: &str) -> PathBuf {
        let suffix = self.isolate_destinations.then(unique_suffix);
        self.layout.destination(kind, base, suffix.as_deref())
    }
}

fn require_link(payload: UploadPayload) -> IngestResult<String> {
    match payload {
        UploadPayload::Link(link) if !link.trim().is_empty() => Ok(link),
        _ => Err(IngestError::MissingPayload {
            field: PayloadField::Link,
        }),
    }
}

fn require_files(payload: UploadPayload, field: PayloadField) -> IngestResult<Vec<UploadedFile>> {
    match payload {
        UploadPayload::Files(files) if !files.is_empty() => Ok(files),
        _ => Err(IngestError::MissingPayload { field }),
    }
}

fn require_single_file(payload: UploadPayload) -> IngestResult<UploadedFile> {
    require_files(payload, PayloadField::File)?
        .into_iter()
        .next()
        .ok_or(IngestError::MissingPayload {
            field: PayloadField::File,
        })
}

async fn run_blocking<T, F>(operation: &'static str, work: F) -> IngestResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> IngestResult<T> + Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|source| IngestError::Join { operation, source })?
}

async fn write_blocking(
    operation: &'static str,
    directory: PathBuf,
    name: String,
    bytes: Vec<u8>,
) -> IngestResult<PathBuf> {
    run_blocking(operation, move || {
        write_file(&directory, &name, &bytes).map_err(IngestError::storage(operation))
    })
    .await
}

async fn extract_blocking(
    bytes: Vec<u8>,
    kind: ArchiveKind,
    destination: PathBuf,
) -> IngestResult<IngestionReport> {
    let result = run_blocking("archive.extract", move || {
        extract(&bytes, kind, &destination).map_err(IngestError::extraction(kind))
    })
    .await?;
    Ok(IngestionReport::files(
        STATUS_EXTRACTED,
        display(&result.destination_folder),
        result.saved_relative_paths,
    ))
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
