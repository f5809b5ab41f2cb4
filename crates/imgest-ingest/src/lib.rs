#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

//! Upload routing for the ingestion pipeline.
//!
//! Layout: `model.rs` (requests and reports), `service.rs` (the router that
//! dispatches one upload to the archive extractor, the Drive source, or plain
//! file writes), `error.rs` (the failure taxonomy surfaced to callers).

pub mod error;
pub mod model;
pub mod service;

pub use error::{IngestError, IngestResult, PayloadField};
pub use model::{
    IngestionReport, STATUS_DRIVE_FILE, STATUS_DRIVE_FOLDER, STATUS_EXTRACTED, STATUS_FILE_SAVED,
    STATUS_IMAGES_UPLOADED, STATUS_NO_IMAGES, UploadKind, UploadPayload, UploadRequest,
    UploadedFile,
};
pub use service::IngestService;
