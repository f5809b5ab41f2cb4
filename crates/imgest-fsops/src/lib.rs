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

//! Filesystem side of the ingestion pipeline.
//!
//! Layout: `naming.rs` (path safety and destination naming), `layout.rs`
//! (root directory layout and file writes), `archive.rs` (ZIP/TAR image
//! extraction), `model/` (archive and extraction value types), `error.rs`.

pub mod archive;
pub mod error;
pub mod layout;
pub mod model;
pub mod naming;

pub use archive::{extract, list_entries};
pub use error::{FsOpsError, FsOpsResult};
pub use layout::{IngestLayout, StorageKind, create_dir, write_file};
pub use model::{ArchiveEntry, ArchiveKind, ExtractionResult};
