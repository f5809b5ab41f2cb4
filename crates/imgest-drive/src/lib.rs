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

//! Google Drive collaborators for the ingestion pipeline.
//!
//! Layout: `link.rs` (shared-link parsing and identifier plausibility),
//! `client.rs` (`DriveSource` trait and the `reqwest` backed `DriveClient`),
//! `content.rs` (accepted content kinds and byte sniffing), `model.rs`,
//! `error.rs`.

pub mod client;
pub mod content;
pub mod error;
pub mod link;
pub mod model;

pub use client::{DriveClient, DriveSource};
pub use content::ContentKind;
pub use error::{DriveError, DriveOperation, DriveResult, LinkError, LinkKind};
pub use link::{LinkParser, MIN_IDENTIFIER_LEN};
pub use model::{RemoteFileRef, SharedFile};
