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

//! Environment-backed configuration for the ingestion service.
//!
//! Layout: `defaults.rs` (variable names and default values), `loader.rs`
//! (lookup-driven parsing), `model.rs` (typed settings), `error.rs`.

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;

pub use error::{ConfigError, ConfigResult};
pub use model::{DriveSettings, IngestConfig, LogFormatSetting, LoggingSettings};
