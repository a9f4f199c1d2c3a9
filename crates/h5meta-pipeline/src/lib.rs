//! Scan orchestration for h5meta.
//!
//! A run reads the manifest ([`catalog`]), keeps the entries its worker owns
//! ([`partition`]), and for each one walks the container, rewrites the source
//! path into the store namespace ([`translate`]) and publishes the result
//! ([`publish`]). [`runner`] launches one coordinated worker or a set of
//! local worker threads; [`summary`] counts what happened.
//!
//! # Design Rules
//!
//! 1. Workers share no mutable state; the catalog is read-only and the
//!    partition rule is pure.
//! 2. Within a worker, files are processed sequentially with one container
//!    open at a time.
//! 3. A failing file never stops its worker; manifest, partition and config
//!    errors stop the run.
//! 4. The metadata store is injected, never global.

pub mod catalog;
pub mod config;
pub mod error;
pub mod partition;
pub mod publish;
pub mod runner;
pub mod summary;
pub mod translate;
pub mod worker;

pub use catalog::{ManifestEntry, DEFAULT_EXTENSIONS, DEFAULT_MANIFEST};
pub use config::{ReaderKind, ScanConfig, StoreConfig};
pub use error::{
    CatalogError, CatalogResult, ConfigError, ConfigResult, PipelineError, PipelineResult,
    PublishError,
};
pub use partition::{assign, Partition};
pub use publish::{MetadataPublisher, PublishOutcome};
pub use runner::{run_coordinated, run_local};
pub use summary::{FileReport, FileStatus, RunSummary};
pub use translate::{translate, PathMapping};
pub use worker::Worker;
