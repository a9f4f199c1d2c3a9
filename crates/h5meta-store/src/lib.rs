//! Metadata store interface for h5meta.
//!
//! The publisher hands every scanned container to a [`MetadataStore`] at its
//! translated path: an entry is created, closed, and then the flattened
//! [`EntryMetadata`] of the walk is attached to it.
//!
//! # Storage Backends
//!
//! - [`InMemoryMetadataStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FsMetadataStore`] -- entries as files under a local directory, metadata
//!   in JSON sidecars
//!
//! # Design Rules
//!
//! 1. Entry paths are absolute and confined to the store namespace.
//! 2. Metadata attaches to an existing entry and replaces earlier metadata.
//! 3. Calls on disjoint paths may run concurrently.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod metadata;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsMetadataStore;
pub use memory::InMemoryMetadataStore;
pub use metadata::{escape_key_part, EntryMetadata, TaggedValue, ERROR_TAG};
pub use traits::{validate_path, EntryHandle, MetadataStore};
