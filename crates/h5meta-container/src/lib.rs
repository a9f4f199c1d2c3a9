//! Read-only access to hierarchical container files.
//!
//! The container format itself is a black box to h5meta. This crate defines
//! the seam the walker reads through and ships two backends:
//!
//! - [`InMemoryContainerReader`] -- containers held as [`GroupNode`] trees,
//!   for tests and embedding
//! - [`JsonContainerReader`] -- containers described by JSON files on disk
//!
//! # Design Rules
//!
//! 1. Readers never write to a container.
//! 2. Dataset payloads are never exposed; only descriptors and properties.
//! 3. Links are reported with their stored target and never resolved.
//! 4. Creation properties are reported as raw format codes (see [`codes`]);
//!    normalizing them is the inspector's job.
//! 5. A container handle is closed when it is dropped.

pub mod codes;
pub mod error;
pub mod json;
pub mod memory;
pub mod traits;
pub mod tree;

pub use error::{ContainerError, ContainerResult};
pub use json::JsonContainerReader;
pub use memory::{InMemoryContainerReader, TreeContainer};
pub use traits::{
    Container, ContainerReader, DatasetInfo, Member, RawAttribute, RawFilter, RawProperties,
};
pub use tree::{ContainerTree, DatasetNode, GroupNode, TreeAttribute, TreeMember, TreeNode};
