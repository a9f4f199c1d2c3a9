//! Container walking for h5meta.
//!
//! Three pieces turn an open [`Container`](h5meta_container::Container) into
//! a [`MetadataRecord`](h5meta_types::MetadataRecord):
//!
//! - [`decoder`] -- typed decoding of attribute bytes into canonical values
//! - [`inspector`] -- normalization of dataset creation properties
//! - [`walker`] -- depth-first traversal that ties the two together
//!
//! Per-node failures never abort a walk. They are kept on the affected node
//! so that a single unreadable attribute does not hide the rest of the file.

pub mod decoder;
pub mod error;
pub mod inspector;
pub mod walker;

pub use decoder::{classify, decode};
pub use error::{DecodeError, DecodeResult, ScanError, ScanResult};
pub use inspector::{inspect, normalize};
pub use walker::ContainerWalker;
