//! Foundation types for h5meta.
//!
//! Every other h5meta crate depends on `h5meta-types`. The crate holds the
//! shared vocabulary of a container walk: how a stored value is typed, how
//! it is shaped, how a dataset is laid out on disk, and the record a walk
//! produces for one container file.
//!
//! # Key Types
//!
//! - [`DatatypeDescriptor`] -- class tag, byte size, byte order and sign
//! - [`Dataspace`] -- rank and per-dimension extents
//! - [`PropertyRecord`] -- chunking, filter pipeline and fill policy of a dataset
//! - [`DecodedValue`] -- canonical typed value of an attribute
//! - [`MetadataRecord`] -- ordered node records produced by one walk

pub mod dataspace;
pub mod datatype;
pub mod property;
pub mod record;
pub mod value;

pub use dataspace::Dataspace;
pub use datatype::{ByteOrder, DatatypeClass, DatatypeDescriptor};
pub use property::{AllocTime, FillTime, Filter, LayoutKind, PropertyRecord};
pub use record::{
    AttributeRecord, FailureKind, MetadataRecord, NodeFailure, NodeRecord, ObjectKind,
};
pub use value::{Decoded, DecodedValue};
