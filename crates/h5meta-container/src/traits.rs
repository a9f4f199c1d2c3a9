//! The [`ContainerReader`] and [`Container`] traits defining the read-only
//! container interface.
//!
//! Object paths are absolute within their container (`/`, `/grp`,
//! `/grp/dset`). Attributes are addressed by the path of the object they
//! are attached to plus their name.

use h5meta_types::{Dataspace, DatatypeDescriptor, ObjectKind};
use serde::{Deserialize, Serialize};

use crate::codes;
use crate::error::ContainerResult;

/// A member of a group as listed by the container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub kind: ObjectKind,
}

/// An attribute as stored: descriptors plus its raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawAttribute {
    pub name: String,
    pub datatype: DatatypeDescriptor,
    pub dataspace: Dataspace,
    pub data: Vec<u8>,
}

/// Descriptors of a dataset, without its payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetInfo {
    pub datatype: DatatypeDescriptor,
    pub dataspace: Dataspace,
    /// Bytes currently allocated for the payload in the file.
    pub storage_size: u64,
}

/// One filter of a dataset's pipeline as reported by the format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFilter {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub flags: u32,
    /// Filter parameters ("client data" values).
    #[serde(default)]
    pub client_data: Vec<u32>,
}

impl RawFilter {
    pub fn new(id: i32, name: impl Into<String>, client_data: Vec<u32>) -> Self {
        Self {
            id,
            name: name.into(),
            flags: 0,
            client_data,
        }
    }

    pub fn deflate(level: u32) -> Self {
        Self::new(codes::filter::DEFLATE, "deflate", vec![level])
    }

    pub fn shuffle() -> Self {
        Self::new(codes::filter::SHUFFLE, "shuffle", vec![])
    }

    pub fn fletcher32() -> Self {
        Self::new(codes::filter::FLETCHER32, "fletcher32", vec![])
    }

    pub fn szip(options_mask: u32, pixels_per_block: u32) -> Self {
        Self::new(
            codes::filter::SZIP,
            "szip",
            vec![options_mask, pixels_per_block],
        )
    }
}

/// Dataset creation properties as raw format codes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProperties {
    /// One of [`codes::layout`].
    pub layout: i32,
    /// Chunk dimensions; only meaningful when `layout` is chunked.
    pub chunk_dims: Vec<u64>,
    pub filters: Vec<RawFilter>,
    /// One of [`codes::alloc_time`].
    pub alloc_time: i32,
    /// One of [`codes::fill_time`].
    pub fill_time: i32,
    /// One of [`codes::fill_value`].
    pub fill_value_status: i32,
}

impl Default for RawProperties {
    fn default() -> Self {
        Self {
            layout: codes::layout::CONTIGUOUS,
            chunk_dims: Vec::new(),
            filters: Vec::new(),
            alloc_time: codes::alloc_time::DEFAULT,
            fill_time: codes::fill_time::IFSET,
            fill_value_status: codes::fill_value::DEFAULT,
        }
    }
}

impl RawProperties {
    /// Default properties with a chunked layout.
    pub fn chunked(dims: impl Into<Vec<u64>>) -> Self {
        Self {
            layout: codes::layout::CHUNKED,
            chunk_dims: dims.into(),
            ..Self::default()
        }
    }

    /// Append a filter to the pipeline.
    pub fn with_filter(mut self, filter: RawFilter) -> Self {
        self.filters.push(filter);
        self
    }
}

/// An open container file.
///
/// The handle is owned by one worker and closed when dropped.
pub trait Container: Send {
    /// Source path the container was opened from.
    fn source(&self) -> &str;

    /// List the members of the group at `path`, in container order.
    ///
    /// Fails if the group cannot be opened.
    fn group_members(&self, path: &str) -> ContainerResult<Vec<Member>>;

    /// Names of the attributes attached to the object at `path`, in
    /// creation order.
    fn attribute_names(&self, path: &str) -> ContainerResult<Vec<String>>;

    /// Read one attribute of the object at `path`.
    fn read_attribute(&self, path: &str, name: &str) -> ContainerResult<RawAttribute>;

    /// Datatype, dataspace and storage size of the dataset at `path`.
    fn dataset_info(&self, path: &str) -> ContainerResult<DatasetInfo>;

    /// Creation properties of the dataset at `path`.
    fn dataset_properties(&self, path: &str) -> ContainerResult<RawProperties>;

    /// Descriptor of the named datatype at `path`.
    fn named_datatype(&self, path: &str) -> ContainerResult<DatatypeDescriptor>;

    /// Stored target of the link at `path`. The target is not resolved.
    fn link_value(&self, path: &str) -> ContainerResult<String>;
}

/// Opens container files by source path.
pub trait ContainerReader: Send + Sync {
    /// Open the container at `path` read-only.
    fn open(&self, path: &str) -> ContainerResult<Box<dyn Container>>;
}

/// Join a member name onto its group path.
pub fn child_path(group: &str, name: &str) -> String {
    if group == "/" {
        format!("/{name}")
    } else {
        format!("{group}/{name}")
    }
}
