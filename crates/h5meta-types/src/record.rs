//! The metadata record produced by walking one container file.
//!
//! The [`MetadataRecord`] keeps node records in visit order and indexes them
//! by their absolute path inside the container. Parent/child relationships
//! are kept as the parent path on each node.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataspace::Dataspace;
use crate::datatype::DatatypeDescriptor;
use crate::property::PropertyRecord;
use crate::value::Decoded;

/// Kind of a named object inside a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Group,
    Dataset,
    NamedDatatype,
    /// A symbolic link; its target is recorded, never followed.
    Link,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group => write!(f, "group"),
            Self::Dataset => write!(f, "dataset"),
            Self::NamedDatatype => write!(f, "named_datatype"),
            Self::Link => write!(f, "link"),
        }
    }
}

/// Category of a failure recorded inline in a metadata record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The object or attribute could not be opened or read.
    Io,
    /// The datatype class has no decoder.
    UnsupportedType,
    /// Declared size is inconsistent with the stored bytes.
    MalformedAttribute,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io => write!(f, "io"),
            Self::UnsupportedType => write!(f, "unsupported_type"),
            Self::MalformedAttribute => write!(f, "malformed_attribute"),
        }
    }
}

/// A failure recorded against a node instead of aborting the walk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl NodeFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for NodeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// One attribute attached to a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub key: String,
    pub datatype: DatatypeDescriptor,
    pub dataspace: Dataspace,
    /// Raw element count (product of the dataspace extents), saturated at
    /// `u64::MAX` when the extents overflow.
    pub element_count: u64,
    /// The decoded value, or the reason decoding failed.
    pub value: Result<Decoded, NodeFailure>,
}

impl AttributeRecord {
    pub fn is_decoded(&self) -> bool {
        self.value.is_ok()
    }
}

/// Everything collected for one visited object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Absolute path inside the container (`/` for the root group).
    pub path: String,
    /// Path of the containing group; `None` only for the root.
    pub parent: Option<String>,
    pub kind: ObjectKind,
    pub attributes: Vec<AttributeRecord>,
    /// Datatype of a dataset or named datatype.
    pub datatype: Option<DatatypeDescriptor>,
    /// Shape of a dataset.
    pub dataspace: Option<Dataspace>,
    /// Storage properties of a dataset.
    pub properties: Option<PropertyRecord>,
    /// Target of a link, as stored.
    pub link_target: Option<String>,
    pub failures: Vec<NodeFailure>,
}

impl NodeRecord {
    /// An empty record for a node of the given kind.
    pub fn new(path: impl Into<String>, parent: Option<String>, kind: ObjectKind) -> Self {
        Self {
            path: path.into(),
            parent,
            kind,
            attributes: Vec::new(),
            datatype: None,
            dataspace: None,
            properties: None,
            link_target: None,
            failures: Vec::new(),
        }
    }

    /// The last path component (empty for the root).
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeRecord> {
        self.attributes.iter().find(|a| a.key == key)
    }

    pub fn record_failure(&mut self, failure: NodeFailure) {
        self.failures.push(failure);
    }

    /// Returns `true` if neither the node nor any of its attributes failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.attributes.iter().all(AttributeRecord::is_decoded)
    }
}

/// Aggregate of one container walk.
///
/// Created by the walker, consumed once by the publisher.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MetadataRecord {
    /// Source path of the container file.
    pub source: String,
    /// Node records in visit order.
    pub nodes: Vec<NodeRecord>,
    #[serde(skip)]
    index: BTreeMap<String, usize>,
}

impl MetadataRecord {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            nodes: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Append a node record. A record for an already-visited path replaces
    /// the earlier one in place.
    pub fn push(&mut self, node: NodeRecord) {
        match self.index.get(&node.path) {
            Some(&pos) => self.nodes[pos] = node,
            None => {
                self.index.insert(node.path.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&NodeRecord> {
        self.index.get(path).map(|&pos| &self.nodes[pos])
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut NodeRecord> {
        self.index.get(path).map(|&pos| &mut self.nodes[pos])
    }

    /// The root group record, if the walk got that far.
    pub fn root(&self) -> Option<&NodeRecord> {
        self.get("/")
    }

    /// Direct children of `path`, in visit order.
    pub fn children<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a NodeRecord> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.parent.as_deref() == Some(path))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of attributes across all nodes.
    pub fn attribute_count(&self) -> usize {
        self.nodes.iter().map(|n| n.attributes.len()).sum()
    }

    /// Node failures plus attributes that failed to decode.
    pub fn failure_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| {
                n.failures.len() + n.attributes.iter().filter(|a| !a.is_decoded()).count()
            })
            .sum()
    }
}
