//! Serializable container trees.
//!
//! A [`ContainerTree`] describes a whole container: the root group, its
//! members, their attributes (as raw bytes) and dataset creation properties.
//! Trees back both the in-memory reader and the JSON reader, and double as
//! the builder API for test fixtures.
//!
//! JSON shape:
//!
//! ```text
//! {
//!   "root": {
//!     "attributes": [{"name": "...", "datatype": {...}, "dataspace": {...}, "data": "<hex>"}],
//!     "members": [
//!       {"name": "grp",  "kind": "group", "attributes": [...], "members": [...]},
//!       {"name": "dset", "kind": "dataset", "datatype": {...}, "dataspace": {...},
//!        "properties": {...}, "storage_size": 120, "attributes": [...]},
//!       {"name": "t",    "kind": "datatype", "datatype": {...}},
//!       {"name": "l",    "kind": "link", "target": "/grp"}
//!     ]
//!   }
//! }
//! ```

use h5meta_types::{Dataspace, DatatypeDescriptor, ObjectKind};
use serde::{Deserialize, Serialize};

use crate::traits::{RawAttribute, RawProperties};

/// A complete container description.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerTree {
    #[serde(default)]
    pub root: GroupNode,
}

impl ContainerTree {
    pub fn new(root: GroupNode) -> Self {
        Self { root }
    }
}

/// An attribute with its raw stored bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeAttribute {
    pub name: String,
    pub datatype: DatatypeDescriptor,
    #[serde(default)]
    pub dataspace: Dataspace,
    #[serde(with = "hex_bytes", default)]
    pub data: Vec<u8>,
}

impl TreeAttribute {
    pub fn raw(
        name: impl Into<String>,
        datatype: DatatypeDescriptor,
        dataspace: Dataspace,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            datatype,
            dataspace,
            data,
        }
    }

    /// 4-byte signed little-endian integers; scalar for one value.
    pub fn integers(name: impl Into<String>, values: &[i32]) -> Self {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::raw(
            name,
            DatatypeDescriptor::integer(4),
            shape_for(values.len()),
            data,
        )
    }

    /// 4-byte little-endian floats; scalar for one value.
    pub fn floats(name: impl Into<String>, values: &[f32]) -> Self {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::raw(
            name,
            DatatypeDescriptor::float(4),
            shape_for(values.len()),
            data,
        )
    }

    /// A scalar fixed-size string sized to the value.
    pub fn string(name: impl Into<String>, value: &str) -> Self {
        Self::raw(
            name,
            DatatypeDescriptor::string(value.len()),
            Dataspace::scalar(),
            value.as_bytes().to_vec(),
        )
    }

    pub(crate) fn to_raw(&self) -> RawAttribute {
        RawAttribute {
            name: self.name.clone(),
            datatype: self.datatype,
            dataspace: self.dataspace.clone(),
            data: self.data.clone(),
        }
    }
}

fn shape_for(len: usize) -> Dataspace {
    if len == 1 {
        Dataspace::scalar()
    } else {
        Dataspace::simple([len as u64])
    }
}

/// A group: attributes plus ordered members.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupNode {
    #[serde(default)]
    pub attributes: Vec<TreeAttribute>,
    #[serde(default)]
    pub members: Vec<TreeMember>,
}

impl GroupNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, attribute: TreeAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_member(mut self, name: impl Into<String>, node: TreeNode) -> Self {
        self.members.push(TreeMember {
            name: name.into(),
            node,
        });
        self
    }

    pub fn with_group(self, name: impl Into<String>, group: GroupNode) -> Self {
        self.with_member(name, TreeNode::Group(group))
    }

    pub fn with_dataset(self, name: impl Into<String>, dataset: DatasetNode) -> Self {
        self.with_member(name, TreeNode::Dataset(dataset))
    }

    pub fn with_datatype(self, name: impl Into<String>, datatype: DatatypeDescriptor) -> Self {
        self.with_member(name, TreeNode::Datatype { datatype })
    }

    pub fn with_link(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.with_member(
            name,
            TreeNode::Link {
                target: target.into(),
            },
        )
    }

    pub fn member(&self, name: &str) -> Option<&TreeNode> {
        self.members.iter().find(|m| m.name == name).map(|m| &m.node)
    }
}

/// A dataset: descriptors, properties and attributes. The payload is not
/// part of the description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetNode {
    pub datatype: DatatypeDescriptor,
    #[serde(default)]
    pub dataspace: Dataspace,
    #[serde(default)]
    pub properties: RawProperties,
    #[serde(default)]
    pub storage_size: u64,
    #[serde(default)]
    pub attributes: Vec<TreeAttribute>,
}

impl DatasetNode {
    pub fn new(datatype: DatatypeDescriptor, dataspace: Dataspace) -> Self {
        let storage_size = dataspace
            .element_count()
            .and_then(|count| count.checked_mul(datatype.size as u64))
            .unwrap_or(u64::MAX);
        Self {
            datatype,
            dataspace,
            properties: RawProperties::default(),
            storage_size,
            attributes: Vec::new(),
        }
    }

    pub fn with_properties(mut self, properties: RawProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_attribute(mut self, attribute: TreeAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// Any object a group can hold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Group(GroupNode),
    Dataset(DatasetNode),
    Datatype { datatype: DatatypeDescriptor },
    Link { target: String },
}

impl TreeNode {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Group(_) => ObjectKind::Group,
            Self::Dataset(_) => ObjectKind::Dataset,
            Self::Datatype { .. } => ObjectKind::NamedDatatype,
            Self::Link { .. } => ObjectKind::Link,
        }
    }
}

/// A named member of a group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeMember {
    pub name: String,
    #[serde(flatten)]
    pub node: TreeNode,
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_attribute_bytes() {
        let attr = TreeAttribute::integers("vals", &[3, -7, 0]);
        assert_eq!(attr.data.len(), 12);
        assert_eq!(attr.dataspace, Dataspace::simple([3]));
        assert_eq!(&attr.data[4..8], &(-7i32).to_le_bytes());
    }

    #[test]
    fn single_value_is_scalar() {
        let attr = TreeAttribute::floats("size", &[11.1]);
        assert!(attr.dataspace.is_scalar());
        assert_eq!(attr.datatype, DatatypeDescriptor::float(4));
    }

    #[test]
    fn dataset_storage_size_from_shape() {
        let dset = DatasetNode::new(DatatypeDescriptor::integer(4), Dataspace::simple([5, 6]));
        assert_eq!(dset.storage_size, 120);
    }

    #[test]
    fn oversized_dataset_saturates_storage_size() {
        let shape = Dataspace::simple([1 << 40, 1 << 40]);
        let dset = DatasetNode::new(DatatypeDescriptor::integer(4), shape);
        assert_eq!(dset.storage_size, u64::MAX);
    }

    #[test]
    fn json_roundtrip_keeps_order_and_kinds() {
        let tree = ContainerTree::new(
            GroupNode::new()
                .with_attribute(TreeAttribute::string("owner", "Peng"))
                .with_group("grp", GroupNode::new())
                .with_dataset(
                    "dset",
                    DatasetNode::new(DatatypeDescriptor::float(8), Dataspace::simple([4])),
                )
                .with_datatype("t", DatatypeDescriptor::integer(2))
                .with_link("l", "/grp"),
        );
        let json = serde_json::to_string(&tree).unwrap();
        assert!(json.contains(r#""data":"50656e67""#));
        let parsed: ContainerTree = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tree);
        let kinds: Vec<_> = parsed.root.members.iter().map(|m| m.node.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ObjectKind::Group,
                ObjectKind::Dataset,
                ObjectKind::NamedDatatype,
                ObjectKind::Link
            ]
        );
    }

    #[test]
    fn bad_hex_is_rejected() {
        let json = r#"{"name":"x","datatype":{"class":"opaque","size":1},"data":"zz"}"#;
        assert!(serde_json::from_str::<TreeAttribute>(json).is_err());
    }
}
