use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use h5meta_types::{DatatypeDescriptor, ObjectKind};

use crate::error::{ContainerError, ContainerResult};
use crate::traits::{
    Container, ContainerReader, DatasetInfo, Member, RawAttribute, RawProperties,
};
use crate::tree::{ContainerTree, DatasetNode, GroupNode, TreeAttribute, TreeNode};

/// A container backed by an in-memory [`ContainerTree`].
///
/// Path resolution walks group members by name and never passes through a
/// link.
#[derive(Clone, Debug)]
pub struct TreeContainer {
    source: String,
    tree: Arc<ContainerTree>,
}

/// A resolved object inside the tree.
enum Resolved<'a> {
    Root(&'a GroupNode),
    Node(&'a TreeNode),
}

impl<'a> Resolved<'a> {
    fn kind(&self) -> ObjectKind {
        match self {
            Self::Root(_) => ObjectKind::Group,
            Self::Node(node) => node.kind(),
        }
    }
}

impl TreeContainer {
    pub fn new(source: impl Into<String>, tree: Arc<ContainerTree>) -> Self {
        Self {
            source: source.into(),
            tree,
        }
    }

    fn resolve(&self, path: &str) -> ContainerResult<Resolved<'_>> {
        let not_found = || ContainerError::NotFound {
            path: path.to_string(),
        };
        if !path.starts_with('/') {
            return Err(not_found());
        }
        let mut current = Resolved::Root(&self.tree.root);
        for component in path.split('/').filter(|c| !c.is_empty()) {
            let group = match current {
                Resolved::Root(group) | Resolved::Node(TreeNode::Group(group)) => group,
                _ => return Err(not_found()),
            };
            current = Resolved::Node(group.member(component).ok_or_else(not_found)?);
        }
        Ok(current)
    }

    fn group(&self, path: &str) -> ContainerResult<&GroupNode> {
        match self.resolve(path)? {
            Resolved::Root(group) | Resolved::Node(TreeNode::Group(group)) => Ok(group),
            other => Err(wrong_kind(path, ObjectKind::Group, other.kind())),
        }
    }

    fn dataset(&self, path: &str) -> ContainerResult<&DatasetNode> {
        match self.resolve(path)? {
            Resolved::Node(TreeNode::Dataset(dataset)) => Ok(dataset),
            other => Err(wrong_kind(path, ObjectKind::Dataset, other.kind())),
        }
    }

    fn attributes(&self, path: &str) -> ContainerResult<&[TreeAttribute]> {
        match self.resolve(path)? {
            Resolved::Root(group) | Resolved::Node(TreeNode::Group(group)) => {
                Ok(&group.attributes)
            }
            Resolved::Node(TreeNode::Dataset(dataset)) => Ok(&dataset.attributes),
            Resolved::Node(TreeNode::Datatype { .. } | TreeNode::Link { .. }) => Ok(&[]),
        }
    }
}

fn wrong_kind(path: &str, expected: ObjectKind, found: ObjectKind) -> ContainerError {
    ContainerError::WrongKind {
        path: path.to_string(),
        expected,
        found,
    }
}

impl Container for TreeContainer {
    fn source(&self) -> &str {
        &self.source
    }

    fn group_members(&self, path: &str) -> ContainerResult<Vec<Member>> {
        let group = self.group(path)?;
        Ok(group
            .members
            .iter()
            .map(|m| Member {
                name: m.name.clone(),
                kind: m.node.kind(),
            })
            .collect())
    }

    fn attribute_names(&self, path: &str) -> ContainerResult<Vec<String>> {
        Ok(self
            .attributes(path)?
            .iter()
            .map(|a| a.name.clone())
            .collect())
    }

    fn read_attribute(&self, path: &str, name: &str) -> ContainerResult<RawAttribute> {
        self.attributes(path)?
            .iter()
            .find(|a| a.name == name)
            .map(TreeAttribute::to_raw)
            .ok_or_else(|| ContainerError::AttributeNotFound {
                object: path.to_string(),
                name: name.to_string(),
            })
    }

    fn dataset_info(&self, path: &str) -> ContainerResult<DatasetInfo> {
        let dataset = self.dataset(path)?;
        Ok(DatasetInfo {
            datatype: dataset.datatype,
            dataspace: dataset.dataspace.clone(),
            storage_size: dataset.storage_size,
        })
    }

    fn dataset_properties(&self, path: &str) -> ContainerResult<RawProperties> {
        Ok(self.dataset(path)?.properties.clone())
    }

    fn named_datatype(&self, path: &str) -> ContainerResult<DatatypeDescriptor> {
        match self.resolve(path)? {
            Resolved::Node(TreeNode::Datatype { datatype }) => Ok(*datatype),
            other => Err(wrong_kind(path, ObjectKind::NamedDatatype, other.kind())),
        }
    }

    fn link_value(&self, path: &str) -> ContainerResult<String> {
        match self.resolve(path)? {
            Resolved::Node(TreeNode::Link { target }) => Ok(target.clone()),
            other => Err(wrong_kind(path, ObjectKind::Link, other.kind())),
        }
    }
}

/// In-memory reader mapping source paths to container trees.
///
/// Intended for tests and embedding. Trees are shared behind `Arc`, so
/// opening a container does not copy it.
pub struct InMemoryContainerReader {
    containers: RwLock<HashMap<String, Arc<ContainerTree>>>,
}

impl InMemoryContainerReader {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
        }
    }

    /// Register (or replace) the container at `path`.
    pub fn insert(&self, path: impl Into<String>, tree: ContainerTree) {
        self.containers
            .write()
            .expect("lock poisoned")
            .insert(path.into(), Arc::new(tree));
    }

    pub fn len(&self) -> usize {
        self.containers.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryContainerReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerReader for InMemoryContainerReader {
    fn open(&self, path: &str) -> ContainerResult<Box<dyn Container>> {
        let map = self.containers.read().expect("lock poisoned");
        let tree = map.get(path).cloned().ok_or_else(|| {
            ContainerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no container at {path}"),
            ))
        })?;
        Ok(Box::new(TreeContainer::new(path, tree)))
    }
}

impl std::fmt::Debug for InMemoryContainerReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContainerReader")
            .field("container_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RawFilter;
    use h5meta_types::Dataspace;

    fn sample_tree() -> ContainerTree {
        ContainerTree::new(
            GroupNode::new()
                .with_attribute(TreeAttribute::string("owner", "Peng"))
                .with_group(
                    "grp",
                    GroupNode::new()
                        .with_attribute(TreeAttribute::integers("a", &[1]))
                        .with_dataset(
                            "dset",
                            DatasetNode::new(
                                DatatypeDescriptor::integer(4),
                                Dataspace::simple([5, 6]),
                            )
                            .with_properties(
                                RawProperties::chunked([2, 3]).with_filter(RawFilter::deflate(6)),
                            )
                            .with_attribute(TreeAttribute::integers("Temperature", &[41])),
                        ),
                )
                .with_datatype("t", DatatypeDescriptor::float(8))
                .with_link("back", "/grp"),
        )
    }

    fn open_sample() -> Box<dyn Container> {
        let reader = InMemoryContainerReader::new();
        reader.insert("/data/a.h5", sample_tree());
        reader.open("/data/a.h5").unwrap()
    }

    #[test]
    fn lists_members_in_order() {
        let c = open_sample();
        let names: Vec<_> = c
            .group_members("/")
            .unwrap()
            .into_iter()
            .map(|m| (m.name, m.kind))
            .collect();
        assert_eq!(
            names,
            vec![
                ("grp".to_string(), ObjectKind::Group),
                ("t".to_string(), ObjectKind::NamedDatatype),
                ("back".to_string(), ObjectKind::Link),
            ]
        );
    }

    #[test]
    fn reads_nested_dataset() {
        let c = open_sample();
        let info = c.dataset_info("/grp/dset").unwrap();
        assert_eq!(info.dataspace.element_count(), Some(30));
        let props = c.dataset_properties("/grp/dset").unwrap();
        assert_eq!(props.chunk_dims, vec![2, 3]);
        let attr = c.read_attribute("/grp/dset", "Temperature").unwrap();
        assert_eq!(attr.data, 41i32.to_le_bytes().to_vec());
    }

    #[test]
    fn root_attributes_and_link_value() {
        let c = open_sample();
        assert_eq!(c.attribute_names("/").unwrap(), vec!["owner".to_string()]);
        assert_eq!(c.link_value("/back").unwrap(), "/grp");
        assert_eq!(c.named_datatype("/t").unwrap(), DatatypeDescriptor::float(8));
        assert!(c.attribute_names("/back").unwrap().is_empty());
    }

    #[test]
    fn wrong_kind_and_missing_paths() {
        let c = open_sample();
        assert!(matches!(
            c.dataset_info("/grp"),
            Err(ContainerError::WrongKind { .. })
        ));
        assert!(matches!(
            c.group_members("/nope"),
            Err(ContainerError::NotFound { .. })
        ));
        // Resolution never passes through a link.
        assert!(matches!(
            c.group_members("/back/dset"),
            Err(ContainerError::NotFound { .. })
        ));
        assert!(matches!(
            c.read_attribute("/", "missing"),
            Err(ContainerError::AttributeNotFound { .. })
        ));
    }

    #[test]
    fn open_unknown_path_is_io_error() {
        let reader = InMemoryContainerReader::new();
        assert!(matches!(
            reader.open("/missing.h5"),
            Err(ContainerError::Io(_))
        ));
    }
}
