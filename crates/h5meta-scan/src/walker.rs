//! Depth-first container traversal.
//!
//! The walker starts at the root group and visits members in the order the
//! container reports them. Each node becomes a [`NodeRecord`] in the
//! resulting [`MetadataRecord`], pushed before its children.
//!
//! Failures below the root are recorded on the affected node and the walk
//! continues. Only an unreadable root group aborts the walk.

use h5meta_container::traits::child_path;
use h5meta_container::{Container, ContainerError, Member, RawAttribute};
use h5meta_types::{
    AttributeRecord, FailureKind, MetadataRecord, NodeFailure, NodeRecord, ObjectKind,
};
use tracing::{debug, warn};

use crate::decoder;
use crate::error::{DecodeError, ScanError, ScanResult};
use crate::inspector;

/// Walks one container and collects its metadata.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContainerWalker;

impl ContainerWalker {
    pub fn new() -> Self {
        Self
    }

    /// Walk the whole tree of `container`.
    pub fn walk(&self, container: &dyn Container) -> ScanResult<MetadataRecord> {
        let members =
            container
                .group_members("/")
                .map_err(|source| ScanError::RootUnavailable {
                    path: container.source().to_string(),
                    source,
                })?;

        let mut record = MetadataRecord::new(container.source());
        let mut root = NodeRecord::new("/", None, ObjectKind::Group);
        collect_attributes(container, &mut root);
        record.push(root);
        self.visit_members(container, "/", members, &mut record);

        debug!(
            source = container.source(),
            nodes = record.len(),
            attributes = record.attribute_count(),
            failures = record.failure_count(),
            "walk complete"
        );
        Ok(record)
    }

    fn visit_members(
        &self,
        container: &dyn Container,
        group: &str,
        members: Vec<Member>,
        record: &mut MetadataRecord,
    ) {
        for member in members {
            let path = child_path(group, &member.name);
            debug!(path = %path, kind = %member.kind, "visiting member");
            match member.kind {
                ObjectKind::Group => self.visit_group(container, &path, group, record),
                ObjectKind::Dataset => record.push(visit_dataset(container, &path, group)),
                ObjectKind::NamedDatatype => record.push(visit_datatype(container, &path, group)),
                ObjectKind::Link => record.push(visit_link(container, &path, group)),
            }
        }
    }

    fn visit_group(
        &self,
        container: &dyn Container,
        path: &str,
        parent: &str,
        record: &mut MetadataRecord,
    ) {
        let mut node = NodeRecord::new(path, Some(parent.to_string()), ObjectKind::Group);
        match container.group_members(path) {
            Ok(members) => {
                collect_attributes(container, &mut node);
                record.push(node);
                self.visit_members(container, path, members, record);
            }
            Err(e) => {
                warn!(path, error = %e, "cannot open group");
                node.record_failure(open_failure(&e));
                record.push(node);
            }
        }
    }
}

fn visit_dataset(container: &dyn Container, path: &str, parent: &str) -> NodeRecord {
    let mut node = NodeRecord::new(path, Some(parent.to_string()), ObjectKind::Dataset);
    let info = match container.dataset_info(path) {
        Ok(info) => info,
        Err(e) => {
            warn!(path, error = %e, "cannot open dataset");
            node.record_failure(open_failure(&e));
            return node;
        }
    };

    if let Err(e) = decoder::classify(&info.datatype) {
        node.record_failure(e.to_failure());
    }
    let storage_size = info.storage_size;
    node.datatype = Some(info.datatype);
    node.dataspace = Some(info.dataspace);

    collect_attributes(container, &mut node);

    match inspector::inspect(container, path, storage_size) {
        Ok(properties) => node.properties = Some(properties),
        Err(e) => {
            warn!(path, error = %e, "cannot read dataset properties");
            node.record_failure(open_failure(&e));
        }
    }
    node
}

fn visit_datatype(container: &dyn Container, path: &str, parent: &str) -> NodeRecord {
    let mut node = NodeRecord::new(path, Some(parent.to_string()), ObjectKind::NamedDatatype);
    match container.named_datatype(path) {
        Ok(datatype) => {
            if let Err(e) = decoder::classify(&datatype) {
                node.record_failure(e.to_failure());
            }
            node.datatype = Some(datatype);
        }
        Err(e) => node.record_failure(open_failure(&e)),
    }
    node
}

/// Record the link target without following it.
fn visit_link(container: &dyn Container, path: &str, parent: &str) -> NodeRecord {
    let mut node = NodeRecord::new(path, Some(parent.to_string()), ObjectKind::Link);
    match container.link_value(path) {
        Ok(target) => {
            debug!(path, target = %target, "link");
            node.link_target = Some(target);
        }
        Err(e) => node.record_failure(open_failure(&e)),
    }
    node
}

/// Read and decode every attribute of the node. A failed read is recorded
/// and the remaining attributes are still read.
fn collect_attributes(container: &dyn Container, node: &mut NodeRecord) {
    let names = match container.attribute_names(&node.path) {
        Ok(names) => names,
        Err(e) => {
            node.record_failure(open_failure(&e));
            return;
        }
    };
    for name in names {
        match container.read_attribute(&node.path, &name) {
            Ok(raw) => node.attributes.push(decode_attribute(raw)),
            Err(e) => {
                warn!(path = %node.path, attribute = %name, error = %e, "cannot read attribute");
                node.record_failure(NodeFailure::new(
                    FailureKind::Io,
                    format!("attribute {name:?}: {e}"),
                ));
            }
        }
    }
}

fn decode_attribute(raw: RawAttribute) -> AttributeRecord {
    let counted = raw.dataspace.element_count();
    let decoded = match counted {
        Some(count) => decoder::decode(&raw.datatype, &raw.data, count),
        None => Err(DecodeError::ExtentOverflow {
            dataspace: raw.dataspace.to_string(),
        }),
    };
    let value = decoded.map_err(|e| {
        debug!(attribute = %raw.name, error = %e, "attribute not decoded");
        e.to_failure()
    });
    let element_count = counted.unwrap_or(u64::MAX);
    AttributeRecord {
        key: raw.name,
        datatype: raw.datatype,
        dataspace: raw.dataspace,
        element_count,
        value,
    }
}

fn open_failure(error: &ContainerError) -> NodeFailure {
    NodeFailure::new(FailureKind::Io, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use h5meta_container::{
        ContainerReader, ContainerResult, ContainerTree, DatasetInfo, DatasetNode, GroupNode,
        InMemoryContainerReader, RawFilter, RawProperties, TreeAttribute, TreeContainer,
    };
    use h5meta_types::{
        DatatypeClass, DatatypeDescriptor, Dataspace, DecodedValue, Filter,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Wraps a tree container and fails selected operations.
    struct FaultyContainer {
        inner: TreeContainer,
        broken: Vec<&'static str>,
        info_reads: AtomicUsize,
    }

    impl FaultyContainer {
        fn check(&self, path: &str) -> ContainerResult<()> {
            if self.broken.contains(&path) {
                Err(ContainerError::Corrupt {
                    path: path.to_string(),
                    reason: "bad object header".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    impl Container for FaultyContainer {
        fn source(&self) -> &str {
            self.inner.source()
        }
        fn group_members(&self, path: &str) -> ContainerResult<Vec<Member>> {
            self.check(path)?;
            self.inner.group_members(path)
        }
        fn attribute_names(&self, path: &str) -> ContainerResult<Vec<String>> {
            self.inner.attribute_names(path)
        }
        fn read_attribute(&self, path: &str, name: &str) -> ContainerResult<RawAttribute> {
            let key = format!("{path}@{name}");
            if self.broken.contains(&key.as_str()) {
                return Err(ContainerError::Corrupt {
                    path: key,
                    reason: "unreadable attribute".into(),
                });
            }
            self.inner.read_attribute(path, name)
        }
        fn dataset_info(&self, path: &str) -> ContainerResult<DatasetInfo> {
            self.info_reads.fetch_add(1, Ordering::SeqCst);
            self.check(path)?;
            self.inner.dataset_info(path)
        }
        fn dataset_properties(&self, path: &str) -> ContainerResult<RawProperties> {
            self.inner.dataset_properties(path)
        }
        fn named_datatype(&self, path: &str) -> ContainerResult<DatatypeDescriptor> {
            self.inner.named_datatype(path)
        }
        fn link_value(&self, path: &str) -> ContainerResult<String> {
            self.inner.link_value(path)
        }
    }

    fn open(tree: ContainerTree) -> Box<dyn Container> {
        let reader = InMemoryContainerReader::new();
        reader.insert("/data/f.h5", tree);
        reader.open("/data/f.h5").unwrap()
    }

    fn nested_tree() -> ContainerTree {
        ContainerTree::new(
            GroupNode::new().with_group(
                "grp",
                GroupNode::new()
                    .with_attribute(TreeAttribute::integers("count", &[3, -7, 0]))
                    .with_attribute(TreeAttribute::string("owner", "Peng"))
                    .with_dataset(
                        "dset",
                        DatasetNode::new(DatatypeDescriptor::integer(4), Dataspace::simple([5, 6]))
                            .with_properties(
                                RawProperties::chunked([2, 3]).with_filter(RawFilter::deflate(6)),
                            )
                            .with_attribute(TreeAttribute::floats("size", &[11.1])),
                    ),
            ),
        )
    }

    #[test]
    fn nested_group_and_dataset() {
        let container = open(nested_tree());
        let record = ContainerWalker::new().walk(container.as_ref()).unwrap();

        assert_eq!(record.len(), 3);
        assert_eq!(record.attribute_count(), 3);
        assert_eq!(record.failure_count(), 0);

        let paths: Vec<_> = record.nodes.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/grp", "/grp/dset"]);

        let grp = record.get("/grp").unwrap();
        assert_eq!(grp.parent.as_deref(), Some("/"));
        assert_eq!(grp.attributes.len(), 2);
        assert_eq!(grp.attribute("count").unwrap().value.as_ref().unwrap().text, "3 -7 0");
        assert_eq!(grp.attribute("owner").unwrap().value.as_ref().unwrap().text, "Peng");

        let dset = record.get("/grp/dset").unwrap();
        assert_eq!(dset.parent.as_deref(), Some("/grp"));
        assert_eq!(dset.kind, ObjectKind::Dataset);
        assert_eq!(dset.dataspace, Some(Dataspace::simple([5, 6])));
        let props = dset.properties.as_ref().unwrap();
        assert_eq!(props.chunk, Some(vec![2, 3]));
        assert!(props.filters.contains(&Filter::Deflate { level: 6 }));
        assert_eq!(dset.attribute("size").unwrap().value.as_ref().unwrap().text, "11.1");
    }

    #[test]
    fn links_are_recorded_not_followed() {
        // A link back to the root would loop forever if followed.
        let tree = ContainerTree::new(
            GroupNode::new()
                .with_group("a", GroupNode::new().with_link("up", "/"))
                .with_link("self", "/a"),
        );
        let record = ContainerWalker::new().walk(open(tree).as_ref()).unwrap();
        assert_eq!(record.len(), 4);
        let up = record.get("/a/up").unwrap();
        assert_eq!(up.kind, ObjectKind::Link);
        assert_eq!(up.link_target.as_deref(), Some("/"));
        assert_eq!(record.get("/self").unwrap().link_target.as_deref(), Some("/a"));
    }

    #[test]
    fn named_datatypes_are_classified() {
        let tree = ContainerTree::new(
            GroupNode::new()
                .with_datatype("compound_t", DatatypeDescriptor::new(DatatypeClass::Compound, 24))
                .with_datatype("odd_t", DatatypeDescriptor::new(DatatypeClass::Unsupported, 8)),
        );
        let record = ContainerWalker::new().walk(open(tree).as_ref()).unwrap();
        let compound = record.get("/compound_t").unwrap();
        assert_eq!(compound.kind, ObjectKind::NamedDatatype);
        assert!(compound.is_clean());
        let odd = record.get("/odd_t").unwrap();
        assert_eq!(odd.failures[0].kind, FailureKind::UnsupportedType);
    }

    #[test]
    fn decode_failures_are_inline() {
        let tree = ContainerTree::new(
            GroupNode::new()
                .with_attribute(TreeAttribute::raw(
                    "short",
                    DatatypeDescriptor::integer(4),
                    Dataspace::scalar(),
                    vec![1, 2, 3],
                ))
                .with_attribute(TreeAttribute::raw(
                    "ref",
                    DatatypeDescriptor::new(DatatypeClass::Unsupported, 8),
                    Dataspace::scalar(),
                    vec![0; 8],
                ))
                .with_attribute(TreeAttribute::integers("ok", &[1])),
        );
        let record = ContainerWalker::new().walk(open(tree).as_ref()).unwrap();
        let root = record.root().unwrap();
        assert_eq!(root.attributes.len(), 3);
        assert_eq!(
            root.attribute("short").unwrap().value.as_ref().unwrap_err().kind,
            FailureKind::MalformedAttribute
        );
        assert_eq!(
            root.attribute("ref").unwrap().value.as_ref().unwrap_err().kind,
            FailureKind::UnsupportedType
        );
        assert_eq!(
            root.attribute("ok").unwrap().value.as_ref().unwrap().value,
            DecodedValue::Integers(vec![1])
        );
        assert_eq!(record.failure_count(), 2);
    }

    #[test]
    fn broken_members_do_not_stop_the_walk() {
        let tree = ContainerTree::new(
            GroupNode::new()
                .with_group(
                    "bad_grp",
                    GroupNode::new().with_dataset(
                        "hidden",
                        DatasetNode::new(DatatypeDescriptor::integer(4), Dataspace::scalar()),
                    ),
                )
                .with_dataset(
                    "bad_dset",
                    DatasetNode::new(DatatypeDescriptor::integer(4), Dataspace::scalar()),
                )
                .with_dataset(
                    "good",
                    DatasetNode::new(DatatypeDescriptor::float(8), Dataspace::simple([2]))
                        .with_attribute(TreeAttribute::integers("a", &[1]))
                        .with_attribute(TreeAttribute::integers("b", &[2])),
                ),
        );
        let container = FaultyContainer {
            inner: TreeContainer::new("/data/f.h5", Arc::new(tree)),
            broken: vec!["/bad_grp", "/bad_dset", "/good@a"],
            info_reads: AtomicUsize::new(0),
        };
        let record = ContainerWalker::new().walk(&container).unwrap();

        let paths: Vec<_> = record.nodes.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/bad_grp", "/bad_dset", "/good"]);
        assert_eq!(record.get("/bad_grp").unwrap().failures[0].kind, FailureKind::Io);
        assert_eq!(record.get("/bad_dset").unwrap().failures.len(), 1);

        let good = record.get("/good").unwrap();
        assert_eq!(good.attributes.len(), 1);
        assert_eq!(good.attributes[0].key, "b");
        assert_eq!(good.failures.len(), 1);
        assert!(good.properties.is_some());
        // One header read per dataset.
        assert_eq!(container.info_reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn oversized_attributes_are_malformed_inline() {
        let tree = ContainerTree::new(
            GroupNode::new()
                .with_attribute(TreeAttribute::raw(
                    "huge",
                    DatatypeDescriptor::integer(4),
                    Dataspace::simple([1 << 40, 1 << 40]),
                    vec![0; 4],
                ))
                .with_attribute(TreeAttribute::raw(
                    "blank",
                    DatatypeDescriptor::string(0),
                    Dataspace::simple([1 << 61]),
                    Vec::new(),
                ))
                .with_attribute(TreeAttribute::string("owner", "Peng")),
        );
        let record = ContainerWalker::new().walk(open(tree).as_ref()).unwrap();
        let root = record.root().unwrap();

        let huge = root.attribute("huge").unwrap();
        assert_eq!(huge.element_count, u64::MAX);
        let failure = huge.value.as_ref().unwrap_err();
        assert_eq!(failure.kind, FailureKind::MalformedAttribute);
        assert!(failure.message.contains("too many elements"));

        let blank = root.attribute("blank").unwrap();
        assert_eq!(
            blank.value.as_ref().unwrap_err().kind,
            FailureKind::MalformedAttribute
        );
        assert_eq!(root.attribute("owner").unwrap().value.as_ref().unwrap().text, "Peng");
        assert_eq!(record.failure_count(), 2);
    }

    #[test]
    fn unreadable_root_is_fatal() {
        let container = FaultyContainer {
            inner: TreeContainer::new("/data/f.h5", Arc::new(ContainerTree::default())),
            broken: vec!["/"],
            info_reads: AtomicUsize::new(0),
        };
        let err = ContainerWalker::new().walk(&container).unwrap_err();
        assert!(matches!(err, ScanError::RootUnavailable { ref path, .. } if path == "/data/f.h5"));
    }

    #[test]
    fn empty_container_has_only_root() {
        let record = ContainerWalker::new()
            .walk(open(ContainerTree::default()).as_ref())
            .unwrap();
        assert_eq!(record.len(), 1);
        assert!(record.root().unwrap().parent.is_none());
    }
}
