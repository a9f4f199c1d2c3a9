//! The flat metadata mapping attached to a store entry.
//!
//! A [`MetadataRecord`] is flattened into string keys:
//!
//! ```text
//! <node path>@<attribute key>   attribute value, tagged with its class label
//! <node path>#<property>        node data: kind, datatype, dataspace, chunk,
//!                               filters, layout, alloc_time, fill_time,
//!                               fill_value_defined, storage_size,
//!                               link_target, error
//! ```
//!
//! An attribute that failed to decode is kept with the `error` tag and the
//! failure message as its value.
//!
//! `%`, `@` and `#` inside node paths and attribute keys are percent-encoded
//! (`%25`, `%40`, `%23`), so separators in a key are always the ones added by
//! the flattening.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use h5meta_types::{MetadataRecord, NodeRecord};
use serde::{Deserialize, Serialize};

/// Domain tag mixed into every metadata digest.
const DIGEST_DOMAIN: &[u8] = b"h5meta-metadata-v1:";

/// Type tag of a value whose source failed to read or decode.
pub const ERROR_TAG: &str = "error";

/// One value of the mapping with its type tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedValue {
    pub type_tag: String,
    pub value: String,
}

impl TaggedValue {
    pub fn new(type_tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            value: value.into(),
        }
    }
}

/// Metadata attached to one store entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Source path of the container the metadata was extracted from.
    pub source: String,
    pub extracted_at: DateTime<Utc>,
    /// Hex BLAKE3 digest over `entries`; the timestamp is excluded.
    pub digest: String,
    pub entries: BTreeMap<String, TaggedValue>,
}

impl EntryMetadata {
    /// Build metadata from explicit entries.
    pub fn new(source: impl Into<String>, entries: BTreeMap<String, TaggedValue>) -> Self {
        Self {
            source: source.into(),
            extracted_at: Utc::now(),
            digest: digest(&entries),
            entries,
        }
    }

    /// Flatten a walk result.
    pub fn from_record(record: &MetadataRecord) -> Self {
        let mut entries = BTreeMap::new();
        for node in &record.nodes {
            flatten_node(node, &mut entries);
        }
        Self::new(record.source.clone(), entries)
    }

    pub fn get(&self, key: &str) -> Option<&TaggedValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if the stored digest matches the entries.
    pub fn verify_digest(&self) -> bool {
        self.digest == digest(&self.entries)
    }

    /// Number of values tagged as errors.
    pub fn error_count(&self) -> usize {
        self.entries
            .values()
            .filter(|v| v.type_tag == ERROR_TAG)
            .count()
    }
}

/// Percent-encode the key separators in a path or attribute name.
pub fn escape_key_part(part: &str) -> Cow<'_, str> {
    if !part.contains(['%', '@', '#']) {
        return Cow::Borrowed(part);
    }
    let mut escaped = String::with_capacity(part.len() + 4);
    for c in part.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '@' => escaped.push_str("%40"),
            '#' => escaped.push_str("%23"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn flatten_node(node: &NodeRecord, entries: &mut BTreeMap<String, TaggedValue>) {
    let path = escape_key_part(&node.path);
    let mut put = |property: &str, tag: &str, value: String| {
        entries.insert(format!("{path}#{property}"), TaggedValue::new(tag, value));
    };

    put("kind", "text", node.kind.to_string());
    if let Some(datatype) = &node.datatype {
        put("datatype", datatype.class.label(), datatype.to_string());
    }
    if let Some(dataspace) = &node.dataspace {
        put("dataspace", "dataspace", dataspace.to_string());
    }
    if let Some(props) = &node.properties {
        put("layout", "text", props.layout.label().to_string());
        if props.chunk.is_some() {
            put("chunk", "dims", props.chunk_text());
        }
        if !props.filters.is_empty() {
            put("filters", "text", props.filters_text());
        }
        put("alloc_time", "text", props.alloc_time.label().to_string());
        put("fill_time", "text", props.fill_time.label().to_string());
        put(
            "fill_value_defined",
            "boolean",
            props.fill_value_defined.to_string(),
        );
        put("storage_size", "integer", props.storage_size.to_string());
    }
    if let Some(target) = &node.link_target {
        put("link_target", "text", target.clone());
    }
    if !node.failures.is_empty() {
        let message = node
            .failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        put("error", ERROR_TAG, message);
    }

    for attribute in &node.attributes {
        let value = match &attribute.value {
            Ok(decoded) => TaggedValue::new(attribute.datatype.class.label(), decoded.text.clone()),
            Err(failure) => TaggedValue::new(ERROR_TAG, failure.to_string()),
        };
        entries.insert(format!("{path}@{}", escape_key_part(&attribute.key)), value);
    }
}

fn digest(entries: &BTreeMap<String, TaggedValue>) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(DIGEST_DOMAIN);
    for (key, value) in entries {
        for part in [key.as_str(), value.type_tag.as_str(), value.value.as_str()] {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
    }
    hex::encode(hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use h5meta_types::{
        AllocTime, AttributeRecord, Dataspace, DatatypeDescriptor, Decoded, DecodedValue,
        FailureKind, FillTime, Filter, LayoutKind, NodeFailure, ObjectKind, PropertyRecord,
    };

    fn sample_record() -> MetadataRecord {
        let mut record = MetadataRecord::new("/data/f.h5");
        record.push(NodeRecord::new("/", None, ObjectKind::Group));

        let mut grp = NodeRecord::new("/grp", Some("/".into()), ObjectKind::Group);
        grp.attributes.push(AttributeRecord {
            key: "count".into(),
            datatype: DatatypeDescriptor::integer(4),
            dataspace: Dataspace::simple([3]),
            element_count: 3,
            value: Ok(Decoded::new(DecodedValue::Integers(vec![3, -7, 0]), "3 -7 0")),
        });
        grp.attributes.push(AttributeRecord {
            key: "broken".into(),
            datatype: DatatypeDescriptor::integer(4),
            dataspace: Dataspace::scalar(),
            element_count: 1,
            value: Err(NodeFailure::new(FailureKind::MalformedAttribute, "short")),
        });
        record.push(grp);

        let mut dset = NodeRecord::new("/grp/dset", Some("/grp".into()), ObjectKind::Dataset);
        dset.datatype = Some(DatatypeDescriptor::float(8));
        dset.dataspace = Some(Dataspace::simple([5, 6]));
        dset.properties = Some(PropertyRecord {
            layout: LayoutKind::Chunked,
            chunk: Some(vec![2, 3]),
            filters: vec![Filter::Deflate { level: 6 }],
            alloc_time: AllocTime::Incremental,
            fill_time: FillTime::IfSet,
            fill_value_defined: true,
            storage_size: 240,
        });
        record.push(dset);

        let mut link = NodeRecord::new("/alias", Some("/".into()), ObjectKind::Link);
        link.link_target = Some("/grp/dset".into());
        record.push(link);
        record
    }

    #[test]
    fn flattens_attributes_and_properties() {
        let meta = EntryMetadata::from_record(&sample_record());
        assert_eq!(meta.source, "/data/f.h5");
        assert_eq!(
            meta.get("/grp@count"),
            Some(&TaggedValue::new("integer", "3 -7 0"))
        );
        assert_eq!(meta.get("/grp@broken").unwrap().type_tag, ERROR_TAG);
        assert_eq!(meta.get("/grp/dset#kind").unwrap().value, "dataset");
        assert_eq!(meta.get("/grp/dset#datatype"), Some(&TaggedValue::new("float", "f64")));
        assert_eq!(meta.get("/grp/dset#chunk").unwrap().value, "2 3");
        assert_eq!(meta.get("/grp/dset#filters").unwrap().value, "deflate(level=6)");
        assert_eq!(meta.get("/grp/dset#storage_size").unwrap().value, "240");
        assert_eq!(meta.get("/alias#link_target").unwrap().value, "/grp/dset");
        assert!(meta.get("/alias#layout").is_none());
        assert_eq!(meta.error_count(), 1);
    }

    #[test]
    fn node_failures_become_error_entries() {
        let mut record = MetadataRecord::new("/f.h5");
        let mut node = NodeRecord::new("/bad", Some("/".into()), ObjectKind::Dataset);
        node.record_failure(NodeFailure::new(FailureKind::Io, "bad header"));
        record.push(node);
        let meta = EntryMetadata::from_record(&record);
        assert_eq!(
            meta.get("/bad#error"),
            Some(&TaggedValue::new(ERROR_TAG, "io: bad header"))
        );
    }

    #[test]
    fn digest_ignores_timestamp_and_tracks_content() {
        let a = EntryMetadata::from_record(&sample_record());
        let mut b = EntryMetadata::from_record(&sample_record());
        b.extracted_at = a.extracted_at - chrono::Duration::hours(1);
        assert_eq!(a.digest, b.digest);
        assert!(b.verify_digest());

        b.entries
            .insert("/grp@count".into(), TaggedValue::new("integer", "3 -7 1"));
        assert!(!b.verify_digest());
    }

    #[test]
    fn separators_in_names_do_not_collide() {
        let mut record = MetadataRecord::new("/data/f.h5");
        let mut x = NodeRecord::new("/x", Some("/".into()), ObjectKind::Group);
        x.attributes.push(AttributeRecord {
            key: "y#kind".into(),
            datatype: DatatypeDescriptor::string(4),
            dataspace: Dataspace::scalar(),
            element_count: 1,
            value: Ok(Decoded::new(DecodedValue::Text(vec!["attr".into()]), "attr")),
        });
        record.push(x);
        record.push(NodeRecord::new("/x@y", Some("/".into()), ObjectKind::Group));

        let meta = EntryMetadata::from_record(&record);
        assert_eq!(meta.len(), 3);
        assert_eq!(meta.get("/x@y%23kind").unwrap().value, "attr");
        assert_eq!(meta.get("/x%40y#kind").unwrap().value, "group");
        assert!(meta.get("/x@y#kind").is_none());
    }

    #[test]
    fn escape_leaves_plain_names_borrowed() {
        assert!(matches!(escape_key_part("/grp/dset"), Cow::Borrowed(_)));
        assert_eq!(escape_key_part("50%@a#b"), "50%25%40a%23b");
    }

    #[test]
    fn json_roundtrip() {
        let meta = EntryMetadata::from_record(&sample_record());
        let json = serde_json::to_string(&meta).unwrap();
        let back: EntryMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
