//! Dataset property inspection.
//!
//! Reads a dataset's creation properties and normalizes the raw format codes
//! into a [`PropertyRecord`]. The dataset payload is never read, so the cost
//! does not depend on dataset size.

use h5meta_container::codes::{alloc_time, fill_time, fill_value, filter, layout};
use h5meta_container::{Container, ContainerResult, RawFilter, RawProperties};
use h5meta_types::{AllocTime, FillTime, Filter, LayoutKind, PropertyRecord};
use tracing::warn;

/// Inspect the dataset at `path`, whose header reported `storage_size`.
pub fn inspect(
    container: &dyn Container,
    path: &str,
    storage_size: u64,
) -> ContainerResult<PropertyRecord> {
    let raw = container.dataset_properties(path)?;
    Ok(normalize(&raw, storage_size))
}

/// Normalize raw creation properties.
///
/// Fields are resolved in a fixed order: layout, filter pipeline,
/// allocation time, fill time, fill-value status.
pub fn normalize(raw: &RawProperties, storage_size: u64) -> PropertyRecord {
    let layout = layout_kind(raw.layout);
    let chunk = (layout == LayoutKind::Chunked).then(|| raw.chunk_dims.clone());
    let filters = raw.filters.iter().map(resolve_filter).collect();
    PropertyRecord {
        layout,
        chunk,
        filters,
        alloc_time: resolve_alloc_time(raw.alloc_time, layout),
        fill_time: resolve_fill_time(raw.fill_time),
        fill_value_defined: matches!(
            raw.fill_value_status,
            fill_value::DEFAULT | fill_value::USER_DEFINED
        ),
        storage_size,
    }
}

fn layout_kind(code: i32) -> LayoutKind {
    match code {
        layout::COMPACT => LayoutKind::Compact,
        layout::CONTIGUOUS => LayoutKind::Contiguous,
        layout::CHUNKED => LayoutKind::Chunked,
        layout::VIRTUAL => LayoutKind::Virtual,
        other => {
            warn!(code = other, "unknown layout code");
            LayoutKind::Unknown
        }
    }
}

fn resolve_filter(raw: &RawFilter) -> Filter {
    let param = |i: usize| raw.client_data.get(i).copied().unwrap_or_default();
    match raw.id {
        filter::DEFLATE => Filter::Deflate { level: param(0) },
        filter::SHUFFLE => Filter::Shuffle,
        filter::FLETCHER32 => Filter::Fletcher32,
        filter::SZIP => Filter::Szip {
            options_mask: param(0),
            pixels_per_block: param(1),
        },
        id => Filter::Unknown {
            id,
            name: raw.name.clone(),
        },
    }
}

/// The format's default allocation time depends on the layout.
fn default_alloc_time(layout: LayoutKind) -> AllocTime {
    match layout {
        LayoutKind::Compact => AllocTime::Early,
        LayoutKind::Chunked | LayoutKind::Virtual => AllocTime::Incremental,
        LayoutKind::Contiguous | LayoutKind::Unknown => AllocTime::Late,
    }
}

fn resolve_alloc_time(code: i32, layout: LayoutKind) -> AllocTime {
    match code {
        alloc_time::EARLY => AllocTime::Early,
        alloc_time::INCR => AllocTime::Incremental,
        alloc_time::LATE => AllocTime::Late,
        alloc_time::DEFAULT => default_alloc_time(layout),
        other => {
            warn!(code = other, "unknown allocation time; using layout default");
            default_alloc_time(layout)
        }
    }
}

fn resolve_fill_time(code: i32) -> FillTime {
    match code {
        fill_time::ALLOC => FillTime::OnAlloc,
        fill_time::NEVER => FillTime::Never,
        fill_time::IFSET => FillTime::IfSet,
        other => {
            warn!(code = other, "unknown fill time; using if_set");
            FillTime::IfSet
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h5meta_container::{
        ContainerReader, DatasetNode, GroupNode, InMemoryContainerReader, ContainerTree,
    };
    use h5meta_types::{Dataspace, DatatypeDescriptor};

    #[test]
    fn chunked_with_deflate() {
        let raw = RawProperties::chunked([2, 3]).with_filter(RawFilter::deflate(6));
        let record = normalize(&raw, 0);
        assert_eq!(record.layout, LayoutKind::Chunked);
        assert_eq!(record.chunk, Some(vec![2, 3]));
        assert!(record.filters.contains(&Filter::Deflate { level: 6 }));
        assert_eq!(record.alloc_time, AllocTime::Incremental);
    }

    #[test]
    fn non_chunked_layout_has_no_chunk() {
        let raw = RawProperties {
            chunk_dims: vec![9, 9],
            ..RawProperties::default()
        };
        let record = normalize(&raw, 120);
        assert_eq!(record.layout, LayoutKind::Contiguous);
        assert_eq!(record.chunk, None);
        assert_eq!(record.alloc_time, AllocTime::Late);
        assert_eq!(record.storage_size, 120);
    }

    #[test]
    fn filter_pipeline_keeps_order_and_unknown_ids() {
        let raw = RawProperties::chunked([4])
            .with_filter(RawFilter::shuffle())
            .with_filter(RawFilter::fletcher32())
            .with_filter(RawFilter::szip(4, 32))
            .with_filter(RawFilter::new(32004, "lz4", vec![0]))
            .with_filter(RawFilter::new(filter::NBIT, "nbit", vec![]));
        let record = normalize(&raw, 0);
        assert_eq!(
            record.filters,
            vec![
                Filter::Shuffle,
                Filter::Fletcher32,
                Filter::Szip {
                    options_mask: 4,
                    pixels_per_block: 32
                },
                Filter::Unknown {
                    id: 32004,
                    name: "lz4".into()
                },
                Filter::Unknown {
                    id: filter::NBIT,
                    name: "nbit".into()
                },
            ]
        );
    }

    #[test]
    fn alloc_and_fill_policies() {
        let compact = RawProperties {
            layout: layout::COMPACT,
            fill_time: fill_time::NEVER,
            fill_value_status: fill_value::UNDEFINED,
            ..RawProperties::default()
        };
        let record = normalize(&compact, 0);
        assert_eq!(record.alloc_time, AllocTime::Early);
        assert_eq!(record.fill_time, FillTime::Never);
        assert!(!record.fill_value_defined);

        let explicit = RawProperties {
            alloc_time: alloc_time::EARLY,
            fill_time: fill_time::ALLOC,
            fill_value_status: fill_value::USER_DEFINED,
            ..RawProperties::chunked([1])
        };
        let record = normalize(&explicit, 0);
        assert_eq!(record.alloc_time, AllocTime::Early);
        assert_eq!(record.fill_time, FillTime::OnAlloc);
        assert!(record.fill_value_defined);
    }

    #[test]
    fn unknown_codes_fall_back() {
        let raw = RawProperties {
            layout: 42,
            alloc_time: 9,
            fill_time: -1,
            fill_value_status: -1,
            ..RawProperties::default()
        };
        let record = normalize(&raw, 0);
        assert_eq!(record.layout, LayoutKind::Unknown);
        assert_eq!(record.alloc_time, AllocTime::Late);
        assert_eq!(record.fill_time, FillTime::IfSet);
        assert!(!record.fill_value_defined);
    }

    #[test]
    fn inspect_reads_through_container() {
        let reader = InMemoryContainerReader::new();
        reader.insert(
            "/f.h5",
            ContainerTree::new(GroupNode::new().with_dataset(
                "d",
                DatasetNode::new(DatatypeDescriptor::integer(4), Dataspace::simple([5, 6]))
                    .with_properties(RawProperties::chunked([2, 3])),
            )),
        );
        let container = reader.open("/f.h5").unwrap();
        let record = inspect(container.as_ref(), "/d", 120).unwrap();
        assert_eq!(record.chunk, Some(vec![2, 3]));
        assert_eq!(record.storage_size, 120);
        assert!(inspect(container.as_ref(), "/", 0).is_err());
    }
}
