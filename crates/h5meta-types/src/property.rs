//! Dataset storage properties: layout, filter pipeline and fill policy.
//!
//! A [`PropertyRecord`] is the normalized view of a dataset's creation
//! properties. It is built from metadata only; the dataset payload is never
//! read to produce it.

use serde::{Deserialize, Serialize};

/// Storage layout of a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    Compact,
    Contiguous,
    Chunked,
    Virtual,
    /// A layout code the reader reported but this crate does not know.
    Unknown,
}

impl LayoutKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Contiguous => "contiguous",
            Self::Chunked => "chunked",
            Self::Virtual => "virtual",
            Self::Unknown => "unknown",
        }
    }
}

/// One stage of a dataset's filter pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "filter", rename_all = "snake_case")]
pub enum Filter {
    /// Gzip compression at the given level.
    Deflate { level: u32 },
    Shuffle,
    /// Fletcher32 checksum (error detection only).
    Fletcher32,
    Szip {
        options_mask: u32,
        pixels_per_block: u32,
    },
    /// A filter outside the known set; the raw id is kept for observability.
    Unknown { id: i32, name: String },
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deflate { level } => write!(f, "deflate(level={level})"),
            Self::Shuffle => f.write_str("shuffle"),
            Self::Fletcher32 => f.write_str("fletcher32"),
            Self::Szip {
                pixels_per_block, ..
            } => write!(f, "szip(pixels_per_block={pixels_per_block})"),
            Self::Unknown { id, name } if name.is_empty() => write!(f, "unknown(id={id})"),
            Self::Unknown { id, name } => write!(f, "unknown(id={id}, name={name})"),
        }
    }
}

/// When file space for a dataset is allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocTime {
    Early,
    Incremental,
    Late,
}

impl AllocTime {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Early => "early",
            Self::Incremental => "incremental",
            Self::Late => "late",
        }
    }
}

/// When allocated space is written with the fill value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillTime {
    OnAlloc,
    Never,
    IfSet,
}

impl FillTime {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OnAlloc => "on_alloc",
            Self::Never => "never",
            Self::IfSet => "if_set",
        }
    }
}

/// Normalized storage properties of one dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub layout: LayoutKind,
    /// Chunk dimensions; present only for chunked layouts.
    pub chunk: Option<Vec<u64>>,
    /// Filters in pipeline order.
    pub filters: Vec<Filter>,
    pub alloc_time: AllocTime,
    pub fill_time: FillTime,
    pub fill_value_defined: bool,
    /// Bytes currently allocated for the dataset in the file.
    pub storage_size: u64,
}

impl PropertyRecord {
    /// Space-separated chunk dimensions, or an empty string when unchunked.
    pub fn chunk_text(&self) -> String {
        self.chunk
            .as_ref()
            .map(|dims| {
                dims.iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    /// Comma-separated filter pipeline.
    pub fn filters_text(&self) -> String {
        self.filters
            .iter()
            .map(Filter::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}
