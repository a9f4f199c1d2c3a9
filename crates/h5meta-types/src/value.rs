use serde::{Deserialize, Serialize};

use crate::datatype::DatatypeClass;

/// Canonical typed value of a decoded attribute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum DecodedValue {
    Integers(Vec<i64>),
    Unsigned(Vec<u64>),
    Floats(Vec<f64>),
    Text(Vec<String>),
    /// Classified but not decoded; carries only the class.
    Label(DatatypeClass),
}

impl DecodedValue {
    /// Number of decoded elements (0 for a label).
    pub fn len(&self) -> usize {
        match self {
            Self::Integers(v) => v.len(),
            Self::Unsigned(v) => v.len(),
            Self::Floats(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Label(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded value together with its textual rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decoded {
    pub value: DecodedValue,
    pub text: String,
}

impl Decoded {
    pub fn new(value: DecodedValue, text: impl Into<String>) -> Self {
        Self {
            value,
            text: text.into(),
        }
    }
}
