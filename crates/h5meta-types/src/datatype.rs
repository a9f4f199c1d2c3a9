use serde::{Deserialize, Serialize};

/// The category of stored values.
///
/// Compound, Array and Enum types are recursive in the container format but
/// are only classified here; their members are never described.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatatypeClass {
    Integer,
    Float,
    String,
    Bitfield,
    Opaque,
    Compound,
    Array,
    Enum,
    /// Any class the reader reports that has no decoder (time, reference,
    /// variable-length sequences, ...).
    Unsupported,
}

impl DatatypeClass {
    /// Stable lowercase label, used as the type tag of attached metadata.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Bitfield => "bitfield",
            Self::Opaque => "opaque",
            Self::Compound => "compound",
            Self::Array => "array",
            Self::Enum => "enum",
            Self::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for DatatypeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Byte order of fixed-width numeric values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

/// Description of a stored datatype: class tag plus element size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatatypeDescriptor {
    pub class: DatatypeClass,
    /// Size of one element in bytes.
    pub size: usize,
    #[serde(default)]
    pub order: ByteOrder,
    /// Only meaningful for [`DatatypeClass::Integer`].
    #[serde(default = "default_signed")]
    pub signed: bool,
}

fn default_signed() -> bool {
    true
}

impl DatatypeDescriptor {
    /// A descriptor of the given class with native (little-endian) order.
    pub fn new(class: DatatypeClass, size: usize) -> Self {
        Self {
            class,
            size,
            order: ByteOrder::LittleEndian,
            signed: true,
        }
    }

    /// Signed integer of `size` bytes.
    pub fn integer(size: usize) -> Self {
        Self::new(DatatypeClass::Integer, size)
    }

    /// Unsigned integer of `size` bytes.
    pub fn unsigned(size: usize) -> Self {
        Self {
            signed: false,
            ..Self::integer(size)
        }
    }

    /// IEEE float of `size` bytes.
    pub fn float(size: usize) -> Self {
        Self::new(DatatypeClass::Float, size)
    }

    /// Fixed-size byte string of `size` bytes.
    pub fn string(size: usize) -> Self {
        Self::new(DatatypeClass::String, size)
    }

    /// Same descriptor with big-endian byte order.
    pub fn big_endian(self) -> Self {
        Self {
            order: ByteOrder::BigEndian,
            ..self
        }
    }
}

impl std::fmt::Display for DatatypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.class {
            DatatypeClass::Integer if !self.signed => write!(f, "u{}", self.size * 8),
            DatatypeClass::Integer => write!(f, "i{}", self.size * 8),
            DatatypeClass::Float => write!(f, "f{}", self.size * 8),
            other => write!(f, "{}[{}]", other, self.size),
        }
    }
}
