//! Typed attribute decoding.
//!
//! [`decode`] turns the raw bytes of an attribute into a [`Decoded`] value
//! and its textual rendering. Dispatch is a match over [`DatatypeClass`]:
//!
//! | class                                   | value            | text                          |
//! |-----------------------------------------|------------------|-------------------------------|
//! | Integer (1, 2, 4, 8 bytes)              | `Integers`/`Unsigned` | space-separated decimals |
//! | Float (4, 8 bytes)                      | `Floats`         | space-separated, shortest round-trip |
//! | String                                  | `Text`           | padding stripped, space-joined |
//! | Bitfield, Opaque, Compound, Array, Enum | `Label`          | class label                   |
//! | Unsupported                             | --               | `UnsupportedType`             |

use h5meta_types::{ByteOrder, DatatypeClass, DatatypeDescriptor, Decoded, DecodedValue};

use crate::error::{DecodeError, DecodeResult};

const INTEGER_WIDTHS: &[usize] = &[1, 2, 4, 8];
const FLOAT_WIDTHS: &[usize] = &[4, 8];

/// Decode `element_count` elements of `datatype` from `raw`.
///
/// An element count of zero yields an empty rendering. Numeric and string
/// decoding fail with [`DecodeError::MalformedAttribute`] when `raw.len()`
/// differs from `datatype.size * element_count`. A zero-width string type
/// with a nonzero count is rejected as [`DecodeError::ZeroWidthString`].
pub fn decode(
    datatype: &DatatypeDescriptor,
    raw: &[u8],
    element_count: u64,
) -> DecodeResult<Decoded> {
    match datatype.class {
        DatatypeClass::Integer => {
            if element_count == 0 {
                return Ok(empty_integers(datatype));
            }
            check_width(datatype, INTEGER_WIDTHS)?;
            check_len(datatype, raw, element_count)?;
            Ok(decode_integers(datatype, raw))
        }
        DatatypeClass::Float => {
            if element_count == 0 {
                return Ok(Decoded::new(DecodedValue::Floats(Vec::new()), ""));
            }
            check_width(datatype, FLOAT_WIDTHS)?;
            check_len(datatype, raw, element_count)?;
            Ok(decode_floats(datatype, raw))
        }
        DatatypeClass::String => {
            if element_count == 0 {
                return Ok(Decoded::new(DecodedValue::Text(Vec::new()), ""));
            }
            if datatype.size == 0 {
                return Err(DecodeError::ZeroWidthString {
                    elements: element_count,
                });
            }
            check_len(datatype, raw, element_count)?;
            Ok(decode_strings(datatype, raw))
        }
        DatatypeClass::Bitfield
        | DatatypeClass::Opaque
        | DatatypeClass::Compound
        | DatatypeClass::Array
        | DatatypeClass::Enum => Ok(label(datatype.class)),
        DatatypeClass::Unsupported => Err(unsupported(datatype)),
    }
}

/// Classify a datatype without decoding any payload.
///
/// Used for dataset and named-datatype descriptors. Returns the class label,
/// or `UnsupportedType` for classes and widths the decoder cannot handle.
pub fn classify(datatype: &DatatypeDescriptor) -> DecodeResult<&'static str> {
    match datatype.class {
        DatatypeClass::Integer => check_width(datatype, INTEGER_WIDTHS)?,
        DatatypeClass::Float => check_width(datatype, FLOAT_WIDTHS)?,
        DatatypeClass::Unsupported => return Err(unsupported(datatype)),
        _ => {}
    }
    Ok(datatype.class.label())
}

fn label(class: DatatypeClass) -> Decoded {
    Decoded::new(DecodedValue::Label(class), class.label())
}

fn unsupported(datatype: &DatatypeDescriptor) -> DecodeError {
    DecodeError::UnsupportedType {
        class: datatype.class,
        size: datatype.size,
    }
}

fn check_width(datatype: &DatatypeDescriptor, widths: &[usize]) -> DecodeResult<()> {
    if widths.contains(&datatype.size) {
        Ok(())
    } else {
        Err(unsupported(datatype))
    }
}

fn check_len(datatype: &DatatypeDescriptor, raw: &[u8], element_count: u64) -> DecodeResult<()> {
    let expected = (datatype.size as u64).checked_mul(element_count);
    match expected {
        Some(expected) if expected == raw.len() as u64 => Ok(()),
        _ => Err(DecodeError::MalformedAttribute {
            expected: expected.unwrap_or(u64::MAX),
            actual: raw.len(),
        }),
    }
}

fn empty_integers(datatype: &DatatypeDescriptor) -> Decoded {
    let value = if datatype.signed {
        DecodedValue::Integers(Vec::new())
    } else {
        DecodedValue::Unsigned(Vec::new())
    };
    Decoded::new(value, "")
}

/// Assemble an unsigned value from `chunk` in the given byte order.
fn read_unsigned(chunk: &[u8], order: ByteOrder) -> u64 {
    let push = |acc: u64, byte: &u8| (acc << 8) | u64::from(*byte);
    match order {
        ByteOrder::BigEndian => chunk.iter().fold(0, push),
        ByteOrder::LittleEndian => chunk.iter().rev().fold(0, push),
    }
}

/// Sign-extend a `width`-byte two's complement value.
fn sign_extend(value: u64, width: usize) -> i64 {
    let shift = 64 - width * 8;
    ((value << shift) as i64) >> shift
}

fn decode_integers(datatype: &DatatypeDescriptor, raw: &[u8]) -> Decoded {
    let width = datatype.size;
    let unsigned = raw
        .chunks_exact(width)
        .map(|chunk| read_unsigned(chunk, datatype.order));
    if datatype.signed {
        let values: Vec<i64> = unsigned.map(|v| sign_extend(v, width)).collect();
        let text = join(&values);
        Decoded::new(DecodedValue::Integers(values), text)
    } else {
        let values: Vec<u64> = unsigned.collect();
        let text = join(&values);
        Decoded::new(DecodedValue::Unsigned(values), text)
    }
}

fn decode_floats(datatype: &DatatypeDescriptor, raw: &[u8]) -> Decoded {
    let big = datatype.order == ByteOrder::BigEndian;
    let (values, text): (Vec<f64>, String) = if datatype.size == 4 {
        let narrow: Vec<f32> = raw
            .chunks_exact(4)
            .map(|c| {
                let bytes = [c[0], c[1], c[2], c[3]];
                if big {
                    f32::from_be_bytes(bytes)
                } else {
                    f32::from_le_bytes(bytes)
                }
            })
            .collect();
        // Render at storage width so 11.1f32 prints as "11.1".
        let text = join(&narrow);
        (narrow.into_iter().map(f64::from).collect(), text)
    } else {
        let wide: Vec<f64> = raw
            .chunks_exact(8)
            .map(|c| {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(c);
                if big {
                    f64::from_be_bytes(bytes)
                } else {
                    f64::from_le_bytes(bytes)
                }
            })
            .collect();
        let text = join(&wide);
        (wide, text)
    };
    Decoded::new(DecodedValue::Floats(values), text)
}

fn decode_strings(datatype: &DatatypeDescriptor, raw: &[u8]) -> Decoded {
    let strings: Vec<String> = raw.chunks_exact(datatype.size).map(trim_padding).collect();
    let text = strings.join(" ");
    Decoded::new(DecodedValue::Text(strings), text)
}

/// Cut at the first NUL, then drop trailing space padding.
fn trim_padding(chunk: &[u8]) -> String {
    let end = chunk.iter().position(|&b| b == 0).unwrap_or(chunk.len());
    String::from_utf8_lossy(&chunk[..end])
        .trim_end_matches(' ')
        .to_string()
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
