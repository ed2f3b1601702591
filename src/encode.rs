use std::mem::size_of;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Encoded {actual} bytes for a value declaring a width of {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Unsupported value type: {0:?}. Must be one of u8, i8, u16, i16, u32, i32, u64, i64")]
    UnknownWidth(String),

    #[error("Could not parse {literal:?} as {width}")]
    InvalidLiteral { literal: String, width: &'static str },
}

/// A fixed-width value that can be encoded as OI argument bytes.
///
/// All multi-byte OI arguments are big-endian.
pub trait Encode {
    /// Returns the number of bytes this value takes when encoded.
    fn size(&self) -> usize;

    /// Encodes the value into a byte sequence.
    fn encode(&self) -> Result<Vec<u8>, EncodeError>;
}

macro_rules! impl_encode_for_primitive {
    ($($t:ty),*) => {
        $(
            impl Encode for $t {
                fn size(&self) -> usize {
                    size_of::<Self>()
                }

                fn encode(&self) -> Result<Vec<u8>, EncodeError> {
                    Ok(self.to_be_bytes().to_vec())
                }
            }
        )*
    };
}

impl_encode_for_primitive!(u8, u16, u32, u64, i8, i16, i32, i64);

/// Packs a sequence of values into one byte sequence, in order.
///
/// Fails if any value produces a different number of bytes than it declares,
/// so a malformed value can never leave truncated or padded bytes behind.
pub fn pack(values: &[&dyn Encode]) -> Result<Vec<u8>, EncodeError> {
    let mut packed = Vec::with_capacity(values.iter().map(|v| v.size()).sum());

    for value in values {
        let bytes = value.encode()?;
        if bytes.len() != value.size() {
            return Err(EncodeError::SizeMismatch {
                expected: value.size(),
                actual: bytes.len(),
            });
        }
        packed.extend(bytes);
    }

    Ok(packed)
}

#[cfg(test)]
mod tests {
    use super::{pack, Encode, EncodeError};

    /// Claims two bytes but only produces one.
    struct Truncated;

    impl Encode for Truncated {
        fn size(&self) -> usize {
            2
        }

        fn encode(&self) -> Result<Vec<u8>, EncodeError> {
            Ok(vec![0xFF])
        }
    }

    #[test]
    fn single_byte() {
        assert_eq!(pack(&[&0x02u8]).unwrap(), vec![0x02]);
    }

    #[test]
    fn big_endian() {
        assert_eq!(pack(&[&0x0102u16]).unwrap(), vec![0x01, 0x02]);
        assert_eq!(
            pack(&[&0x01020304u32]).unwrap(),
            vec![0x01, 0x02, 0x03, 0x04]
        );
    }

    #[test]
    fn mixed_widths() {
        // Drive: velocity -200 mm/s, radius 500 mm.
        let packed = pack(&[&-200i16, &500i16, &7u8, &1i64]).unwrap();

        assert_eq!(packed.len(), 2 + 2 + 1 + 8);
        assert_eq!(&packed[..4], &[0xFF, 0x38, 0x01, 0xF4]);
        assert_eq!(packed[4], 7);
        assert_eq!(&packed[5..], &[0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn empty() {
        assert!(pack(&[]).unwrap().is_empty());
    }

    #[test]
    fn size_mismatch() {
        assert_eq!(
            pack(&[&1u8, &Truncated]),
            Err(EncodeError::SizeMismatch {
                expected: 2,
                actual: 1
            })
        );
    }
}
