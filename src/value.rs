use std::{fmt, str::FromStr};

use crate::encode::{Encode, EncodeError};

/// A fixed-width numeric OI argument whose type is only known at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
}

macro_rules! impl_from_primitive {
    ($($t:ty => $variant:ident),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_primitive!(
    u8 => U8, i8 => I8, u16 => U16, i16 => I16,
    u32 => U32, i32 => I32, u64 => U64, i64 => I64
);

impl Value {
    /// Name of the value's type, as accepted by [`Value::from_str`].
    pub fn width_name(&self) -> &'static str {
        match self {
            Self::U8(_) => "u8",
            Self::I8(_) => "i8",
            Self::U16(_) => "u16",
            Self::I16(_) => "i16",
            Self::U32(_) => "u32",
            Self::I32(_) => "i32",
            Self::U64(_) => "u64",
            Self::I64(_) => "i64",
        }
    }
}

impl Encode for Value {
    fn size(&self) -> usize {
        match self {
            Self::U8(v) => v.size(),
            Self::I8(v) => v.size(),
            Self::U16(v) => v.size(),
            Self::I16(v) => v.size(),
            Self::U32(v) => v.size(),
            Self::I32(v) => v.size(),
            Self::U64(v) => v.size(),
            Self::I64(v) => v.size(),
        }
    }

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        match self {
            Self::U8(v) => v.encode(),
            Self::I8(v) => v.encode(),
            Self::U16(v) => v.encode(),
            Self::I16(v) => v.encode(),
            Self::U32(v) => v.encode(),
            Self::I32(v) => v.encode(),
            Self::U64(v) => v.encode(),
            Self::I64(v) => v.encode(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(v) => write!(f, "u8:{v}"),
            Self::I8(v) => write!(f, "i8:{v}"),
            Self::U16(v) => write!(f, "u16:{v}"),
            Self::I16(v) => write!(f, "i16:{v}"),
            Self::U32(v) => write!(f, "u32:{v}"),
            Self::I32(v) => write!(f, "i32:{v}"),
            Self::U64(v) => write!(f, "u64:{v}"),
            Self::I64(v) => write!(f, "i64:{v}"),
        }
    }
}

/// Parses a decimal or `0x`-prefixed hex literal, with an optional leading `-`.
fn parse_literal<T: TryFrom<i128>>(literal: &str, width: &'static str) -> Result<T, EncodeError> {
    let invalid = || EncodeError::InvalidLiteral {
        literal: literal.to_string(),
        width,
    };

    let (negative, digits) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };
    let (radix, digits) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    // The integer parsers accept their own sign, which would let a second one through.
    if digits.starts_with(['-', '+']) {
        return Err(invalid());
    }
    let magnitude = i128::from_str_radix(digits, radix).map_err(|_| invalid())?;

    let value = if negative {
        magnitude.checked_neg().ok_or_else(invalid)?
    } else {
        magnitude
    };
    T::try_from(value).map_err(|_| invalid())
}

impl FromStr for Value {
    type Err = EncodeError;

    /// Parses `<width>:<literal>`, e.g. `i16:-200` or `u16:0x01F4`.
    /// A literal with no width is a `u8`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (width, literal) = s.split_once(':').unwrap_or(("u8", s));

        Ok(match width {
            "u8" => Self::U8(parse_literal(literal, "u8")?),
            "i8" => Self::I8(parse_literal(literal, "i8")?),
            "u16" => Self::U16(parse_literal(literal, "u16")?),
            "i16" => Self::I16(parse_literal(literal, "i16")?),
            "u32" => Self::U32(parse_literal(literal, "u32")?),
            "i32" => Self::I32(parse_literal(literal, "i32")?),
            "u64" => Self::U64(parse_literal(literal, "u64")?),
            "i64" => Self::I64(parse_literal(literal, "i64")?),
            other => return Err(EncodeError::UnknownWidth(other.to_string())),
        })
    }
}
