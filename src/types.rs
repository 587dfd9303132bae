use crate::error::Error;
use crate::result::Result;
#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

/// CBOR major types, the high 3 bits of every initial byte.
///
/// Decoding any value starts by resolving this before dispatching to the
/// type-specific read.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Type {
    UnsignedInteger,
    NegativeInteger,
    Bytes,
    Text,
    Array,
    Map,
    Tag,
    Special,
}

impl Type {
    /// combine the major type with the 5 low bits of additional information
    /// into an initial byte.
    pub fn to_byte(self, info: u8) -> u8 {
        assert!(info <= 0b0001_1111);

        info | match self {
            Type::UnsignedInteger => 0b0000_0000,
            Type::NegativeInteger => 0b0010_0000,
            Type::Bytes => 0b0100_0000,
            Type::Text => 0b0110_0000,
            Type::Array => 0b1000_0000,
            Type::Map => 0b1010_0000,
            Type::Tag => 0b1100_0000,
            Type::Special => 0b1110_0000,
        }
    }

    pub fn from_byte(byte: u8) -> Type {
        match byte >> 5 {
            0b000 => Type::UnsignedInteger,
            0b001 => Type::NegativeInteger,
            0b010 => Type::Bytes,
            0b011 => Type::Text,
            0b100 => Type::Array,
            0b101 => Type::Map,
            0b110 => Type::Tag,
            0b111 => Type::Special,
            _ => unreachable!(),
        }
    }
}

impl From<u8> for Type {
    fn from(byte: u8) -> Type {
        Type::from_byte(byte)
    }
}

/// CBOR simple values and floats (major type 7).
#[derive(Debug, PartialEq, PartialOrd, Copy, Clone)]
pub enum Special {
    Bool(bool),
    Null,
    Undefined,
    /// simple values the ledger format leaves unassigned: `[0..=19]` and
    /// `[24..=31]`
    Unassigned(u8),

    /// floats are decoded for completeness but the writer does not emit
    /// them; the ledger wire format has no use for them.
    Float(f64),
    /// terminator of an indefinite-length array, map or string
    Break,
}

impl Special {
    #[inline]
    pub fn unwrap_bool(&self) -> Result<bool> {
        match self {
            Special::Bool(b) => Ok(*b),
            _ => Err(Error::CustomError(format!(
                "Expected Special::Bool, received {:?}",
                self
            ))),
        }
    }

    #[inline]
    pub fn unwrap_null(&self) -> Result<()> {
        match self {
            Special::Null => Ok(()),
            _ => Err(Error::CustomError(format!(
                "Expected Special::Null, received {:?}",
                self
            ))),
        }
    }

    #[inline]
    pub fn unwrap_float(&self) -> Result<f64> {
        match self {
            Special::Float(f) => Ok(*f),
            _ => Err(Error::CustomError(format!(
                "Expected Special::Float, received {:?}",
                self
            ))),
        }
    }

    #[inline]
    pub fn unwrap_break(&self) -> Result<()> {
        match self {
            Special::Break => Ok(()),
            _ => Err(Error::CustomError(format!(
                "Expected Special::Break, received {:?}",
                self
            ))),
        }
    }
}

#[cfg(test)]
impl Arbitrary for Special {
    fn arbitrary<G: Gen>(g: &mut G) -> Self {
        match u8::arbitrary(g) % 5 {
            0 => Special::Bool(Arbitrary::arbitrary(g)),
            1 => Special::Null,
            2 => Special::Undefined,
            3 => Special::Unassigned(u8::arbitrary(g) % 20),
            4 => Special::Break,
            _ => unreachable!(),
        }
    }
}
