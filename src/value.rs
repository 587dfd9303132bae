//! A generic cbor item tree.
//!
//! [`Value`] decodes any item the ledger wire format can contain and
//! remembers enough about the input encoding, the definiteness of each
//! array and map, to re-serialize it byte-exact. Integer and length widths
//! are not kept: the writer re-emits them canonically, which matches the
//! input for any data produced by this crate.

use std::io::{BufRead, Write};

use crate::bigint::BigInt;
use crate::de::{Deserialize, Deserializer};
use crate::error::{DeserializeError, Error};
use crate::len::Len;
use crate::se::{Serialize, Serializer};
use crate::tags;
use crate::types::{Special, Type};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// any integer, from either the direct encodings or the bignum tags
    Int(BigInt),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<Value>, Len),
    Map(Vec<(Value, Value)>, Len),
    Tag(u64, Box<Value>),
    Bool(bool),
    Null,
    Undefined,
}

impl Value {
    /// look a value up by key in a map item.
    ///
    /// Keys are compared structurally, in entry order. Returns `None` when
    /// the key is absent or `self` is not a map.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match self {
            Value::Map(pairs, _) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v, _) => Some(v),
            _ => None,
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Int(BigInt::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(BigInt::from(v))
    }
}

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::Int(v)
    }
}

impl Deserialize for Value {
    fn deserialize<R: BufRead>(
        raw: &mut Deserializer<R>,
    ) -> core::result::Result<Self, DeserializeError> {
        match raw.cbor_type()? {
            Type::UnsignedInteger => Ok(Value::Int(BigInt::from(raw.unsigned_integer()?))),
            Type::NegativeInteger => Ok(Value::Int(BigInt::from(raw.negative_integer()?))),
            Type::Bytes => Ok(Value::Bytes(raw.bytes()?)),
            Type::Text => Ok(Value::Text(raw.text()?)),
            Type::Array => {
                let len = raw.array()?;
                let mut items = Vec::new();
                match len {
                    Len::Indefinite => {
                        while !raw.special_break()? {
                            items.push(
                                Value::deserialize(raw).map_err(|e| e.annotate("array"))?,
                            );
                        }
                    }
                    Len::Len(n) => {
                        for _ in 0..n {
                            items.push(
                                Value::deserialize(raw).map_err(|e| e.annotate("array"))?,
                            );
                        }
                    }
                }
                Ok(Value::Array(items, len))
            }
            Type::Map => {
                let len = raw.map()?;
                let mut pairs = Vec::new();
                match len {
                    Len::Indefinite => {
                        while !raw.special_break()? {
                            let k = Value::deserialize(raw).map_err(|e| e.annotate("key"))?;
                            let v = Value::deserialize(raw).map_err(|e| e.annotate("value"))?;
                            pairs.push((k, v));
                        }
                    }
                    Len::Len(n) => {
                        for _ in 0..n {
                            let k = Value::deserialize(raw).map_err(|e| e.annotate("key"))?;
                            let v = Value::deserialize(raw).map_err(|e| e.annotate("value"))?;
                            pairs.push((k, v));
                        }
                    }
                }
                Ok(Value::Map(pairs, len))
            }
            Type::Tag => {
                // the bignum tags fold into Int, any other tag is preserved
                if matches!(
                    raw.cbor_len()?,
                    (Len::Len(tags::BIGNUM_POSITIVE | tags::BIGNUM_NEGATIVE), _)
                ) {
                    return Ok(Value::Int(raw.deserialize()?));
                }
                let tag = raw.tag()?;
                let inner = Value::deserialize(raw).map_err(|e| e.annotate("tagged"))?;
                Ok(Value::Tag(tag, Box::new(inner)))
            }
            Type::Special => match raw.special()? {
                Special::Bool(b) => Ok(Value::Bool(b)),
                Special::Null => Ok(Value::Null),
                Special::Undefined => Ok(Value::Undefined),
                Special::Break => Err(Error::BreakInDefiniteLen.into()),
                Special::Float(_) => Err(Error::CustomError(
                    "floating point values are not part of the ledger format".to_string(),
                )
                .into()),
                Special::Unassigned(v) => {
                    Err(Error::CustomError(format!("unassigned simple value {}", v)).into())
                }
            },
        }
    }
}

impl Serialize for Value {
    fn serialize<'a, W: Write + Sized>(
        &self,
        serializer: &'a mut Serializer<W>,
    ) -> crate::Result<&'a mut Serializer<W>> {
        match self {
            Value::Int(v) => v.serialize(serializer),
            Value::Bytes(v) => serializer.write_bytes(v),
            Value::Text(v) => serializer.write_text(v),
            Value::Array(items, len) => {
                // the definite count is taken from the actual items so the
                // header can never disagree with the content
                match len {
                    Len::Indefinite => serializer.write_array(Len::Indefinite)?,
                    Len::Len(_) => serializer.write_array(Len::Len(items.len() as u64))?,
                };
                for item in items {
                    item.serialize(serializer)?;
                }
                if len.indefinite() {
                    serializer.write_special(Special::Break)?;
                }
                Ok(serializer)
            }
            Value::Map(pairs, len) => {
                match len {
                    Len::Indefinite => serializer.write_map(Len::Indefinite)?,
                    Len::Len(_) => serializer.write_map(Len::Len(pairs.len() as u64))?,
                };
                for (k, v) in pairs {
                    k.serialize(serializer)?;
                    v.serialize(serializer)?;
                }
                if len.indefinite() {
                    serializer.write_special(Special::Break)?;
                }
                Ok(serializer)
            }
            Value::Tag(tag, inner) => inner.serialize(serializer.write_tag(*tag)?),
            Value::Bool(b) => serializer.write_special(Special::Bool(*b)),
            Value::Null => serializer.write_special(Special::Null),
            Value::Undefined => serializer.write_special(Special::Undefined),
        }
    }
}
