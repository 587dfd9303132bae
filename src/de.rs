//! CBOR deserialisation tooling

use std::collections::BTreeMap;
use std::io::BufRead;

use crate::error::{DeserializeError, Error};
use crate::len::Len;
use crate::result::Result;
use crate::tags;
use crate::types::{Special, Type};

pub trait Deserialize: Sized {
    /// method to implement to deserialise an object from the given
    /// `Deserializer`.
    fn deserialize<R: BufRead>(raw: &mut Deserializer<R>)
        -> core::result::Result<Self, DeserializeError>;
}

impl Deserialize for u8 {
    fn deserialize<R: BufRead>(
        raw: &mut Deserializer<R>,
    ) -> core::result::Result<Self, DeserializeError> {
        let n = raw.unsigned_integer()?;
        if n > u8::MAX as u64 {
            Err(Error::ExpectedU8.into())
        } else {
            Ok(n as Self)
        }
    }
}

impl Deserialize for u16 {
    fn deserialize<R: BufRead>(
        raw: &mut Deserializer<R>,
    ) -> core::result::Result<Self, DeserializeError> {
        let n = raw.unsigned_integer()?;
        if n > u16::MAX as u64 {
            Err(Error::ExpectedU16.into())
        } else {
            Ok(n as Self)
        }
    }
}

impl Deserialize for u32 {
    fn deserialize<R: BufRead>(
        raw: &mut Deserializer<R>,
    ) -> core::result::Result<Self, DeserializeError> {
        let n = raw.unsigned_integer()?;
        if n > u32::MAX as u64 {
            Err(Error::ExpectedU32.into())
        } else {
            Ok(n as Self)
        }
    }
}

impl Deserialize for u64 {
    fn deserialize<R: BufRead>(
        raw: &mut Deserializer<R>,
    ) -> core::result::Result<Self, DeserializeError> {
        Ok(raw.unsigned_integer()?)
    }
}

impl Deserialize for i64 {
    fn deserialize<R: BufRead>(
        raw: &mut Deserializer<R>,
    ) -> core::result::Result<Self, DeserializeError> {
        let v = match raw.cbor_type()? {
            Type::UnsignedInteger => i128::from(raw.unsigned_integer()?),
            _ => raw.negative_integer()?,
        };
        i64::try_from(v).map_err(|_| Error::ExpectedI64.into())
    }
}

impl Deserialize for bool {
    fn deserialize<R: BufRead>(
        raw: &mut Deserializer<R>,
    ) -> core::result::Result<Self, DeserializeError> {
        Ok(raw.bool()?)
    }
}

impl Deserialize for String {
    fn deserialize<R: BufRead>(
        raw: &mut Deserializer<R>,
    ) -> core::result::Result<Self, DeserializeError> {
        Ok(raw.text()?)
    }
}

impl<T: Deserialize> Deserialize for Vec<T> {
    fn deserialize<R: BufRead>(
        raw: &mut Deserializer<R>,
    ) -> core::result::Result<Self, DeserializeError> {
        let mut vec = Vec::new();
        raw.array_with(|raw| {
            vec.push(Deserialize::deserialize(raw)?);
            Ok::<(), DeserializeError>(())
        })?;
        Ok(vec)
    }
}

impl<K: Deserialize + Ord, V: Deserialize> Deserialize for BTreeMap<K, V> {
    fn deserialize<R: BufRead>(
        raw: &mut Deserializer<R>,
    ) -> core::result::Result<Self, DeserializeError> {
        let mut map = BTreeMap::new();
        raw.map_with(|raw| {
            let k = Deserialize::deserialize(raw)?;
            let v = Deserialize::deserialize(raw)?;
            map.insert(k, v);
            Ok::<(), DeserializeError>(())
        })?;
        Ok(map)
    }
}

/// An absent optional field is encoded as the simple value `null`.
impl<T: Deserialize> Deserialize for Option<T> {
    fn deserialize<R: BufRead>(
        raw: &mut Deserializer<R>,
    ) -> core::result::Result<Self, DeserializeError> {
        raw.nullable(|raw| T::deserialize(raw))
    }
}

/// `Deserializer` wraps a buffered reader believed to contain a cbor item.
/// The validity of the cbor bytes is known only when trying to get
/// meaningful cbor objects out of it.
///
/// The reader is tolerant: non-minimal integer widths and indefinite-length
/// containers are accepted even though [`crate::se::Serializer`] never
/// produces the former.
///
/// # Examples
///
/// If you already know the CBOR major [`Type`] you are expecting, you
/// can use the appropriate command directly:
///
/// ```
/// use cbor_ledger::de::*;
/// use std::io::Cursor;
///
/// let vec = vec![0x18, 0x40];
/// let mut raw = Deserializer::from(Cursor::new(vec));
///
/// assert_eq!(raw.unsigned_integer().unwrap(), 64);
/// ```
///
/// If you don't know the [`Type`] and are analyzing the structure, use
/// [`cbor_type`](Deserializer::cbor_type) to peek at the type of the next
/// item without consuming anything.
///
/// # Error
///
/// When deserialising from `Deserializer` it is possible to see the
/// following [`Error`]s:
///
/// - `Error::NotEnough(current_size, needed_size)`: more bytes are needed
///   to parse the CBOR properly;
/// - `Error::Expected(expected_type, current_type)`: the current cbor major
///   [`Type`] is different from the expected [`Type`];
/// - `Error::UnknownLenType(byte)`: the length descriptor is one of the
///   reserved values `0x1c..=0x1e`;
/// - `Error::IndefiniteLenNotSupported(t)`: the indefinite length is not
///   allowed for the given [`Type`] `t`;
/// - `Error::IoError(io_error)`: error relating to buffer management;
pub struct Deserializer<R>(R);
impl<R> From<R> for Deserializer<R> {
    fn from(r: R) -> Self {
        Deserializer(r)
    }
}

impl<R> AsRef<R> for Deserializer<R> {
    fn as_ref(&self) -> &R {
        &self.0
    }
}

impl<R> Deserializer<R> {
    pub fn as_mut_ref(&mut self) -> &mut R {
        &mut self.0
    }
    pub fn inner(self) -> R {
        self.0
    }
}
impl<R: BufRead> Deserializer<R> {
    #[inline]
    fn get(&mut self, index: usize) -> Result<u8> {
        let buf = self.0.fill_buf()?;
        match buf.get(index) {
            None => Err(Error::NotEnough(buf.len(), index)),
            Some(b) => Ok(*b),
        }
    }
    #[inline]
    fn u8(&mut self, index: usize) -> Result<u64> {
        let b = self.get(index)?;
        Ok(b as u64)
    }
    #[inline]
    fn u16(&mut self, index: usize) -> Result<u64> {
        let b1 = self.u8(index)?;
        let b2 = self.u8(index + 1)?;
        Ok(b1 << 8 | b2)
    }
    #[inline]
    fn u32(&mut self, index: usize) -> Result<u64> {
        let b1 = self.u8(index)?;
        let b2 = self.u8(index + 1)?;
        let b3 = self.u8(index + 2)?;
        let b4 = self.u8(index + 3)?;
        Ok(b1 << 24 | b2 << 16 | b3 << 8 | b4)
    }
    #[inline]
    fn u64(&mut self, index: usize) -> Result<u64> {
        let b1 = self.u8(index)?;
        let b2 = self.u8(index + 1)?;
        let b3 = self.u8(index + 2)?;
        let b4 = self.u8(index + 3)?;
        let b5 = self.u8(index + 4)?;
        let b6 = self.u8(index + 5)?;
        let b7 = self.u8(index + 6)?;
        let b8 = self.u8(index + 7)?;
        Ok(b1 << 56 | b2 << 48 | b3 << 40 | b4 << 32 | b5 << 24 | b6 << 16 | b7 << 8 | b8)
    }

    /// peek at the major type of the next item.
    ///
    /// This function does not consume the underlying buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use cbor_ledger::{de::*, Type};
    /// use std::io::Cursor;
    ///
    /// let vec = vec![0x18, 0x40];
    /// let mut raw = Deserializer::from(Cursor::new(vec));
    ///
    /// assert_eq!(raw.cbor_type().unwrap(), Type::UnsignedInteger);
    /// ```
    #[inline]
    pub fn cbor_type(&mut self) -> Result<Type> {
        Ok(Type::from(self.get(0)?))
    }
    #[inline]
    fn cbor_expect_type(&mut self, t: Type) -> Result<()> {
        let t_ = self.cbor_type()?;
        if t_ != t {
            Err(Error::Expected(t, t_))
        } else {
            Ok(())
        }
    }

    /// peek at the length parameter of the next cbor item. The returned
    /// tuple contains
    ///
    /// * the [`Len`];
    /// * the size of the encoded length (the number of bytes the length was
    ///   encoded in). `0` means the length is `< 24` and was encoded along
    ///   the initial byte.
    ///
    /// If you are expecting a `Type` `UnsignedInteger` or `NegativeInteger`
    /// the meaning of the length is slightly different:
    ///
    /// * `Len::Indefinite` is an error;
    /// * `Len::Len(len)` is the read value of the integer.
    ///
    /// This function does not consume the underlying buffer.
    #[inline]
    pub fn cbor_len(&mut self) -> Result<(Len, usize)> {
        let b: u8 = self.get(0)? & 0b0001_1111;
        match b {
            0x00..=0x17 => Ok((Len::Len(b as u64), 0)),
            0x18 => self.u8(1).map(|v| (Len::Len(v), 1)),
            0x19 => self.u16(1).map(|v| (Len::Len(v), 2)),
            0x1a => self.u32(1).map(|v| (Len::Len(v), 4)),
            0x1b => self.u64(1).map(|v| (Len::Len(v), 8)),
            0x1c..=0x1e => Err(Error::UnknownLenType(b)),
            0x1f => Ok((Len::Indefinite, 0)),

            // the value `b` has been masked to the 5 lowest bits, all
            // values above 0x1f are unreachable.
            _ => unreachable!(),
        }
    }

    /// consume the given `len` from the underlying buffer. Skipped bytes are
    /// then lost, they cannot be retrieved for future references.
    #[inline]
    pub fn advance(&mut self, len: usize) -> Result<()> {
        self.0.consume(len);

        Ok(())
    }

    /// Read an `UnsignedInteger` from the `Deserializer`
    ///
    /// The function fails if the type of the given Deserializer is not
    /// `Type::UnsignedInteger`.
    ///
    /// # Example
    ///
    /// ```
    /// use cbor_ledger::de::*;
    /// use std::io::Cursor;
    ///
    /// let vec = vec![0x18, 0x40];
    /// let mut raw = Deserializer::from(Cursor::new(vec));
    ///
    /// let integer = raw.unsigned_integer().unwrap();
    ///
    /// assert_eq!(integer, 64);
    /// ```
    pub fn unsigned_integer(&mut self) -> Result<u64> {
        self.cbor_expect_type(Type::UnsignedInteger)?;
        let (len, sz) = self.cbor_len()?;
        match len {
            Len::Indefinite => Err(Error::IndefiniteLenNotSupported(Type::UnsignedInteger)),
            Len::Len(v) => {
                self.advance(1 + sz)?;
                Ok(v)
            }
        }
    }

    /// Read a `NegativeInteger` from the `Deserializer`
    ///
    /// The function fails if the type of the given Deserializer is not
    /// `Type::NegativeInteger`. The return type is `i128` as the full
    /// cbor nint range `[-2^64, -1]` does not fit an `i64`.
    ///
    /// # Example
    ///
    /// ```
    /// use cbor_ledger::de::*;
    /// use std::io::Cursor;
    ///
    /// let vec = vec![0x38, 0x29];
    /// let mut raw = Deserializer::from(Cursor::new(vec));
    ///
    /// let integer = raw.negative_integer().unwrap();
    ///
    /// assert_eq!(integer, -42);
    /// ```
    pub fn negative_integer(&mut self) -> Result<i128> {
        self.cbor_expect_type(Type::NegativeInteger)?;
        let (len, sz) = self.cbor_len()?;
        match len {
            Len::Indefinite => Err(Error::IndefiniteLenNotSupported(Type::NegativeInteger)),
            Len::Len(v) => {
                self.advance(1 + sz)?;
                Ok(-(v as i128) - 1)
            }
        }
    }

    /// Read a Bytes from the Deserializer
    ///
    /// The function fails if the type of the given Deserializer is not
    /// `Type::Bytes`. An indefinite-length byte string is read as the
    /// concatenation of its definite chunks; a chunk that is itself
    /// indefinite is an error.
    pub fn bytes(&mut self) -> Result<Vec<u8>> {
        self.cbor_expect_type(Type::Bytes)?;
        let (len, sz) = self.cbor_len()?;
        self.advance(1 + sz)?;
        match len {
            Len::Indefinite => {
                let mut bytes = Vec::new();
                while !self.special_break()? {
                    self.cbor_expect_type(Type::Bytes)?;
                    let (chunk_len, chunk_sz) = self.cbor_len()?;
                    match chunk_len {
                        Len::Indefinite => return Err(Error::InvalidIndefiniteString),
                        Len::Len(chunk_len) => {
                            self.advance(1 + chunk_sz)?;
                            let mut chunk = vec![0; chunk_len as usize];
                            self.0.read_exact(&mut chunk)?;
                            bytes.append(&mut chunk);
                        }
                    }
                }
                Ok(bytes)
            }
            Len::Len(len) => {
                let mut bytes = vec![0; len as usize];
                self.0.read_exact(&mut bytes)?;
                Ok(bytes)
            }
        }
    }

    /// Read a Text from the Deserializer
    ///
    /// The function fails if the type of the given Deserializer is not
    /// `Type::Text`, or if the payload is not valid UTF-8.
    ///
    /// # Example
    ///
    /// ```
    /// use cbor_ledger::de::*;
    /// use std::io::Cursor;
    ///
    /// let vec = vec![0x64, 0x74, 0x65, 0x78, 0x74];
    /// let mut raw = Deserializer::from(Cursor::new(vec));
    ///
    /// let text = raw.text().unwrap();
    ///
    /// assert!(&*text == "text");
    /// ```
    pub fn text(&mut self) -> Result<String> {
        self.cbor_expect_type(Type::Text)?;
        let (len, sz) = self.cbor_len()?;
        self.advance(1 + sz)?;
        match len {
            Len::Indefinite => {
                let mut text = String::new();
                while !self.special_break()? {
                    self.cbor_expect_type(Type::Text)?;
                    let (chunk_len, chunk_sz) = self.cbor_len()?;
                    match chunk_len {
                        Len::Indefinite => return Err(Error::InvalidIndefiniteString),
                        Len::Len(chunk_len) => {
                            // rfc7049 forbids splitting UTF-8 characters across
                            // chunks so each chunk is validated on its own
                            self.advance(1 + chunk_sz)?;
                            let mut bytes = vec![0; chunk_len as usize];
                            self.0.read_exact(&mut bytes)?;
                            text.push_str(&String::from_utf8(bytes)?);
                        }
                    }
                }
                Ok(text)
            }
            Len::Len(len) => {
                let mut bytes = vec![0; len as usize];
                self.0.read_exact(&mut bytes)?;
                Ok(String::from_utf8(bytes)?)
            }
        }
    }

    // Internal helper to decode a series of `len` items using a function. If
    // `len` is indefinite, decode until a break byte. If `len` is definite,
    // decode that many items.
    fn internal_items_with<F, E>(&mut self, len: Len, mut f: F) -> core::result::Result<(), E>
    where
        F: FnMut(&mut Self) -> core::result::Result<(), E>,
        E: From<Error>,
    {
        match len {
            Len::Indefinite => {
                while !self.special_break()? {
                    f(self)?;
                }
            }
            Len::Len(len) => {
                for _ in 0..len {
                    f(self)?;
                }
            }
        }
        Ok(())
    }

    /// cbor array of cbor objects
    ///
    /// The function fails if the type of the given Deserializer is not
    /// `Type::Array`. Consumes the header only; the caller reads the
    /// elements (and the break byte, if [`Len::Indefinite`]).
    ///
    /// # Example
    ///
    /// ```
    /// use cbor_ledger::{de::*, Len};
    /// use std::io::Cursor;
    ///
    /// let vec = vec![0x86, 0, 1, 2, 3, 4, 5];
    /// let mut raw = Deserializer::from(Cursor::new(vec));
    ///
    /// let len = raw.array().unwrap();
    ///
    /// assert_eq!(len, Len::Len(6));
    /// ```
    pub fn array(&mut self) -> Result<Len> {
        self.cbor_expect_type(Type::Array)?;
        let (len, sz) = self.cbor_len()?;
        self.advance(1 + sz)?;
        Ok(len)
    }

    /// Helper to decode a cbor array using a specified function.
    ///
    /// This works with either definite or indefinite arrays. Each call to
    /// the function should decode one item. If the function returns an
    /// error, decoding stops and returns that error.
    pub fn array_with<F, E>(&mut self, f: F) -> core::result::Result<(), E>
    where
        F: FnMut(&mut Self) -> core::result::Result<(), E>,
        E: From<Error>,
    {
        let len = self.array()?;
        self.internal_items_with(len, f)
    }

    /// Expect an array of a specified length. Must be a definite-length
    /// array.
    pub fn tuple(&mut self, expected_len: u64, error_location: &'static str) -> Result<()> {
        let actual_len = self.array()?;
        match actual_len {
            Len::Len(len) if expected_len == len => Ok(()),
            _ => Err(Error::WrongLen(expected_len, actual_len, error_location)),
        }
    }

    /// cbor map
    ///
    /// The function fails if the type of the given Deserializer is not
    /// `Type::Map`. As with [`array`](Deserializer::array) only the header
    /// is consumed.
    ///
    /// # Example
    ///
    /// ```
    /// use cbor_ledger::{de::*, Len};
    /// use std::io::Cursor;
    ///
    /// let vec = vec![0xA2, 0x00, 0x64, 0x74, 0x65, 0x78, 0x74, 0x01, 0x18, 0x2A];
    /// let mut raw = Deserializer::from(Cursor::new(vec));
    ///
    /// let len = raw.map().unwrap();
    ///
    /// assert_eq!(len, Len::Len(2));
    /// ```
    pub fn map(&mut self) -> Result<Len> {
        self.cbor_expect_type(Type::Map)?;
        let (len, sz) = self.cbor_len()?;
        self.advance(1 + sz)?;
        Ok(len)
    }

    /// Helper to decode a cbor map using a specified function
    ///
    /// This works with either definite or indefinite maps. Each call to the
    /// function should decode one key followed by one value. If the function
    /// returns an error, decoding stops and returns that error.
    pub fn map_with<F, E>(&mut self, f: F) -> core::result::Result<(), E>
    where
        F: FnMut(&mut Self) -> core::result::Result<(), E>,
        E: From<Error>,
    {
        let len = self.map()?;
        self.internal_items_with(len, f)
    }

    /// Cbor Tag
    ///
    /// The function fails if the type of the given Deserializer is not
    /// `Type::Tag`.
    ///
    /// # Example
    ///
    /// ```
    /// use cbor_ledger::de::*;
    /// use std::io::Cursor;
    ///
    /// let vec = vec![0xD8, 0x18, 0x64, 0x74, 0x65, 0x78, 0x74];
    /// let mut raw = Deserializer::from(Cursor::new(vec));
    ///
    /// let tag = raw.tag().unwrap();
    ///
    /// assert_eq!(24, tag);
    /// assert_eq!("text", &*raw.text().unwrap());
    /// ```
    pub fn tag(&mut self) -> Result<u64> {
        self.cbor_expect_type(Type::Tag)?;
        let (len, sz) = self.cbor_len()?;
        match len {
            Len::Indefinite => Err(Error::IndefiniteLenNotSupported(Type::Tag)),
            Len::Len(tag) => {
                self.advance(1 + sz)?;
                Ok(tag)
            }
        }
    }

    /// Expect the tag marking a set, failing on any other tag number.
    pub fn set_tag(&mut self) -> Result<()> {
        let tag = self.tag()?;
        if tag != tags::SET {
            return Err(Error::TagMismatch {
                found: tag,
                expected: tags::SET,
            });
        }
        Ok(())
    }

    /// If the next byte is a break, advance past it and return `true`;
    /// otherwise, return `false` without advancing.
    ///
    /// Used when decoding a variable-length array or map: the items may
    /// themselves start with any major type, including `Special` values
    /// such as bools, so only the break byte itself stops the iteration.
    pub fn special_break(&mut self) -> Result<bool> {
        if self.get(0)? == 0xff {
            self.advance(1)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Expect the break byte terminating an indefinite-length container.
    pub fn expect_break(&mut self) -> Result<()> {
        if self.special_break()? {
            Ok(())
        } else {
            Err(Error::EndingBreakMissing)
        }
    }

    /// If the next byte is the simple value `null`, consume it and return
    /// `None`; otherwise read a value with the given function.
    ///
    /// This is the encoding of optional fields in the ledger wire format.
    pub fn nullable<T, F, E>(&mut self, f: F) -> core::result::Result<Option<T>, E>
    where
        F: FnOnce(&mut Self) -> core::result::Result<T, E>,
        E: From<Error>,
    {
        if self.get(0).map_err(E::from)? == Type::Special.to_byte(0x16) {
            self.advance(1).map_err(E::from)?;
            Ok(None)
        } else {
            f(self).map(Some)
        }
    }

    pub fn special(&mut self) -> Result<Special> {
        self.cbor_expect_type(Type::Special)?;
        let b = self.get(0)? & 0b0001_1111;
        match b {
            0x00..=0x13 => {
                self.advance(1)?;
                Ok(Special::Unassigned(b))
            }
            0x14 => {
                self.advance(1)?;
                Ok(Special::Bool(false))
            }
            0x15 => {
                self.advance(1)?;
                Ok(Special::Bool(true))
            }
            0x16 => {
                self.advance(1)?;
                Ok(Special::Null)
            }
            0x17 => {
                self.advance(1)?;
                Ok(Special::Undefined)
            }
            0x18 => {
                let b = self.u8(1)?;
                self.advance(2)?;
                Ok(Special::Unassigned(b as u8))
            }
            0x19 => {
                let f = self.u16(1)?;
                self.advance(3)?;
                Ok(Special::Float(f as f64))
            }
            0x1a => {
                let f = self.u32(1)? as u32;
                self.advance(5)?;
                Ok(Special::Float(f32::from_bits(f) as f64))
            }
            0x1b => {
                let f = self.u64(1)?;
                self.advance(9)?;
                Ok(Special::Float(f64::from_bits(f)))
            }
            0x1c..=0x1e => {
                self.advance(1)?;
                Ok(Special::Unassigned(b))
            }
            0x1f => {
                self.advance(1)?;
                Ok(Special::Break)
            }
            _ => unreachable!(),
        }
    }

    pub fn bool(&mut self) -> Result<bool> {
        self.special()?.unwrap_bool()
    }

    /// Read an integer of any width: the direct uint and nint forms as
    /// well as the bignum tags.
    pub fn big_int(&mut self) -> core::result::Result<crate::BigInt, DeserializeError> {
        self.deserialize()
    }

    pub fn float(&mut self) -> Result<f64> {
        self.special()?.unwrap_float()
    }

    pub fn deserialize<T>(&mut self) -> core::result::Result<T, DeserializeError>
    where
        T: Deserialize,
    {
        Deserialize::deserialize(self)
    }

    /// Deserialize a value of type `T` and check that there is no
    /// trailing data.
    pub fn deserialize_complete<T>(&mut self) -> core::result::Result<T, DeserializeError>
    where
        T: Deserialize,
    {
        let v = self.deserialize()?;
        if !self.0.fill_buf().map_err(Error::from)?.is_empty() {
            Err(Error::TrailingData.into())
        } else {
            Ok(v)
        }
    }
}
