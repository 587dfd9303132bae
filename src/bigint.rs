//! Arbitrary-precision integers bridging CBOR's direct uint/nint encodings
//! and the tag-2/3 bignum byte-string form.
//!
//! A [`BigInt`] is a sign plus a minimal big-endian magnitude. The reader
//! tolerates non-canonical input (leading zero bytes in a bignum payload);
//! the writer always emits the canonical form: direct encoding whenever the
//! value fits the 64-bit uint or nint range, tag 2/3 with a minimal
//! magnitude otherwise. The value zero has an empty magnitude.

use std::cmp::Ordering;
use std::io::{BufRead, Write};

use crate::de::{Deserialize, Deserializer};
use crate::error::{DeserializeError, Error};
use crate::se::{Serialize, Serializer};
use crate::tags;
use crate::types::Type;

/// bignum magnitudes above this many bytes are emitted as an
/// indefinite-length byte string of fixed-size definite chunks
pub const BIGNUM_CHUNK_SIZE: usize = 64;

/// A signed integer of arbitrary width.
///
/// Values within the 64-bit CBOR uint/nint range serialize to the direct
/// encodings; anything wider goes through the tag-2/3 byte-string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BigInt {
    negative: bool,
    // minimal big-endian magnitude: no leading zero byte, empty for zero
    magnitude: Vec<u8>,
}

impl BigInt {
    pub fn zero() -> Self {
        BigInt::default()
    }

    /// build from a sign and a big-endian magnitude of any width.
    ///
    /// Leading zero bytes are stripped; a zero magnitude is always
    /// non-negative. Zero-length input is zero.
    pub fn from_sign_magnitude(negative: bool, magnitude: &[u8]) -> Self {
        let skip = magnitude.iter().take_while(|b| **b == 0).count();
        let magnitude = magnitude[skip..].to_vec();
        BigInt {
            negative: negative && !magnitude.is_empty(),
            magnitude,
        }
    }

    /// the minimal big-endian magnitude; empty for zero
    pub fn magnitude_be(&self) -> &[u8] {
        &self.magnitude
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_empty()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// the value as a `u64`, if it fits the direct uint encoding range
    pub fn as_u64(&self) -> Option<u64> {
        if self.negative || self.magnitude.len() > 8 {
            return None;
        }
        Some(fold_be(&self.magnitude) as u64)
    }

    /// checked narrowing to `i128`
    pub fn as_i128(&self) -> Option<i128> {
        if self.magnitude.len() > 16 {
            return None;
        }
        let m = fold_be(&self.magnitude);
        if self.negative {
            if m == 1 << 127 {
                Some(i128::MIN)
            } else if m < 1 << 127 {
                Some(-(m as i128))
            } else {
                None
            }
        } else {
            i128::try_from(m).ok()
        }
    }
}

impl From<u64> for BigInt {
    fn from(value: u64) -> Self {
        BigInt::from_sign_magnitude(false, &value.to_be_bytes())
    }
}

impl From<u128> for BigInt {
    fn from(value: u128) -> Self {
        BigInt::from_sign_magnitude(false, &value.to_be_bytes())
    }
}

impl From<i64> for BigInt {
    fn from(value: i64) -> Self {
        BigInt::from(value as i128)
    }
}

impl From<i128> for BigInt {
    fn from(value: i128) -> Self {
        BigInt::from_sign_magnitude(value < 0, &value.unsigned_abs().to_be_bytes())
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => cmp_magnitude(&self.magnitude, &other.magnitude),
            (true, true) => cmp_magnitude(&other.magnitude, &self.magnitude),
        }
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// both magnitudes are minimal, so the longer one is the bigger value
fn cmp_magnitude(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

// interpret up to 16 big-endian bytes as an unsigned value
fn fold_be(bytes: &[u8]) -> u128 {
    bytes.iter().fold(0u128, |acc, b| (acc << 8) | *b as u128)
}

// add one to a big-endian unsigned magnitude
pub(crate) fn incr_be(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    for byte in out.iter_mut().rev() {
        let (v, carry) = byte.overflowing_add(1);
        *byte = v;
        if !carry {
            return out;
        }
    }
    out.insert(0, 1);
    out
}

// subtract one from a non-zero big-endian unsigned magnitude
pub(crate) fn decr_be(bytes: &[u8]) -> Vec<u8> {
    debug_assert!(bytes.iter().any(|b| *b != 0));
    let mut out = bytes.to_vec();
    for byte in out.iter_mut().rev() {
        let (v, borrow) = byte.overflowing_sub(1);
        *byte = v;
        if !borrow {
            break;
        }
    }
    let skip = out.iter().take_while(|b| **b == 0).count();
    out.drain(..skip);
    out
}

impl Deserialize for BigInt {
    fn deserialize<R: BufRead>(raw: &mut Deserializer<R>) -> Result<Self, DeserializeError> {
        (|| -> Result<Self, Error> {
            match raw.cbor_type()? {
                Type::UnsignedInteger => Ok(BigInt::from(raw.unsigned_integer()?)),
                Type::NegativeInteger => Ok(BigInt::from(raw.negative_integer()?)),
                Type::Tag => match raw.tag()? {
                    tags::BIGNUM_POSITIVE => {
                        Ok(BigInt::from_sign_magnitude(false, &raw.bytes()?))
                    }
                    tags::BIGNUM_NEGATIVE => {
                        // tag 3 encodes -1 - n: the magnitude held is n + 1
                        let n = raw.bytes()?;
                        Ok(BigInt {
                            negative: true,
                            magnitude: incr_be(
                                &n[n.iter().take_while(|b| **b == 0).count()..],
                            ),
                        })
                    }
                    tag => Err(Error::TagMismatch {
                        found: tag,
                        expected: tags::BIGNUM_POSITIVE,
                    }),
                },
                other => Err(Error::Expected(Type::UnsignedInteger, other)),
            }
        })()
        .map_err(|e| DeserializeError::from(e).annotate("BigInt"))
    }
}

impl Serialize for BigInt {
    fn serialize<'a, W: Write + Sized>(
        &self,
        serializer: &'a mut Serializer<W>,
    ) -> crate::Result<&'a mut Serializer<W>> {
        if !self.negative {
            match self.as_u64() {
                Some(v) => serializer.write_unsigned_integer(v),
                None => {
                    serializer.write_tag(tags::BIGNUM_POSITIVE)?;
                    serializer.write_bytes_chunked(&self.magnitude, BIGNUM_CHUNK_SIZE)
                }
            }
        } else if self.magnitude.len() <= 8 {
            serializer.write_negative_integer(-(fold_be(&self.magnitude) as i128))
        } else {
            serializer.write_tag(tags::BIGNUM_NEGATIVE)?;
            serializer.write_bytes_chunked(&decr_be(&self.magnitude), BIGNUM_CHUNK_SIZE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{quickcheck, Arbitrary, Gen};
    use std::io::Cursor;

    fn encode(value: &BigInt) -> Vec<u8> {
        let mut se = Serializer::new_vec();
        value.serialize(&mut se).unwrap();
        se.finalize()
    }

    fn decode(bytes: &[u8]) -> BigInt {
        let mut raw = Deserializer::from(Cursor::new(bytes.to_vec()));
        BigInt::deserialize(&mut raw).unwrap()
    }

    #[test]
    fn zero_has_empty_magnitude() {
        let zero = BigInt::from(0u64);
        assert!(zero.is_zero());
        assert!(!zero.is_negative());
        assert!(zero.magnitude_be().is_empty());
        assert_eq!(encode(&zero), [0x00]);
    }

    #[test]
    fn leading_zero_bytes_are_stripped() {
        let a = BigInt::from_sign_magnitude(false, &[0x00, 0x00, 0x01, 0x02]);
        assert_eq!(a.magnitude_be(), &[0x01, 0x02]);
        assert_eq!(a.as_u64(), Some(0x0102));
    }

    #[test]
    fn negative_zero_normalizes_to_zero() {
        let a = BigInt::from_sign_magnitude(true, &[0x00, 0x00]);
        assert!(a.is_zero());
        assert!(!a.is_negative());
    }

    #[test]
    fn u64_boundary_uses_direct_encoding() {
        let max = BigInt::from(u64::MAX);
        assert_eq!(
            encode(&max),
            [0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
        assert_eq!(decode(&encode(&max)), max);
    }

    #[test]
    fn two_pow_64_uses_positive_bignum_tag() {
        let v = BigInt::from(1u128 << 64);
        let bytes = encode(&v);
        // c2 = tag 2, 49 = 9-byte string
        assert_eq!(
            bytes,
            [0xc2, 0x49, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(decode(&bytes), v);
    }

    #[test]
    fn minus_two_pow_64_uses_negative_bignum_tag() {
        let v = BigInt::from(-(1i128 << 64));
        let bytes = encode(&v);
        // tag 3 wire magnitude is abs(v) - 1 = 2^64 - 1, back in 8 bytes
        assert_eq!(
            bytes,
            [0xc3, 0x48, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
        let back = decode(&bytes);
        assert_eq!(back, v);
        assert_eq!(back.as_i128(), Some(-(1i128 << 64)));
    }

    #[test]
    fn negative_values_in_nint_range_use_direct_encoding() {
        assert_eq!(encode(&BigInt::from(-1i64)), [0x20]);
        assert_eq!(encode(&BigInt::from(-42i64)), [0x38, 0x29]);
        let min_nint = BigInt::from(-(1i128 << 64) + 1);
        let bytes = encode(&min_nint);
        assert_eq!(bytes[0], 0x3b);
        assert_eq!(decode(&bytes), min_nint);
    }

    #[test]
    fn non_canonical_bignum_is_tolerated_and_canonicalized() {
        // tag 2 over a 3-byte magnitude with a leading zero
        let bytes = [0xc2, 0x43, 0x00, 0x01, 0x02];
        let v = decode(&bytes);
        assert_eq!(v.as_u64(), Some(0x0102));
        // re-encoding is canonical: a small value goes back to direct form
        assert_eq!(encode(&v), [0x19, 0x01, 0x02]);
    }

    #[test]
    fn incr_and_decr_carry_across_bytes() {
        assert_eq!(incr_be(&[0xff, 0xff]), vec![0x01, 0x00, 0x00]);
        assert_eq!(incr_be(&[0x01, 0xff]), vec![0x02, 0x00]);
        assert_eq!(decr_be(&[0x01, 0x00, 0x00]), vec![0xff, 0xff]);
        assert_eq!(decr_be(&[0x01]), Vec::<u8>::new());
    }

    #[test]
    fn ordering_follows_sign_and_magnitude() {
        let mut values = vec![
            BigInt::from(5u64),
            BigInt::from(-7i64),
            BigInt::from(0u64),
            BigInt::from(1u128 << 70),
            BigInt::from(-(1i128 << 70)),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                BigInt::from(-(1i128 << 70)),
                BigInt::from(-7i64),
                BigInt::from(0u64),
                BigInt::from(5u64),
                BigInt::from(1u128 << 70),
            ]
        );
    }

    impl Arbitrary for BigInt {
        fn arbitrary<G: Gen>(g: &mut G) -> Self {
            let negative = bool::arbitrary(g);
            let magnitude = Vec::<u8>::arbitrary(g);
            BigInt::from_sign_magnitude(negative, &magnitude)
        }
    }

    quickcheck! {
        fn roundtrip_bigint(value: BigInt) -> bool {
            decode(&encode(&value)) == value
        }

        fn roundtrip_i128(value: i128) -> bool {
            let v = BigInt::from(value);
            v.as_i128() == Some(value) && decode(&encode(&v)) == v
        }
    }
}
