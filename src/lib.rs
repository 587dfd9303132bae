//! # CBOR codec for the ledger wire format
//!
//! `cbor_ledger` is a minimalist CBOR implementation tailored to the
//! canonical transaction format of the ledger: a cursor-style reader and
//! writer that parse and emit CBOR without an intermediate type
//! representation, plus a [`BigInt`] bridging the direct integer encodings
//! and the bignum tags.
//!
//! Here is the list of supported CBOR major [`Type`]:
//!
//! - Unsigned and Negative Integers (full 65-bit nint range, bignums via
//!   the dedicated tags);
//! - Bytes and UTF8 String (of finite and indefinite length);
//! - Array and Map (of finite and indefinite length);
//! - Tag;
//! - Specials (`bool`, `null`... floating points are read but never
//!   written).
//!
//! The reader is tolerant and accepts any valid encoding; the writer is
//! canonical and always emits minimal integer and length widths. The
//! definiteness of arrays and maps is surfaced as [`Len`] at decode time
//! and replayed at encode time, so a decode/encode round trip of
//! writer-produced data is byte-exact.
//!
//! ## Raw deserialisation: [`de::Deserializer`]
//!
//! Deserialisation works by consuming the `Deserializer` content from any
//! [`std::io::BufRead`].
//!
//! ```
//! use cbor_ledger::de::*;
//! use std::io::Cursor;
//!
//! let vec = vec![0x43, 0x01, 0x02, 0x03];
//! let mut raw = Deserializer::from(Cursor::new(vec));
//! let bytes = raw.bytes().unwrap();
//!
//! # assert_eq!(bytes.as_slice(), [1,2,3].as_ref());
//! ```
//!
//! For convenience, we provide the trait [`Deserialize`] to help writing
//! simpler deserializers for your types.
//!
//! ## Serialisation: [`se::Serializer`]
//!
//! To serialise your objects into CBOR we provide a simple object
//! [`se::Serializer`]. It is configurable with any [`std::io::Write`]
//! objects. It is meant to be simple to use and to have limited overhead.
//!
//! ```
//! use cbor_ledger::se::Serializer;
//!
//! let mut serializer = Serializer::new_vec();
//! serializer.write_negative_integer(-12)
//!     .expect("write a negative integer");
//!
//! # let bytes = serializer.finalize();
//! # assert_eq!(bytes, [0x2b].as_ref());
//! ```

mod bigint;
pub mod de;
mod error;
mod len;
mod macros;
mod result;
pub mod se;
pub mod tags;
mod types;
mod value;

pub use bigint::BigInt;
pub use de::Deserialize;
pub use error::{DeserializeError, Error};
pub use len::*;
pub use result::Result;
pub use se::Serialize;
pub use types::*;
pub use value::Value;

const MAX_INLINE_ENCODING: u64 = 23;

const CBOR_PAYLOAD_LENGTH_U8: u8 = 24;
const CBOR_PAYLOAD_LENGTH_U16: u8 = 25;
const CBOR_PAYLOAD_LENGTH_U32: u8 = 26;
const CBOR_PAYLOAD_LENGTH_U64: u8 = 27;

/// exported as a convenient function to test the implementation of
/// [`Serialize`] and [`Deserialize`].
pub fn test_encode_decode<V: Sized + PartialEq + Serialize + Deserialize>(
    v: &V,
) -> core::result::Result<bool, DeserializeError> {
    let mut se = se::Serializer::new_vec();
    v.serialize(&mut se).map_err(DeserializeError::from)?;
    let bytes = se.finalize();

    let mut raw = de::Deserializer::from(std::io::Cursor::new(bytes));
    let v_ = raw.deserialize_complete()?;

    Ok(v == &v_)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn encode_decode_primitives() {
        assert!(test_encode_decode(&42u64).unwrap());
        assert!(test_encode_decode(&-42i64).unwrap());
        assert!(test_encode_decode(&true).unwrap());
        assert!(test_encode_decode(&String::from("hello")).unwrap());
        assert!(test_encode_decode(&Some(7u32)).unwrap());
        assert!(test_encode_decode(&None::<u32>).unwrap());
        assert!(test_encode_decode(&vec![1u64, 2, 3]).unwrap());
        assert!(test_encode_decode(&BigInt::from(1u128 << 80)).unwrap());
    }

    #[test]
    fn transaction_shaped_item_roundtrips() {
        // {0: [[h'aa..aa', 0]], 1: 1000000}, the shape of a minimal
        // transaction body: one input, one integer field
        let mut hex_str = String::from("a20081825820");
        hex_str.push_str(&"aa".repeat(32));
        hex_str.push_str("00011a000f4240");
        let bytes = hex::decode(&hex_str).unwrap();

        let mut raw = de::Deserializer::from(std::io::Cursor::new(bytes.clone()));
        let value: Value = raw.deserialize_complete().unwrap();

        let input = value
            .get(&Value::from(0u64))
            .and_then(Value::as_array)
            .and_then(|inputs| inputs[0].as_array())
            .unwrap();
        assert_eq!(input[0].as_bytes(), Some(&[0xaa; 32][..]));

        let mut se = se::Serializer::new_vec();
        value.serialize(&mut se).unwrap();
        assert_eq!(hex::encode(se.finalize()), hex_str);
    }

    quickcheck! {
        fn special_roundtrip(special: Special) -> bool {
            let mut se = se::Serializer::new_vec();
            se.write_special(special).unwrap();
            let mut raw = de::Deserializer::from(std::io::Cursor::new(se.finalize()));
            raw.special().unwrap() == special
        }
    }
}
