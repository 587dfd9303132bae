use std::fmt;
use std::string::FromUtf8Error;

use crate::len::Len;
use crate::types::Type;

/// all expected errors for cbor parsing and serialising
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid cbor: expected 8bit long unsigned integer")]
    ExpectedU8,
    #[error("Invalid cbor: expected 16bit long unsigned integer")]
    ExpectedU16,
    #[error("Invalid cbor: expected 32bit long unsigned integer")]
    ExpectedU32,
    #[error("Invalid cbor: expected 64bit long signed integer")]
    ExpectedI64,
    /// not enough data, the first element is the actual size, the second is
    /// the expected size.
    #[error("Invalid cbor: not enough bytes, expect {1} bytes but received {0} bytes")]
    NotEnough(usize, usize),
    /// were expecting a different [`Type`]. The first element is the
    /// expected type, the second is the type found in the input.
    #[error("Invalid cbor: expected type `{0:?}' but found type `{1:?}'")]
    Expected(Type, Type),
    /// the 5 low bits of an initial byte are not a valid length descriptor
    /// for the major type (`0x1c..=0x1e`, or `0x1f` where indefinite
    /// lengths are not allowed).
    #[error("Invalid cbor: invalid length descriptor 0b{0:05b}")]
    UnknownLenType(u8),
    #[error("Invalid cbor: indefinite length not supported for type `{0:?}'")]
    IndefiniteLenNotSupported(Type),
    /// a fixed-arity record had the wrong number of elements. The last
    /// element names the record for diagnostics.
    #[error("Invalid cbor: record `{2}' expected {0} fields but found {1:?}")]
    WrongLen(u64, Len, &'static str),
    /// a tagged value carried a different tag number than the schema
    /// requires at this position.
    #[error("Invalid cbor: expected tag {expected} but found tag {found}")]
    TagMismatch { found: u64, expected: u64 },
    #[error("Invalid cbor: expected a valid utf8 text string")]
    InvalidText(#[from] FromUtf8Error),
    /// a break byte showed up inside a definite-length container
    #[error("Invalid cbor: break byte inside a definite-length item")]
    BreakInDefiniteLen,
    /// an indefinite-length container ended without its break byte
    #[error("Invalid cbor: missing terminating break byte")]
    EndingBreakMissing,
    #[error("Invalid cbor: unexpected trailing data after the top-level item")]
    TrailingData,
    /// chunks of an indefinite-length string must themselves be definite
    #[error("Invalid cbor: invalid indefinite string format")]
    InvalidIndefiniteString,
    #[error("Negative integer {0} out of cbor nint range")]
    InvalidNint(i128),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid cbor: {0}")]
    CustomError(String),
}

/// A decode failure annotated with the breadcrumb trail of the nested
/// fields that were being read when it happened.
///
/// Every generated entity deserializer wraps the errors bubbling out of its
/// children with [`annotate`](DeserializeError::annotate), so the top-level
/// caller sees the exact location of the failure, rendered as
/// `"<description> (at <path joined by '/'>)"`.
#[derive(Debug)]
pub struct DeserializeError {
    // innermost first; reversed for display
    annotations: Vec<String>,
    error: Error,
}

impl DeserializeError {
    pub fn new(error: Error) -> Self {
        DeserializeError {
            annotations: Vec::new(),
            error,
        }
    }

    /// push a field or variant name onto the breadcrumb trail
    pub fn annotate(mut self, annotation: &str) -> Self {
        self.annotations.push(annotation.to_owned());
        self
    }

    pub fn kind(&self) -> &Error {
        &self.error
    }

    /// the breadcrumb trail, outermost field first
    pub fn path(&self) -> String {
        self.annotations
            .iter()
            .rev()
            .cloned()
            .collect::<Vec<String>>()
            .join("/")
    }
}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.annotations.is_empty() {
            write!(f, "{}", self.error)
        } else {
            write!(f, "{} (at {})", self.error, self.path())
        }
    }
}

impl std::error::Error for DeserializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<Error> for DeserializeError {
    fn from(error: Error) -> Self {
        DeserializeError::new(error)
    }
}
