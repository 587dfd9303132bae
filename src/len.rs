/// Length of a CBOR array, map or string: either a definite count stated
/// upfront or the indefinite marker, terminated later by a break byte.
///
/// The deserializer hands this back when reading a container header; keeping
/// hold of it and passing the same value when re-serializing is what makes
/// round trips byte-exact.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Len {
    Indefinite,
    Len(u64),
}

impl Len {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Len(0))
    }

    pub fn indefinite(&self) -> bool {
        self == &Len::Indefinite
    }

    /// the definite count, if there is one
    pub fn len(&self) -> Option<u64> {
        match self {
            Len::Indefinite => None,
            Len::Len(len) => Some(*len),
        }
    }
}
