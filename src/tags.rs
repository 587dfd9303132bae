//! Semantic tag numbers used by the ledger wire format.
//!
//! See <https://www.iana.org/assignments/cbor-tags/cbor-tags.xhtml> for the
//! registry.

/// positive bignum: a byte string holding the big-endian magnitude
pub const BIGNUM_POSITIVE: u64 = 2;
/// negative bignum: a byte string holding the big-endian magnitude of
/// `-1 - n` where `n` is the tagged value
pub const BIGNUM_NEGATIVE: u64 = 3;
/// a byte string holding an independently encoded cbor item
pub const ENCODED_CBOR: u64 = 24;
/// a rational number as a `[numerator, denominator]` pair
pub const RATIONAL: u64 = 30;
/// general constructor: `[index, [fields...]]`
pub const CONSTR_GENERAL: u64 = 102;
/// first of the compact constructor tags, covering indices `0..=6`
pub const CONSTR_COMPACT_FIRST: u64 = 121;
/// last of the compact constructor tags
pub const CONSTR_COMPACT_LAST: u64 = 127;
/// marks the following array as a finite set
pub const SET: u64 = 258;

/// the compact tag for a constructor index, when one exists.
///
/// Indices above 6 have no compact form and use [`CONSTR_GENERAL`] with
/// the index as an explicit element.
pub fn constr_to_tag(index: u64) -> Option<u64> {
    if index <= CONSTR_COMPACT_LAST - CONSTR_COMPACT_FIRST {
        Some(CONSTR_COMPACT_FIRST + index)
    } else {
        None
    }
}

/// the constructor index a compact tag stands for, if it is one.
pub fn tag_to_constr(tag: u64) -> Option<u64> {
    if (CONSTR_COMPACT_FIRST..=CONSTR_COMPACT_LAST).contains(&tag) {
        Some(tag - CONSTR_COMPACT_FIRST)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_constr_tags() {
        assert_eq!(constr_to_tag(0), Some(121));
        assert_eq!(constr_to_tag(6), Some(127));
        assert_eq!(constr_to_tag(7), None);
        assert_eq!(tag_to_constr(121), Some(0));
        assert_eq!(tag_to_constr(127), Some(6));
        assert_eq!(tag_to_constr(128), None);
        assert_eq!(tag_to_constr(CONSTR_GENERAL), None);
    }
}
