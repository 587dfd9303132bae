/// macro to efficiently serialise the given structure into
/// cbor binary.
///
/// This performs an in memory serialisation and returns the
/// buffer wrapped in a [`Result`](crate::Result).
///
/// ```
/// use cbor_ledger::cbor;
///
/// let value = 0u64;
/// let bytes = cbor!(value).unwrap();
/// # assert_eq!(bytes, vec![0])
/// ```
#[macro_export]
macro_rules! cbor {
    ($x:expr) => {{
        let mut se = $crate::se::Serializer::new_vec();
        let err = se.serialize(&$x).map(|_| ());
        err.map(|_| se.finalize())
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn cbor_macro() {
        assert_eq!(cbor!(42u64).unwrap(), vec![0x18, 0x2a]);
        assert_eq!(
            cbor!((&1u64, &String::from("a"))).unwrap(),
            vec![0x82, 0x01, 0x61, 0x61]
        );
    }
}
