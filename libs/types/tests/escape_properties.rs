//! Property tests for the literal escaping format and value specs

use proptest::prelude::*;
use types::{bytes_to_escaped_str, escaped_str_to_bytes, ValueLiteral};

proptest! {
    #[test]
    fn escaping_is_lossless(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        for (keep_spacing, escape_single_quotes) in [(false, false), (false, true), (true, false), (true, true)] {
            let escaped = bytes_to_escaped_str(&data, keep_spacing, escape_single_quotes);
            prop_assert_eq!(escaped_str_to_bytes(&escaped).unwrap(), data.clone());
        }
    }

    #[test]
    fn escaped_text_is_printable(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let escaped = bytes_to_escaped_str(&data, false, false);
        prop_assert!(escaped.bytes().all(|b| (0x20..=0x7e).contains(&b)));
    }

    #[test]
    fn literal_spec_never_contains_inner_quote(data in proptest::collection::vec(any::<u8>(), 0..128)) {
        let spec = ValueLiteral::new(data.clone()).spec();
        let inner = &spec[1..spec.len() - 1];
        prop_assert!(!inner.contains('\''));
        prop_assert_eq!(ValueLiteral::from_escaped(inner).unwrap().bytes().to_vec(), data);
    }
}
