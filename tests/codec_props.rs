use proptest::prelude::*;
use vx_coder_bot::codec::{decode, encode, looks_encoded, TAG};

proptest! {
    /// Every string survives an encode/decode round trip unchanged.
    #[test]
    fn round_trip(s in "\\PC*") {
        prop_assert_eq!(decode(&encode(&s)), s);
    }

    /// Encoded output always carries the tag.
    #[test]
    fn encode_carries_tag(s in "\\PC*") {
        prop_assert!(encode(&s).starts_with(TAG));
    }

    /// Everything the bot produces is recognized by its own detector.
    #[test]
    fn own_output_is_detected(s in "\\PC*") {
        prop_assert!(looks_encoded(&encode(&s)));
    }

    /// Decoding never panics, whatever the input.
    #[test]
    fn decode_is_total(s in "\\PC*") {
        let _ = decode(&s);
    }
}
