//! Property tests for fixed-precision amounts.

use proptest::prelude::*;
use tenforty::Amount;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: display then parse returns the same amount (no drift).
    #[test]
    fn property_display_parse_round_trip(cents in 0u64..=10_000_000_000) {
        let amount = Amount::from_cents(cents);
        let rendered = amount.to_string();
        prop_assert_eq!(Amount::parse(&rendered).expect("own rendering parses"), amount);
    }

    /// PROPERTY: rendered amounts always carry exactly two decimals.
    #[test]
    fn property_display_fixed_precision(cents in 0u64..=10_000_000_000) {
        let rendered = Amount::from_cents(cents).to_string();
        let (_, frac) = rendered.split_once('.').expect("decimal point present");
        prop_assert_eq!(frac.len(), 2);
    }

    /// PROPERTY: parse never panics on arbitrary input.
    #[test]
    fn property_parse_never_panics(raw in "[ -~]{0,32}") {
        let _ = Amount::parse(&raw);
    }

    /// PROPERTY: whatever parses is non-negative and re-renders to a value
    /// that parses to the same cents.
    #[test]
    fn property_parse_is_canonicalizing(raw in "\\$?[0-9]{1,7}(\\.[0-9]{1,2})?") {
        let amount = Amount::parse(&raw).expect("generated amounts parse");
        let again = Amount::parse(&amount.to_string()).unwrap();
        prop_assert_eq!(amount, again);
    }
}
