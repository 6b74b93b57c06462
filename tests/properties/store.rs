//! Property tests for dotted-path store traversal.

use proptest::prelude::*;
use serde_json::Value;
use tenforty::store::PathStore;

fn segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{0,8}").unwrap()
}

fn path() -> impl Strategy<Value = String> {
    proptest::collection::vec(segment(), 1..=4).prop_map(|segments| segments.join("."))
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        proptest::string::string_regex("[ -~]{0,24}")
            .unwrap()
            .prop_map(Value::from),
        any::<u32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: set followed by get returns the value, and has() is true
    /// afterwards even for falsy values.
    #[test]
    fn property_set_get_round_trip(p in path(), v in scalar()) {
        let mut store = PathStore::new();
        store.set(&p, v.clone()).expect("set on empty store succeeds");

        prop_assert_eq!(store.get(&p), Some(&v));
        prop_assert!(store.has(&p));
    }

    /// PROPERTY: the full tree survives a value round-trip.
    #[test]
    fn property_tree_value_round_trip(
        entries in proptest::collection::vec((path(), scalar()), 1..=8)
    ) {
        let mut store = PathStore::new();
        for (p, v) in &entries {
            // Later writes may conflict with earlier scalars; that is an
            // expected error, not a property failure.
            let _ = store.set(p, v.clone());
        }

        let rebuilt = PathStore::from_value(store.as_value()).expect("round trip");
        prop_assert_eq!(rebuilt, store);
    }

    /// PROPERTY: get/has never panic on arbitrary path strings.
    #[test]
    fn property_lookup_never_panics(raw in "[ -~]{0,32}") {
        let mut store = PathStore::new();
        store.set("a.b", 1).unwrap();
        let _ = store.get(&raw);
        let _ = store.has(&raw);
    }

    /// PROPERTY: set never panics on arbitrary path strings; it either
    /// stores the value or reports an error.
    #[test]
    fn property_set_never_panics(raw in "[ -~]{0,32}", v in scalar()) {
        let mut store = PathStore::new();
        match store.set(&raw, v.clone()) {
            Ok(()) => prop_assert_eq!(store.get(&raw), Some(&v)),
            Err(_) => prop_assert!(!store.has(&raw)),
        }
    }
}
