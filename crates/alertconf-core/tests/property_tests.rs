//! # Property-Based Tests
//!
//! Determinism and equality invariants of fingerprinting and assembly.

use alertconf_core::primitives::{DEFAULT_ROUTE_ANNOTATION_KEY, SPEC_DATA_KEY, TYPE_ANNOTATION_KEY};
use alertconf_core::{ConfigAssembler, ConfigMap, Fingerprint, render};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn entries() -> impl Strategy<Value = Vec<(String, String)>> {
    vec(("[a-z.]{1,8}", "[ -~]{0,16}"), 0..12)
}

fn route_record(ns: &str, name: &str, receiver: &str, is_default: bool) -> ConfigMap {
    let record = ConfigMap::new(ns, name)
        .with_annotation(TYPE_ANNOTATION_KEY, "route")
        .with_data(SPEC_DATA_KEY, format!("receiver: r-{receiver}"));
    if is_default {
        record.with_annotation(DEFAULT_ROUTE_ANNOTATION_KEY, "true")
    } else {
        record
    }
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Building the same map in any insertion order yields the same fingerprint.
    #[test]
    fn fingerprint_ignores_insertion_order(pairs in entries(), rotation in 0usize..16) {
        let forward: BTreeMap<String, String> = pairs.into_iter().collect();

        let mut items: Vec<(String, String)> = forward.clone().into_iter().collect();
        if !items.is_empty() {
            let k = rotation % items.len();
            items.rotate_left(k);
        }
        items.reverse();
        let backward: BTreeMap<String, String> = items.into_iter().collect();

        prop_assert_eq!(Fingerprint::of(&forward), Fingerprint::of(&backward));
    }

    /// Maps that differ in any key or value never share a fingerprint.
    #[test]
    fn distinct_maps_have_distinct_fingerprints(
        a in btree_map("[a-z]{1,4}", "[a-z]{0,4}", 0..6),
        b in btree_map("[a-z]{1,4}", "[a-z]{0,4}", 0..6),
    ) {
        prop_assert_eq!(a == b, Fingerprint::of(&a) == Fingerprint::of(&b));
    }

    /// Listing order never changes the rendered document.
    #[test]
    fn rendered_document_ignores_listing_order(
        receivers in vec("[a-z]{1,6}", 0..8),
        rotation in 0usize..16,
    ) {
        let mut records = vec![route_record("m", "root", "ops", true)];
        for (i, name) in receivers.iter().enumerate() {
            records.push(route_record("team", &format!("route-{i}"), name, false));
        }

        let baseline = ConfigAssembler::assemble(&records, None).expect("assemble");

        let len = records.len();
        records.rotate_left(rotation % len);
        records.reverse();
        let permuted = ConfigAssembler::assemble(&records, None).expect("assemble");

        prop_assert_eq!(
            render(&baseline.config).expect("render"),
            render(&permuted.config).expect("render")
        );
    }

    /// Every non-default route ends up as a direct child with no grandchildren.
    #[test]
    fn tree_is_exactly_one_level_deep(count in 0usize..20) {
        let mut records = vec![route_record("m", "root", "ops", true)];
        for i in 0..count {
            let nested = format!("receiver: r{i}\nroutes:\n  - receiver: nested\n");
            records.push(
                ConfigMap::new("m", format!("child-{i:02}"))
                    .with_annotation(TYPE_ANNOTATION_KEY, "route")
                    .with_data(SPEC_DATA_KEY, nested),
            );
        }

        let assembly = ConfigAssembler::assemble(&records, None).expect("assemble");
        let root = assembly.config.route.expect("route");
        prop_assert_eq!(root.routes.len(), count);
        prop_assert!(root.routes.iter().all(|r| r.routes.is_empty()));
    }
}
