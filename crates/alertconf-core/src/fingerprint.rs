//! # Fingerprint Module
//!
//! Canonical content fingerprint of a record's `data` map.
//!
//! Encoding (hashed with BLAKE3):
//! - entry count as u64 little-endian
//! - for each entry in key order: key length (u64 LE), key bytes,
//!   value length (u64 LE), value bytes
//!
//! Length prefixes make the encoding injective, so two maps share a
//! fingerprint only if they are equal (up to a BLAKE3 collision). Identity
//! and metadata (namespace, name, labels, resource version) never take part.

use crate::ConfigMap;
use std::collections::BTreeMap;
use std::fmt;

/// A 256-bit content fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint a payload map.
    ///
    /// Iteration order of the source map is irrelevant: `BTreeMap` always
    /// walks keys in sorted order.
    #[must_use]
    pub fn of(data: &BTreeMap<String, String>) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(data.len() as u64).to_le_bytes());
        for (key, value) in data {
            hasher.update(&(key.len() as u64).to_le_bytes());
            hasher.update(key.as_bytes());
            hasher.update(&(value.len() as u64).to_le_bytes());
            hasher.update(value.as_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Fingerprint a record's payload.
    #[must_use]
    pub fn of_record(record: &ConfigMap) -> Self {
        Self::of(&record.data)
    }

    /// Lowercase hex rendering (64 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// True if both records carry the same payload.
#[must_use]
pub fn same_payload(a: &ConfigMap, b: &ConfigMap) -> bool {
    Fingerprint::of_record(a) == Fingerprint::of_record(b)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn insertion_order_is_irrelevant() {
        let a = map(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let b = map(&[("c", "3"), ("a", "1"), ("b", "2")]);
        assert_eq!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn boundary_shift_changes_fingerprint() {
        // "ab" => "c" and "a" => "bc" concatenate identically without length prefixes
        let a = map(&[("ab", "c")]);
        let b = map(&[("a", "bc")]);
        assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn empty_value_differs_from_missing_key() {
        let a = map(&[("a", "1")]);
        let b = map(&[("a", "1"), ("b", "")]);
        assert_ne!(Fingerprint::of(&a), Fingerprint::of(&b));
    }

    #[test]
    fn metadata_is_ignored() {
        let mut a = ConfigMap::new("one", "x").with_data("alertmanager.yml", "route: {}");
        a.metadata.resource_version = "17".to_string();
        let b = ConfigMap::new("two", "y")
            .with_annotation("foo", "bar")
            .with_data("alertmanager.yml", "route: {}");
        assert!(same_payload(&a, &b));
    }

    #[test]
    fn hex_is_stable() {
        let empty = Fingerprint::of(&BTreeMap::new());
        assert_eq!(empty.to_hex().len(), 64);
        assert_eq!(empty.to_string(), Fingerprint::of(&BTreeMap::new()).to_hex());
    }
}
