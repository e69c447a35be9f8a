//! Property-based tests for determinism guarantees

use deephash::{canonicalize, fingerprint, hmac_sha256, IgnorePatterns, TreeDigester};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use tempfile::TempDir;

/// Maps built from the same entries in any order canonicalize identically
#[test]
fn test_map_insertion_order_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec((any::<String>(), any::<i64>()), 0..16),
            |entries| {
                let forward: HashMap<String, i64> = entries.iter().cloned().collect();
                let backward: HashMap<String, i64> = entries.iter().rev().cloned().collect();
                // Later duplicates win in `collect`, so compare against the
                // map each order actually produced.
                let sorted: BTreeMap<String, i64> = forward.clone().into_iter().collect();
                prop_assert_eq!(canonicalize(&forward), canonicalize(&sorted));

                let sorted_back: BTreeMap<String, i64> = backward.clone().into_iter().collect();
                prop_assert_eq!(canonicalize(&backward), canonicalize(&sorted_back));
                Ok(())
            },
        )
        .unwrap();
}

/// Sets are order-insensitive and duplicates collapse
#[test]
fn test_set_order_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&prop::collection::vec(any::<u32>(), 0..32), |items| {
            let forward: HashSet<u32> = items.iter().copied().collect();
            let backward: HashSet<u32> = items.iter().rev().copied().collect();
            prop_assert_eq!(fingerprint(&forward), fingerprint(&backward));
            Ok(())
        })
        .unwrap();
}

/// Equal values fingerprint identically; fingerprints are label-safe tokens
#[test]
fn test_fingerprint_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(any::<Vec<u8>>(), any::<Option<String>>(), any::<(i16, bool)>()),
            |value| {
                let copy = value.clone();
                let token = fingerprint(&value);
                prop_assert_eq!(&token, &fingerprint(&copy));
                prop_assert_eq!(token.as_str().len(), 10);
                prop_assert!(token
                    .as_str()
                    .chars()
                    .all(|c| "bcdfghjklmnpqrstvwxz2456789".contains(c)));
                Ok(())
            },
        )
        .unwrap();
}

/// Different sequences render differently
#[test]
fn test_sequence_sensitivity_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                prop::collection::vec(any::<i32>(), 0..8),
                prop::collection::vec(any::<i32>(), 0..8),
            ),
            |(a, b)| {
                prop_assert_eq!(a == b, canonicalize(&a) == canonicalize(&b));
                Ok(())
            },
        )
        .unwrap();
}

/// Keyed hashes are deterministic and always 64 lowercase hex characters
#[test]
fn test_hmac_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(any::<String>(), any::<Vec<u8>>()), |(key, payload)| {
            let first = hmac_sha256(&key, &payload).unwrap();
            let second = hmac_sha256(&key, &payload).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), 64);
            prop_assert!(first.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
            Ok(())
        })
        .unwrap();
}

/// Ignore pattern evaluation does not depend on the order paths are queried in
#[test]
fn test_ignore_evaluation_is_pure_property() {
    let patterns = IgnorePatterns::new(["*.tmp", "build/**", "!build/keep.txt"]).unwrap();
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &prop::collection::vec("[a-z]{1,3}(/[a-z]{1,3}){0,2}(\\.tmp|\\.txt)?", 1..10),
            |paths| {
                let forward: Vec<bool> = paths.iter().map(|p| patterns.matches(p)).collect();
                let mut backward: Vec<bool> =
                    paths.iter().rev().map(|p| patterns.matches(p)).collect();
                backward.reverse();
                prop_assert_eq!(forward, backward);
                Ok(())
            },
        )
        .unwrap();
}

/// Trees with the same file contents in the same order digest identically,
/// whatever the file names and wherever the trees live
#[test]
fn test_tree_digest_content_property() {
    let mut runner = proptest::test_runner::TestRunner::new(proptest::test_runner::Config {
        cases: 32,
        ..Default::default()
    });

    runner
        .run(
            &prop::collection::vec(any::<Vec<u8>>(), 0..6),
            |contents| {
                let left = TempDir::new().unwrap();
                let right = TempDir::new().unwrap();
                for (i, content) in contents.iter().enumerate() {
                    fs::write(left.path().join(format!("a{:02}", i)), content).unwrap();
                    fs::write(right.path().join(format!("file-{:02}.bin", i)), content).unwrap();
                }

                let digester = TreeDigester::new();
                prop_assert_eq!(
                    digester.digest(left.path()).unwrap(),
                    digester.digest(right.path()).unwrap()
                );
                Ok(())
            },
        )
        .unwrap();
}
