//! Integration tests for canonical forms and fingerprints of structured values

use deephash::canonical::{canonicalize_serde, Canonical, Canonicalizer, Serde};
use deephash::{canonicalize, fingerprint, fingerprint_serde};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

#[derive(Serialize)]
struct Release {
    name: String,
    namespace: Option<String>,
    values: HashMap<String, i64>,
    labels: BTreeSet<String>,
}

fn release(pairs: &[(&str, i64)]) -> Release {
    Release {
        name: "demo".to_string(),
        namespace: None,
        values: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        labels: ["tier=web", "app=demo"].iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn test_map_insertion_order_does_not_matter() {
    let forward = release(&[("replicas", 3), ("port", 8080), ("timeout", 30)]);
    let backward = release(&[("timeout", 30), ("port", 8080), ("replicas", 3)]);

    assert_eq!(canonicalize_serde(&forward), canonicalize_serde(&backward));
    assert_eq!(fingerprint_serde(&forward), fingerprint_serde(&backward));
}

#[test]
fn test_value_change_changes_fingerprint() {
    let a = release(&[("replicas", 3)]);
    let b = release(&[("replicas", 4)]);
    assert_ne!(fingerprint_serde(&a), fingerprint_serde(&b));
}

#[test]
fn test_fingerprint_shape() {
    let token = fingerprint_serde(&release(&[("replicas", 3)])).to_string();
    assert_eq!(token.len(), 10);
    assert!(token
        .chars()
        .all(|c| "bcdfghjklmnpqrstvwxz2456789".contains(c)));
}

#[test]
fn test_reference_fingerprints() {
    assert_eq!(fingerprint(&None::<i32>).as_str(), "7ff4bcbd88");
    assert_eq!(fingerprint(&1234i32).as_str(), "5b879d6c4b");
    assert_eq!(fingerprint("").as_str(), "598549cf7c");
}

#[test]
fn test_indirection_is_transparent() {
    let plain = 42u8;
    let boxed = Box::new(42u8);
    let nested = Some(&boxed);
    assert_eq!(canonicalize(&plain), canonicalize(&boxed));
    assert_eq!(canonicalize(&plain), canonicalize(&nested));
}

#[test]
fn test_hash_set_order_does_not_matter() {
    let a: HashSet<&str> = ["web", "db", "cache"].into_iter().collect();
    let b: HashSet<&str> = ["cache", "web", "db"].into_iter().collect();
    assert_eq!(canonicalize(&a), canonicalize(&b));
    assert_eq!(
        canonicalize(&a),
        r#"{(string)"cache":<nil>,(string)"db":<nil>,(string)"web":<nil>}"#
    );
}

#[test]
fn test_hash_map_and_btree_map_agree() {
    let hash: HashMap<&str, u32> = [("b", 2), ("a", 1)].into_iter().collect();
    let btree: BTreeMap<&str, u32> = [("a", 1), ("b", 2)].into_iter().collect();
    assert_eq!(canonicalize(&hash), canonicalize(&btree));
}

#[test]
fn test_serde_and_manual_records_agree() {
    #[derive(Serialize)]
    struct Port {
        name: &'static str,
        number: u16,
    }

    struct ManualPort {
        name: &'static str,
        number: u16,
    }

    impl Canonical for ManualPort {
        fn canonicalize(&self, out: &mut Canonicalizer) {
            out.record("Port", &[("name", &self.name), ("number", &self.number)]);
        }
    }

    let derived = Port {
        name: "http",
        number: 80,
    };
    let manual = ManualPort {
        name: "http",
        number: 80,
    };
    assert_eq!(canonicalize(&Serde(&derived)), canonicalize(&manual));
}

#[test]
fn test_json_documents_with_reordered_keys_agree() {
    let a: serde_json::Value =
        serde_json::from_str(r#"{"image": {"tag": "1.0", "repo": "nginx"}, "replicas": 2}"#)
            .unwrap();
    let b: serde_json::Value =
        serde_json::from_str(r#"{"replicas": 2, "image": {"repo": "nginx", "tag": "1.0"}}"#)
            .unwrap();
    assert_eq!(fingerprint(&a), fingerprint(&b));
}

#[test]
fn test_json_document_fingerprints_agree_across_entry_points() {
    let doc: serde_json::Value =
        serde_json::from_str(r#"{"replicas": 3, "name": "demo", "offset": -1, "ratio": 0.25}"#)
            .unwrap();
    assert_eq!(canonicalize(&doc), canonicalize_serde(&doc));
    assert_eq!(fingerprint(&doc), fingerprint_serde(&doc));

    #[derive(Serialize)]
    struct Chart {
        values: serde_json::Value,
    }

    struct ManualChart<'a> {
        values: &'a serde_json::Value,
    }

    impl Canonical for ManualChart<'_> {
        fn canonicalize(&self, out: &mut Canonicalizer) {
            out.record("Chart", &[("values", &self.values)]);
        }
    }

    let derived = Chart {
        values: doc.clone(),
    };
    assert_eq!(
        fingerprint_serde(&derived),
        fingerprint(&ManualChart { values: &doc })
    );
}
