//! Integration tests for keyed hashes

use deephash::{hmac_sha256, KeyedHashSigner};

#[test]
fn test_reference_vectors() {
    let cases = [
        (
            "",
            "",
            "b613679a0814d9ec772f95d778c35fc5ff1697c493715653c6c712144292c5ad",
        ),
        (
            "",
            "abcd",
            "527ff4c28c22a090fe39908139363e81b8fb10d0695a135518006abfa21cf5a2",
        ),
        (
            "abcd",
            "",
            "2722000cbc34892ac64a8fb9ef2b50fc824ea1984cb81e50d687648f2e88f724",
        ),
        (
            "abcd",
            "abcd",
            "e1a20dce13e4953e3d50e7f6651a0ce862a655fc84c35352447eff99a5a02852",
        ),
    ];

    for (key, payload, expected) in cases {
        assert_eq!(
            hmac_sha256(key, payload.as_bytes()).unwrap(),
            expected,
            "key {:?} payload {:?}",
            key,
            payload
        );
    }
}

#[test]
fn test_signer_matches_function() {
    let signer = KeyedHashSigner::new("release-key");
    let payload = b"apiVersion: v2\nname: demo\n";

    let tag = signer.sign(payload).unwrap();
    assert_eq!(tag, hmac_sha256("release-key", payload).unwrap());
    assert!(signer.verify(payload, &tag).unwrap());
    assert!(!signer.verify(b"tampered", &tag).unwrap());
    assert!(!KeyedHashSigner::new("other-key").verify(payload, &tag).unwrap());
}

#[test]
fn test_output_is_lowercase_hex() {
    let tag = hmac_sha256("k", b"v").unwrap();
    assert_eq!(tag.len(), 64);
    assert!(tag.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
}
