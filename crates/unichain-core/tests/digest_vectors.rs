//! # Digest Test Vectors
//!
//! Fixed inputs with their expected SHA-256 over the JCS encoding. Any other
//! implementation that canonicalizes ledger records with RFC 8785 must
//! reproduce these hex strings exactly.

use unichain_core::{sha256_digest, CanonicalBytes, ContentDigest};

fn digest_hex(data: &impl serde::Serialize) -> String {
    let cb = CanonicalBytes::new(data).expect("canonicalization should succeed");
    sha256_digest(&cb).to_hex()
}

#[test]
fn transaction_content_fields() {
    let fields = serde_json::json!({
        "kind": "ISSUANCE",
        "credentialHash": "abc",
        "credentialId": "CAD-1",
        "subjectWalletAddress": "w1",
        "revoked": false,
    });
    let cb = CanonicalBytes::new(&fields).unwrap();
    assert_eq!(
        std::str::from_utf8(cb.as_bytes()).unwrap(),
        r#"{"credentialHash":"abc","credentialId":"CAD-1","kind":"ISSUANCE","revoked":false,"subjectWalletAddress":"w1"}"#
    );
    assert_eq!(
        digest_hex(&fields),
        "98a0f547c33016a5528ddf465d6a0819f011d8ac655472f51c94d583456c7d68"
    );
}

#[test]
fn bare_string() {
    assert_eq!(
        digest_hex(&"sha256:00"),
        "413e3cf588538ddff537fcbe2aab5aa2d6b37669db04c0d262c20ac07b69ee94"
    );
}

#[test]
fn genesis_link() {
    assert_eq!(
        digest_hex(&serde_json::json!({"previousHash": "0"})),
        "74a188e6aab5fc288c7b6c4fdc1b339b3815090976a776f973170c5eeae15d7f"
    );
}

#[test]
fn digest_string_form_parses_back() {
    let d = sha256_digest(&CanonicalBytes::new(&"CAD-1").unwrap());
    let parsed: ContentDigest = d.to_string().parse().unwrap();
    assert_eq!(parsed, d);
}
