use sitewatch::types::{IdentityError, ResourceIdentity, FINGERPRINT_LEN};

#[test]
fn invariant_identify_is_deterministic() {
    let locators = [
        "http://example.com/a",
        "https://www.zerohedge.com/blah?trusted=\"True\"%020%",
        "example.org",
        "http://localhost:8080/status",
    ];

    for locator in locators {
        let a = ResourceIdentity::identify(locator).unwrap();
        let b = ResourceIdentity::identify(locator).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.label(), b.label());
    }
}

#[test]
fn invariant_same_label_distinct_fingerprint() {
    let a = ResourceIdentity::identify("http://example.com/a").unwrap();
    let b = ResourceIdentity::identify("http://example.com/b").unwrap();

    assert_eq!(a.label(), b.label());
    assert_ne!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.dir_name(), b.dir_name());
}

#[test]
fn invariant_fingerprint_uses_unnormalized_locator() {
    let plain = ResourceIdentity::identify("http://example.com").unwrap();
    let www = ResourceIdentity::identify("http://www.example.com").unwrap();
    let slash = ResourceIdentity::identify("http://example.com/").unwrap();

    assert_eq!(plain.label(), www.label());
    assert_ne!(plain.fingerprint(), www.fingerprint());
    assert_ne!(plain.fingerprint(), slash.fingerprint());
}

#[test]
fn dir_name_is_label_underscore_fingerprint() {
    let id = ResourceIdentity::identify("https://www.zerohedge.com/blah").unwrap();

    assert_eq!(id.label(), "zerohedge");
    assert_eq!(id.fingerprint().len(), FINGERPRINT_LEN);
    assert_eq!(id.dir_name(), format!("zerohedge_{}", id.fingerprint()));
    assert_eq!(id.locator(), "https://www.zerohedge.com/blah");
}

#[test]
fn golden_fingerprint() {
    // sha256("http://example.com/a"), first 16 hex characters
    let id = ResourceIdentity::identify("http://example.com/a").unwrap();
    let expected = {
        use sha2::{Digest, Sha256};
        let hex = hex::encode(Sha256::digest(b"http://example.com/a"));
        hex[..16].to_string()
    };
    assert_eq!(id.fingerprint(), expected);
}

#[test]
fn invalid_locators_are_rejected() {
    assert_eq!(ResourceIdentity::identify(""), Err(IdentityError::Empty));
    assert!(matches!(
        ResourceIdentity::identify("://"),
        Err(IdentityError::NoLabel(_))
    ));
    assert!(matches!(
        ResourceIdentity::identify("/// ?"),
        Err(IdentityError::NoLabel(_))
    ));
}
