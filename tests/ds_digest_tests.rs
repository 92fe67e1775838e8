use dscalc::dnssec::{
    DigestRegistry, DigestType, DnskeyRecord, DomainName, DsRecord, calculate_key_tag,
};
use dscalc::DsError;

const EXAMPLE_KEY: &str =
    "6a81escFb5QysOzJopVCPslEyldHJxOlNIq3ol0xZPeLn6HBLwdRIaxz1aYpefJHPaj+seBti4j5gLWYetY3vA==";

fn example_owner() -> DomainName {
    "example.com.".parse().unwrap()
}

fn example_dnskey() -> DnskeyRecord {
    DnskeyRecord::from_base64(257, 3, 13, EXAMPLE_KEY).unwrap()
}

fn compute(digest_type: u8) -> DsRecord {
    let registry = DigestRegistry::with_defaults();
    DsRecord::compute(&example_owner(), &example_dnskey(), digest_type, &registry).unwrap()
}

#[test]
fn test_example_sha1() {
    let ds = compute(1);
    assert_eq!(ds.key_tag(), 20545);
    assert_eq!(ds.digest_hex(), "40BD7CF025EEB433F9E74127009BD0AF8C16F449");
}

#[test]
fn test_example_sha256() {
    let ds = compute(2);
    assert_eq!(ds.key_tag(), 20545);
    assert_eq!(ds.algorithm(), 13);
    assert_eq!(ds.digest_type(), 2);
    assert_eq!(
        ds.digest_hex(),
        "E460EAB7D69ABDE51078BC27CE8377074CA94EE05F5A609E5593C5E25ACF2BF4"
    );
}

#[test]
fn test_example_gost94() {
    let ds = compute(3);
    assert_eq!(ds.key_tag(), 20545);
    assert_eq!(ds.digest_type(), 3);
    assert_eq!(
        ds.digest_hex(),
        "9B8E8392B2C8203CEC672AE891329221678CE06E5FE861DB61688F0C1CA0B494"
    );
}

#[test]
fn test_example_sha384() {
    let ds = compute(4);
    assert_eq!(ds.key_tag(), 20545);
    assert_eq!(ds.digest_type(), 4);
    assert_eq!(
        ds.digest_hex(),
        "99436F3FB883CA4F077798C206037D97A34560245E57F1FFB10222B12AB8BD73755B1C41BFF6CF039E942CD3CB3950C1"
    );
}

#[test]
fn test_example_zone_lines() {
    let owner = example_owner();
    assert_eq!(
        compute(3).to_zone_line(&owner, 3600),
        "example.com.\t3600\tIN\tDS\t20545 13 3 \
         9B8E8392B2C8203CEC672AE891329221678CE06E5FE861DB61688F0C1CA0B494"
    );
}

#[test]
fn test_digest_lengths() {
    for digest_type in DigestType::ALL {
        let ds = compute(digest_type.to_u8());
        assert_eq!(ds.digest().len(), digest_type.digest_len(), "{}", digest_type);
    }
}

#[test]
fn test_computation_is_deterministic() {
    for digest_type in DigestType::ALL {
        assert_eq!(compute(digest_type.to_u8()), compute(digest_type.to_u8()));
    }
}

#[test]
fn test_key_tag_independent_of_digest_type() {
    let tags: Vec<u16> = DigestType::ALL
        .iter()
        .map(|d| compute(d.to_u8()).key_tag())
        .collect();
    assert!(tags.iter().all(|&tag| tag == 20545));
    assert_eq!(calculate_key_tag(&example_dnskey().to_rdata()), 20545);
}

#[test]
fn test_owner_name_changes_digest() {
    let registry = DigestRegistry::with_defaults();
    let dnskey = example_dnskey();
    let other: DomainName = "example.org.".parse().unwrap();

    for digest_type in DigestType::ALL {
        let a = DsRecord::compute(&example_owner(), &dnskey, digest_type.to_u8(), &registry)
            .unwrap();
        let b = DsRecord::compute(&other, &dnskey, digest_type.to_u8(), &registry).unwrap();
        assert_eq!(a.key_tag(), b.key_tag());
        assert_ne!(a.digest(), b.digest(), "{}", digest_type);
    }
}

#[test]
fn test_public_key_bit_flip_changes_digest() {
    let registry = DigestRegistry::with_defaults();
    let owner = example_owner();
    let original = example_dnskey();

    let mut key = original.public_key().to_vec();
    key[10] ^= 0x01;
    let flipped = DnskeyRecord::new(257, 3, 13, key).unwrap();

    let a = DsRecord::compute(&owner, &original, 2, &registry).unwrap();
    let b = DsRecord::compute(&owner, &flipped, 2, &registry).unwrap();
    assert_ne!(a.digest(), b.digest());
}

#[test]
fn test_unsupported_digest_type() {
    let registry = DigestRegistry::with_defaults();
    for digest_type in [0u8, 5, 255] {
        let result = DsRecord::compute(&example_owner(), &example_dnskey(), digest_type, &registry);
        assert_eq!(result, Err(DsError::UnsupportedAlgorithm(digest_type)));
    }
}

#[test]
fn test_matches_reference_records() {
    let registry = DigestRegistry::with_defaults();
    let references = [
        "20545 13 1 40BD7CF025EEB433F9E74127009BD0AF8C16F449",
        "20545 13 2 E460EAB7D69ABDE51078BC27CE8377074CA94EE05F5A609E5593C5E25ACF2BF4",
        "20545 13 3 9B8E8392B2C8203CEC672AE891329221678CE06E5FE861DB61688F0C1CA0B494",
        "20545 13 4 99436F3FB883CA4F077798C206037D97A34560245E57F1FFB10222B12AB8BD73755B1C41BFF6CF039E942CD3CB3950C1",
    ];

    for reference in references {
        let ds: DsRecord = reference.parse().unwrap();
        assert!(ds.matches(&example_owner(), &example_dnskey(), &registry).unwrap());
        assert_eq!(ds.to_string(), reference);
    }
}

#[test]
fn test_name_round_trip() {
    for text in [".", "com.", "Example.COM.", "a.b.c.d.example."] {
        let name: DomainName = text.parse().unwrap();
        let decoded = DomainName::from_wire(&name.to_canonical_wire()).unwrap();
        assert_eq!(decoded, name.to_lowercase());
    }
}

#[test]
fn test_registry_is_shareable_across_threads() {
    let registry = DigestRegistry::with_defaults();
    let owner = example_owner();
    let dnskey = example_dnskey();
    let expected = compute(2);

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let ds = DsRecord::compute(&owner, &dnskey, 2, &registry).unwrap();
                assert_eq!(ds, expected);
            });
        }
    });
}
