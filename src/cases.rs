//! DS calculation cases: a DNSKEY at an owner name, plus optional reference
//! DS records to compare the computed ones against.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::parse_digest_type;
use crate::dnssec::{DigestRegistry, DnskeyRecord, DomainName, DsRecord};
use crate::error::{ConfigError, DsError};

/// A case as written in a TOML case file
#[derive(Debug, Clone, Deserialize)]
pub struct DsCase {
    pub owner: String,
    pub flags: i64,
    pub protocol: i64,
    pub algorithm: i64,
    pub public_key: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    /// Digest type (number or mnemonic) to reference DS RDATA
    #[serde(default)]
    pub expect: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaseFile {
    #[serde(default, rename = "case")]
    pub cases: Vec<DsCase>,
}

impl CaseFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let file = Self::parse(&content)?;
        info!(
            "Loaded {} cases from {}",
            file.cases.len(),
            path.as_ref().display()
        );
        Ok(file)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// A validated case, ready to compute
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCase {
    pub owner: DomainName,
    pub dnskey: DnskeyRecord,
    pub ttl: u32,
    pub expected: BTreeMap<u8, DsRecord>,
}

impl DsCase {
    pub fn resolve(&self, default_ttl: u32) -> Result<ResolvedCase, ConfigError> {
        let owner: DomainName = self.owner.parse()?;
        // Reuse the presentation parser so range errors are reported as
        // malformed keys
        let dnskey: DnskeyRecord = format!(
            "{} {} {} {}",
            self.flags, self.protocol, self.algorithm, self.public_key
        )
        .parse()?;

        let mut expected = BTreeMap::new();
        for (digest_type, rdata) in &self.expect {
            let digest_type = parse_digest_type(digest_type)?;
            let ds: DsRecord = rdata.parse()?;
            if ds.digest_type() != digest_type {
                return Err(DsError::InvalidDs(format!(
                    "reference '{}' is listed under digest type {}",
                    rdata, digest_type
                ))
                .into());
            }
            expected.insert(digest_type, ds);
        }

        Ok(ResolvedCase {
            owner,
            dnskey,
            ttl: self.ttl.unwrap_or(default_ttl),
            expected,
        })
    }
}

/// The `example.com.` ECDSA P-256 KSK with its reference DS records
pub fn reference_case(ttl: u32) -> Result<ResolvedCase, ConfigError> {
    let case = DsCase {
        owner: "example.com.".to_string(),
        flags: 257,
        protocol: 3,
        algorithm: 13,
        public_key:
            "6a81escFb5QysOzJopVCPslEyldHJxOlNIq3ol0xZPeLn6HBLwdRIaxz1aYpefJHPaj+seBti4j5gLWYetY3vA=="
                .to_string(),
        ttl: Some(ttl),
        expect: BTreeMap::from([
            (
                "1".to_string(),
                "20545 13 1 40BD7CF025EEB433F9E74127009BD0AF8C16F449".to_string(),
            ),
            (
                "2".to_string(),
                "20545 13 2 E460EAB7D69ABDE51078BC27CE8377074CA94EE05F5A609E5593C5E25ACF2BF4"
                    .to_string(),
            ),
            (
                "3".to_string(),
                "20545 13 3 9B8E8392B2C8203CEC672AE891329221678CE06E5FE861DB61688F0C1CA0B494"
                    .to_string(),
            ),
            (
                "4".to_string(),
                "20545 13 4 99436F3FB883CA4F077798C206037D97A34560245E57F1FFB10222B12AB8BD73755B1C41BFF6CF039E942CD3CB3950C1"
                    .to_string(),
            ),
        ]),
    };
    case.resolve(ttl)
}

/// One computed DS record and its reference, if any
#[derive(Debug, Clone)]
pub struct Outcome {
    pub digest_type: u8,
    pub reference: Option<String>,
    pub computed: Result<String, DsError>,
    pub matched: Option<bool>,
}

impl Outcome {
    /// `REF:`/`CALC:` lines followed by a blank line
    pub fn report(&self) -> String {
        let mut out = String::new();
        if let Some(reference) = &self.reference {
            out.push_str(&format!("REF:\t{}\n", reference));
        }
        match &self.computed {
            Ok(line) => out.push_str(&format!("CALC:\t{}\n", line)),
            Err(e) => out.push_str(&format!("ERROR:\t{}\n", e)),
        }
        out.push('\n');
        out
    }

    pub fn is_failure(&self) -> bool {
        self.computed.is_err() || self.matched == Some(false)
    }
}

impl ResolvedCase {
    /// Compute the DS record for each digest type and compare with the
    /// references
    pub fn run(&self, digest_types: &[u8], registry: &DigestRegistry) -> Vec<Outcome> {
        digest_types
            .iter()
            .map(|&digest_type| {
                let reference = self.expected.get(&digest_type);
                let computed = DsRecord::compute(&self.owner, &self.dnskey, digest_type, registry);

                let matched = match (&computed, reference) {
                    (Ok(ds), Some(reference)) => {
                        let matched = ds == reference;
                        if matched {
                            debug!("{} digest type {} matches reference", self.owner, digest_type);
                        } else {
                            warn!(
                                "{} digest type {} differs from reference",
                                self.owner, digest_type
                            );
                        }
                        Some(matched)
                    }
                    (Err(e), _) => {
                        warn!("{} digest type {}: {}", self.owner, digest_type, e);
                        None
                    }
                    (Ok(_), None) => None,
                };

                Outcome {
                    digest_type,
                    reference: reference.map(|ds| ds.to_zone_line(&self.owner, self.ttl)),
                    computed: computed.map(|ds| ds.to_zone_line(&self.owner, self.ttl)),
                    matched,
                }
            })
            .collect()
    }
}
