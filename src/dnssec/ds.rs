use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::constants::CLASS_IN;
use super::{DigestRegistry, DnskeyRecord, DomainName};
use crate::error::{DsError, Result};

/// Delegation Signer record data (RFC 4034 section 5)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsRecord {
    key_tag: u16,
    algorithm: u8,
    digest_type: u8,
    digest: Vec<u8>,
}

impl DsRecord {
    /// Compute the DS record for `dnskey` published at `owner`.
    ///
    /// digest = Hash(canonical owner name | DNSKEY RDATA)
    pub fn compute(
        owner: &DomainName,
        dnskey: &DnskeyRecord,
        digest_type: u8,
        registry: &DigestRegistry,
    ) -> Result<Self> {
        let primitive = registry
            .get(digest_type)
            .ok_or(DsError::UnsupportedAlgorithm(digest_type))?;

        let rdata = dnskey.to_rdata();
        let mut data = owner.to_canonical_wire();
        data.extend_from_slice(&rdata);

        let digest = primitive.digest(&data);
        let key_tag = super::calculate_key_tag(&rdata);

        debug!(
            "Computed {} DS for {} key tag {} ({} bytes hashed)",
            primitive.name(),
            owner,
            key_tag,
            data.len()
        );

        Ok(Self {
            key_tag,
            algorithm: dnskey.algorithm(),
            digest_type,
            digest,
        })
    }

    pub fn key_tag(&self) -> u16 {
        self.key_tag
    }

    pub fn algorithm(&self) -> u8 {
        self.algorithm
    }

    pub fn digest_type(&self) -> u8 {
        self.digest_type
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Uppercase hex of the digest, no separators
    pub fn digest_hex(&self) -> String {
        hex::encode_upper(&self.digest)
    }

    /// Check whether this DS record refers to `dnskey` at `owner`
    pub fn matches(
        &self,
        owner: &DomainName,
        dnskey: &DnskeyRecord,
        registry: &DigestRegistry,
    ) -> Result<bool> {
        if self.key_tag != dnskey.key_tag() || self.algorithm != dnskey.algorithm() {
            return Ok(false);
        }
        let computed = Self::compute(owner, dnskey, self.digest_type, registry)?;
        Ok(computed.digest == self.digest)
    }

    /// Render as a zone file line:
    /// `<owner>\t<ttl>\tIN\tDS\t<keytag> <algorithm> <digesttype> <digest>`
    pub fn to_zone_line(&self, owner: &DomainName, ttl: u32) -> String {
        format!("{}\t{}\t{}\tDS\t{}", owner, ttl, CLASS_IN, self)
    }
}

impl fmt::Display for DsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.key_tag,
            self.algorithm,
            self.digest_type,
            self.digest_hex()
        )
    }
}

/// Parses the RDATA presentation form, e.g. `20545 13 2 E460EAB7...`
impl FromStr for DsRecord {
    type Err = DsError;

    fn from_str(s: &str) -> Result<Self> {
        let mut fields = s.split_whitespace();

        let mut next_number = |name: &str| -> Result<u64> {
            let field = fields
                .next()
                .ok_or_else(|| DsError::InvalidDs(format!("missing {}", name)))?;
            field
                .parse()
                .map_err(|_| DsError::InvalidDs(format!("{} '{}' is not a number", name, field)))
        };

        let key_tag = next_number("key tag")?;
        let algorithm = next_number("algorithm")?;
        let digest_type = next_number("digest type")?;

        let key_tag = u16::try_from(key_tag)
            .map_err(|_| DsError::InvalidDs(format!("key tag {} is out of range", key_tag)))?;
        let algorithm = u8::try_from(algorithm)
            .map_err(|_| DsError::InvalidDs(format!("algorithm {} is out of range", algorithm)))?;
        let digest_type = u8::try_from(digest_type).map_err(|_| {
            DsError::InvalidDs(format!("digest type {} is out of range", digest_type))
        })?;

        let digest_hex: String = fields.collect();
        if digest_hex.is_empty() {
            return Err(DsError::InvalidDs("missing digest".to_string()));
        }
        let digest = hex::decode(&digest_hex)
            .map_err(|e| DsError::InvalidDs(format!("invalid digest hex: {}", e)))?;

        Ok(Self {
            key_tag,
            algorithm,
            digest_type,
            digest,
        })
    }
}
