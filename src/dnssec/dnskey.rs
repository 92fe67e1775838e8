use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::warn;

use super::{DnsSecAlgorithm, calculate_key_tag};
use crate::error::{DsError, Result};

/// The only protocol value allowed in a DNSKEY (RFC 4034 section 2.1.2)
pub const DNSSEC_PROTOCOL: u8 = 3;

/// Zone Key flag, bit 7
pub const FLAG_ZONE_KEY: u16 = 0x0100;
/// Revoked flag, bit 8 (RFC 5011)
pub const FLAG_REVOKED: u16 = 0x0080;
/// Secure Entry Point flag, bit 15
pub const FLAG_SEP: u16 = 0x0001;

/// RDATA length is carried in the 16-bit RDLENGTH field
pub const MAX_RDATA_LEN: usize = u16::MAX as usize;

/// DNSKEY record data.
///
/// Construction checks the protocol field, that a key is present and that
/// the RDATA fits in 65535 bytes, so a value of this type always encodes to
/// well-formed RDATA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnskeyRecord {
    flags: u16,
    protocol: u8,
    algorithm: u8,
    public_key: Vec<u8>,
}

impl DnskeyRecord {
    pub fn new(flags: u16, protocol: u8, algorithm: u8, public_key: Vec<u8>) -> Result<Self> {
        if protocol != DNSSEC_PROTOCOL {
            return Err(DsError::MalformedKey(format!(
                "protocol must be {}, got {}",
                DNSSEC_PROTOCOL, protocol
            )));
        }
        if public_key.is_empty() {
            return Err(DsError::MalformedKey("empty public key".to_string()));
        }
        if 4 + public_key.len() > MAX_RDATA_LEN {
            return Err(DsError::MalformedKey(format!(
                "public key of {} bytes does not fit in DNSKEY RDATA",
                public_key.len()
            )));
        }

        if let Some(expected) = DnsSecAlgorithm::from_u8(algorithm)
            .and_then(|a| a.public_key_len())
            .filter(|&len| len != public_key.len())
        {
            warn!(
                "Public key for algorithm {} is {} bytes, expected {}",
                algorithm,
                public_key.len(),
                expected
            );
        }

        Ok(Self {
            flags,
            protocol,
            algorithm,
            public_key,
        })
    }

    /// Create from a base64 encoded public key. Whitespace inside the key is
    /// ignored, as it is in zone files.
    pub fn from_base64(flags: u16, protocol: u8, algorithm: u8, public_key: &str) -> Result<Self> {
        let compact: String = public_key.split_whitespace().collect();
        let public_key = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| DsError::MalformedKey(format!("invalid base64 public key: {}", e)))?;
        Self::new(flags, protocol, algorithm, public_key)
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    pub fn protocol(&self) -> u8 {
        self.protocol
    }

    pub fn algorithm(&self) -> u8 {
        self.algorithm
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn is_zone_key(&self) -> bool {
        self.flags & FLAG_ZONE_KEY != 0
    }

    pub fn is_secure_entry_point(&self) -> bool {
        self.flags & FLAG_SEP != 0
    }

    pub fn is_revoked(&self) -> bool {
        self.flags & FLAG_REVOKED != 0
    }

    /// Wire-format RDATA: flags, protocol, algorithm, public key
    pub fn to_rdata(&self) -> Vec<u8> {
        let mut rdata = Vec::with_capacity(4 + self.public_key.len());
        rdata.extend_from_slice(&self.flags.to_be_bytes());
        rdata.push(self.protocol);
        rdata.push(self.algorithm);
        rdata.extend_from_slice(&self.public_key);
        rdata
    }

    pub fn key_tag(&self) -> u16 {
        calculate_key_tag(&self.to_rdata())
    }
}

/// Parses the RDATA presentation form, e.g. `257 3 13 6a81escF...`
impl FromStr for DnskeyRecord {
    type Err = DsError;

    fn from_str(s: &str) -> Result<Self> {
        let mut fields = s.split_whitespace();

        let flags = parse_field::<u16>(fields.next(), "flags")?;
        let protocol = parse_field::<u8>(fields.next(), "protocol")?;
        let algorithm = parse_field::<u8>(fields.next(), "algorithm")?;

        let key: String = fields.collect();
        if key.is_empty() {
            return Err(DsError::MalformedKey("missing public key".to_string()));
        }

        Self::from_base64(flags, protocol, algorithm, &key)
    }
}

fn parse_field<T>(field: Option<&str>, name: &str) -> Result<T>
where
    T: TryFrom<u64>,
{
    let field = field.ok_or_else(|| DsError::MalformedKey(format!("missing {}", name)))?;
    let value: u64 = field
        .parse()
        .map_err(|_| DsError::MalformedKey(format!("{} '{}' is not a number", name, field)))?;
    T::try_from(value)
        .map_err(|_| DsError::MalformedKey(format!("{} {} is out of range", name, value)))
}

impl fmt::Display for DnskeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.flags,
            self.protocol,
            self.algorithm,
            STANDARD.encode(&self.public_key)
        )
    }
}
