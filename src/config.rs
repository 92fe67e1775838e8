use crate::dnssec::DigestType;
use crate::dnssec::constants::DEFAULT_DS_TTL;
use crate::error::ConfigError;

/// Largest TTL allowed by RFC 2181 section 8
pub const MAX_TTL: u32 = 0x7FFF_FFFF;

#[derive(Debug, Clone, PartialEq)]
pub struct DsCalcConfig {
    /// TTL printed on rendered DS records
    pub ttl: u32,

    /// Digest type numbers to compute, in output order
    pub digest_types: Vec<u8>,

    /// TOML file with cases to run instead of the built-in reference case
    pub cases_file: Option<String>,

    /// Log at debug level
    pub verbose: bool,
}

impl Default for DsCalcConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_DS_TTL,
            digest_types: vec![
                DigestType::Sha256.to_u8(),
                DigestType::Gost94.to_u8(),
                DigestType::Sha384.to_u8(),
            ],
            cases_file: None,
            verbose: false,
        }
    }
}

impl DsCalcConfig {
    /// Create a DsCalcConfig from environment variables
    /// Returns Err if a variable is present but invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(ttl) = std::env::var("DSCALC_TTL") {
            config.ttl = parse_ttl(&ttl)?;
        }

        if let Ok(digest_types) = std::env::var("DSCALC_DIGEST_TYPES") {
            config.digest_types = parse_digest_types(&digest_types)?;
        }

        if let Ok(cases_file) = std::env::var("DSCALC_CASES_FILE") {
            if !cases_file.trim().is_empty() {
                config.cases_file = Some(cases_file.trim().to_string());
            }
        }

        if let Ok(verbose) = std::env::var("DSCALC_VERBOSE") {
            config.verbose = parse_bool(&verbose, false);
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl > MAX_TTL {
            return Err(ConfigError::InvalidTtl(format!(
                "{} exceeds the maximum of {}",
                self.ttl, MAX_TTL
            )));
        }

        if self.digest_types.is_empty() {
            return Err(ConfigError::InvalidDigestType(
                "At least one digest type is required".to_string(),
            ));
        }

        Ok(())
    }
}

pub fn parse_ttl(s: &str) -> Result<u32, ConfigError> {
    let ttl = s
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidTtl(s.to_string()))?;
    if ttl > MAX_TTL {
        return Err(ConfigError::InvalidTtl(format!(
            "{} exceeds the maximum of {}",
            ttl, MAX_TTL
        )));
    }
    Ok(ttl)
}

/// Parse a comma separated list of digest type numbers or mnemonics
/// (`2,3,4` or `sha256,gost,sha384`)
pub fn parse_digest_types(s: &str) -> Result<Vec<u8>, ConfigError> {
    let types = s
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(parse_digest_type)
        .collect::<Result<Vec<u8>, ConfigError>>()?;

    if types.is_empty() {
        return Err(ConfigError::InvalidDigestType(
            "No digest types provided".to_string(),
        ));
    }
    Ok(types)
}

pub fn parse_digest_type(s: &str) -> Result<u8, ConfigError> {
    if let Ok(number) = s.parse::<u8>() {
        return Ok(number);
    }

    let digest_type = match s.to_lowercase().replace('-', "").as_str() {
        "sha1" => DigestType::Sha1,
        "sha256" => DigestType::Sha256,
        "gost" | "gost94" | "gostcrypto" | "gost3411" => DigestType::Gost94,
        "sha384" => DigestType::Sha384,
        _ => return Err(ConfigError::InvalidDigestType(s.to_string())),
    };
    Ok(digest_type.to_u8())
}

/// Parse a boolean from a string, with a default value for invalid input
fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}
