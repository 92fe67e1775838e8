use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DsError {
    #[error("Invalid domain name: {0}")]
    InvalidName(String),

    #[error("Unsupported digest type: {0}")]
    UnsupportedAlgorithm(u8),

    #[error("Malformed DNSKEY: {0}")]
    MalformedKey(String),

    #[error("Invalid DS record: {0}")]
    InvalidDs(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    #[error("Invalid digest type: {0}")]
    InvalidDigestType(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Ds(#[from] DsError),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DsError>;
