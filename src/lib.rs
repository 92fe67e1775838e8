pub mod cases;
pub mod config;
pub mod dnssec;
pub mod error;

pub use dnssec::{DigestRegistry, DigestType, DnskeyRecord, DomainName, DsRecord};
pub use error::{ConfigError, DsError, Result};
