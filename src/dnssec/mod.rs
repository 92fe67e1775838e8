pub mod algorithm;
pub mod digest;
pub mod dnskey;
pub mod ds;
pub mod key_tag;
pub mod name;

pub use algorithm::DnsSecAlgorithm;
pub use digest::{DigestRegistry, DigestType, HashPrimitive};
pub use dnskey::DnskeyRecord;
pub use ds::DsRecord;
pub use key_tag::calculate_key_tag;
pub use name::DomainName;

/// DNSSEC constants
pub mod constants {
    /// Class literal used when rendering records
    pub const CLASS_IN: &str = "IN";

    /// Default TTL for rendered DS records
    pub const DEFAULT_DS_TTL: u32 = 3600;
}
