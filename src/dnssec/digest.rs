use std::collections::HashMap;
use std::fmt;

use gost94::{Digest, Gost94CryptoPro};
use tracing::trace;

use crate::error::{DsError, Result};

/// DS digest type algorithms (RFC 4034, 4509, 5933, 6605)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DigestType {
    /// SHA-1 (RFC 3658)
    Sha1 = 1,
    /// SHA-256 (RFC 4509)
    Sha256 = 2,
    /// GOST R 34.11-94 (RFC 5933)
    Gost94 = 3,
    /// SHA-384 (RFC 6605)
    Sha384 = 4,
}

impl DigestType {
    /// Every digest type the default registry knows, in number order
    pub const ALL: [DigestType; 4] = [Self::Sha1, Self::Sha256, Self::Gost94, Self::Sha384];

    /// Create from digest type number
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Sha1),
            2 => Some(Self::Sha256),
            3 => Some(Self::Gost94),
            4 => Some(Self::Sha384),
            _ => None,
        }
    }

    /// Convert to digest type number
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Check if digest type is recommended (RFC 8624)
    pub fn is_recommended(&self) -> bool {
        matches!(self, Self::Sha256)
    }

    /// Get the expected digest length in bytes
    pub fn digest_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Gost94 => 32,
            Self::Sha384 => 48,
        }
    }

    /// The built-in hash primitive for this digest type
    pub fn primitive(&self) -> Box<dyn HashPrimitive> {
        match self {
            Self::Sha1 => Box::new(RingDigest::new(
                "SHA-1",
                &ring::digest::SHA1_FOR_LEGACY_USE_ONLY,
            )),
            Self::Sha256 => Box::new(RingDigest::new("SHA-256", &ring::digest::SHA256)),
            Self::Gost94 => Box::new(GostDigest),
            Self::Sha384 => Box::new(RingDigest::new("SHA-384", &ring::digest::SHA384)),
        }
    }
}

impl fmt::Display for DigestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => write!(f, "SHA1"),
            Self::Sha256 => write!(f, "SHA256"),
            Self::Gost94 => write!(f, "GOST94"),
            Self::Sha384 => write!(f, "SHA384"),
        }
    }
}

/// A hash function that can back a DS digest type.
///
/// Implementations must be pure: the same input always yields the same
/// output, and `digest` may be called from several threads at once.
pub trait HashPrimitive: Send + Sync {
    fn name(&self) -> &'static str;

    fn output_len(&self) -> usize;

    fn digest(&self, data: &[u8]) -> Vec<u8>;
}

/// SHA family digests from ring
pub struct RingDigest {
    name: &'static str,
    algorithm: &'static ring::digest::Algorithm,
}

impl RingDigest {
    pub fn new(name: &'static str, algorithm: &'static ring::digest::Algorithm) -> Self {
        Self { name, algorithm }
    }
}

impl HashPrimitive for RingDigest {
    fn name(&self) -> &'static str {
        self.name
    }

    fn output_len(&self) -> usize {
        self.algorithm.output_len()
    }

    fn digest(&self, data: &[u8]) -> Vec<u8> {
        ring::digest::digest(self.algorithm, data).as_ref().to_vec()
    }
}

/// GOST R 34.11-94 with the CryptoPro S-box, as required by RFC 5933
pub struct GostDigest;

impl HashPrimitive for GostDigest {
    fn name(&self) -> &'static str {
        "GOST R 34.11-94"
    }

    fn output_len(&self) -> usize {
        32
    }

    fn digest(&self, data: &[u8]) -> Vec<u8> {
        Gost94CryptoPro::digest(data).to_vec()
    }
}

/// Lookup table from DS digest type number to hash primitive.
///
/// Built once at start-up and then shared read-only.
pub struct DigestRegistry {
    primitives: HashMap<u8, Box<dyn HashPrimitive>>,
}

impl DigestRegistry {
    /// An empty registry with no digest types
    pub fn empty() -> Self {
        Self {
            primitives: HashMap::new(),
        }
    }

    /// A registry with SHA-1, SHA-256, GOST R 34.11-94 and SHA-384
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for digest_type in DigestType::ALL {
            registry.register(digest_type.to_u8(), digest_type.primitive());
        }
        registry
    }

    /// Register a primitive under a digest type number, replacing any
    /// previous one. Returns the replaced primitive.
    pub fn register(
        &mut self,
        digest_type: u8,
        primitive: Box<dyn HashPrimitive>,
    ) -> Option<Box<dyn HashPrimitive>> {
        trace!(
            "Registering {} for digest type {}",
            primitive.name(),
            digest_type
        );
        self.primitives.insert(digest_type, primitive)
    }

    pub fn get(&self, digest_type: u8) -> Option<&dyn HashPrimitive> {
        self.primitives.get(&digest_type).map(|p| p.as_ref())
    }

    pub fn is_supported(&self, digest_type: u8) -> bool {
        self.primitives.contains_key(&digest_type)
    }

    /// Registered digest type numbers in ascending order
    pub fn digest_types(&self) -> Vec<u8> {
        let mut types: Vec<u8> = self.primitives.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Hash `data` with the primitive registered for `digest_type`
    pub fn digest(&self, digest_type: u8, data: &[u8]) -> Result<Vec<u8>> {
        let primitive = self
            .get(digest_type)
            .ok_or(DsError::UnsupportedAlgorithm(digest_type))?;
        Ok(primitive.digest(data))
    }
}

impl Default for DigestRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for DigestRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for digest_type in self.digest_types() {
            if let Some(primitive) = self.get(digest_type) {
                map.entry(&digest_type, &primitive.name());
            }
        }
        map.finish()
    }
}
