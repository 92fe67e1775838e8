use std::fmt;
use std::str::FromStr;

use crate::error::{DsError, Result};

/// Maximum length of a single label (RFC 1035 section 2.3.4)
pub const MAX_LABEL_LEN: usize = 63;

/// Maximum length of an encoded name, including the root label
pub const MAX_NAME_LEN: usize = 255;

/// A fully-qualified domain name.
///
/// Labels keep the case they were created with. The root label is implicit
/// and never stored, so the root name has no labels at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName {
    labels: Vec<String>,
}

impl DomainName {
    /// The root name `.`
    pub fn root() -> Self {
        Self { labels: Vec::new() }
    }

    /// Build a name from its labels, most specific first.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();

        let mut wire_len = 1;
        for label in &labels {
            if label.is_empty() {
                return Err(DsError::InvalidName("empty label".to_string()));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DsError::InvalidName(format!(
                    "label '{}' is {} bytes, limit is {}",
                    label,
                    label.len(),
                    MAX_LABEL_LEN
                )));
            }
            wire_len += label.len() + 1;
        }

        if wire_len > MAX_NAME_LEN {
            return Err(DsError::InvalidName(format!(
                "encoded name is {} bytes, limit is {}",
                wire_len, MAX_NAME_LEN
            )));
        }

        Ok(Self { labels })
    }

    /// Decode an uncompressed wire-format name. The whole buffer must be
    /// consumed by the name.
    ///
    /// Labels are held as text, so a label that is not valid UTF-8 is
    /// rejected with `InvalidName` even though the wire format allows any
    /// octets.
    pub fn from_wire(data: &[u8]) -> Result<Self> {
        let mut labels = Vec::new();
        let mut pos = 0;

        loop {
            let len = *data
                .get(pos)
                .ok_or_else(|| DsError::InvalidName("truncated wire name".to_string()))?
                as usize;
            pos += 1;

            if len == 0 {
                break;
            }
            if len & 0xC0 != 0 {
                return Err(DsError::InvalidName(
                    "compressed or extended label type".to_string(),
                ));
            }

            let bytes = data
                .get(pos..pos + len)
                .ok_or_else(|| DsError::InvalidName("truncated wire name".to_string()))?;
            let label = std::str::from_utf8(bytes)
                .map_err(|_| DsError::InvalidName("label is not valid UTF-8".to_string()))?;
            labels.push(label.to_string());
            pos += len;
        }

        if pos != data.len() {
            return Err(DsError::InvalidName(format!(
                "{} trailing bytes after root label",
                data.len() - pos
            )));
        }

        Self::new(labels)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// Canonical wire form (RFC 4034 section 6.2): length-prefixed labels,
    /// ASCII letters lowercased, terminated by the root label.
    pub fn to_canonical_wire(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(self.wire_len());
        for label in &self.labels {
            wire.push(label.len() as u8);
            wire.extend(label.bytes().map(|b| b.to_ascii_lowercase()));
        }
        wire.push(0);
        wire
    }

    /// Length of the wire encoding in bytes
    pub fn wire_len(&self) -> usize {
        self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    /// Lowercased copy of this name
    pub fn to_lowercase(&self) -> Self {
        Self {
            labels: self
                .labels
                .iter()
                .map(|l| l.to_ascii_lowercase())
                .collect(),
        }
    }
}

impl FromStr for DomainName {
    type Err = DsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DsError::InvalidName("empty name".to_string()));
        }
        if s == "." {
            return Ok(Self::root());
        }

        let s = s.strip_suffix('.').unwrap_or(s);
        Self::new(s.split('.'))
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return write!(f, ".");
        }
        for label in &self.labels {
            write!(f, "{}.", label)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_wire_lowercases() {
        let name: DomainName = "Example.COM.".parse().unwrap();
        assert_eq!(
            name.to_canonical_wire(),
            b"\x07example\x03com\x00".to_vec()
        );
        // Presentation keeps the original case
        assert_eq!(name.to_string(), "Example.COM.");
    }

    #[test]
    fn test_trailing_dot_optional() {
        let a: DomainName = "example.com".parse().unwrap();
        let b: DomainName = "example.com.".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_root_name() {
        let root: DomainName = ".".parse().unwrap();
        assert!(root.is_root());
        assert_eq!(root.to_canonical_wire(), vec![0]);
        assert_eq!(root.to_string(), ".");
    }

    #[test]
    fn test_label_too_long() {
        let label = "a".repeat(64);
        let err = format!("{}.com.", label).parse::<DomainName>().unwrap_err();
        assert!(matches!(err, DsError::InvalidName(_)));

        // 63 is still fine
        let label = "a".repeat(63);
        assert!(format!("{}.com.", label).parse::<DomainName>().is_ok());
    }

    #[test]
    fn test_name_too_long() {
        // 4 * (63 + 1) + 1 = 257 bytes
        let label = "a".repeat(63);
        let name = vec![label.as_str(); 4].join(".");
        let err = name.parse::<DomainName>().unwrap_err();
        assert!(matches!(err, DsError::InvalidName(_)));

        // 3 * 64 + 62 + 1 = 255 bytes, the largest legal name
        let last = "b".repeat(61);
        let name = format!("{}.{}", vec![label.as_str(); 3].join("."), last);
        let parsed: DomainName = name.parse().unwrap();
        assert_eq!(parsed.wire_len(), 255);
    }

    #[test]
    fn test_empty_interior_label() {
        assert!("a..b.".parse::<DomainName>().is_err());
        assert!("".parse::<DomainName>().is_err());
    }

    #[test]
    fn test_from_wire_round_trip() {
        let name: DomainName = "Sub.Example.Com.".parse().unwrap();
        let decoded = DomainName::from_wire(&name.to_canonical_wire()).unwrap();
        assert_eq!(decoded, name.to_lowercase());
        assert_eq!(decoded.labels(), &["sub", "example", "com"]);
    }

    #[test]
    fn test_from_wire_rejects_bad_input() {
        // Missing root label
        assert!(DomainName::from_wire(b"\x03com").is_err());
        // Compression pointer
        assert!(DomainName::from_wire(&[0xC0, 0x0C]).is_err());
        // Trailing garbage
        assert!(DomainName::from_wire(b"\x03com\x00\x01").is_err());
    }

    #[test]
    fn test_from_wire_rejects_binary_label() {
        let err = DomainName::from_wire(&[0x01, 0xFF, 0x00]).unwrap_err();
        assert!(matches!(err, DsError::InvalidName(_)));
    }
}
