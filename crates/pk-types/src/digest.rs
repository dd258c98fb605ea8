use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content fingerprint of a tracked file.
///
/// A `Digest` is stored as lowercase hex. Digests produced by patchkit are
/// 64-character BLAKE3 hashes, but any non-empty hex string is accepted when
/// parsing so that an index written by another tool can still be compared.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    /// Build a digest from raw hash bytes.
    pub fn from_hash(hash: &[u8]) -> Self {
        Self(hex::encode(hash))
    }

    /// Parse a hex digest, normalizing it to lowercase.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() {
            return Err(TypeError::InvalidDigest("empty digest".into()));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidDigest(format!("not hex: {s:?}")));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// The hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Digest {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Digest {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Digest> for String {
    fn from(d: Digest) -> Self {
        d.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hash_is_lowercase_hex() {
        let d = Digest::from_hash(&[0xAB, 0xCD, 0x01]);
        assert_eq!(d.as_str(), "abcd01");
    }

    #[test]
    fn parse_lowercases() {
        let d = Digest::parse("DEADbeef").unwrap();
        assert_eq!(d.as_str(), "deadbeef");
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(matches!(Digest::parse(""), Err(TypeError::InvalidDigest(_))));
    }

    #[test]
    fn parse_rejects_non_hex() {
        assert!(Digest::parse("xyz").is_err());
        assert!(Digest::parse("12 34").is_err());
        assert!(Digest::parse("ab|cd").is_err());
    }

    #[test]
    fn short_hex_handles_short_digests() {
        assert_eq!(Digest::parse("111").unwrap().short_hex(), "111");
        assert_eq!(Digest::from_hash(&[0xff; 32]).short_hex(), "ffffffff");
    }

    #[test]
    fn serde_rejects_bad_hex() {
        let ok: Digest = serde_json::from_str("\"00ff\"").unwrap();
        assert_eq!(ok.as_str(), "00ff");
        assert!(serde_json::from_str::<Digest>("\"nope\"").is_err());
    }
}
