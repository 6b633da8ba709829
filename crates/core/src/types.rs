use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ArckanaError, Result};

/// 32-byte digest (leaf, internal node or root)
pub type Hash = [u8; 32];

/// Root reported when there is nothing to commit to
pub const ZERO_HASH: Hash = [0u8; 32];

/// Length of an EVM account address in bytes
pub const ADDRESS_LEN: usize = 20;

/// 20-byte EVM account address.
///
/// Parsing is case-insensitive and the `0x` prefix is optional; display is
/// always lower-case with a `0x` prefix. Ordering is byte-wise, which is
/// the same as ordering the lower-case hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// ABI word layout: 12 zero bytes followed by the address.
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[32 - ADDRESS_LEN..].copy_from_slice(&self.0);
        word
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = ArckanaError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = strip_hex_prefix(trimmed);
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(ArckanaError::InvalidAddress(trimmed.to_string()));
        }
        let bytes = hex::decode(digits).map_err(|_| ArckanaError::InvalidAddress(trimmed.to_string()))?;
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How a repeated holder address is resolved when building the balance set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later record replaces the earlier one
    #[default]
    LastWins,
    /// Balances are summed
    Merge,
    /// The run fails
    Reject,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastWins => "last_wins",
            Self::Merge => "merge",
            Self::Reject => "reject",
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_wins" | "last" => Ok(Self::LastWins),
            "merge" | "sum" => Ok(Self::Merge),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown duplicate policy: {other}")),
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Render a digest as `0x` + 64 lower-case hex characters.
pub fn hash_to_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse a `0x`-prefixed (or bare) 64-character hex digest.
pub fn hash_from_hex(s: &str) -> Result<Hash> {
    let trimmed = s.trim();
    let digits = strip_hex_prefix(trimmed);
    if digits.len() != 64 {
        return Err(ArckanaError::InvalidHash(trimmed.to_string()));
    }
    let bytes = hex::decode(digits).map_err(|_| ArckanaError::InvalidHash(trimmed.to_string()))?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}
