//! Fixed-width unsigned integers for the `uint256` domain.
//!
//! Balances, the dividend pool and every payout are `U256`, the width the
//! on-chain token and verifier use. Products of two `U256` values and sums
//! over many holders are carried in `U512`, which is wide enough to keep
//! `balance * pool` exact.

// Allow clippy warnings from the uint crate's construct_uint macro
#![allow(clippy::manual_div_ceil)]
#![allow(clippy::assign_op_pattern)]

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uint::{construct_uint, FromDecStrErr};

use crate::ArckanaError;

construct_uint! {
    /// 256-bit unsigned integer (`uint256`).
    pub struct U256(4);
}

construct_uint! {
    /// 512-bit unsigned integer for exact intermediate products.
    pub struct U512(8);
}

impl U256 {
    /// Big-endian 32-byte word (ABI `uint256` encoding).
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[0..8].copy_from_slice(&self.0[3].to_be_bytes());
        bytes[8..16].copy_from_slice(&self.0[2].to_be_bytes());
        bytes[16..24].copy_from_slice(&self.0[1].to_be_bytes());
        bytes[24..32].copy_from_slice(&self.0[0].to_be_bytes());
        bytes
    }

    /// Zero-extend into the wide domain.
    pub fn widen(&self) -> U512 {
        let mut limbs = [0u64; 8];
        limbs[..4].copy_from_slice(&self.0);
        U512(limbs)
    }

    /// Parse a non-negative decimal integer.
    ///
    /// Signs, fractions, exponents and empty strings are `InvalidAmount`;
    /// values above 2^256 - 1 are `AmountOutOfRange`.
    pub fn parse_decimal(s: &str) -> crate::Result<Self> {
        let digits = s.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ArckanaError::InvalidAmount(digits.to_string()));
        }
        U256::from_dec_str(digits).map_err(|e| match e {
            FromDecStrErr::InvalidLength => ArckanaError::AmountOutOfRange,
            FromDecStrErr::InvalidCharacter => ArckanaError::InvalidAmount(digits.to_string()),
        })
    }
}

impl U512 {
    /// Narrow back into `uint256`, refusing to truncate.
    pub fn to_u256(&self) -> crate::Result<U256> {
        if self.0[4..].iter().any(|limb| *limb != 0) {
            return Err(ArckanaError::AmountOutOfRange);
        }
        Ok(U256([self.0[0], self.0[1], self.0[2], self.0[3]]))
    }
}

// Amounts travel as decimal strings so JSON consumers never round them.
impl Serialize for U256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct U256Visitor;

        impl<'de> serde::de::Visitor<'de> for U256Visitor {
            type Value = U256;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a non-negative integer or decimal string")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<U256, E> {
                Ok(U256::from(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<U256, E> {
                u64::try_from(v)
                    .map(U256::from)
                    .map_err(|_| E::custom(ArckanaError::InvalidAmount(v.to_string())))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<U256, E> {
                U256::parse_decimal(v).map_err(E::custom)
            }

            // serde_json hands integers wider than 64 bits over as a
            // one-entry map holding the literal digits
            fn visit_map<A>(self, mut map: A) -> std::result::Result<U256, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let (_, digits): (String, String) = map
                    .next_entry()?
                    .ok_or_else(|| serde::de::Error::custom("empty number"))?;
                U256::parse_decimal(&digits).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_any(U256Visitor)
    }
}

impl Serialize for U512 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for U512 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(serde::de::Error::custom(ArckanaError::InvalidAmount(s.clone())));
        }
        U512::from_dec_str(digits).map_err(|_| serde::de::Error::custom(ArckanaError::AmountOutOfRange))
    }
}
