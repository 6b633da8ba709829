//! Leaf encoding.
//!
//! `leaf = keccak256(keccak256(address_word || amount_word))` where
//! `address_word` is the address left-padded to 32 bytes and `amount_word`
//! is the amount as a 32-byte big-endian integer. This is what Solidity's
//! `keccak256(bytes.concat(keccak256(abi.encode(account, amount))))`
//! produces, and it MUST stay byte-identical to it.

use sha3::{Digest, Keccak256};

use arckana_core::{Address, Hash, Result, U256, U512};

/// Keccak-256 (the EVM variant, not NIST SHA3-256).
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

/// Compute the leaf hash for one allocation entry.
pub fn merkle_leaf(address: &Address, amount: &U256) -> Hash {
    let mut encoded = [0u8; 64];
    encoded[..32].copy_from_slice(&address.to_word());
    encoded[32..].copy_from_slice(&amount.to_be_bytes());

    let inner = keccak256(&encoded);
    keccak256(&inner)
}

/// Leaf hash for an amount carried in the wide domain.
///
/// Fails with `AmountOutOfRange` rather than truncating when the amount
/// does not fit a `uint256` word.
pub fn merkle_leaf_wide(address: &Address, amount: &U512) -> Result<Hash> {
    let amount = amount.to_u256()?;
    Ok(merkle_leaf(address, &amount))
}
