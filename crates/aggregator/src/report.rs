//! Serializable result object handed to the output boundary.

use serde::{Deserialize, Serialize};

use arckana_core::{hash_to_hex, Address, ZERO_HASH, U256, U512};

use crate::Distribution;

/// One holder's claim data as consumed by the claim UI and the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderClaim {
    pub holder: Address,
    pub amount: U256,
    /// `0x`-prefixed sibling hashes
    pub proof: Vec<String>,
}

/// Result of one run (`result.json`).
///
/// Integer totals and amounts are decimal strings so that no JSON reader
/// rounds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub merkle_root: String,
    pub holder_count: usize,
    pub total_supply: U512,
    pub total_distributed: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undistributed: Option<U256>,
    #[serde(default)]
    pub distribution: Vec<HolderClaim>,
}

impl DistributionReport {
    pub fn from_distribution(dist: &Distribution) -> Self {
        let distribution = dist
            .entries
            .iter()
            .map(|entry| HolderClaim {
                holder: entry.holder,
                amount: entry.amount,
                proof: entry.proof.iter().map(hash_to_hex).collect(),
            })
            .collect();

        Self {
            success: true,
            error: None,
            merkle_root: hash_to_hex(&dist.root),
            holder_count: dist.holder_count(),
            total_supply: dist.allocation.total_supply,
            total_distributed: dist.allocation.distributed,
            undistributed: Some(dist.allocation.undistributed()),
            distribution,
        }
    }

    /// Structured failure: zero root, zero counts, no claims.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            merkle_root: hash_to_hex(&ZERO_HASH),
            holder_count: 0,
            total_supply: U512::zero(),
            total_distributed: U256::zero(),
            undistributed: None,
            distribution: Vec::new(),
        }
    }
}
