//! Proportional dividend allocation with exact remainder accounting.
//!
//! Each holder receives `floor(balance * pool / total_supply)`. The
//! rounding loss (the dust) goes in full to the holder with the largest
//! balance; among equal balances the smallest address wins. All arithmetic
//! is integer-only: products are taken in `U512` so nothing is truncated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use arckana_core::{Address, ArckanaError, Result, U256, U512};

/// One holder's share of the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderPayout {
    pub holder: Address,
    pub balance: U256,
    pub amount: U256,
}

/// Result of allocating a pool across holders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Payouts in ascending address order
    pub payouts: Vec<HolderPayout>,
    /// Sum of all balances
    pub total_supply: U512,
    /// Pool that was offered
    pub pool: U256,
    /// Sum of all payouts (== pool unless total supply is zero)
    pub distributed: U256,
    /// Rounding remainder added to the dust recipient
    pub dust: U256,
    /// Holder that absorbed the dust, if any was computed
    pub dust_recipient: Option<Address>,
}

impl Allocation {
    /// Pool left unallocated. Only non-zero when the total supply is zero.
    pub fn undistributed(&self) -> U256 {
        self.pool - self.distributed
    }

    pub fn holder_count(&self) -> usize {
        self.payouts.len()
    }

    /// Look up one holder's payout.
    pub fn payout_for(&self, holder: &Address) -> Option<&HolderPayout> {
        self.payouts
            .binary_search_by(|p| p.holder.cmp(holder))
            .ok()
            .map(|i| &self.payouts[i])
    }
}

/// Allocate `pool` proportionally to `balances`.
///
/// Fails with `NoHolders` on an empty balance set. A zero total supply
/// yields all-zero payouts and leaves the pool undistributed.
pub fn allocate(balances: &BTreeMap<Address, U256>, pool: U256) -> Result<Allocation> {
    if balances.is_empty() {
        return Err(ArckanaError::NoHolders);
    }

    let total_supply = balances
        .values()
        .fold(U512::zero(), |acc, balance| acc + balance.widen());

    if total_supply.is_zero() {
        warn!(
            "Total supply is zero across {} holders; pool of {} left undistributed",
            balances.len(),
            pool
        );
        let payouts = balances
            .iter()
            .map(|(holder, balance)| HolderPayout {
                holder: *holder,
                balance: *balance,
                amount: U256::zero(),
            })
            .collect();
        return Ok(Allocation {
            payouts,
            total_supply,
            pool,
            distributed: U256::zero(),
            dust: U256::zero(),
            dust_recipient: None,
        });
    }

    let wide_pool = pool.widen();
    let mut floored = U512::zero();
    let mut payouts = Vec::with_capacity(balances.len());

    for (holder, balance) in balances {
        let amount = (balance.widen() * wide_pool / total_supply).to_u256()?;
        floored = floored + amount.widen();
        payouts.push(HolderPayout {
            holder: *holder,
            balance: *balance,
            amount,
        });
    }

    let dust = (wide_pool - floored).to_u256()?;

    // Ascending address order + strict comparison keeps the smallest
    // address among equal balances.
    let mut recipient = 0usize;
    for (i, payout) in payouts.iter().enumerate() {
        if payout.balance > payouts[recipient].balance {
            recipient = i;
        }
    }

    if !dust.is_zero() {
        let payout = &mut payouts[recipient];
        payout.amount = (payout.amount.widen() + dust.widen()).to_u256()?;
        debug!("Assigned dust {} to {}", dust, payout.holder);
    }

    Ok(Allocation {
        dust_recipient: Some(payouts[recipient].holder),
        payouts,
        total_supply,
        pool,
        distributed: pool,
        dust,
    })
}
