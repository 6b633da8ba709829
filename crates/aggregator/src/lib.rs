//! Arckana Aggregator
//!
//! Turns a set of holder balances and a dividend pool into a committed
//! distribution: every holder's payout, the Merkle root over all
//! `(holder, payout)` leaves and one inclusion proof per holder.
//!
//! The computation is a pure function of its inputs. Holders are kept in a
//! `BTreeMap`, arithmetic is integer-only and the tree sorts its leaves, so
//! independent runs over the same records produce byte-identical output.

mod allocation;
mod holders;
mod report;

use std::collections::BTreeMap;

use tracing::{debug, info};

use arckana_core::{hash_to_hex, Address, Hash, Result, U256};
use arckana_prover::{merkle_leaf, MerkleProof, MerkleTree};

pub use allocation::{allocate, Allocation, HolderPayout};
pub use holders::collect_balances;
pub use report::{DistributionReport, HolderClaim};

/// One holder's committed payout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionEntry {
    pub holder: Address,
    pub amount: U256,
    /// Leaf hash committed for `(holder, amount)`
    pub leaf: Hash,
    /// Sibling hashes from leaf to root
    pub proof: Vec<Hash>,
}

/// Merkle distribution for one dividend round (ready for on-chain posting)
#[derive(Debug, Clone)]
pub struct Distribution {
    /// Merkle root of the (holder, amount) leaves
    pub root: Hash,
    /// Allocation the tree commits to
    pub allocation: Allocation,
    /// Entries in ascending holder order
    pub entries: Vec<DistributionEntry>,
    /// The Merkle tree (for regenerating per-holder proofs)
    tree: MerkleTree,
}

impl Distribution {
    /// Find a holder's entry.
    ///
    /// Returns `None` if the holder is not in the distribution.
    pub fn entry_for(&self, holder: &Address) -> Option<&DistributionEntry> {
        self.entries
            .binary_search_by(|e| e.holder.cmp(holder))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Regenerate a holder's proof from the tree.
    pub fn proof_for_holder(&self, holder: &Address) -> Option<MerkleProof> {
        let index = self.entries.binary_search_by(|e| e.holder.cmp(holder)).ok()?;
        self.tree.proof(index)
    }

    pub fn holder_count(&self) -> usize {
        self.entries.len()
    }
}

/// Commit `(holder, amount)` pairs to a Merkle tree.
///
/// Returns the root and one proof per input position. An empty input
/// yields `ZERO_HASH` and no proofs.
pub fn commit(entries: &[(Address, U256)]) -> (Hash, Vec<Vec<Hash>>) {
    let leaves: Vec<Hash> = entries
        .iter()
        .map(|(holder, amount)| merkle_leaf(holder, amount))
        .collect();
    let tree = MerkleTree::from_leaves(&leaves);
    let proofs = tree.proofs().into_iter().map(|p| p.siblings).collect();
    (tree.root(), proofs)
}

/// Allocate `pool` across `balances` and commit the payouts.
///
/// Fails with `NoHolders` on an empty balance set.
pub fn build_distribution(balances: &BTreeMap<Address, U256>, pool: U256) -> Result<Distribution> {
    let allocation = allocate(balances, pool)?;

    info!(
        "Allocated {} of pool {} across {} holders (total supply {}, dust {})",
        allocation.distributed,
        allocation.pool,
        allocation.holder_count(),
        allocation.total_supply,
        allocation.dust,
    );

    let leaves: Vec<Hash> = allocation
        .payouts
        .iter()
        .map(|p| merkle_leaf(&p.holder, &p.amount))
        .collect();
    let tree = MerkleTree::from_leaves(&leaves);
    let root = tree.root();

    let entries: Vec<DistributionEntry> = allocation
        .payouts
        .iter()
        .zip(leaves)
        .zip(tree.proofs())
        .map(|((payout, leaf), proof)| {
            debug!(
                "Holder {} amount {} proof_len {}",
                payout.holder,
                payout.amount,
                proof.siblings.len()
            );
            DistributionEntry {
                holder: payout.holder,
                amount: payout.amount,
                leaf,
                proof: proof.siblings,
            }
        })
        .collect();

    info!("Merkle root: {}", hash_to_hex(&root));

    Ok(Distribution {
        root,
        allocation,
        entries,
        tree,
    })
}
