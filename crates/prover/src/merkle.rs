//! Sorted binary Merkle tree for distribution proofs.
//!
//! Leaves are sorted by their bytes before the tree is built, so the root
//! depends only on the multiset of leaves and never on input order.
//! Internal nodes: `keccak256(min(a, b) || max(a, b))`.
//! A level with an odd node count pairs its last node with itself.

use tracing::debug;

use arckana_core::{Hash, ZERO_HASH};

use crate::leaf::keccak256;

/// An inclusion proof for one leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// Sibling hashes from leaf level to root (bottom-up).
    pub siblings: Vec<Hash>,
    /// Index of the leaf in the caller's original (pre-sort) order.
    pub leaf_index: usize,
}

/// A binary Merkle tree over sorted leaves.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// All nodes stored level by level, bottom-up. `layers[0]` = sorted leaves.
    /// Empty when the tree was built from no leaves.
    layers: Vec<Vec<Hash>>,
    /// Original leaf index -> position in `layers[0]`.
    positions: Vec<usize>,
}

/// Hash two child nodes to produce a parent.
///
/// The children are ordered by their bytes first, which is what lets the
/// on-chain verifier fold a proof without left/right flags.
pub fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left);
    buf[32..].copy_from_slice(right);
    keccak256(&buf)
}

/// Verify an inclusion proof against a root.
///
/// Mirrors OpenZeppelin's `MerkleProof.verify`: fold the siblings into the
/// leaf with `hash_pair` and compare with the root.
pub fn verify_proof(root: &Hash, leaf: &Hash, siblings: &[Hash]) -> bool {
    let computed = siblings
        .iter()
        .fold(*leaf, |current, sibling| hash_pair(&current, sibling));
    computed == *root
}

impl MerkleTree {
    /// Build a tree from leaf hashes given in the caller's order.
    ///
    /// Proofs are later looked up by the same original index.
    pub fn from_leaves(leaves: &[Hash]) -> Self {
        if leaves.is_empty() {
            return Self {
                layers: Vec::new(),
                positions: Vec::new(),
            };
        }

        // Sort (leaf, original_index) by leaf bytes. Stable, so equal
        // leaves keep their original relative order.
        let mut indexed: Vec<(Hash, usize)> = leaves
            .iter()
            .enumerate()
            .map(|(index, leaf)| (*leaf, index))
            .collect();
        indexed.sort_by(|a, b| a.0.cmp(&b.0));

        let mut positions = vec![0usize; leaves.len()];
        for (sorted_pos, (_, original)) in indexed.iter().enumerate() {
            positions[*original] = sorted_pos;
        }

        let mut layers = vec![indexed.into_iter().map(|(leaf, _)| leaf).collect::<Vec<_>>()];

        // Build tree bottom-up
        while let Some(prev) = layers.last().filter(|layer| layer.len() > 1) {
            let next_layer: Vec<Hash> = prev
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    [single] => hash_pair(single, single),
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            layers.push(next_layer);
        }

        debug!(
            "Built Merkle tree: {} leaves, {} levels",
            leaves.len(),
            layers.len()
        );

        Self { layers, positions }
    }

    /// Get the Merkle root.
    ///
    /// An empty tree reports `ZERO_HASH`, which means "no commitment" and
    /// is not the root of any real tree.
    pub fn root(&self) -> Hash {
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .unwrap_or(ZERO_HASH)
    }

    /// Number of leaves committed.
    pub fn leaf_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of levels including the leaf level and the root.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Generate the proof for the leaf at the given original index.
    ///
    /// Returns `None` if the index is out of range. When a node has no
    /// right neighbour it was hashed with itself, so its own value is the
    /// sibling recorded for that level.
    pub fn proof(&self, leaf_index: usize) -> Option<MerkleProof> {
        let mut idx = *self.positions.get(leaf_index)?;
        let levels = self.layers.len().saturating_sub(1);
        let mut siblings = Vec::with_capacity(levels);

        for layer in &self.layers[..levels] {
            let sibling_idx = idx ^ 1;
            let sibling = layer.get(sibling_idx).unwrap_or(&layer[idx]);
            siblings.push(*sibling);
            idx /= 2;
        }

        Some(MerkleProof {
            siblings,
            leaf_index,
        })
    }

    /// Proofs for every leaf, indexed by original position.
    pub fn proofs(&self) -> Vec<MerkleProof> {
        (0..self.leaf_count())
            .filter_map(|index| self.proof(index))
            .collect()
    }

    /// Verify a proof against a given root and leaf hash.
    pub fn verify(root: &Hash, leaf: &Hash, proof: &MerkleProof) -> bool {
        verify_proof(root, leaf, &proof.siblings)
    }
}
