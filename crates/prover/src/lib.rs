//! Arckana Prover
//!
//! Leaf encoding and the sorted binary Merkle tree that commits a dividend
//! distribution.
//!
//! The tree follows the OpenZeppelin `MerkleProof` conventions so that the
//! on-chain dividend pool can verify claims directly:
//! - leaves are `keccak256(keccak256(abi.encode(address, uint256)))`
//! - leaves are sorted before the tree is built
//! - internal nodes hash the byte-ordered pair of children

pub mod leaf;
pub mod merkle;

pub use leaf::{keccak256, merkle_leaf, merkle_leaf_wide};
pub use merkle::{hash_pair, verify_proof, MerkleProof, MerkleTree};
