//! Arckana Core Types
//!
//! Fundamental values shared by the allocator, the Merkle committer and the
//! iApp boundary: holder addresses, 32-byte digests and the `uint256`
//! numeric domain.

mod error;
mod types;
mod u256;

pub use error::*;
pub use types::*;
pub use u256::*;
