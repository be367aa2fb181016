// crates/lattice-core/src/crypto.rs
//
// Domain-separated keccak256 hashing for the edge commitment tree.
//
// Leaves and internal nodes are hashed under distinct one-byte prefixes so a
// leaf hash can never be replayed as an internal node hash (and vice versa).

use sha3::{Digest, Keccak256};

/// A 32-byte hash output.
pub type Hash32 = [u8; 32];

/// Root of an empty tree. This is a sentinel, not a hash output.
pub const ZERO_HASH: Hash32 = [0u8; 32];

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

/// Compute the keccak256 hash of the given bytes.
///
/// This is the legacy Keccak padding used by on-chain verifiers, not SHA3-256.
pub fn keccak256(data: &[u8]) -> Hash32 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    finish(hasher)
}

/// Hash a leaf: `keccak256(0x00 || data)`.
pub fn hash_leaf(data: &[u8]) -> Hash32 {
    let mut hasher = Keccak256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(data);
    finish(hasher)
}

/// Hash two children into their parent: `keccak256(0x01 || left || right)`.
pub fn hash_nodes(left: &Hash32, right: &Hash32) -> Hash32 {
    let mut hasher = Keccak256::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    finish(hasher)
}

fn finish(hasher: Keccak256) -> Hash32 {
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_known_vector() {
        // keccak256("") as used by Ethereum and Solana.
        let empty = keccak256(b"");
        assert_eq!(
            hex::encode(empty),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_leaf_hash_domain_separation() {
        let data = b"test_data";
        assert_ne!(hash_leaf(data), keccak256(data));
    }

    #[test]
    fn test_node_hash_domain_separation() {
        let left = [1u8; 32];
        let right = [2u8; 32];

        let mut raw = Vec::with_capacity(64);
        raw.extend_from_slice(&left);
        raw.extend_from_slice(&right);
        assert_ne!(hash_nodes(&left, &right), keccak256(&raw));

        // A leaf over the same 64 bytes must not collide with the node hash.
        assert_ne!(hash_nodes(&left, &right), hash_leaf(&raw));
    }

    #[test]
    fn test_node_hash_is_order_sensitive() {
        let a = [3u8; 32];
        let b = [4u8; 32];
        assert_ne!(hash_nodes(&a, &b), hash_nodes(&b, &a));
    }
}
