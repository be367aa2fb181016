// crates/lattice-core/src/edge.rs
//
// Trust dimensions and declared trust edges.
//
// A trust edge is one owner's declaration that they trust `trustee` in a
// single dimension with a weight in basis points. Edges are committed to a
// Merkle tree through their fixed 43-byte canonical encoding, which must
// byte-match the external verifier:
//
// ```text
// [32 bytes: trustee]
// [ 1 byte : dimension tag]
// [ 2 bytes: weight u16 LE]
// [ 8 bytes: created_at i64 LE]
// ```

use serde::{Deserialize, Serialize};

use crate::error::LatticeError;
use crate::identity::Wallet;

/// Upper bound of a trust weight, in basis points (10000 = full trust).
pub const MAX_WEIGHT_BPS: u16 = 10_000;

/// Trust category. The tag values are part of the canonical encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Dimension {
    Trading = 0,
    Civic = 1,
    Developer = 2,
    Infra = 3,
    Creator = 4,
}

impl Dimension {
    /// All dimensions in tag order.
    pub const ALL: [Dimension; 5] = [
        Dimension::Trading,
        Dimension::Civic,
        Dimension::Developer,
        Dimension::Infra,
        Dimension::Creator,
    ];

    /// Number of trust dimensions.
    pub const COUNT: usize = 5;

    /// One-byte tag used in the canonical encoding.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Position of this dimension in per-dimension score arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Decode a dimension tag. Unknown tags are rejected.
    pub fn from_tag(tag: u8) -> Result<Self, LatticeError> {
        Self::ALL
            .get(tag as usize)
            .copied()
            .ok_or(LatticeError::UnknownDimension(tag))
    }
}

impl TryFrom<u8> for Dimension {
    type Error = LatticeError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Self::from_tag(tag)
    }
}

/// A declared, weighted trust relation from an (implicit) owner to `trustee`.
///
/// Within one owner's set, an edge is keyed by `(trustee, dimension)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustEdge {
    /// Who is trusted.
    pub trustee: Wallet,
    /// Which dimension they are trusted in.
    pub dimension: Dimension,
    /// Trust weight in basis points (0..=10000).
    pub weight: u16,
    /// Unix timestamp (seconds) at which the edge was declared.
    pub created_at: i64,
}

impl TrustEdge {
    /// Size of the canonical encoding in bytes.
    pub const SERIALIZED_SIZE: usize = 32 + 1 + 2 + 8;

    /// Create an edge, rejecting weights above 10000 basis points.
    pub fn new(
        trustee: Wallet,
        dimension: Dimension,
        weight: u16,
        created_at: i64,
    ) -> Result<Self, LatticeError> {
        if weight > MAX_WEIGHT_BPS {
            return Err(LatticeError::InvalidTrustWeight(weight));
        }
        Ok(Self {
            trustee,
            dimension,
            weight,
            created_at,
        })
    }

    /// Create an edge stamped with the current UTC time.
    pub fn now(trustee: Wallet, dimension: Dimension, weight: u16) -> Result<Self, LatticeError> {
        Self::new(trustee, dimension, weight, chrono::Utc::now().timestamp())
    }

    /// The `(trustee, dimension)` key that identifies this edge in its owner's set.
    pub fn key(&self) -> (Wallet, Dimension) {
        (self.trustee, self.dimension)
    }

    /// Weight as a fraction in [0, 1].
    pub fn weight_fraction(&self) -> f64 {
        f64::from(self.weight) / f64::from(MAX_WEIGHT_BPS)
    }

    /// Check the weight bound. Edges built through struct literals bypass `new`.
    pub fn validate(&self) -> Result<(), LatticeError> {
        if self.weight > MAX_WEIGHT_BPS {
            return Err(LatticeError::InvalidTrustWeight(self.weight));
        }
        Ok(())
    }

    /// Canonical 43-byte encoding.
    pub fn to_bytes(&self) -> [u8; Self::SERIALIZED_SIZE] {
        let mut out = [0u8; Self::SERIALIZED_SIZE];
        out[0..32].copy_from_slice(self.trustee.as_bytes());
        out[32] = self.dimension.tag();
        out[33..35].copy_from_slice(&self.weight.to_le_bytes());
        out[35..43].copy_from_slice(&self.created_at.to_le_bytes());
        out
    }

    /// Decode the canonical encoding.
    ///
    /// Fails on a wrong length, an unknown dimension tag, or an out-of-range weight.
    pub fn from_bytes(data: &[u8]) -> Result<Self, LatticeError> {
        if data.len() != Self::SERIALIZED_SIZE {
            return Err(LatticeError::Serialization(format!(
                "trust edge must be {} bytes, got {}",
                Self::SERIALIZED_SIZE,
                data.len()
            )));
        }

        let mut trustee = [0u8; 32];
        trustee.copy_from_slice(&data[0..32]);
        let dimension = Dimension::from_tag(data[32])?;
        let weight = u16::from_le_bytes([data[33], data[34]]);
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&data[35..43]);
        let created_at = i64::from_le_bytes(ts);

        Self::new(Wallet::new(trustee), dimension, weight, created_at)
    }

    /// Leaf hash of this edge in a commitment tree.
    pub fn leaf_hash(&self) -> crate::crypto::Hash32 {
        crate::crypto::hash_leaf(&self.to_bytes())
    }
}
