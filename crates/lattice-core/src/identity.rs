// crates/lattice-core/src/identity.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a participant in the trust network.
///
/// A wallet is an opaque 32-byte public identifier (an ed25519 public key on
/// the reference chain). Equality, ordering and hashing are by byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Wallet(pub [u8; 32]);

impl Wallet {
    /// Size of the encoded identifier in bytes.
    pub const LEN: usize = 32;

    /// Wrap raw identifier bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for Wallet {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short hex prefix; full identifiers make log lines unreadable.
        write!(f, "{}", &hex::encode(self.0)[..12])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_byte_value() {
        assert_eq!(Wallet::new([7u8; 32]), Wallet::from([7u8; 32]));
        assert_ne!(Wallet::new([7u8; 32]), Wallet::new([8u8; 32]));
    }

    #[test]
    fn display_is_short_hex() {
        let wallet = Wallet::new([0xab; 32]);
        assert_eq!(wallet.to_string(), "abababababab");
    }
}
