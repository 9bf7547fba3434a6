//! Key, address and signature primitives for subnetctl.
//!
//! Control keys are Ed25519 key pairs. A control key is named on the network by
//! its 20-byte address, written as `P-<base58>`. Signatures cover the SHA-256
//! digest of the signed payload. VM ids are derived from VM names so the node
//! runtime can find plugin binaries.
//!
//! # Example
//!
//! ```
//! use subnetctl_crypto::{
//!     address_from_public_key, generate_keypair, sign, verify,
//! };
//!
//! let (private_key, public_key) = generate_keypair();
//! let address = address_from_public_key(&public_key);
//! println!("control key: {}", address);
//!
//! let payload = b"add validator NodeID-abc";
//! let signature = sign(&private_key, payload);
//! assert!(verify(&public_key, payload, &signature));
//! ```

mod error;
mod hash;
mod identity;
mod serde_impl;
mod signature;

pub use error::CryptoError;
pub use hash::vm_id_for;
pub use identity::{
    address_from_public_key, address_from_string, address_to_string, generate_keypair,
    local_network_key, private_key_from_base58, private_key_to_base58, public_key_from_private,
};
pub use signature::{sign, verify};

use ed25519_dalek::SigningKey;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Milliseconds since Unix epoch.
pub type Timestamp = u64;

// Public byte strings: copyable, comparable, printed as a short hex prefix.
macro_rules! byte_newtype {
    ($(#[$meta:meta])* $name:ident, $len:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "({}...)"), short_hex(&self.0))
            }
        }
    };
}

byte_newtype!(
    /// SHA-256 digest.
    Hash, 32
);
byte_newtype!(
    /// Ed25519 public key.
    PublicKey, 32
);
byte_newtype!(
    /// Ed25519 signature.
    Signature, 64
);

impl Hash {
    /// Base58 form, as VM ids are written.
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }
}

/// Ed25519 private key seed. Cleared from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    pub fn from_bytes(seed: [u8; 32]) -> Self {
        Self(seed)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub(crate) fn from_signing_key(key: &SigningKey) -> Self {
        Self(key.to_bytes())
    }

    pub(crate) fn to_signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.0)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

/// Control-key address: the first 20 bytes of `H(0x00 || public_key)`.
///
/// Displays and parses as `P-<base58>`, which is also its serde form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&address_to_string(self))
    }
}

impl std::str::FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        address_from_string(s)
    }
}

fn short_hex(bytes: &[u8]) -> String {
    bytes.iter().take(8).map(|b| format!("{:02x}", b)).collect()
}
