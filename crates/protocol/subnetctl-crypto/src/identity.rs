//! Key handling and address derivation.
//!
//! Addresses are derived from a public key:
//! ```text
//! Address = H(0x00 || public_key)[0:20]
//! ```
//!
//! Human-readable format: `P-` + base58(Address)
//!
//! Private keys are exchanged as base58 strings of the 32-byte Ed25519 seed.
//! That is the format of the key files the CLI imports.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::error::CryptoError;
use crate::{Address, PrivateKey, PublicKey};

/// Domain separator for key hashing (Ed25519 key type)
const DOMAIN_KEY: u8 = 0x00;

/// Human-readable address prefix
const ADDRESS_PREFIX: &str = "P-";

/// Seed material for the pre-funded local test network key.
///
/// Every local network started by the node runtime funds this key, so the key
/// is public knowledge and must never hold value on a public network.
const LOCAL_NETWORK_SEED: &[u8] = b"subnetctl/local-network/prefunded-test-key";

/// Generate a new Ed25519 keypair.
///
/// Key generation is not exposed by the CLI; this exists for tests and tooling.
pub fn generate_keypair() -> (PrivateKey, PublicKey) {
    let mut csprng = OsRng;
    let signing_key = SigningKey::generate(&mut csprng);
    let verifying_key = signing_key.verifying_key();

    (
        PrivateKey::from_signing_key(&signing_key),
        PublicKey(verifying_key.to_bytes()),
    )
}

/// Derive the public key for a private key.
pub fn public_key_from_private(private_key: &PrivateKey) -> PublicKey {
    PublicKey(private_key.to_signing_key().verifying_key().to_bytes())
}

/// The well-known key used as fee payer and sole control key on the local network.
pub fn local_network_key() -> PrivateKey {
    let seed: [u8; 32] = Sha256::digest(LOCAL_NETWORK_SEED).into();
    PrivateKey::from_bytes(seed)
}

/// Derive an Address from a public key.
///
/// # Example
/// ```
/// use subnetctl_crypto::{generate_keypair, address_from_public_key};
///
/// let (_, public_key) = generate_keypair();
/// let address = address_from_public_key(&public_key);
/// assert_eq!(address.0.len(), 20);
/// ```
pub fn address_from_public_key(public_key: &PublicKey) -> Address {
    let mut hasher = Sha256::new();
    hasher.update([DOMAIN_KEY]);
    hasher.update(public_key.0);
    let hash: [u8; 32] = hasher.finalize().into();

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[..20]);
    Address(address)
}

/// Convert an Address to its human-readable string format.
pub fn address_to_string(address: &Address) -> String {
    format!("{}{}", ADDRESS_PREFIX, bs58::encode(&address.0).into_string())
}

/// Parse a human-readable address string.
///
/// # Errors
/// - `InvalidAddressPrefix` if the string doesn't start with `P-`
/// - `InvalidBase58` if the base58 decoding fails
/// - `InvalidKeyLength` if the decoded data isn't 20 bytes
pub fn address_from_string(s: &str) -> Result<Address, CryptoError> {
    let Some(base58_part) = s.strip_prefix(ADDRESS_PREFIX) else {
        let prefix: String = s.chars().take(2).collect();
        return Err(CryptoError::InvalidAddressPrefix(prefix));
    };

    if base58_part.is_empty() {
        return Err(CryptoError::InvalidAddressFormat(
            "Missing data after prefix".to_string(),
        ));
    }

    let decoded = bs58::decode(base58_part)
        .into_vec()
        .map_err(|e| CryptoError::InvalidBase58(e.to_string()))?;

    if decoded.len() != 20 {
        return Err(CryptoError::InvalidKeyLength {
            expected: 20,
            actual: decoded.len(),
        });
    }

    let mut address = [0u8; 20];
    address.copy_from_slice(&decoded);
    Ok(Address(address))
}

/// Encode a private key seed as base58.
pub fn private_key_to_base58(private_key: &PrivateKey) -> String {
    bs58::encode(private_key.as_bytes()).into_string()
}

/// Decode a base58 private key seed, as found in key files.
pub fn private_key_from_base58(s: &str) -> Result<PrivateKey, CryptoError> {
    let decoded = bs58::decode(s.trim())
        .into_vec()
        .map_err(|e| CryptoError::InvalidBase58(e.to_string()))?;

    if decoded.len() != 32 {
        return Err(CryptoError::InvalidKeyLength {
            expected: 32,
            actual: decoded.len(),
        });
    }

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&decoded);
    Ok(PrivateKey::from_bytes(seed))
}
