//! Signature creation and verification.
//!
//! Signatures are computed over the hash of the payload:
//! ```text
//! signature = Ed25519_Sign(private_key, H(payload))
//! ```

use ed25519_dalek::{Signature as DalekSignature, Signer, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::{PrivateKey, PublicKey, Signature};

/// Sign a payload with a private key.
///
/// # Example
/// ```
/// use subnetctl_crypto::{generate_keypair, sign, verify};
///
/// let (private_key, public_key) = generate_keypair();
/// let signature = sign(&private_key, b"payload");
/// assert!(verify(&public_key, b"payload", &signature));
/// ```
pub fn sign(private_key: &PrivateKey, payload: &[u8]) -> Signature {
    let digest: [u8; 32] = Sha256::digest(payload).into();
    let sig: DalekSignature = private_key.to_signing_key().sign(&digest);
    Signature(sig.to_bytes())
}

/// Verify a signature against a public key and payload.
pub fn verify(public_key: &PublicKey, payload: &[u8], signature: &Signature) -> bool {
    let digest: [u8; 32] = Sha256::digest(payload).into();

    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };

    let sig = DalekSignature::from_bytes(&signature.0);
    verifying_key.verify(&digest, &sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_keypair;

    #[test]
    fn test_sign_verify() {
        let (private_key, public_key) = generate_keypair();
        let signature = sign(&private_key, b"chain creation");
        assert!(verify(&public_key, b"chain creation", &signature));
    }

    #[test]
    fn test_tampered_payload_fails() {
        let (private_key, public_key) = generate_keypair();
        let signature = sign(&private_key, b"weight=20");
        assert!(!verify(&public_key, b"weight=2000", &signature));
    }

    #[test]
    fn test_wrong_key_fails() {
        let (private_key, _) = generate_keypair();
        let (_, other_public) = generate_keypair();
        let signature = sign(&private_key, b"payload");
        assert!(!verify(&other_public, b"payload", &signature));
    }
}
