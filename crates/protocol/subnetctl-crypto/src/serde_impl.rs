//! Serde implementations for crypto types.
//!
//! Everything is written as strings so sidecars and transaction files stay
//! readable and diffable: addresses in their `P-` form, keys, signatures and
//! hashes as lowercase hex.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{Address, CryptoError, Hash, PublicKey, Signature};

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn from_hex<const N: usize>(s: &str) -> Result<[u8; N], CryptoError> {
    if s.len() != N * 2 {
        return Err(CryptoError::InvalidKeyLength {
            expected: N,
            actual: s.len() / 2,
        });
    }
    let mut out = [0u8; N];
    for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
        let pair = std::str::from_utf8(chunk).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        out[i] = u8::from_str_radix(pair, 16).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
    }
    Ok(out)
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::address_to_string(self))
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::address_from_string(&s).map_err(de::Error::custom)
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(&self.0))
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        from_hex::<32>(&s).map(Hash).map_err(de::Error::custom)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(&self.0))
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        from_hex::<32>(&s).map(PublicKey).map_err(de::Error::custom)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(&self.0))
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        from_hex::<64>(&s).map(Signature).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{address_from_public_key, generate_keypair, sign};

    #[test]
    fn test_address_serializes_as_prefixed_string() {
        let (_, public_key) = generate_keypair();
        let address = address_from_public_key(&public_key);
        let json = serde_json::to_string(&address).unwrap();
        assert!(json.starts_with("\"P-"));
    }

    #[test]
    fn test_signature_json() {
        let (private_key, _) = generate_keypair();
        let signature = sign(&private_key, b"payload");
        let json = serde_json::to_string(&signature).unwrap();
        assert_eq!(json.len(), 128 + 2);
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, signature);
    }

    #[test]
    fn test_short_public_key_rejected() {
        let result: Result<PublicKey, _> = serde_json::from_str("\"abcd\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_non_hex_hash_rejected() {
        let bad = format!("\"{}\"", "zz".repeat(32));
        let result: Result<Hash, _> = serde_json::from_str(&bad);
        assert!(result.is_err());
    }
}
