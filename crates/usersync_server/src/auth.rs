//! Credential hashing seam.
//!
//! The hash algorithm itself is an external concern; the trait is the
//! interface the lifecycle operations depend on. The default
//! implementation is a salted SHA-256 digest.
//!
//! ## Stored format
//!
//! `"<salt-hex>$<digest-hex>"` where the digest is SHA-256 over the raw
//! salt bytes followed by the password bytes.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Hashes and verifies account credentials.
pub trait CredentialHasher: Send + Sync {
    /// Hashes a password for storage.
    fn hash(&self, password: &str) -> String;

    /// Checks a password against a stored hash.
    fn verify(&self, password: &str, hashed: &str) -> bool;
}

/// Salted SHA-256 credential hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

const SALT_LEN: usize = 16;

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn from_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

fn digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

impl CredentialHasher for Sha256Hasher {
    fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        format!("{}${}", to_hex(&salt), digest(&salt, password))
    }

    fn verify(&self, password: &str, hashed: &str) -> bool {
        let Some((salt_hex, expected)) = hashed.split_once('$') else {
            return false;
        };
        let Some(salt) = from_hex(salt_hex) else {
            return false;
        };
        digest(&salt, password) == expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hasher = Sha256Hasher;
        let hashed = hasher.hash("hunter22");
        assert!(hasher.verify("hunter22", &hashed));
        assert!(!hasher.verify("hunter23", &hashed));
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = Sha256Hasher;
        assert_ne!(hasher.hash("same"), hasher.hash("same"));
    }

    #[test]
    fn malformed_stored_hashes_never_verify() {
        let hasher = Sha256Hasher;
        assert!(!hasher.verify("pw", ""));
        assert!(!hasher.verify("pw", "no-separator"));
        assert!(!hasher.verify("pw", "zz$notahash"));
    }
}
