//! Password hashing for stored credentials.
//!
//! The client submits a SHA-256 hash of password+username; the server hashes
//! that again with a per-user salt before storing. Comparison is over hex
//! digests of equal length.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Hash a client-submitted credential with a fresh random salt.
/// Stored format: `salt$digest`, both hex.
pub fn hash_password(client_hash: &str) -> String {
  let mut salt_bytes = [0u8; 16];
  rand::rng().fill(&mut salt_bytes);
  let salt = hex::encode(salt_bytes);
  format!("{}${}", salt, digest(&salt, client_hash))
}

/// Verify a client-submitted credential against a stored `salt$digest`.
pub fn verify_password(client_hash: &str, stored: &str) -> bool {
  let Some((salt, expected)) = stored.split_once('$') else {
    return false;
  };
  digest(salt, client_hash) == expected
}

fn digest(salt: &str, client_hash: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(salt.as_bytes());
  hasher.update(client_hash.as_bytes());
  hex::encode(hasher.finalize())
}
