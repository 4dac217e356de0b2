use rand::Rng;
use sha2::{Digest, Sha256};

/// Generates a numeric one-time code of the given length, each digit drawn
/// uniformly and independently.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// One-way hash of a code. The digest is fixed-length, so comparing the
/// hex strings never touches secret material.
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}
