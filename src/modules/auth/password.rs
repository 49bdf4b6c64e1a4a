use pbkdf2::pbkdf2;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::HmacSha256;

/// PBKDF2 iteration count for password and backup-code hashing
const PBKDF2_ITERATIONS: u32 = 100_000;
/// Salt length in bytes; every hash gets its own salt
const SALT_LEN: usize = 16;
/// Derived key length in bytes
const HASH_LEN: usize = 32;

/// Function to generate a random salt from the OS secure random source
fn generate_random_salt() -> Vec<u8> {
    let mut salt = vec![0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Function to derive a hash from a secret using PBKDF2-HMAC-SHA256
fn derive_hash(secret: &str, salt: &[u8]) -> Vec<u8> {
    let mut hash = vec![0u8; HASH_LEN];
    pbkdf2::<HmacSha256>(secret.as_bytes(), salt, PBKDF2_ITERATIONS, &mut hash);
    hash
}

/// Hash a password (or backup code) with a fresh random salt.
///
/// The result is a single storable string: `hex(salt)$hex(hash)`.
pub fn hash_password(password: &str) -> String {
    let salt = generate_random_salt();
    let hash = derive_hash(password, &salt);
    format!("{}${}", hex::encode(&salt), hex::encode(&hash))
}

/// Verify a password (or backup code) against a stored `hex(salt)$hex(hash)`
/// string. A malformed stored value verifies false rather than erroring; the
/// caller cannot do anything useful with the distinction.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, hash_hex)) = stored.split_once('$') else {
        return false;
    };

    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(hash_hex) else {
        return false;
    };

    if salt.len() != SALT_LEN || expected.len() != HASH_LEN {
        return false;
    }

    derive_hash(password, &salt) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("password123");
        assert!(verify_password("password123", &hash));
        assert!(!verify_password("wrongpass", &hash));
    }

    #[test]
    fn test_hashes_are_salted_uniquely() {
        let hash1 = hash_password("same-password");
        let hash2 = hash_password("same-password");

        // Different salts must produce different stored strings
        assert_ne!(hash1, hash2);

        // Both still verify
        assert!(verify_password("same-password", &hash1));
        assert!(verify_password("same-password", &hash2));
    }

    #[test]
    fn test_stored_format() {
        let hash = hash_password("password123");
        let (salt_hex, hash_hex) = hash.split_once('$').unwrap();
        assert_eq!(salt_hex.len(), 32); // 16 bytes hex encoded
        assert_eq!(hash_hex.len(), 64); // 32 bytes hex encoded
        assert!(salt_hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(hash_hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_malformed_stored_hash_verifies_false() {
        assert!(!verify_password("password123", ""));
        assert!(!verify_password("password123", "no-separator"));
        assert!(!verify_password("password123", "nothex$nothex"));
        assert!(!verify_password("password123", "abcd$ef01")); // wrong lengths
    }
}
