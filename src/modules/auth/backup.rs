use rand::rngs::OsRng;
use rand::RngCore;

use super::password::{hash_password, verify_password};
use crate::BACKUP_CODE_COUNT;

/// Each code is 4 random bytes rendered as 8 uppercase hex characters
const CODE_BYTES: usize = 4;

/// Generate a fresh batch of single-use backup codes.
///
/// Returns `(plaintext, hashed)` where the plaintext codes are shown to the
/// owner exactly once and only the hashes are ever stored. Order matters:
/// hashes are checked and consumed in the order generated.
pub fn generate_backup_codes() -> (Vec<String>, Vec<String>) {
    let plaintext: Vec<String> = (0..BACKUP_CODE_COUNT).map(|_| generate_code()).collect();
    let hashed = plaintext.iter().map(|code| hash_password(code)).collect();
    (plaintext, hashed)
}

/// Generate one backup code from the OS secure random source
fn generate_code() -> String {
    let mut bytes = [0u8; CODE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes).to_uppercase()
}

/// Find the stored hash matching a submitted code.
///
/// Returns the index of the first match so the caller can remove it; a
/// consumed code must never validate again.
pub fn find_matching_code(code: &str, hashed_codes: &[String]) -> Option<usize> {
    hashed_codes
        .iter()
        .position(|hash| verify_password(code, hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_ten_codes() {
        let (plaintext, hashed) = generate_backup_codes();
        assert_eq!(plaintext.len(), 10);
        assert_eq!(hashed.len(), 10);
    }

    #[test]
    fn test_code_format() {
        let (plaintext, _) = generate_backup_codes();
        for code in &plaintext {
            assert_eq!(code.len(), 8);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_codes_are_unique() {
        let (plaintext, _) = generate_backup_codes();
        let mut deduped = plaintext.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), plaintext.len());
    }

    #[test]
    fn test_each_plaintext_matches_its_own_hash() {
        let (plaintext, hashed) = generate_backup_codes();
        for (idx, code) in plaintext.iter().enumerate() {
            assert_eq!(find_matching_code(code, &hashed), Some(idx));
        }
    }

    #[test]
    fn test_unknown_code_matches_nothing() {
        let (_, hashed) = generate_backup_codes();
        assert_eq!(find_matching_code("00000000", &hashed), None);
        assert_eq!(find_matching_code("", &hashed), None);
    }
}
