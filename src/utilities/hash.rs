//! Password digests: SHA-256, lowercase hex.

use sha2::{Digest, Sha256};

/// Length of a hex-encoded 256-bit digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// SHA-256 of the UTF-8 bytes of `password`, as lowercase hex.
pub fn sha256_hex(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Whether `s` has the digest output format: 64 lowercase hex characters.
pub fn is_digest_hex(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn deterministic_and_distinct() {
        assert_eq!(sha256_hex("x"), sha256_hex("x"));
        assert_ne!(sha256_hex("x"), sha256_hex("y"));
    }

    #[test]
    fn output_format() {
        for input in ["", "hunter2", "pässwörd", "a much longer passphrase with spaces"] {
            assert!(is_digest_hex(&sha256_hex(input)));
        }
    }

    #[test]
    fn rejects_bad_formats() {
        assert!(!is_digest_hex("abc"));
        assert!(!is_digest_hex(&"A".repeat(64)));
        assert!(!is_digest_hex(&"g".repeat(64)));
        assert!(!is_digest_hex(&"a".repeat(65)));
        assert!(is_digest_hex(&"0".repeat(64)));
    }
}
