//! # Hashing Utilities
//!
//! The ledger uses a single hash function, SHA-256, for transaction ids and
//! as the ECDSA message digest. Transaction hashes are exchanged as lowercase
//! hex, so a hex-returning helper sits next to the raw ones.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use upow_protocol::crypto::sha256;
///
/// let hash = sha256(b"upow");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Same as [`sha256`] but returns a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// SHA-256 of `data` as a lowercase hex string. This is the form in which
/// transaction hashes are referenced by inputs and reported by the node.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_array(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn array_and_vec_agree() {
        let data = b"transaction payload";
        assert_eq!(sha256(data), sha256_array(data).to_vec());
    }
}
