//! # Cryptographic Primitives
//!
//! Everything the codec needs from elliptic-curve cryptography:
//!
//! - **P-256 ECDSA** for signatures, deterministic nonces per RFC 6979.
//! - **SHA-256** for transaction hashes and as the signature digest.
//! - **Address encoding** of curve points, full (hex) and compressed (base58).
//!
//! All of it wraps the RustCrypto `p256` and `sha2` crates. The only logic
//! that lives here is the ledger's byte order and address layout.

pub mod address;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use address::{
    bytes_to_point, bytes_to_string, point_to_bytes, point_to_string, string_to_bytes,
    string_to_point, AddressFormat, FormatError,
};
pub use hash::{sha256, sha256_array, sha256_hex};
pub use keys::{KeyError, PrivateKey, PublicKey};
pub use signatures::{sign, verify, Signature};
