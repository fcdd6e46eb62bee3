//! # Key Management
//!
//! P-256 key pairs for uPow addresses.
//!
//! The ledger serializes every integer little-endian, point coordinates
//! included, while SEC1 (and therefore the `p256` crate) is big-endian. The
//! conversion happens here and nowhere else: [`PublicKey::x`] and
//! [`PublicKey::y`] hand out wire-order bytes.

use std::fmt;
use std::hash::{Hash, Hasher};

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use p256::{EncodedPoint, FieldBytes};
use rand::rngs::OsRng;
use thiserror::Error;

use super::signatures::Signature;
use crate::config::COORDINATE_LENGTH;

/// Errors that can occur during key operations.
///
/// Messages never include key material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid private key: not a valid P-256 scalar")]
    InvalidPrivateKey,

    #[error("invalid public key: not a point on P-256")]
    InvalidPublicKey,
}

/// A P-256 private key.
///
/// Deliberately not `Serialize`: exporting a secret goes through
/// [`PrivateKey::to_hex`] explicitly.
#[derive(Clone)]
pub struct PrivateKey {
    signing_key: SigningKey,
}

/// A point on P-256, the public half of a uPow identity and the content of
/// every address.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

/// Reverses a 32-byte little-endian integer into SEC1 (big-endian) order.
/// The operation is its own inverse.
pub(crate) fn flip(bytes: &[u8]) -> [u8; COORDINATE_LENGTH] {
    let mut out = [0u8; COORDINATE_LENGTH];
    for (dst, src) in out.iter_mut().zip(bytes.iter().rev()) {
        *dst = *src;
    }
    out
}

impl PrivateKey {
    /// Generate a fresh key from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Build a key from its 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, KeyError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Parse a hex scalar. Accepts an optional `0x` prefix and fewer than 64
    /// digits, which is how integer keys are usually printed.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let digits = hex_str.trim();
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);
        if digits.is_empty() || digits.len() > 64 {
            return Err(KeyError::InvalidPrivateKey);
        }
        let padded = format!("{:0>64}", digits);
        let bytes = hex::decode(padded).map_err(|_| KeyError::InvalidPrivateKey)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Self::from_bytes(&arr)
    }

    /// The 32-byte big-endian scalar as hex. Handle with care.
    pub fn to_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// The public key derived from this private key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: VerifyingKey::from(&self.signing_key),
        }
    }

    /// ECDSA over SHA-256(`message`) with an RFC 6979 nonce.
    ///
    /// Deterministic for a given key and message. S is not normalized, the
    /// ledger accepts both halves.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig: EcdsaSignature = self.signing_key.sign(message);
        Signature::from_ecdsa(&sig)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

impl PublicKey {
    /// Build a point from little-endian affine coordinates.
    pub fn from_coordinates(x: &[u8; 32], y: &[u8; 32]) -> Result<Self, KeyError> {
        let x_be = FieldBytes::clone_from_slice(&flip(x));
        let y_be = FieldBytes::clone_from_slice(&flip(y));
        let point = EncodedPoint::from_affine_coordinates(&x_be, &y_be, false);
        let verifying_key =
            VerifyingKey::from_encoded_point(&point).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { verifying_key })
    }

    /// Recover a point from its little-endian X coordinate and the parity
    /// of Y. Solves the curve equation for Y and keeps the root with the
    /// requested parity.
    pub fn from_x(x: &[u8; 32], y_is_odd: bool) -> Result<Self, KeyError> {
        let mut sec1 = [0u8; 1 + COORDINATE_LENGTH];
        sec1[0] = if y_is_odd { 0x03 } else { 0x02 };
        sec1[1..].copy_from_slice(&flip(x));
        let verifying_key =
            VerifyingKey::from_sec1_bytes(&sec1).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { verifying_key })
    }

    /// X coordinate, little-endian.
    pub fn x(&self) -> [u8; 32] {
        let point = self.verifying_key.to_encoded_point(false);
        flip(&point.as_bytes()[1..1 + COORDINATE_LENGTH])
    }

    /// Y coordinate, little-endian.
    pub fn y(&self) -> [u8; 32] {
        let point = self.verifying_key.to_encoded_point(false);
        flip(&point.as_bytes()[1 + COORDINATE_LENGTH..])
    }

    /// Parity of Y, read from its least significant bit.
    pub fn is_y_odd(&self) -> bool {
        self.y()[0] & 1 == 1
    }

    /// Check an ECDSA signature over SHA-256(`message`).
    ///
    /// Returns `false` for anything that does not verify, including
    /// out-of-range scalars. Never panics.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        match signature.to_ecdsa() {
            Some(sig) => self.verifying_key.verify(message, &sig).is_ok(),
            None => false,
        }
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x().hash(state);
        self.y().hash(state);
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}{})", hex::encode(self.x()), hex::encode(self.y()))
    }
}
