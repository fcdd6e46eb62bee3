//! # ECDSA Signatures
//!
//! A uPow signature is the pair `(r, s)` written as two 32-byte
//! little-endian integers. This module owns that wire form and the
//! conversion to and from `p256`'s big-endian representation.

use std::fmt;

use p256::ecdsa::Signature as EcdsaSignature;
use p256::FieldBytes;

use super::keys::{flip, PrivateKey, PublicKey};
use crate::config::{COORDINATE_LENGTH, SIGNATURE_LENGTH};

/// An ECDSA signature in wire order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    /// Wrap little-endian scalars without validating them.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Self { r, s }
    }

    /// Split a 64-byte `r ∥ s` block.
    pub fn from_wire_bytes(bytes: &[u8; SIGNATURE_LENGTH]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..COORDINATE_LENGTH]);
        s.copy_from_slice(&bytes[COORDINATE_LENGTH..]);
        Self { r, s }
    }

    /// `r ∥ s`, both little-endian.
    pub fn to_wire_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..COORDINATE_LENGTH].copy_from_slice(&self.r);
        out[COORDINATE_LENGTH..].copy_from_slice(&self.s);
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_wire_bytes())
    }

    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// A zero `r` never comes out of a signer, so the decoder uses it to
    /// mark the end of a signature block.
    pub fn is_sentinel(&self) -> bool {
        self.r.iter().all(|b| *b == 0)
    }

    pub(crate) fn from_ecdsa(sig: &EcdsaSignature) -> Self {
        let (r, s) = sig.split_bytes();
        Self {
            r: flip(&r),
            s: flip(&s),
        }
    }

    /// `None` when either scalar is zero or not below the group order.
    pub(crate) fn to_ecdsa(&self) -> Option<EcdsaSignature> {
        let r = FieldBytes::clone_from_slice(&flip(&self.r));
        let s = FieldBytes::clone_from_slice(&flip(&self.s));
        EcdsaSignature::from_scalars(r, s).ok()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

/// Sign `message` with `key`. See [`PrivateKey::sign`].
pub fn sign(key: &PrivateKey, message: &[u8]) -> Signature {
    key.sign(message)
}

/// Verify `signature` over `message` under `public_key`.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    public_key.verify(message, signature)
}
