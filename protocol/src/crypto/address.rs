//! # Address Encoding
//!
//! An address is a public key written in one of two forms:
//!
//! ```text
//! full        X(32, LE) ∥ Y(32, LE)             64 bytes, hex string
//! compressed  specifier(1) ∥ X(32, LE)          33 bytes, base58 string
//! ```
//!
//! The specifier is 42 for an even Y and 43 for an odd Y. The raw byte
//! length of an address decides which transaction versions may carry it,
//! so parsing never needs a format tag: hex is tried first, base58 second,
//! and the decoded length tells the forms apart.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::keys::PublicKey;
use crate::config::{
    COMPRESSED_ADDRESS_LENGTH, COORDINATE_LENGTH, EVEN_Y_SPECIFIER, FULL_ADDRESS_LENGTH,
    ODD_Y_SPECIFIER,
};

/// Errors raised while turning bytes or strings into points.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("address must decode to 64 or 33 bytes, got {0}")]
    InvalidLength(usize),

    #[error("unknown parity specifier {0}, expected 42 or 43")]
    InvalidSpecifier(u8),

    #[error("address is not a point on P-256")]
    NotOnCurve,

    #[error("address is neither hex nor base58")]
    InvalidEncoding,
}

/// The two external forms of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFormat {
    /// 64 bytes, hex. Carried by version 1 transactions.
    Full,
    /// 33 bytes, base58. Carried by versions 2 and 3.
    Compressed,
}

impl AddressFormat {
    /// Raw length of an address in this form.
    pub fn byte_length(self) -> usize {
        match self {
            Self::Full => FULL_ADDRESS_LENGTH,
            Self::Compressed => COMPRESSED_ADDRESS_LENGTH,
        }
    }

    /// Form of an address from its raw length.
    pub fn from_byte_length(len: usize) -> Result<Self, FormatError> {
        match len {
            FULL_ADDRESS_LENGTH => Ok(Self::Full),
            COMPRESSED_ADDRESS_LENGTH => Ok(Self::Compressed),
            other => Err(FormatError::InvalidLength(other)),
        }
    }
}

impl fmt::Display for AddressFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Compressed => write!(f, "compressed"),
        }
    }
}

/// Raw address bytes of `point`.
pub fn point_to_bytes(point: &PublicKey, format: AddressFormat) -> Vec<u8> {
    match format {
        AddressFormat::Full => {
            let mut out = Vec::with_capacity(FULL_ADDRESS_LENGTH);
            out.extend_from_slice(&point.x());
            out.extend_from_slice(&point.y());
            out
        }
        AddressFormat::Compressed => {
            let mut out = Vec::with_capacity(COMPRESSED_ADDRESS_LENGTH);
            out.push(if point.is_y_odd() {
                ODD_Y_SPECIFIER
            } else {
                EVEN_Y_SPECIFIER
            });
            out.extend_from_slice(&point.x());
            out
        }
    }
}

/// Point behind raw address bytes. The length picks the form.
pub fn bytes_to_point(bytes: &[u8]) -> Result<PublicKey, FormatError> {
    match AddressFormat::from_byte_length(bytes.len())? {
        AddressFormat::Full => {
            let mut x = [0u8; COORDINATE_LENGTH];
            let mut y = [0u8; COORDINATE_LENGTH];
            x.copy_from_slice(&bytes[..COORDINATE_LENGTH]);
            y.copy_from_slice(&bytes[COORDINATE_LENGTH..]);
            PublicKey::from_coordinates(&x, &y).map_err(|_| FormatError::NotOnCurve)
        }
        AddressFormat::Compressed => {
            let y_is_odd = match bytes[0] {
                EVEN_Y_SPECIFIER => false,
                ODD_Y_SPECIFIER => true,
                other => return Err(FormatError::InvalidSpecifier(other)),
            };
            let mut x = [0u8; COORDINATE_LENGTH];
            x.copy_from_slice(&bytes[1..]);
            PublicKey::from_x(&x, y_is_odd).map_err(|_| FormatError::NotOnCurve)
        }
    }
}

/// String form of `point`: hex for full, base58 for compressed.
pub fn point_to_string(point: &PublicKey, format: AddressFormat) -> String {
    let bytes = point_to_bytes(point, format);
    match format {
        AddressFormat::Full => hex::encode(bytes),
        AddressFormat::Compressed => bs58::encode(bytes).into_string(),
    }
}

/// Raw bytes of an address string. Hex wins when the string is valid hex.
pub fn string_to_bytes(address: &str) -> Result<Vec<u8>, FormatError> {
    if let Ok(bytes) = hex::decode(address) {
        return Ok(bytes);
    }
    bs58::decode(address)
        .into_vec()
        .map_err(|_| FormatError::InvalidEncoding)
}

/// Point behind an address string.
pub fn string_to_point(address: &str) -> Result<PublicKey, FormatError> {
    bytes_to_point(&string_to_bytes(address)?)
}

/// Canonical string for raw address bytes, in the form their length implies.
pub fn bytes_to_string(bytes: &[u8]) -> Result<String, FormatError> {
    let format = AddressFormat::from_byte_length(bytes.len())?;
    let point = bytes_to_point(bytes)?;
    Ok(point_to_string(&point, format))
}

impl PublicKey {
    /// This key as an address string.
    pub fn to_address(&self, format: AddressFormat) -> String {
        point_to_string(self, format)
    }

    /// Parse an address string of either form.
    pub fn from_address(address: &str) -> Result<Self, FormatError> {
        string_to_point(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::PrivateKey;

    #[test]
    fn full_roundtrip() {
        let pk = PrivateKey::generate().public_key();
        let bytes = point_to_bytes(&pk, AddressFormat::Full);
        assert_eq!(bytes.len(), 64);
        assert_eq!(bytes_to_point(&bytes).unwrap(), pk);
    }

    #[test]
    fn compressed_roundtrip_for_both_parities() {
        let mut seen_odd = false;
        let mut seen_even = false;
        while !(seen_odd && seen_even) {
            let pk = PrivateKey::generate().public_key();
            let bytes = point_to_bytes(&pk, AddressFormat::Compressed);
            assert_eq!(bytes.len(), 33);
            if pk.is_y_odd() {
                assert_eq!(bytes[0], ODD_Y_SPECIFIER);
                seen_odd = true;
            } else {
                assert_eq!(bytes[0], EVEN_Y_SPECIFIER);
                seen_even = true;
            }
            assert_eq!(bytes_to_point(&bytes).unwrap(), pk);
        }
    }

    #[test]
    fn string_roundtrip_both_formats() {
        let pk = PrivateKey::generate().public_key();
        for format in [AddressFormat::Full, AddressFormat::Compressed] {
            let address = pk.to_address(format);
            assert_eq!(PublicKey::from_address(&address).unwrap(), pk);
            let bytes = string_to_bytes(&address).unwrap();
            assert_eq!(bytes.len(), format.byte_length());
            assert_eq!(bytes_to_string(&bytes).unwrap(), address);
        }
    }

    #[test]
    fn full_address_is_hex_compressed_is_base58() {
        let pk = PrivateKey::generate().public_key();
        let full = pk.to_address(AddressFormat::Full);
        assert_eq!(full.len(), 128);
        assert!(full.chars().all(|c| c.is_ascii_hexdigit()));

        let compressed = pk.to_address(AddressFormat::Compressed);
        assert!(hex::decode(&compressed).is_err());
        assert_eq!(bs58::decode(&compressed).into_vec().unwrap().len(), 33);
    }

    #[test]
    fn generator_full_address_is_little_endian() {
        let pk = PrivateKey::from_hex("1").unwrap().public_key();
        let full = pk.to_address(AddressFormat::Full);
        // Gx = 6b17d1f2...d898c296, so its little-endian form starts with 96c298d8.
        assert!(full.starts_with("96c298d8"));
    }

    #[test]
    fn rejects_bad_lengths() {
        assert_eq!(
            bytes_to_point(&[0u8; 32]).unwrap_err(),
            FormatError::InvalidLength(32)
        );
        assert_eq!(
            bytes_to_point(&[0u8; 65]).unwrap_err(),
            FormatError::InvalidLength(65)
        );
    }

    #[test]
    fn rejects_unknown_specifier() {
        let pk = PrivateKey::generate().public_key();
        let mut bytes = point_to_bytes(&pk, AddressFormat::Compressed);
        bytes[0] = 2;
        assert_eq!(
            bytes_to_point(&bytes).unwrap_err(),
            FormatError::InvalidSpecifier(2)
        );
    }

    #[test]
    fn rejects_undecodable_strings() {
        assert_eq!(
            string_to_bytes("0OIl not an address").unwrap_err(),
            FormatError::InvalidEncoding
        );
    }
}
