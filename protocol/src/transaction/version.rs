//! Wire version table.
//!
//! Every version-dependent decision of the codec reads one row of
//! [`WIRE_LAYOUTS`]; nothing else in the crate compares version numbers.

use super::error::ConstructionError;
use crate::config::{MAX_TX_VERSION, MIN_TX_VERSION};
use crate::crypto::AddressFormat;

/// Layout parameters of one wire version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireLayout {
    pub version: u8,
    /// Form, and therefore width, of every output address.
    pub address_format: AddressFormat,
    /// Width of the little-endian message length prefix.
    pub message_len_width: usize,
    /// Whether a present message is part of the signed payload.
    pub signs_message: bool,
}

pub const WIRE_LAYOUTS: [WireLayout; 3] = [
    WireLayout {
        version: 1,
        address_format: AddressFormat::Full,
        message_len_width: 1,
        signs_message: false,
    },
    WireLayout {
        version: 2,
        address_format: AddressFormat::Compressed,
        message_len_width: 1,
        signs_message: false,
    },
    WireLayout {
        version: 3,
        address_format: AddressFormat::Compressed,
        message_len_width: 2,
        signs_message: true,
    },
];

impl WireLayout {
    /// Row for `version`, `None` outside 1..=3.
    pub fn for_version(version: u8) -> Option<&'static WireLayout> {
        if !(MIN_TX_VERSION..=MAX_TX_VERSION).contains(&version) {
            return None;
        }
        WIRE_LAYOUTS.get((version - MIN_TX_VERSION) as usize)
    }

    pub fn address_len(&self) -> usize {
        self.address_format.byte_length()
    }

    /// Longest message the length prefix can describe.
    pub fn max_message_len(&self) -> usize {
        (1usize << (8 * self.message_len_width)) - 1
    }

    /// Little-endian length prefix of a message of `len` bytes.
    pub(crate) fn encode_message_len(&self, len: usize) -> Vec<u8> {
        (len as u64).to_le_bytes()[..self.message_len_width].to_vec()
    }
}

/// Version a regular transaction takes for outputs of the given address
/// widths: all full ⇒ 1 (also when there are no outputs), all compressed
/// ⇒ 3.
pub fn infer_version<I>(address_lengths: I) -> Result<u8, ConstructionError>
where
    I: IntoIterator<Item = usize>,
{
    let mut lengths = address_lengths.into_iter();
    let first = match lengths.next() {
        Some(len) => AddressFormat::from_byte_length(len)?,
        None => return Ok(1),
    };
    for len in lengths {
        if AddressFormat::from_byte_length(len)? != first {
            return Err(ConstructionError::MixedAddressFormats);
        }
    }
    Ok(match first {
        AddressFormat::Full => 1,
        AddressFormat::Compressed => 3,
    })
}
