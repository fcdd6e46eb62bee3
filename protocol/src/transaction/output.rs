//! Transaction outputs: new value assignments.

use serde::Serialize;

use super::error::ConstructionError;
use super::types::{Amount, OutputType};
use crate::crypto::{
    bytes_to_point, bytes_to_string, point_to_bytes, string_to_bytes, AddressFormat, PublicKey,
};

/// Coins assigned to an address.
///
/// The raw address bytes are kept exactly as given so that the output
/// re-encodes byte for byte; the decoded point is kept next to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    address_bytes: Vec<u8>,
    public_key: PublicKey,
    amount: Amount,
    output_type: OutputType,
}

impl TxOutput {
    /// Output to an address string of either form.
    pub fn new(
        address: &str,
        amount: Amount,
        output_type: OutputType,
    ) -> Result<Self, ConstructionError> {
        let address_bytes = string_to_bytes(address)?;
        Self::from_address_bytes(address_bytes, amount, output_type)
    }

    /// Output with a decimal amount, e.g. `"1.5"`.
    pub fn parse(
        address: &str,
        amount: &str,
        output_type: OutputType,
    ) -> Result<Self, ConstructionError> {
        Self::new(address, amount.parse()?, output_type)
    }

    /// Output to `public_key` in the given address form.
    pub fn from_public_key(
        public_key: &PublicKey,
        format: AddressFormat,
        amount: Amount,
        output_type: OutputType,
    ) -> Self {
        Self {
            address_bytes: point_to_bytes(public_key, format),
            public_key: public_key.clone(),
            amount,
            output_type,
        }
    }

    pub(crate) fn from_address_bytes(
        address_bytes: Vec<u8>,
        amount: Amount,
        output_type: OutputType,
    ) -> Result<Self, ConstructionError> {
        let public_key = bytes_to_point(&address_bytes)?;
        Ok(Self {
            address_bytes,
            public_key,
            amount,
            output_type,
        })
    }

    pub fn address_bytes(&self) -> &[u8] {
        &self.address_bytes
    }

    /// Canonical address string: hex for full, base58 for compressed.
    pub fn address(&self) -> String {
        // The bytes were validated on construction.
        bytes_to_string(&self.address_bytes).unwrap_or_else(|_| hex::encode(&self.address_bytes))
    }

    pub fn address_format(&self) -> AddressFormat {
        if self.address_bytes.len() == AddressFormat::Full.byte_length() {
            AddressFormat::Full
        } else {
            AddressFormat::Compressed
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn output_type(&self) -> OutputType {
        self.output_type
    }

    /// `address ∥ amount_len:1 ∥ amount ∥ output_type:1`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let amount = self.amount.to_minimal_bytes();
        let mut out = Vec::with_capacity(self.address_bytes.len() + amount.len() + 1);
        out.extend_from_slice(&self.address_bytes);
        out.extend_from_slice(&amount);
        out.push(self.output_type.as_u8());
        out
    }

    /// An output is valid when it moves a positive amount. The address is
    /// a curve point by construction.
    pub fn verify(&self) -> bool {
        !self.amount.is_zero()
    }
}

/// JSON view of an output for inspection tools.
#[derive(Debug, Clone, Serialize)]
pub struct TxOutputSummary {
    pub address: String,
    pub amount: Amount,
    pub output_type: OutputType,
}

impl From<&TxOutput> for TxOutputSummary {
    fn from(output: &TxOutput) -> Self {
        Self {
            address: output.address(),
            amount: output.amount,
            output_type: output.output_type,
        }
    }
}
