//! Transaction inputs: references to outputs being spent.

use serde::Serialize;

use super::codec::AnyTransaction;
use super::error::CodecError;
use super::types::{Amount, InputType};
use crate::config::HASH_LENGTH;
use crate::crypto::{PrivateKey, PublicKey, Signature};

/// One spent output.
///
/// Only `(tx_hash, index, input_type)` goes on the wire. The amount, the
/// owner's public key, the bound signing key and the signature travel
/// with the input in memory so that signing, fee computation and coin
/// selection need no further lookups.
#[derive(Debug, Clone)]
pub struct TxInput {
    tx_hash: [u8; HASH_LENGTH],
    index: u8,
    input_type: InputType,
    amount: Option<Amount>,
    public_key: Option<PublicKey>,
    signing_key: Option<PrivateKey>,
    signature: Option<Signature>,
}

impl TxInput {
    pub fn new(tx_hash: [u8; HASH_LENGTH], index: u8) -> Self {
        Self {
            tx_hash,
            index,
            input_type: InputType::Regular,
            amount: None,
            public_key: None,
            signing_key: None,
            signature: None,
        }
    }

    /// Input from a hex transaction hash.
    pub fn from_hex_hash(tx_hash: &str, index: u8) -> Result<Self, CodecError> {
        let bytes = hex::decode(tx_hash).map_err(|e| CodecError::InvalidHex(e.to_string()))?;
        let tx_hash: [u8; HASH_LENGTH] =
            bytes
                .try_into()
                .map_err(|bytes: Vec<u8>| CodecError::InvalidField {
                    field: "input tx_hash",
                    reason: format!("expected {} bytes, got {}", HASH_LENGTH, bytes.len()),
                })?;
        Ok(Self::new(tx_hash, index))
    }

    /// Input spending output `index` of a transaction the caller already
    /// holds. Amount and owner are copied from that output.
    pub fn from_source_output(source: &AnyTransaction, index: u8) -> Result<Self, CodecError> {
        let output = source.outputs().get(index as usize).ok_or_else(|| {
            CodecError::InvalidField {
                field: "input index",
                reason: format!(
                    "source transaction has {} outputs, no index {}",
                    source.outputs().len(),
                    index
                ),
            }
        })?;
        let mut input = Self::from_hex_hash(&source.hash(), index)?;
        input.amount = Some(output.amount());
        input.public_key = Some(output.public_key().clone());
        Ok(input)
    }

    pub fn with_input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_public_key(mut self, public_key: PublicKey) -> Self {
        self.public_key = Some(public_key);
        self
    }

    /// Bind the key that will sign this input. Also fixes the public key.
    pub fn with_signing_key(mut self, key: PrivateKey) -> Self {
        self.public_key = Some(key.public_key());
        self.signing_key = Some(key);
        self
    }

    pub fn tx_hash(&self) -> &[u8; HASH_LENGTH] {
        &self.tx_hash
    }

    pub fn tx_hash_hex(&self) -> String {
        hex::encode(self.tx_hash)
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    pub fn signing_key(&self) -> Option<&PrivateKey> {
        self.signing_key.as_ref()
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// The outpoint this input consumes.
    pub fn outpoint(&self) -> ([u8; HASH_LENGTH], u8) {
        (self.tx_hash, self.index)
    }

    // Mutators are crate-private: a transaction must invalidate its hash
    // whenever one of its inputs changes.

    pub(crate) fn set_amount(&mut self, amount: Amount) {
        self.amount = Some(amount);
    }

    pub(crate) fn set_public_key(&mut self, public_key: PublicKey) {
        self.public_key = Some(public_key);
    }

    pub(crate) fn bind_signing_key(&mut self, key: PrivateKey) {
        self.signing_key = Some(key);
    }

    pub(crate) fn set_signature(&mut self, signature: Option<Signature>) {
        self.signature = signature;
    }

    /// `tx_hash:32 ∥ index:1 ∥ input_type:1`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HASH_LENGTH + 2);
        out.extend_from_slice(&self.tx_hash);
        out.push(self.index);
        out.push(self.input_type.as_u8());
        out
    }
}

/// Two inputs are the same input when they spend the same outpoint.
impl PartialEq for TxInput {
    fn eq(&self, other: &Self) -> bool {
        self.outpoint() == other.outpoint()
    }
}

impl Eq for TxInput {}

/// JSON view of an input for inspection tools.
#[derive(Debug, Clone, Serialize)]
pub struct TxInputSummary {
    pub tx_hash: String,
    pub index: u8,
    pub input_type: InputType,
    pub amount: Option<Amount>,
    pub signed: bool,
}

impl From<&TxInput> for TxInputSummary {
    fn from(input: &TxInput) -> Self {
        Self {
            tx_hash: input.tx_hash_hex(),
            index: input.index,
            input_type: input.input_type,
            amount: input.amount,
            signed: input.is_signed(),
        }
    }
}
