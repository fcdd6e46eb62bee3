//! Error types for transaction construction, encoding, and signing.
//!
//! Each stage fails with its own enum so callers can tell a programmer
//! error (construction) from bad input bytes (codec) from a bad signer
//! (signature). [`TxError`] wraps all of them for APIs that span stages.

use thiserror::Error;

use super::resolver::ResolveError;
use super::types::Amount;
use crate::crypto::FormatError;

/// Invariant violations caught while assembling a transaction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("a transaction spends at most 255 inputs, not {count}")]
    TooManyInputs { count: usize },

    #[error("a transaction has at most 255 outputs, not {count}")]
    TooManyOutputs { count: usize },

    #[error("a coinbase transaction needs at least one output")]
    EmptyCoinbase,

    #[error("outputs mix full and compressed addresses")]
    MixedAddressFormats,

    #[error("amount {amount} has more than 8 decimal digits")]
    InexactAmount { amount: String },

    #[error("invalid amount: {amount}")]
    InvalidAmount { amount: String },

    #[error("unsupported transaction version {0}")]
    UnsupportedVersion(u8),

    #[error("version {version} carries {expected}-byte addresses, output {index} has {actual}")]
    AddressVersionMismatch {
        version: u8,
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("message of {len} bytes exceeds the version {version} limit of {max}")]
    MessageTooLong { version: u8, len: usize, max: usize },

    #[error("invalid address: {0}")]
    InvalidAddress(#[from] FormatError),
}

/// Malformed wire bytes. Every variant names the field being read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("truncated {field}: needed {needed} bytes, {remaining} left")]
    UnexpectedEof {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("unsupported transaction version {0}")]
    UnsupportedVersion(u8),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid {field}: {source}")]
    InvalidAddress {
        field: &'static str,
        source: FormatError,
    },

    #[error("coinbase payload must have exactly one input, got {count}")]
    CoinbaseInputCount { count: usize },

    #[error("invalid {field}: {source}")]
    Construction {
        field: &'static str,
        source: ConstructionError,
    },
}

/// Signature failures. The engine reports them and never repairs them.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("input {index} is not signed")]
    Unsigned { index: usize },

    #[error("signature of input {index} does not verify")]
    Invalid { index: usize },

    #[error("cannot resolve public key of input {index}: {source}")]
    UnresolvedPublicKey {
        index: usize,
        #[source]
        source: ResolveError,
    },

    #[error("input {index} spends output {output_index} of {tx_hash}, which does not exist")]
    MissingOutput {
        index: usize,
        tx_hash: String,
        output_index: u8,
    },

    #[error("{signatures} signatures for {groups} distinct signers")]
    GroupMismatch { signatures: usize, groups: usize },
}

/// Umbrella error for operations spanning several stages, plus the
/// caller-level policy checks built on top of the codec.
#[derive(Debug, Error)]
pub enum TxError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Amount, available: Amount },

    #[error("output {index} of {tx_hash} is spent twice")]
    DoubleSpend { tx_hash: String, index: u8 },

    #[error("output {index} does not move a positive amount")]
    InvalidOutput { index: usize },

    #[error("no spendable outputs")]
    NoSpendableOutputs,

    #[error("a transfer needs at least one recipient")]
    NoRecipients,
}
