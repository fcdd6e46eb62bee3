//! Wire decoding.
//!
//! Decoding reads the bytes once, front to back, then hands the parsed
//! signatures to the association rule:
//!
//! | signatures            | assignment                                   |
//! |-----------------------|----------------------------------------------|
//! | none                  | inputs stay unsigned                         |
//! | one                   | every input                                  |
//! | one per input         | by position                                  |
//! | anything else         | by signer, in order of first appearance      |
//!
//! The last rule needs each input's public key, which may require a
//! [`TransactionResolver`]. With signature checking disabled that lookup is
//! skipped: the transaction comes back unsigned and the signatures stay
//! detached, so re-encoding still yields the original bytes.

use serde::Serialize;
use tracing::debug;

use super::builder::{Transaction, TransactionSummary};
use super::coinbase::{CoinbaseSummary, CoinbaseTransaction};
use super::error::{CodecError, ConstructionError, SignatureError, TxError};
use super::input::TxInput;
use super::output::TxOutput;
use super::resolver::TransactionResolver;
use super::signing::group_inputs_by_signer;
use super::types::{Amount, InputType, OutputType};
use super::version::WireLayout;
use crate::config::{COINBASE_TERMINATOR, HASH_LENGTH, SIGNATURE_LENGTH};
use crate::crypto::Signature;

// ---------------------------------------------------------------------------
// AnyTransaction
// ---------------------------------------------------------------------------

/// Either kind of decoded transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyTransaction {
    Regular(Transaction),
    Coinbase(CoinbaseTransaction),
}

impl AnyTransaction {
    /// Decode and associate signatures. See the module docs.
    pub async fn from_hex<R>(
        hex: &str,
        check_signatures: bool,
        resolver: &R,
    ) -> Result<Self, TxError>
    where
        R: TransactionResolver + ?Sized,
    {
        decode(hex, check_signatures, resolver).await
    }

    /// Decode without any lookup. Same as `from_hex(hex, false, _)`.
    pub fn from_hex_unchecked(hex: &str) -> Result<Self, CodecError> {
        decode_unchecked(hex)
    }

    pub fn hash(&self) -> String {
        match self {
            Self::Regular(tx) => tx.hash(),
            Self::Coinbase(tx) => tx.hash(),
        }
    }

    /// Full encoding as hex.
    pub fn to_hex(&self) -> String {
        match self {
            Self::Regular(tx) => tx.to_hex(true),
            Self::Coinbase(tx) => tx.to_hex(),
        }
    }

    pub fn version(&self) -> u8 {
        match self {
            Self::Regular(tx) => tx.version(),
            Self::Coinbase(tx) => tx.version(),
        }
    }

    pub fn outputs(&self) -> &[TxOutput] {
        match self {
            Self::Regular(tx) => tx.outputs(),
            Self::Coinbase(tx) => tx.outputs(),
        }
    }

    pub fn is_coinbase(&self) -> bool {
        matches!(self, Self::Coinbase(_))
    }

    pub fn as_regular(&self) -> Option<&Transaction> {
        match self {
            Self::Regular(tx) => Some(tx),
            Self::Coinbase(_) => None,
        }
    }

    pub fn into_regular(self) -> Option<Transaction> {
        match self {
            Self::Regular(tx) => Some(tx),
            Self::Coinbase(_) => None,
        }
    }

    pub fn as_coinbase(&self) -> Option<&CoinbaseTransaction> {
        match self {
            Self::Coinbase(tx) => Some(tx),
            Self::Regular(_) => None,
        }
    }

    pub fn summary(&self) -> AnySummary {
        match self {
            Self::Regular(tx) => AnySummary::Regular(tx.summary()),
            Self::Coinbase(tx) => AnySummary::Coinbase(tx.summary()),
        }
    }
}

impl From<Transaction> for AnyTransaction {
    fn from(tx: Transaction) -> Self {
        Self::Regular(tx)
    }
}

impl From<CoinbaseTransaction> for AnyTransaction {
    fn from(tx: CoinbaseTransaction) -> Self {
        Self::Coinbase(tx)
    }
}

/// JSON view of either kind of transaction, tagged with `kind`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnySummary {
    Regular(TransactionSummary),
    Coinbase(CoinbaseSummary),
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Hex of `tx`, full or signable. See [`Transaction::to_bytes`].
pub fn encode(tx: &Transaction, full: bool) -> String {
    tx.to_hex(full)
}

// ---------------------------------------------------------------------------
// ByteReader
// ---------------------------------------------------------------------------

/// Forward-only cursor. Every read names the field it is reading so that
/// a short buffer reports what was being decoded.
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub(crate) fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::UnexpectedEof {
                field,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub(crate) fn read_u8(&mut self, field: &'static str) -> Result<u8, CodecError> {
        Ok(self.take(1, field)?[0])
    }

    pub(crate) fn read_array<const N: usize>(
        &mut self,
        field: &'static str,
    ) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, field)?);
        Ok(out)
    }

    /// Little-endian unsigned integer of `width` bytes (at most 8).
    pub(crate) fn read_uint_le(
        &mut self,
        width: usize,
        field: &'static str,
    ) -> Result<u64, CodecError> {
        let raw = self.take(width, field)?;
        let mut buf = [0u8; 8];
        buf[..raw.len()].copy_from_slice(raw);
        Ok(u64::from_le_bytes(buf))
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// A regular transaction as read off the wire, before association.
struct RawTransaction {
    layout: &'static WireLayout,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    message: Option<Vec<u8>>,
    signatures: Vec<Signature>,
}

enum Parsed {
    Regular(RawTransaction),
    Coinbase(CoinbaseTransaction),
}

fn parse(bytes: &[u8]) -> Result<Parsed, CodecError> {
    let mut reader = ByteReader::new(bytes);

    let version = reader.read_u8("version")?;
    let layout = WireLayout::for_version(version).ok_or(CodecError::UnsupportedVersion(version))?;

    let input_count = reader.read_u8("input count")?;
    let mut inputs = Vec::with_capacity(input_count as usize);
    for _ in 0..input_count {
        inputs.push(parse_input(&mut reader)?);
    }

    let output_count = reader.read_u8("output count")?;
    let mut outputs = Vec::with_capacity(output_count as usize);
    for _ in 0..output_count {
        outputs.push(parse_output(&mut reader, layout)?);
    }

    let message = match reader.read_u8("message flag")? {
        COINBASE_TERMINATOR => return parse_coinbase(version, inputs, outputs),
        0 => None,
        1 => {
            let len = reader.read_uint_le(layout.message_len_width, "message length")?;
            Some(reader.take(len as usize, "message")?.to_vec())
        }
        other => {
            return Err(CodecError::InvalidField {
                field: "message flag",
                reason: format!("expected 0, 1 or {}, got {}", COINBASE_TERMINATOR, other),
            })
        }
    };

    let mut signatures = Vec::new();
    while !reader.is_empty() {
        let raw = reader.read_array::<SIGNATURE_LENGTH>("signature")?;
        let signature = Signature::from_wire_bytes(&raw);
        if signature.is_sentinel() {
            break;
        }
        signatures.push(signature);
    }

    Ok(Parsed::Regular(RawTransaction {
        layout,
        inputs,
        outputs,
        message,
        signatures,
    }))
}

fn parse_input(reader: &mut ByteReader<'_>) -> Result<TxInput, CodecError> {
    let tx_hash = reader.read_array::<HASH_LENGTH>("input tx_hash")?;
    let index = reader.read_u8("input index")?;
    let raw_type = reader.read_u8("input type")?;
    let input_type = InputType::from_u8(raw_type).ok_or_else(|| CodecError::InvalidField {
        field: "input type",
        reason: format!("unknown discriminator {}", raw_type),
    })?;
    Ok(TxInput::new(tx_hash, index).with_input_type(input_type))
}

fn parse_output(reader: &mut ByteReader<'_>, layout: &WireLayout) -> Result<TxOutput, CodecError> {
    let address = reader.take(layout.address_len(), "output address")?.to_vec();
    let amount_len = reader.read_u8("output amount length")?;
    let raw_amount = reader.take(amount_len as usize, "output amount")?;
    let amount = Amount::from_minimal_bytes(raw_amount).ok_or_else(|| CodecError::InvalidField {
        field: "output amount",
        reason: format!("{} bytes exceed the 64-bit range", amount_len),
    })?;
    let raw_type = reader.read_u8("output type")?;
    let output_type = OutputType::from_u8(raw_type).ok_or_else(|| CodecError::InvalidField {
        field: "output type",
        reason: format!("unknown discriminator {}", raw_type),
    })?;
    TxOutput::from_address_bytes(address, amount, output_type).map_err(|e| match e {
        ConstructionError::InvalidAddress(source) => CodecError::InvalidAddress {
            field: "output address",
            source,
        },
        source => CodecError::Construction {
            field: "output",
            source,
        },
    })
}

fn parse_coinbase(
    version: u8,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
) -> Result<Parsed, CodecError> {
    let block_hash = match inputs.as_slice() {
        [only] => *only.tx_hash(),
        _ => {
            return Err(CodecError::CoinbaseInputCount {
                count: inputs.len(),
            })
        }
    };
    let coinbase = CoinbaseTransaction::from_parts(block_hash, outputs, version).map_err(
        |source| CodecError::Construction {
            field: "coinbase",
            source,
        },
    )?;
    Ok(Parsed::Coinbase(coinbase))
}

/// Build the transaction and apply every association rule that needs no
/// lookup. Signatures that still await grouping by signer are returned.
fn assemble(raw: RawTransaction) -> Result<(Transaction, Vec<Signature>), CodecError> {
    let mut tx = Transaction::new(raw.inputs, raw.outputs, raw.message, Some(raw.layout.version))
        .map_err(|source| CodecError::Construction {
            field: "transaction",
            source,
        })?;

    let signatures = raw.signatures;
    let input_count = tx.inputs().len();
    let pending = if signatures.is_empty() {
        Vec::new()
    } else if input_count == 0 {
        // Nothing to attach them to; keep them so the bytes survive.
        tx.set_detached_signatures(signatures);
        Vec::new()
    } else if signatures.len() == 1 {
        let only = signatures[0];
        for input in tx.inputs_mut() {
            input.set_signature(Some(only));
        }
        Vec::new()
    } else if signatures.len() == input_count {
        for (input, signature) in tx.inputs_mut().iter_mut().zip(&signatures) {
            input.set_signature(Some(*signature));
        }
        Vec::new()
    } else {
        signatures
    };
    debug!(
        version = tx.version(),
        inputs = input_count,
        outputs = tx.outputs().len(),
        pending = pending.len(),
        "parsed transaction"
    );
    Ok((tx, pending))
}

fn decode_bytes_hex(hex_str: &str) -> Result<Vec<u8>, CodecError> {
    hex::decode(hex_str.trim()).map_err(|e| CodecError::InvalidHex(e.to_string()))
}

/// Decode a hex transaction.
///
/// With `check_signatures`, signatures that can only be matched to inputs
/// by signer are grouped through `resolver`; more signatures than signers
/// is an error. Cryptographic verification is a separate step, see
/// [`super::verification::check_signatures`].
pub async fn decode<R>(
    hex_str: &str,
    check_signatures: bool,
    resolver: &R,
) -> Result<AnyTransaction, TxError>
where
    R: TransactionResolver + ?Sized,
{
    let bytes = decode_bytes_hex(hex_str)?;
    let raw = match parse(&bytes)? {
        Parsed::Coinbase(coinbase) => return Ok(coinbase.into()),
        Parsed::Regular(raw) => raw,
    };
    let (mut tx, pending) = assemble(raw)?;
    if pending.is_empty() {
        return Ok(tx.into());
    }
    if !check_signatures {
        tx.set_detached_signatures(pending);
        return Ok(tx.into());
    }

    let groups = group_inputs_by_signer(&mut tx, resolver).await?;
    if pending.len() > groups.len() {
        return Err(SignatureError::GroupMismatch {
            signatures: pending.len(),
            groups: groups.len(),
        }
        .into());
    }
    let inputs = tx.inputs_mut();
    for (signature, group) in pending.iter().zip(&groups) {
        for &index in group {
            inputs[index].set_signature(Some(*signature));
        }
    }
    debug!(
        signatures = pending.len(),
        groups = groups.len(),
        "assigned signatures by signer"
    );
    Ok(tx.into())
}

/// Decode without resolving anything. Signatures that would need grouping
/// by signer stay detached.
pub fn decode_unchecked(hex_str: &str) -> Result<AnyTransaction, CodecError> {
    let bytes = decode_bytes_hex(hex_str)?;
    match parse(&bytes)? {
        Parsed::Coinbase(coinbase) => Ok(coinbase.into()),
        Parsed::Regular(raw) => {
            let (mut tx, pending) = assemble(raw)?;
            if !pending.is_empty() {
                tx.set_detached_signatures(pending);
            }
            Ok(tx.into())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
