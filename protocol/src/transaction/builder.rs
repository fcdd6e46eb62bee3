//! Regular transactions and their builder.
//!
//! A [`Transaction`] is validated once, when it is built: counts, the
//! version/address-width pairing and the message limit cannot be violated
//! afterwards because every mutator re-checks what it touches. Encoding is
//! therefore infallible.
//!
//! The builder does not sign. That happens in [`super::signing`], so that
//! construction stays testable without key material.

use std::collections::HashSet;
use std::sync::OnceLock;

use serde::Serialize;

use super::error::{ConstructionError, TxError};
use super::input::{TxInput, TxInputSummary};
use super::output::{TxOutput, TxOutputSummary};
use super::types::{Amount, TransactionType};
use super::version::{infer_version, WireLayout};
use crate::config::{MAX_TX_INPUTS, MAX_TX_OUTPUTS};
use crate::crypto::{sha256_hex, Signature};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A regular uPow transaction.
///
/// # Wire format
///
/// ```text
/// version:1 input_count:1 [input]* output_count:1 [output]*
///   message_flag:1 [msg_len:1|2 message]
///   [r:32 s:32]*
/// ```
///
/// The signable payload stops after the outputs, except for versions that
/// sign the message: there a present message follows as
/// `1 ∥ msg_len ∥ message`. See [`WireLayout`].
///
/// The hash is SHA-256 of the full encoding. It is computed lazily and
/// dropped by every mutation, signing included.
#[derive(Debug, Clone)]
pub struct Transaction {
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    message: Option<Vec<u8>>,
    layout: &'static WireLayout,
    transaction_type: TransactionType,
    /// Signatures parsed off the wire that no input claimed.
    detached_signatures: Vec<Signature>,
    hash: OnceLock<String>,
}

impl Transaction {
    /// Validate and assemble a transaction.
    ///
    /// Without an explicit `version` it is inferred from the output
    /// addresses: all full ⇒ 1, all compressed ⇒ 3. An explicit version must
    /// agree with the address width of every output.
    pub fn new(
        inputs: Vec<TxInput>,
        outputs: Vec<TxOutput>,
        message: Option<Vec<u8>>,
        version: Option<u8>,
    ) -> Result<Self, ConstructionError> {
        if inputs.len() > MAX_TX_INPUTS {
            return Err(ConstructionError::TooManyInputs {
                count: inputs.len(),
            });
        }
        if outputs.len() > MAX_TX_OUTPUTS {
            return Err(ConstructionError::TooManyOutputs {
                count: outputs.len(),
            });
        }

        let version = match version {
            Some(v) => v,
            None => infer_version(outputs.iter().map(|o| o.address_bytes().len()))?,
        };
        let layout =
            WireLayout::for_version(version).ok_or(ConstructionError::UnsupportedVersion(version))?;
        for (index, output) in outputs.iter().enumerate() {
            check_address_width(layout, index, output)?;
        }
        if let Some(message) = &message {
            check_message_len(layout, message)?;
        }

        let transaction_type = TransactionType::from_message(message.as_deref());
        Ok(Self {
            inputs,
            outputs,
            message,
            layout,
            transaction_type,
            detached_signatures: Vec::new(),
            hash: OnceLock::new(),
        })
    }

    pub fn builder() -> TransactionBuilder {
        TransactionBuilder::new()
    }

    // -- accessors ----------------------------------------------------------

    pub fn version(&self) -> u8 {
        self.layout.version
    }

    pub fn layout(&self) -> &'static WireLayout {
        self.layout
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    pub fn message(&self) -> Option<&[u8]> {
        self.message.as_deref()
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn detached_signatures(&self) -> &[Signature] {
        &self.detached_signatures
    }

    /// `true` when every input carries a signature.
    pub fn is_signed(&self) -> bool {
        !self.inputs.is_empty() && self.inputs.iter().all(TxInput::is_signed)
    }

    // -- mutators -----------------------------------------------------------

    fn invalidate(&mut self) {
        self.hash = OnceLock::new();
    }

    /// Mutable inputs. The cached hash is dropped up front.
    pub(crate) fn inputs_mut(&mut self) -> &mut [TxInput] {
        self.invalidate();
        &mut self.inputs
    }

    pub fn push_input(&mut self, input: TxInput) -> Result<(), ConstructionError> {
        if self.inputs.len() >= MAX_TX_INPUTS {
            return Err(ConstructionError::TooManyInputs {
                count: self.inputs.len() + 1,
            });
        }
        self.invalidate();
        self.inputs.push(input);
        Ok(())
    }

    pub fn push_output(&mut self, output: TxOutput) -> Result<(), ConstructionError> {
        if self.outputs.len() >= MAX_TX_OUTPUTS {
            return Err(ConstructionError::TooManyOutputs {
                count: self.outputs.len() + 1,
            });
        }
        check_address_width(self.layout, self.outputs.len(), &output)?;
        self.invalidate();
        self.outputs.push(output);
        Ok(())
    }

    /// Replace the message; the transaction type follows it.
    pub fn set_message(&mut self, message: Option<Vec<u8>>) -> Result<(), ConstructionError> {
        if let Some(message) = &message {
            check_message_len(self.layout, message)?;
        }
        self.invalidate();
        self.transaction_type = TransactionType::from_message(message.as_deref());
        self.message = message;
        Ok(())
    }

    pub(crate) fn set_detached_signatures(&mut self, signatures: Vec<Signature>) {
        self.invalidate();
        self.detached_signatures = signatures;
    }

    // -- encoding -----------------------------------------------------------

    /// `version ∥ input_count ∥ inputs ∥ output_count ∥ outputs`.
    fn body_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);
        buf.push(self.layout.version);
        buf.push(self.inputs.len() as u8);
        for input in &self.inputs {
            buf.extend_from_slice(&input.to_bytes());
        }
        buf.push(self.outputs.len() as u8);
        for output in &self.outputs {
            buf.extend_from_slice(&output.to_bytes());
        }
        buf
    }

    /// `1 ∥ msg_len ∥ message`, or nothing without a message.
    fn message_section(&self) -> Vec<u8> {
        match &self.message {
            Some(message) => {
                let mut buf = Vec::with_capacity(3 + message.len());
                buf.push(1);
                buf.extend_from_slice(&self.layout.encode_message_len(message.len()));
                buf.extend_from_slice(message);
                buf
            }
            None => Vec::new(),
        }
    }

    /// The bytes every input signs.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut buf = self.body_bytes();
        if self.layout.signs_message {
            buf.extend_from_slice(&self.message_section());
        }
        buf
    }

    /// Input signatures de-duplicated by value in input order, then the
    /// detached ones as parsed.
    pub fn signature_block(&self) -> Vec<Signature> {
        let mut seen = HashSet::new();
        let mut block: Vec<Signature> = self
            .inputs
            .iter()
            .filter_map(TxInput::signature)
            .filter(|sig| seen.insert(**sig))
            .copied()
            .collect();
        block.extend_from_slice(&self.detached_signatures);
        block
    }

    /// Wire bytes. `full = false` yields [`Transaction::signable_bytes`].
    pub fn to_bytes(&self, full: bool) -> Vec<u8> {
        if !full {
            return self.signable_bytes();
        }
        let mut buf = self.body_bytes();
        match &self.message {
            Some(_) => buf.extend_from_slice(&self.message_section()),
            None => buf.push(0),
        }
        for signature in self.signature_block() {
            buf.extend_from_slice(&signature.to_wire_bytes());
        }
        buf
    }

    pub fn to_hex(&self, full: bool) -> String {
        hex::encode(self.to_bytes(full))
    }

    /// SHA-256 of the full encoding, lowercase hex.
    pub fn hash(&self) -> String {
        self.hash
            .get_or_init(|| sha256_hex(&self.to_bytes(true)))
            .clone()
    }

    // -- checks -------------------------------------------------------------

    /// `sum(inputs) - sum(outputs)`, when every input amount is known and
    /// the outputs do not exceed the inputs.
    pub fn fees(&self) -> Option<Amount> {
        let spent = Amount::checked_sum(
            self.inputs
                .iter()
                .map(TxInput::amount)
                .collect::<Option<Vec<_>>>()?,
        )?;
        let assigned = Amount::checked_sum(self.outputs.iter().map(TxOutput::amount))?;
        spent.checked_sub(assigned)
    }

    /// Fails when two inputs consume the same outpoint.
    pub fn verify_no_double_spend(&self) -> Result<(), TxError> {
        let mut used = HashSet::with_capacity(self.inputs.len());
        for input in &self.inputs {
            if !used.insert(input.outpoint()) {
                return Err(TxError::DoubleSpend {
                    tx_hash: input.tx_hash_hex(),
                    index: input.index(),
                });
            }
        }
        Ok(())
    }

    /// Every output moves a positive amount.
    pub fn verify_outputs(&self) -> bool {
        self.outputs.iter().all(TxOutput::verify)
    }

    pub fn summary(&self) -> TransactionSummary {
        TransactionSummary {
            hash: self.hash(),
            version: self.version(),
            transaction_type: self.transaction_type,
            inputs: self.inputs.iter().map(TxInputSummary::from).collect(),
            outputs: self.outputs.iter().map(TxOutputSummary::from).collect(),
            message: self.message.as_ref().map(hex::encode),
            fees: self.fees(),
            signatures: self.signature_block().len(),
        }
    }
}

/// Transactions are equal when their full encodings are.
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes(true) == other.to_bytes(true)
    }
}

impl Eq for Transaction {}

fn check_address_width(
    layout: &WireLayout,
    index: usize,
    output: &TxOutput,
) -> Result<(), ConstructionError> {
    let actual = output.address_bytes().len();
    if actual != layout.address_len() {
        return Err(ConstructionError::AddressVersionMismatch {
            version: layout.version,
            index,
            expected: layout.address_len(),
            actual,
        });
    }
    Ok(())
}

fn check_message_len(layout: &WireLayout, message: &[u8]) -> Result<(), ConstructionError> {
    if message.len() > layout.max_message_len() {
        return Err(ConstructionError::MessageTooLong {
            version: layout.version,
            len: message.len(),
            max: layout.max_message_len(),
        });
    }
    Ok(())
}

/// JSON view of a transaction.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionSummary {
    pub hash: String,
    pub version: u8,
    pub transaction_type: TransactionType,
    pub inputs: Vec<TxInputSummary>,
    pub outputs: Vec<TxOutputSummary>,
    /// Hex of the raw message bytes.
    pub message: Option<String>,
    pub fees: Option<Amount>,
    pub signatures: usize,
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned transactions.
///
/// ```
/// use upow_protocol::crypto::{AddressFormat, PrivateKey};
/// use upow_protocol::transaction::{OutputType, TransactionBuilder, TxInput, TxOutput};
///
/// let recipient = PrivateKey::generate().public_key();
/// let tx = TransactionBuilder::new()
///     .input(TxInput::new([7u8; 32], 0))
///     .output(TxOutput::from_public_key(
///         &recipient,
///         AddressFormat::Compressed,
///         "1.5".parse().unwrap(),
///         OutputType::Regular,
///     ))
///     .build()
///     .unwrap();
///
/// assert_eq!(tx.version(), 3);
/// assert!(!tx.is_signed());
/// ```
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    message: Option<Vec<u8>>,
    version: Option<u8>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, input: TxInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn inputs(mut self, inputs: impl IntoIterator<Item = TxInput>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    pub fn output(mut self, output: TxOutput) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn outputs(mut self, outputs: impl IntoIterator<Item = TxOutput>) -> Self {
        self.outputs.extend(outputs);
        self
    }

    pub fn message(mut self, message: impl Into<Vec<u8>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Tag the transaction with `transaction_type` through its message.
    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.message = Some(transaction_type.to_message());
        self
    }

    /// Force a wire version instead of inferring it.
    pub fn version(mut self, version: u8) -> Self {
        self.version = Some(version);
        self
    }

    pub fn build(self) -> Result<Transaction, ConstructionError> {
        Transaction::new(self.inputs, self.outputs, self.message, self.version)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
