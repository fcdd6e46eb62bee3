//! Coinbase transactions: block rewards.

use std::sync::OnceLock;

use serde::Serialize;

use super::error::ConstructionError;
use super::output::{TxOutput, TxOutputSummary};
use super::types::{Amount, InputType, OutputType};
use super::version::WireLayout;
use crate::config::{COINBASE_INPUT_MARKER, COINBASE_TERMINATOR, HASH_LENGTH, MAX_TX_OUTPUTS};
use crate::crypto::{sha256_hex, AddressFormat};

/// The reward transaction of a block.
///
/// ```text
/// version:1 01 block_hash:32 00 00 output_count:1 [output]* 24
/// ```
///
/// The block hash sits where a regular transaction's single input would,
/// and the `0x24` (36) terminator sits where the message flag would. A
/// coinbase carries neither a message nor signatures.
#[derive(Debug, Clone)]
pub struct CoinbaseTransaction {
    block_hash: [u8; HASH_LENGTH],
    outputs: Vec<TxOutput>,
    version: u8,
    hash: OnceLock<String>,
}

impl CoinbaseTransaction {
    /// Reward of `amount` to `address` for the block `block_hash`.
    pub fn new(
        block_hash: [u8; HASH_LENGTH],
        address: &str,
        amount: Amount,
    ) -> Result<Self, ConstructionError> {
        let output = TxOutput::new(address, amount, OutputType::Regular)?;
        Self::with_outputs(block_hash, vec![output])
    }

    /// Coinbase over several outputs, all in the same address form.
    /// The version is 1 for full addresses and 2 for compressed ones.
    pub fn with_outputs(
        block_hash: [u8; HASH_LENGTH],
        outputs: Vec<TxOutput>,
    ) -> Result<Self, ConstructionError> {
        let first = outputs.first().ok_or(ConstructionError::EmptyCoinbase)?;
        let format = first.address_format();
        if outputs.iter().any(|o| o.address_format() != format) {
            return Err(ConstructionError::MixedAddressFormats);
        }
        let version = match format {
            AddressFormat::Full => 1,
            AddressFormat::Compressed => 2,
        };
        Self::from_parts(block_hash, outputs, version)
    }

    /// Coinbase with the version it was decoded with. Outputs must match
    /// that version's address width.
    pub(crate) fn from_parts(
        block_hash: [u8; HASH_LENGTH],
        outputs: Vec<TxOutput>,
        version: u8,
    ) -> Result<Self, ConstructionError> {
        if outputs.is_empty() {
            return Err(ConstructionError::EmptyCoinbase);
        }
        if outputs.len() > MAX_TX_OUTPUTS {
            return Err(ConstructionError::TooManyOutputs {
                count: outputs.len(),
            });
        }
        let layout =
            WireLayout::for_version(version).ok_or(ConstructionError::UnsupportedVersion(version))?;
        for (index, output) in outputs.iter().enumerate() {
            let actual = output.address_bytes().len();
            if actual != layout.address_len() {
                return Err(ConstructionError::AddressVersionMismatch {
                    version,
                    index,
                    expected: layout.address_len(),
                    actual,
                });
            }
        }
        Ok(Self {
            block_hash,
            outputs,
            version,
            hash: OnceLock::new(),
        })
    }

    pub fn block_hash(&self) -> &[u8; HASH_LENGTH] {
        &self.block_hash
    }

    pub fn block_hash_hex(&self) -> String {
        hex::encode(self.block_hash)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    /// Address of the first output, the block reward's recipient.
    pub fn address(&self) -> String {
        self.outputs[0].address()
    }

    /// Total minted by this coinbase.
    pub fn amount(&self) -> Option<Amount> {
        Amount::checked_sum(self.outputs.iter().map(TxOutput::amount))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64 + self.outputs.len() * 80);
        buf.push(self.version);
        buf.push(COINBASE_INPUT_MARKER);
        buf.extend_from_slice(&self.block_hash);
        buf.push(0);
        buf.push(InputType::Regular.as_u8());
        buf.push(self.outputs.len() as u8);
        for output in &self.outputs {
            buf.extend_from_slice(&output.to_bytes());
        }
        buf.push(COINBASE_TERMINATOR);
        buf
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn hash(&self) -> String {
        self.hash.get_or_init(|| sha256_hex(&self.to_bytes())).clone()
    }

    pub fn summary(&self) -> CoinbaseSummary {
        CoinbaseSummary {
            hash: self.hash(),
            version: self.version,
            block_hash: self.block_hash_hex(),
            outputs: self.outputs.iter().map(TxOutputSummary::from).collect(),
        }
    }
}

impl PartialEq for CoinbaseTransaction {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for CoinbaseTransaction {}

/// JSON view of a coinbase transaction.
#[derive(Debug, Clone, Serialize)]
pub struct CoinbaseSummary {
    pub hash: String,
    pub version: u8,
    pub block_hash: String,
    pub outputs: Vec<TxOutputSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PrivateKey;

    fn reward(format: AddressFormat) -> CoinbaseTransaction {
        let address = PrivateKey::generate().public_key().to_address(format);
        CoinbaseTransaction::new([0x11; 32], &address, "6".parse().unwrap()).unwrap()
    }

    #[test]
    fn version_follows_address_form() {
        assert_eq!(reward(AddressFormat::Full).version(), 1);
        assert_eq!(reward(AddressFormat::Compressed).version(), 2);
    }

    #[test]
    fn layout() {
        let coinbase = reward(AddressFormat::Compressed);
        let bytes = coinbase.to_bytes();
        assert_eq!(&bytes[..2], &[2, 1]);
        assert_eq!(&bytes[2..34], &[0x11; 32]);
        assert_eq!(&bytes[34..37], &[0, 0, 1]);
        assert_eq!(&bytes[37..bytes.len() - 1], &coinbase.outputs()[0].to_bytes()[..]);
        assert_eq!(*bytes.last().unwrap(), 36);
    }

    #[test]
    fn hash_is_sha256_of_encoding() {
        let coinbase = reward(AddressFormat::Full);
        assert_eq!(coinbase.hash(), sha256_hex(&coinbase.to_bytes()));
        assert_eq!(coinbase.amount(), Some("6".parse().unwrap()));
    }

    #[test]
    fn rejects_empty_and_mixed() {
        assert_eq!(
            CoinbaseTransaction::with_outputs([0; 32], vec![]).unwrap_err(),
            ConstructionError::EmptyCoinbase
        );
        let pk = PrivateKey::generate().public_key();
        let outputs = [AddressFormat::Full, AddressFormat::Compressed]
            .into_iter()
            .map(|format| TxOutput::from_public_key(&pk, format, Amount::ZERO, OutputType::Regular))
            .collect();
        assert_eq!(
            CoinbaseTransaction::with_outputs([0; 32], outputs).unwrap_err(),
            ConstructionError::MixedAddressFormats
        );
    }
}
