//! Plain value transfers.
//!
//! Select coins, pay the recipients, return the change, sign. Everything
//! else a wallet builds (stakes, votes, registrations) is a policy on top
//! of the same pieces and lives outside this crate.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::builder::Transaction;
use super::error::{ConstructionError, TxError};
use super::input::TxInput;
use super::output::TxOutput;
use super::selection::{ensure_funds, select_inputs, select_largest_first, total_amount};
use super::types::{Amount, OutputType};
use crate::crypto::PrivateKey;

/// One payee of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    pub amount: Amount,
}

impl Recipient {
    pub fn new(address: impl Into<String>, amount: Amount) -> Self {
        Self {
            address: address.into(),
            amount,
        }
    }
}

/// Build and sign a transfer from `available` to `recipients`.
///
/// A single recipient gets the two-pass selection; several recipients use
/// the largest-first pass only. Any excess over the paid total comes back
/// to `change_address` as a regular output after the recipients' outputs.
/// Inputs are signed by whichever of `keys` owns them.
pub fn build_transfer(
    available: &[TxInput],
    recipients: &[Recipient],
    change_address: &str,
    message: Option<Vec<u8>>,
    keys: &[PrivateKey],
) -> Result<Transaction, TxError> {
    if recipients.is_empty() {
        return Err(TxError::NoRecipients);
    }
    let required = Amount::checked_sum(recipients.iter().map(|r| r.amount)).ok_or_else(|| {
        ConstructionError::InvalidAmount {
            amount: "sum of recipient amounts".to_string(),
        }
    })?;
    ensure_funds(available, required)?;

    let selected = match recipients {
        [_] => select_inputs(available, required),
        _ => select_largest_first(available, required),
    };
    let selected_total = total_amount(&selected);

    let mut outputs = recipients
        .iter()
        .map(|r| TxOutput::new(&r.address, r.amount, OutputType::Regular))
        .collect::<Result<Vec<_>, _>>()?;
    let change = selected_total
        .checked_sub(required)
        .unwrap_or(Amount::ZERO);
    if !change.is_zero() {
        outputs.push(TxOutput::new(change_address, change, OutputType::Regular)?);
    }

    let mut tx = Transaction::new(selected, outputs, message, None)?;
    tx.sign(keys)?;

    info!(
        hash = %tx.hash(),
        inputs = tx.inputs().len(),
        recipients = recipients.len(),
        amount = %required,
        change = %change,
        "built transfer"
    );
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::AddressFormat;

    struct Wallet {
        key: PrivateKey,
        address: String,
    }

    fn wallet() -> Wallet {
        let key = PrivateKey::generate();
        let address = key.public_key().to_address(AddressFormat::Compressed);
        Wallet { key, address }
    }

    fn coins(owner: &PrivateKey, amounts: &[&str]) -> Vec<TxInput> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| {
                TxInput::new([i as u8; 32], 0)
                    .with_amount(a.parse().unwrap())
                    .with_public_key(owner.public_key())
            })
            .collect()
    }

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[test]
    fn single_recipient_with_change() {
        let sender = wallet();
        let receiver = wallet();
        let available = coins(&sender.key, &["5", "3", "8", "2"]);

        let tx = build_transfer(
            &available,
            &[Recipient::new(&receiver.address, amount("6"))],
            &sender.address,
            None,
            &[sender.key.clone()],
        )
        .unwrap();

        assert_eq!(tx.inputs().len(), 1);
        assert_eq!(tx.inputs()[0].amount(), Some(amount("8")));
        assert_eq!(tx.outputs().len(), 2);
        assert_eq!(tx.outputs()[0].address(), receiver.address);
        assert_eq!(tx.outputs()[1].address(), sender.address);
        assert_eq!(tx.outputs()[1].amount(), amount("2"));
        assert_eq!(tx.version(), 3);
        assert!(tx.is_signed());
        assert_eq!(tx.fees(), Some(Amount::ZERO));
    }

    #[test]
    fn exact_amount_has_no_change() {
        let sender = wallet();
        let receiver = wallet();
        let available = coins(&sender.key, &["5", "3"]);
        let tx = build_transfer(
            &available,
            &[Recipient::new(&receiver.address, amount("3"))],
            &sender.address,
            Some(b"thanks".to_vec()),
            &[sender.key.clone()],
        )
        .unwrap();
        assert_eq!(tx.outputs().len(), 1);
        assert_eq!(tx.message(), Some(&b"thanks"[..]));
    }

    #[test]
    fn multiple_recipients_take_largest_first() {
        let sender = wallet();
        let a = wallet();
        let b = wallet();
        let available = coins(&sender.key, &["2", "9", "4"]);
        let tx = build_transfer(
            &available,
            &[
                Recipient::new(&a.address, amount("1")),
                Recipient::new(&b.address, amount("1.5")),
            ],
            &sender.address,
            None,
            &[sender.key.clone()],
        )
        .unwrap();
        assert_eq!(tx.inputs().len(), 1);
        assert_eq!(tx.inputs()[0].amount(), Some(amount("9")));
        assert_eq!(tx.outputs()[2].amount(), amount("6.5"));
    }

    #[test]
    fn reports_missing_funds() {
        let sender = wallet();
        let receiver = wallet();
        let recipients = [Recipient::new(&receiver.address, amount("20"))];

        assert!(matches!(
            build_transfer(&[], &recipients, &sender.address, None, &[]),
            Err(TxError::NoSpendableOutputs)
        ));
        let available = coins(&sender.key, &["5", "3"]);
        assert!(matches!(
            build_transfer(&available, &recipients, &sender.address, None, &[]),
            Err(TxError::InsufficientFunds { .. })
        ));
        assert!(matches!(
            build_transfer(&available, &[], &sender.address, None, &[]),
            Err(TxError::NoRecipients)
        ));
    }
}
