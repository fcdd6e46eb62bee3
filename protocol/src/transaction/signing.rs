//! Transaction signing and signer resolution.
//!
//! Every signing input signs the same bytes, [`Transaction::signable_bytes`].
//! Inputs owned by one key therefore carry identical signatures, and the
//! encoder stores each distinct signature once.
//!
//! Signing is a separate step from building because the keys may not be
//! available at construction time. Resolution of the public key behind an
//! input is async because it may need the previous transaction.

use std::collections::HashMap;

use tracing::debug;

use super::builder::Transaction;
use super::codec::AnyTransaction;
use super::error::{SignatureError, TxError};
use super::input::TxInput;
use super::resolver::TransactionResolver;
use super::types::Amount;
use crate::crypto::{PrivateKey, PublicKey};

/// Signs a transaction in place.
///
/// 1. Reject a transaction that spends one outpoint twice.
/// 2. Bind keys: an input without a signing key but with a known public key
///    takes the first of `private_keys` whose public key matches.
/// 3. Every input with a signing key signs the signable payload.
///
/// Inputs without a matching key stay as they are. The hash cache is
/// dropped.
///
/// ```
/// use upow_protocol::crypto::{AddressFormat, PrivateKey};
/// use upow_protocol::transaction::{sign_transaction, OutputType, Transaction, TxInput, TxOutput};
///
/// let key = PrivateKey::generate();
/// let mut tx = Transaction::builder()
///     .input(TxInput::new([1u8; 32], 0).with_public_key(key.public_key()))
///     .output(TxOutput::from_public_key(
///         &key.public_key(),
///         AddressFormat::Compressed,
///         "1".parse().unwrap(),
///         OutputType::Regular,
///     ))
///     .build()
///     .unwrap();
///
/// sign_transaction(&mut tx, &[key]).unwrap();
/// assert!(tx.is_signed());
/// ```
pub fn sign_transaction<'a>(
    tx: &'a mut Transaction,
    private_keys: &[PrivateKey],
) -> Result<&'a mut Transaction, TxError> {
    tx.verify_no_double_spend()?;

    let candidates: Vec<(PublicKey, &PrivateKey)> =
        private_keys.iter().map(|k| (k.public_key(), k)).collect();
    let payload = tx.signable_bytes();

    let mut signed = 0usize;
    for input in tx.inputs_mut() {
        if input.signing_key().is_none() {
            let matching = input.public_key().and_then(|pk| {
                candidates
                    .iter()
                    .find(|(candidate, _)| candidate == pk)
                    .map(|(_, key)| (*key).clone())
            });
            if let Some(key) = matching {
                input.bind_signing_key(key);
            }
        }
        let signature = input.signing_key().map(|key| key.sign(&payload));
        if let Some(signature) = signature {
            input.set_signature(Some(signature));
            signed += 1;
        }
    }
    if signed > 0 && !tx.detached_signatures().is_empty() {
        tx.set_detached_signatures(Vec::new());
    }

    debug!(
        inputs = tx.inputs().len(),
        signed,
        distinct = tx.signature_block().len(),
        "signed transaction"
    );
    Ok(tx)
}

impl Transaction {
    /// See [`sign_transaction`].
    pub fn sign(&mut self, private_keys: &[PrivateKey]) -> Result<&mut Self, TxError> {
        sign_transaction(self, private_keys)
    }
}

/// Previous transactions fetched during one resolution pass.
type LookupCache = HashMap<String, AnyTransaction>;

/// Public key and amount of the output `input` spends.
///
/// A key already known to the input wins; otherwise the previous
/// transaction is looked up through `resolver` (once per hash per pass).
pub(crate) async fn resolve_input<R>(
    index: usize,
    input: &TxInput,
    resolver: &R,
    cache: &mut LookupCache,
) -> Result<(PublicKey, Option<Amount>), SignatureError>
where
    R: TransactionResolver + ?Sized,
{
    if let Some(public_key) = input.public_key() {
        return Ok((public_key.clone(), input.amount()));
    }

    let tx_hash = input.tx_hash_hex();
    if !cache.contains_key(&tx_hash) {
        let previous = resolver
            .resolve_previous_transaction(&tx_hash)
            .await
            .map_err(|source| SignatureError::UnresolvedPublicKey { index, source })?;
        cache.insert(tx_hash.clone(), previous);
    }
    let output = cache
        .get(&tx_hash)
        .and_then(|previous| previous.outputs().get(input.index() as usize))
        .ok_or_else(|| SignatureError::MissingOutput {
            index,
            tx_hash: tx_hash.clone(),
            output_index: input.index(),
        })?;
    Ok((output.public_key().clone(), Some(output.amount())))
}

/// Fill in the public key, and the amount when unknown, of every input
/// whose owner is not yet known.
pub async fn resolve_public_keys<R>(
    tx: &mut Transaction,
    resolver: &R,
) -> Result<(), SignatureError>
where
    R: TransactionResolver + ?Sized,
{
    let mut cache = LookupCache::new();
    let mut resolved = Vec::new();
    for (index, input) in tx.inputs().iter().enumerate() {
        if input.public_key().is_some() {
            continue;
        }
        let (public_key, amount) = resolve_input(index, input, resolver, &mut cache).await?;
        resolved.push((index, public_key, amount));
    }
    if resolved.is_empty() {
        return Ok(());
    }

    let lookups = resolved.len();
    let inputs = tx.inputs_mut();
    for (index, public_key, amount) in resolved {
        inputs[index].set_public_key(public_key);
        if let (None, Some(amount)) = (inputs[index].amount(), amount) {
            inputs[index].set_amount(amount);
        }
    }
    debug!(resolved = lookups, "resolved input public keys");
    Ok(())
}

/// Input indices grouped by signer, groups in order of first appearance.
pub async fn group_inputs_by_signer<R>(
    tx: &mut Transaction,
    resolver: &R,
) -> Result<Vec<Vec<usize>>, SignatureError>
where
    R: TransactionResolver + ?Sized,
{
    resolve_public_keys(tx, resolver).await?;

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut slot: HashMap<PublicKey, usize> = HashMap::new();
    for (index, input) in tx.inputs().iter().enumerate() {
        // Every key was resolved above.
        let Some(public_key) = input.public_key() else {
            continue;
        };
        match slot.get(public_key) {
            Some(&group) => groups[group].push(index),
            None => {
                slot.insert(public_key.clone(), groups.len());
                groups.push(vec![index]);
            }
        }
    }
    Ok(groups)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
