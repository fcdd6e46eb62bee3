//! Transaction verification: structural checks and signature validation.
//!
//! [`verify_transaction`] runs the checks from cheapest to most expensive:
//! outpoint uniqueness, output amounts, then signatures (which may need a
//! resolver round trip per previous transaction).

use std::collections::HashSet;

use tracing::{debug, warn};

use super::builder::Transaction;
use super::error::{SignatureError, TxError};
use super::resolver::TransactionResolver;
use super::signing::resolve_input;
use crate::crypto::{PublicKey, Signature};

/// Check every input's signature against the signable payload.
///
/// Every input must be signed. The signer is the input's known public key,
/// or the owner of the output it spends. A signature is accepted over the
/// raw payload or over the payload's lowercase hex text, which older
/// wallets signed. Identical `(key, signature)` pairs are verified once.
pub async fn check_signatures<R>(tx: &Transaction, resolver: &R) -> Result<(), SignatureError>
where
    R: TransactionResolver + ?Sized,
{
    let payload = tx.signable_bytes();
    let payload_hex = hex::encode(&payload);
    let mut cache = Default::default();
    let mut checked: HashSet<(PublicKey, Signature)> = HashSet::new();

    for (index, input) in tx.inputs().iter().enumerate() {
        let signature = *input
            .signature()
            .ok_or(SignatureError::Unsigned { index })?;
        let (public_key, _) = resolve_input(index, input, resolver, &mut cache).await?;

        let pair = (public_key, signature);
        if checked.contains(&pair) {
            continue;
        }
        let (public_key, signature) = &pair;
        if !public_key.verify(&payload, signature)
            && !public_key.verify(payload_hex.as_bytes(), signature)
        {
            warn!(index, "input signature does not verify");
            return Err(SignatureError::Invalid { index });
        }
        checked.insert(pair);
    }

    debug!(
        inputs = tx.inputs().len(),
        verified = checked.len(),
        "signatures verified"
    );
    Ok(())
}

/// Full verification of a signed transaction: no outpoint spent twice,
/// every output positive, every signature valid.
pub async fn verify_transaction<R>(tx: &Transaction, resolver: &R) -> Result<(), TxError>
where
    R: TransactionResolver + ?Sized,
{
    tx.verify_no_double_spend()?;
    if let Some(index) = tx.outputs().iter().position(|o| !o.verify()) {
        return Err(TxError::InvalidOutput { index });
    }
    check_signatures(tx, resolver).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
