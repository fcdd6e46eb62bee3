//! Coin selection.
//!
//! Two greedy passes over the spendable inputs:
//!
//! 1. ascending by amount, the first input that covers the target alone
//!    is the whole selection;
//! 2. otherwise descending by amount, inputs are taken until their sum
//!    reaches the target.
//!
//! Sorts are stable, so equal amounts keep the caller's order. An input of
//! unknown amount counts as zero.

use tracing::debug;

use super::error::TxError;
use super::input::TxInput;
use super::types::Amount;

fn amount_of(input: &TxInput) -> Amount {
    input.amount().unwrap_or(Amount::ZERO)
}

/// Sum of the known amounts of `inputs`, saturating at `u64::MAX`.
pub fn total_amount(inputs: &[TxInput]) -> Amount {
    Amount::from_smallest_units(
        inputs
            .iter()
            .map(|i| amount_of(i).smallest_units())
            .fold(0u64, u64::saturating_add),
    )
}

/// Two-pass selection. See the module docs.
///
/// ```
/// use upow_protocol::transaction::{select_inputs, Amount, TxInput};
///
/// let coins: Vec<TxInput> = [5u64, 3, 8, 2]
///     .iter()
///     .enumerate()
///     .map(|(i, a)| TxInput::new([0u8; 32], i as u8).with_amount(Amount::from_smallest_units(*a)))
///     .collect();
///
/// let picked = select_inputs(&coins, Amount::from_smallest_units(6));
/// assert_eq!(picked.len(), 1);
/// assert_eq!(picked[0].amount(), Some(Amount::from_smallest_units(8)));
/// ```
pub fn select_inputs(available: &[TxInput], target: Amount) -> Vec<TxInput> {
    let mut ascending: Vec<&TxInput> = available.iter().collect();
    ascending.sort_by_key(|i| amount_of(i));
    if let Some(single) = ascending.into_iter().find(|i| amount_of(i) >= target) {
        debug!(target = %target, "single input covers the target");
        return vec![single.clone()];
    }
    select_largest_first(available, target)
}

/// Descending pass only: largest inputs first until the target is met.
/// Returns every input when they do not reach it.
pub fn select_largest_first(available: &[TxInput], target: Amount) -> Vec<TxInput> {
    let mut descending: Vec<&TxInput> = available.iter().collect();
    descending.sort_by_key(|i| std::cmp::Reverse(amount_of(i)));

    let mut selected = Vec::new();
    let mut sum = 0u64;
    for input in descending {
        if sum >= target.smallest_units() {
            break;
        }
        sum = sum.saturating_add(amount_of(input).smallest_units());
        selected.push(input.clone());
    }
    debug!(target = %target, selected = selected.len(), "selected inputs largest first");
    selected
}

/// Fails unless `available` holds at least `required`.
pub fn ensure_funds(available: &[TxInput], required: Amount) -> Result<Amount, TxError> {
    if available.is_empty() {
        return Err(TxError::NoSpendableOutputs);
    }
    let total = total_amount(available);
    if total < required {
        return Err(TxError::InsufficientFunds {
            required,
            available: total,
        });
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coins(amounts: &[u64]) -> Vec<TxInput> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| {
                TxInput::new([0; 32], i as u8).with_amount(Amount::from_smallest_units(*a))
            })
            .collect()
    }

    fn amounts(inputs: &[TxInput]) -> Vec<u64> {
        inputs
            .iter()
            .map(|i| i.amount().unwrap().smallest_units())
            .collect()
    }

    #[test]
    fn single_covering_input_wins() {
        let available = coins(&[5, 3, 8, 2]);
        let picked = select_inputs(&available, Amount::from_smallest_units(6));
        assert_eq!(amounts(&picked), vec![8]);
    }

    #[test]
    fn smallest_covering_input_is_preferred() {
        let available = coins(&[9, 3, 7, 2]);
        let picked = select_inputs(&available, Amount::from_smallest_units(6));
        assert_eq!(amounts(&picked), vec![7]);
    }

    #[test]
    fn falls_back_to_largest_first() {
        let available = coins(&[5, 3, 8, 2]);
        let picked = select_inputs(&available, Amount::from_smallest_units(10));
        assert_eq!(amounts(&picked), vec![8, 5]);
    }

    #[test]
    fn exact_match_counts_as_covering() {
        let available = coins(&[5, 3]);
        let picked = select_inputs(&available, Amount::from_smallest_units(3));
        assert_eq!(amounts(&picked), vec![3]);
    }

    #[test]
    fn ties_keep_caller_order() {
        let available = coins(&[4, 4, 4]);
        let picked = select_largest_first(&available, Amount::from_smallest_units(8));
        let indices: Vec<u8> = picked.iter().map(TxInput::index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn largest_first_returns_everything_when_short() {
        let available = coins(&[1, 2]);
        let picked = select_largest_first(&available, Amount::from_smallest_units(10));
        assert_eq!(amounts(&picked), vec![2, 1]);
    }

    #[test]
    fn unknown_amounts_count_as_zero() {
        let mut available = coins(&[5]);
        available.push(TxInput::new([1; 32], 0));
        assert_eq!(total_amount(&available), Amount::from_smallest_units(5));
    }

    #[test]
    fn ensure_funds_reports_shortfall() {
        assert!(matches!(
            ensure_funds(&[], Amount::from_smallest_units(1)),
            Err(TxError::NoSpendableOutputs)
        ));
        let available = coins(&[1, 2]);
        match ensure_funds(&available, Amount::from_smallest_units(4)) {
            Err(TxError::InsufficientFunds {
                required,
                available,
            }) => {
                assert_eq!(required, Amount::from_smallest_units(4));
                assert_eq!(available, Amount::from_smallest_units(3));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            ensure_funds(&available, Amount::from_smallest_units(3)).unwrap(),
            Amount::from_smallest_units(3)
        );
    }
}
