//! Core type definitions for uPow transactions.
//!
//! Amounts, the input/output discriminators, and the transaction type
//! that rides in the message field. All of them are small `Copy` values.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::error::ConstructionError;
use crate::config::{AMOUNT_DECIMALS, SMALLEST_UNITS_PER_COIN};

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// A coin amount, stored as an integer count of smallest units (10⁻⁸).
///
/// Parsed from and displayed as a decimal string. A decimal that does not
/// land on a whole smallest unit is rejected rather than rounded.
///
/// ```
/// use upow_protocol::transaction::Amount;
///
/// let amount: Amount = "1.5".parse().unwrap();
/// assert_eq!(amount.smallest_units(), 150_000_000);
/// assert!("0.123456785".parse::<Amount>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_smallest_units(units: u64) -> Self {
        Self(units)
    }

    pub const fn smallest_units(self) -> u64 {
        self.0
    }

    /// Whole coins. Fails on overflow.
    pub fn from_coins(coins: u64) -> Result<Self, ConstructionError> {
        coins
            .checked_mul(SMALLEST_UNITS_PER_COIN)
            .map(Self)
            .ok_or_else(|| ConstructionError::InvalidAmount {
                amount: coins.to_string(),
            })
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Sum of `amounts`, `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Amount>>(amounts: I) -> Option<Amount> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |acc, a| acc.checked_add(a))
    }

    /// `count:1 ∥ value:count` with the value little-endian in the fewest
    /// bytes that hold it (at least one).
    pub fn to_minimal_bytes(self) -> Vec<u8> {
        let bits = u64::BITS - self.0.leading_zeros();
        let count = ((bits + 7) / 8).max(1) as usize;
        let mut out = Vec::with_capacity(1 + count);
        out.push(count as u8);
        out.extend_from_slice(&self.0.to_le_bytes()[..count]);
        out
    }

    /// Inverse of [`Amount::to_minimal_bytes`] for the value bytes only.
    ///
    /// Accepts any width as long as the value fits in 64 bits; zero
    /// padding beyond eight bytes is tolerated. `None` on overflow.
    pub fn from_minimal_bytes(raw: &[u8]) -> Option<Self> {
        let (low, high) = raw.split_at(raw.len().min(8));
        if high.iter().any(|b| *b != 0) {
            return None;
        }
        let mut buf = [0u8; 8];
        buf[..low.len()].copy_from_slice(low);
        Some(Self(u64::from_le_bytes(buf)))
    }

    /// Parse for display purposes: an exact decimal is kept as is, anything
    /// finer than the smallest unit is quantized to 8 digits, ties to even.
    ///
    /// Wire values must come from [`Amount::from_str`], which refuses to
    /// round.
    pub fn round_for_display(input: &str) -> Result<Self, ConstructionError> {
        let (whole, frac) = split_decimal(input)?;
        let significant = frac.trim_end_matches('0');
        if significant.len() <= AMOUNT_DECIMALS as usize {
            return combine(input, whole, significant);
        }

        let digits = AMOUNT_DECIMALS as usize;
        let base = combine(input, whole, &frac[..digits])?;
        let next = frac.as_bytes()[digits];
        let rest_nonzero = frac.as_bytes()[digits + 1..].iter().any(|b| *b != b'0');
        let round_up = match next {
            b'6'..=b'9' => true,
            b'5' => rest_nonzero || base.0 % 2 == 1,
            _ => false,
        };
        if !round_up {
            return Ok(base);
        }
        base.checked_add(Amount(1))
            .ok_or_else(|| ConstructionError::InvalidAmount {
                amount: input.to_string(),
            })
    }
}

/// Splits `"12.345"` into `("12", "345")` after checking that only ASCII
/// digits and at most one dot are present.
fn split_decimal(input: &str) -> Result<(&str, &str), ConstructionError> {
    let trimmed = input.trim();
    let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !digits_only(whole) || !digits_only(frac) {
        return Err(ConstructionError::InvalidAmount {
            amount: input.to_string(),
        });
    }
    Ok((whole, frac))
}

/// `whole * 10^8 + frac` where `frac` has at most 8 digits.
fn combine(input: &str, whole: &str, frac: &str) -> Result<Amount, ConstructionError> {
    let invalid = || ConstructionError::InvalidAmount {
        amount: input.to_string(),
    };
    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac: u64 = format!("{:0<width$}", frac, width = AMOUNT_DECIMALS as usize)
        .parse()
        .map_err(|_| invalid())?;
    whole
        .checked_mul(SMALLEST_UNITS_PER_COIN)
        .and_then(|units| units.checked_add(frac))
        .map(Amount)
        .ok_or_else(invalid)
}

impl FromStr for Amount {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (whole, frac) = split_decimal(s)?;
        let significant = frac.trim_end_matches('0');
        if significant.len() > AMOUNT_DECIMALS as usize {
            return Err(ConstructionError::InexactAmount {
                amount: s.to_string(),
            });
        }
        combine(s, whole, significant)
    }
}

impl fmt::Display for Amount {
    /// Shortest exact decimal: `1.5`, `10`, `0.00000001`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / SMALLEST_UNITS_PER_COIN;
        let frac = self.0 % SMALLEST_UNITS_PER_COIN;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let frac = format!("{:0>width$}", frac, width = AMOUNT_DECIMALS as usize);
        write!(f, "{}.{}", whole, frac.trim_end_matches('0'))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// InputType
// ---------------------------------------------------------------------------

/// What an input spends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum InputType {
    /// A regular unspent output.
    #[default]
    Regular = 0,
    /// Collected fees.
    Fees = 1,
}

impl InputType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Regular),
            1 => Some(Self::Fees),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

// ---------------------------------------------------------------------------
// OutputType
// ---------------------------------------------------------------------------

/// What an output is for. The gap at 4 is intentional: it matches the
/// transaction type numbering, where 4 is inode de-registration, which
/// creates no output of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum OutputType {
    #[default]
    Regular = 0,
    Stake = 1,
    UnStake = 2,
    InodeRegistration = 3,
    ValidatorRegistration = 5,
    VoteAsValidator = 6,
    VoteAsDelegate = 7,
    ValidatorVotingPower = 8,
    DelegateVotingPower = 9,
}

impl OutputType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Regular),
            1 => Some(Self::Stake),
            2 => Some(Self::UnStake),
            3 => Some(Self::InodeRegistration),
            5 => Some(Self::ValidatorRegistration),
            6 => Some(Self::VoteAsValidator),
            7 => Some(Self::VoteAsDelegate),
            8 => Some(Self::ValidatorVotingPower),
            9 => Some(Self::DelegateVotingPower),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// The business meaning of a transaction.
///
/// It is not a wire field. By convention the message carries the decimal
/// discriminator, and anything else means a regular transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum TransactionType {
    #[default]
    Regular = 0,
    Stake = 1,
    UnStake = 2,
    InodeRegistration = 3,
    InodeDeRegistration = 4,
    ValidatorRegistration = 5,
    VoteAsValidator = 6,
    VoteAsDelegate = 7,
    RevokeAsValidator = 8,
    RevokeAsDelegate = 9,
}

impl TransactionType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Regular),
            1 => Some(Self::Stake),
            2 => Some(Self::UnStake),
            3 => Some(Self::InodeRegistration),
            4 => Some(Self::InodeDeRegistration),
            5 => Some(Self::ValidatorRegistration),
            6 => Some(Self::VoteAsValidator),
            7 => Some(Self::VoteAsDelegate),
            8 => Some(Self::RevokeAsValidator),
            9 => Some(Self::RevokeAsDelegate),
            _ => None,
        }
    }

    /// Read the type out of a message. Non-UTF-8, non-numeric, unknown and
    /// absent messages all fall back to [`TransactionType::Regular`].
    pub fn from_message(message: Option<&[u8]>) -> Self {
        message
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .and_then(|text| text.trim().parse::<i64>().ok())
            .and_then(|value| u8::try_from(value).ok())
            .and_then(Self::from_u8)
            .unwrap_or_default()
    }

    /// The message that tags a transaction with this type.
    pub fn to_message(self) -> Vec<u8> {
        (self as u8).to_string().into_bytes()
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Regular => "REGULAR",
            Self::Stake => "STAKE",
            Self::UnStake => "UN_STAKE",
            Self::InodeRegistration => "INODE_REGISTRATION",
            Self::InodeDeRegistration => "INODE_DE_REGISTRATION",
            Self::ValidatorRegistration => "VALIDATOR_REGISTRATION",
            Self::VoteAsValidator => "VOTE_AS_VALIDATOR",
            Self::VoteAsDelegate => "VOTE_AS_DELEGATE",
            Self::RevokeAsValidator => "REVOKE_AS_VALIDATOR",
            Self::RevokeAsDelegate => "REVOKE_AS_DELEGATE",
        };
        f.write_str(name)
    }
}

/// Bytes of a user-supplied message: hex when it parses as hex, UTF-8
/// otherwise.
pub fn message_from_str(message: &str) -> Vec<u8> {
    hex::decode(message).unwrap_or_else(|_| message.as_bytes().to_vec())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[test]
    fn amount_exactness() {
        assert_eq!(amount("0.12345678").smallest_units(), 12_345_678);
        assert_eq!(
            "0.123456785".parse::<Amount>().unwrap_err(),
            ConstructionError::InexactAmount {
                amount: "0.123456785".to_string()
            }
        );
        // Trailing zeros are not extra precision.
        assert_eq!(amount("0.1234567800").smallest_units(), 12_345_678);
    }

    #[test]
    fn amount_parse_forms() {
        assert_eq!(amount("10").smallest_units(), 1_000_000_000);
        assert_eq!(amount("10.").smallest_units(), 1_000_000_000);
        assert_eq!(amount(".5").smallest_units(), 50_000_000);
        assert_eq!(amount(" 2.25 ").smallest_units(), 225_000_000);
    }

    #[test]
    fn amount_rejects_garbage() {
        for bad in ["", ".", "-1", "+1", "1e8", "1.2.3", "abc", "99999999999999999999"] {
            assert!(bad.parse::<Amount>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn amount_display() {
        assert_eq!(amount("1.5").to_string(), "1.5");
        assert_eq!(amount("10").to_string(), "10");
        assert_eq!(Amount::from_smallest_units(1).to_string(), "0.00000001");
        assert_eq!(Amount::ZERO.to_string(), "0");
    }

    #[test]
    fn minimal_bytes_width() {
        assert_eq!(Amount::ZERO.to_minimal_bytes(), vec![1, 0]);
        assert_eq!(Amount::from_smallest_units(255).to_minimal_bytes(), vec![1, 255]);
        assert_eq!(Amount::from_smallest_units(256).to_minimal_bytes(), vec![2, 0, 1]);
        // 1 coin = 0x05F5E100
        assert_eq!(
            amount("1").to_minimal_bytes(),
            vec![4, 0x00, 0xE1, 0xF5, 0x05]
        );
        assert_eq!(
            Amount::from_smallest_units(u64::MAX).to_minimal_bytes().len(),
            9
        );
    }

    #[test]
    fn minimal_bytes_decoding() {
        assert_eq!(
            Amount::from_minimal_bytes(&[0x00, 0xE1, 0xF5, 0x05]),
            Some(amount("1"))
        );
        assert_eq!(Amount::from_minimal_bytes(&[]), Some(Amount::ZERO));
        assert_eq!(
            Amount::from_minimal_bytes(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
            Some(Amount::from_smallest_units(1))
        );
        assert_eq!(Amount::from_minimal_bytes(&[0, 0, 0, 0, 0, 0, 0, 0, 1]), None);
    }

    #[test]
    fn round_for_display_keeps_exact_values() {
        assert_eq!(Amount::round_for_display("1.25").unwrap(), amount("1.25"));
    }

    #[test]
    fn round_for_display_quantizes_half_even() {
        assert_eq!(
            Amount::round_for_display("0.123456785").unwrap(),
            amount("0.12345678")
        );
        assert_eq!(
            Amount::round_for_display("0.123456775").unwrap(),
            amount("0.12345678")
        );
        assert_eq!(
            Amount::round_for_display("0.1234567851").unwrap(),
            amount("0.12345679")
        );
        assert_eq!(
            Amount::round_for_display("0.123456784").unwrap(),
            amount("0.12345678")
        );
        assert_eq!(
            Amount::round_for_display("0.999999999").unwrap(),
            amount("1")
        );
    }

    #[test]
    fn amount_checked_arithmetic() {
        let total = Amount::checked_sum([amount("1"), amount("2.5")]).unwrap();
        assert_eq!(total, amount("3.5"));
        assert!(Amount::ZERO.checked_sub(amount("1")).is_none());
        let max = Amount::from_smallest_units(u64::MAX);
        assert!(Amount::checked_sum([max, amount("1")]).is_none());
    }

    #[test]
    fn amount_serde_as_decimal_string() {
        let json = serde_json::to_string(&amount("1.5")).unwrap();
        assert_eq!(json, "\"1.5\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount("1.5"));
    }

    #[test]
    fn output_type_discriminators() {
        assert_eq!(OutputType::from_u8(4), None);
        assert_eq!(OutputType::from_u8(9), Some(OutputType::DelegateVotingPower));
        for v in [0u8, 1, 2, 3, 5, 6, 7, 8, 9] {
            assert_eq!(OutputType::from_u8(v).unwrap().as_u8(), v);
        }
    }

    #[test]
    fn input_type_discriminators() {
        assert_eq!(InputType::from_u8(0), Some(InputType::Regular));
        assert_eq!(InputType::from_u8(1), Some(InputType::Fees));
        assert_eq!(InputType::from_u8(2), None);
    }

    #[test]
    fn transaction_type_from_message() {
        assert_eq!(TransactionType::from_message(None), TransactionType::Regular);
        assert_eq!(
            TransactionType::from_message(Some(b"1")),
            TransactionType::Stake
        );
        assert_eq!(
            TransactionType::from_message(Some(b" 07 ")),
            TransactionType::VoteAsDelegate
        );
        assert_eq!(
            TransactionType::from_message(Some(b"hello")),
            TransactionType::Regular
        );
        assert_eq!(
            TransactionType::from_message(Some(b"42")),
            TransactionType::Regular
        );
        assert_eq!(
            TransactionType::from_message(Some(b"-1")),
            TransactionType::Regular
        );
        assert_eq!(
            TransactionType::from_message(Some(&[0xff, 0xfe])),
            TransactionType::Regular
        );
    }

    #[test]
    fn transaction_type_message_roundtrip() {
        for v in 0u8..10 {
            let ty = TransactionType::from_u8(v).unwrap();
            assert_eq!(TransactionType::from_message(Some(&ty.to_message())), ty);
        }
    }

    #[test]
    fn message_from_str_prefers_hex() {
        assert_eq!(message_from_str("cafe"), vec![0xca, 0xfe]);
        assert_eq!(message_from_str("hello"), b"hello".to_vec());
    }
}
