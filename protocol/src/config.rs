//! # Protocol Configuration & Constants
//!
//! Every magic number of the uPow wire format lives here. The node decodes
//! what we encode byte for byte, so none of these values are tunable: they
//! describe the ledger, they do not configure it.

use chrono::Utc;

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// Number of smallest units in one coin. Amounts on the wire are integers
/// in this unit.
pub const SMALLEST_UNITS_PER_COIN: u64 = 100_000_000;

/// Fractional digits of the display currency.
pub const AMOUNT_DECIMALS: u32 = 8;

/// Total coin supply, in whole coins.
pub const MAX_SUPPLY: u64 = 18_884_643;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Curve backing every address and signature on the ledger.
pub const CURVE_NAME: &str = "P-256";

/// Length of one point coordinate and of one signature scalar.
pub const COORDINATE_LENGTH: usize = 32;

/// `r ∥ s`, both little-endian.
pub const SIGNATURE_LENGTH: usize = 64;

/// SHA-256 output, also the width of a transaction hash reference.
pub const HASH_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Raw length of a full address: X ∥ Y.
pub const FULL_ADDRESS_LENGTH: usize = 64;

/// Raw length of a compressed address: parity specifier ∥ X.
pub const COMPRESSED_ADDRESS_LENGTH: usize = 33;

/// Parity specifier of a compressed address whose Y coordinate is even.
pub const EVEN_Y_SPECIFIER: u8 = 42;

/// Parity specifier of a compressed address whose Y coordinate is odd.
pub const ODD_Y_SPECIFIER: u8 = 43;

// ---------------------------------------------------------------------------
// Transaction Limits
// ---------------------------------------------------------------------------

/// Input and output counts are a single byte on the wire.
pub const MAX_TX_INPUTS: usize = 255;

/// See [`MAX_TX_INPUTS`].
pub const MAX_TX_OUTPUTS: usize = 255;

/// Oldest wire version still decodable.
pub const MIN_TX_VERSION: u8 = 1;

/// Newest wire version. Anything above is rejected by the decoder.
pub const MAX_TX_VERSION: u8 = 3;

/// Byte that follows the outputs of a coinbase payload. Regular
/// transactions have a message flag (0 or 1) in that position.
pub const COINBASE_TERMINATOR: u8 = 36;

/// Input-count slot of a coinbase payload; a coinbase always spends its
/// block hash as exactly one pseudo input.
pub const COINBASE_INPUT_MARKER: u8 = 1;

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Current unix time in seconds.
///
/// The codec never reads the clock. Layers that build time-bound
/// transactions (votes, registrations) get it from here.
pub fn current_time() -> i64 {
    Utc::now().timestamp()
}
