//! # Transaction Module
//!
//! Construction, wire encoding, signing and verification of uPow
//! transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        Amount, input/output/transaction type enums
//! version.rs      Wire version table (address width, message prefix, signed message)
//! input.rs        TxInput: a spent outpoint plus in-memory signing state
//! output.rs       TxOutput: address bytes, amount, output type
//! builder.rs      Transaction and TransactionBuilder, encoding and hash
//! coinbase.rs     CoinbaseTransaction
//! codec.rs        Decoding and signature association, AnyTransaction
//! signing.rs      Key binding, signing, signer resolution and grouping
//! verification.rs Signature and structural checks
//! selection.rs    Two-pass coin selection
//! transfer.rs     Plain value transfers with change
//! resolver.rs     TransactionResolver boundary and an in-memory resolver
//! error.rs        Error taxonomy
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build**: [`TransactionBuilder`] or [`build_transfer`].
//! 2. **Sign**: [`sign_transaction`] with the owners' private keys.
//! 3. **Encode**: [`Transaction::to_hex`] with `full = true`.
//! 4. **Decode**: [`decode`] re-associates signatures with inputs.
//! 5. **Verify**: [`check_signatures`] or [`verify_transaction`].

pub mod builder;
pub mod codec;
pub mod coinbase;
pub mod error;
pub mod input;
pub mod output;
pub mod resolver;
pub mod selection;
pub mod signing;
pub mod transfer;
pub mod types;
pub mod verification;
pub mod version;

pub use builder::{Transaction, TransactionBuilder, TransactionSummary};
pub use codec::{decode, decode_unchecked, encode, AnySummary, AnyTransaction};
pub use coinbase::{CoinbaseSummary, CoinbaseTransaction};
pub use error::{CodecError, ConstructionError, SignatureError, TxError};
pub use input::{TxInput, TxInputSummary};
pub use output::{TxOutput, TxOutputSummary};
pub use resolver::{MemoryResolver, NoResolver, ResolveError, TransactionResolver};
pub use selection::{ensure_funds, select_inputs, select_largest_first, total_amount};
pub use signing::{group_inputs_by_signer, resolve_public_keys, sign_transaction};
pub use transfer::{build_transfer, Recipient};
pub use types::{message_from_str, Amount, InputType, OutputType, TransactionType};
pub use verification::{check_signatures, verify_transaction};
pub use version::{infer_version, WireLayout, WIRE_LAYOUTS};
