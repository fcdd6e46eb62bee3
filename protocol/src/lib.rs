// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # uPow Protocol: Transaction Codec & Signing Engine
//!
//! Builds, encodes, decodes and signs transactions of the uPow UTXO
//! ledger, byte for byte compatible with what the nodes accept.
//!
//! ## Architecture
//!
//! - **config**: Wire constants: units, limits, address specifiers.
//! - **crypto**: P-256 keys and ECDSA, SHA-256, address encoding.
//! - **transaction**: Inputs, outputs, the three wire versions, coinbase,
//!   signature grouping, coin selection and transfers.
//!
//! Everything here is offline. Looking up a previous transaction goes
//! through a caller-supplied [`transaction::TransactionResolver`].
//!
//! ## Conventions
//!
//! 1. Every integer on the wire is little-endian, curve coordinates and
//!    signature scalars included.
//! 2. Amounts are integers of smallest units. No floats near money.
//! 3. Encoding never fails; every invariant is checked at construction.

pub mod config;
pub mod crypto;
pub mod transaction;
