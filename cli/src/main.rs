// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # uPow Transaction Tool
//!
//! Entry point for the `upow-tx` binary. Parses CLI arguments, initializes
//! logging and runs one offline command:
//!
//! - `keygen`: generate a private key and its address
//! - `address`: derive the address of a private key
//! - `decode`: decode a transaction, optionally checking its signatures
//! - `hash`: hash an encoded transaction
//! - `send`: build and sign a transfer from explicit outputs
//! - `version`: print build version information

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::{json, Value};

use upow_protocol::crypto::{AddressFormat, PrivateKey};
use upow_protocol::transaction::{
    build_transfer, check_signatures, decode, decode_unchecked, message_from_str, AnyTransaction,
    MemoryResolver, TxInput,
};

use cli::{Commands, UpowCli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = UpowCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format.into());

    let output = match cli.command {
        Commands::Keygen(args) => keygen(args.format.into()),
        Commands::Address(args) => address(&args.private_key, args.format.into())?,
        Commands::Decode(args) => decode_command(args).await?,
        Commands::Hash(args) => hash(&args.hex)?,
        Commands::Send(args) => send(args)?,
        Commands::Version => version(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn parse_key(private_key: &str) -> Result<PrivateKey> {
    PrivateKey::from_hex(private_key).context("invalid private key")
}

fn keygen(format: AddressFormat) -> Value {
    let key = PrivateKey::generate();
    tracing::info!(%format, "generated private key");
    json!({
        "private_key": key.to_hex(),
        "address": key.public_key().to_address(format),
    })
}

fn address(private_key: &str, format: AddressFormat) -> Result<Value> {
    let key = parse_key(private_key)?;
    Ok(json!({ "address": key.public_key().to_address(format) }))
}

fn hash(hex: &str) -> Result<Value> {
    let tx = decode_unchecked(hex).context("failed to decode transaction")?;
    Ok(json!({ "hash": tx.hash() }))
}

async fn decode_command(args: cli::DecodeArgs) -> Result<Value> {
    let resolver = MemoryResolver::new();
    for previous in &args.previous {
        let tx = decode_unchecked(previous)
            .with_context(|| format!("failed to decode previous transaction {}", previous))?;
        resolver.insert(tx);
    }

    let check = !args.no_signature_check;
    let tx = decode(&args.hex, check, &resolver)
        .await
        .context("failed to decode transaction")?;

    let mut output = serde_json::to_value(tx.summary())?;
    if let (true, AnyTransaction::Regular(regular)) = (check, &tx) {
        let valid = match check_signatures(regular, &resolver).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "signature check failed");
                false
            }
        };
        output["signatures_valid"] = Value::Bool(valid);
    }
    Ok(output)
}

fn send(args: cli::SendArgs) -> Result<Value> {
    let key = parse_key(&args.private_key)?;
    let owner = key.public_key();

    let available = args
        .utxos
        .iter()
        .map(|utxo| {
            TxInput::from_hex_hash(&utxo.tx_hash, utxo.index)
                .map(|input| input.with_amount(utxo.amount).with_public_key(owner.clone()))
                .with_context(|| format!("invalid output reference {}", utxo.tx_hash))
        })
        .collect::<Result<Vec<_>>>()?;

    let change = args
        .change
        .unwrap_or_else(|| owner.to_address(args.format.into()));
    let message = args.message.as_deref().map(message_from_str);

    let tx = build_transfer(&available, &args.recipients, &change, message, &[key])
        .context("failed to build transfer")?;
    if !tx.is_signed() {
        bail!("the private key does not own every selected output");
    }

    Ok(json!({
        "hash": tx.hash(),
        "hex": tx.to_hex(true),
        "transaction": tx.summary(),
    }))
}

fn version() -> Value {
    json!({
        "version": env!("CARGO_PKG_VERSION"),
        "curve": upow_protocol::config::CURVE_NAME,
        "wire_versions": upow_protocol::transaction::WIRE_LAYOUTS
            .iter()
            .map(|layout| layout.version)
            .collect::<Vec<_>>(),
    })
}
