//! # CLI Interface
//!
//! Defines the command-line argument structure for `upow-tx` using `clap`
//! derive. Every subcommand works offline: previous transactions and
//! spendable outputs are passed on the command line.

use clap::{Parser, Subcommand, ValueEnum};

use upow_protocol::crypto::AddressFormat;
use upow_protocol::transaction::{Amount, Recipient};

use crate::logging::LogFormat;

/// Offline uPow transaction tool.
///
/// Generates keys, derives addresses, builds and signs transfers, and
/// decodes transactions. Never talks to a node.
#[derive(Parser, Debug)]
#[command(
    name = "upow-tx",
    about = "Offline uPow transaction tool",
    version,
    propagate_version = true
)]
pub struct UpowCli {
    /// Default log level when `RUST_LOG` is not set.
    #[arg(long, global = true, env = "UPOW_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Log output format.
    #[arg(
        long,
        global = true,
        env = "UPOW_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormatArg::Pretty
    )]
    pub log_format: LogFormatArg,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh private key and print it with its address.
    Keygen(KeygenArgs),
    /// Print the address of a private key.
    Address(AddressArgs),
    /// Decode a transaction and print it as JSON.
    Decode(DecodeArgs),
    /// Print the hash of an encoded transaction.
    Hash(HashArgs),
    /// Build and sign a transfer from explicitly listed outputs.
    Send(SendArgs),
    /// Print version information and exit.
    Version,
}

/// Address form selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// 64 bytes, hex.
    Full,
    /// 33 bytes, base58.
    Compressed,
}

impl From<FormatArg> for AddressFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Full => AddressFormat::Full,
            FormatArg::Compressed => AddressFormat::Compressed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
pub struct KeygenArgs {
    #[arg(long, value_enum, default_value_t = FormatArg::Compressed)]
    pub format: FormatArg,
}

#[derive(Parser, Debug)]
pub struct AddressArgs {
    /// Hex private key.
    #[arg(long, env = "UPOW_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    #[arg(long, value_enum, default_value_t = FormatArg::Compressed)]
    pub format: FormatArg,
}

#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// Hex encoded transaction.
    pub hex: String,

    /// Skip signer lookup and verification. Signatures that cannot be
    /// assigned without it stay detached.
    #[arg(long)]
    pub no_signature_check: bool,

    /// Hex of a previous transaction the decoded one spends. Repeatable.
    #[arg(long = "prev")]
    pub previous: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct HashArgs {
    /// Hex encoded transaction.
    pub hex: String,
}

#[derive(Parser, Debug)]
pub struct SendArgs {
    /// Hex private key owning the spent outputs.
    #[arg(long, env = "UPOW_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Payee as `ADDRESS:AMOUNT`. Repeatable.
    #[arg(long = "to", required = true, value_parser = parse_recipient)]
    pub recipients: Vec<Recipient>,

    /// Spendable output as `TX_HASH:INDEX:AMOUNT`. Repeatable.
    #[arg(long = "utxo", required = true, value_parser = parse_utxo)]
    pub utxos: Vec<Utxo>,

    /// Change address. Defaults to the sender's own address.
    #[arg(long)]
    pub change: Option<String>,

    /// Form of the default change address.
    #[arg(long, value_enum, default_value_t = FormatArg::Compressed)]
    pub format: FormatArg,

    /// Message, hex when it parses as hex, text otherwise.
    #[arg(long)]
    pub message: Option<String>,
}

/// An output the sender may spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub tx_hash: String,
    pub index: u8,
    pub amount: Amount,
}

/// `ADDRESS:AMOUNT`.
pub fn parse_recipient(s: &str) -> Result<Recipient, String> {
    let (address, amount) = s
        .split_once(':')
        .ok_or_else(|| format!("expected ADDRESS:AMOUNT, got {:?}", s))?;
    let amount: Amount = amount.parse().map_err(|e| format!("{}", e))?;
    Ok(Recipient::new(address, amount))
}

/// `TX_HASH:INDEX:AMOUNT`.
pub fn parse_utxo(s: &str) -> Result<Utxo, String> {
    let mut parts = s.splitn(3, ':');
    let (Some(tx_hash), Some(index), Some(amount)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected TX_HASH:INDEX:AMOUNT, got {:?}", s));
    };
    let index: u8 = index
        .parse()
        .map_err(|_| format!("output index must be 0-255, got {:?}", index))?;
    let amount: Amount = amount.parse().map_err(|e| format!("{}", e))?;
    Ok(Utxo {
        tx_hash: tx_hash.to_string(),
        index,
        amount,
    })
}
