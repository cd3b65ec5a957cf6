//! sigbox-cli: build, sign and verify payment transactions.
//!
//! Reads payment requests and spendable boxes from JSON files, proves the
//! inputs with keys derived from 32-byte entropy, and prints the signed
//! transaction as JSON.

mod config;
mod files;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::info;

use sigbox_core::constants::NetworkType;
use sigbox_core::crypto::PrivateInput;
use sigbox_core::traits::BoxSource;
use sigbox_core::types::SignedTransaction;
use sigbox_wallet::{Prover, TransactionBuilder, TxParams, WalletError, encoder, mnemonic, verify_transaction};

use crate::config::Config;

/// Sigbox payment transaction tool.
#[derive(Parser)]
#[command(name = "sigbox-cli")]
#[command(version, about = "Build and prove pay-to-public-key payment transactions.")]
struct Cli {
    /// Network (mainnet or testnet). Overrides SIGBOX_NETWORK.
    #[arg(long, global = true)]
    network: Option<NetworkType>,

    /// Minimum accepted fee in nano-units. Overrides SIGBOX_MIN_FEE.
    #[arg(long, global = true)]
    min_fee: Option<u64>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log format (text or json).
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive a master key and print its mnemonic, public key and address.
    Keygen(KeygenArgs),
    /// Build and sign one payment with a single key.
    Pay(PayArgs),
    /// Build and sign a list of payments with a single key.
    PayBatch(PayBatchArgs),
    /// Build one payment and sign each input with its own key.
    PayMulti(PayMultiArgs),
    /// Verify a signed transaction against the boxes it spends.
    Verify(VerifyArgs),
}

#[derive(Args)]
struct KeygenArgs {
    /// Hex-encoded 32-byte entropy. Random if omitted.
    #[arg(long, conflicts_with = "mnemonic")]
    entropy: Option<String>,

    /// Restore entropy from a 24-word mnemonic.
    #[arg(long)]
    mnemonic: Option<String>,

    /// Derivation path of the key to show (e.g. m/44'/429'/0'/0/0).
    #[arg(long)]
    path: Option<String>,
}

#[derive(Args)]
struct SigningKeyArgs {
    /// Hex-encoded 32-byte entropy of the signing master key.
    #[arg(long)]
    entropy: String,

    /// Derivation path of the signing key. Master key if omitted.
    #[arg(long)]
    path: Option<String>,
}

#[derive(Args)]
struct PayArgs {
    /// Payment request JSON file.
    #[arg(long)]
    request: PathBuf,

    /// Spendable boxes JSON file.
    #[arg(long)]
    utxos: PathBuf,

    #[command(flatten)]
    key: SigningKeyArgs,

    /// Write the signed transaction here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct PayBatchArgs {
    /// JSON file holding a list of payment requests.
    #[arg(long)]
    request: PathBuf,

    /// Spendable boxes JSON file.
    #[arg(long)]
    utxos: PathBuf,

    #[command(flatten)]
    key: SigningKeyArgs,

    /// Report every entry instead of stopping at the first failure.
    #[arg(long)]
    partial: bool,
}

#[derive(Args)]
struct PayMultiArgs {
    /// Payment request JSON file.
    #[arg(long)]
    request: PathBuf,

    /// Spendable boxes JSON file.
    #[arg(long)]
    utxos: PathBuf,

    /// JSON file mapping box id to {"entropy": hex, "path": optional}.
    #[arg(long)]
    keys: PathBuf,

    /// Write the signed transaction here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct VerifyArgs {
    /// Signed transaction JSON file.
    #[arg(long)]
    tx: PathBuf,

    /// Spendable boxes JSON file holding every box the transaction spends.
    #[arg(long)]
    utxos: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    let config = Config::from_env()?.with_overrides(cli.network, cli.min_fee);
    info!(network = config.network.name(), min_fee = config.min_fee, "sigbox-cli starting");

    match cli.command {
        Commands::Keygen(args) => keygen(&config, args),
        Commands::Pay(args) => pay(&config, args),
        Commands::PayBatch(args) => pay_batch(&config, args),
        Commands::PayMulti(args) => pay_multi(&config, args),
        Commands::Verify(args) => verify(args),
    }
}

fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    // Logs go to stderr so stdout carries only command output.
    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .init();
    }
}

fn builder(config: &Config) -> TransactionBuilder {
    let mut builder = TransactionBuilder::new();
    builder.set_min_fee(config.min_fee);
    builder
}

/// Derive a master key and display its backup phrase and address.
fn keygen(config: &Config, args: KeygenArgs) -> Result<()> {
    let entropy: [u8; 32] = match (args.entropy, args.mnemonic) {
        (Some(hex_str), _) => hex::decode(hex_str.trim())
            .context("entropy must be hex")?
            .try_into()
            .map_err(|v: Vec<u8>| anyhow::anyhow!("entropy must be 32 bytes, got {}", v.len()))?,
        (None, Some(phrase)) => mnemonic::mnemonic_to_entropy(&phrase)?,
        (None, None) => {
            let mut bytes = [0u8; 32];
            OsRng.fill_bytes(&mut bytes);
            bytes
        }
    };
    let entropy_hex = hex::encode(entropy);
    let key = files::derive_key(&entropy_hex, args.path.as_deref())?;
    let phrase = mnemonic::entropy_to_mnemonic(&entropy)?;

    println!("Network:    {}", config.network.name());
    println!("Path:       {}", key.path());
    println!("Public key: {}", key.public_image());
    println!("Address:    {}", key.address(config.network));
    println!("\nMNEMONIC (24 WORDS):");
    println!("  {phrase}");
    println!("\nEntropy (hex): {entropy_hex}");
    println!("\nAnyone with this mnemonic or entropy can spend from this key.");
    Ok(())
}

/// Build and sign a single payment.
fn pay(config: &Config, args: PayArgs) -> Result<()> {
    let request = files::load_request(&args.request)?;
    let utxos = files::load_utxos(&args.utxos)?;
    let key = files::derive_key(&args.key.entropy, args.key.path.as_deref())?;

    let builder = builder(config);
    let params = request.to_params(&builder, config.network)?;
    let draft = builder
        .payment_transaction(&params, &utxos)
        .context("failed to build payment")?;
    let signed = Prover::prove(&draft, key.private_input()).context("failed to sign payment")?;

    emit(&signed, args.out)
}

/// Build and sign a list of payments with one key.
fn pay_batch(config: &Config, args: PayBatchArgs) -> Result<()> {
    let requests = files::load_requests(&args.request)?;
    let utxos = files::load_utxos(&args.utxos)?;
    let key = files::derive_key(&args.key.entropy, args.key.path.as_deref())?;
    let builder = builder(config);

    let params = requests
        .iter()
        .enumerate()
        .map(|(i, r)| {
            r.to_params(&builder, config.network)
                .with_context(|| format!("request {i}"))
        })
        .collect::<Result<Vec<_>>>()?;

    if args.partial {
        let mut failed = 0usize;
        for (i, signed) in sign_batch_partial(&builder, &params, &utxos, key.private_input())
            .into_iter()
            .enumerate()
        {
            match signed {
                Ok(signed) => println!("{}", encoder::to_json(&signed)?),
                Err(e) => {
                    failed += 1;
                    eprintln!("request {i}: {e}");
                }
            }
        }
        if failed > 0 {
            bail!("{failed} of {} payments failed", params.len());
        }
        return Ok(());
    }

    // Nothing is printed unless every entry signs.
    let signed = sign_batch(&builder, &params, &utxos, key.private_input())?;
    for tx in &signed {
        println!("{}", encoder::to_json(tx)?);
    }
    Ok(())
}

/// Build and sign every entry, stopping at the first failure.
fn sign_batch(
    builder: &TransactionBuilder,
    params: &[TxParams],
    utxos: &dyn BoxSource,
    key: &PrivateInput,
) -> Result<Vec<SignedTransaction>> {
    let drafts = builder
        .payment_transactions(params, utxos)
        .context("failed to build payment batch")?;
    drafts
        .iter()
        .enumerate()
        .map(|(i, draft)| {
            Prover::prove(draft, key).with_context(|| format!("failed to sign payment {i}"))
        })
        .collect()
}

/// Build and sign every entry independently, one result per entry.
fn sign_batch_partial(
    builder: &TransactionBuilder,
    params: &[TxParams],
    utxos: &dyn BoxSource,
    key: &PrivateInput,
) -> Vec<Result<SignedTransaction, WalletError>> {
    builder
        .payment_transactions_partial(params, utxos)
        .into_iter()
        .map(|built| built.and_then(|draft| Prover::prove(&draft, key)))
        .collect()
}

/// Build one payment and sign each input with the key mapped to its box.
fn pay_multi(config: &Config, args: PayMultiArgs) -> Result<()> {
    let request = files::load_request(&args.request)?;
    let utxos = files::load_utxos(&args.utxos)?;
    let keys = files::load_keys(&args.keys)?;

    let builder = builder(config);
    let params = request.to_params(&builder, config.network)?;
    let draft = builder
        .payment_transaction(&params, &utxos)
        .context("failed to build payment")?;
    let signed = Prover::prove_with_keys(&draft, keys).context("failed to sign payment")?;

    emit(&signed, args.out)
}

/// Verify a signed transaction's proofs and balance.
fn verify(args: VerifyArgs) -> Result<()> {
    let json = std::fs::read_to_string(&args.tx)
        .with_context(|| format!("failed to read transaction file {}", args.tx.display()))?;
    let tx = encoder::from_json(&json).context("failed to decode transaction")?;
    let utxos = files::load_utxos(&args.utxos)?;

    let input_boxes = tx
        .inputs
        .iter()
        .map(|input| {
            utxos
                .get_box(&input.box_id)?
                .with_context(|| format!("input box {} not in utxos file", input.box_id))
        })
        .collect::<Result<Vec<_>>>()?;

    verify_transaction(&tx, &input_boxes).context("transaction is invalid")?;
    println!("valid {}", tx.id());
    Ok(())
}

fn emit(signed: &SignedTransaction, out: Option<PathBuf>) -> Result<()> {
    let json = encoder::to_json(signed)?;
    match out {
        Some(path) => {
            std::fs::write(&path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(tx_id = %signed.id(), path = %path.display(), "wrote signed transaction");
        }
        None => println!("{json}"),
    }
    Ok(())
}
