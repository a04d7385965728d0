//! HD wallet command-line front end
//!
//! Generates or loads a mnemonic, derives Solana and Ethereum accounts from it
//! and prints them. Mnemonics and private keys stay masked unless
//! `--show-secrets` is passed.

mod output;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hd_wallet::config::{CHAINS_ENV, MNEMONIC_WORDS_ENV};
use hd_wallet::{build_path, generate_mnemonic_with, AccountSequencer, ChainId, Mnemonic, WalletConfig};

#[derive(Parser)]
#[command(name = "hd-wallet")]
#[command(about = "Derive Solana and Ethereum accounts from a single BIP-39 mnemonic")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Chains to derive, comma separated
    #[arg(long, env = CHAINS_ENV, global = true)]
    chains: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new mnemonic and derive accounts from it
    New {
        /// Mnemonic length in words (12 or 24)
        #[arg(long, env = MNEMONIC_WORDS_ENV)]
        words: Option<String>,

        #[command(flatten)]
        derive: DeriveArgs,
    },
    /// Derive accounts from an existing mnemonic
    Derive {
        /// The mnemonic phrase
        #[arg(short, long, env = "HD_WALLET_MNEMONIC", hide_env_values = true)]
        mnemonic: String,

        #[command(flatten)]
        derive: DeriveArgs,
    },
    /// Print the derivation path for a chain and account index
    Path {
        /// Chain name (solana or ethereum)
        #[arg(long)]
        chain: ChainId,

        /// Account index
        #[arg(long, default_value_t = 0)]
        index: u32,
    },
}

#[derive(Args)]
struct DeriveArgs {
    /// Number of accounts to derive
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    accounts: u32,

    /// Print the mnemonic and private keys
    #[arg(long)]
    show_secrets: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::New { words, derive } => {
            let config = WalletConfig::from_values(cli.chains.as_deref(), words.as_deref())?;
            let mnemonic = generate_mnemonic_with(config.strength).context("failed to generate mnemonic")?;
            info!(words = mnemonic.word_count(), "generated new mnemonic");
            run_session(&config, mnemonic, &derive)
        }
        Commands::Derive { mnemonic, derive } => {
            let config = WalletConfig::from_values(cli.chains.as_deref(), None)?;
            let mnemonic = zeroize::Zeroizing::new(mnemonic);
            let mnemonic = Mnemonic::from_phrase(&mnemonic).context("invalid mnemonic")?;
            run_session(&config, mnemonic, &derive)
        }
        Commands::Path { chain, index } => {
            println!("{}", build_path(chain, index)?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_session(config: &WalletConfig, mnemonic: Mnemonic, args: &DeriveArgs) -> anyhow::Result<()> {
    let session = AccountSequencer::with_config(config)?;
    session.create_first_account(mnemonic)?;
    for _ in 1..args.accounts {
        session.append_next_account()?;
    }

    let view = output::SessionView::build(&session, args.show_secrets)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", view);
    }
    Ok(())
}
