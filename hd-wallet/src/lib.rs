//! HD Wallet Core - deterministic multi-chain key derivation
//!
//! This library derives Solana (ed25519) and Ethereum (secp256k1) accounts from
//! a single BIP-39 mnemonic along the standard BIP-44 paths, so the same
//! mnemonic and index yield the same keys as Phantom and MetaMask.
//!
//! ```no_run
//! use hd_wallet::{generate_mnemonic, AccountSequencer, ChainId};
//!
//! # fn main() -> hd_wallet::Result<()> {
//! let session = AccountSequencer::new();
//! let first = session.create_first_account(generate_mnemonic()?)?;
//! let second = session.append_next_account()?;
//! println!("{:?}", first.address(ChainId::Solana));
//! println!("{:?}", second.address(ChainId::Ethereum));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod config;
pub mod crypto;
pub mod account;

// Re-export commonly used types for convenience
pub use account::{create_account, validate_address, AccountSequencer, SessionStatus, WalletAccount};
pub use config::WalletConfig;
pub use crypto::keys::{
    build_path, derive, ChainId, ChainKeyAdapter, ChainKeypair, DerivationPath, EthereumAdapter,
    RawKeyMaterial, SolanaAdapter,
};
pub use crypto::mnemonic::{generate_mnemonic, generate_mnemonic_with, Mnemonic, MnemonicStrength, Seed};
pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
