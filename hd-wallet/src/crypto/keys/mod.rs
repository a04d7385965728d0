//! Key derivation and management
//!
//! This module provides functionality for deriving and managing keys for
//! different blockchains.

pub mod ethereum;
pub mod solana;
mod derivation;
mod keypair;

pub use derivation::*;
pub use ethereum::EthereumAdapter;
pub use keypair::*;
pub use solana::SolanaAdapter;
