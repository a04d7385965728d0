//! Cryptographic primitives and operations
//!
//! Mnemonic generation, seed stretching, HD key derivation and the per-chain
//! key adapters.

pub mod mnemonic;
pub mod keys;

pub use mnemonic::*;
pub use keys::*;
