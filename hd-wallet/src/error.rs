//! Error types for the hd-wallet library

use thiserror::Error;

/// Custom error type for hd-wallet operations
///
/// Messages never carry key material; callers may log them as they are.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Entropy error: {0}")]
    Entropy(String),

    #[error("Mnemonic error: {0}")]
    Mnemonic(String),

    #[error("Invalid index: {0} is outside the hardened derivation range")]
    InvalidIndex(u32),

    #[error("Invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("Invalid secp256k1 scalar: {0}")]
    InvalidScalar(String),

    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    #[error("No active session: create a wallet first")]
    NoActiveSession,

    #[error("Session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for hd-wallet operations
pub type Result<T> = std::result::Result<T, Error>;
