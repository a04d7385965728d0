//! Mnemonic phrase generation and handling

use std::fmt;

use rand::{rngs::OsRng, RngCore};
use serde::Deserialize;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{Error, Result};

/// Length of a BIP-39 seed in bytes
pub const SEED_LEN: usize = 64;

/// Supported mnemonic strengths
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum MnemonicStrength {
    /// 12 words (128 bits)
    #[default]
    Words12,
    /// 24 words (256 bits)
    Words24,
}

impl MnemonicStrength {
    /// Get entropy length in bytes
    fn entropy_bytes(&self) -> usize {
        match self {
            Self::Words12 => 16, // 128 bits = 16 bytes
            Self::Words24 => 32, // 256 bits = 32 bytes
        }
    }

    /// Number of words a mnemonic of this strength has
    pub fn word_count(&self) -> usize {
        match self {
            Self::Words12 => 12,
            Self::Words24 => 24,
        }
    }

    /// Map a word count back to a strength
    pub fn from_word_count(words: usize) -> Result<Self> {
        match words {
            12 => Ok(Self::Words12),
            24 => Ok(Self::Words24),
            other => Err(Error::Config(format!("unsupported mnemonic length: {} words", other))),
        }
    }
}

/// A checksum-valid BIP-39 mnemonic phrase
///
/// The phrase lives in a zeroizing buffer and is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Mnemonic {
    phrase: Zeroizing<String>,
}

impl Mnemonic {
    /// Parse and validate an English mnemonic phrase
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        let inner = bip39::Mnemonic::parse_normalized(phrase)
            .map_err(|e| Error::Mnemonic(e.to_string()))?;

        Ok(Self::wrap(inner))
    }

    fn from_entropy(entropy: &[u8]) -> Result<Self> {
        let inner = bip39::Mnemonic::from_entropy(entropy)
            .map_err(|e| Error::Mnemonic(e.to_string()))?;

        Ok(Self::wrap(inner))
    }

    fn wrap(inner: bip39::Mnemonic) -> Self {
        Self { phrase: Zeroizing::new(inner.to_string()) }
    }

    /// The normalized phrase, words separated by single spaces
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// The individual words in order
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.phrase.split(' ')
    }

    /// Number of words
    pub fn word_count(&self) -> usize {
        self.words().count()
    }

    /// Stretch the mnemonic into a seed with the given passphrase
    pub fn to_seed(&self, passphrase: &str) -> Result<Seed> {
        let inner = bip39::Mnemonic::parse_normalized(&self.phrase)
            .map_err(|e| Error::Mnemonic(e.to_string()))?;

        let mut seed = inner.to_seed(passphrase);
        let out = Seed::from_bytes(seed);
        seed.zeroize();
        Ok(out)
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mnemonic")
            .field("word_count", &self.word_count())
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

impl std::str::FromStr for Mnemonic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_phrase(s)
    }
}

/// A 64-byte BIP-39 seed, zeroed when dropped
#[derive(Clone, PartialEq, Eq)]
pub struct Seed(Zeroizing<[u8; SEED_LEN]>);

impl Seed {
    /// Wrap raw seed bytes
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Get the raw seed bytes
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed([REDACTED])")
    }
}

/// Generate a new random 12-word mnemonic
pub fn generate_mnemonic() -> Result<Mnemonic> {
    generate_mnemonic_with(MnemonicStrength::Words12)
}

/// Generate a new random mnemonic phrase with the specified strength
pub fn generate_mnemonic_with(strength: MnemonicStrength) -> Result<Mnemonic> {
    let mut entropy = [0u8; 32];
    let entropy = &mut entropy[..strength.entropy_bytes()];
    OsRng
        .try_fill_bytes(entropy)
        .map_err(|e| Error::Entropy(e.to_string()))?;

    let mnemonic = Mnemonic::from_entropy(entropy);
    entropy.zeroize();
    mnemonic
}

/// Validate a mnemonic phrase
pub fn validate_mnemonic(phrase: &str) -> Result<bool> {
    Mnemonic::from_phrase(phrase).map(|_| true)
}

/// Generate a seed from a mnemonic and passphrase (PBKDF2-HMAC-SHA512, 2048 rounds)
pub fn mnemonic_to_seed(mnemonic: &Mnemonic, passphrase: &str) -> Result<Seed> {
    mnemonic.to_seed(passphrase)
}
