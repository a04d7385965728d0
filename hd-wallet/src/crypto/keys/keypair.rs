//! Per-chain key pairs and the adapters that produce them

use std::fmt;

use serde::Serialize;
use zeroize::Zeroizing;

use super::derivation::{ChainId, RawKeyMaterial};
use super::ethereum::EthereumAdapter;
use super::solana::SolanaAdapter;
use crate::error::Result;

/// Turns derived key material into a chain's key pair and address
pub trait ChainKeyAdapter: Send + Sync {
    /// The chain this adapter serves
    fn chain(&self) -> ChainId;

    /// Build the chain's key pair from 32 bytes of derived material
    fn derive_keypair(&self, raw: &RawKeyMaterial) -> Result<ChainKeypair>;

    /// Render a public key in the chain's canonical address format
    fn encode_address(&self, public_key: &[u8]) -> Result<String>;
}

impl ChainId {
    /// The adapter for this chain
    pub fn adapter(&self) -> &'static dyn ChainKeyAdapter {
        match self {
            Self::Solana => &SolanaAdapter,
            Self::Ethereum => &EthereumAdapter,
        }
    }
}

/// A key pair for one chain
///
/// Private bytes are zeroed on drop and left out of `Debug` and serialized output.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ChainKeypair {
    chain: ChainId,
    #[serde(skip_serializing)]
    private_key: Zeroizing<Vec<u8>>,
    #[serde(serialize_with = "serialize_hex")]
    public_key: Vec<u8>,
    address: String,
}

impl ChainKeypair {
    /// Create a key pair; adapters are the only intended callers
    pub fn new(chain: ChainId, private_key: Zeroizing<Vec<u8>>, public_key: Vec<u8>, address: String) -> Self {
        Self { chain, private_key, public_key, address }
    }

    /// The chain this key pair belongs to
    pub fn chain(&self) -> ChainId {
        self.chain
    }

    /// Raw private key bytes (64 for Solana, 32 for Ethereum)
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    /// Hex-encoded private key
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&*self.private_key))
    }

    /// Raw public key bytes
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// The chain-native address string
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Debug for ChainKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainKeypair")
            .field("chain", &self.chain)
            .field("address", &self.address)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

fn serialize_hex<S: serde::Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

/// Derive a chain key pair from raw key material
pub fn derive_key_pair(chain: ChainId, raw: &RawKeyMaterial) -> Result<ChainKeypair> {
    chain.adapter().derive_keypair(raw)
}
