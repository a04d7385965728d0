//! Solana key pairs

use ed25519_dalek::SigningKey;
use zeroize::{Zeroize, Zeroizing};

use super::derivation::{ChainId, RawKeyMaterial};
use super::keypair::{ChainKeyAdapter, ChainKeypair};
use crate::error::{Error, Result};

/// Length of a Solana public key
pub const PUBLIC_KEY_LEN: usize = 32;

/// ed25519 adapter: base58 addresses, 64-byte secret keys (seed || public key)
#[derive(Debug, Clone, Copy, Default)]
pub struct SolanaAdapter;

impl ChainKeyAdapter for SolanaAdapter {
    fn chain(&self) -> ChainId {
        ChainId::Solana
    }

    fn derive_keypair(&self, raw: &RawKeyMaterial) -> Result<ChainKeypair> {
        let signing_key = SigningKey::from_bytes(raw.as_bytes());
        let public_key = signing_key.verifying_key().to_bytes();

        let mut keypair_bytes = signing_key.to_keypair_bytes();
        let secret_key = Zeroizing::new(keypair_bytes.to_vec());
        keypair_bytes.zeroize();
        let address = self.encode_address(&public_key)?;

        Ok(ChainKeypair::new(ChainId::Solana, secret_key, public_key.to_vec(), address))
    }

    fn encode_address(&self, public_key: &[u8]) -> Result<String> {
        if public_key.len() != PUBLIC_KEY_LEN {
            return Err(Error::KeyDerivation("Invalid Solana public key length".to_string()));
        }

        Ok(bs58::encode(public_key).into_string())
    }
}

/// Check that `address` is base58 decoding to exactly 32 bytes
pub fn is_valid_address(address: &str) -> bool {
    matches!(bs58::decode(address).into_vec(), Ok(bytes) if bytes.len() == PUBLIC_KEY_LEN)
}
