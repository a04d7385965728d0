//! Ethereum key pairs and EIP-55 addresses

use secp256k1::{PublicKey as Secp256k1PublicKey, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};
use zeroize::Zeroizing;

use super::derivation::{ChainId, RawKeyMaterial};
use super::keypair::{ChainKeyAdapter, ChainKeypair};
use crate::error::{Error, Result};

/// Length of an uncompressed SEC1 public key
pub const PUBLIC_KEY_LEN: usize = 65;

/// secp256k1 adapter: raw material is the private scalar itself
#[derive(Debug, Clone, Copy, Default)]
pub struct EthereumAdapter;

impl ChainKeyAdapter for EthereumAdapter {
    fn chain(&self) -> ChainId {
        ChainId::Ethereum
    }

    fn derive_keypair(&self, raw: &RawKeyMaterial) -> Result<ChainKeypair> {
        // rejects zero and anything >= the curve order
        let mut secret_key = SecretKey::from_slice(raw.as_bytes())
            .map_err(|e| Error::InvalidScalar(e.to_string()))?;

        let secp = Secp256k1::new();
        let public_key = Secp256k1PublicKey::from_secret_key(&secp, &secret_key).serialize_uncompressed();

        let private_key = Zeroizing::new(raw.as_bytes().to_vec());
        secret_key.non_secure_erase();

        let address = self.encode_address(&public_key)?;
        Ok(ChainKeypair::new(ChainId::Ethereum, private_key, public_key.to_vec(), address))
    }

    fn encode_address(&self, public_key: &[u8]) -> Result<String> {
        // The public key should be in uncompressed format (65 bytes)
        if public_key.len() != PUBLIC_KEY_LEN || public_key[0] != 0x04 {
            return Err(Error::KeyDerivation("Invalid Ethereum public key length".to_string()));
        }

        // Skip the first byte (0x04) and hash the rest; the address is the last 20 bytes
        let key_hash = keccak256(&public_key[1..]);
        let mut address = [0u8; 20];
        address.copy_from_slice(&key_hash[12..]);

        Ok(to_checksum_address(&address))
    }
}

/// Calculate the Keccak-256 hash of data
fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Render a 20-byte address as `0x` + EIP-55 mixed-case hex
pub fn to_checksum_address(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut result = String::with_capacity(42);
    result.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (4 * (1 - i % 2))) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            result.push(c.to_ascii_uppercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Parse `0x` + 40 hex digits into address bytes, ignoring case
pub fn parse_address(address: &str) -> Option<[u8; 20]> {
    let digits = address.strip_prefix("0x")?;
    if digits.len() != 40 {
        return None;
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(digits, &mut bytes).ok()?;
    Some(bytes)
}

/// Check that `address` carries a correct EIP-55 checksum
pub fn is_valid_checksum_address(address: &str) -> bool {
    match parse_address(address) {
        Some(bytes) => to_checksum_address(&bytes) == address,
        None => false,
    }
}

/// Check an address the way wallets accept input: all-lowercase and
/// all-uppercase hex carry no checksum, mixed case must pass EIP-55
pub fn is_valid_address(address: &str) -> bool {
    let Some(bytes) = parse_address(address) else {
        return false;
    };

    let digits = &address[2..];
    let all_lower = !digits.chars().any(|c| c.is_ascii_uppercase());
    let all_upper = !digits.chars().any(|c| c.is_ascii_lowercase());
    all_lower || all_upper || to_checksum_address(&bytes) == address
}
