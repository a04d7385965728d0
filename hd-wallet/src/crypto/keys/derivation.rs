//! Common key derivation functionality
//!
//! Paths follow BIP-44 (`m/44'/coin'/account'/...`). Solana keys are derived
//! with SLIP-0010 over ed25519, Ethereum keys with BIP-32 over secp256k1.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use secp256k1::{PublicKey as Secp256k1PublicKey, Scalar, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::mnemonic::Seed;
use crate::error::{Error, Result};

type HmacSha512 = Hmac<Sha512>;

/// Bit that marks a hardened child index
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// BIP-44 purpose segment
const PURPOSE: u32 = 44;

/// Supported chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    /// Solana
    Solana,
    /// Ethereum and EVM compatible chains
    Ethereum,
}

impl ChainId {
    /// Every supported chain, in derivation order
    pub const ALL: [ChainId; 2] = [ChainId::Solana, ChainId::Ethereum];

    /// SLIP-0044 registered coin type
    pub fn coin_type(&self) -> u32 {
        match self {
            Self::Solana => 501,
            Self::Ethereum => 60,
        }
    }

    /// Curve the chain signs with
    pub fn curve(&self) -> Curve {
        match self {
            Self::Solana => Curve::Ed25519,
            Self::Ethereum => Curve::Secp256k1,
        }
    }

    /// Lowercase chain name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Solana => "solana",
            Self::Ethereum => "ethereum",
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChainId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "solana" | "sol" => Ok(Self::Solana),
            "ethereum" | "eth" => Ok(Self::Ethereum),
            other => Err(Error::Config(format!("unknown chain: {}", other))),
        }
    }
}

/// Elliptic curves used by the supported chains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    /// SLIP-0010 ed25519, hardened derivation only
    Ed25519,
    /// BIP-32 secp256k1
    Secp256k1,
}

impl Curve {
    /// HMAC key used to derive the master node from a seed
    fn master_hmac_key(&self) -> &'static [u8] {
        match self {
            Self::Ed25519 => b"ed25519 seed",
            Self::Secp256k1 => b"Bitcoin seed",
        }
    }
}

/// One segment of a derivation path, stored with its hardened bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildIndex(u32);

impl ChildIndex {
    /// A hardened segment; `index` must fit in 31 bits
    pub fn hardened(index: u32) -> Result<Self> {
        if index >= HARDENED_OFFSET {
            return Err(Error::InvalidIndex(index));
        }
        Ok(Self(index | HARDENED_OFFSET))
    }

    /// A normal (non-hardened) segment; `index` must fit in 31 bits
    pub fn normal(index: u32) -> Result<Self> {
        if index >= HARDENED_OFFSET {
            return Err(Error::InvalidIndex(index));
        }
        Ok(Self(index))
    }

    /// Whether the hardened bit is set
    pub fn is_hardened(&self) -> bool {
        self.0 & HARDENED_OFFSET != 0
    }

    /// The index without the hardened bit
    pub fn index(&self) -> u32 {
        self.0 & !HARDENED_OFFSET
    }

    /// The serialized BIP-32 index, hardened bit included
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_hardened() {
            write!(f, "{}'", self.index())
        } else {
            write!(f, "{}", self.index())
        }
    }
}

/// A derivation path bound to the chain whose curve walks it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    chain: ChainId,
    segments: Vec<ChildIndex>,
}

impl DerivationPath {
    /// Create a path, rejecting non-hardened segments on ed25519 chains
    pub fn new(chain: ChainId, segments: Vec<ChildIndex>) -> Result<Self> {
        if chain.curve() == Curve::Ed25519 {
            if let Some(segment) = segments.iter().find(|s| !s.is_hardened()) {
                return Err(Error::InvalidPath(format!(
                    "ed25519 derivation requires hardened segments, got {}",
                    segment
                )));
            }
        }
        Ok(Self { chain, segments })
    }

    /// Parse a BIP-32 path such as `m/44'/501'/0'/0'` (`h` also marks hardened)
    pub fn parse(chain: ChainId, path: &str) -> Result<Self> {
        let path = path.trim();
        let rest = match path.strip_prefix('m') {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => return Err(Error::InvalidPath(path.to_string())),
        };

        let mut segments = Vec::new();
        for component in rest.split('/').skip(1) {
            let (digits, hardened) = match component
                .strip_suffix('\'')
                .or_else(|| component.strip_suffix('h'))
            {
                Some(digits) => (digits, true),
                None => (component, false),
            };

            let invalid = || Error::InvalidPath(format!("invalid path component: {:?}", component));

            // u32::from_str alone would let a leading '+' through
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let index = digits.parse::<u32>().map_err(|_| invalid())?;

            segments.push(if hardened {
                ChildIndex::hardened(index)?
            } else {
                ChildIndex::normal(index)?
            });
        }

        Self::new(chain, segments)
    }

    /// The chain this path belongs to
    pub fn chain(&self) -> ChainId {
        self.chain
    }

    /// Path segments from the master node down
    pub fn segments(&self) -> &[ChildIndex] {
        &self.segments
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// Build the standard wallet path for an account on a chain
///
/// Solana: `m/44'/501'/{account}'/0'`. Ethereum: `m/44'/60'/{account}'/0/0`.
pub fn build_path(chain: ChainId, account_index: u32) -> Result<DerivationPath> {
    let mut segments = vec![
        ChildIndex::hardened(PURPOSE)?,
        ChildIndex::hardened(chain.coin_type())?,
        ChildIndex::hardened(account_index)?,
    ];

    match chain {
        ChainId::Solana => segments.push(ChildIndex::hardened(0)?),
        ChainId::Ethereum => {
            segments.push(ChildIndex::normal(0)?);
            segments.push(ChildIndex::normal(0)?);
        }
    }

    DerivationPath::new(chain, segments)
}

/// 32 bytes of derived private key material, zeroed when dropped
#[derive(Clone, PartialEq, Eq)]
pub struct RawKeyMaterial(Zeroizing<[u8; 32]>);

impl RawKeyMaterial {
    /// Wrap raw key bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Get the raw key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for RawKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawKeyMaterial([REDACTED])")
    }
}

/// Derive the private key material at `path` from a seed
pub fn derive(path: &DerivationPath, seed: &Seed) -> Result<RawKeyMaterial> {
    debug!(chain = %path.chain(), path = %path, "deriving key material");

    match path.chain().curve() {
        Curve::Ed25519 => derive_ed25519(seed.as_bytes(), path.segments()),
        Curve::Secp256k1 => derive_secp256k1(seed.as_bytes(), path.segments()),
    }
}

type KeyHalf = Zeroizing<[u8; 32]>;

/// HMAC-SHA512 over the concatenated `data`, split into (IL, IR)
fn hmac_split(key: &[u8], data: &[&[u8]]) -> Result<(KeyHalf, KeyHalf)> {
    let mut hmac = <HmacSha512 as Mac>::new_from_slice(key)
        .map_err(|_| Error::KeyDerivation("HMAC error".to_string()))?;

    for part in data {
        hmac.update(part);
    }
    let mut result = Zeroizing::new([0u8; 64]);
    result.copy_from_slice(&hmac.finalize().into_bytes());

    let mut left = Zeroizing::new([0u8; 32]);
    let mut right = Zeroizing::new([0u8; 32]);
    left.copy_from_slice(&result[..32]);
    right.copy_from_slice(&result[32..]);

    Ok((left, right))
}

/// SLIP-0010 ed25519 derivation
pub(crate) fn derive_ed25519(seed: &[u8], segments: &[ChildIndex]) -> Result<RawKeyMaterial> {
    let (mut key, mut chain_code) = hmac_split(Curve::Ed25519.master_hmac_key(), &[seed])?;

    for segment in segments {
        if !segment.is_hardened() {
            return Err(Error::InvalidPath(format!(
                "ed25519 derivation requires hardened segments, got {}",
                segment
            )));
        }
        (key, chain_code) = hmac_split(
            &chain_code[..],
            &[&[0u8][..], &key[..], &segment.raw().to_be_bytes()[..]],
        )?;
    }

    Ok(RawKeyMaterial(key))
}

/// BIP-32 secp256k1 private derivation
pub(crate) fn derive_secp256k1(seed: &[u8], segments: &[ChildIndex]) -> Result<RawKeyMaterial> {
    let secp = Secp256k1::new();

    let (master, mut chain_code) = hmac_split(Curve::Secp256k1.master_hmac_key(), &[seed])?;
    let mut key = SecretKey::from_slice(&master[..])
        .map_err(|e| Error::InvalidScalar(format!("master key: {}", e)))?;

    // the working key is erased on every exit, including errors
    let walked = walk_secp256k1(&secp, &mut key, &mut chain_code, segments);
    let raw = walked.map(|()| RawKeyMaterial::from_bytes(key.secret_bytes()));
    key.non_secure_erase();
    raw
}

fn walk_secp256k1(
    secp: &Secp256k1<secp256k1::All>,
    key: &mut SecretKey,
    chain_code: &mut KeyHalf,
    segments: &[ChildIndex],
) -> Result<()> {
    for segment in segments {
        let parent = Zeroizing::new(key.secret_bytes());
        let (tweak, child_chain_code) = if segment.is_hardened() {
            hmac_split(
                &chain_code[..],
                &[&[0u8][..], &parent[..], &segment.raw().to_be_bytes()[..]],
            )?
        } else {
            let parent_public = Secp256k1PublicKey::from_secret_key(secp, key);
            hmac_split(
                &chain_code[..],
                &[&parent_public.serialize()[..], &segment.raw().to_be_bytes()[..]],
            )?
        };

        apply_tweak(key, &tweak, *segment)?;
        *chain_code = child_chain_code;
    }
    Ok(())
}

/// Replace `key` with `IL + key (mod n)`; the parent is erased either way
fn apply_tweak(key: &mut SecretKey, tweak: &[u8; 32], segment: ChildIndex) -> Result<()> {
    // IL >= n or a zero child is an invalid node
    let child = Scalar::from_be_bytes(*tweak)
        .map_err(|_| {
            Error::InvalidScalar(format!("tweak at segment {} is not below the curve order", segment))
        })
        .and_then(|tweak| {
            key.add_tweak(&tweak)
                .map_err(|e| Error::InvalidScalar(format!("child at segment {}: {}", segment, e)))
        });

    key.non_secure_erase();
    *key = child?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TV1_SEED: &str = "000102030405060708090a0b0c0d0e0f";

    fn segments(chain: ChainId, path: &str) -> Vec<ChildIndex> {
        DerivationPath::parse(chain, path).unwrap().segments().to_vec()
    }

    #[test]
    fn test_build_solana_path() {
        let path = build_path(ChainId::Solana, 0).unwrap();
        assert_eq!(path.to_string(), "m/44'/501'/0'/0'");
        assert_eq!(build_path(ChainId::Solana, 7).unwrap().to_string(), "m/44'/501'/7'/0'");
    }

    #[test]
    fn test_build_ethereum_path() {
        let path = build_path(ChainId::Ethereum, 0).unwrap();
        assert_eq!(path.to_string(), "m/44'/60'/0'/0/0");
        assert_eq!(build_path(ChainId::Ethereum, 3).unwrap().to_string(), "m/44'/60'/3'/0/0");
    }

    #[test]
    fn test_index_exhaustion() {
        let max = HARDENED_OFFSET - 1;
        assert!(build_path(ChainId::Solana, max).is_ok());

        for chain in ChainId::ALL {
            assert_eq!(build_path(chain, HARDENED_OFFSET), Err(Error::InvalidIndex(HARDENED_OFFSET)));
            assert_eq!(build_path(chain, u32::MAX), Err(Error::InvalidIndex(u32::MAX)));
        }
    }

    #[test]
    fn test_parse_round_trip() {
        let path = DerivationPath::parse(ChainId::Ethereum, "m/44h/60h/0h/0/1").unwrap();
        assert_eq!(path.to_string(), "m/44'/60'/0'/0/1");
        assert_eq!(path.segments()[3], ChildIndex::normal(0).unwrap());
        assert_eq!(path, DerivationPath::parse(ChainId::Ethereum, &path.to_string()).unwrap());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "44'/60'", "m/", "m/44'/x", "m//0", "n/0", "m0", "m/+44'", "m/44'/+0", "m/-1", "m/ 1", "m/4294967296"] {
            assert!(
                matches!(DerivationPath::parse(ChainId::Ethereum, bad), Err(Error::InvalidPath(_))),
                "{:?} should be rejected",
                bad
            );
        }
        assert_eq!(
            DerivationPath::parse(ChainId::Ethereum, "m/2147483648'"),
            Err(Error::InvalidIndex(HARDENED_OFFSET))
        );
    }

    #[test]
    fn test_master_only_path() {
        let path = DerivationPath::parse(ChainId::Solana, "m").unwrap();
        assert!(path.segments().is_empty());
    }

    #[test]
    fn test_solana_path_must_be_hardened() {
        let result = DerivationPath::parse(ChainId::Solana, "m/44'/501'/0'/0");
        assert!(matches!(result, Err(Error::InvalidPath(_))));

        let seed = hex::decode(TV1_SEED).unwrap();
        let result = derive_ed25519(&seed, &[ChildIndex::normal(0).unwrap()]);
        assert!(matches!(result, Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_slip10_ed25519_vector_1() {
        let seed = hex::decode(TV1_SEED).unwrap();

        let master = derive_ed25519(&seed, &[]).unwrap();
        assert_eq!(
            hex::encode(master.as_bytes()),
            "2b4be7f19ee27bbf30c667b642d5f4aa69fd169872f8fc3059c08ebae2eb19e7"
        );

        let child = derive_ed25519(&seed, &segments(ChainId::Solana, "m/0'")).unwrap();
        assert_eq!(
            hex::encode(child.as_bytes()),
            "68e0fe46dfb67e368c75379acec591dad19df3cde26e63b93a8e704f1dade7a3"
        );

        let grandchild = derive_ed25519(&seed, &segments(ChainId::Solana, "m/0'/1'")).unwrap();
        assert_eq!(
            hex::encode(grandchild.as_bytes()),
            "b1d0bad404bf35da785a64ca1ac54b2617211d2777696fbffaf208f746ae84f2"
        );
    }

    #[test]
    fn test_bip32_secp256k1_vector_1() {
        let seed = hex::decode(TV1_SEED).unwrap();

        let master = derive_secp256k1(&seed, &[]).unwrap();
        assert_eq!(
            hex::encode(master.as_bytes()),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );

        let hardened = derive_secp256k1(&seed, &segments(ChainId::Ethereum, "m/0'")).unwrap();
        assert_eq!(
            hex::encode(hardened.as_bytes()),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );

        // non-hardened step goes through the parent public key
        let normal = derive_secp256k1(&seed, &segments(ChainId::Ethereum, "m/0'/1")).unwrap();
        assert_eq!(
            hex::encode(normal.as_bytes()),
            "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"
        );
    }

    #[test]
    fn test_apply_tweak_adds_scalar() {
        let mut key = SecretKey::from_slice(&[7u8; 32]).unwrap();
        let mut one = [0u8; 32];
        one[31] = 1;

        apply_tweak(&mut key, &one, ChildIndex::normal(0).unwrap()).unwrap();

        let mut expected = [7u8; 32];
        expected[31] = 8;
        assert_eq!(key.secret_bytes(), expected);
    }

    #[test]
    fn test_apply_tweak_failure_erases_parent() {
        let mut key = SecretKey::from_slice(&[7u8; 32]).unwrap();

        // 0xff.. is above the curve order
        let result = apply_tweak(&mut key, &[0xff; 32], ChildIndex::hardened(0).unwrap());

        assert!(matches!(result, Err(Error::InvalidScalar(_))));
        assert_ne!(key.secret_bytes(), [7u8; 32]);
    }

    #[test]
    fn test_chain_id_parsing() {
        assert_eq!("Solana".parse::<ChainId>().unwrap(), ChainId::Solana);
        assert_eq!(" eth ".parse::<ChainId>().unwrap(), ChainId::Ethereum);
        assert!(matches!("bitcoin".parse::<ChainId>(), Err(Error::Config(_))));
        assert_eq!(ChainId::Ethereum.to_string(), "ethereum");
    }

    #[test]
    fn test_raw_key_debug_is_redacted() {
        let raw = RawKeyMaterial::from_bytes([7u8; 32]);
        assert_eq!(format!("{:?}", raw), "RawKeyMaterial([REDACTED])");
    }
}
