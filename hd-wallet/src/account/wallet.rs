//! Wallet accounts and the factory that derives them

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::crypto::keys::{build_path, derive, derive_key_pair, ChainId, ChainKeypair};
use crate::crypto::mnemonic::Seed;
use crate::error::Result;

/// One HD account: a key pair per chain, all at the same account index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletAccount {
    account_index: u32,
    chain_keys: BTreeMap<ChainId, ChainKeypair>,
}

impl WalletAccount {
    /// The account's position in the session
    pub fn account_index(&self) -> u32 {
        self.account_index
    }

    /// The key pair for `chain`, if it was derived
    pub fn chain_key(&self, chain: ChainId) -> Option<&ChainKeypair> {
        self.chain_keys.get(&chain)
    }

    /// The address for `chain`, if it was derived
    pub fn address(&self, chain: ChainId) -> Option<&str> {
        self.chain_key(chain).map(ChainKeypair::address)
    }

    /// Chains this account holds keys for, in `ChainId` order
    pub fn chains(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.chain_keys.keys().copied()
    }

    /// All key pairs, in `ChainId` order
    pub fn chain_keys(&self) -> impl Iterator<Item = &ChainKeypair> {
        self.chain_keys.values()
    }
}

/// Derive the account at `account_index` for every chain in `chains`
///
/// Duplicate chains are derived once. The first failing chain aborts the
/// whole call; nothing partially derived is returned.
pub fn create_account(seed: &Seed, account_index: u32, chains: &[ChainId]) -> Result<WalletAccount> {
    assemble_account(account_index, chains, |chain| {
        let path = build_path(chain, account_index)?;
        let raw = derive(&path, seed)?;
        derive_key_pair(chain, &raw)
    })
}

fn assemble_account(
    account_index: u32,
    chains: &[ChainId],
    mut derive_chain: impl FnMut(ChainId) -> Result<ChainKeypair>,
) -> Result<WalletAccount> {
    let mut chain_keys = BTreeMap::new();

    for &chain in chains {
        if chain_keys.contains_key(&chain) {
            continue;
        }

        let keypair = derive_chain(chain)?;

        debug!(%chain, account_index, address = keypair.address(), "derived account key");
        chain_keys.insert(chain, keypair);
    }

    Ok(WalletAccount { account_index, chain_keys })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::mnemonic::Mnemonic;
    use crate::error::Error;

    fn test_seed() -> Seed {
        Mnemonic::from_phrase(
            "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
        )
        .unwrap()
        .to_seed("")
        .unwrap()
    }

    #[test]
    fn test_create_account_all_chains() {
        let account = create_account(&test_seed(), 0, &ChainId::ALL).unwrap();

        assert_eq!(account.account_index(), 0);
        assert_eq!(account.chains().collect::<Vec<_>>(), vec![ChainId::Solana, ChainId::Ethereum]);
        assert!(account.address(ChainId::Solana).is_some());
        assert!(account.address(ChainId::Ethereum).unwrap().starts_with("0x"));
    }

    #[test]
    fn test_create_account_subset() {
        let account = create_account(&test_seed(), 2, &[ChainId::Ethereum]).unwrap();

        assert_eq!(account.chains().collect::<Vec<_>>(), vec![ChainId::Ethereum]);
        assert!(account.chain_key(ChainId::Solana).is_none());
    }

    #[test]
    fn test_duplicate_chains_collapse() {
        let seed = test_seed();
        let twice = create_account(&seed, 1, &[ChainId::Solana, ChainId::Solana]).unwrap();
        let once = create_account(&seed, 1, &[ChainId::Solana]).unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn test_create_account_index_out_of_range() {
        let result = create_account(&test_seed(), 1 << 31, &ChainId::ALL);
        assert_eq!(result, Err(Error::InvalidIndex(1 << 31)));
    }

    #[test]
    fn test_later_chain_failure_discards_earlier_keys() {
        let seed = test_seed();
        let mut attempted = Vec::new();

        let result = assemble_account(0, &[ChainId::Ethereum, ChainId::Solana], |chain| {
            attempted.push(chain);
            match chain {
                ChainId::Ethereum => {
                    let raw = derive(&build_path(chain, 0)?, &seed)?;
                    derive_key_pair(chain, &raw)
                }
                ChainId::Solana => Err(Error::KeyDerivation("solana unavailable".to_string())),
            }
        });

        assert_eq!(attempted, vec![ChainId::Ethereum, ChainId::Solana]);
        assert_eq!(result, Err(Error::KeyDerivation("solana unavailable".to_string())));
    }

    #[test]
    fn test_serialized_account_has_no_private_key() {
        let account = create_account(&test_seed(), 0, &ChainId::ALL).unwrap();
        let json = serde_json::to_value(&account).unwrap();

        let eth = &json["chain_keys"]["ethereum"];
        assert_eq!(eth["address"], account.address(ChainId::Ethereum).unwrap());
        assert!(eth.get("private_key").is_none());
        assert_eq!(json["account_index"], 0);
    }
}
