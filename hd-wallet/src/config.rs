//! Wallet configuration

use serde::Deserialize;

use crate::crypto::keys::ChainId;
use crate::crypto::mnemonic::MnemonicStrength;
use crate::error::{Error, Result};

/// Environment variable listing the chains to derive, e.g. `solana,ethereum`
pub const CHAINS_ENV: &str = "HD_WALLET_CHAINS";

/// Environment variable holding the mnemonic length for new wallets (12 or 24)
pub const MNEMONIC_WORDS_ENV: &str = "HD_WALLET_MNEMONIC_WORDS";

/// What a session derives and how new mnemonics are generated
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Chains derived for every account
    pub chains: Vec<ChainId>,
    /// Length of freshly generated mnemonics
    pub strength: MnemonicStrength,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            chains: ChainId::ALL.to_vec(),
            strength: MnemonicStrength::Words12,
        }
    }
}

impl WalletConfig {
    /// Load from `HD_WALLET_CHAINS` and `HD_WALLET_MNEMONIC_WORDS`, defaulting unset values
    pub fn from_env() -> Result<Self> {
        let chains = std::env::var(CHAINS_ENV).ok();
        let words = std::env::var(MNEMONIC_WORDS_ENV).ok();
        Self::from_values(chains.as_deref(), words.as_deref())
    }

    /// Build from raw option strings as they appear in the environment
    pub fn from_values(chains: Option<&str>, words: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(chains) = chains.filter(|s| !s.trim().is_empty()) {
            config.chains = parse_chains(chains)?;
        }

        if let Some(words) = words.filter(|s| !s.trim().is_empty()) {
            let count = words
                .trim()
                .parse::<usize>()
                .map_err(|_| Error::Config(format!("{} must be a number, got {:?}", MNEMONIC_WORDS_ENV, words)))?;
            config.strength = MnemonicStrength::from_word_count(count)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would derive nothing
    pub fn validate(&self) -> Result<()> {
        if self.chains.is_empty() {
            return Err(Error::Config("at least one chain must be enabled".to_string()));
        }
        Ok(())
    }
}

/// Parse a comma-separated chain list, dropping duplicates
pub fn parse_chains(list: &str) -> Result<Vec<ChainId>> {
    let mut chains = Vec::new();
    for name in list.split(',').filter(|s| !s.trim().is_empty()) {
        let chain = name.parse::<ChainId>()?;
        if !chains.contains(&chain) {
            chains.push(chain);
        }
    }
    Ok(chains)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WalletConfig::default();
        assert_eq!(config.chains, vec![ChainId::Solana, ChainId::Ethereum]);
        assert_eq!(config.strength, MnemonicStrength::Words12);
    }

    #[test]
    fn test_from_values() {
        let config = WalletConfig::from_values(Some("eth, solana,eth"), Some("24")).unwrap();
        assert_eq!(config.chains, vec![ChainId::Ethereum, ChainId::Solana]);
        assert_eq!(config.strength, MnemonicStrength::Words24);

        assert_eq!(WalletConfig::from_values(None, Some(" ")).unwrap(), WalletConfig::default());
    }

    #[test]
    fn test_from_values_rejects_bad_input() {
        assert!(matches!(WalletConfig::from_values(Some("dogecoin"), None), Err(Error::Config(_))));
        assert!(matches!(WalletConfig::from_values(None, Some("twelve")), Err(Error::Config(_))));
        assert!(matches!(WalletConfig::from_values(None, Some("18")), Err(Error::Config(_))));
        assert!(matches!(WalletConfig::from_values(Some(" , "), None), Err(Error::Config(_))));
    }

    // the only test in this crate that touches these variables
    #[test]
    fn test_from_env() {
        std::env::set_var(CHAINS_ENV, "ethereum");
        std::env::set_var(MNEMONIC_WORDS_ENV, "24");
        let config = WalletConfig::from_env();

        std::env::set_var(MNEMONIC_WORDS_ENV, "13");
        let invalid = WalletConfig::from_env();

        std::env::remove_var(CHAINS_ENV);
        std::env::remove_var(MNEMONIC_WORDS_ENV);
        let unset = WalletConfig::from_env();

        let config = config.unwrap();
        assert_eq!(config.chains, vec![ChainId::Ethereum]);
        assert_eq!(config.strength, MnemonicStrength::Words24);
        assert!(matches!(invalid, Err(Error::Config(_))));
        assert_eq!(unset.unwrap(), WalletConfig::default());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: WalletConfig = serde_json::from_str(r#"{"chains":["ethereum"]}"#).unwrap();
        assert_eq!(config.chains, vec![ChainId::Ethereum]);
        assert_eq!(config.strength, MnemonicStrength::Words12);
    }

    #[test]
    fn test_validate_empty_chains() {
        let config = WalletConfig { chains: vec![], ..Default::default() };
        assert!(config.validate().is_err());
    }
}
