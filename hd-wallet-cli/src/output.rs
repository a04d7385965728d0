//! Rendering of a wallet session for the terminal

use std::fmt;

use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use hd_wallet::{build_path, AccountSequencer, ChainId, WalletAccount};

const MASKED: &str = "(hidden, pass --show-secrets to reveal)";

/// Everything printed for one session; secrets are only filled in on request
#[derive(Serialize, Zeroize, ZeroizeOnDrop)]
pub struct SessionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    mnemonic: Option<String>,
    accounts: Vec<AccountView>,
}

#[derive(Serialize, Zeroize, ZeroizeOnDrop)]
struct AccountView {
    account_index: u32,
    chains: Vec<ChainView>,
}

#[derive(Serialize, Zeroize, ZeroizeOnDrop)]
struct ChainView {
    #[zeroize(skip)]
    chain: ChainId,
    path: String,
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    private_key: Option<String>,
}

impl SessionView {
    pub fn build(session: &AccountSequencer, show_secrets: bool) -> anyhow::Result<Self> {
        let mnemonic = if show_secrets {
            session.mnemonic()?.map(|m| m.phrase().to_string())
        } else {
            None
        };

        let accounts = session
            .accounts()?
            .iter()
            .map(|account| AccountView::build(account, show_secrets))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self { mnemonic, accounts })
    }
}

impl AccountView {
    fn build(account: &WalletAccount, show_secrets: bool) -> anyhow::Result<Self> {
        let chains = account
            .chain_keys()
            .map(|key| -> anyhow::Result<ChainView> {
                Ok(ChainView {
                    chain: key.chain(),
                    path: build_path(key.chain(), account.account_index())?.to_string(),
                    address: key.address().to_string(),
                    private_key: show_secrets.then(|| key.private_key_hex().to_string()),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            account_index: account.account_index(),
            chains,
        })
    }
}

impl fmt::Display for SessionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mnemonic: {}", self.mnemonic.as_deref().unwrap_or(MASKED))?;

        for account in &self.accounts {
            writeln!(f)?;
            writeln!(f, "Account {}", account.account_index)?;
            for chain in &account.chains {
                writeln!(f, "  {:<9} {}", chain.chain.name(), chain.address)?;
                writeln!(f, "  {:<9} {}", "path", chain.path)?;
                writeln!(f, "  {:<9} {}", "secret", chain.private_key.as_deref().unwrap_or(MASKED))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hd_wallet::Mnemonic;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn session() -> AccountSequencer {
        let session = AccountSequencer::new();
        session.reset(Mnemonic::from_phrase(ABANDON).unwrap()).unwrap();
        session.append_next().unwrap();
        session
    }

    #[test]
    fn test_secrets_masked_by_default() {
        let view = SessionView::build(&session(), false).unwrap();
        let text = view.to_string();

        assert!(!text.contains("abandon"));
        assert!(!text.contains("1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"));
        assert!(text.contains("0x9858EfFD232B4033E47d90003D41EC34EcaEda94"));
        assert!(text.contains(MASKED));

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("mnemonic").is_none());
        assert!(json["accounts"][0]["chains"][0].get("private_key").is_none());
    }

    #[test]
    fn test_secrets_shown_on_request() {
        let view = SessionView::build(&session(), true).unwrap();
        let text = view.to_string();

        assert!(text.contains(ABANDON));
        assert!(text.contains("1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"));
    }

    #[test]
    fn test_json_layout() {
        let view = SessionView::build(&session(), false).unwrap();
        let json = serde_json::to_value(&view).unwrap();

        let accounts = json["accounts"].as_array().unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[1]["account_index"], 1);

        let chains = accounts[0]["chains"].as_array().unwrap();
        assert_eq!(chains[0]["chain"], "solana");
        assert_eq!(chains[0]["path"], "m/44'/501'/0'/0'");
        assert_eq!(chains[1]["chain"], "ethereum");
        assert_eq!(chains[1]["path"], "m/44'/60'/0'/0/0");
    }
}
