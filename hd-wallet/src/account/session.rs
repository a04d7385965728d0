//! Session-scoped account sequencing
//!
//! A session holds one mnemonic, its seed and the accounts derived from it so
//! far. Accounts are append-only; the only way to shrink the list is a reset,
//! which replaces every piece of state at once.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::account::wallet::{create_account, WalletAccount};
use crate::config::WalletConfig;
use crate::crypto::keys::ChainId;
use crate::crypto::mnemonic::{Mnemonic, Seed};
use crate::error::{Error, Result};

/// Whether a session has a wallet loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No mnemonic, no accounts
    Empty,
    /// A seed is loaded and at least one account exists
    Active,
}

enum SessionState {
    Empty,
    Active(ActiveSession),
}

struct ActiveSession {
    mnemonic: Mnemonic,
    seed: Seed,
    // accounts[i].account_index() == i
    accounts: Vec<Arc<WalletAccount>>,
}

/// Tracks the active seed and hands out accounts in index order
///
/// `reset` and `append_next` take the write lock for the whole transition, so
/// concurrent callers are linearised and indices are never duplicated or skipped.
pub struct AccountSequencer {
    chains: Vec<ChainId>,
    state: RwLock<SessionState>,
}

impl Default for AccountSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountSequencer {
    /// An empty session deriving every supported chain
    pub fn new() -> Self {
        Self {
            chains: ChainId::ALL.to_vec(),
            state: RwLock::new(SessionState::Empty),
        }
    }

    /// An empty session deriving the chains named in `config`
    pub fn with_config(config: &WalletConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            chains: config.chains.clone(),
            state: RwLock::new(SessionState::Empty),
        })
    }

    /// Chains derived for each account
    pub fn chains(&self) -> &[ChainId] {
        &self.chains
    }

    /// Replace the session with `mnemonic` and derive account 0
    ///
    /// Previous secrets are zeroed as they are dropped. On error the previous
    /// session is left as it was.
    pub fn reset(&self, mnemonic: Mnemonic) -> Result<Arc<WalletAccount>> {
        let mut state = self.write()?;

        let seed = mnemonic.to_seed("")?;
        let first = Arc::new(create_account(&seed, 0, &self.chains)?);

        *state = SessionState::Active(ActiveSession {
            mnemonic,
            seed,
            accounts: vec![Arc::clone(&first)],
        });

        info!(chains = self.chains.len(), "wallet session reset");
        Ok(first)
    }

    /// Start a session from `mnemonic`; the same transition as [`reset`](Self::reset)
    pub fn create_first_account(&self, mnemonic: Mnemonic) -> Result<Arc<WalletAccount>> {
        self.reset(mnemonic)
    }

    /// Derive the account at the next index and append it
    pub fn append_next(&self) -> Result<Arc<WalletAccount>> {
        let mut state = self.write()?;
        let SessionState::Active(session) = &mut *state else {
            return Err(Error::NoActiveSession);
        };

        let index = u32::try_from(session.accounts.len()).map_err(|_| Error::InvalidIndex(u32::MAX))?;
        let account = Arc::new(create_account(&session.seed, index, &self.chains)?);
        session.accounts.push(Arc::clone(&account));

        info!(account_index = index, "account appended");
        Ok(account)
    }

    /// Alias of [`append_next`](Self::append_next)
    pub fn append_next_account(&self) -> Result<Arc<WalletAccount>> {
        self.append_next()
    }

    /// Drop back to the empty state, zeroing the session's secrets
    pub fn clear(&self) -> Result<()> {
        *self.write()? = SessionState::Empty;
        info!("wallet session cleared");
        Ok(())
    }

    /// Current state
    pub fn status(&self) -> Result<SessionStatus> {
        Ok(match &*self.read()? {
            SessionState::Empty => SessionStatus::Empty,
            SessionState::Active(_) => SessionStatus::Active,
        })
    }

    /// Index the next `append_next` will derive
    pub fn next_index(&self) -> Result<u32> {
        Ok(match &*self.read()? {
            SessionState::Empty => 0,
            SessionState::Active(session) => session.accounts.len() as u32,
        })
    }

    /// Snapshot of the accounts in index order
    pub fn accounts(&self) -> Result<Vec<Arc<WalletAccount>>> {
        Ok(match &*self.read()? {
            SessionState::Empty => Vec::new(),
            SessionState::Active(session) => session.accounts.clone(),
        })
    }

    /// The account at `index`, if derived
    pub fn account(&self, index: u32) -> Result<Option<Arc<WalletAccount>>> {
        Ok(match &*self.read()? {
            SessionState::Empty => None,
            SessionState::Active(session) => session.accounts.get(index as usize).cloned(),
        })
    }

    /// The active mnemonic, for a display layer that gates it behind user action
    pub fn mnemonic(&self) -> Result<Option<Mnemonic>> {
        Ok(match &*self.read()? {
            SessionState::Empty => None,
            SessionState::Active(session) => Some(session.mnemonic.clone()),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, SessionState>> {
        self.state
            .read()
            .map_err(|_| Error::Session("session lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, SessionState>> {
        self.state
            .write()
            .map_err(|_| Error::Session("session lock poisoned".to_string()))
    }
}
