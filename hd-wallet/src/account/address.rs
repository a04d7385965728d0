//! Address validation

use crate::crypto::keys::{ethereum, solana, ChainId};

/// Validate an address for a specific blockchain
///
/// Ethereum: `0x` + 40 hex digits, with a correct EIP-55 checksum when the
/// digits are mixed case. Solana: base58 that decodes to exactly 32 bytes.
pub fn validate_address(address: &str, chain: ChainId) -> bool {
    match chain {
        ChainId::Ethereum => ethereum::is_valid_address(address),
        ChainId::Solana => solana::is_valid_address(address),
    }
}

/// Guess which chain an address belongs to
pub fn detect_chain(address: &str) -> Option<ChainId> {
    ChainId::ALL.into_iter().find(|&chain| validate_address(address, chain))
}
