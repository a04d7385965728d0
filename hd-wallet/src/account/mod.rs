//! Account management functionality
//!
//! Wallet accounts derived from one seed, the session that sequences them,
//! and address validation.

mod address;
mod session;
mod wallet;

pub use address::*;
pub use session::*;
pub use wallet::*;
