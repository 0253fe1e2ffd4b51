// Blockchain module
//
// This module contains the ledger core:
// - Block structure
// - Transaction structure and signing
// - Proof of work search
// - Blockchain (chain + pending pool) and its shared handle
// - Token issuance and miner rewards

pub mod block;
pub mod chain;
pub mod crypto;
pub mod miner;
pub mod proof;
pub mod shared;
pub mod token;
pub mod transaction;

// Re-export main components for easier access
pub use block::Block;
pub use chain::Blockchain;
pub use crypto::{Address, Wallet};
pub use miner::Miner;
pub use shared::SharedBlockchain;
pub use token::Token;
pub use transaction::Transaction;
