use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

use super::block::Block;
use super::chain::{AdmissionError, Blockchain, BlockchainError};
use super::crypto::{Address, Wallet};
use super::transaction::Transaction;

/// Thread-safe handle to a single [`Blockchain`]
///
/// The chain and the pool sit behind one lock. Mining seals its candidate
/// outside the lock, so submissions are not blocked by the nonce search.
#[derive(Debug, Clone)]
pub struct SharedBlockchain {
    inner: Arc<Mutex<Blockchain>>,
}

impl SharedBlockchain {
    pub fn new(blockchain: Blockchain) -> Self {
        SharedBlockchain {
            inner: Arc::new(Mutex::new(blockchain)),
        }
    }

    // Every write leaves the ledger consistent, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Blockchain> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn submit(&self, transaction: Transaction) -> bool {
        self.lock().submit(transaction)
    }

    pub fn try_submit(&self, transaction: Transaction) -> Result<(), AdmissionError> {
        self.lock().try_submit(transaction)
    }

    /// Mines the pending transactions into a new block
    ///
    /// Blocks the caller for the whole search. The first attempt seals
    /// outside the lock. If another miner extends the chain meanwhile, the
    /// block is resealed from the new tip while holding the lock.
    pub fn mine(&self) -> Option<Block> {
        let candidate = self.lock().candidate()?;
        let block = candidate.seal();

        self.commit_or_reseal(block)
    }

    fn commit_or_reseal(&self, block: Block) -> Option<Block> {
        let mut blockchain = self.lock();
        match blockchain.commit(block) {
            Ok(block) => Some(block.clone()),
            Err(err) => {
                debug!("Discarding sealed block: {}", err);
                blockchain.mine().cloned()
            }
        }
    }

    pub fn chain(&self) -> Vec<Block> {
        self.lock().chain().to_vec()
    }

    pub fn last_block(&self) -> Block {
        self.lock().last_block().clone()
    }

    pub fn block_at(&self, index: u64) -> Result<Block, BlockchainError> {
        self.lock().block_at(index).cloned()
    }

    pub fn open_transactions(&self) -> Vec<Transaction> {
        self.lock().open_transactions().to_vec()
    }

    pub fn has_open_transactions(&self) -> bool {
        !self.lock().open_transactions().is_empty()
    }

    pub fn balance_of(&self, address: &Address) -> i128 {
        self.lock().balance_of(address)
    }

    pub fn is_valid(&self) -> bool {
        self.lock().is_valid()
    }

    /// Wallet holding the minted supply
    pub fn supply_wallet(&self) -> Wallet {
        self.lock().token().supply_wallet().clone()
    }
}
