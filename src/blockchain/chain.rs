use std::io;

use log::{debug, info, warn};
use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::block::Block;
use super::crypto::Address;
use super::proof::{meets_difficulty, proof_of_work};
use super::token::Token;
use super::transaction::Transaction;

/// `previous_hash` of the genesis block: as long as a real hash, all zeros
pub const GENESIS_PREVIOUS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Errors that can occur during blockchain operations
#[derive(Debug, Error)]
pub enum BlockchainError {
    #[error("Block {index} not found (chain length {length})")]
    BlockNotFound { index: u64, length: usize },

    #[error("Stale block: expected parent {expected}, chain tip is {actual}")]
    StaleCandidate { expected: String, actual: String },
}

/// Why a transaction was kept out of the pool
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("Transaction not signed")]
    MissingSignature,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: i128 },
}

// Compact JSON, except that array items are separated by ", "
struct SpacedList;

impl Formatter for SpacedList {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }
}

/// Hashes the `", "`-separated JSON array of `hashes`
pub fn hash_list_digest(hashes: &[String]) -> String {
    let mut encoded = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut encoded, SpacedList);
    // Strings into a Vec cannot fail to serialize
    hashes
        .serialize(&mut serializer)
        .expect("hash list serializes into memory");

    format!("{:x}", Sha256::digest(&encoded))
}

/// The next block to seal: a snapshot of the chain tip and the pool
#[derive(Debug, Clone)]
pub struct Candidate {
    pub index: u64,
    pub previous_hash: String,
    pub transactions_digest: String,
    pub transactions: Vec<Transaction>,
}

impl Candidate {
    /// Runs the proof of work and builds the final block
    pub fn seal(self) -> Block {
        let seal = proof_of_work(self.index, &self.previous_hash, &self.transactions_digest);
        debug!("Found nonce {} for block {} ({})", seal.nonce, self.index, seal.hash);

        Block::new(
            self.index,
            self.previous_hash,
            self.transactions_digest,
            self.transactions,
            seal.nonce,
        )
    }
}

/// Represents the blockchain
#[derive(Debug, Clone)]
pub struct Blockchain {
    /// The chain of blocks, never empty
    chain: Vec<Block>,

    /// Pending transactions to be included in the next block
    open_transactions: Vec<Transaction>,

    /// Currency minted into the genesis block
    token: Token,
}

impl Blockchain {
    /// Creates a new blockchain with the default token
    pub fn new() -> Self {
        Self::with_token(Token::default())
    }

    /// Creates a new blockchain whose genesis block mints `token`'s supply
    pub fn with_token(token: Token) -> Self {
        let genesis = Self::create_genesis_block(&token);
        info!(
            "Created genesis block {} minting {} {}",
            genesis.hash,
            token.total_supply(),
            token.name()
        );

        Blockchain {
            chain: vec![genesis],
            open_transactions: Vec::new(),
            token,
        }
    }

    // The genesis block is accepted without proof of work.
    fn create_genesis_block(token: &Token) -> Block {
        let transactions = vec![token.create_supply_transaction()];
        let digest = Self::digest_of(&transactions);

        Block::new(0, GENESIS_PREVIOUS_HASH.to_string(), digest, transactions, 0)
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Gets the entire blockchain
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Gets the last block in the chain
    pub fn last_block(&self) -> &Block {
        match self.chain.last() {
            Some(block) => block,
            // with_token always pushes genesis and nothing removes blocks
            None => unreachable!("chain is never empty"),
        }
    }

    /// Looks up a block by its position in the chain
    pub fn block_at(&self, index: u64) -> Result<&Block, BlockchainError> {
        usize::try_from(index)
            .ok()
            .and_then(|position| self.chain.get(position))
            .ok_or(BlockchainError::BlockNotFound {
                index,
                length: self.chain.len(),
            })
    }

    /// Gets all pending transactions
    pub fn open_transactions(&self) -> &[Transaction] {
        &self.open_transactions
    }

    /// Adds a transaction to the pool if it is admissible
    ///
    /// Returns whether the transaction was accepted. Rejected transactions
    /// are dropped.
    pub fn submit(&mut self, transaction: Transaction) -> bool {
        match self.try_submit(transaction) {
            Ok(()) => true,
            Err(err) => {
                warn!("Rejected transaction: {}", err);
                false
            }
        }
    }

    /// Like [`Blockchain::submit`], but reports why a transaction was rejected
    pub fn try_submit(&mut self, transaction: Transaction) -> Result<(), AdmissionError> {
        if !transaction.is_admissible() {
            return Err(match transaction.signature {
                None => AdmissionError::MissingSignature,
                Some(_) => AdmissionError::InvalidSignature,
            });
        }

        if !self.has_sufficient_balance(&transaction.sender, transaction.amount) {
            return Err(AdmissionError::InsufficientFunds {
                required: transaction.amount,
                available: self.balance_of(&transaction.sender),
            });
        }

        debug!(
            "Accepted transaction of {} from {} to {}",
            transaction.amount, transaction.sender, transaction.recipient
        );
        self.open_transactions.push(transaction);

        Ok(())
    }

    /// Hashes an ordered list of transactions
    ///
    /// Each transaction is hashed on its own, the hex digests are collected
    /// into a JSON array written as `["a", "b"]` and that text is hashed
    /// again. This is a flat hash of hashes, not a Merkle tree.
    pub fn digest_of(transactions: &[Transaction]) -> String {
        let hashes: Vec<String> = transactions.iter().map(Transaction::hash).collect();
        hash_list_digest(&hashes)
    }

    /// Mines a new block with the pending transactions
    ///
    /// Does nothing and returns `None` when the pool is empty.
    pub fn mine(&mut self) -> Option<&Block> {
        let block = self.candidate()?.seal();
        self.commit(block).ok()
    }

    /// Snapshots the chain tip and the pool for sealing
    pub fn candidate(&self) -> Option<Candidate> {
        if self.open_transactions.is_empty() {
            return None;
        }

        let last_block = self.last_block();

        Some(Candidate {
            index: last_block.index + 1,
            previous_hash: last_block.hash.clone(),
            transactions_digest: Self::digest_of(&self.open_transactions),
            transactions: self.open_transactions.clone(),
        })
    }

    /// Appends a block sealed from [`Blockchain::candidate`]
    ///
    /// The block's transactions must be the head of the pool; they are
    /// removed from it. Transactions submitted after the snapshot stay
    /// pending.
    pub fn commit(&mut self, block: Block) -> Result<&Block, BlockchainError> {
        let last_block = self.last_block();
        if block.previous_hash != last_block.hash
            || block.index != last_block.index + 1
            || block.transactions.len() > self.open_transactions.len()
        {
            return Err(BlockchainError::StaleCandidate {
                expected: block.previous_hash,
                actual: last_block.hash.clone(),
            });
        }

        self.open_transactions.drain(..block.transactions.len());

        info!(
            "Mined block {} with {} transactions (nonce {}, hash {})",
            block.index,
            block.transactions.len(),
            block.nonce,
            block.hash
        );
        self.chain.push(block);

        Ok(self.last_block())
    }

    /// Balance of an address, replayed from every block in the chain
    ///
    /// Pending transactions are not counted. Cost grows with the total
    /// number of transactions ever mined.
    pub fn balance_of(&self, address: &Address) -> i128 {
        let mut balance = 0;

        for block in &self.chain {
            for transaction in &block.transactions {
                let amount = i128::from(transaction.amount);
                if transaction.recipient == *address {
                    balance += amount;
                }
                if transaction.sender == *address {
                    balance -= amount;
                }
            }
        }

        balance
    }

    /// Checks if the balance of an address covers `amount`
    pub fn has_sufficient_balance(&self, address: &Address, amount: u64) -> bool {
        self.balance_of(address) >= i128::from(amount)
    }

    /// Validates the blockchain
    ///
    /// Checks indices, linkage, stored hashes, transaction digests and the
    /// proof of work of every block after genesis.
    pub fn is_valid(&self) -> bool {
        for (position, block) in self.chain.iter().enumerate() {
            if block.index != position as u64 {
                return false;
            }

            if block.hash != block.calculate_hash() {
                return false;
            }

            if block.transactions_digest != Self::digest_of(&block.transactions) {
                return false;
            }

            if position == 0 {
                if block.previous_hash != GENESIS_PREVIOUS_HASH {
                    return false;
                }
                continue;
            }

            if block.previous_hash != self.chain[position - 1].hash {
                return false;
            }

            if !meets_difficulty(&block.hash) {
                return false;
            }
        }

        true
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}
