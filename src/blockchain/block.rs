use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use super::transaction::Transaction;

/// Represents a block in the blockchain
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Block {
    /// Index of the block in the chain
    pub index: u64,

    /// Hash of the current block
    pub hash: String,

    /// Hash of the previous block
    pub previous_hash: String,

    /// SHA-256 over the JSON list of transaction hashes
    #[serde(rename = "merkle_root")]
    pub transactions_digest: String,

    /// List of transactions included in this block
    pub transactions: Vec<Transaction>,

    /// Proof of work (nonce)
    pub nonce: u64,

    /// Timestamp when the block was created
    #[serde(rename = "timestamp")]
    #[schema(value_type = String, example = "2023-01-01T12:00:00Z")]
    pub sealed_at: DateTime<Utc>,
}

impl Block {
    /// Creates a new block
    ///
    /// The hash is computed from the header fields right away and the
    /// timestamp records construction time.
    ///
    /// # Arguments
    ///
    /// * `index` - The index of the block in the chain
    /// * `previous_hash` - The hash of the previous block
    /// * `transactions_digest` - Digest of `transactions`
    /// * `transactions` - The list of transactions to include in the block
    /// * `nonce` - The proof of work
    pub fn new(
        index: u64,
        previous_hash: String,
        transactions_digest: String,
        transactions: Vec<Transaction>,
        nonce: u64,
    ) -> Self {
        let hash = calculate_hash(index, &previous_hash, &transactions_digest, nonce);

        Block {
            index,
            hash,
            previous_hash,
            transactions_digest,
            transactions,
            nonce,
            sealed_at: Utc::now(),
        }
    }

    /// Recomputes the hash from the header fields
    ///
    /// Transactions only contribute through `transactions_digest`.
    pub fn calculate_hash(&self) -> String {
        calculate_hash(self.index, &self.previous_hash, &self.transactions_digest, self.nonce)
    }

    /// Serializes the block for external readers
    pub fn to_json(&self) -> serde_json::Value {
        let transactions: Vec<serde_json::Value> =
            self.transactions.iter().map(Transaction::to_json).collect();

        serde_json::json!({
            "index": self.index,
            "hash": self.hash,
            "previous_hash": self.previous_hash,
            "merkle_root": self.transactions_digest,
            "transactions": transactions,
            "nonce": self.nonce,
            "timestamp": self.sealed_at,
        })
    }
}

/// SHA-256 of `index ++ previous_hash ++ transactions_digest ++ nonce` as hex
pub fn calculate_hash(index: u64, previous_hash: &str, transactions_digest: &str, nonce: u64) -> String {
    let mut hasher = Sha256::new();

    hasher.update(index.to_string().as_bytes());
    hasher.update(previous_hash.as_bytes());
    hasher.update(transactions_digest.as_bytes());
    hasher.update(nonce.to_string().as_bytes());

    format!("{:x}", hasher.finalize())
}
