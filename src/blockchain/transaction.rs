use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use super::crypto::{verify_signature, Address, DigitalSignature, Wallet};

/// Represents a transfer of `amount` units from `sender` to `recipient`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    /// Sender's address
    #[schema(value_type = String)]
    pub sender: Address,

    /// Recipient's address
    #[schema(value_type = String)]
    pub recipient: Address,

    /// Amount being transferred
    pub amount: u64,

    /// Signature over the transaction payload, hex encoded
    #[schema(value_type = Option<String>)]
    pub signature: Option<DigitalSignature>,

    /// Timestamp when the transaction was created
    #[serde(rename = "timestamp")]
    #[schema(value_type = String, example = "2023-01-01T12:00:00Z")]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a new unsigned transaction
    pub fn new(sender: Address, recipient: Address, amount: u64) -> Self {
        Transaction {
            sender,
            recipient,
            amount,
            signature: None,
            created_at: Utc::now(),
        }
    }

    /// Signs the transaction with a wallet
    ///
    /// Any previous signature is replaced. The wallet is not required to own
    /// the sender address; a foreign signature simply fails verification.
    pub fn sign(&mut self, wallet: &Wallet) {
        let digest = Sha256::digest(self.payload());
        self.signature = Some(wallet.sign(&digest));
    }

    /// Checks the signature against the sender's public key
    pub fn verify(&self) -> bool {
        match &self.signature {
            Some(signature) => {
                let digest = Sha256::digest(self.payload());
                verify_signature(&digest, signature, &self.sender)
            }
            None => false,
        }
    }

    /// Whether the ledger may accept this transaction into its pool
    pub fn is_admissible(&self) -> bool {
        if self.signature.is_none() {
            return false;
        }
        self.verify()
    }

    /// SHA-256 of the signed payload as a hexadecimal string
    pub fn hash(&self) -> String {
        format!("{:x}", Sha256::digest(self.payload()))
    }

    /// Serializes the transaction for external readers
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "sender": self.sender.to_string(),
            "recipient": self.recipient.to_string(),
            "amount": self.amount,
            "signature": self.signature.as_ref().map(DigitalSignature::to_hex),
            "timestamp": self.created_at,
        })
    }

    // Timestamp and signature stay out of the signed bytes.
    fn payload(&self) -> Vec<u8> {
        format!("{}{}{}", self.sender, self.recipient, self.amount).into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed(sender: &Wallet, recipient: &Wallet, amount: u64) -> Transaction {
        let mut transaction = Transaction::new(*sender.address(), *recipient.address(), amount);
        transaction.sign(sender);
        transaction
    }

    #[test]
    fn test_new_transaction() {
        let sender = Wallet::new();
        let recipient = Wallet::new();

        let transaction = Transaction::new(*sender.address(), *recipient.address(), 100);

        assert_eq!(transaction.sender, *sender.address());
        assert_eq!(transaction.recipient, *recipient.address());
        assert_eq!(transaction.amount, 100);
        assert!(transaction.signature.is_none());
        assert!(!transaction.verify());
        assert!(!transaction.is_admissible());
    }

    #[test]
    fn test_sign_and_verify() {
        let sender = Wallet::new();
        let recipient = Wallet::new();

        let transaction = signed(&sender, &recipient, 100);

        assert!(transaction.signature.is_some());
        assert!(transaction.verify());
        assert!(transaction.is_admissible());
    }

    #[test]
    fn test_tampering_breaks_signature() {
        let sender = Wallet::new();
        let recipient = Wallet::new();
        let intruder = Wallet::new();

        let mut transaction = signed(&sender, &recipient, 100);
        transaction.amount = 101;
        assert!(!transaction.verify());

        let mut transaction = signed(&sender, &recipient, 100);
        transaction.recipient = *intruder.address();
        assert!(!transaction.verify());

        let mut transaction = signed(&sender, &recipient, 100);
        transaction.sender = *intruder.address();
        assert!(!transaction.verify());
    }

    #[test]
    fn test_foreign_signer_is_rejected() {
        let sender = Wallet::new();
        let recipient = Wallet::new();
        let fake = Wallet::new();

        let mut transaction = Transaction::new(*sender.address(), *recipient.address(), 100);
        transaction.sign(&fake);
        assert!(!transaction.verify());

        // Re-signing by the owner overwrites the bad signature
        transaction.sign(&sender);
        assert!(transaction.verify());

        // ...and signing again with a foreign key overwrites it back
        transaction.sign(&fake);
        assert!(!transaction.is_admissible());
    }

    #[test]
    fn test_malformed_signature() {
        let sender = Wallet::new();
        let recipient = Wallet::new();

        let mut transaction = signed(&sender, &recipient, 100);
        transaction.signature = Some(DigitalSignature::from_bytes(vec![0xab; 10]));
        assert!(!transaction.verify());
    }

    #[test]
    fn test_hash_ignores_timestamp_and_signature() {
        let sender = Wallet::new();
        let recipient = Wallet::new();

        let unsigned = Transaction::new(*sender.address(), *recipient.address(), 5);
        let mut later = unsigned.clone();
        later.created_at = unsigned.created_at + chrono::Duration::seconds(30);
        later.sign(&sender);

        assert_eq!(unsigned.hash(), later.hash());
        assert_eq!(unsigned.hash().len(), 64);

        let other_amount = Transaction::new(*sender.address(), *recipient.address(), 6);
        assert_ne!(unsigned.hash(), other_amount.hash());
    }

    #[test]
    fn test_to_json_shape() {
        let sender = Wallet::new();
        let recipient = Wallet::new();

        let unsigned = Transaction::new(*sender.address(), *recipient.address(), 7);
        let json = unsigned.to_json();
        assert_eq!(json["sender"], sender.address().to_string());
        assert_eq!(json["recipient"], recipient.address().to_string());
        assert_eq!(json["amount"], 7);
        assert!(json["signature"].is_null());
        assert!(json["timestamp"].is_string());

        let transaction = signed(&sender, &recipient, 7);
        let json = transaction.to_json();
        assert_eq!(
            json["signature"],
            transaction.signature.as_ref().unwrap().to_hex()
        );
    }

    #[test]
    fn test_deserialized_transaction_still_verifies() {
        let sender = Wallet::new();
        let recipient = Wallet::new();

        let transaction = signed(&sender, &recipient, 42);
        let json = serde_json::to_string(&transaction).unwrap();
        let decoded: Transaction = serde_json::from_str(&json).unwrap();

        assert!(decoded.verify());
        assert_eq!(decoded.hash(), transaction.hash());
    }
}
