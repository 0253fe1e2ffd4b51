use super::crypto::{Address, Wallet};
use super::transaction::Transaction;

pub const DEFAULT_TOKEN_NAME: &str = "RarCoin";
pub const DEFAULT_TOTAL_SUPPLY: u64 = 1000;

/// The ledger's currency and the two identities that mint it
///
/// The origin signs a single transfer of the total supply to the supply
/// wallet. That transfer seeds the genesis block; afterwards the supply
/// address is an ordinary account.
#[derive(Debug, Clone)]
pub struct Token {
    name: String,
    total_supply: u64,
    origin: Wallet,
    supply: Wallet,
}

impl Token {
    /// Creates a token with freshly generated origin and supply wallets
    pub fn new(name: impl Into<String>, total_supply: u64) -> Self {
        Token {
            name: name.into(),
            total_supply,
            origin: Wallet::new(),
            supply: Wallet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    pub fn origin_address(&self) -> &Address {
        self.origin.address()
    }

    /// Wallet holding the minted supply
    pub fn supply_wallet(&self) -> &Wallet {
        &self.supply
    }

    /// Builds the signed issuance transaction for the genesis block
    pub fn create_supply_transaction(&self) -> Transaction {
        let mut transaction = Transaction::new(
            *self.origin.address(),
            *self.supply.address(),
            self.total_supply,
        );
        transaction.sign(&self.origin);
        transaction
    }
}

impl Default for Token {
    fn default() -> Self {
        Token::new(DEFAULT_TOKEN_NAME, DEFAULT_TOTAL_SUPPLY)
    }
}
