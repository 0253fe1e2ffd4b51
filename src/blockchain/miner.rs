use super::crypto::{Address, Wallet};
use super::transaction::Transaction;

/// A mining identity that can be paid out of the supply
#[derive(Debug, Clone, Default)]
pub struct Miner {
    wallet: Wallet,
}

impl Miner {
    /// Creates a miner with a new random wallet
    pub fn new() -> Self {
        Miner { wallet: Wallet::new() }
    }

    pub fn from_wallet(wallet: Wallet) -> Self {
        Miner { wallet }
    }

    pub fn address(&self) -> &Address {
        self.wallet.address()
    }

    /// Builds a reward paid from `supply` to this miner
    ///
    /// The transaction is only returned; submitting it is up to the caller.
    pub fn create_mining_transaction(&self, supply: &Wallet, reward: u64) -> Transaction {
        reward_transaction(supply, self.address(), reward)
    }
}

/// Creates a reward transaction from `authority` to `miner`, signed by the authority
pub fn reward_transaction(authority: &Wallet, miner: &Address, reward: u64) -> Transaction {
    let mut transaction = Transaction::new(*authority.address(), *miner, reward);
    transaction.sign(authority);
    transaction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mining_transaction() {
        let supply = Wallet::new();
        let miner = Miner::new();

        let transaction = miner.create_mining_transaction(&supply, 25);

        assert_eq!(transaction.sender, *supply.address());
        assert_eq!(transaction.recipient, *miner.address());
        assert_eq!(transaction.amount, 25);
        assert!(transaction.is_admissible());
    }

    #[test]
    fn test_miner_from_wallet_keeps_address() {
        let wallet = Wallet::new();
        let address = *wallet.address();
        let miner = Miner::from_wallet(wallet);
        assert_eq!(*miner.address(), address);
    }
}
