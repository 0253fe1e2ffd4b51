use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::blockchain::token::{DEFAULT_TOKEN_NAME, DEFAULT_TOTAL_SUPPLY};
use crate::blockchain::{Miner, Wallet};

/// Node settings, read from `LEDGER_*` environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Interface the HTTP server binds to
    pub host: String,

    /// Port the HTTP server listens on
    pub port: u16,

    /// Name of the minted token
    pub token_name: String,

    /// Supply minted into the genesis block
    pub total_supply: u64,

    /// Reward paid from the supply to the node's miner per mined block; 0 disables it
    pub mining_reward: u64,

    /// Hex secret key of the node's miner; a fresh key is generated when unset
    pub miner_key: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            token_name: DEFAULT_TOKEN_NAME.to_string(),
            total_supply: DEFAULT_TOTAL_SUPPLY,
            mining_reward: 0,
            miner_key: None,
        }
    }
}

impl NodeConfig {
    /// Loads the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = NodeConfig::default();

        Ok(NodeConfig {
            host: lookup("LEDGER_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "LEDGER_PORT", defaults.port)?,
            token_name: lookup("LEDGER_TOKEN_NAME").unwrap_or(defaults.token_name),
            total_supply: parse_var(&lookup, "LEDGER_TOTAL_SUPPLY", defaults.total_supply)?,
            mining_reward: parse_var(&lookup, "LEDGER_MINING_REWARD", defaults.mining_reward)?,
            miner_key: lookup("LEDGER_MINER_KEY"),
        })
    }

    /// Builds the node's miner from `miner_key`, or a random one
    pub fn miner(&self) -> Result<Miner> {
        let key = match &self.miner_key {
            Some(key) => key.trim(),
            None => return Ok(Miner::new()),
        };

        let bytes = hex::decode(key).context("Invalid value for LEDGER_MINER_KEY")?;
        let wallet = Wallet::from_secret_key(&bytes).context("Invalid value for LEDGER_MINER_KEY")?;

        Ok(Miner::from_wallet(wallet))
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, value)),
        None => Ok(default),
    }
}
