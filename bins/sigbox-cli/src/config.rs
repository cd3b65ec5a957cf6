//! CLI configuration loaded from environment variables.

use anyhow::{Context, Result, anyhow};
use sigbox_core::constants::{MIN_FEE, NetworkType};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Network addresses must belong to.
    pub network: NetworkType,
    /// Minimum fee accepted when building payments, in nano-units.
    pub min_fee: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkType::Mainnet,
            min_fee: MIN_FEE,
        }
    }
}

impl Config {
    /// Load configuration from `SIGBOX_NETWORK` and `SIGBOX_MIN_FEE`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            std::env::var("SIGBOX_NETWORK").ok(),
            std::env::var("SIGBOX_MIN_FEE").ok(),
        )
    }

    fn from_vars(network: Option<String>, min_fee: Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let network = match network {
            Some(s) => s
                .parse::<NetworkType>()
                .map_err(|e| anyhow!("SIGBOX_NETWORK must be mainnet or testnet: {e}"))?,
            None => defaults.network,
        };

        let min_fee = match min_fee {
            Some(s) => s
                .parse::<u64>()
                .context("SIGBOX_MIN_FEE must be a non-negative integer")?,
            None => defaults.min_fee,
        };

        Ok(Config { network, min_fee })
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, network: Option<NetworkType>, min_fee: Option<u64>) -> Self {
        if let Some(network) = network {
            self.network = network;
        }
        if let Some(min_fee) = min_fee {
            self.min_fee = min_fee;
        }
        self
    }
}
