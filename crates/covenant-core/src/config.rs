//! Configuration types for Covenant

use serde::{Deserialize, Serialize};

use crate::{ContractAddr, Network};

/// Ledger connection and contract configuration.
///
/// Every cache in the market layer is owned by a context built from one of
/// these; swapping the config rebuilds the context, so cached data can never
/// leak across networks or contract deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// LCD REST endpoint (e.g., "https://lcd.covenant.zone")
    pub lcd_url: String,

    /// Network (mainnet or testnet)
    pub network: Network,

    /// Bond market contract address
    pub market_contract: ContractAddr,

    /// cw721 collection holding the position NFTs
    pub nft_contract: ContractAddr,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            lcd_url: "https://lcd.covenant.zone".to_string(),
            network: Network::Mainnet,
            market_contract: ContractAddr::new(
                "cov14hj2tavq8fpesdwxxcu44rty3hh90vhujrvcmstl4zr3txmfvw9slcrnxq",
            ),
            nft_contract: ContractAddr::new(
                "cov1qg5ega6dykkxc307y25pecuufrjkxkaggkkxh7nad0vhyhtuhw3sqsh3kk",
            ),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ledger connection settings
    pub chain: ChainConfig,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_api_port() -> u16 {
    19707
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            api_port: default_api_port(),
        }
    }
}
