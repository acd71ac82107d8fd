//! ledger-client: Smart-query gateway for the bond market ledger
//!
//! Wraps an LCD REST endpoint behind typed query methods. Queries are JSON
//! messages base64-encoded into the `/cosmwasm/wasm/v1/contract/{addr}/smart`
//! path; responses unwrap the LCD's `{"data": ...}` envelope. Signing and
//! broadcasting stay with the wallet collaborator; this crate only reads
//! state and shapes execute instructions.

pub mod execute;
pub mod queries;

use base64::Engine;
use covenant_core::{ChainConfig, ContractAddr, GatewayError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use execute::{ExecuteBatch, ExecuteInstruction};
pub use queries::{
    BondMarketQuery, RawBondOffer, RawNftInfo, RawResaleOffer, RawTrait, RawUserBondPair,
};

/// Default timeout for LCD calls (30 seconds).
/// Long enough for slow public endpoints, short enough to avoid perpetual spinners.
const LCD_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// LCD smart-query envelope
#[derive(Debug, Deserialize)]
struct SmartQueryResponse<T> {
    data: T,
}

/// HTTP client for the bond ledger's read-only query surface
#[derive(Debug, Clone)]
pub struct LedgerClient {
    http: reqwest::Client,
    config: ChainConfig,
}

impl LedgerClient {
    pub fn new(config: ChainConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("covenant")
            .timeout(LCD_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Transport {
                url: config.lcd_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self { http, config })
    }

    /// Get the active chain configuration
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Bond market contract address from the active configuration
    pub fn market_contract(&self) -> &ContractAddr {
        &self.config.market_contract
    }

    /// cw721 collection address from the active configuration
    pub fn nft_contract(&self) -> &ContractAddr {
        &self.config.nft_contract
    }

    /// Execute a read-only smart query against a contract.
    ///
    /// The query message is serialized, base64-encoded into the URL, and the
    /// typed response is pulled out of the LCD's `data` envelope.
    pub async fn smart_query<Q, R>(&self, contract: &ContractAddr, msg: &Q) -> Result<R>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let query_json =
            serde_json::to_vec(msg).map_err(|e| GatewayError::Decode(e.to_string()))?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(query_json);

        let url = format!(
            "{}/cosmwasm/wasm/v1/contract/{}/smart/{}",
            self.config.lcd_url.trim_end_matches('/'),
            contract,
            encoded
        );

        let response = self.http.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout {
                    seconds: LCD_REQUEST_TIMEOUT.as_secs(),
                }
            } else {
                GatewayError::Transport {
                    url: self.config.lcd_url.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(contract = %contract, %status, "Smart query rejected");
            return Err(GatewayError::Contract {
                message: format!("{}: {}", status, truncate(&body, 300)),
            });
        }

        let envelope: SmartQueryResponse<R> = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        Ok(envelope.data)
    }
}

/// Clip contract error bodies so a misbehaving endpoint cannot flood the logs.
fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
