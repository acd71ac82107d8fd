//! Application state shared across API handlers
//!
//! The market context (gateway + aggregators + caches) is built lazily from
//! the active chain config and rebuilt whenever the config changes. Because
//! every cache lives inside the context, a network or contract switch can
//! never serve data cached under the previous configuration.

use std::sync::Arc;

use bonds::{BondCatalog, MetadataCache, PositionMetadata};
use covenant_core::{AppConfig, ChainConfig, Error};
use ledger_client::LedgerClient;
use resale::ResaleCatalog;
use tokio::sync::RwLock;

/// Everything the handlers need for one (network, contract) configuration.
#[derive(Clone)]
pub struct MarketContext {
    pub client: Arc<LedgerClient>,
    pub bonds: Arc<BondCatalog<LedgerClient>>,
    pub resale: Arc<ResaleCatalog<LedgerClient>>,
    pub metadata: Arc<MetadataCache<PositionMetadata>>,
}

impl MarketContext {
    fn build(chain: &ChainConfig) -> Result<Self, Error> {
        let client = Arc::new(LedgerClient::new(chain.clone())?);
        let metadata = Arc::new(MetadataCache::default());
        let bond_catalog = Arc::new(BondCatalog::new(client.clone()));
        let resale_catalog = Arc::new(ResaleCatalog::new(
            client.clone(),
            bond_catalog.clone(),
            metadata.clone(),
            chain.nft_contract.clone(),
        ));

        Ok(Self {
            client,
            bonds: bond_catalog,
            resale: resale_catalog,
            metadata,
        })
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RwLock<AppConfig>,
    market: RwLock<Option<MarketContext>>,
}

impl AppState {
    /// Create a new application state with default config
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create with a specific config
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config: RwLock::new(config),
                market: RwLock::new(None),
            }),
        }
    }

    /// Get current config
    pub async fn config(&self) -> AppConfig {
        self.inner.config.read().await.clone()
    }

    /// Get or build the market context for the active chain config.
    pub async fn market(&self) -> Result<MarketContext, Error> {
        // Check if we already have one
        {
            let market = self.inner.market.read().await;
            if let Some(ref ctx) = *market {
                return Ok(ctx.clone());
            }
        }

        let chain = self.inner.config.read().await.chain.clone();

        let mut market = self.inner.market.write().await;
        // Double-check after acquiring the write lock
        if let Some(ref ctx) = *market {
            return Ok(ctx.clone());
        }

        tracing::info!(lcd = %chain.lcd_url, network = %chain.network, "Building market context");
        let ctx = MarketContext::build(&chain)?;
        *market = Some(ctx.clone());
        Ok(ctx)
    }

    /// Swap the chain configuration.
    ///
    /// Drops the market context, and with it every cache built under the old
    /// configuration; the next handler call rebuilds from scratch.
    pub async fn set_chain_config(&self, chain: ChainConfig) {
        let mut config = self.inner.config.write().await;
        config.chain = chain;

        let mut market = self.inner.market.write().await;
        *market = None;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
