//! Chain configuration endpoints

use axum::{extract::State, routing::get, routing::post, Json, Router};
use covenant_core::{ChainConfig, ContractAddr};

use crate::dto::ChainConfigRequest;
use crate::AppState;

/// Create config routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_config))
        .route("/chain", post(set_chain))
}

/// GET /config - Active application configuration
pub async fn get_config(State(state): State<AppState>) -> Json<covenant_core::AppConfig> {
    Json(state.config().await)
}

/// POST /config/chain - Swap the chain configuration.
///
/// Rebuilds the market context, flushing every cache built under the old
/// (network, contract) pair.
pub async fn set_chain(
    State(state): State<AppState>,
    Json(request): Json<ChainConfigRequest>,
) -> Json<serde_json::Value> {
    let chain = ChainConfig {
        lcd_url: request.lcd_url,
        network: request.network,
        market_contract: ContractAddr::new(request.market_contract),
        nft_contract: ContractAddr::new(request.nft_contract),
    };

    tracing::info!(network = %chain.network, "Switching chain configuration");
    state.set_chain_config(chain).await;

    Json(serde_json::json!({ "updated": true }))
}
