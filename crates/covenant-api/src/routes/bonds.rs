//! Primary bond market endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bonds::discount_pct;
use covenant_core::time::now_millis;
use serde::Deserialize;

use crate::dto::{ApiError, BondDto, CatalogResponse, DiscountRequest, DiscountResponse};
use crate::state::MarketContext;
use crate::AppState;

/// Create bond market routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bonds))
        .route("/invalidate", post(invalidate_all))
        .route("/discounts", post(discounts))
        .route("/:bond_id", get(get_bond))
        .route("/:bond_id/invalidate", post(invalidate_one))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    #[serde(default)]
    force: bool,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

async fn market(state: &AppState) -> Result<MarketContext, (StatusCode, Json<ApiError>)> {
    state.market().await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::unavailable(e.to_string())),
        )
    })
}

/// GET /bonds - Full catalog with derived statuses
pub async fn list_bonds(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<CatalogResponse> {
    let ctx = market(&state).await?;
    let snapshot = ctx.bonds.fetch_all(query.force).await;

    let now = now_millis();
    Ok(Json(CatalogResponse {
        bonds: snapshot
            .offers
            .iter()
            .map(|offer| BondDto::from_offer(offer, now))
            .collect(),
        is_fetching: snapshot.is_fetching,
    }))
}

/// GET /bonds/:bond_id - One offer, cache-first
pub async fn get_bond(
    State(state): State<AppState>,
    Path(bond_id): Path<u64>,
) -> ApiResult<BondDto> {
    let ctx = market(&state).await?;

    match ctx.bonds.get(bond_id).await {
        Some(offer) => Ok(Json(BondDto::from_offer(&offer, now_millis()))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found(format!("bond {} not found", bond_id))),
        )),
    }
}

/// POST /bonds/invalidate - Drop the whole catalog materialization
pub async fn invalidate_all(State(state): State<AppState>) -> ApiResult<serde_json::Value> {
    let ctx = market(&state).await?;
    ctx.bonds.invalidate_all().await;
    ctx.resale.invalidate_all().await;
    Ok(Json(serde_json::json!({ "invalidated": "all" })))
}

/// POST /bonds/:bond_id/invalidate - Drop one offer from the materialization
pub async fn invalidate_one(
    State(state): State<AppState>,
    Path(bond_id): Path<u64>,
) -> ApiResult<serde_json::Value> {
    let ctx = market(&state).await?;
    ctx.bonds.invalidate(bond_id).await;
    Ok(Json(serde_json::json!({ "invalidated": bond_id })))
}

/// POST /bonds/discounts - Discount/premium per bond for supplied spot prices
pub async fn discounts(
    State(state): State<AppState>,
    Json(request): Json<DiscountRequest>,
) -> ApiResult<DiscountResponse> {
    let ctx = market(&state).await?;
    let snapshot = ctx.bonds.fetch_all(false).await;

    let spot = |symbol: &str| request.prices.get(symbol).copied();
    let discounts = snapshot
        .offers
        .iter()
        .filter_map(|offer| {
            discount_pct(offer, spot).map(|pct| (offer.bond_id.to_string(), pct))
        })
        .collect();

    Ok(Json(DiscountResponse { discounts }))
}
