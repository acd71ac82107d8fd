//! Secondary market endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use covenant_core::time::now_millis;
use serde::Deserialize;

use crate::dto::{ApiError, ResaleCatalogResponse, ResaleListingDto};
use crate::AppState;

/// Create resale market routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_resale))
        .route("/invalidate", post(invalidate))
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    #[serde(default)]
    force: bool,
}

/// GET /resale - Fully-joined resale catalog
pub async fn list_resale(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ResaleCatalogResponse>, (StatusCode, Json<ApiError>)> {
    let ctx = state.market().await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::unavailable(e.to_string())),
        )
    })?;

    let snapshot = ctx.resale.fetch_all(query.force).await;
    let now = now_millis();

    Ok(Json(ResaleCatalogResponse {
        listings: snapshot
            .listings
            .iter()
            .map(|listing| ResaleListingDto::from_listing(listing, now))
            .collect(),
        is_fetching: snapshot.is_fetching,
    }))
}

/// POST /resale/invalidate - Drop the resale materialization
pub async fn invalidate(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ApiError>)> {
    let ctx = state.market().await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::unavailable(e.to_string())),
        )
    })?;

    ctx.resale.invalidate_all().await;
    Ok(Json(serde_json::json!({ "invalidated": "resale" })))
}
