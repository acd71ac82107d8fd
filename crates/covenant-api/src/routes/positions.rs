//! User position and claim endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bonds::{build_claim_batch, fetch_user_positions, GasParams};
use covenant_core::time::now_millis;
use covenant_core::ClaimError;

use crate::dto::{
    ApiError, ClaimInstructionDto, ClaimPlanRequest, ClaimPlanResponse, InvalidationKeyDto,
    PositionDto, PositionsResponse,
};
use crate::state::MarketContext;
use crate::AppState;

/// Create position routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/claims", post(build_claims))
        .route("/:address", get(list_positions))
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

/// GET /positions/:address - Every position NFT held by an address
pub async fn list_positions(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<PositionsResponse> {
    let ctx = market(&state).await?;

    let metadata = fetch_user_positions(ctx.client.as_ref(), &ctx.metadata, &address)
        .await
        .map_err(|e| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiError::unavailable(e.to_string())),
            )
        })?;

    // Claimability needs each position's bond; make sure the catalog exists
    ctx.bonds.fetch_all(false).await;
    let bonds_by_id = ctx.bonds.offers_by_id().await;
    let now = now_millis();

    let positions = metadata
        .iter()
        .map(|meta| {
            let claimable = bonds_by_id
                .get(&meta.position.bond_id)
                .is_some_and(|offer| bonds::is_claimable(&meta.position, offer, now));
            PositionDto::from_metadata(meta, claimable)
        })
        .collect();

    Ok(Json(PositionsResponse { positions }))
}

/// POST /positions/claims - Build a claim plan over a user's eligible positions.
///
/// "Nothing to claim" returns an empty plan with a message; it is an
/// informational outcome, not an error.
pub async fn build_claims(
    State(state): State<AppState>,
    Json(request): Json<ClaimPlanRequest>,
) -> ApiResult<ClaimPlanResponse> {
    let ctx = market(&state).await?;

    let metadata = fetch_user_positions(ctx.client.as_ref(), &ctx.metadata, &request.address)
        .await
        .map_err(|e| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiError::unavailable(e.to_string())),
            )
        })?;
    let positions: Vec<_> = metadata.into_iter().map(|meta| meta.position).collect();

    ctx.bonds.fetch_all(false).await;
    let bonds_by_id = ctx.bonds.offers_by_id().await;

    let market_contract = ctx.client.market_contract().clone();
    match build_claim_batch(
        &positions,
        &bonds_by_id,
        &market_contract,
        now_millis(),
        &GasParams::default(),
    ) {
        Ok(batch) => Ok(Json(ClaimPlanResponse {
            instructions: batch
                .instructions
                .iter()
                .map(|instr| ClaimInstructionDto {
                    nft_token_id: instr.nft_token_id.clone(),
                    contract: instr.instruction.contract.to_string(),
                    msg: instr.instruction.msg.clone(),
                })
                .collect(),
            estimated_gas: batch.estimated_gas,
            gas_limit: batch.gas_limit,
            invalidation_keys: batch
                .invalidation_keys
                .iter()
                .map(|(collection, token_id)| InvalidationKeyDto {
                    collection: collection.clone(),
                    token_id: token_id.clone(),
                })
                .collect(),
            message: None,
        })),
        Err(ClaimError::NoEligiblePositions) => Ok(Json(ClaimPlanResponse {
            instructions: Vec::new(),
            estimated_gas: 0,
            gas_limit: 0,
            invalidation_keys: Vec::new(),
            message: Some("no claim-eligible positions".to_string()),
        })),
        Err(e) => Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiError::new(e.error_code(), e.to_string())),
        )),
    }
}
