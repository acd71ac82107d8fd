//! Data Transfer Objects for API requests and responses

use std::collections::HashMap;

use bonds::{BondOffer, BondPosition, BondStatus, PositionMetadata};
use resale::ResaleListing;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new("ledger_unavailable", message)
    }
}

/// A bond offer annotated with its derived status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondDto {
    pub bond_id: u64,
    pub issuer: String,
    pub token_denom: String,
    pub purchase_denom: String,
    pub price: f64,
    pub total_amount: String,
    pub remaining_supply: String,
    pub token_decimals: u8,
    pub purchase_start_ms: Option<i64>,
    pub purchase_end_ms: Option<i64>,
    pub claim_start_ms: Option<i64>,
    pub maturity_ms: Option<i64>,
    pub closed: bool,
    pub status: BondStatus,
}

impl BondDto {
    pub fn from_offer(offer: &BondOffer, now_ms: i64) -> Self {
        Self {
            bond_id: offer.bond_id,
            issuer: offer.issuer.clone(),
            token_denom: offer.token_denom.clone(),
            purchase_denom: offer.purchase_denom.clone(),
            price: offer.price,
            total_amount: offer.total_amount.to_string(),
            remaining_supply: offer.remaining_supply.to_string(),
            token_decimals: offer.token_decimals,
            purchase_start_ms: offer.purchase_start_ms,
            purchase_end_ms: offer.purchase_end_ms,
            claim_start_ms: offer.claim_start_ms,
            maturity_ms: offer.maturity_ms,
            closed: offer.closed,
            status: bonds::status(offer, now_ms),
        }
    }
}

/// Full catalog response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub bonds: Vec<BondDto>,
    pub is_fetching: bool,
}

/// One position NFT
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDto {
    pub bond_id: u64,
    pub nft_token_id: String,
    pub collection: String,
    pub amount: String,
    pub claimed_amount: String,
    pub purchase_time_ms: Option<i64>,
    pub status: String,
    pub claimable: bool,
    pub image: Option<String>,
}

impl PositionDto {
    pub fn from_metadata(meta: &PositionMetadata, claimable: bool) -> Self {
        let position: &BondPosition = &meta.position;
        Self {
            bond_id: position.bond_id,
            nft_token_id: position.nft_token_id.clone(),
            collection: position.collection.clone(),
            amount: position.amount.to_string(),
            claimed_amount: position.claimed_amount.to_string(),
            purchase_time_ms: position.purchase_time_ms,
            status: position.status.label().to_string(),
            claimable,
            image: meta.image.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsResponse {
    pub positions: Vec<PositionDto>,
}

/// One fully-joined resale listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResaleListingDto {
    pub bond_id: u64,
    pub nft_token_id: String,
    pub seller: String,
    pub price_per_bond: f64,
    pub price_denom: String,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub bond: BondDto,
    pub position: PositionDto,
}

impl ResaleListingDto {
    pub fn from_listing(listing: &ResaleListing, now_ms: i64) -> Self {
        let claimable = bonds::is_claimable(&listing.position, &listing.bond, now_ms);
        let meta = PositionMetadata {
            position: listing.position.clone(),
            image: listing.image.clone(),
        };
        Self {
            bond_id: listing.offer.bond_id,
            nft_token_id: listing.offer.nft_token_id.clone(),
            seller: listing.offer.seller.clone(),
            price_per_bond: listing.offer.price_per_bond,
            price_denom: listing.offer.price_denom.clone(),
            start_ms: listing.offer.start_ms,
            end_ms: listing.offer.end_ms,
            bond: BondDto::from_offer(&listing.bond, now_ms),
            position: PositionDto::from_metadata(&meta, claimable),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResaleCatalogResponse {
    pub listings: Vec<ResaleListingDto>,
    pub is_fetching: bool,
}

/// Spot prices keyed by lowercase market symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountRequest {
    pub prices: HashMap<String, f64>,
}

/// Discount percentages keyed by bond id (stringified for JSON object keys)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountResponse {
    pub discounts: HashMap<String, f64>,
}

/// Claim plan request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimPlanRequest {
    pub address: String,
}

/// Claim plan response.
///
/// An empty instruction list with a message is the "nothing to claim"
/// outcome; it is informational, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimPlanResponse {
    pub instructions: Vec<ClaimInstructionDto>,
    pub estimated_gas: u64,
    pub gas_limit: u64,
    pub invalidation_keys: Vec<InvalidationKeyDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimInstructionDto {
    pub nft_token_id: String,
    pub contract: String,
    pub msg: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationKeyDto {
    pub collection: String,
    pub token_id: String,
}

/// Chain configuration swap request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfigRequest {
    pub lcd_url: String,
    pub network: covenant_core::Network,
    pub market_contract: String,
    pub nft_contract: String,
}
