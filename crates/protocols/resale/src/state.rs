//! Resale market domain types

use bonds::{BondOffer, BondPosition};
use serde::{Deserialize, Serialize};

/// A secondary-market listing, normalized from the ledger's raw shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResaleOffer {
    pub bond_id: u64,
    pub nft_token_id: String,
    pub seller: String,
    /// Parsed asking price per raw token unit; display and ranking only
    pub price_per_bond: f64,
    /// Verbatim price string, used for execution amounts
    pub raw_price: String,
    pub price_denom: String,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
}

impl ResaleOffer {
    /// A listing past its end instant can no longer be bought.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.end_ms.is_some_and(|end| now_ms > end)
    }
}

/// A fully-resolved catalog entry: the listing joined to its originating
/// bond offer and the position's typed metadata. Listings that cannot be
/// joined never reach this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResaleListing {
    pub offer: ResaleOffer,
    pub bond: BondOffer,
    pub position: BondPosition,
    pub image: Option<String>,
}
