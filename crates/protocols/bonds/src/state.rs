//! Bond market domain types
//!
//! Normalized counterparts of the raw ledger shapes: timestamps in Unix
//! milliseconds, amounts as raw u128 units, prices parsed for analytics with
//! the verbatim string kept for execution math.

use serde::{Deserialize, Serialize};

/// A bond offer, normalized from the ledger's raw shape.
///
/// The ledger owns this record; the client holds a read-through cached copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondOffer {
    pub bond_id: u64,
    pub issuer: String,
    /// Denom of the asset being sold
    pub token_denom: String,
    /// Denom the buyer pays with
    pub purchase_denom: String,
    /// Parsed exchange price; display and ranking only
    pub price: f64,
    /// Verbatim price string, used for execution amounts
    pub raw_price: String,
    /// Issued supply in raw token units
    pub total_amount: u128,
    /// Unsold supply in raw token units; only the ledger decreases this
    pub remaining_supply: u128,
    /// Decimal precision of the token denom
    pub token_decimals: u8,
    pub purchase_start_ms: Option<i64>,
    pub purchase_end_ms: Option<i64>,
    pub claim_start_ms: Option<i64>,
    pub maturity_ms: Option<i64>,
    /// Set once when the issuer withdraws post-maturity
    pub closed: bool,
}

/// Ledger-reported position state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionStatus {
    Vesting,
    Claimed,
    Listed,
    Other(String),
}

impl PositionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "vesting" => Self::Vesting,
            "claimed" => Self::Claimed,
            "listed" => Self::Listed,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn is_claimed(&self) -> bool {
        matches!(self, Self::Claimed)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Vesting => "Vesting",
            Self::Claimed => "Claimed",
            Self::Listed => "Listed",
            Self::Other(s) => s,
        }
    }
}

/// One NFT-backed purchase against a bond offer.
///
/// `claimed_amount` never exceeds `amount`; a violation of that invariant is
/// rejected at parse time as a malformed record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondPosition {
    pub bond_id: u64,
    /// Unique within `collection`; idempotence key for claims
    pub nft_token_id: String,
    /// cw721 collection holding the NFT
    pub collection: String,
    /// Purchased quantity in raw token units
    pub amount: u128,
    /// Monotonically non-decreasing; mutated only by successful claims
    pub claimed_amount: u128,
    pub purchase_time_ms: Option<i64>,
    pub status: PositionStatus,
}

impl BondPosition {
    /// Raw units still unclaimed
    pub fn unclaimed(&self) -> u128 {
        self.amount.saturating_sub(self.claimed_amount)
    }
}

/// Typed projection of a position NFT's metadata.
///
/// Built once from the raw attribute array right after fetch; downstream
/// code never re-scans `{trait_type, value}` pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionMetadata {
    pub position: BondPosition,
    pub image: Option<String>,
}
