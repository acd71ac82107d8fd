//! Primary Bond Market Engine
//!
//! Issuers open bond offers: a fixed price, a supply, and a set of time
//! windows. Buyers purchase during the window and receive a position NFT
//! whose attributes (amount, claimed amount, status) mutate on the ledger as
//! the position vests and is claimed.
//!
//! This crate owns the client-side view of that market:
//!
//! - Catalog aggregation with cursor pagination, a freshness TTL, and an
//!   at-most-one-in-flight fetch guarantee
//! - A TTL metadata cache for position NFTs with explicit invalidation
//! - Pure lifecycle derivation from timestamps and supply counters
//! - Discount/premium analytics against external spot prices
//! - Claim batch construction with gas budgeting

pub mod aggregator;
pub mod cache;
pub mod calculator;
pub mod constants;
pub mod fetch;
pub mod lifecycle;
pub mod nft;
pub mod positions;
pub mod state;
pub mod tx_builder;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::{BondCatalog, CatalogSnapshot};
pub use cache::MetadataCache;
pub use calculator::discount_pct;
pub use constants::GasParams;
pub use lifecycle::{is_claimable, status, BondStatus};
pub use positions::fetch_user_positions;
pub use state::{BondOffer, BondPosition, PositionMetadata, PositionStatus};
pub use tx_builder::{
    build_claim_batch, build_purchase, ensure_within_ceiling, ClaimBatch, ClaimInstruction,
};
