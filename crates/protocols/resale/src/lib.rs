//! Secondary Bond Market
//!
//! Holders list position NFTs for resale by transferring them to the market
//! contract with an embedded listing message; buyers take a listing over by
//! paying the asking price. This crate aggregates the resale catalog (each
//! listing joined to its originating bond offer and position metadata) and
//! shapes the listing/buy/cancel instructions.

pub mod aggregator;
pub mod fetch;
pub mod state;
pub mod tx_builder;

pub use aggregator::{ResaleCatalog, ResaleSnapshot};
pub use state::{ResaleListing, ResaleOffer};
pub use tx_builder::{build_buy_resale, build_cancel_resale, build_list_for_resale};

#[cfg(test)]
pub(crate) mod testing;
