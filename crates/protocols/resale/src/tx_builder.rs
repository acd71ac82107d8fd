//! Resale listing, purchase, and cancellation builders
//!
//! Listing rides a cw721 `send_nft` with the listing terms base64-embedded;
//! the market contract takes custody of the NFT while the listing is open.
//! No function here performs I/O.

use bonds::tx_builder::parse_decimal;
use bonds::BondPosition;
use covenant_core::{Coin, ContractAddr, MarketError};
use ledger_client::execute;
use ledger_client::ExecuteInstruction;
use serde_json::json;

use crate::state::ResaleOffer;

/// Terms for a new listing.
#[derive(Debug, Clone)]
pub struct ListingTerms {
    /// Asking price per raw token unit, as a decimal string
    pub price_per_bond: String,
    pub price_denom: String,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
}

/// Build the `send_nft` instruction that opens a listing.
pub fn build_list_for_resale(
    collection: &ContractAddr,
    market: &ContractAddr,
    nft_token_id: &str,
    terms: &ListingTerms,
    now_ms: i64,
) -> Result<ExecuteInstruction, MarketError> {
    let price: f64 = terms
        .price_per_bond
        .trim()
        .parse()
        .unwrap_or(f64::NAN);
    if !price.is_finite() || price <= 0.0 {
        return Err(MarketError::InvalidAmount {
            message: format!("asking price '{}' must be positive", terms.price_per_bond),
        });
    }

    if let (Some(start), Some(end)) = (terms.start_ms, terms.end_ms) {
        if end <= start {
            return Err(MarketError::ActionNotAllowed {
                reason: "listing window ends before it starts".to_string(),
            });
        }
    }
    if terms.end_ms.is_some_and(|end| end <= now_ms) {
        return Err(MarketError::ActionNotAllowed {
            reason: "listing window already over".to_string(),
        });
    }

    let mut listing = json!({
        "price_per_bond": terms.price_per_bond.trim(),
        "price_denom": terms.price_denom,
    });
    if let Some(start) = terms.start_ms {
        listing["start_time"] = json!(start.to_string());
    }
    if let Some(end) = terms.end_ms {
        listing["end_time"] = json!(end.to_string());
    }

    Ok(execute::send_nft(
        collection,
        market,
        nft_token_id,
        &json!({ "list_resale": listing }),
    ))
}

/// Build the buy instruction for an open listing.
///
/// Funds are exact integer math over the verbatim asking price and the
/// position's unclaimed amount, rounded up so the buyer never underpays.
pub fn build_buy_resale(
    market: &ContractAddr,
    offer: &ResaleOffer,
    position: &BondPosition,
    now_ms: i64,
) -> Result<ExecuteInstruction, MarketError> {
    if offer.is_expired(now_ms) {
        return Err(MarketError::ActionNotAllowed {
            reason: format!("listing for token {} has expired", offer.nft_token_id),
        });
    }
    if offer.start_ms.is_some_and(|start| now_ms < start) {
        return Err(MarketError::ActionNotAllowed {
            reason: format!("listing for token {} is not open yet", offer.nft_token_id),
        });
    }

    let (numerator, scale) = parse_decimal(&offer.raw_price).ok_or_else(|| {
        MarketError::malformed("resale offer", format!("price '{}'", offer.raw_price))
    })?;

    let divisor = 10u128.pow(scale);
    let cost = position
        .unclaimed()
        .checked_mul(numerator)
        .map(|product| product.div_ceil(divisor))
        .ok_or_else(|| MarketError::InvalidAmount {
            message: "resale cost overflows".to_string(),
        })?;
    if cost == 0 {
        return Err(MarketError::InvalidAmount {
            message: "listing has nothing left to sell".to_string(),
        });
    }

    Ok(execute::buy_resale(
        market,
        &offer.nft_token_id,
        vec![Coin::new(offer.price_denom.clone(), cost)],
    ))
}

/// Build the cancellation that returns the NFT to its seller.
pub fn build_cancel_resale(market: &ContractAddr, nft_token_id: &str) -> ExecuteInstruction {
    execute::cancel_resale(market, nft_token_id)
}
