//! Resale listing normalization

use covenant_core::time::normalize_to_millis;
use covenant_core::MarketError;
use ledger_client::RawResaleOffer;

use crate::state::ResaleOffer;

/// Normalize one raw listing into the domain shape.
pub fn parse_resale_offer(raw: &RawResaleOffer) -> Result<ResaleOffer, MarketError> {
    let price: f64 = raw.price_per_bond.trim().parse().map_err(|_| {
        MarketError::malformed(
            "resale offer",
            format!("price_per_bond '{}'", raw.price_per_bond),
        )
    })?;
    if !price.is_finite() || price <= 0.0 {
        return Err(MarketError::malformed(
            "resale offer",
            format!("price_per_bond '{}' out of range", raw.price_per_bond),
        ));
    }

    Ok(ResaleOffer {
        bond_id: raw.bond_id,
        nft_token_id: raw.nft_token_id.clone(),
        seller: raw.seller.clone(),
        price_per_bond: price,
        raw_price: raw.price_per_bond.trim().to_string(),
        price_denom: raw.price_denom.clone(),
        start_ms: raw.start_time.as_deref().and_then(normalize_to_millis),
        end_ms: raw.end_time.as_deref().and_then(normalize_to_millis),
    })
}
