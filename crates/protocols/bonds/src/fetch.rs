//! Bond catalog retrieval and normalization
//!
//! Pages through the ledger's listing endpoint with a cursor and merges the
//! results into a map keyed by bond id. The merge is last-write-wins per
//! key, so pagination overlap caused by concurrent ledger mutation can never
//! produce duplicates. Termination is "short page", not a total-count field.

use std::collections::BTreeMap;

use covenant_core::time::normalize_to_millis;
use covenant_core::{GatewayError, MarketError};
use ledger_client::queries::BondMarketQuery;
use ledger_client::RawBondOffer;

use crate::constants::{self, PAGE_SIZE};
use crate::state::BondOffer;

/// Normalize one raw offer into the domain shape.
pub fn parse_bond_offer(raw: &RawBondOffer) -> Result<BondOffer, MarketError> {
    let price: f64 = raw
        .price
        .trim()
        .parse()
        .map_err(|_| MarketError::malformed("bond offer", format!("price '{}'", raw.price)))?;
    if !price.is_finite() || price < 0.0 {
        return Err(MarketError::malformed(
            "bond offer",
            format!("price '{}' out of range", raw.price),
        ));
    }

    let total_amount = parse_raw_amount(&raw.total_amount, "total_amount")?;
    let remaining_supply = parse_raw_amount(&raw.remaining_supply, "remaining_supply")?;

    Ok(BondOffer {
        bond_id: raw.bond_id,
        issuer: raw.issuer.clone(),
        token_denom: raw.token_denom.clone(),
        purchase_denom: raw.purchase_denom.clone(),
        price,
        raw_price: raw.price.trim().to_string(),
        total_amount,
        remaining_supply,
        token_decimals: constants::denom_decimals(&raw.token_denom),
        purchase_start_ms: raw.purchase_start_time.as_deref().and_then(normalize_to_millis),
        purchase_end_ms: raw.purchase_end_time.as_deref().and_then(normalize_to_millis),
        claim_start_ms: raw.claim_start_time.as_deref().and_then(normalize_to_millis),
        maturity_ms: raw.maturity_date.as_deref().and_then(normalize_to_millis),
        closed: raw.closed,
    })
}

fn parse_raw_amount(raw: &str, field: &str) -> Result<u128, MarketError> {
    raw.trim()
        .parse()
        .map_err(|_| MarketError::malformed("bond offer", format!("{} '{}'", field, raw)))
}

/// Page through the full bond catalog.
///
/// Each page carries the fixed limit and a cursor equal to the previous
/// page's last bond id; a page shorter than the limit ends the walk.
/// Unparseable entries are skipped with a debug log rather than failing the
/// whole catalog.
pub async fn fetch_all_offers<G: BondMarketQuery + ?Sized>(
    gateway: &G,
) -> Result<BTreeMap<u64, BondOffer>, GatewayError> {
    let mut offers: BTreeMap<u64, BondOffer> = BTreeMap::new();
    let mut start_after: Option<u64> = None;

    loop {
        let page = gateway.list_bond_offers(PAGE_SIZE, start_after).await?;
        let page_len = page.len();

        for raw in &page {
            match parse_bond_offer(raw) {
                Ok(offer) => {
                    offers.insert(offer.bond_id, offer);
                }
                Err(e) => {
                    tracing::debug!(
                        bond_id = raw.bond_id,
                        error = %e,
                        "Skipping unparseable bond offer"
                    );
                }
            }
        }

        let next_cursor = page.last().map(|raw| raw.bond_id);
        if page_len < PAGE_SIZE as usize || next_cursor == start_after {
            break;
        }
        start_after = next_cursor;
    }

    Ok(offers)
}
