//! Discount/premium analytics
//!
//! Pure math against externally-supplied spot prices. No I/O, no async.
//! Results rank and label offers in the catalog; execution amounts never
//! come from here.

use crate::constants::price_symbol;
use crate::state::BondOffer;

/// Signed percentage between a bond's implied USD price and the listed
/// asset's spot price. Negative = discount (bond cheaper than market),
/// positive = premium.
///
/// Returns `None` when either spot price is unavailable or degenerate;
/// a value is never fabricated.
pub fn discount_pct<F>(offer: &BondOffer, spot: F) -> Option<f64>
where
    F: Fn(&str) -> Option<f64>,
{
    let payment_spot = spot(&price_symbol(&offer.purchase_denom))?;
    let listed_spot = spot(&price_symbol(&offer.token_denom))?;

    if payment_spot <= 0.0 || listed_spot <= 0.0 {
        return None;
    }

    let usd_bond_price = offer.price * payment_spot;
    Some((usd_bond_price - listed_spot) / listed_spot * 100.0)
}
