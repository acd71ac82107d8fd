//! Bond lifecycle derivation
//!
//! Pure functions from timestamps and supply counters to a discrete status.
//! No I/O, no clock access; callers pass `now` explicitly.

use serde::{Deserialize, Serialize};

use crate::constants::SUPPLY_DUST_EPSILON;
use crate::state::{BondOffer, BondPosition};

/// Temporal state of a bond offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BondStatus {
    Unknown,
    Upcoming,
    SoldOut,
    Active,
    Ended,
    Matured,
}

impl BondStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Upcoming => "upcoming",
            Self::SoldOut => "soldOut",
            Self::Active => "active",
            Self::Ended => "ended",
            Self::Matured => "matured",
        }
    }
}

/// Remaining supply in display units (raw units scaled by decimals)
pub fn remaining_supply_units(offer: &BondOffer) -> f64 {
    offer.remaining_supply as f64 / 10f64.powi(offer.token_decimals as i32)
}

/// Derive a bond's status at `now_ms`.
///
/// First match wins; the order is the tie-break policy. In particular a
/// sold-out bond still inside its purchase window reports `SoldOut`, never
/// `Active`, so buyers are not shown an orderable-but-empty offer. Supply is
/// compared against a dust epsilon rather than exact zero to absorb
/// fixed-point rounding left by the last purchase.
pub fn status(offer: &BondOffer, now_ms: i64) -> BondStatus {
    let (Some(start), Some(end), Some(maturity)) = (
        offer.purchase_start_ms,
        offer.purchase_end_ms,
        offer.maturity_ms,
    ) else {
        return BondStatus::Unknown;
    };

    if now_ms < start {
        return BondStatus::Upcoming;
    }
    if remaining_supply_units(offer) < SUPPLY_DUST_EPSILON {
        return BondStatus::SoldOut;
    }
    if now_ms <= end {
        return BondStatus::Active;
    }
    if now_ms <= maturity {
        return BondStatus::Ended;
    }
    BondStatus::Matured
}

/// Whether a position can be claimed at `now_ms`.
///
/// Requires the bond's claim window to have opened and unclaimed amount to
/// remain; a ledger-reported `Claimed` status short-circuits regardless of
/// the counters.
pub fn is_claimable(position: &BondPosition, offer: &BondOffer, now_ms: i64) -> bool {
    if position.status.is_claimed() {
        return false;
    }
    let Some(claim_start) = offer.claim_start_ms else {
        return false;
    };
    now_ms >= claim_start && position.claimed_amount < position.amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PositionStatus;
    use crate::testing::offer_with_windows;
    use covenant_core::time::DAY_MS;

    const T0: i64 = 1_700_000_000_000;

    fn position(amount: u128, claimed: u128, status: PositionStatus) -> BondPosition {
        BondPosition {
            bond_id: 1,
            nft_token_id: "1".into(),
            collection: "cov1nft".into(),
            amount,
            claimed_amount: claimed,
            purchase_time_ms: Some(T0),
            status,
        }
    }

    #[test]
    fn test_missing_timestamps_are_unknown() {
        let mut offer = offer_with_windows(T0 - DAY_MS, T0 + DAY_MS, T0 + 3 * DAY_MS);
        offer.maturity_ms = None;
        assert_eq!(status(&offer, T0), BondStatus::Unknown);
    }

    #[test]
    fn test_upcoming_before_window() {
        let offer = offer_with_windows(T0 + DAY_MS, T0 + 2 * DAY_MS, T0 + 5 * DAY_MS);
        assert_eq!(status(&offer, T0), BondStatus::Upcoming);
    }

    #[test]
    fn test_sold_out_beats_active_inside_window() {
        let mut offer = offer_with_windows(T0 - DAY_MS, T0 + DAY_MS, T0 + 3 * DAY_MS);
        offer.remaining_supply = 0;
        assert_eq!(status(&offer, T0), BondStatus::SoldOut);
    }

    #[test]
    fn test_dust_supply_counts_as_sold_out() {
        let mut offer = offer_with_windows(T0 - DAY_MS, T0 + DAY_MS, T0 + 3 * DAY_MS);
        // 3 raw units at 6 decimals = 3e-6 display units, below the epsilon
        offer.remaining_supply = 3;
        assert_eq!(status(&offer, T0), BondStatus::SoldOut);
    }

    #[test]
    fn test_window_progression() {
        // purchase T0-1d..T0+1d, claim T0+2d, maturity T0+3d
        let mut offer = offer_with_windows(T0 - DAY_MS, T0 + DAY_MS, T0 + 3 * DAY_MS);
        offer.claim_start_ms = Some(T0 + 2 * DAY_MS);
        offer.remaining_supply = 500_000;

        assert_eq!(status(&offer, T0), BondStatus::Active);
        assert_eq!(status(&offer, T0 + DAY_MS * 3 / 2), BondStatus::Ended);
        assert_eq!(status(&offer, T0 + 4 * DAY_MS), BondStatus::Matured);

        // At T0+2.5d an untouched position is claim-eligible
        let pos = position(500_000, 0, PositionStatus::Vesting);
        assert!(is_claimable(&pos, &offer, T0 + DAY_MS * 5 / 2));
    }

    #[test]
    fn test_boundary_instants() {
        let offer = offer_with_windows(T0, T0 + DAY_MS, T0 + 2 * DAY_MS);
        // Window edges are inclusive on both ends of the active range
        assert_eq!(status(&offer, T0), BondStatus::Active);
        assert_eq!(status(&offer, T0 + DAY_MS), BondStatus::Active);
        assert_eq!(status(&offer, T0 + DAY_MS + 1), BondStatus::Ended);
        assert_eq!(status(&offer, T0 + 2 * DAY_MS), BondStatus::Ended);
        assert_eq!(status(&offer, T0 + 2 * DAY_MS + 1), BondStatus::Matured);
    }

    #[test]
    fn test_claimable_predicate() {
        let mut offer = offer_with_windows(T0 - DAY_MS, T0 + DAY_MS, T0 + 3 * DAY_MS);
        offer.claim_start_ms = Some(T0);

        // Fully claimed counters exclude the position
        let done = position(100, 100, PositionStatus::Vesting);
        assert!(!is_claimable(&done, &offer, T0 + 1));

        // Ledger-reported Claimed status excludes it too
        let flagged = position(100, 50, PositionStatus::Claimed);
        assert!(!is_claimable(&flagged, &offer, T0 + 1));

        // Before the claim window opens
        let pos = position(100, 0, PositionStatus::Vesting);
        assert!(!is_claimable(&pos, &offer, T0 - 1));
        assert!(is_claimable(&pos, &offer, T0));
    }
}
