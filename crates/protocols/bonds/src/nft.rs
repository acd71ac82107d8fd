//! Position NFT metadata projection
//!
//! The collection reports position state as a dynamic attribute list of
//! `{trait_type, value}` pairs. This module scans that list exactly once,
//! right after fetch, into a typed `BondPosition`; nothing downstream ever
//! touches the raw array again.

use covenant_core::time::normalize_to_millis;
use covenant_core::MarketError;
use ledger_client::RawNftInfo;

use crate::state::{BondPosition, PositionMetadata, PositionStatus};

/// Attribute names written by the market contract's minter
mod traits {
    pub const BOND_ID: &str = "bond_id";
    pub const AMOUNT: &str = "amount";
    pub const CLAIMED_AMOUNT: &str = "claimed_amount";
    pub const PURCHASE_TIME: &str = "purchase_time";
    pub const STATUS: &str = "status";
}

/// Project a raw cw721 response into typed position metadata.
///
/// `bond_id` and `amount` are required; a missing `claimed_amount` reads as
/// zero. `claimed_amount > amount` marks the record malformed rather than
/// propagating an impossible state.
pub fn parse_position_metadata(
    collection: &str,
    token_id: &str,
    raw: &RawNftInfo,
) -> Result<PositionMetadata, MarketError> {
    let mut bond_id: Option<u64> = None;
    let mut amount: Option<u128> = None;
    let mut claimed_amount: u128 = 0;
    let mut purchase_time_ms: Option<i64> = None;
    let mut status = PositionStatus::Vesting;

    for attr in &raw.extension.attributes {
        match attr.trait_type.as_str() {
            traits::BOND_ID => {
                bond_id = Some(parse_attr(&attr.value, traits::BOND_ID, token_id)?);
            }
            traits::AMOUNT => {
                amount = Some(parse_attr(&attr.value, traits::AMOUNT, token_id)?);
            }
            traits::CLAIMED_AMOUNT => {
                claimed_amount = parse_attr(&attr.value, traits::CLAIMED_AMOUNT, token_id)?;
            }
            traits::PURCHASE_TIME => {
                purchase_time_ms = normalize_to_millis(&attr.value);
            }
            traits::STATUS => {
                status = PositionStatus::parse(&attr.value);
            }
            _ => {}
        }
    }

    let bond_id = bond_id.ok_or_else(|| missing(traits::BOND_ID, token_id))?;
    let amount = amount.ok_or_else(|| missing(traits::AMOUNT, token_id))?;

    if claimed_amount > amount {
        return Err(MarketError::malformed(
            "position",
            format!(
                "token {}: claimed {} exceeds amount {}",
                token_id, claimed_amount, amount
            ),
        ));
    }

    Ok(PositionMetadata {
        position: BondPosition {
            bond_id,
            nft_token_id: token_id.to_string(),
            collection: collection.to_string(),
            amount,
            claimed_amount,
            purchase_time_ms,
            status,
        },
        image: raw.extension.image.clone(),
    })
}

fn parse_attr<N: std::str::FromStr>(
    value: &str,
    name: &str,
    token_id: &str,
) -> Result<N, MarketError> {
    value.trim().parse().map_err(|_| {
        MarketError::malformed(
            "position",
            format!("token {}: attribute {} = '{}'", token_id, name, value),
        )
    })
}

fn missing(name: &str, token_id: &str) -> MarketError {
    MarketError::malformed(
        "position",
        format!("token {}: attribute {} missing", token_id, name),
    )
}
