//! Claim and purchase instruction building
//!
//! Shapes execute instructions from the annotated, filtered record set. All
//! validation happens here, before anything reaches the wallet bridge; no
//! function in this module performs I/O.

use std::collections::BTreeMap;

use covenant_core::{ClaimError, Coin, ContractAddr, MarketError};
use ledger_client::execute;
use ledger_client::{ExecuteBatch, ExecuteInstruction};

use crate::constants::GasParams;
use crate::lifecycle::{self, BondStatus};
use crate::state::{BondOffer, BondPosition};

/// One claim instruction tagged with its idempotence key.
#[derive(Debug, Clone)]
pub struct ClaimInstruction {
    /// Idempotence/tracing key: unique per position within its collection
    pub nft_token_id: String,
    pub collection: String,
    pub instruction: ExecuteInstruction,
}

/// An ordered claim plan bounded by a gas ceiling.
#[derive(Debug, Clone)]
pub struct ClaimBatch {
    pub instructions: Vec<ClaimInstruction>,
    /// Additive per-instruction estimate, unclamped
    pub estimated_gas: u64,
    /// Gas limit to submit: the estimate clamped to the hard ceiling
    pub gas_limit: u64,
    /// MetadataCache keys the caller must invalidate after the batch lands;
    /// the builder reports what changed, cache policy stays with the caller
    pub invalidation_keys: Vec<(String, String)>,
}

impl ClaimBatch {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The wallet-facing `executeMultiple` batch, in claim order.
    pub fn to_execute_batch(&self) -> ExecuteBatch {
        ExecuteBatch::new(
            self.instructions
                .iter()
                .map(|claim| claim.instruction.clone())
                .collect(),
        )
    }
}

/// Build a claim plan over every eligible position.
///
/// Ineligible positions (unknown bond, ledger-reported `Claimed`, claim
/// window not open, nothing left to claim) are excluded silently; an empty
/// eligible set is the `NoEligiblePositions` outcome, not a failure.
pub fn build_claim_batch(
    positions: &[BondPosition],
    bonds_by_id: &BTreeMap<u64, BondOffer>,
    market: &ContractAddr,
    now_ms: i64,
    gas: &GasParams,
) -> Result<ClaimBatch, ClaimError> {
    let mut instructions = Vec::new();
    let mut invalidation_keys = Vec::new();

    for position in positions {
        let Some(offer) = bonds_by_id.get(&position.bond_id) else {
            continue;
        };
        if !lifecycle::is_claimable(position, offer, now_ms) {
            continue;
        }

        instructions.push(ClaimInstruction {
            nft_token_id: position.nft_token_id.clone(),
            collection: position.collection.clone(),
            instruction: execute::claim(market, position.bond_id, &position.nft_token_id),
        });
        invalidation_keys.push((position.collection.clone(), position.nft_token_id.clone()));
    }

    if instructions.is_empty() {
        return Err(ClaimError::NoEligiblePositions);
    }

    let estimated_gas = gas.per_instruction.saturating_mul(instructions.len() as u64);
    let gas_limit = estimated_gas.min(gas.absolute_max);

    Ok(ClaimBatch {
        instructions,
        estimated_gas,
        gas_limit,
        invalidation_keys,
    })
}

/// Pre-broadcast check against a ledger gas simulation.
///
/// The additive estimate in the plan is clamped, but a simulation that
/// reports a requirement above the hard ceiling means the batch cannot land
/// at all: fail fast so the caller splits it instead of burning fees on a
/// guaranteed out-of-gas.
pub fn ensure_within_ceiling(simulated_gas: u64, gas: &GasParams) -> Result<(), ClaimError> {
    if simulated_gas > gas.absolute_max {
        return Err(ClaimError::GasCeilingExceeded {
            estimated: simulated_gas,
            ceiling: gas.absolute_max,
        });
    }
    Ok(())
}

/// Build a primary-market purchase for `quantity` raw token units.
///
/// The payment amount comes from exact integer math over the verbatim price
/// string; the parsed f64 price is display-only and never touches funds.
/// Cost rounds up so the buyer can never underpay by a dust unit.
pub fn build_purchase(
    offer: &BondOffer,
    market: &ContractAddr,
    quantity: u128,
    now_ms: i64,
) -> Result<ExecuteInstruction, MarketError> {
    if quantity == 0 {
        return Err(MarketError::InvalidAmount {
            message: "purchase quantity must be positive".to_string(),
        });
    }
    if quantity > offer.remaining_supply {
        return Err(MarketError::InvalidAmount {
            message: format!(
                "quantity {} exceeds remaining supply {}",
                quantity, offer.remaining_supply
            ),
        });
    }

    let status = lifecycle::status(offer, now_ms);
    if status != BondStatus::Active {
        return Err(MarketError::ActionNotAllowed {
            reason: format!("bond {} is {}", offer.bond_id, status.as_str()),
        });
    }

    let (numerator, scale) = parse_decimal(&offer.raw_price).ok_or_else(|| {
        MarketError::malformed("bond offer", format!("price '{}'", offer.raw_price))
    })?;

    let divisor = 10u128.pow(scale);
    let cost = quantity
        .checked_mul(numerator)
        .map(|product| product.div_ceil(divisor))
        .ok_or_else(|| MarketError::InvalidAmount {
            message: "purchase cost overflows".to_string(),
        })?;

    Ok(execute::purchase(
        market,
        offer.bond_id,
        vec![Coin::new(offer.purchase_denom.clone(), cost)],
    ))
}

/// Split a decimal string into (numerator, scale): "0.95" -> (95, 2).
///
/// Execution math runs on these integers; f64 prices never touch funds.
pub fn parse_decimal(raw: &str) -> Option<(u128, u32)> {
    let raw = raw.trim();
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, f),
        None => (raw, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    // Scales beyond 38 would overflow the u128 divisor anyway
    if frac_part.len() > 38 {
        return None;
    }

    let mut digits = String::with_capacity(int_part.len() + frac_part.len());
    digits.push_str(int_part);
    digits.push_str(frac_part);
    if digits.is_empty() {
        return None;
    }

    let numerator: u128 = digits.parse().ok()?;
    Some((numerator, frac_part.len() as u32))
}
