//! Market constants and the denom registry

use std::time::Duration;

/// Fixed page size for cursor-paginated catalog queries
pub const PAGE_SIZE: u32 = 30;

/// Freshness window for the full-catalog materialization
pub const CATALOG_TTL: Duration = Duration::from_secs(300);

/// Freshness window for cached NFT metadata
pub const METADATA_TTL: Duration = Duration::from_secs(300);

/// Ceiling on cached metadata entries; oldest entries are evicted beyond this
pub const METADATA_CACHE_CAP: usize = 4096;

/// Remaining supply below this many display units counts as sold out.
/// The ledger's fixed-point accounting leaves dust after the last purchase.
pub const SUPPLY_DUST_EPSILON: f64 = 1e-5;

/// Decimals assumed for denoms missing from the registry
pub const DEFAULT_DECIMALS: u8 = 6;

/// Gas budget knobs for claim batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasParams {
    /// Additive per-claim gas estimate
    pub per_instruction: u64,
    /// Hard ceiling imposed by the execution environment
    pub absolute_max: u64,
}

impl Default for GasParams {
    fn default() -> Self {
        Self {
            per_instruction: 750_000,
            absolute_max: 3_000_000,
        }
    }
}

/// A denom the market is known to trade in
#[derive(Debug, Clone, Copy)]
pub struct DenomInfo {
    pub denom: &'static str,
    /// Human display symbol
    pub symbol: &'static str,
    pub decimals: u8,
    /// Lowercase symbol used for spot-price lookups
    pub price_symbol: &'static str,
}

/// Registry of denoms with known metadata.
///
/// The IBC voucher for ATOM resolves to the same market symbol as the native
/// denom: price feeds quote "atom" regardless of which hop the asset took.
pub const KNOWN_DENOMS: &[DenomInfo] = &[
    DenomInfo {
        denom: "uatom",
        symbol: "ATOM",
        decimals: 6,
        price_symbol: "atom",
    },
    DenomInfo {
        denom: "ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2",
        symbol: "ATOM",
        decimals: 6,
        price_symbol: "atom",
    },
    DenomInfo {
        denom: "uusdc",
        symbol: "USDC",
        decimals: 6,
        price_symbol: "usdc",
    },
    DenomInfo {
        denom: "uosmo",
        symbol: "OSMO",
        decimals: 6,
        price_symbol: "osmo",
    },
    DenomInfo {
        denom: "untrn",
        symbol: "NTRN",
        decimals: 6,
        price_symbol: "ntrn",
    },
];

/// Look up a denom in the registry
pub fn denom_info(denom: &str) -> Option<&'static DenomInfo> {
    KNOWN_DENOMS.iter().find(|d| d.denom == denom)
}

/// Decimal precision for a denom, defaulting when unknown
pub fn denom_decimals(denom: &str) -> u8 {
    denom_info(denom).map(|d| d.decimals).unwrap_or(DEFAULT_DECIMALS)
}

/// Canonical lowercase price-lookup symbol for a denom.
///
/// Unknown micro-denoms ("ufoo") drop their `u` prefix; anything else is
/// lowercased as-is.
pub fn price_symbol(denom: &str) -> String {
    if let Some(info) = denom_info(denom) {
        return info.price_symbol.to_string();
    }

    let stripped = denom
        .strip_prefix('u')
        .filter(|rest| rest.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(denom);
    stripped.to_ascii_lowercase()
}
