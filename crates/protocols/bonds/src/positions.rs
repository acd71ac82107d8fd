//! User position discovery
//!
//! Walks the ledger's per-user (bond, NFT) pair index with the same cursor
//! discipline as the catalog, then resolves each pair through the metadata
//! cache with a gateway fallback. Pairs that cannot be fully resolved are
//! dropped with a warning, never surfaced half-rendered.

use std::collections::HashSet;

use covenant_core::{ContractAddr, GatewayError};
use ledger_client::queries::BondMarketQuery;
use ledger_client::RawUserBondPair;

use crate::cache::MetadataCache;
use crate::constants::PAGE_SIZE;
use crate::nft;
use crate::state::PositionMetadata;

/// Fetch every position NFT held by `address`.
pub async fn fetch_user_positions<G: BondMarketQuery + ?Sized>(
    gateway: &G,
    metadata: &MetadataCache<PositionMetadata>,
    address: &str,
) -> Result<Vec<PositionMetadata>, GatewayError> {
    let pairs = fetch_all_pairs(gateway, address).await?;

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut positions = Vec::with_capacity(pairs.len());

    for pair in pairs {
        let key = (pair.contract_addr.clone(), pair.nft_id.clone());
        if !seen.insert(key) {
            continue;
        }

        if let Some(meta) = metadata.get(&pair.contract_addr, &pair.nft_id) {
            positions.push(meta);
            continue;
        }

        let collection = ContractAddr::new(pair.contract_addr.clone());
        let raw = match gateway.nft_info(&collection, &pair.nft_id).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    token_id = %pair.nft_id,
                    error = %e,
                    "Dropping position with unreachable metadata"
                );
                continue;
            }
        };

        match nft::parse_position_metadata(&pair.contract_addr, &pair.nft_id, &raw) {
            Ok(meta) => {
                metadata.insert(&pair.contract_addr, &pair.nft_id, meta.clone());
                positions.push(meta);
            }
            Err(e) => {
                tracing::warn!(
                    token_id = %pair.nft_id,
                    error = %e,
                    "Dropping position with malformed metadata"
                );
            }
        }
    }

    Ok(positions)
}

async fn fetch_all_pairs<G: BondMarketQuery + ?Sized>(
    gateway: &G,
    address: &str,
) -> Result<Vec<RawUserBondPair>, GatewayError> {
    let mut pairs = Vec::new();
    let mut start_after: Option<String> = None;

    loop {
        let page = gateway
            .bonds_by_user(address, PAGE_SIZE, start_after.as_deref())
            .await?;
        let page_len = page.len();

        let next_cursor = page.last().map(|p| p.nft_id.clone());
        pairs.extend(page);

        if page_len < PAGE_SIZE as usize || next_cursor == start_after {
            break;
        }
        start_after = next_cursor;
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{raw_nft_info, StubLedger};
    use ledger_client::RawUserBondPair;

    fn pair(nft_id: &str, bond_id: u64) -> RawUserBondPair {
        RawUserBondPair {
            bond_id,
            nft_id: nft_id.to_string(),
            contract_addr: "cov1nft".to_string(),
        }
    }

    #[tokio::test]
    async fn test_positions_resolve_through_cache() {
        let stub = StubLedger::default();
        stub.set_pairs(vec![pair("1", 10), pair("2", 11)]);
        stub.put_nft("cov1nft", "1", raw_nft_info(10, 1000, 0, "Vesting"));
        stub.put_nft("cov1nft", "2", raw_nft_info(11, 2000, 500, "Vesting"));

        let cache = MetadataCache::default();

        let first = fetch_user_positions(&stub, &cache, "cov1user").await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(stub.nft_calls(), 2);

        // Second walk is served from the cache
        let second = fetch_user_positions(&stub, &cache, "cov1user").await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(stub.nft_calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidation_forces_refetch() {
        let stub = StubLedger::default();
        stub.set_pairs(vec![pair("1", 10)]);
        stub.put_nft("cov1nft", "1", raw_nft_info(10, 1000, 0, "Vesting"));

        let cache = MetadataCache::default();
        fetch_user_positions(&stub, &cache, "cov1user").await.unwrap();
        assert_eq!(stub.nft_calls(), 1);

        // A claim mutated the NFT remotely; the caller invalidates its key
        stub.put_nft("cov1nft", "1", raw_nft_info(10, 1000, 1000, "Claimed"));
        cache.invalidate("cov1nft", "1");

        let refreshed = fetch_user_positions(&stub, &cache, "cov1user").await.unwrap();
        assert_eq!(stub.nft_calls(), 2);
        assert!(refreshed[0].position.status.is_claimed());
    }

    #[tokio::test]
    async fn test_unresolvable_pairs_are_dropped() {
        let stub = StubLedger::default();
        stub.set_pairs(vec![pair("1", 10), pair("2", 11)]);
        stub.put_nft("cov1nft", "1", raw_nft_info(10, 1000, 0, "Vesting"));
        // Token 2 has no metadata on the ledger

        let cache = MetadataCache::default();
        let positions = fetch_user_positions(&stub, &cache, "cov1user").await.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].position.nft_token_id, "1");
    }

    #[tokio::test]
    async fn test_duplicate_pairs_resolve_once() {
        let stub = StubLedger::default();
        stub.set_pairs(vec![pair("1", 10), pair("1", 10)]);
        stub.put_nft("cov1nft", "1", raw_nft_info(10, 1000, 0, "Vesting"));

        let cache = MetadataCache::default();
        let positions = fetch_user_positions(&stub, &cache, "cov1user").await.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(stub.nft_calls(), 1);
    }
}
