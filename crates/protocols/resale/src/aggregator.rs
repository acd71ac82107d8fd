//! Resale catalog aggregator
//!
//! Same fetch-once/TTL/generation discipline as the bond catalog, with a
//! join step: every listing resolves its originating bond through the bond
//! catalog's cached path and its position metadata through the shared
//! metadata cache (gateway fallback populates it). Listings that cannot be
//! fully resolved are dropped with a warning; the catalog never surfaces an
//! entry a consumer cannot fully render.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bonds::{BondCatalog, MetadataCache, PositionMetadata};
use covenant_core::time::now_millis;
use covenant_core::{ContractAddr, GatewayError};
use ledger_client::queries::BondMarketQuery;
use tokio::sync::RwLock;

use crate::fetch::parse_resale_offer;
use crate::state::ResaleListing;

/// Freshness window for the resale materialization
const RESALE_TTL: Duration = Duration::from_secs(300);

/// A point-in-time view of the resale catalog.
#[derive(Debug, Clone)]
pub struct ResaleSnapshot {
    pub listings: Vec<ResaleListing>,
    pub is_fetching: bool,
    pub age: Option<Duration>,
}

struct ResaleInner {
    listings: Vec<ResaleListing>,
    fetched_at: Option<Instant>,
}

struct FetchGuard<'a>(&'a AtomicBool);

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Aggregated, cached view of the secondary market.
pub struct ResaleCatalog<G> {
    gateway: Arc<G>,
    bond_catalog: Arc<BondCatalog<G>>,
    metadata: Arc<MetadataCache<PositionMetadata>>,
    /// cw721 collection the market's position NFTs live in
    nft_contract: ContractAddr,
    inner: RwLock<ResaleInner>,
    in_flight: AtomicBool,
    generation: AtomicU64,
    ttl: Duration,
}

impl<G: BondMarketQuery> ResaleCatalog<G> {
    pub fn new(
        gateway: Arc<G>,
        bond_catalog: Arc<BondCatalog<G>>,
        metadata: Arc<MetadataCache<PositionMetadata>>,
        nft_contract: ContractAddr,
    ) -> Self {
        Self::with_ttl(gateway, bond_catalog, metadata, nft_contract, RESALE_TTL)
    }

    pub fn with_ttl(
        gateway: Arc<G>,
        bond_catalog: Arc<BondCatalog<G>>,
        metadata: Arc<MetadataCache<PositionMetadata>>,
        nft_contract: ContractAddr,
        ttl: Duration,
    ) -> Self {
        Self {
            gateway,
            bond_catalog,
            metadata,
            nft_contract,
            inner: RwLock::new(ResaleInner {
                listings: Vec::new(),
                fetched_at: None,
            }),
            in_flight: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            ttl,
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Return the joined resale catalog, refreshing from the ledger when
    /// stale. Degrades to the last good materialization on failure.
    pub async fn fetch_all(&self, force: bool) -> ResaleSnapshot {
        if !force {
            let inner = self.inner.read().await;
            if let Some(at) = inner.fetched_at {
                if at.elapsed() < self.ttl {
                    return Self::snapshot(&inner, self.is_fetching());
                }
            }
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            let inner = self.inner.read().await;
            return Self::snapshot(&inner, true);
        }
        let _guard = FetchGuard(&self.in_flight);

        let generation = self.generation.load(Ordering::Acquire);

        match self.fetch_and_join().await {
            Ok(listings) => {
                let mut inner = self.inner.write().await;
                if self.generation.load(Ordering::Acquire) == generation {
                    inner.listings = listings;
                    inner.fetched_at = Some(Instant::now());
                } else {
                    tracing::debug!("Discarding resale fetch superseded by invalidation");
                }
                Self::snapshot(&inner, false)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Resale catalog refresh failed, serving last known state"
                );
                let inner = self.inner.read().await;
                Self::snapshot(&inner, false)
            }
        }
    }

    /// Drop the materialization and fence off in-flight fetches.
    pub async fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let mut inner = self.inner.write().await;
        inner.listings.clear();
        inner.fetched_at = None;
    }

    async fn fetch_and_join(&self) -> Result<Vec<ResaleListing>, GatewayError> {
        let raw_offers = self.gateway.list_resale_offers().await?;
        let now = now_millis();

        let mut listings = Vec::with_capacity(raw_offers.len());

        for raw in &raw_offers {
            let offer = match parse_resale_offer(raw) {
                Ok(offer) => offer,
                Err(e) => {
                    tracing::debug!(
                        token_id = %raw.nft_token_id,
                        error = %e,
                        "Skipping unparseable resale listing"
                    );
                    continue;
                }
            };

            if offer.is_expired(now) {
                continue;
            }

            let Some(bond) = self.bond_catalog.get(offer.bond_id).await else {
                tracing::warn!(
                    bond_id = offer.bond_id,
                    token_id = %offer.nft_token_id,
                    "Dropping resale listing with unresolvable bond offer"
                );
                continue;
            };

            let Some(meta) = self.position_metadata(&offer.nft_token_id).await else {
                tracing::warn!(
                    token_id = %offer.nft_token_id,
                    "Dropping resale listing with unresolvable position metadata"
                );
                continue;
            };

            listings.push(ResaleListing {
                offer,
                bond,
                position: meta.position,
                image: meta.image,
            });
        }

        Ok(listings)
    }

    /// Cache-first metadata lookup with a gateway fallback.
    async fn position_metadata(&self, token_id: &str) -> Option<PositionMetadata> {
        if let Some(meta) = self.metadata.get(self.nft_contract.as_str(), token_id) {
            return Some(meta);
        }

        let raw = match self.gateway.nft_info(&self.nft_contract, token_id).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(token_id, error = %e, "NFT metadata fetch failed");
                return None;
            }
        };

        match bonds::nft::parse_position_metadata(self.nft_contract.as_str(), token_id, &raw) {
            Ok(meta) => {
                self.metadata
                    .insert(self.nft_contract.as_str(), token_id, meta.clone());
                Some(meta)
            }
            Err(e) => {
                tracing::debug!(token_id, error = %e, "NFT metadata malformed");
                None
            }
        }
    }

    fn snapshot(inner: &ResaleInner, is_fetching: bool) -> ResaleSnapshot {
        ResaleSnapshot {
            listings: inner.listings.clone(),
            is_fetching,
            age: inner.fetched_at.map(|at| at.elapsed()),
        }
    }
}
