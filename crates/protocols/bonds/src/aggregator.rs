//! Bond catalog aggregator
//!
//! Owns the full-catalog materialization: a map keyed by bond id, a
//! freshness stamp, an in-flight flag, and a generation counter. Consumers
//! get a consistent, deduplicated, freshness-bounded view; the ledger stays
//! the source of truth.
//!
//! Concurrency model: at most one full-catalog fetch is ever in flight. The
//! flag is an atomic check-and-set taken before the first await and released
//! by an RAII guard, so no exit path (error or cancellation) can leave the
//! aggregator locked. A fetch that started before an `invalidate_all` is
//! discarded at commit time via the generation counter; stale results never
//! overwrite fresher state.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use covenant_core::{Error, MarketError};
use ledger_client::queries::BondMarketQuery;
use tokio::sync::RwLock;

use crate::constants::CATALOG_TTL;
use crate::fetch;
use crate::state::BondOffer;

/// A point-in-time view of the catalog handed to consumers.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    /// Offers ordered by bond id
    pub offers: Vec<BondOffer>,
    /// True when a background fetch was in flight at snapshot time
    pub is_fetching: bool,
    /// Age of the materialization, `None` before the first successful fetch
    pub age: Option<Duration>,
}

struct CatalogInner {
    offers: BTreeMap<u64, BondOffer>,
    fetched_at: Option<Instant>,
}

/// Clears the in-flight flag on every exit path.
struct FetchGuard<'a>(&'a AtomicBool);

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Aggregated, cached view of every open bond offer.
pub struct BondCatalog<G> {
    gateway: Arc<G>,
    inner: RwLock<CatalogInner>,
    in_flight: AtomicBool,
    generation: AtomicU64,
    ttl: Duration,
}

impl<G: BondMarketQuery> BondCatalog<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_ttl(gateway, CATALOG_TTL)
    }

    pub fn with_ttl(gateway: Arc<G>, ttl: Duration) -> Self {
        Self {
            gateway,
            inner: RwLock::new(CatalogInner {
                offers: BTreeMap::new(),
                fetched_at: None,
            }),
            in_flight: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            ttl,
        }
    }

    /// Whether a full-catalog fetch is currently in flight.
    pub fn is_fetching(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Return the full catalog, refreshing from the ledger when stale.
    ///
    /// Within the TTL (and without `force`) this is a pure cache read.
    /// While another fetch is in flight the current, possibly stale,
    /// materialization is returned instead of starting a duplicate walk.
    /// A failed refresh degrades to the last good materialization; it is
    /// logged, never surfaced.
    pub async fn fetch_all(&self, force: bool) -> CatalogSnapshot {
        if !force {
            let inner = self.inner.read().await;
            if let Some(at) = inner.fetched_at {
                if at.elapsed() < self.ttl {
                    return Self::snapshot(&inner, self.is_fetching());
                }
            }
        }

        // Try to become the single fetcher; losers serve what exists now
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

        match fetch::fetch_all_offers(self.gateway.as_ref()).await {
            Ok(offers) => {
                let mut inner = self.inner.write().await;
                if self.generation.load(Ordering::Acquire) == generation {
                    inner.offers = offers;
                    inner.fetched_at = Some(Instant::now());
                } else {
                    tracing::debug!("Discarding catalog fetch superseded by invalidation");
                }
                Self::snapshot(&inner, false)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Bond catalog refresh failed, serving last known state"
                );
                let inner = self.inner.read().await;
                Self::snapshot(&inner, false)
            }
        }
    }

    /// Look up one offer, falling through to the ledger when absent.
    ///
    /// An invalidated bond is absent from the materialization, so the next
    /// `get` always reaches the ledger regardless of the catalog TTL.
    pub async fn get(&self, bond_id: u64) -> Option<BondOffer> {
        {
            let inner = self.inner.read().await;
            if let Some(offer) = inner.offers.get(&bond_id) {
                return Some(offer.clone());
            }
        }

        match self.refresh_one(bond_id).await {
            Ok(offer) => Some(offer),
            Err(e) => {
                tracing::debug!(bond_id, error = %e, "Bond offer lookup failed");
                None
            }
        }
    }

    /// Re-fetch a single offer and splice it into the materialization.
    ///
    /// Used after a mutating action to avoid a full re-page.
    pub async fn refresh_one(&self, bond_id: u64) -> Result<BondOffer, Error> {
        let generation = self.generation.load(Ordering::Acquire);

        let raw = self.gateway.bond_offer(bond_id).await.map_err(Error::from)?;
        let offer = fetch::parse_bond_offer(&raw).map_err(Error::from)?;

        if offer.bond_id != bond_id {
            return Err(MarketError::malformed(
                "bond offer",
                format!("requested bond {} but ledger returned {}", bond_id, offer.bond_id),
            )
            .into());
        }

        let mut inner = self.inner.write().await;
        if self.generation.load(Ordering::Acquire) == generation {
            inner.offers.insert(bond_id, offer.clone());
        }
        Ok(offer)
    }

    /// Drop one offer from the materialization; the next `get` re-fetches.
    pub async fn invalidate(&self, bond_id: u64) {
        let mut inner = self.inner.write().await;
        inner.offers.remove(&bond_id);
    }

    /// Drop the whole materialization and fence off in-flight fetches.
    pub async fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let mut inner = self.inner.write().await;
        inner.offers.clear();
        inner.fetched_at = None;
    }

    /// Clone of the id-keyed materialization, for claim building.
    pub async fn offers_by_id(&self) -> BTreeMap<u64, BondOffer> {
        self.inner.read().await.offers.clone()
    }

    fn snapshot(inner: &CatalogInner, is_fetching: bool) -> CatalogSnapshot {
        CatalogSnapshot {
            offers: inner.offers.values().cloned().collect(),
            is_fetching,
            age: inner.fetched_at.map(|at| at.elapsed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PAGE_SIZE;
    use crate::testing::{raw_offer, StubLedger};

    fn catalog(stub: StubLedger) -> BondCatalog<StubLedger> {
        BondCatalog::new(Arc::new(stub))
    }

    #[tokio::test]
    async fn test_fetch_all_materializes_ordered_catalog() {
        let stub = StubLedger::with_offers(vec![raw_offer(3), raw_offer(1), raw_offer(2)]);
        let catalog = catalog(stub);

        let snap = catalog.fetch_all(false).await;
        let ids: Vec<u64> = snap.offers.iter().map(|o| o.bond_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(!snap.is_fetching);
        assert!(snap.age.is_some());
    }

    #[tokio::test]
    async fn test_cache_monotonicity_within_ttl() {
        let stub = StubLedger::with_offers(vec![raw_offer(1)]);
        let catalog = catalog(stub);

        catalog.fetch_all(false).await;
        catalog.fetch_all(false).await;
        catalog.fetch_all(false).await;

        // One page-walk total: the TTL served the later calls
        assert_eq!(catalog.gateway.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_force_bypasses_ttl() {
        let stub = StubLedger::with_offers(vec![raw_offer(1)]);
        let catalog = catalog(stub);

        catalog.fetch_all(false).await;
        catalog.fetch_all(true).await;
        assert_eq!(catalog.gateway.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_degrades_to_last_good() {
        let stub = StubLedger::with_offers(vec![raw_offer(1), raw_offer(2)]);
        let catalog = BondCatalog::with_ttl(Arc::new(stub), Duration::from_millis(0));

        let first = catalog.fetch_all(false).await;
        assert_eq!(first.offers.len(), 2);

        catalog.gateway.set_fail_listing(true);
        let degraded = catalog.fetch_all(true).await;
        // Previous materialization survives the failed walk
        assert_eq!(degraded.offers.len(), 2);
    }

    #[tokio::test]
    async fn test_invalidation_precedence_over_ttl() {
        let stub = StubLedger::with_offers(vec![raw_offer(1)]);
        let catalog = catalog(stub);

        catalog.fetch_all(false).await;
        assert_eq!(catalog.gateway.offer_calls(), 0);

        catalog.invalidate(1).await;
        // Well inside the TTL, yet the lookup must hit the ledger
        let offer = catalog.get(1).await.unwrap();
        assert_eq!(offer.bond_id, 1);
        assert_eq!(catalog.gateway.offer_calls(), 1);
    }

    #[tokio::test]
    async fn test_get_serves_from_materialization() {
        let stub = StubLedger::with_offers(vec![raw_offer(1)]);
        let catalog = catalog(stub);

        catalog.fetch_all(false).await;
        let offer = catalog.get(1).await.unwrap();
        assert_eq!(offer.bond_id, 1);
        assert_eq!(catalog.gateway.offer_calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_one_splices_updated_entry() {
        let stub = StubLedger::with_offers(vec![raw_offer(1), raw_offer(2)]);
        let catalog = catalog(stub);
        catalog.fetch_all(false).await;

        // The ledger-side supply drops after a purchase
        let mut updated = raw_offer(2);
        updated.remaining_supply = "1".to_string();
        catalog.gateway.replace_offer(updated);

        catalog.refresh_one(2).await.unwrap();
        let offer = catalog.get(2).await.unwrap();
        assert_eq!(offer.remaining_supply, 1);
        // Only the single-item endpoint was hit
        assert_eq!(catalog.gateway.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_all_clears_and_fences() {
        let stub = StubLedger::with_offers(
            (1..=PAGE_SIZE as u64 + 2).map(raw_offer).collect(),
        );
        let catalog = catalog(stub);

        catalog.fetch_all(false).await;
        catalog.invalidate_all().await;

        let snap = catalog.fetch_all(false).await;
        // Cleared, then re-fetched from the ledger
        assert_eq!(snap.offers.len(), PAGE_SIZE as usize + 2);
        assert_eq!(catalog.gateway.list_calls(), 4); // 2 pages per walk
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_walk() {
        let stub = StubLedger::with_offers(vec![raw_offer(1)]);
        let catalog = Arc::new(BondCatalog::new(Arc::new(stub)));

        let a = {
            let c = catalog.clone();
            tokio::spawn(async move { c.fetch_all(true).await })
        };
        let b = {
            let c = catalog.clone();
            tokio::spawn(async move { c.fetch_all(true).await })
        };

        a.await.unwrap();
        b.await.unwrap();

        // The loser of the check-and-set returned the current view instead
        // of starting a second walk
        assert!(catalog.gateway.list_calls() <= 2);
    }
}
