//! In-memory ledger stub and fixture builders shared across unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use covenant_core::{ContractAddr, GatewayError};
use ledger_client::queries::BondMarketQuery;
use ledger_client::{RawBondOffer, RawNftInfo, RawResaleOffer, RawTrait, RawUserBondPair};

use crate::state::BondOffer;

const T0: i64 = 1_700_000_000_000;

/// A well-formed raw offer with one-day windows around a fixed origin.
pub fn raw_offer(bond_id: u64) -> RawBondOffer {
    RawBondOffer {
        bond_id,
        issuer: "cov1issuer".to_string(),
        token_denom: "uatom".to_string(),
        purchase_denom: "uusdc".to_string(),
        price: "1.0".to_string(),
        total_amount: "1000000".to_string(),
        remaining_supply: "500000".to_string(),
        purchase_start_time: Some((T0 - 86_400_000).to_string()),
        purchase_end_time: Some((T0 + 86_400_000).to_string()),
        claim_start_time: Some((T0 + 2 * 86_400_000).to_string()),
        maturity_date: Some((T0 + 3 * 86_400_000).to_string()),
        closed: false,
    }
}

/// A normalized offer with explicit purchase/maturity windows.
pub fn offer_with_windows(start_ms: i64, end_ms: i64, maturity_ms: i64) -> BondOffer {
    BondOffer {
        bond_id: 1,
        issuer: "cov1issuer".to_string(),
        token_denom: "uatom".to_string(),
        purchase_denom: "uusdc".to_string(),
        price: 1.0,
        raw_price: "1.0".to_string(),
        total_amount: 1_000_000,
        remaining_supply: 500_000,
        token_decimals: 6,
        purchase_start_ms: Some(start_ms),
        purchase_end_ms: Some(end_ms),
        claim_start_ms: Some(end_ms),
        maturity_ms: Some(maturity_ms),
        closed: false,
    }
}

/// cw721 metadata carrying the full position attribute set.
pub fn raw_nft_info(bond_id: u64, amount: u128, claimed: u128, status: &str) -> RawNftInfo {
    let attr = |trait_type: &str, value: String| RawTrait {
        trait_type: trait_type.to_string(),
        value,
    };

    RawNftInfo {
        token_uri: None,
        extension: ledger_client::queries::RawNftExtension {
            attributes: vec![
                attr("bond_id", bond_id.to_string()),
                attr("amount", amount.to_string()),
                attr("claimed_amount", claimed.to_string()),
                attr("purchase_time", T0.to_string()),
                attr("status", status.to_string()),
            ],
            image: Some("ipfs://position.png".to_string()),
        },
    }
}

/// Deterministic in-memory ledger implementing the gateway trait.
#[derive(Default)]
pub struct StubLedger {
    offers: Mutex<Vec<RawBondOffer>>,
    resale: Mutex<Vec<RawResaleOffer>>,
    nfts: Mutex<HashMap<(String, String), RawNftInfo>>,
    pairs: Mutex<Vec<RawUserBondPair>>,
    list_calls: AtomicUsize,
    offer_calls: AtomicUsize,
    nft_calls: AtomicUsize,
    fail_listing: AtomicBool,
}

impl StubLedger {
    pub fn with_offers(offers: Vec<RawBondOffer>) -> Self {
        Self {
            offers: Mutex::new(offers),
            ..Default::default()
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn offer_calls(&self) -> usize {
        self.offer_calls.load(Ordering::SeqCst)
    }

    pub fn nft_calls(&self) -> usize {
        self.nft_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    /// Replace (or add) one offer, as a ledger-side mutation would.
    pub fn replace_offer(&self, offer: RawBondOffer) {
        let mut offers = self.offers.lock().unwrap();
        offers.retain(|o| o.bond_id != offer.bond_id);
        offers.push(offer);
    }

    pub fn set_resale_offers(&self, offers: Vec<RawResaleOffer>) {
        *self.resale.lock().unwrap() = offers;
    }

    pub fn put_nft(&self, collection: &str, token_id: &str, info: RawNftInfo) {
        self.nfts
            .lock()
            .unwrap()
            .insert((collection.to_string(), token_id.to_string()), info);
    }

    pub fn set_pairs(&self, pairs: Vec<RawUserBondPair>) {
        *self.pairs.lock().unwrap() = pairs;
    }

    fn transport_error() -> GatewayError {
        GatewayError::Transport {
            url: "stub".to_string(),
            message: "injected failure".to_string(),
        }
    }
}

#[async_trait]
impl BondMarketQuery for StubLedger {
    async fn list_bond_offers(
        &self,
        limit: u32,
        start_after: Option<u64>,
    ) -> Result<Vec<RawBondOffer>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(Self::transport_error());
        }

        let mut offers = self.offers.lock().unwrap().clone();
        offers.sort_by_key(|o| o.bond_id);
        Ok(offers
            .into_iter()
            .filter(|o| start_after.map_or(true, |cursor| o.bond_id > cursor))
            .take(limit as usize)
            .collect())
    }

    async fn bond_offer(&self, bond_id: u64) -> Result<RawBondOffer, GatewayError> {
        self.offer_calls.fetch_add(1, Ordering::SeqCst);
        self.offers
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.bond_id == bond_id)
            .cloned()
            .ok_or(GatewayError::Contract {
                message: format!("bond offer {} not found", bond_id),
            })
    }

    async fn list_resale_offers(&self) -> Result<Vec<RawResaleOffer>, GatewayError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(Self::transport_error());
        }
        Ok(self.resale.lock().unwrap().clone())
    }

    async fn nft_info(
        &self,
        collection: &ContractAddr,
        token_id: &str,
    ) -> Result<RawNftInfo, GatewayError> {
        self.nft_calls.fetch_add(1, Ordering::SeqCst);
        self.nfts
            .lock()
            .unwrap()
            .get(&(collection.as_str().to_string(), token_id.to_string()))
            .cloned()
            .ok_or(GatewayError::Contract {
                message: format!("token {} not found", token_id),
            })
    }

    async fn bonds_by_user(
        &self,
        _address: &str,
        limit: u32,
        start_after: Option<&str>,
    ) -> Result<Vec<RawUserBondPair>, GatewayError> {
        let mut pairs = self.pairs.lock().unwrap().clone();
        pairs.sort_by(|a, b| a.nft_id.cmp(&b.nft_id));
        Ok(pairs
            .into_iter()
            .filter(|p| start_after.map_or(true, |cursor| p.nft_id.as_str() > cursor))
            .take(limit as usize)
            .collect())
    }
}
