//! Typed query messages and raw response shapes for the bond ledger
//!
//! The wire format is the contract's: snake_case JSON, `Uint128` values as
//! decimal strings, timestamps as ledger-native strings whose unit is
//! normalized downstream. Everything here is a faithful copy of what the
//! ledger said; domain normalization happens in the protocol crates.

use async_trait::async_trait;
use covenant_core::{ContractAddr, GatewayError};
use serde::{Deserialize, Deserializer, Serialize};

use crate::LedgerClient;

/// Query messages understood by the bond market contract
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum MarketQueryMsg<'a> {
    ListBondOffers {
        limit: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        start_after: Option<u64>,
    },
    BondOffer {
        bond_id: u64,
    },
    ListResaleOffers {},
    BondsByUser {
        address: &'a str,
        limit: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        start_after: Option<&'a str>,
    },
}

/// Query messages understood by the cw721 collection
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum CollectionQueryMsg<'a> {
    NftInfo { token_id: &'a str },
}

// =============================================================================
// Raw response shapes
// =============================================================================

/// Accept a timestamp as either a JSON string or a bare number.
///
/// Older contract releases serialized `Timestamp` as a number; the current
/// one uses strings. Both appear in the wild on archival endpoints.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    }))
}

/// A bond offer exactly as the ledger reports it
#[derive(Debug, Clone, Deserialize)]
pub struct RawBondOffer {
    pub bond_id: u64,
    pub issuer: String,
    /// Denom of the asset being sold
    pub token_denom: String,
    /// Denom the buyer pays with
    pub purchase_denom: String,
    /// Fixed exchange price as a decimal string (e.g. "0.95")
    pub price: String,
    pub total_amount: String,
    pub remaining_supply: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub purchase_start_time: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub purchase_end_time: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub claim_start_time: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub maturity_date: Option<String>,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Deserialize)]
pub struct BondOffersResponse {
    pub bond_offers: Vec<RawBondOffer>,
}

#[derive(Debug, Deserialize)]
pub struct BondOfferResponse {
    pub bond_offer: RawBondOffer,
}

/// A secondary-market listing exactly as the ledger reports it
#[derive(Debug, Clone, Deserialize)]
pub struct RawResaleOffer {
    pub bond_id: u64,
    pub nft_token_id: String,
    pub seller: String,
    pub price_per_bond: String,
    pub price_denom: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub end_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResaleOffersResponse {
    pub offers: Vec<RawResaleOffer>,
}

/// One `{trait_type, value}` pair from a cw721 extension
#[derive(Debug, Clone, Deserialize)]
pub struct RawTrait {
    pub trait_type: String,
    #[serde(deserialize_with = "value_as_string")]
    pub value: String,
}

/// Trait values arrive as strings or numbers depending on the minter version.
fn value_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNftExtension {
    #[serde(default)]
    pub attributes: Vec<RawTrait>,
    #[serde(default)]
    pub image: Option<String>,
}

/// cw721 `nft_info` response
#[derive(Debug, Clone, Deserialize)]
pub struct RawNftInfo {
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub extension: RawNftExtension,
}

/// A (bond, position NFT) pair owned by a user
#[derive(Debug, Clone, Deserialize)]
pub struct RawUserBondPair {
    pub bond_id: u64,
    pub nft_id: String,
    pub contract_addr: String,
}

#[derive(Debug, Deserialize)]
pub struct UserBondsResponse {
    pub pairs: Vec<RawUserBondPair>,
}

// =============================================================================
// Gateway seam
// =============================================================================

/// Read-only query surface consumed by the catalog aggregators.
///
/// `LedgerClient` is the production implementation; tests substitute an
/// in-memory ledger stub.
#[async_trait]
pub trait BondMarketQuery: Send + Sync {
    async fn list_bond_offers(
        &self,
        limit: u32,
        start_after: Option<u64>,
    ) -> Result<Vec<RawBondOffer>, GatewayError>;

    async fn bond_offer(&self, bond_id: u64) -> Result<RawBondOffer, GatewayError>;

    async fn list_resale_offers(&self) -> Result<Vec<RawResaleOffer>, GatewayError>;

    async fn nft_info(
        &self,
        collection: &ContractAddr,
        token_id: &str,
    ) -> Result<RawNftInfo, GatewayError>;

    async fn bonds_by_user(
        &self,
        address: &str,
        limit: u32,
        start_after: Option<&str>,
    ) -> Result<Vec<RawUserBondPair>, GatewayError>;
}

#[async_trait]
impl BondMarketQuery for LedgerClient {
    async fn list_bond_offers(
        &self,
        limit: u32,
        start_after: Option<u64>,
    ) -> Result<Vec<RawBondOffer>, GatewayError> {
        let msg = MarketQueryMsg::ListBondOffers { limit, start_after };
        let response: BondOffersResponse = self.smart_query(self.market_contract(), &msg).await?;
        Ok(response.bond_offers)
    }

    async fn bond_offer(&self, bond_id: u64) -> Result<RawBondOffer, GatewayError> {
        let msg = MarketQueryMsg::BondOffer { bond_id };
        let response: BondOfferResponse = self.smart_query(self.market_contract(), &msg).await?;
        Ok(response.bond_offer)
    }

    async fn list_resale_offers(&self) -> Result<Vec<RawResaleOffer>, GatewayError> {
        let msg = MarketQueryMsg::ListResaleOffers {};
        let response: ResaleOffersResponse = self.smart_query(self.market_contract(), &msg).await?;
        Ok(response.offers)
    }

    async fn nft_info(
        &self,
        collection: &ContractAddr,
        token_id: &str,
    ) -> Result<RawNftInfo, GatewayError> {
        let msg = CollectionQueryMsg::NftInfo { token_id };
        self.smart_query(collection, &msg).await
    }

    async fn bonds_by_user(
        &self,
        address: &str,
        limit: u32,
        start_after: Option<&str>,
    ) -> Result<Vec<RawUserBondPair>, GatewayError> {
        let msg = MarketQueryMsg::BondsByUser {
            address,
            limit,
            start_after,
        };
        let response: UserBondsResponse = self.smart_query(self.market_contract(), &msg).await?;
        Ok(response.pairs)
    }
}
