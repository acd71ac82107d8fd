//! Core type definitions for Covenant

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bech32-encoded account or contract address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractAddr(pub String);

impl ContractAddr {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Native coin amount attached to an execute message.
///
/// Amounts travel as strings to survive u128-sized values in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_display() {
        assert_eq!(Network::Mainnet.as_str(), "mainnet");
        assert_eq!(Network::Testnet.as_str(), "testnet");
    }

    #[test]
    fn test_coin_amount_string() {
        let coin = Coin::new("uusdc", 340_282_366_920_938_463_463u128);
        assert_eq!(coin.amount, "340282366920938463463");
        let json = serde_json::to_string(&coin).unwrap();
        assert!(json.contains("\"340282366920938463463\""));
    }

    #[test]
    fn test_contract_addr_transparent_serde() {
        let addr = ContractAddr::new("cov1market");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"cov1market\"");
    }
}
