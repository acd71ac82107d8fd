//! Execute-instruction shapes for the bond ledger
//!
//! The wallet collaborator signs and broadcasts; this module only shapes the
//! messages. A multi-instruction batch maps 1:1 onto the wallet bridge's
//! `executeMultiple` primitive, which is all-or-nothing per batch.

use base64::Engine;
use covenant_core::{Coin, ContractAddr};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One contract execution: target, JSON message, attached funds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteInstruction {
    pub contract: ContractAddr,
    pub msg: serde_json::Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub funds: Vec<Coin>,
}

/// An ordered group of instructions submitted as one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteBatch {
    pub instructions: Vec<ExecuteInstruction>,
}

impl ExecuteBatch {
    pub fn new(instructions: Vec<ExecuteInstruction>) -> Self {
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Claim vested amount from one position NFT.
pub fn claim(market: &ContractAddr, bond_id: u64, nft_token_id: &str) -> ExecuteInstruction {
    ExecuteInstruction {
        contract: market.clone(),
        msg: json!({
            "claim": {
                "bond_id": bond_id,
                "nft_token_id": nft_token_id,
            }
        }),
        funds: Vec::new(),
    }
}

/// Purchase from a primary bond offer. `funds` carries the payment.
pub fn purchase(market: &ContractAddr, bond_id: u64, funds: Vec<Coin>) -> ExecuteInstruction {
    ExecuteInstruction {
        contract: market.clone(),
        msg: json!({
            "purchase": {
                "bond_id": bond_id,
            }
        }),
        funds,
    }
}

/// Buy a secondary-market listing. `funds` carries the asking price.
pub fn buy_resale(market: &ContractAddr, nft_token_id: &str, funds: Vec<Coin>) -> ExecuteInstruction {
    ExecuteInstruction {
        contract: market.clone(),
        msg: json!({
            "buy_resale": {
                "nft_token_id": nft_token_id,
            }
        }),
        funds,
    }
}

/// Withdraw a secondary-market listing; the NFT returns to the seller.
pub fn cancel_resale(market: &ContractAddr, nft_token_id: &str) -> ExecuteInstruction {
    ExecuteInstruction {
        contract: market.clone(),
        msg: json!({
            "cancel_resale": {
                "nft_token_id": nft_token_id,
            }
        }),
        funds: Vec::new(),
    }
}

/// Transfer a position NFT to a contract with an embedded receiver message.
///
/// cw721 `send_nft` requires the inner message base64-encoded; the receiving
/// contract decodes it to learn why the NFT arrived (e.g. a resale listing).
pub fn send_nft(
    collection: &ContractAddr,
    recipient: &ContractAddr,
    token_id: &str,
    inner_msg: &serde_json::Value,
) -> ExecuteInstruction {
    let encoded = base64::engine::general_purpose::STANDARD.encode(inner_msg.to_string());

    ExecuteInstruction {
        contract: collection.clone(),
        msg: json!({
            "send_nft": {
                "contract": recipient.as_str(),
                "token_id": token_id,
                "msg": encoded,
            }
        }),
        funds: Vec::new(),
    }
}
