//! Bridge Transfer Types
//!
//! The user-supplied transfer intent and the wire shapes exchanged with the
//! transfer backend.

use std::fmt;

use serde::{Deserialize, Serialize};

/// EVM-style chain identifier (1 = Ethereum mainnet, 137 = Polygon, ...)
pub type ChainId = u64;

/// Opaque transaction identifier assigned by the transfer backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transfer request as entered by the user
///
/// Never mutated after it enters the state machine; every non-idle state
/// owns a copy of it so the user's input survives failure and retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source_chain_id: ChainId,
    pub destination_chain_id: ChainId,
    pub asset_id: String,
    /// Decimal string, kept as text to avoid float precision issues
    pub amount: String,
    pub recipient_address: String,
}

impl TransferRequest {
    pub fn new(
        source_chain_id: ChainId,
        destination_chain_id: ChainId,
        asset_id: impl Into<String>,
        amount: impl Into<String>,
        recipient_address: impl Into<String>,
    ) -> Self {
        Self {
            source_chain_id,
            destination_chain_id,
            asset_id: asset_id.into(),
            amount: amount.into(),
            recipient_address: recipient_address.into(),
        }
    }
}

/// JSON body posted to the transfer backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPayload {
    pub source_chain: ChainId,
    pub destination_chain: ChainId,
    pub asset: String,
    pub amount: String,
    pub recipient_address: String,
}

impl From<&TransferRequest> for TransferPayload {
    fn from(req: &TransferRequest) -> Self {
        Self {
            source_chain: req.source_chain_id,
            destination_chain: req.destination_chain_id,
            asset: req.asset_id.clone(),
            amount: req.amount.clone(),
            recipient_address: req.recipient_address.clone(),
        }
    }
}

/// JSON body returned by the transfer backend
///
/// Success: `{ "success": true, "transactionId": "0x..." }`
/// Failure: `{ "success": false, "error": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransferReply {
    pub fn accepted(transaction_id: TransactionId) -> Self {
        Self {
            success: true,
            transaction_id: Some(transaction_id),
            error: None,
        }
    }

    pub fn declined(error: impl Into<String>) -> Self {
        Self {
            success: false,
            transaction_id: None,
            error: Some(error.into()),
        }
    }
}
