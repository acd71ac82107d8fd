//! Error types for Covenant

use thiserror::Error;

/// Core errors that can occur in Covenant
#[derive(Debug, Error)]
pub enum Error {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Market error: {0}")]
    Market(#[from] MarketError),

    #[error("Claim error: {0}")]
    Claim(#[from] ClaimError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Remote ledger transport and contract-query errors.
///
/// All of these are recoverable at the aggregation layer: callers fall back
/// to the last-known-good materialization and surface a non-fatal notice.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Ledger unreachable at {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Ledger request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Contract query rejected: {message}")]
    Contract { message: String },

    #[error("Failed to decode ledger response: {0}")]
    Decode(String),
}

/// Catalog and record-shape errors
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Malformed {context} record: {message}")]
    MalformedRecord { context: String, message: String },

    #[error("Bond offer {bond_id} not found")]
    BondNotFound { bond_id: u64 },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Action not allowed: {reason}")]
    ActionNotAllowed { reason: String },
}

/// Claim batch construction and validation errors.
///
/// These are the only errors allowed to propagate to the caller: they
/// represent actions the user must explicitly retry or resize.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("No claim-eligible positions")]
    NoEligiblePositions,

    #[error("Estimated gas {estimated} exceeds hard ceiling {ceiling}; split the batch")]
    GasCeilingExceeded { estimated: u64, ceiling: u64 },
}

/// Result type alias for Covenant operations
pub type Result<T> = std::result::Result<T, Error>;

impl MarketError {
    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedRecord { .. } => "malformed_record",
            Self::BondNotFound { .. } => "bond_not_found",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::ActionNotAllowed { .. } => "action_not_allowed",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount { .. } => 400,
            Self::BondNotFound { .. } => 404,
            Self::ActionNotAllowed { .. } => 422,
            Self::MalformedRecord { .. } => 503,
        }
    }
}

impl ClaimError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoEligiblePositions => "no_eligible_positions",
            Self::GasCeilingExceeded { .. } => "gas_ceiling_exceeded",
        }
    }
}
