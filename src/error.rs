// Raffle Entitlement Engine - Errors
use thiserror::Error;

use crate::entitlement::Action;

/// Errors returned by the engine's fallible operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// No snapshot has been read for this session yet
    #[error("Raffle snapshot not loaded")]
    SnapshotNotLoaded,

    /// The caller has no connected address
    #[error("Wallet not connected")]
    WalletNotConnected,

    /// The action is not in the caller's current action set
    #[error("Action not permitted: {0:?}")]
    ActionNotPermitted(Action),

    /// Ticket quantity outside 1..=max purchasable
    #[error("Invalid ticket quantity {requested}, maximum is {maximum}")]
    InvalidQuantity { requested: u64, maximum: u64 },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Invalid instruction data")]
    InvalidInstructionData,

    /// The raffle carries no prize that needs an approval or deposit
    #[error("Prize does not require approval")]
    NothingToApprove,

    /// Raw status code outside 0..=8
    #[error("Unrecognized raffle status code {0}")]
    UnknownStatus(u8),

    /// A write collaborator call failed; holds the extracted revert reason
    #[error("Transaction failed: {0}")]
    WriteFailed(String),
}

/// A single failed read against the contract-query collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("call reverted: {0}")]
    Reverted(String),

    #[error("transport error: {0}")]
    Transport(String),
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Raw failure reported by the write collaborator.
///
/// Mirrors the shapes a wallet/provider error usually carries: an explicit
/// revert `reason`, a nested `data_message`, and the free-form `message`.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{message}")]
pub struct WriteFailure {
    pub reason: Option<String>,
    pub data_message: Option<String>,
    pub message: String,
}

impl WriteFailure {
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Best-effort human readable revert reason
    pub fn revert_reason(&self) -> String {
        extract_revert_reason(self)
    }
}

impl From<WriteFailure> for RaffleError {
    fn from(failure: WriteFailure) -> Self {
        RaffleError::WriteFailed(failure.revert_reason())
    }
}

const REVERT_MARKER: &str = "execution reverted";

/// Pull the revert reason out of a write failure.
///
/// Order: explicit reason, nested data message, the text following
/// "execution reverted" in the message (case-insensitive), then the raw message.
pub fn extract_revert_reason(failure: &WriteFailure) -> String {
    if let Some(reason) = failure.reason.as_deref().filter(|r| !r.is_empty()) {
        return reason.to_string();
    }
    if let Some(data) = failure.data_message.as_deref().filter(|m| !m.is_empty()) {
        return data.to_string();
    }

    let message = failure.message.as_str();
    if let Some(start) = message.to_ascii_lowercase().find(REVERT_MARKER) {
        let rest = &message[start + REVERT_MARKER.len()..];
        let rest = rest.strip_prefix(':').unwrap_or(rest);
        let reason = rest.lines().next().unwrap_or("").trim();
        if !reason.is_empty() {
            return reason.to_string();
        }
    }
    message.to_string()
}
