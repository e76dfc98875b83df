//! Transport-level error types.

use serde_json::Value;
use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors that can occur during an RPC transport operation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, timeout, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A sent transaction was mined but reverted.
    ///
    /// Carries the transaction receipt as JSON; when the revert reason
    /// could be recovered it is attached under the `revertString` key.
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String, receipt: Value },

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if this error is retryable (transient).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }

    /// Returns `true` if this is a node-side execution error (not retryable).
    pub fn is_execution_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }

    /// The receipt attached to a [`TransportError::Reverted`] failure.
    pub fn receipt(&self) -> Option<&Value> {
        match self {
            Self::Reverted { receipt, .. } => Some(receipt),
            _ => None,
        }
    }
}
