//! The auxiliary Ethereum client capability.
//!
//! `EthClient` is the transaction-level companion the shim constructs once
//! at wrap time and never exposes: it is bound to the same backend as the
//! shim itself and shares no mutable state with the outer interface.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use chainshim_core::error::TransportError;
use chainshim_core::request::{JsonRpcError, JsonRpcRequest};
use chainshim_core::transport::RpcTransport;

use crate::types::{Transaction, TransactionReceipt};

/// Configuration for `EthClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Interval between consecutive `eth_getTransactionReceipt` polls while
    /// waiting for a transaction to be mined. Simulation backends mine
    /// immediately, so this only bounds busy-polling.
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// Errors from transaction-level client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Underlying transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The node does not know the transaction hash.
    #[error("transaction {hash} not found")]
    TransactionNotFound { hash: String },

    /// A read-only call was rejected by the node's execution layer.
    /// The raw node error is kept — its `data` field carries the
    /// ABI-encoded revert payload when one exists.
    #[error("call reverted: {error}")]
    CallReverted { error: JsonRpcError },

    /// The transaction was mined but its receipt reports failure.
    #[error("transaction {} failed", receipt.transaction_hash)]
    TransactionFailed { receipt: TransactionReceipt },
}

impl From<ClientError> for TransportError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Transport(e) => e,
            ClientError::CallReverted { error } => TransportError::Rpc(error),
            ClientError::TransactionFailed { receipt } => TransportError::Reverted {
                tx_hash: receipt.transaction_hash.clone(),
                receipt: serde_json::to_value(&receipt).unwrap_or(Value::Null),
            },
            e @ ClientError::TransactionNotFound { .. } => TransportError::Other(e.to_string()),
        }
    }
}

/// Transaction-level operations over a raw [`RpcTransport`].
pub struct EthClient {
    transport: Arc<dyn RpcTransport>,
    config: ClientConfig,
    next_id: AtomicU64,
}

impl EthClient {
    pub fn new(transport: Arc<dyn RpcTransport>, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Fetch a transaction by hash via `eth_getTransactionByHash`.
    pub async fn get_transaction(&self, hash: &str) -> Result<Transaction, ClientError> {
        let req = JsonRpcRequest::new(
            self.next_id(),
            "eth_getTransactionByHash",
            vec![Value::String(hash.into())],
        );
        let resp = self.transport.send(req).await?;
        let result = resp.into_result().map_err(TransportError::Rpc)?;
        if result.is_null() {
            return Err(ClientError::TransactionNotFound { hash: hash.into() });
        }
        Ok(serde_json::from_value(result).map_err(TransportError::from)?)
    }

    /// Execute a read-only `eth_call` at the given block (default `latest`).
    ///
    /// A node-side execution error — the outcome a reverting call produces —
    /// is normalized to [`ClientError::CallReverted`] regardless of whether
    /// the transport surfaced it as an error response or a rejection.
    pub async fn call(&self, request: &Value, block: Option<&str>) -> Result<Value, ClientError> {
        let params = vec![
            request.clone(),
            Value::String(block.unwrap_or("latest").into()),
        ];
        let req = JsonRpcRequest::new(self.next_id(), "eth_call", params);
        match self.transport.send(req).await {
            Ok(resp) => match resp.into_result() {
                Ok(value) => Ok(value),
                Err(error) => Err(ClientError::CallReverted { error }),
            },
            Err(TransportError::Rpc(error)) => Err(ClientError::CallReverted { error }),
            Err(e) => Err(e.into()),
        }
    }

    /// Wait for a transaction to be mined and return its receipt.
    ///
    /// Polls `eth_getTransactionReceipt` until the node reports one. A
    /// receipt with failure status is returned as
    /// [`ClientError::TransactionFailed`] carrying the receipt, so callers
    /// observe a failing send as a rejection. No timeout is applied here;
    /// any timeout behavior belongs to the transport's own operations.
    pub async fn wait_for_receipt(&self, hash: &str) -> Result<TransactionReceipt, ClientError> {
        loop {
            let req = JsonRpcRequest::new(
                self.next_id(),
                "eth_getTransactionReceipt",
                vec![Value::String(hash.into())],
            );
            let resp = self.transport.send(req).await?;
            let result = resp.into_result().map_err(TransportError::Rpc)?;
            if result.is_null() {
                tracing::trace!(tx_hash = %hash, "transaction not yet mined, polling again");
                tokio::time::sleep(self.config.poll_interval).await;
                continue;
            }
            let receipt: TransactionReceipt =
                serde_json::from_value(result).map_err(TransportError::from)?;
            if receipt.failed() {
                return Err(ClientError::TransactionFailed { receipt });
            }
            return Ok(receipt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chainshim_core::request::JsonRpcResponse;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Minimal scripted node: fixed transaction/call outcomes, a queue of
    /// successive receipt-poll results (last entry repeats).
    struct FakeNode {
        transaction: Value,
        call: Result<Value, JsonRpcError>,
        receipts: Mutex<VecDeque<Value>>,
    }

    impl FakeNode {
        fn new() -> Self {
            Self {
                transaction: Value::Null,
                call: Ok(Value::String("0x".into())),
                receipts: Mutex::new(VecDeque::new()),
            }
        }
    }

    #[async_trait]
    impl RpcTransport for FakeNode {
        async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
            let id = req.id.clone();
            match req.method.as_str() {
                "eth_getTransactionByHash" => {
                    Ok(JsonRpcResponse::success(id, self.transaction.clone()))
                }
                "eth_call" => match &self.call {
                    Ok(v) => Ok(JsonRpcResponse::success(id, v.clone())),
                    Err(e) => Ok(JsonRpcResponse {
                        jsonrpc: "2.0".into(),
                        id,
                        result: None,
                        error: Some(e.clone()),
                    }),
                },
                "eth_getTransactionReceipt" => {
                    let mut q = self.receipts.lock().unwrap();
                    let v = if q.len() > 1 {
                        q.pop_front().unwrap()
                    } else {
                        q.front().cloned().unwrap_or(Value::Null)
                    };
                    Ok(JsonRpcResponse::success(id, v))
                }
                other => panic!("unexpected method {other}"),
            }
        }
        fn url(&self) -> &str {
            "fake"
        }
    }

    fn client(node: FakeNode) -> EthClient {
        EthClient::new(
            Arc::new(node),
            ClientConfig {
                poll_interval: Duration::from_millis(1),
            },
        )
    }

    #[tokio::test]
    async fn get_transaction_not_found() {
        let c = client(FakeNode::new());
        let err = c.get_transaction("0xabc").await.unwrap_err();
        assert!(matches!(err, ClientError::TransactionNotFound { .. }));
    }

    #[tokio::test]
    async fn get_transaction_found() {
        let mut node = FakeNode::new();
        node.transaction = json!({"hash": "0xabc", "blockNumber": "0x2"});
        let tx = client(node).get_transaction("0xabc").await.unwrap();
        assert_eq!(tx.hash, "0xabc");
        assert_eq!(tx.block_number.as_deref(), Some("0x2"));
    }

    #[tokio::test]
    async fn call_revert_is_normalized() {
        let mut node = FakeNode::new();
        node.call = Err(JsonRpcError {
            code: 3,
            message: "execution reverted".into(),
            data: Some(json!("0x08c379a0")),
        });
        let err = client(node)
            .call(&json!({"to": "0x2"}), None)
            .await
            .unwrap_err();
        match err {
            ClientError::CallReverted { error } => {
                assert_eq!(error.revert_data(), Some("0x08c379a0"))
            }
            other => panic!("expected CallReverted, got {other}"),
        }
    }

    #[tokio::test]
    async fn wait_polls_until_mined() {
        let node = FakeNode::new();
        node.receipts.lock().unwrap().extend([
            Value::Null,
            Value::Null,
            json!({"transactionHash": "0xabc", "status": "0x1"}),
        ]);
        let receipt = client(node).wait_for_receipt("0xabc").await.unwrap();
        assert_eq!(receipt.transaction_hash, "0xabc");
        assert!(!receipt.failed());
    }

    #[tokio::test]
    async fn wait_surfaces_failed_receipt_as_error() {
        let node = FakeNode::new();
        node.receipts
            .lock()
            .unwrap()
            .push_back(json!({"transactionHash": "0xabc", "status": "0x0"}));
        let err = client(node).wait_for_receipt("0xabc").await.unwrap_err();
        match err {
            ClientError::TransactionFailed { receipt } => assert!(receipt.failed()),
            other => panic!("expected TransactionFailed, got {other}"),
        }
    }

    #[test]
    fn client_error_converts_to_transport_error() {
        let receipt: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": "0xabc",
            "status": "0x0",
        }))
        .unwrap();
        let err: TransportError = ClientError::TransactionFailed { receipt }.into();
        assert_eq!(err.receipt().unwrap()["transactionHash"], "0xabc");
    }
}
