//! Receipt and transaction models over raw node JSON.
//!
//! Only the fields the shim acts on are typed; everything else the backend
//! returns is kept verbatim in a flattened map so an unaugmented object
//! round-trips identical to what the node produced.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parse a `0x`-hex or decimal quantity string.
pub fn parse_quantity(s: &str) -> Option<u64> {
    let s = s.trim();
    match s.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

/// A transaction receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,

    /// Outcome status: `0x0` for failure, nonzero for success.
    /// Pre-Byzantium nodes may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,

    /// The decoded revert reason, attached by the shim to failed receipts.
    /// Absent on successful receipts and on receipts the shim never saw.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revert_string: Option<String>,

    /// Backend fields the shim does not model, preserved as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransactionReceipt {
    /// Returns `true` iff the status parses as the numeric value 0.
    ///
    /// A missing or unparseable status is treated as not-failed: there is
    /// no revert to recover and augmentation must be a no-op.
    pub fn failed(&self) -> bool {
        self.status
            .as_deref()
            .and_then(parse_quantity)
            .map(|s| s == 0)
            .unwrap_or(false)
    }
}

/// A transaction as returned by `eth_getTransactionByHash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: String,

    /// Block the transaction was mined in; `None` while pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// Calldata (`input` on the wire).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    /// Build the call object for replaying this transaction as a read-only
    /// `eth_call` query. Only fields a node accepts for a call are carried.
    pub fn as_call_request(&self) -> Value {
        let mut call = Map::new();
        if let Some(from) = &self.from {
            call.insert("from".into(), Value::String(from.clone()));
        }
        if let Some(to) = &self.to {
            call.insert("to".into(), Value::String(to.clone()));
        }
        if let Some(input) = &self.input {
            call.insert("data".into(), Value::String(input.clone()));
        }
        if let Some(value) = &self.value {
            call.insert("value".into(), Value::String(value.clone()));
        }
        if let Some(gas) = &self.gas {
            call.insert("gas".into(), Value::String(gas.clone()));
        }
        if let Some(gas_price) = &self.gas_price {
            call.insert("gasPrice".into(), Value::String(gas_price.clone()));
        }
        Value::Object(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_quantity_forms() {
        assert_eq!(parse_quantity("0x0"), Some(0));
        assert_eq!(parse_quantity("0x1"), Some(1));
        assert_eq!(parse_quantity("0"), Some(0));
        assert_eq!(parse_quantity("15000000"), Some(15_000_000));
        assert_eq!(parse_quantity("0xE4E1C0"), Some(15_000_000));
        assert_eq!(parse_quantity("not-a-number"), None);
    }

    #[test]
    fn receipt_failed_predicate() {
        let failed: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": "0xabc",
            "status": "0x0",
        }))
        .unwrap();
        assert!(failed.failed());

        let ok: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": "0xabc",
            "status": "0x1",
        }))
        .unwrap();
        assert!(!ok.failed());

        let no_status: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": "0xabc",
        }))
        .unwrap();
        assert!(!no_status.failed());
    }

    #[test]
    fn receipt_preserves_unmodeled_fields() {
        let raw = json!({
            "transactionHash": "0xabc",
            "status": "0x1",
            "gasUsed": "0x5208",
            "logs": [],
        });
        let receipt: TransactionReceipt = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(receipt.extra["gasUsed"], "0x5208");
        let back = serde_json::to_value(&receipt).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn receipt_revert_string_omitted_when_unset() {
        let receipt: TransactionReceipt = serde_json::from_value(json!({
            "transactionHash": "0xabc",
            "status": "0x1",
        }))
        .unwrap();
        let back = serde_json::to_value(&receipt).unwrap();
        assert!(back.get("revertString").is_none());
    }

    #[test]
    fn call_request_from_transaction() {
        let tx: Transaction = serde_json::from_value(json!({
            "hash": "0xabc",
            "blockNumber": "0x2",
            "from": "0x1111111111111111111111111111111111111111",
            "to": "0x2222222222222222222222222222222222222222",
            "input": "0xdeadbeef",
            "value": "0x0",
            "gas": "0x5208",
            "nonce": "0x7",
        }))
        .unwrap();
        let call = tx.as_call_request();
        assert_eq!(call["data"], "0xdeadbeef");
        assert_eq!(call["to"], "0x2222222222222222222222222222222222222222");
        assert_eq!(call["gas"], "0x5208");
        // Fields a node rejects for eth_call stay out.
        assert!(call.get("nonce").is_none());
        assert!(call.get("hash").is_none());
    }
}
