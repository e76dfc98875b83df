//! chainshim-evm — revert-preserving RPC interception for EVM test harnesses.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chainshim_core::RpcTransport;
//! use chainshim_evm::RevertShim;
//!
//! fn attach(backend: Arc<dyn RpcTransport>) -> RevertShim {
//!     // Hand the shim to the test harness in place of the raw backend.
//!     RevertShim::wrap(backend)
//! }
//! ```
//!
//! A transaction that reverts on-chain now gets sent and mined, the send
//! rejects with the receipt attached, and the receipt carries the decoded
//! revert reason under `revertString`.

pub mod client;
pub mod revert;
pub mod shim;
pub mod types;

pub use client::{ClientConfig, ClientError, EthClient};
pub use revert::{
    decode_revert_data, decode_revert_error, RevertDecodeError, ERROR_STRING_SELECTOR,
};
pub use shim::{RevertShim, FALLBACK_GAS_LIMIT};
pub use types::{Transaction, TransactionReceipt};
