//! chainshim-http — HTTP JSON-RPC transport for ChainShim.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chainshim_http::HttpRpcClient;
//! use chainshim_evm::RevertShim;
//!
//! # fn main() -> Result<(), chainshim_core::TransportError> {
//! let node = Arc::new(HttpRpcClient::default_for("http://127.0.0.1:8545")?);
//! let shim = RevertShim::wrap(node);
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::{HttpClientConfig, HttpRpcClient};
