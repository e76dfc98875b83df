//! chainshim-core — foundation traits and types for ChainShim.
//!
//! # Overview
//!
//! ChainShim is a transparent interception layer placed between a test
//! harness and a blockchain simulation backend, so that transactions which
//! revert on-chain still get sent, mined and reported with a decoded revert
//! reason. The core crate defines:
//!
//! - [`RpcTransport`] — the backend capability trait every layer implements
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`] — wire types
//! - [`TransportError`] — structured error type, including the
//!   receipt-carrying [`TransportError::Reverted`] confirmation failure

pub mod error;
pub mod request;
pub mod transport;

pub use error::TransportError;
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, RpcParam};
pub use transport::RpcTransport;
