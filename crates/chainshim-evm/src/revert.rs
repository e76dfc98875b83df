//! Decode `Error(string)` revert strings.
//!
//! EVM encodes `require(cond, "message")` as:
//! `0x08c379a0` ++ ABI-encode(string)
//!
//! The selector is `keccak256("Error(string)")[..4]`. The string payload is
//! read from a fixed offset — past the selector, the 32-byte offset word and
//! the 32-byte length word — and the ABI right-padding is stripped as NUL
//! characters rather than sliced off by the length word. This mirrors what
//! the simulation tooling itself reports for nonstandard paddings.

use thiserror::Error;

use chainshim_core::request::JsonRpcError;

/// The 4-byte selector for `Error(string)`, as a `0x`-prefixed hex string.
pub const ERROR_STRING_SELECTOR: &str = "0x08c379a0";

/// Hex-character offset of the raw string bytes in revert data:
/// `0x` (2) + selector (8) + offset word (64) + length word (64).
const PAYLOAD_OFFSET: usize = 138;

/// Errors from decoding the payload region of a revert.
///
/// Only raised when the selector matched but the bytes at the payload
/// offset could not be interpreted; a missing or foreign-selector payload
/// decodes to the empty string instead.
#[derive(Debug, Error)]
pub enum RevertDecodeError {
    #[error("revert payload is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("revert payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Decode the human-readable revert reason from hex-encoded revert data.
///
/// Returns the empty string when `data` does not carry an `Error(string)`
/// payload. Never panics; malformed bytes in the payload region surface as
/// [`RevertDecodeError`].
pub fn decode_revert_data(data: &str) -> Result<String, RevertDecodeError> {
    if !data.starts_with(ERROR_STRING_SELECTOR) {
        return Ok(String::new());
    }
    let payload = data.get(PAYLOAD_OFFSET..).unwrap_or("");
    let bytes = hex::decode(payload)?;
    let text = String::from_utf8(bytes)?;
    Ok(text.replace('\0', ""))
}

/// Decode the revert reason carried by a node-side call failure.
///
/// An error with no `data` field, or with data that is not
/// selector-prefixed, yields the empty string.
pub fn decode_revert_error(error: &JsonRpcError) -> Result<String, RevertDecodeError> {
    match error.revert_data() {
        Some(data) => decode_revert_data(data),
        None => Ok(String::new()),
    }
}
