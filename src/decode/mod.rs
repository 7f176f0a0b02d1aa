//! Decode layer - transforms raw bytes into normalized order records.
//!
//! The input boundary reads exactly one blob as UTF-8 encoded JSON text: a
//! JSON array of order objects. Parsing and normalization are pure; nothing
//! here touches the network or the filesystem.

mod orders;

pub use orders::{normalize_orders, Order};

use serde_json::Value;

use crate::error::{Error, Result};

/// Parse raw input bytes into a dynamic JSON value.
///
/// Malformed UTF-8 and malformed JSON syntax both surface as [`Error::Parse`];
/// structural validation of the parsed tree happens in [`normalize_orders`].
pub fn parse_json(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(Error::Parse)
}

/// Parse and normalize in one step: bytes in, order records out.
pub fn decode_orders(bytes: &[u8]) -> Result<Vec<Order>> {
    let root = parse_json(bytes)?;
    normalize_orders(root)
}
