//! Output serialization.
//!
//! Parquet encoding and decoding of RecordBatches, kept as an in-memory
//! boundary so callers choose the transport.

mod parquet;

pub use parquet::{encode_table, from_parquet, to_parquet, write_parquet};
