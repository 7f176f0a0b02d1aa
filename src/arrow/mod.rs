//! Arrow conversion layer.
//!
//! [`infer`] derives a typed column schema from an assembled table;
//! [`builder`] materializes the table as an Arrow RecordBatch and converts
//! batches back into tables for the lossless round-trip contract.

pub mod builder;
pub mod infer;

pub use builder::{arrow_to_table, table_to_arrow};
pub use infer::{infer_column_type, infer_schema, parse_timestamp_millis};
