//! orders2parquet - Flatten nested order documents into Parquet artifacts
//!
//! This crate transforms one nested order document (order -> customer ->
//! products[]) into a flat, columnar Parquet artifact suitable for columnar
//! storage and SQL querying, reproducibly inside an event-triggered,
//! stateless execution context.
//!
//! # Design Principles
//!
//! - **No I/O in the core**: parsing, flattening, and encoding are pure
//!   in-memory transforms; the storage collaborator is injected at the edge
//! - **No async**: one invocation runs start to finish synchronously
//! - **Deterministic**: row order, column order, and inferred types depend
//!   only on the input document, never on map iteration order
//! - **Total encoding**: type inference never fails; mixed content falls back
//!   to strings so the downstream schema catalog can always read the artifact
//!
//! # High-level API
//!
//! ```ignore
//! use orders2parquet::{MemoryStore, TransformInvoker};
//!
//! let store = MemoryStore::new();
//! store.insert("incoming/orders.json", input_bytes);
//!
//! let invoker = TransformInvoker::new(store, "curated/orders");
//! let report = invoker.run("incoming/orders.json")?;
//! println!("wrote {} rows to {}", report.rows, report.artifact);
//! ```
//!
//! # Lower-level API
//!
//! For control over individual pipeline steps:
//!
//! ```ignore
//! use orders2parquet::{decode_orders, expand_orders, encode_table, Table};
//!
//! let orders = decode_orders(bytes)?;          // normalize
//! let rows = expand_orders(&orders);           // one row per (order, product)
//! let table = Table::from_rows(rows);          // ordered column union
//! let parquet = encode_table(&table)?;         // typed columnar bytes
//! ```

pub mod arrow;
pub mod decode;
pub mod error;
pub mod naming;
pub mod output;
pub mod runtime;
pub mod storage;
pub mod transform;

pub use arrow::{arrow_to_table, infer_column_type, infer_schema, table_to_arrow};
pub use decode::{decode_orders, normalize_orders, parse_json, Order};
pub use error::{BoxError, Error, Result};
pub use naming::{artifact_filename, artifact_path, base_name};
pub use output::{encode_table, from_parquet, to_parquet, write_parquet};
pub use runtime::{InvocationReport, Stage, TransformInvoker};
pub use storage::{MemoryStore, ObjectStore};
pub use transform::{expand_order, expand_orders, FlatRow, Table};

/// Flatten raw document bytes into an assembled table.
///
/// Runs the Normalizing, Expanding, and Assembling stages in one step.
pub fn flatten_orders(bytes: &[u8]) -> Result<Table> {
    let orders = decode_orders(bytes)?;
    Ok(Table::from_rows(expand_orders(&orders)))
}

/// Transform raw document bytes straight to Parquet bytes.
///
/// The simplest way to use this crate when naming and storage are handled
/// elsewhere; [`TransformInvoker`] runs the full invocation instead.
pub fn orders_to_parquet(bytes: &[u8]) -> Result<Vec<u8>> {
    let table = flatten_orders(bytes)?;
    encode_table(&table)
}
