//! Transform invoker: the entry point of one invocation.
//!
//! Drives the stage sequence `Fetching -> Normalizing -> Expanding ->
//! Assembling -> Encoding -> Naming -> Handoff -> Done`. Every arrow is a
//! single forward transition; a failure at any stage terminates the
//! invocation with the failing stage and cause, and no retry happens inside
//! the core. The artifact is handed off exactly once, only after encoding and
//! naming both succeeded, so no partial artifact is ever written.

use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::datatypes::{DataType, Field, Schema};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::arrow::table_to_arrow;
use crate::decode;
use crate::error::{Error, Result};
use crate::naming;
use crate::output;
use crate::storage::ObjectStore;
use crate::transform::{expand_orders, Table};

/// Pipeline stages, in execution order. Reported alongside every error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Normalizing,
    Expanding,
    Assembling,
    Encoding,
    Naming,
    Handoff,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetching => "fetching",
            Stage::Normalizing => "normalizing",
            Stage::Expanding => "expanding",
            Stage::Assembling => "assembling",
            Stage::Encoding => "encoding",
            Stage::Naming => "naming",
            Stage::Handoff => "handoff",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// The stage at which this error terminates an invocation.
    pub fn stage(&self) -> Stage {
        match self {
            Error::Fetch { .. } => Stage::Fetching,
            Error::Parse(_) | Error::Schema(_) => Stage::Normalizing,
            Error::Encode(_) => Stage::Encoding,
            Error::StorageWrite { .. } => Stage::Handoff,
        }
    }
}

/// Outcome of one successful invocation, serializable so the external
/// harness can log it structurally.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationReport {
    /// Logical location of the input blob.
    pub source: String,
    /// Destination path of the emitted artifact.
    pub artifact: String,
    /// Rows in the emitted table.
    pub rows: usize,
    /// Artifact size in bytes.
    pub bytes: usize,
}

/// Orchestrates one transform invocation against an injected storage
/// collaborator.
///
/// Stateless across invocations: each call to [`run`](Self::run) owns its own
/// buffers for the duration of the call and releases them on return. Invoked
/// twice for the same input (duplicate trigger delivery), it produces two
/// distinct, independently valid artifacts - uniqueness is time-based, not
/// input-hash-based.
pub struct TransformInvoker<S> {
    storage: S,
    output_prefix: String,
}

impl<S: ObjectStore> TransformInvoker<S> {
    /// `output_prefix` is the stable destination prefix all artifacts of this
    /// invoker land under.
    pub fn new(storage: S, output_prefix: impl Into<String>) -> Self {
        Self {
            storage,
            output_prefix: output_prefix.into(),
        }
    }

    /// The injected storage collaborator.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Run one invocation stamped with the current wall-clock time.
    pub fn run(&self, source: &str) -> Result<InvocationReport> {
        self.run_at(source, Utc::now())
    }

    /// Run one invocation with an explicit invocation timestamp.
    ///
    /// The timestamp feeds the artifact name only; tests use this to replay
    /// invocations at controlled instants.
    pub fn run_at(&self, source: &str, invoked_at: DateTime<Utc>) -> Result<InvocationReport> {
        match self.execute(source, invoked_at) {
            Ok(report) => {
                info!(
                    source = %report.source,
                    artifact = %report.artifact,
                    rows = report.rows,
                    bytes = report.bytes,
                    "transform complete"
                );
                Ok(report)
            }
            Err(err) => {
                error!(stage = %err.stage(), source, error = %err, "transform failed");
                Err(err)
            }
        }
    }

    fn execute(&self, source: &str, invoked_at: DateTime<Utc>) -> Result<InvocationReport> {
        debug!(stage = %Stage::Fetching, source);
        let bytes = self.storage.fetch(source).map_err(|e| Error::Fetch {
            location: source.to_string(),
            source: e,
        })?;

        debug!(stage = %Stage::Normalizing, input_bytes = bytes.len());
        let root = decode::parse_json(&bytes)?;
        let orders = decode::normalize_orders(root)?;

        debug!(stage = %Stage::Expanding, orders = orders.len());
        let rows = expand_orders(&orders);

        debug!(stage = %Stage::Assembling, rows = rows.len());
        let table = Table::from_rows(rows);

        debug!(stage = %Stage::Encoding, columns = table.columns().len());
        let batch = if table.is_empty() {
            // Parquet cannot represent a zero-column schema. A document that
            // expands to no rows still emits a discoverable zero-row artifact
            // carrying the baseline order columns (Utf8, matching the
            // all-null inference default).
            baseline_batch()
        } else {
            table_to_arrow(&table).map_err(Error::Encode)?
        };
        let artifact = output::to_parquet(&batch)?;

        debug!(stage = %Stage::Naming);
        let path = naming::artifact_path(&self.output_prefix, naming::base_name(source), invoked_at);

        debug!(stage = %Stage::Handoff, path = %path, bytes = artifact.len());
        self.storage
            .store(&path, &artifact)
            .map_err(|e| Error::StorageWrite {
                path: path.clone(),
                source: e,
            })?;

        Ok(InvocationReport {
            source: source.to_string(),
            artifact: path,
            rows: table.len(),
            bytes: artifact.len(),
        })
    }
}

fn baseline_batch() -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("order_id", DataType::Utf8, true),
        Field::new("order_date", DataType::Utf8, true),
        Field::new("total_amount", DataType::Utf8, true),
    ]);
    RecordBatch::new_empty(Arc::new(schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn invoker() -> TransformInvoker<MemoryStore> {
        TransformInvoker::new(MemoryStore::new(), "curated/orders")
    }

    fn stamp(s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, s).unwrap()
    }

    #[test]
    fn test_successful_invocation_stores_named_artifact() {
        let invoker = invoker();
        invoker.storage.insert(
            "incoming/orders.json",
            br#"[{"order_id":"O1","customer":{"customer_id":"C1"},
                 "products":[{"sku":"P1","qty":2},{"sku":"P2","qty":1}]}]"#
                .to_vec(),
        );

        let report = invoker.run_at("incoming/orders.json", stamp(5)).unwrap();

        assert_eq!(
            report.artifact,
            "curated/orders/orders_20240102_030405.parquet"
        );
        assert_eq!(report.rows, 2);
        let stored = invoker.storage.get(&report.artifact).unwrap();
        assert_eq!(stored.len(), report.bytes);
        assert_eq!(&stored[0..4], b"PAR1");
    }

    #[test]
    fn test_fetch_failure_reports_fetching_stage() {
        let err = invoker().run_at("missing.json", stamp(0)).unwrap_err();
        assert_eq!(err.stage(), Stage::Fetching);
    }

    #[test]
    fn test_parse_failure_reports_normalizing_stage() {
        let invoker = invoker();
        invoker.storage.insert("bad.json", b"[{".to_vec());
        let err = invoker.run_at("bad.json", stamp(0)).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert_eq!(err.stage(), Stage::Normalizing);
    }

    #[test]
    fn test_schema_failure_produces_no_artifact() {
        let invoker = invoker();
        invoker
            .storage
            .insert("bad.json", br#"[{"order_date":"2024-01-01"}]"#.to_vec());

        let err = invoker.run_at("bad.json", stamp(0)).unwrap_err();

        assert!(matches!(err, Error::Schema(_)));
        assert_eq!(invoker.storage.paths(), vec!["bad.json".to_string()]);
    }

    #[test]
    fn test_duplicate_delivery_yields_distinct_artifacts() {
        let invoker = invoker();
        invoker.storage.insert(
            "incoming/orders.json",
            br#"[{"order_id":"O1","products":[{"sku":"P1"}]}]"#.to_vec(),
        );

        let first = invoker.run_at("incoming/orders.json", stamp(5)).unwrap();
        let second = invoker.run_at("incoming/orders.json", stamp(6)).unwrap();

        assert_ne!(first.artifact, second.artifact);
        assert!(invoker.storage.get(&first.artifact).is_some());
        assert!(invoker.storage.get(&second.artifact).is_some());
    }

    #[test]
    fn test_zero_product_document_emits_zero_row_artifact() {
        let invoker = invoker();
        invoker.storage.insert(
            "incoming/orders.json",
            br#"[{"order_id":"O1","products":[]}]"#.to_vec(),
        );

        let report = invoker.run_at("incoming/orders.json", stamp(0)).unwrap();

        assert_eq!(report.rows, 0);
        let stored = invoker.storage.get(&report.artifact).unwrap();
        let batches = crate::output::from_parquet(stored).unwrap();
        let total_rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total_rows, 0);
    }

    #[test]
    fn test_report_serializes() {
        let report = InvocationReport {
            source: "incoming/orders.json".to_string(),
            artifact: "curated/orders/orders_20240102_030405.parquet".to_string(),
            rows: 2,
            bytes: 1024,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rows"], 2);
        assert_eq!(json["source"], "incoming/orders.json");
    }
}
