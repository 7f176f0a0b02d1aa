//! Column type inference.
//!
//! Inference is deterministic and total: every predicate below quantifies
//! over all non-null values of a column, so the inferred type is independent
//! of value order and unparseable mixed content falls back to Utf8 instead of
//! erroring. The downstream schema catalog must always be able to read the
//! artifact, so there is no failure path here.

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::transform::Table;

/// Parse a string as a timestamp, returning epoch milliseconds.
///
/// Accepted shapes: RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`,
/// and bare `YYYY-MM-DD` dates (midnight UTC). Anything else is not a
/// timestamp for inference purposes.
pub fn parse_timestamp_millis(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN).and_utc().timestamp_millis());
    }
    None
}

/// Infer the Arrow type for one column of values.
///
/// Policy, over non-null values only: all booleans -> Boolean; else all
/// integral numbers -> Int64; else all numbers -> Float64; else all
/// timestamp-parseable strings -> Timestamp(ms); else Utf8. A column with no
/// non-null values defaults to Utf8.
pub fn infer_column_type<'a>(values: impl Iterator<Item = &'a Value>) -> DataType {
    let mut saw_value = false;
    let mut all_boolean = true;
    let mut all_integral = true;
    let mut all_numeric = true;
    let mut all_timestamp = true;

    for value in values {
        match value {
            Value::Null => continue,
            Value::Bool(_) => {
                all_integral = false;
                all_numeric = false;
                all_timestamp = false;
            }
            Value::Number(n) => {
                all_boolean = false;
                all_timestamp = false;
                if n.as_i64().is_none() {
                    all_integral = false;
                }
            }
            Value::String(s) => {
                all_boolean = false;
                all_integral = false;
                all_numeric = false;
                if parse_timestamp_millis(s).is_none() {
                    all_timestamp = false;
                }
            }
            Value::Array(_) | Value::Object(_) => {
                all_boolean = false;
                all_integral = false;
                all_numeric = false;
                all_timestamp = false;
            }
        }
        saw_value = true;
        if !(all_boolean || all_integral || all_numeric || all_timestamp) {
            break;
        }
    }

    if !saw_value {
        return DataType::Utf8;
    }
    if all_boolean {
        DataType::Boolean
    } else if all_integral {
        DataType::Int64
    } else if all_numeric {
        DataType::Float64
    } else if all_timestamp {
        DataType::Timestamp(TimeUnit::Millisecond, None)
    } else {
        DataType::Utf8
    }
}

/// Infer the full Arrow schema for a table, one field per column in schema
/// order. Every field is nullable: any cell may be the null sentinel.
pub fn infer_schema(table: &Table) -> Schema {
    let fields: Vec<Field> = table
        .columns()
        .iter()
        .map(|column| {
            let data_type = infer_column_type(table.column_values(column));
            Field::new(column, data_type, true)
        })
        .collect();
    Schema::new(fields)
}
