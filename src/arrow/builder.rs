//! Arrow RecordBatch builder.
//!
//! Converts an assembled table to an Arrow RecordBatch using schema-driven
//! building, and converts batches back to tables for the round-trip contract.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, BooleanBuilder, Float64Array, Float64Builder, Int64Array,
    Int64Builder, RecordBatch, StringArray, StringBuilder, TimestampMillisecondArray,
    TimestampMillisecondBuilder,
};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::error::ArrowError;
use chrono::{DateTime, SecondsFormat};
use serde_json::{Number, Value};

use super::infer::{infer_schema, parse_timestamp_millis};
use crate::transform::{FlatRow, Table};

/// Convert a table into an Arrow RecordBatch.
///
/// The schema is inferred from the table itself, so appends cannot mismatch
/// in practice; the error path exists for defensive completeness.
pub fn table_to_arrow(table: &Table) -> Result<RecordBatch, ArrowError> {
    let schema = Arc::new(infer_schema(table));
    if table.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let arrays: Vec<ArrayRef> = schema
        .fields()
        .iter()
        .map(|field| {
            let mut builder = ColumnBuilder::new(field.data_type(), table.len())?;
            for value in table.column_values(field.name()) {
                builder.append(value)?;
            }
            Ok(builder.finish())
        })
        .collect::<Result<_, ArrowError>>()?;

    RecordBatch::try_new(schema, arrays)
}

/// Convert a RecordBatch back into a table: the inverse of [`table_to_arrow`].
///
/// Timestamp cells come back as RFC 3339 UTC strings; everything else maps
/// onto the same tagged-variant values it was built from.
pub fn arrow_to_table(batch: &RecordBatch) -> Result<Table, ArrowError> {
    let schema = batch.schema();
    let mut rows: Vec<FlatRow> = vec![FlatRow::new(); batch.num_rows()];

    for (idx, field) in schema.fields().iter().enumerate() {
        let column = batch.column(idx);
        for (row_idx, row) in rows.iter_mut().enumerate() {
            let value = cell_value(column, field.data_type(), row_idx)?;
            row.insert(field.name().clone(), value);
        }
    }

    Ok(Table::from_rows(rows))
}

fn cell_value(array: &ArrayRef, data_type: &DataType, row: usize) -> Result<Value, ArrowError> {
    if array.is_null(row) {
        return Ok(Value::Null);
    }
    match data_type {
        DataType::Boolean => {
            let array = downcast::<BooleanArray>(array, data_type)?;
            Ok(Value::Bool(array.value(row)))
        }
        DataType::Int64 => {
            let array = downcast::<Int64Array>(array, data_type)?;
            Ok(Value::Number(array.value(row).into()))
        }
        DataType::Float64 => {
            let array = downcast::<Float64Array>(array, data_type)?;
            Ok(Number::from_f64(array.value(row))
                .map(Value::Number)
                .unwrap_or(Value::Null))
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            let array = downcast::<TimestampMillisecondArray>(array, data_type)?;
            let millis = array.value(row);
            let formatted = DateTime::from_timestamp_millis(millis)
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
                .ok_or_else(|| {
                    ArrowError::InvalidArgumentError(format!(
                        "timestamp {millis} is out of representable range"
                    ))
                })?;
            Ok(Value::String(formatted))
        }
        DataType::Utf8 => {
            let array = downcast::<StringArray>(array, data_type)?;
            Ok(Value::String(array.value(row).to_string()))
        }
        unsupported => Err(ArrowError::InvalidArgumentError(format!(
            "unsupported column type: {unsupported:?}"
        ))),
    }
}

fn downcast<'a, T: Array + 'static>(
    array: &'a ArrayRef,
    data_type: &DataType,
) -> Result<&'a T, ArrowError> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        ArrowError::InvalidArgumentError(format!("column does not match its {data_type:?} type"))
    })
}

/// Internal builder enum for the supported Arrow column types.
///
/// Allows dynamic column building from the inferred schema without generics.
enum ColumnBuilder {
    Timestamp(TimestampMillisecondBuilder),
    Int64(Int64Builder),
    Float64(Float64Builder),
    Boolean(BooleanBuilder),
    String(StringBuilder),
}

impl ColumnBuilder {
    fn new(data_type: &DataType, capacity: usize) -> Result<Self, ArrowError> {
        match data_type {
            DataType::Timestamp(TimeUnit::Millisecond, _) => Ok(ColumnBuilder::Timestamp(
                TimestampMillisecondBuilder::with_capacity(capacity),
            )),
            DataType::Int64 => Ok(ColumnBuilder::Int64(Int64Builder::with_capacity(capacity))),
            DataType::Float64 => Ok(ColumnBuilder::Float64(Float64Builder::with_capacity(
                capacity,
            ))),
            DataType::Boolean => Ok(ColumnBuilder::Boolean(BooleanBuilder::with_capacity(
                capacity,
            ))),
            DataType::Utf8 => Ok(ColumnBuilder::String(StringBuilder::with_capacity(
                capacity,
                capacity * 32,
            ))),
            unsupported => Err(ArrowError::InvalidArgumentError(format!(
                "unsupported Arrow data type: {unsupported:?}"
            ))),
        }
    }

    fn append(&mut self, value: &Value) -> Result<(), ArrowError> {
        match self {
            ColumnBuilder::Timestamp(builder) => append_timestamp(builder, value),
            ColumnBuilder::Int64(builder) => append_int64(builder, value),
            ColumnBuilder::Float64(builder) => append_float64(builder, value),
            ColumnBuilder::Boolean(builder) => append_boolean(builder, value),
            ColumnBuilder::String(builder) => append_string(builder, value),
        }
    }

    fn finish(self) -> ArrayRef {
        match self {
            ColumnBuilder::Timestamp(mut builder) => Arc::new(builder.finish()),
            ColumnBuilder::Int64(mut builder) => Arc::new(builder.finish()),
            ColumnBuilder::Float64(mut builder) => Arc::new(builder.finish()),
            ColumnBuilder::Boolean(mut builder) => Arc::new(builder.finish()),
            ColumnBuilder::String(mut builder) => Arc::new(builder.finish()),
        }
    }
}

fn append_timestamp(
    builder: &mut TimestampMillisecondBuilder,
    value: &Value,
) -> Result<(), ArrowError> {
    match value {
        Value::String(s) => match parse_timestamp_millis(s) {
            Some(millis) => {
                builder.append_value(millis);
                Ok(())
            }
            None => Err(ArrowError::InvalidArgumentError(format!(
                "cannot convert {s:?} to timestamp"
            ))),
        },
        Value::Null => {
            builder.append_null();
            Ok(())
        }
        other => Err(ArrowError::InvalidArgumentError(format!(
            "cannot convert {} to timestamp",
            value_type_name(other)
        ))),
    }
}

fn append_int64(builder: &mut Int64Builder, value: &Value) -> Result<(), ArrowError> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => {
                builder.append_value(i);
                Ok(())
            }
            None => Err(ArrowError::InvalidArgumentError(format!(
                "number {n} does not fit in int64"
            ))),
        },
        Value::Null => {
            builder.append_null();
            Ok(())
        }
        other => Err(ArrowError::InvalidArgumentError(format!(
            "cannot convert {} to int64",
            value_type_name(other)
        ))),
    }
}

fn append_float64(builder: &mut Float64Builder, value: &Value) -> Result<(), ArrowError> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) => {
                builder.append_value(f);
                Ok(())
            }
            None => Err(ArrowError::InvalidArgumentError(format!(
                "number {n} is not representable as float64"
            ))),
        },
        Value::Null => {
            builder.append_null();
            Ok(())
        }
        other => Err(ArrowError::InvalidArgumentError(format!(
            "cannot convert {} to float64",
            value_type_name(other)
        ))),
    }
}

fn append_boolean(builder: &mut BooleanBuilder, value: &Value) -> Result<(), ArrowError> {
    match value {
        Value::Bool(b) => {
            builder.append_value(*b);
            Ok(())
        }
        Value::Null => {
            builder.append_null();
            Ok(())
        }
        other => Err(ArrowError::InvalidArgumentError(format!(
            "cannot convert {} to boolean",
            value_type_name(other)
        ))),
    }
}

/// Utf8 is the total fallback: every value has a string rendition. Complex
/// values serialize as JSON text.
fn append_string(builder: &mut StringBuilder, value: &Value) -> Result<(), ArrowError> {
    match value {
        Value::String(s) => {
            builder.append_value(s);
            Ok(())
        }
        Value::Number(n) => {
            builder.append_value(n.to_string());
            Ok(())
        }
        Value::Bool(b) => {
            builder.append_value(b.to_string());
            Ok(())
        }
        Value::Null => {
            builder.append_null();
            Ok(())
        }
        Value::Array(_) | Value::Object(_) => {
            let json = serde_json::to_string(value)
                .map_err(|e| ArrowError::ExternalError(Box::new(e)))?;
            builder.append_value(&json);
            Ok(())
        }
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
