//! Parquet output serialization.
//!
//! Serializes Arrow RecordBatches to Snappy-compressed Parquet bytes and
//! reads them back for the round-trip contract. No disk or network I/O
//! happens here; the caller owns the transport.

use std::io::{Cursor, Write};

use arrow::array::RecordBatch;
use arrow::error::ArrowError;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::arrow::table_to_arrow;
use crate::error::{Error, Result};
use crate::transform::Table;

fn default_properties() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Write a RecordBatch as Parquet to any writer.
///
/// Uses Snappy compression unless `props` overrides it.
pub fn write_parquet<W: Write + Send>(
    batch: &RecordBatch,
    writer: W,
    props: Option<WriterProperties>,
) -> Result<()> {
    let props = props.unwrap_or_else(default_properties);

    let mut arrow_writer = ArrowWriter::try_new(writer, batch.schema(), Some(props))
        .map_err(|e| Error::Encode(ArrowError::ExternalError(Box::new(e))))?;

    arrow_writer
        .write(batch)
        .map_err(|e| Error::Encode(ArrowError::ExternalError(Box::new(e))))?;

    arrow_writer
        .close()
        .map_err(|e| Error::Encode(ArrowError::ExternalError(Box::new(e))))?;

    Ok(())
}

/// Serialize a RecordBatch to Parquet bytes in memory.
pub fn to_parquet(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    write_parquet(batch, &mut buffer, None)?;
    Ok(buffer.into_inner())
}

/// Encode an assembled table straight to Parquet bytes: schema inference,
/// Arrow conversion, and serialization in one step.
pub fn encode_table(table: &Table) -> Result<Vec<u8>> {
    let batch = table_to_arrow(table).map_err(Error::Encode)?;
    to_parquet(&batch)
}

/// Read Parquet bytes back into RecordBatches: the encoder's inverse.
pub fn from_parquet(bytes: Vec<u8>) -> Result<Vec<RecordBatch>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes))
        .map_err(|e| Error::Encode(ArrowError::ExternalError(Box::new(e))))?
        .build()
        .map_err(|e| Error::Encode(ArrowError::ExternalError(Box::new(e))))?;

    reader
        .collect::<std::result::Result<Vec<_>, ArrowError>>()
        .map_err(Error::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrow::arrow_to_table;
    use crate::transform::FlatRow;
    use serde_json::json;

    fn sample_table() -> Table {
        let mut rows = Vec::new();
        for (sku, qty, price) in [("P1", 2, 9.5), ("P2", 1, 20.0), ("P3", 4, 0.5)] {
            let mut row = FlatRow::new();
            row.insert("sku".to_string(), json!(sku));
            row.insert("qty".to_string(), json!(qty));
            row.insert("price".to_string(), json!(price));
            rows.push(row);
        }
        Table::from_rows(rows)
    }

    #[test]
    fn test_encode_table_has_parquet_magic() {
        let bytes = encode_table(&sample_table()).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(&bytes[0..4], b"PAR1");
    }

    #[test]
    fn test_parquet_round_trip_reproduces_table() {
        let table = sample_table();
        let bytes = encode_table(&table).unwrap();

        let batches = from_parquet(bytes).unwrap();
        assert_eq!(batches.len(), 1);

        let restored = arrow_to_table(&batches[0]).unwrap();
        assert_eq!(restored.columns(), table.columns());
        assert_eq!(restored.len(), table.len());
        for row_idx in 0..table.len() {
            for column in table.columns() {
                assert_eq!(
                    restored.value(row_idx, column),
                    table.value(row_idx, column)
                );
            }
        }
    }

    #[test]
    fn test_round_trip_preserves_nulls() {
        let mut first = FlatRow::new();
        first.insert("sku".to_string(), json!("P1"));
        first.insert("note".to_string(), json!("gift"));
        let mut second = FlatRow::new();
        second.insert("sku".to_string(), json!("P2"));
        let table = Table::from_rows(vec![first, second]);

        let batches = from_parquet(encode_table(&table).unwrap()).unwrap();
        let restored = arrow_to_table(&batches[0]).unwrap();

        assert_eq!(restored.value(0, "note"), &json!("gift"));
        assert_eq!(restored.value(1, "note"), &serde_json::Value::Null);
    }

    #[test]
    fn test_from_parquet_rejects_garbage() {
        let result = from_parquet(b"not a parquet file".to_vec());
        assert!(matches!(result, Err(Error::Encode(_))));
    }

    #[test]
    fn test_write_parquet_custom_properties() {
        let batch = table_to_arrow(&sample_table()).unwrap();
        let mut buffer = Cursor::new(Vec::new());
        let props = WriterProperties::builder()
            .set_compression(Compression::UNCOMPRESSED)
            .build();

        write_parquet(&batch, &mut buffer, Some(props)).unwrap();

        let bytes = buffer.into_inner();
        assert_eq!(&bytes[0..4], b"PAR1");
        assert_eq!(from_parquet(bytes).unwrap()[0].num_rows(), 3);
    }
}
