//! Tabular assembly: flat rows under one reproducible column schema.

use serde_json::Value;

use super::FlatRow;

static NULL: Value = Value::Null;

/// An ordered sequence of flat rows sharing a single column schema.
///
/// The column schema is the ordered union of every distinct column name seen,
/// in first-seen order. Rows are stored sparse; a missing cell reads as the
/// null sentinel, never omitted. Because rows are insertion-ordered maps the
/// schema is identical for two documents with the same shape, independent of
/// their data values.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<FlatRow>,
}

impl Table {
    /// Assemble rows into a table, computing the column schema as the ordered
    /// first-seen union of all column names.
    pub fn from_rows(rows: Vec<FlatRow>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    /// Column names in schema order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in assembly order.
    pub fn rows(&self) -> &[FlatRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value at (row, column name); the null sentinel when absent.
    pub fn value(&self, row: usize, column: &str) -> &Value {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL)
    }

    /// Iterate one column top to bottom, padding missing cells with null.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(column).unwrap_or(&NULL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_orders;
    use crate::transform::expand_orders;
    use serde_json::json;

    fn table_from(doc: &str) -> Table {
        let orders = decode_orders(doc.as_bytes()).unwrap();
        Table::from_rows(expand_orders(&orders))
    }

    #[test]
    fn test_columns_in_first_seen_order() {
        let table = table_from(
            r#"[{
                "order_id": "O1",
                "customer": {"customer_id": "C1"},
                "products": [{"sku": "P1"}]
            }]"#,
        );
        assert_eq!(
            table.columns(),
            &[
                "order_id",
                "order_date",
                "total_amount",
                "customer_id",
                "sku"
            ]
        );
    }

    #[test]
    fn test_union_over_uneven_rows() {
        let table = table_from(
            r#"[{
                "order_id": "O1",
                "products": [{"sku": "P1"}, {"sku": "P2", "discount": 0.1}]
            }]"#,
        );
        assert!(table.columns().contains(&"discount".to_string()));
        // First row never carried the column; it reads as null, not absent.
        assert_eq!(table.value(0, "discount"), &Value::Null);
        assert_eq!(table.value(1, "discount"), &json!(0.1));
    }

    #[test]
    fn test_schema_stability_across_documents() {
        let a = table_from(
            r#"[{"order_id": "O1", "total_amount": 10,
                 "customer": {"customer_id": "C1", "region": "EU"},
                 "products": [{"sku": "P1", "qty": 1}]}]"#,
        );
        let b = table_from(
            r#"[{"order_id": "O9", "total_amount": 999,
                 "customer": {"customer_id": "C42", "region": "US"},
                 "products": [{"sku": "XX", "qty": 7}]}]"#,
        );
        assert_eq!(a.columns(), b.columns());
    }

    #[test]
    fn test_empty_table() {
        let table = table_from(r#"[{"order_id": "O1", "products": []}]"#);
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
        assert_eq!(table.value(0, "anything"), &Value::Null);
    }

    #[test]
    fn test_column_values_pads_with_null() {
        let table = table_from(
            r#"[{
                "order_id": "O1",
                "products": [{"sku": "P1", "note": "gift"}, {"sku": "P2"}]
            }]"#,
        );
        let notes: Vec<_> = table.column_values("note").collect();
        assert_eq!(notes, vec![&json!("gift"), &Value::Null]);
    }
}
