//! Order document normalization.
//!
//! Validates and canonicalizes the shape of one input document
//! (order → customer → products[]) without reinterpreting its data. Unexpected
//! extra fields are passed through untouched so newer producers keep working
//! against this decoder.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Optional order-level scalars that are defaulted to the null sentinel when
/// absent, so every invocation emits the same baseline column set.
const OPTIONAL_ORDER_SCALARS: &[&str] = &["order_date", "total_amount"];

/// One normalized order record.
///
/// `scalars` holds every top-level field except `customer` and `products`,
/// in document order, with `order_id` guaranteed present as a string.
#[derive(Debug, Clone)]
pub struct Order {
    /// Order-level scalar fields (`order_id`, `order_date`, `total_amount`,
    /// plus any pass-through extras).
    pub scalars: Map<String, Value>,
    /// Flat customer attribute map; empty when the document carries none.
    pub customer: Map<String, Value>,
    /// Ordered product attribute maps; may be empty (a zero-product order
    /// contributes no output rows).
    pub products: Vec<Map<String, Value>>,
}

/// Validate and canonicalize a parsed document into order records.
///
/// Fails with [`Error::Schema`] when the top-level value is not a sequence,
/// when an element is not an object, when `order_id` is absent, or when
/// `customer`/`products` carry the wrong shape. Pure: no side effects.
pub fn normalize_orders(root: Value) -> Result<Vec<Order>> {
    let elements = match root {
        Value::Array(elements) => elements,
        other => {
            return Err(Error::Schema(format!(
                "top-level value must be an array of orders, got {}",
                type_name(&other)
            )))
        }
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(idx, element)| normalize_order(idx, element))
        .collect()
}

fn normalize_order(idx: usize, element: Value) -> Result<Order> {
    let mut object = match element {
        Value::Object(map) => map,
        other => {
            return Err(Error::Schema(format!(
                "order {idx}: expected an object, got {}",
                type_name(&other)
            )))
        }
    };

    let customer = match object.shift_remove("customer") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(Error::Schema(format!(
                "order {idx}: customer must be an object, got {}",
                type_name(&other)
            )))
        }
    };

    let products = match object.shift_remove("products") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(pidx, item)| match item {
                Value::Object(map) => Ok(map),
                other => Err(Error::Schema(format!(
                    "order {idx}: product {pidx} must be an object, got {}",
                    type_name(&other)
                ))),
            })
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(Error::Schema(format!(
                "order {idx}: products must be an array, got {}",
                type_name(&other)
            )))
        }
    };

    let mut scalars = object;
    coerce_order_id(idx, &mut scalars)?;
    for key in OPTIONAL_ORDER_SCALARS {
        if !scalars.contains_key(*key) {
            scalars.insert((*key).to_string(), Value::Null);
        }
    }

    Ok(Order {
        scalars,
        customer,
        products,
    })
}

/// `order_id` is the one required field: it must be present and identify the
/// order as a string. Numeric identifiers are coerced to their decimal string.
fn coerce_order_id(idx: usize, scalars: &mut Map<String, Value>) -> Result<()> {
    match scalars.get("order_id") {
        Some(Value::String(s)) if !s.is_empty() => Ok(()),
        Some(Value::Number(n)) => {
            let coerced = Value::String(n.to_string());
            scalars.insert("order_id".to_string(), coerced);
            Ok(())
        }
        Some(other) => Err(Error::Schema(format!(
            "order {idx}: order_id must be a non-empty string, got {}",
            type_name(other)
        ))),
        None => Err(Error::Schema(format!("order {idx}: missing order_id"))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
