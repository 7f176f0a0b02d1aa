//! Row expansion: cartesian join of order, customer, and product fields.
//!
//! # Column naming contract
//!
//! Merge precedence is product > customer > order. When a key appears in more
//! than one source anywhere in the expanded document, the losing sources are
//! renamed with a stable prefix (`order_<key>`, `customer_<key>`) and the
//! winning source keeps the bare key, so nothing is silently overwritten. The
//! rename decision is made once per column over the whole document, never per
//! row: a bare column always holds values from exactly one source, even when
//! only some products carry the colliding key. The renaming depends only on
//! the document shape and is therefore identical across invocations.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::decode::Order;

/// One fully merged flat record for a single (order, product) pairing.
///
/// Insertion-ordered so downstream column discovery follows document order.
pub type FlatRow = Map<String, Value>;

/// Expand every order into flat rows, one per product.
///
/// Output row order is deterministic: outer iteration preserves document
/// order, inner iteration preserves product order. An order with an empty
/// product list contributes zero rows; it is not silently dropped data but
/// the documented contract - callers needing an order-level-only record must
/// request it explicitly, which this core does not do.
pub fn expand_orders(orders: &[Order]) -> Vec<FlatRow> {
    let mut customer_keys: HashSet<&str> = HashSet::new();
    let mut product_keys: HashSet<&str> = HashSet::new();
    for order in orders {
        customer_keys.extend(order.customer.keys().map(String::as_str));
        for product in &order.products {
            product_keys.extend(product.keys().map(String::as_str));
        }
    }

    let mut rows = Vec::new();
    for order in orders {
        for product in &order.products {
            rows.push(merge_row(order, product, &customer_keys, &product_keys));
        }
    }
    rows
}

/// Expand a single order: exactly `order.products.len()` rows, each carrying
/// all order-level and customer-level fields unchanged. Rename decisions are
/// scoped to this order alone; [`expand_orders`] scopes them to the whole
/// document.
pub fn expand_order(order: &Order) -> Vec<FlatRow> {
    expand_orders(std::slice::from_ref(order))
}

fn merge_row(
    order: &Order,
    product: &Map<String, Value>,
    customer_keys: &HashSet<&str>,
    product_keys: &HashSet<&str>,
) -> FlatRow {
    let mut row = FlatRow::new();

    for (key, value) in &order.scalars {
        let column = if customer_keys.contains(key.as_str()) || product_keys.contains(key.as_str())
        {
            format!("order_{key}")
        } else {
            key.clone()
        };
        row.insert(column, value.clone());
    }

    for (key, value) in &order.customer {
        let column = if product_keys.contains(key.as_str()) {
            format!("customer_{key}")
        } else {
            key.clone()
        };
        row.insert(column, value.clone());
    }

    for (key, value) in product {
        row.insert(key.clone(), value.clone());
    }

    row
}
