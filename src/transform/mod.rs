//! Transform layer - row expansion and tabular assembly.
//!
//! [`expand_orders`] flattens each (order, product) pair into one row;
//! [`Table`] collects those rows under a single reproducible column schema.

mod flatten;
mod table;

pub use flatten::{expand_order, expand_orders, FlatRow};
pub use table::Table;
