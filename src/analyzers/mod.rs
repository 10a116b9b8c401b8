//! Per-region aggregation of cleaned resale transactions.

pub mod aggregate;
pub mod types;
pub mod utility;
