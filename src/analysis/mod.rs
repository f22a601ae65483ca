//! Aggregation over the normalized conversation table.
//!
//! Each function derives one independent summary table; none of them share
//! state or require a calling order.

pub mod aggregator;

pub use aggregator::*;
