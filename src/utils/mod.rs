//! Aggregation and reporting utilities.

pub mod report;
pub mod stats;
