//! Core scanning pipeline.
//!
//! Rule registry, line-oriented matching and tree traversal. Data flows
//! walker -> matcher (using the registry) -> aggregation and reporting.

pub mod matcher;
pub mod rules;
pub mod walker;
