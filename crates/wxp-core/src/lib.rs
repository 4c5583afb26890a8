//! Core data types and aggregate computations for the weather pipeline
//!
//! This crate holds the normalized point record shape and the pure
//! statistics/pattern calculations. It performs no I/O.

pub mod patterns;
pub mod stats;
pub mod types;

pub use patterns::*;
pub use stats::*;
pub use types::*;
