//! Record store for normalized weather points
//!
//! SQLite via sqlx. The store owns two tables: the append-style point
//! table and the aggregate snapshot cache. The schema is bootstrapped at
//! connect time; there is no separate migration step.

pub mod client;
pub mod queries;
pub mod schema;

pub use client::*;
pub use schema::*;

use thiserror::Error;

/// Storage failures surface as one coarse variant; callers do not get
/// finer-grained causes.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type DbResult<T> = Result<T, DbError>;
