#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Store connection, schema bootstrap, and queries for the admissions
//! statistics store.
//!
//! All SQL lives here. Statements go through `query_raw_params()` /
//! `exec_raw_params()` with `$N` placeholders, which run unchanged on the
//! Postgres production backend and the `SQLite` backend used by tests and
//! local file databases.

pub mod db;
pub mod queries;
pub mod schema;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Which SQL dialect the connected backend speaks.
///
/// Only auto-increment primary keys, float columns, and timestamp defaults
/// differ between the two; every query in this crate runs on both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    /// The production backend.
    Postgres,
    /// Local file databases and tests.
    Sqlite,
}
