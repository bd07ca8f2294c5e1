#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation engine for the admissions reports.
//!
//! Two aggregators, both served by `/analyze`: [`reports::campus_rates`]
//! sums admission figures per campus and year, and
//! [`reports::school_rates`] builds the per-school blocks with demographic
//! cross ratios, ranking, and pagination. The engine only reads; every
//! statement goes through the fact-store query layer in
//! `admit_stats_database`.

pub mod reports;

use thiserror::Error;

/// Errors that can occur during report aggregation.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The fact store could not be queried.
    #[error("Fact store error: {0}")]
    Store(#[from] admit_stats_database::DbError),
}
