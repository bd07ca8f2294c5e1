#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Row and aggregate types read back from the admissions store.
//!
//! These types represent the shapes of data as retrieved from the store.
//! They are distinct from the report types in
//! `admit_stats_analytics_models` and the normalized ingestion types in
//! `admit_stats_admissions_models`.

use serde::{Deserialize, Serialize};

/// A `high_schools` row with its metadata columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolRow {
    /// Primary key.
    pub id: i64,
    /// School name exactly as stored.
    pub name: String,
    /// City the school sits in, when known.
    pub city: Option<String>,
    /// School type, e.g. `"public"` or `"private"`.
    pub category: String,
    /// `GreatSchools` rating, when scraped.
    pub gs_score: Option<f64>,
    /// `GreatSchools` profile URL.
    pub gs_url: Option<String>,
    /// Niche rating, when scraped.
    pub niche_score: Option<f64>,
    /// Niche profile URL.
    pub niche_url: Option<String>,
}

/// One grouped `SUM` bucket from the count fact table.
///
/// `campus` is populated only when the query grouped per campus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedCount {
    /// Count kind the bucket sums, e.g. `"App"`.
    pub count_type: String,
    /// Campus code when grouping per campus, `None` for combined sums.
    pub campus: Option<String>,
    /// Sum of `count` over the bucket.
    pub total: i64,
}

/// Slim count-fact projection the import dedup path reads back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRow {
    /// Primary key.
    pub id: i64,
    /// Linked school row, when the fact has been matched to one.
    pub school_id: Option<i64>,
}

/// Slim population projection the import path reads to decide between
/// insert, update, and leave-alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRow {
    /// Primary key.
    pub id: i64,
    /// Stored headcount.
    pub count: i64,
}
