#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Import outcome tallies.
//!
//! Both loaders keep going after a bad record and report what happened to
//! every row in one of these, so a re-run over the same file shows up as
//! all-`existing` instead of silent duplicates.

use serde::{Deserialize, Serialize};

/// Result of a completed count-fact import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountImportOutcome {
    /// Number of new facts inserted.
    pub new_saved: u64,
    /// Number of rows already present under the full dedup key.
    pub existing: u64,
    /// Number of rows that failed validation or insertion.
    pub errors: u64,
}

/// Result of a completed population import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationImportOutcome {
    /// Number of new population rows inserted.
    pub new_saved: u64,
    /// Number of existing rows whose count changed and was updated.
    pub updated: u64,
    /// Number of rows already present with the same count.
    pub existing_unchanged: u64,
    /// Number of rows naming a school the store does not know.
    pub skipped: u64,
    /// Number of rows that failed validation or insertion.
    pub errors: u64,
}
