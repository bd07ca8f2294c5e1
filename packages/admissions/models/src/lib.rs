#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Admissions count taxonomy and the normalized record formats importers
//! produce.
//!
//! Campus spreadsheet exports and high-school enrollment reports are
//! flattened into [`NormalizedCount`] and [`NormalizedPopulation`] records
//! before they touch the store, so every importer and the query layer agree
//! on one vocabulary for count kinds ([`CountKind`]) and reporting cohorts
//! ([`Cohort`]).

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// What a stored count row measures.
///
/// The admission-cycle kinds come straight from the campus spreadsheets;
/// the `hs_*` kinds describe high-school population reporting.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CountKind {
    /// Applications received.
    App,
    /// Offers of admission.
    Adm,
    /// Students who enrolled after being admitted.
    Enr,
    /// High-school enrollment headcount.
    #[serde(rename = "hs_enr")]
    #[strum(serialize = "hs_enr")]
    HsEnr,
    /// High-school graduating-class headcount.
    #[serde(rename = "hs_grad")]
    #[strum(serialize = "hs_grad")]
    HsGrad,
}

impl CountKind {
    /// Whether this kind is part of the campus admission cycle
    /// (application, admission, enrollment) rather than high-school
    /// population reporting.
    #[must_use]
    pub const fn is_admission_cycle(self) -> bool {
        matches!(self, Self::App | Self::Adm | Self::Enr)
    }
}

/// The demographic cohorts the reports read.
///
/// Stored rows keep `race` as an open string because the spreadsheets carry
/// far more labels than these, but the aggregators only ever filter on the
/// two below, comparing the `Asian` cohort against `All` students.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Cohort {
    /// Every student regardless of race.
    All,
    /// Students reported as Asian.
    Asian,
}

/// A single admissions count flattened from a campus spreadsheet export.
///
/// One record per (year, campus, school, race, kind) cell. Counts are
/// admission-cycle figures; population figures travel as
/// [`NormalizedPopulation`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCount {
    /// Admission cycle year, e.g. `"2023"`.
    pub year: String,
    /// Campus short code, e.g. `"ucb"`.
    pub campus: String,
    /// High school name exactly as the spreadsheet reports it.
    pub school: String,
    /// City the school sits in.
    pub city: String,
    /// Cohort label, e.g. `"All"` or `"Asian"`. Open-ended: spreadsheets
    /// report more cohorts than the aggregators read.
    pub race: String,
    /// What the count measures.
    pub count_type: CountKind,
    /// Number of students. Never negative in valid data.
    pub count: i64,
}

/// A high-school population figure for one school, year, and cohort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPopulation {
    /// High school name, matched case-insensitively against stored schools.
    pub school: String,
    /// Reporting year, e.g. `"2023"`.
    pub year: String,
    /// Cohort label, e.g. `"All"` or `"Asian"`.
    pub race: String,
    /// Finer-grained label within the cohort, when the report provides one.
    #[serde(default)]
    pub sub_race: Option<String>,
    /// What the figure measures. Enrollment headcount unless stated.
    #[serde(default = "default_population_kind")]
    pub count_type: CountKind,
    /// Number of students. Never negative in valid data.
    pub count: i64,
}

fn default_population_kind() -> CountKind {
    CountKind::HsEnr
}
