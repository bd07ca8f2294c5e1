#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loaders for spreadsheet exports of admissions counts and high-school
//! population figures.
//!
//! Both loaders are batch writers over the fact store: they validate each
//! CSV row, resolve the school it names, and continue past bad records
//! while tallying what happened. The aggregation engine never writes; these
//! are the only code paths that do.

use std::path::Path;

use admit_stats_admissions_models::{CountKind, NormalizedCount, NormalizedPopulation};
use admit_stats_database::{queries, DbError};
use admit_stats_ingest_models::{CountImportOutcome, PopulationImportOutcome};
use serde::Deserialize;
use switchy_database::Database;
use thiserror::Error;

/// Errors from the import paths.
///
/// Per-record failures never surface here; they are tallied into the
/// outcome and logged. This covers failures that stop a whole import, like
/// an unreadable file or a dead store connection.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The fact store rejected a query outside the per-record save path.
    #[error("Fact store error: {0}")]
    Store(#[from] DbError),
    /// The CSV file could not be opened or read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of a count-fact CSV export.
///
/// Sheet-per-campus exports often drop the `year` and `campus` columns
/// because the sheet name carried them; those rows rely on the CLI
/// defaults instead.
#[derive(Debug, Deserialize)]
struct CountRow {
    #[serde(default)]
    year: Option<String>,
    #[serde(default)]
    campus: Option<String>,
    school: String,
    city: String,
    race: String,
    count_type: String,
    count: i64,
}

/// Imports admission count facts from a CSV file.
///
/// `default_year` and `default_campus` fill in rows whose export dropped
/// those columns. Rows are deduplicated against the store on the full
/// value key, so re-importing a file is harmless.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read or a store query
/// fails outside the per-record save path.
pub async fn import_count_facts(
    db: &dyn Database,
    csv_path: &Path,
    default_year: Option<&str>,
    default_campus: Option<&str>,
) -> Result<CountImportOutcome, IngestError> {
    let reader = csv::Reader::from_path(csv_path)?;
    import_counts_from(db, reader, default_year, default_campus).await
}

/// [`import_count_facts`] over any CSV reader.
///
/// # Errors
///
/// Returns [`IngestError`] if a store query fails outside the per-record
/// save path.
pub async fn import_counts_from<R: std::io::Read>(
    db: &dyn Database,
    mut reader: csv::Reader<R>,
    default_year: Option<&str>,
    default_campus: Option<&str>,
) -> Result<CountImportOutcome, IngestError> {
    let mut outcome = CountImportOutcome::default();

    for (index, result) in reader.deserialize::<CountRow>().enumerate() {
        // Line 1 is the header row.
        let row_num = index + 2;

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::warn!("Row {row_num}: unreadable record: {e}");
                outcome.errors += 1;
                continue;
            }
        };

        let record = match normalize_count_row(row, default_year, default_campus) {
            Ok(record) => record,
            Err(reason) => {
                log::warn!("Row {row_num}: {reason}");
                outcome.errors += 1;
                continue;
            }
        };

        match save_count_fact(db, &record).await {
            Ok(true) => outcome.new_saved += 1,
            Ok(false) => outcome.existing += 1,
            Err(e) => {
                log::error!(
                    "Row {row_num}: failed to save fact for {}: {e}",
                    record.school
                );
                outcome.errors += 1;
            }
        }
    }

    log::info!(
        "Count import complete: {} new, {} existing, {} errors",
        outcome.new_saved,
        outcome.existing,
        outcome.errors
    );

    Ok(outcome)
}

/// Validates one CSV row into a normalized record, or explains why not.
fn normalize_count_row(
    row: CountRow,
    default_year: Option<&str>,
    default_campus: Option<&str>,
) -> Result<NormalizedCount, String> {
    let Some(year) = row.year.or_else(|| default_year.map(str::to_string)) else {
        return Err("no year column and no --year default".to_string());
    };
    let Some(campus) = row.campus.or_else(|| default_campus.map(str::to_string)) else {
        return Err("no campus column and no --campus default".to_string());
    };

    let count_type: CountKind = row
        .count_type
        .parse()
        .map_err(|_| format!("unknown count type {:?}", row.count_type))?;
    if !count_type.is_admission_cycle() {
        return Err(format!(
            "count type {count_type} is population data, not an admission-cycle count"
        ));
    }

    if row.count < 0 {
        return Err(format!("negative count {}", row.count));
    }

    Ok(NormalizedCount {
        year,
        campus,
        school: row.school,
        city: row.city,
        race: row.race,
        count_type,
        count: row.count,
    })
}

/// Saves one count fact, creating or linking its school row. Returns
/// `true` when a new fact was inserted, `false` when the store already had
/// it.
async fn save_count_fact(db: &dyn Database, record: &NormalizedCount) -> Result<bool, DbError> {
    let school_id = match queries::find_school(db, &record.school, &record.city).await? {
        Some(id) => id,
        None => {
            let id = queries::insert_school(db, &record.school, &record.city).await?;
            log::info!("Created new school: {} ({})", record.school, record.city);
            id
        }
    };

    match queries::find_count_fact(db, record).await? {
        Some(fact) => {
            if fact.school_id.is_none() {
                // Facts imported before their school row existed.
                queries::set_fact_school(db, fact.id, school_id).await?;
                log::debug!("Backfilled school link for fact {}", fact.id);
            }
            Ok(false)
        }
        None => {
            queries::insert_count_fact(db, record, school_id).await?;
            Ok(true)
        }
    }
}

/// Imports high-school population figures from a CSV file.
///
/// Rows are keyed by `(school, year, race, count_type)`: a row whose count
/// changed since the last import updates the stored figure in place. Rows
/// naming a school the store does not know are skipped, not errors, since
/// population reports cover far more schools than the admissions sheets.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read or a store query
/// fails outside the per-record save path.
pub async fn import_populations(
    db: &dyn Database,
    csv_path: &Path,
) -> Result<PopulationImportOutcome, IngestError> {
    let reader = csv::Reader::from_path(csv_path)?;
    import_populations_from(db, reader).await
}

/// [`import_populations`] over any CSV reader.
///
/// # Errors
///
/// Returns [`IngestError`] if a store query fails outside the per-record
/// save path.
pub async fn import_populations_from<R: std::io::Read>(
    db: &dyn Database,
    mut reader: csv::Reader<R>,
) -> Result<PopulationImportOutcome, IngestError> {
    let mut outcome = PopulationImportOutcome::default();

    for (index, result) in reader.deserialize::<NormalizedPopulation>().enumerate() {
        let row_num = index + 2;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Row {row_num}: unreadable record: {e}");
                outcome.errors += 1;
                continue;
            }
        };

        if record.count_type.is_admission_cycle() {
            log::warn!(
                "Row {row_num}: count type {} is an admission-cycle count, not population data",
                record.count_type
            );
            outcome.errors += 1;
            continue;
        }

        if record.count < 0 {
            log::warn!("Row {row_num}: negative count {}", record.count);
            outcome.errors += 1;
            continue;
        }

        match save_population(db, &record).await {
            Ok(PopulationSave::Inserted) => outcome.new_saved += 1,
            Ok(PopulationSave::Updated) => outcome.updated += 1,
            Ok(PopulationSave::Unchanged) => outcome.existing_unchanged += 1,
            Ok(PopulationSave::UnknownSchool) => {
                log::warn!(
                    "Row {row_num}: no school named {:?} in the store, skipping",
                    record.school
                );
                outcome.skipped += 1;
            }
            Err(e) => {
                log::error!(
                    "Row {row_num}: failed to save population for {}: {e}",
                    record.school
                );
                outcome.errors += 1;
            }
        }
    }

    log::info!(
        "Population import complete: {} new, {} updated, {} unchanged, {} skipped, {} errors",
        outcome.new_saved,
        outcome.updated,
        outcome.existing_unchanged,
        outcome.skipped,
        outcome.errors
    );

    Ok(outcome)
}

enum PopulationSave {
    Inserted,
    Updated,
    Unchanged,
    UnknownSchool,
}

async fn save_population(
    db: &dyn Database,
    record: &NormalizedPopulation,
) -> Result<PopulationSave, DbError> {
    let Some(school_id) = queries::find_school_by_name(db, &record.school).await? else {
        return Ok(PopulationSave::UnknownSchool);
    };

    let existing = queries::find_population(
        db,
        school_id,
        &record.year,
        &record.race,
        record.count_type.as_ref(),
    )
    .await?;

    match existing {
        Some(row) if row.count == record.count => Ok(PopulationSave::Unchanged),
        Some(row) => {
            queries::update_population_count(db, row.id, record.count).await?;
            Ok(PopulationSave::Updated)
        }
        None => {
            queries::insert_population(db, record, school_id).await?;
            Ok(PopulationSave::Inserted)
        }
    }
}
