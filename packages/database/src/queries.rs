//! Query functions for the admissions store.
//!
//! The read side feeds the aggregators: distinct-value enumeration, filtered
//! `SUM`s over the count facts, grouped sums, and the population join. The
//! write side backs the importers: school find-or-create, fact dedup, and
//! population insert-or-update.
//!
//! Sums are written `CAST(SUM(count) AS BIGINT)` so both backends hand back
//! a 64-bit integer (Postgres would otherwise widen `SUM(BIGINT)` to
//! `NUMERIC`).

use std::collections::BTreeMap;

use admit_stats_admissions_models::{NormalizedCount, NormalizedPopulation};
use admit_stats_database_models::{FactRow, GroupedCount, PopulationRow, SchoolRow};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;

/// Builds a WHERE clause fragment and parameter list for the common count
/// fact filters. Every filter is optional; omitted ones don't constrain the
/// query.
fn build_count_filters(
    count_type: Option<&str>,
    year: Option<&str>,
    campus: Option<&str>,
    race: Option<&str>,
    school: Option<&str>,
) -> (Vec<String>, Vec<DatabaseValue>) {
    let mut frags = Vec::new();
    let mut params: Vec<DatabaseValue> = Vec::new();
    let mut idx = 1u32;

    for (column, value) in [
        ("count_type", count_type),
        ("year", year),
        ("campus", campus),
        ("race", race),
        ("school", school),
    ] {
        if let Some(value) = value {
            frags.push(format!("{column} = ${idx}"));
            params.push(DatabaseValue::String(value.to_string()));
            idx += 1;
        }
    }

    (frags, params)
}

fn where_clause(frags: &[String]) -> String {
    if frags.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", frags.join(" AND "))
    }
}

/// Returns every campus code present in the count facts, sorted.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn distinct_campuses(db: &dyn Database) -> Result<Vec<String>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT DISTINCT campus FROM count_by_schools ORDER BY campus",
            &[],
        )
        .await?;

    rows.iter()
        .map(|row| {
            row.to_value("campus").map_err(|e| DbError::Conversion {
                message: format!("Failed to parse campus: {e}"),
            })
        })
        .collect()
}

/// Returns every admission-cycle year present in the count facts, most
/// recent first. Years are stored as strings; four-digit years sort the
/// same way lexicographically as numerically.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn distinct_years(db: &dyn Database) -> Result<Vec<String>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT DISTINCT year FROM count_by_schools ORDER BY year DESC",
            &[],
        )
        .await?;

    rows.iter()
        .map(|row| {
            row.to_value("year").map_err(|e| DbError::Conversion {
                message: format!("Failed to parse year: {e}"),
            })
        })
        .collect()
}

/// Returns every school name present in the count facts, sorted.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn distinct_schools(db: &dyn Database) -> Result<Vec<String>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT DISTINCT school FROM count_by_schools ORDER BY school",
            &[],
        )
        .await?;

    rows.iter()
        .map(|row| {
            row.to_value("school").map_err(|e| DbError::Conversion {
                message: format!("Failed to parse school: {e}"),
            })
        })
        .collect()
}

/// Sums the count facts matching the given filters.
///
/// Returns `None` when no rows match, `Some(total)` otherwise. Callers
/// treat the two differently: an absent operand makes a ratio null, a zero
/// one may not.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn sum_counts(
    db: &dyn Database,
    count_type: Option<&str>,
    year: Option<&str>,
    campus: Option<&str>,
    race: Option<&str>,
    school: Option<&str>,
) -> Result<Option<i64>, DbError> {
    let (frags, params) = build_count_filters(count_type, year, campus, race, school);
    let wc = where_clause(&frags);

    let rows = db
        .query_raw_params(
            &format!("SELECT CAST(SUM(count) AS BIGINT) as total FROM count_by_schools{wc}"),
            &params,
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let total: Option<i64> = row.to_value("total").unwrap_or(None);

    Ok(total)
}

/// Sums the count facts for one school, year, and cohort, grouped by count
/// kind, and per campus as well when `by_campus` is set.
///
/// An optional campus filter restricts the sums to one campus without
/// changing the grouping.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn grouped_counts(
    db: &dyn Database,
    year: &str,
    school: &str,
    race: &str,
    campus: Option<&str>,
    by_campus: bool,
) -> Result<Vec<GroupedCount>, DbError> {
    let (frags, params) = build_count_filters(None, Some(year), campus, Some(race), Some(school));
    let wc = where_clause(&frags);

    let (select_cols, group_cols) = if by_campus {
        (
            "count_type, campus, CAST(SUM(count) AS BIGINT) as total",
            "count_type, campus",
        )
    } else {
        ("count_type, CAST(SUM(count) AS BIGINT) as total", "count_type")
    };

    let rows = db
        .query_raw_params(
            &format!(
                "SELECT {select_cols} FROM count_by_schools{wc}
                 GROUP BY {group_cols}
                 ORDER BY {group_cols}"
            ),
            &params,
        )
        .await?;

    rows.iter()
        .map(|row| {
            let count_type: String = row.to_value("count_type").map_err(|e| DbError::Conversion {
                message: format!("Failed to parse count_type: {e}"),
            })?;
            let campus: Option<String> = if by_campus {
                Some(row.to_value("campus").map_err(|e| DbError::Conversion {
                    message: format!("Failed to parse campus: {e}"),
                })?)
            } else {
                None
            };
            let total: i64 = row.to_value("total").unwrap_or(0);

            Ok(GroupedCount {
                count_type,
                campus,
                total,
            })
        })
        .collect()
}

/// Sums the stored population figures for one school, year, cohort, and
/// population kind. School names come from the count facts, so the match is
/// exact.
///
/// Returns `None` when the school has no matching population rows.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn population_sum(
    db: &dyn Database,
    school: &str,
    year: &str,
    race: &str,
    count_type: &str,
) -> Result<Option<i64>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT CAST(SUM(p.count) AS BIGINT) as total
             FROM hs_populations p
             JOIN high_schools s ON p.school_id = s.id
             WHERE s.name = $1 AND p.year = $2 AND p.race = $3 AND p.count_type = $4",
            &[
                DatabaseValue::String(school.to_string()),
                DatabaseValue::String(year.to_string()),
                DatabaseValue::String(race.to_string()),
                DatabaseValue::String(count_type.to_string()),
            ],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let total: Option<i64> = row.to_value("total").unwrap_or(None);

    Ok(total)
}

/// Returns a name-to-category map over every stored school.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn school_categories(db: &dyn Database) -> Result<BTreeMap<String, String>, DbError> {
    let rows = db
        .query_raw_params("SELECT name, category FROM high_schools", &[])
        .await?;

    let mut categories = BTreeMap::new();
    for row in &rows {
        let name: String = row.to_value("name").map_err(|e| DbError::Conversion {
            message: format!("Failed to parse school name: {e}"),
        })?;
        let category: String = row.to_value("category").unwrap_or_default();
        categories.insert(name, category);
    }

    Ok(categories)
}

/// Lists every stored school with its metadata, sorted by name.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn list_schools(db: &dyn Database) -> Result<Vec<SchoolRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, city, category, gs_score, gs_url, niche_score, niche_url
             FROM high_schools
             ORDER BY name, city",
            &[],
        )
        .await?;

    rows.iter()
        .map(|row| {
            let id: i64 = row.to_value("id").map_err(|e| DbError::Conversion {
                message: format!("Failed to parse school id: {e}"),
            })?;

            Ok(SchoolRow {
                id,
                name: row.to_value("name").unwrap_or_default(),
                city: row.to_value("city").unwrap_or(None),
                category: row.to_value("category").unwrap_or_default(),
                gs_score: row.to_value("gs_score").unwrap_or(None),
                gs_url: row.to_value("gs_url").unwrap_or(None),
                niche_score: row.to_value("niche_score").unwrap_or(None),
                niche_url: row.to_value("niche_url").unwrap_or(None),
            })
        })
        .collect()
}

/// Finds a school by exact name and city, as the count importer identifies
/// schools.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn find_school(
    db: &dyn Database,
    name: &str,
    city: &str,
) -> Result<Option<i64>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id FROM high_schools WHERE name = $1 AND city = $2 LIMIT 1",
            &[
                DatabaseValue::String(name.to_string()),
                DatabaseValue::String(city.to_string()),
            ],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let id: i64 = row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse school id: {e}"),
    })?;

    Ok(Some(id))
}

/// Finds a school by name alone, case-insensitively. Population reports
/// spell school names with inconsistent casing, so their importer matches
/// loosely.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn find_school_by_name(db: &dyn Database, name: &str) -> Result<Option<i64>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id FROM high_schools WHERE LOWER(name) = LOWER($1) LIMIT 1",
            &[DatabaseValue::String(name.to_string())],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let id: i64 = row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse school id: {e}"),
    })?;

    Ok(Some(id))
}

/// Inserts a school row and returns its id. The category stays at the
/// schema default until richer metadata arrives.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or the inserted row
/// cannot be read back.
pub async fn insert_school(db: &dyn Database, name: &str, city: &str) -> Result<i64, DbError> {
    db.exec_raw_params(
        "INSERT INTO high_schools (name, city) VALUES ($1, $2)",
        &[
            DatabaseValue::String(name.to_string()),
            DatabaseValue::String(city.to_string()),
        ],
    )
    .await?;

    let rows = db
        .query_raw_params(
            "SELECT id FROM high_schools WHERE name = $1 AND city = $2
             ORDER BY id DESC LIMIT 1",
            &[
                DatabaseValue::String(name.to_string()),
                DatabaseValue::String(city.to_string()),
            ],
        )
        .await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: format!("Failed to read back id for school {name}"),
    })?;

    let id: i64 = row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse school id: {e}"),
    })?;

    Ok(id)
}

/// Finds a stored count fact matching every value of the given record.
///
/// The full value tuple is the dedup key: re-importing the same spreadsheet
/// export must not duplicate rows, while a corrected count imports as a new
/// fact.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn find_count_fact(
    db: &dyn Database,
    record: &NormalizedCount,
) -> Result<Option<FactRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, school_id FROM count_by_schools
             WHERE school = $1 AND city = $2 AND campus = $3 AND race = $4
               AND count_type = $5 AND count = $6 AND year = $7
             LIMIT 1",
            &[
                DatabaseValue::String(record.school.clone()),
                DatabaseValue::String(record.city.clone()),
                DatabaseValue::String(record.campus.clone()),
                DatabaseValue::String(record.race.clone()),
                DatabaseValue::String(record.count_type.as_ref().to_string()),
                DatabaseValue::Int64(record.count),
                DatabaseValue::String(record.year.clone()),
            ],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let id: i64 = row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse fact id: {e}"),
    })?;
    let school_id: Option<i64> = row.to_value("school_id").unwrap_or(None);

    Ok(Some(FactRow { id, school_id }))
}

/// Inserts a count fact linked to its school row.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_count_fact(
    db: &dyn Database,
    record: &NormalizedCount,
    school_id: i64,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO count_by_schools (
            city, school, race, count_type, count, year, campus, school_id
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        &[
            DatabaseValue::String(record.city.clone()),
            DatabaseValue::String(record.school.clone()),
            DatabaseValue::String(record.race.clone()),
            DatabaseValue::String(record.count_type.as_ref().to_string()),
            DatabaseValue::Int64(record.count),
            DatabaseValue::String(record.year.clone()),
            DatabaseValue::String(record.campus.clone()),
            DatabaseValue::Int64(school_id),
        ],
    )
    .await?;

    Ok(())
}

/// Links an existing count fact to a school row. Facts imported before
/// their school row existed carry a null `school_id` until a later import
/// backfills it.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn set_fact_school(
    db: &dyn Database,
    fact_id: i64,
    school_id: i64,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE count_by_schools SET school_id = $2 WHERE id = $1",
        &[
            DatabaseValue::Int64(fact_id),
            DatabaseValue::Int64(school_id),
        ],
    )
    .await?;

    Ok(())
}

/// Finds the stored population figure for one school, year, cohort, and
/// population kind.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn find_population(
    db: &dyn Database,
    school_id: i64,
    year: &str,
    race: &str,
    count_type: &str,
) -> Result<Option<PopulationRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, count FROM hs_populations
             WHERE school_id = $1 AND year = $2 AND race = $3 AND count_type = $4
             LIMIT 1",
            &[
                DatabaseValue::Int64(school_id),
                DatabaseValue::String(year.to_string()),
                DatabaseValue::String(race.to_string()),
                DatabaseValue::String(count_type.to_string()),
            ],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let id: i64 = row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse population id: {e}"),
    })?;
    let count: i64 = row.to_value("count").unwrap_or(0);

    Ok(Some(PopulationRow { id, count }))
}

/// Inserts a population figure linked to its school row.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_population(
    db: &dyn Database,
    record: &NormalizedPopulation,
    school_id: i64,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO hs_populations (year, count, count_type, race, sub_race, school_id)
         VALUES ($1, $2, $3, $4, $5, $6)",
        &[
            DatabaseValue::String(record.year.clone()),
            DatabaseValue::Int64(record.count),
            DatabaseValue::String(record.count_type.as_ref().to_string()),
            DatabaseValue::String(record.race.clone()),
            record
                .sub_race
                .as_ref()
                .map_or(DatabaseValue::Null, |s| DatabaseValue::String(s.clone())),
            DatabaseValue::Int64(school_id),
        ],
    )
    .await?;

    Ok(())
}

/// Replaces the stored headcount for a population row. Used when a
/// re-imported report revises a figure.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn update_population_count(
    db: &dyn Database,
    population_id: i64,
    count: i64,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "UPDATE hs_populations SET count = $2 WHERE id = $1",
        &[
            DatabaseValue::Int64(population_id),
            DatabaseValue::Int64(count),
        ],
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use admit_stats_admissions_models::{Cohort, CountKind};
    use switchy_database_connection::init_sqlite_rusqlite;

    use crate::schema::ensure_schema;
    use crate::SqlDialect;

    use super::*;

    async fn test_db() -> Box<dyn Database> {
        let db = init_sqlite_rusqlite(None).expect("in-memory sqlite");
        ensure_schema(db.as_ref(), SqlDialect::Sqlite)
            .await
            .expect("schema");
        db
    }

    fn fact(
        year: &str,
        campus: &str,
        school: &str,
        race: Cohort,
        count_type: CountKind,
        count: i64,
    ) -> NormalizedCount {
        NormalizedCount {
            year: year.to_string(),
            campus: campus.to_string(),
            school: school.to_string(),
            city: "SF".to_string(),
            race: race.as_ref().to_string(),
            count_type,
            count,
        }
    }

    async fn seed_fact(db: &dyn Database, record: &NormalizedCount) {
        let school_id = match find_school(db, &record.school, &record.city).await.unwrap() {
            Some(id) => id,
            None => insert_school(db, &record.school, &record.city).await.unwrap(),
        };
        insert_count_fact(db, record, school_id).await.unwrap();
    }

    #[tokio::test]
    async fn distinct_enumerations_cover_the_store() {
        let db = test_db().await;
        seed_fact(db.as_ref(), &fact("2023", "ucb", "Lowell", Cohort::All, CountKind::App, 10))
            .await;
        seed_fact(db.as_ref(), &fact("2022", "ucla", "Mission", Cohort::All, CountKind::App, 5))
            .await;
        seed_fact(db.as_ref(), &fact("2023", "ucla", "Lowell", Cohort::Asian, CountKind::Adm, 3))
            .await;

        assert_eq!(distinct_campuses(db.as_ref()).await.unwrap(), vec!["ucb", "ucla"]);
        assert_eq!(distinct_years(db.as_ref()).await.unwrap(), vec!["2023", "2022"]);
        assert_eq!(
            distinct_schools(db.as_ref()).await.unwrap(),
            vec!["Lowell", "Mission"]
        );
    }

    #[tokio::test]
    async fn sum_counts_distinguishes_zero_from_absent() {
        let db = test_db().await;
        seed_fact(db.as_ref(), &fact("2023", "ucb", "Lowell", Cohort::All, CountKind::App, 0))
            .await;

        let zero = sum_counts(
            db.as_ref(),
            Some("App"),
            Some("2023"),
            Some("ucb"),
            Some("All"),
            None,
        )
        .await
        .unwrap();
        assert_eq!(zero, Some(0));

        let absent = sum_counts(
            db.as_ref(),
            Some("Adm"),
            Some("2023"),
            Some("ucb"),
            Some("All"),
            None,
        )
        .await
        .unwrap();
        assert_eq!(absent, None);
    }

    #[tokio::test]
    async fn sum_counts_adds_rows_within_a_group() {
        let db = test_db().await;
        seed_fact(db.as_ref(), &fact("2023", "ucb", "Lowell", Cohort::All, CountKind::App, 10))
            .await;
        seed_fact(db.as_ref(), &fact("2023", "ucb", "Mission", Cohort::All, CountKind::App, 7))
            .await;

        let total = sum_counts(
            db.as_ref(),
            Some("App"),
            Some("2023"),
            Some("ucb"),
            Some("All"),
            None,
        )
        .await
        .unwrap();
        assert_eq!(total, Some(17));
    }

    #[tokio::test]
    async fn grouped_counts_combined_and_per_campus() {
        let db = test_db().await;
        seed_fact(db.as_ref(), &fact("2023", "ucb", "Lowell", Cohort::All, CountKind::App, 10))
            .await;
        seed_fact(db.as_ref(), &fact("2023", "ucla", "Lowell", Cohort::All, CountKind::App, 4))
            .await;
        seed_fact(db.as_ref(), &fact("2023", "ucb", "Lowell", Cohort::All, CountKind::Adm, 2))
            .await;

        let combined = grouped_counts(db.as_ref(), "2023", "Lowell", "All", None, false)
            .await
            .unwrap();
        assert_eq!(
            combined,
            vec![
                GroupedCount {
                    count_type: "Adm".to_string(),
                    campus: None,
                    total: 2
                },
                GroupedCount {
                    count_type: "App".to_string(),
                    campus: None,
                    total: 14
                },
            ]
        );

        let per_campus = grouped_counts(db.as_ref(), "2023", "Lowell", "All", None, true)
            .await
            .unwrap();
        assert_eq!(per_campus.len(), 3);
        assert!(per_campus.contains(&GroupedCount {
            count_type: "App".to_string(),
            campus: Some("ucb".to_string()),
            total: 10
        }));

        let filtered = grouped_counts(db.as_ref(), "2023", "Lowell", "All", Some("ucla"), false)
            .await
            .unwrap();
        assert_eq!(
            filtered,
            vec![GroupedCount {
                count_type: "App".to_string(),
                campus: None,
                total: 4
            }]
        );
    }

    #[tokio::test]
    async fn school_find_or_create_roundtrip() {
        let db = test_db().await;

        assert_eq!(find_school(db.as_ref(), "Lowell", "SF").await.unwrap(), None);

        let id = insert_school(db.as_ref(), "Lowell", "SF").await.unwrap();
        assert_eq!(find_school(db.as_ref(), "Lowell", "SF").await.unwrap(), Some(id));
        assert_eq!(find_school(db.as_ref(), "Lowell", "LA").await.unwrap(), None);

        assert_eq!(
            find_school_by_name(db.as_ref(), "lowell").await.unwrap(),
            Some(id)
        );
        assert_eq!(find_school_by_name(db.as_ref(), "Galileo").await.unwrap(), None);
    }

    #[tokio::test]
    async fn fact_dedup_matches_the_full_value_key() {
        let db = test_db().await;
        let record = fact("2023", "ucb", "Lowell", Cohort::All, CountKind::App, 10);
        seed_fact(db.as_ref(), &record).await;

        let found = find_count_fact(db.as_ref(), &record).await.unwrap();
        assert!(found.is_some());
        assert!(found.unwrap().school_id.is_some());

        // A different count is a new fact, not a duplicate.
        let revised = fact("2023", "ucb", "Lowell", Cohort::All, CountKind::App, 11);
        assert!(find_count_fact(db.as_ref(), &revised).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fact_school_backfill() {
        let db = test_db().await;

        // Legacy rows predate school linking and carry a null school_id.
        db.exec_raw(
            "INSERT INTO count_by_schools (city, school, race, count_type, count, year, campus)
             VALUES ('SF', 'Lowell', 'All', 'App', 10, '2023', 'ucb')",
        )
        .await
        .unwrap();

        let record = fact("2023", "ucb", "Lowell", Cohort::All, CountKind::App, 10);
        let found = find_count_fact(db.as_ref(), &record).await.unwrap().unwrap();
        assert_eq!(found.school_id, None);

        let school_id = insert_school(db.as_ref(), "Lowell", "SF").await.unwrap();
        set_fact_school(db.as_ref(), found.id, school_id).await.unwrap();

        let relinked = find_count_fact(db.as_ref(), &record).await.unwrap().unwrap();
        assert_eq!(relinked.school_id, Some(school_id));
    }

    #[tokio::test]
    async fn population_insert_lookup_update() {
        let db = test_db().await;
        let school_id = insert_school(db.as_ref(), "Lowell", "SF").await.unwrap();

        let record = NormalizedPopulation {
            school: "Lowell".to_string(),
            year: "2023".to_string(),
            race: "All".to_string(),
            sub_race: None,
            count_type: CountKind::HsEnr,
            count: 2700,
        };
        insert_population(db.as_ref(), &record, school_id).await.unwrap();

        let stored = find_population(db.as_ref(), school_id, "2023", "All", "hs_enr")
            .await
            .unwrap()
            .expect("population row");
        assert_eq!(stored.count, 2700);

        update_population_count(db.as_ref(), stored.id, 2800).await.unwrap();
        let updated = find_population(db.as_ref(), school_id, "2023", "All", "hs_enr")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.count, 2800);

        assert!(find_population(db.as_ref(), school_id, "2022", "All", "hs_enr")
            .await
            .unwrap()
            .is_none());

        let total = population_sum(db.as_ref(), "Lowell", "2023", "All", "hs_enr")
            .await
            .unwrap();
        assert_eq!(total, Some(2800));

        let missing = population_sum(db.as_ref(), "Lowell", "2023", "Asian", "hs_enr")
            .await
            .unwrap();
        assert_eq!(missing, None);
    }
}
