//! Schema bootstrap for the admissions store.
//!
//! Tables are created with `CREATE TABLE IF NOT EXISTS` so `init` and the
//! importers can point at a fresh database without a separate migration
//! step. Re-running against an existing store is a no-op.

use switchy_database::Database;

use crate::{DbError, SqlDialect};

const fn id_column(dialect: SqlDialect) -> &'static str {
    match dialect {
        SqlDialect::Postgres => "BIGSERIAL PRIMARY KEY",
        SqlDialect::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
    }
}

const fn float_type(dialect: SqlDialect) -> &'static str {
    match dialect {
        SqlDialect::Postgres => "DOUBLE PRECISION",
        SqlDialect::Sqlite => "REAL",
    }
}

const fn timestamp_type(dialect: SqlDialect) -> &'static str {
    match dialect {
        SqlDialect::Postgres => "TIMESTAMPTZ",
        SqlDialect::Sqlite => "TEXT",
    }
}

const fn now_default(dialect: SqlDialect) -> &'static str {
    match dialect {
        SqlDialect::Postgres => "NOW()",
        SqlDialect::Sqlite => "(datetime('now'))",
    }
}

/// Creates the store tables and their indexes if they don't already exist.
///
/// Safe to call on every startup.
///
/// # Errors
///
/// Returns [`DbError`] if any DDL statement fails.
pub async fn ensure_schema(db: &dyn Database, dialect: SqlDialect) -> Result<(), DbError> {
    db.exec_raw(&format!(
        "CREATE TABLE IF NOT EXISTS high_schools (
            id          {id},
            city        TEXT,
            name        TEXT NOT NULL,
            category    TEXT NOT NULL DEFAULT 'public',
            gs_score    {float},
            gs_url      TEXT,
            niche_score {float},
            niche_url   TEXT,
            created_at  {ts} NOT NULL DEFAULT {now},
            updated_at  {ts}
        )",
        id = id_column(dialect),
        float = float_type(dialect),
        ts = timestamp_type(dialect),
        now = now_default(dialect),
    ))
    .await?;

    db.exec_raw(&format!(
        "CREATE TABLE IF NOT EXISTS count_by_schools (
            id         {id},
            city       TEXT NOT NULL,
            school     TEXT NOT NULL,
            race       TEXT NOT NULL,
            count_type TEXT NOT NULL,
            count      BIGINT NOT NULL,
            year       TEXT NOT NULL,
            campus     TEXT NOT NULL,
            school_id  BIGINT REFERENCES high_schools(id)
        )",
        id = id_column(dialect),
    ))
    .await?;

    db.exec_raw(&format!(
        "CREATE TABLE IF NOT EXISTS hs_populations (
            id         {id},
            year       TEXT NOT NULL,
            count      BIGINT NOT NULL,
            count_type TEXT NOT NULL DEFAULT 'hs_enr',
            race       TEXT NOT NULL,
            sub_race   TEXT,
            school_id  BIGINT REFERENCES high_schools(id)
        )",
        id = id_column(dialect),
    ))
    .await?;

    // The aggregators filter on (year, campus, race) for campus reports and
    // (school, year) for school reports; the importers look schools up by
    // name on every row.
    for ddl in [
        "CREATE INDEX IF NOT EXISTS idx_counts_year_campus_race
             ON count_by_schools (year, campus, race)",
        "CREATE INDEX IF NOT EXISTS idx_counts_school_year
             ON count_by_schools (school, year)",
        "CREATE INDEX IF NOT EXISTS idx_populations_school_year
             ON hs_populations (school_id, year, race)",
        "CREATE INDEX IF NOT EXISTS idx_high_schools_name
             ON high_schools (name)",
    ] {
        db.exec_raw(ddl).await?;
    }

    log::debug!("Store schema ensured");

    Ok(())
}

#[cfg(test)]
mod tests {
    use moosicbox_json_utils::database::ToValue as _;
    use switchy_database_connection::init_sqlite_rusqlite;

    use super::*;

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let db = init_sqlite_rusqlite(None).expect("in-memory sqlite");

        ensure_schema(db.as_ref(), SqlDialect::Sqlite).await.unwrap();
        ensure_schema(db.as_ref(), SqlDialect::Sqlite).await.unwrap();

        db.exec_raw(
            "INSERT INTO count_by_schools (city, school, race, count_type, count, year, campus)
             VALUES ('SF', 'Lowell', 'All', 'App', 10, '2023', 'ucb')",
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn category_defaults_to_public() {
        let db = init_sqlite_rusqlite(None).expect("in-memory sqlite");
        ensure_schema(db.as_ref(), SqlDialect::Sqlite).await.unwrap();

        db.exec_raw("INSERT INTO high_schools (name, city) VALUES ('Lowell', 'SF')")
            .await
            .unwrap();

        let rows = db
            .query_raw_params("SELECT category FROM high_schools WHERE name = 'Lowell'", &[])
            .await
            .unwrap();
        let category: String = rows.first().expect("school row").to_value("category").unwrap();
        assert_eq!(category, "public");
    }
}
