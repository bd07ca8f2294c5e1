//! The two report aggregators behind `/analyze`.
//!
//! Both walk the store with small scalar and grouped queries per
//! combination instead of one wide join. The row counts involved are tiny
//! (tens of campuses and years, hundreds of schools), and keeping each
//! figure an independent query means a missing operand surfaces as SQL
//! `NULL` exactly where the null-ratio rules want it.

use std::collections::BTreeMap;

use admit_stats_admissions_models::{Cohort, CountKind};
use admit_stats_analytics_models::{
    AdmissionStats, ApplicationStudentStats, Breakdown, CampusReport, CampusSelect, CohortBlock,
    CohortCounts, EnrollmentAdmissionStats, SchoolRatesParams, SchoolReport, SchoolTypeSelect,
    SchoolYearStat, SchoolYears, StudentDemo, YearSelect,
};
use admit_stats_database::queries;
use admit_stats_database_models::GroupedCount;
use switchy_database::Database;

use crate::AnalyticsError;

/// Builds the campus report: admission totals and rates for every campus
/// and year combination present in the store.
///
/// Combinations the spreadsheets never reported still appear, with null
/// figures, so a consumer can tell "campus reported nothing that year"
/// apart from "row dropped".
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store cannot be queried.
pub async fn campus_rates(db: &dyn Database) -> Result<CampusReport, AnalyticsError> {
    let campuses = queries::distinct_campuses(db).await?;
    let years = queries::distinct_years(db).await?;

    let mut report = CampusReport::new();

    for campus in &campuses {
        let mut by_year = BTreeMap::new();

        for year in &years {
            let all_app = cycle_sum(db, CountKind::App, year, campus, Cohort::All).await?;
            let all_adm = cycle_sum(db, CountKind::Adm, year, campus, Cohort::All).await?;
            let asian_app = cycle_sum(db, CountKind::App, year, campus, Cohort::Asian).await?;
            let asian_adm = cycle_sum(db, CountKind::Adm, year, campus, Cohort::Asian).await?;

            by_year.insert(
                year.clone(),
                AdmissionStats::from_sums(all_app, all_adm, asian_app, asian_adm),
            );
        }

        report.insert(campus.clone(), by_year);
    }

    Ok(report)
}

/// One filtered sum over the count facts for the campus report.
async fn cycle_sum(
    db: &dyn Database,
    kind: CountKind,
    year: &str,
    campus: &str,
    cohort: Cohort,
) -> Result<Option<i64>, AnalyticsError> {
    Ok(queries::sum_counts(
        db,
        Some(kind.as_ref()),
        Some(year),
        Some(campus),
        Some(cohort.as_ref()),
        None,
    )
    .await?)
}

/// Builds the school report under the given scopes: per-school and
/// per-year stat blocks with demographic cross ratios, ranked by admission
/// pressure and paginated at school granularity.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the store cannot be queried.
pub async fn school_rates(
    db: &dyn Database,
    params: &SchoolRatesParams,
) -> Result<SchoolReport, AnalyticsError> {
    let mut schools = queries::distinct_schools(db).await?;

    if let SchoolTypeSelect::Category(category) = &params.select_school_type {
        let categories = queries::school_categories(db).await?;
        schools.retain(|school| categories.get(school).is_some_and(|c| c == category));
    }

    let years = match &params.select_year {
        YearSelect::All => queries::distinct_years(db).await?,
        YearSelect::Year(year) => vec![year.clone()],
    };

    let (campus_filter, by_campus) = match &params.select_campus {
        CampusSelect::All => (None, false),
        CampusSelect::Individual => (None, true),
        CampusSelect::Campus(code) => (Some(code.as_str()), false),
    };

    let mut entries: Vec<(String, SchoolYears)> = Vec::new();

    for school in &schools {
        let mut school_years = SchoolYears::new();

        // Years arrive most recent first, so each school's year map is
        // already in report order.
        for year in &years {
            let all_rows = queries::grouped_counts(
                db,
                year,
                school,
                Cohort::All.as_ref(),
                campus_filter,
                by_campus,
            )
            .await?;
            if all_rows.is_empty() {
                log::debug!("No count facts for school={school}, year={year}");
                continue;
            }

            let asian_rows = queries::grouped_counts(
                db,
                year,
                school,
                Cohort::Asian.as_ref(),
                campus_filter,
                by_campus,
            )
            .await?;

            let demo = student_demo(db, school, year).await?;

            let stat = if by_campus {
                per_campus_stat(&all_rows, &asian_rows, demo)
            } else {
                combined_stat(&all_rows, &asian_rows, demo)
            };

            if !stat.has_admission_signal() {
                log::debug!("No admission signal for school={school}, year={year}, skipping");
                continue;
            }

            school_years.push(year.clone(), stat);
        }

        if school_years.is_empty() {
            continue;
        }

        entries.push((school.clone(), school_years));
    }

    // Per-campus blocks have no single combined ratio to rank on, so
    // individual mode keeps the alphabetical school order.
    if !by_campus
        && let Some(sort_year) = sort_year(&params.select_year, &years)
    {
        entries.sort_by(|a, b| {
            let ka = rank_key(&a.1, &sort_year);
            let kb = rank_key(&b.1, &sort_year);
            kb.0.total_cmp(&ka.0).then(kb.1.total_cmp(&ka.1))
        });
    }

    let page: Vec<(String, SchoolYears)> = match params.limit {
        Some(limit) => entries
            .into_iter()
            .skip(params.offset)
            .take(limit)
            .collect(),
        None => entries.into_iter().skip(params.offset).collect(),
    };

    Ok(SchoolReport::from(page))
}

/// The year the ranking reads its ratios from: the requested year when the
/// scope is specific, otherwise the most recent year in the store.
fn sort_year(select_year: &YearSelect, years: &[String]) -> Option<String> {
    match select_year {
        YearSelect::Year(year) => Some(year.clone()),
        YearSelect::All => years.first().cloned(),
    }
}

/// Ranking key for one school: admissions-per-student at the sort year,
/// then the enrollment yield inverted so lower yields rank higher on ties.
/// Schools missing the sort year or the ratios sink to the bottom.
fn rank_key(years: &SchoolYears, sort_year: &str) -> (f64, f64) {
    let Some(stat) = years.get(sort_year) else {
        return (0.0, -10.0);
    };

    let primary = match &stat.application_student {
        Breakdown::Combined(ratios) => ratios.all_adm_all_student.ratio.unwrap_or(0.0),
        Breakdown::PerCampus(_) => 0.0,
    };
    let secondary = match &stat.enrollment_admission {
        Breakdown::Combined(ratios) => ratios.all_enr_all_adm.ratio.map_or(-10.0, |r| -r),
        Breakdown::PerCampus(_) => -10.0,
    };

    (primary, secondary)
}

/// Looks up both cohorts' enrolled-population figures for one school-year.
async fn student_demo(
    db: &dyn Database,
    school: &str,
    year: &str,
) -> Result<StudentDemo, AnalyticsError> {
    let all_students = queries::population_sum(
        db,
        school,
        year,
        Cohort::All.as_ref(),
        CountKind::HsEnr.as_ref(),
    )
    .await?;
    let asian_students = queries::population_sum(
        db,
        school,
        year,
        Cohort::Asian.as_ref(),
        CountKind::HsEnr.as_ref(),
    )
    .await?;

    Ok(StudentDemo::from_counts(all_students, asian_students))
}

/// Sums one cohort's grouped rows into app/adm/enr counts. Count kinds the
/// taxonomy doesn't know are left alone.
fn fold_cohort(rows: &[GroupedCount]) -> CohortCounts {
    let mut counts = CohortCounts::default();
    for row in rows {
        if let Ok(kind) = row.count_type.parse::<CountKind>() {
            counts.record(kind, row.total);
        }
    }
    counts
}

fn combined_stat(
    all_rows: &[GroupedCount],
    asian_rows: &[GroupedCount],
    demo: StudentDemo,
) -> SchoolYearStat {
    let counts = CohortBlock {
        all: fold_cohort(all_rows),
        asian: fold_cohort(asian_rows),
    };

    SchoolYearStat {
        student_demo: demo,
        admissions: Breakdown::Combined(AdmissionStats::from_counts(&counts)),
        application_student: Breakdown::Combined(ApplicationStudentStats::from_counts(
            &counts, &demo,
        )),
        enrollment_admission: Breakdown::Combined(EnrollmentAdmissionStats::from_counts(&counts)),
    }
}

fn per_campus_stat(
    all_rows: &[GroupedCount],
    asian_rows: &[GroupedCount],
    demo: StudentDemo,
) -> SchoolYearStat {
    let mut blocks: BTreeMap<String, CohortBlock> = BTreeMap::new();

    for row in all_rows {
        if let (Some(campus), Ok(kind)) = (row.campus.as_deref(), row.count_type.parse()) {
            blocks
                .entry(campus.to_string())
                .or_default()
                .all
                .record(kind, row.total);
        }
    }
    for row in asian_rows {
        if let (Some(campus), Ok(kind)) = (row.campus.as_deref(), row.count_type.parse()) {
            blocks
                .entry(campus.to_string())
                .or_default()
                .asian
                .record(kind, row.total);
        }
    }

    SchoolYearStat {
        student_demo: demo,
        admissions: Breakdown::PerCampus(
            blocks
                .iter()
                .map(|(campus, counts)| (campus.clone(), AdmissionStats::from_counts(counts)))
                .collect(),
        ),
        application_student: Breakdown::PerCampus(
            blocks
                .iter()
                .map(|(campus, counts)| {
                    (
                        campus.clone(),
                        ApplicationStudentStats::from_counts(counts, &demo),
                    )
                })
                .collect(),
        ),
        enrollment_admission: Breakdown::PerCampus(
            blocks
                .iter()
                .map(|(campus, counts)| {
                    (campus.clone(), EnrollmentAdmissionStats::from_counts(counts))
                })
                .collect(),
        ),
    }
}
