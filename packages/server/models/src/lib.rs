#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the admissions statistics server.
//!
//! The analyze query parameters (`select_campus` and friends) are
//! snake_case on the wire; only the health payload uses camelCase keys.

use admit_stats_analytics_models::{
    CampusSelect, SchoolRatesParams, SchoolTypeSelect, YearSelect,
};
use serde::{Deserialize, Serialize};

/// Query parameters for the analyze endpoint.
///
/// Every parameter is optional; with none given the endpoint serves the
/// campus report with no scoping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeQuery {
    /// Which report to run: "campus" (default) or "school".
    pub by: Option<String>,
    /// "all", "individual", or a campus code like "ucb".
    pub select_campus: Option<String>,
    /// "all" or a specific year like "2023".
    pub select_year: Option<String>,
    /// "all" or a school category like "public".
    pub select_school_type: Option<String>,
    /// Page number, 1-based. Only applies together with `page_size`.
    pub page: Option<usize>,
    /// Number of schools per page.
    pub page_size: Option<usize>,
}

impl AnalyzeQuery {
    /// Maps the query string onto school report parameters.
    ///
    /// Pagination activates only when `page_size` is present; a missing or
    /// zero `page` clamps to the first page, and an oversized one saturates
    /// past the end of the list.
    #[must_use]
    pub fn school_params(&self) -> SchoolRatesParams {
        let (offset, limit) = self.page_size.map_or((0, None), |size| {
            let page = self.page.unwrap_or(1).max(1);
            ((page - 1).saturating_mul(size), Some(size))
        });

        SchoolRatesParams {
            select_campus: self
                .select_campus
                .as_deref()
                .map(CampusSelect::from_param)
                .unwrap_or_default(),
            select_year: self
                .select_year
                .as_deref()
                .map(YearSelect::from_param)
                .unwrap_or_default(),
            select_school_type: self
                .select_school_type
                .as_deref()
                .map(SchoolTypeSelect::from_param)
                .unwrap_or_default(),
            offset,
            limit,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_requires_page_size() {
        let query = AnalyzeQuery {
            page: Some(3),
            ..AnalyzeQuery::default()
        };
        let params = query.school_params();
        assert_eq!(params.offset, 0);
        assert_eq!(params.limit, None);
    }

    #[test]
    fn pagination_is_one_based_and_clamped() {
        let query = AnalyzeQuery {
            page: Some(3),
            page_size: Some(20),
            ..AnalyzeQuery::default()
        };
        let params = query.school_params();
        assert_eq!(params.offset, 40);
        assert_eq!(params.limit, Some(20));

        let first = AnalyzeQuery {
            page_size: Some(20),
            ..AnalyzeQuery::default()
        };
        assert_eq!(first.school_params().offset, 0);

        let zero = AnalyzeQuery {
            page: Some(0),
            page_size: Some(20),
            ..AnalyzeQuery::default()
        };
        assert_eq!(zero.school_params().offset, 0);

        // A page number at the integer limit saturates instead of wrapping
        // back into the list.
        let huge = AnalyzeQuery {
            page: Some(usize::MAX),
            page_size: Some(2),
            ..AnalyzeQuery::default()
        };
        assert_eq!(huge.school_params().offset, usize::MAX);
        assert_eq!(huge.school_params().limit, Some(2));
    }

    #[test]
    fn scope_params_pass_through() {
        let query = AnalyzeQuery {
            select_campus: Some("individual".to_string()),
            select_year: Some("2022".to_string()),
            select_school_type: Some("private".to_string()),
            ..AnalyzeQuery::default()
        };
        let params = query.school_params();
        assert_eq!(params.select_campus, CampusSelect::Individual);
        assert_eq!(params.select_year, YearSelect::Year("2022".to_string()));
        assert_eq!(
            params.select_school_type,
            SchoolTypeSelect::Category("private".to_string())
        );

        let defaults = AnalyzeQuery::default().school_params();
        assert_eq!(defaults.select_campus, CampusSelect::All);
        assert_eq!(defaults.select_year, YearSelect::All);
        assert_eq!(defaults.select_school_type, SchoolTypeSelect::All);
    }
}
