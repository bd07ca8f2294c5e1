//! HTTP handler functions for the admissions statistics API.

use actix_web::{HttpResponse, web};
use admit_stats_analytics::reports;
use admit_stats_server_models::{AnalyzeQuery, ApiHealth};

use crate::AppState;

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /analyze`
///
/// Serves the campus report by default, or the school report when
/// `by=school`. Any other `by` value answers with a usage hint at 200 so a
/// hand-typed URL gets a readable reply instead of an error page.
pub async fn analyze(state: web::Data<AppState>, params: web::Query<AnalyzeQuery>) -> HttpResponse {
    match params.by.as_deref().unwrap_or("campus") {
        "campus" => match reports::campus_rates(state.db.as_ref()).await {
            Ok(report) => HttpResponse::Ok().json(report),
            Err(e) => {
                log::error!("Failed to build campus report: {e}");
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to build campus report"
                }))
            }
        },
        "school" => {
            match reports::school_rates(state.db.as_ref(), &params.school_params()).await {
                Ok(report) => HttpResponse::Ok().json(report),
                Err(e) => {
                    log::error!("Failed to build school report: {e}");
                    HttpResponse::InternalServerError().json(serde_json::json!({
                        "error": "Failed to build school report"
                    }))
                }
            }
        }
        other => HttpResponse::Ok().json(format!(
            "Unknown report {other:?}: try by=campus or by=school"
        )),
    }
}
