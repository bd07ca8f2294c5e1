#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the admissions statistics service.
//!
//! Two routes: `/health` and `/analyze`. The analyze handler runs the
//! campus or school aggregator against the fact store on every request;
//! the store is the only shared state and the engine only reads it, so
//! requests run concurrently without coordination.

mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use admit_stats_database::{db, schema};
use std::sync::Arc;
use switchy_database::Database;

/// Shared application state.
pub struct AppState {
    /// Fact store connection.
    pub db: Arc<dyn Database>,
}

/// Starts the admissions statistics API server.
///
/// Connects to the fact store, ensures the schema exists, and serves HTTP
/// on `BIND_ADDR`/`PORT` (default `127.0.0.1:8080`). This is a regular
/// async function; the caller is responsible for providing the async
/// runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the fact store connection fails or the schema cannot be
/// ensured.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    log::info!("Connecting to the fact store...");
    let (db_conn, dialect) = db::connect_from_env()
        .await
        .expect("Failed to connect to the fact store");

    log::info!("Ensuring store schema...");
    schema::ensure_schema(db_conn.as_ref(), dialect)
        .await
        .expect("Failed to ensure the store schema");

    let state = web::Data::new(AppState {
        db: Arc::from(db_conn),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .route("/health", web::get().to(handlers::health))
            .route("/analyze", web::get().to(handlers::analyze))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
