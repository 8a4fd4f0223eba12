//! Air Audit API Server
//!
//! An append-only ledger of aircraft maintenance items, loaded from tracker
//! CSV exports. Uses hexagonal (ports & adapters) architecture.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{
    SqliteAircraftRepository, SqliteImportBatchRepository, SqliteMaintenanceItemRepository,
    SqliteQuarantineRepository, SqliteSessionRepository, SqliteUserRepository,
};
use app::{AircraftService, AuthService, LedgerService};
use config::Config;
use error::ConfigError;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub aircraft_service:
        Arc<AircraftService<SqliteAircraftRepository, SqliteImportBatchRepository>>,
    pub ledger_service: Arc<
        LedgerService<
            SqliteAircraftRepository,
            SqliteImportBatchRepository,
            SqliteMaintenanceItemRepository,
            SqliteQuarantineRepository,
        >,
    >,
    pub auth_service: Arc<AuthService<SqliteUserRepository, SqliteSessionRepository>>,
    pub config: Config,
}

impl AppState {
    /// Wire the repositories and services over one database connection
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let aircraft_repo = Arc::new(SqliteAircraftRepository::new(db.clone()));
        let import_repo = Arc::new(SqliteImportBatchRepository::new(db.clone()));
        let item_repo = Arc::new(SqliteMaintenanceItemRepository::new(db.clone()));
        let quarantine_repo = Arc::new(SqliteQuarantineRepository::new(db.clone()));
        let user_repo = Arc::new(SqliteUserRepository::new(db.clone()));
        let session_repo = Arc::new(SqliteSessionRepository::new(db));

        let aircraft_service = Arc::new(AircraftService::new(
            aircraft_repo.clone(),
            import_repo.clone(),
        ));

        let ledger_service = Arc::new(LedgerService::new(
            aircraft_repo,
            import_repo,
            item_repo,
            quarantine_repo,
        ));

        let auth_service = Arc::new(AuthService::new(
            user_repo,
            session_repo,
            config.session_duration_seconds,
        ));

        Self {
            aircraft_service,
            ledger_service,
            auth_service,
            config,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the application router
pub fn build_router(state: AppState) -> Result<Router, ConfigError> {
    let config = &state.config;

    let mut login_routes = Router::new().route("/auth/login", post(handlers::login));
    if config.login_rate_limit {
        // 2 req/sec sustained, burst of 5, keyed on the peer address
        let governor_config = GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(2)
            .burst_size(5)
            .finish()
            .ok_or_else(|| ConfigError::Invalid {
                key: "LOGIN_RATE_LIMIT",
                message: "invalid rate limit quota".to_string(),
            })?;
        login_routes = login_routes.layer(GovernorLayer {
            config: Arc::new(governor_config),
        });
    }

    let protected_routes = Router::new()
        // Session
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/me", get(handlers::me))
        // User management
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        // Aircraft and imports
        .route(
            "/aircraft",
            get(handlers::list_aircraft).post(handlers::create_aircraft),
        )
        .route("/aircraft/:aircraft_id", get(handlers::get_aircraft))
        .route(
            "/aircraft/:aircraft_id/imports",
            get(handlers::list_imports).post(handlers::upload_import),
        )
        // Ledger
        .route("/aircraft/:aircraft_id/items", get(handlers::list_items))
        .route(
            "/aircraft/:aircraft_id/items/count",
            get(handlers::count_items),
        )
        .route(
            "/aircraft/:aircraft_id/quarantine",
            get(handlers::list_quarantine),
        )
        .route(
            "/aircraft/:aircraft_id/quarantine/count",
            get(handlers::count_quarantine),
        )
        .route("/imports/:batch_id", get(handlers::get_import))
        .route(
            "/imports/:batch_id/errors",
            get(handlers::list_import_errors),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let cors = config.cors.layer()?;
    let body_limit = DefaultBodyLimit::max(config.max_upload_bytes);

    Ok(Router::new()
        // Health check (no auth)
        .route("/health", get(health))
        .merge(login_routes)
        .merge(protected_routes)
        // Middleware
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,air_audit_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Air Audit API...");

    // Load configuration
    let config = Config::from_env()?;

    // Open the SQLite database
    tokio::fs::create_dir_all(&config.db_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.db_dir.display()))?;
    let db_path = config.db_path();
    tracing::info!(path = %db_path.display(), "Opening database...");
    let db = adapters::sqlite::connect(&db_path)
        .await
        .context("Failed to open database")?;
    tracing::info!("Database ready");

    let state = AppState::new(db, config.clone());

    let seeded = state
        .auth_service
        .ensure_default_users(&config.default_passwords)
        .await?;
    if seeded == 0 {
        tracing::debug!("Users already present, skipping default accounts");
    }

    let app = build_router(state)?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
