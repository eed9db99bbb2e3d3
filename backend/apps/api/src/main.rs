//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod app;

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use auth::application::AccountAdminUseCase;
use auth::{AuthAppState, AuthConfig, PgAccountRepository};
use axum::extract::State;
use axum::routing::get;
use axum::{
    Json, Router, http,
    http::{Method, header},
};
use kernel::clock::{Clock, SystemClock};
use lending::{LendingAppState, LendingConfig, PgLendingRepository};
use platform::password::{Argon2Hasher, PasswordHasher};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,lending=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url =
        env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Auth configuration
    let mut auth_config = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        // In production, load secret from environment
        let secret_b64 = env::var("IDENTITY_TOKEN_SECRET")
            .context("IDENTITY_TOKEN_SECRET must be set in production")?;
        let secret = platform::crypto::key_from_base64(&secret_b64)
            .context("IDENTITY_TOKEN_SECRET must be base64 of 32 bytes")?;
        AuthConfig {
            token_secret: secret,
            ..AuthConfig::default()
        }
    };
    if let Ok(pepper) = env::var("PASSWORD_PEPPER") {
        auth_config.password_pepper = Some(pepper.into_bytes());
    }

    let mut hasher = Argon2Hasher::new(auth_config.argon2)?;
    if let Some(pepper) = &auth_config.password_pepper {
        hasher = hasher.with_pepper(pepper.clone());
    }
    let hasher: Arc<dyn PasswordHasher> = Arc::new(hasher);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let account_store = PgAccountRepository::new(pool.clone());
    let auth_state = AuthAppState::new(account_store, hasher, clock.clone(), auth_config);

    // Primary administrator bootstrap
    // Errors here should not prevent server startup
    if let Ok(root_password) = env::var("ROOT_PASSWORD") {
        let admin = AccountAdminUseCase::new(
            auth_state.repo.clone(),
            auth_state.hasher.clone(),
            auth_state.clock.clone(),
            auth_state.config.clone(),
        );
        match admin.ensure_primary_admin(root_password).await {
            Ok(true) => tracing::info!("Primary administrator created"),
            Ok(false) => tracing::debug!("Primary administrator already present"),
            Err(e) => tracing::warn!(error = %e, "Primary administrator bootstrap failed, continuing anyway"),
        }
    }

    let lending_state = LendingAppState::new(
        PgLendingRepository::new(pool.clone()),
        clock,
        LendingConfig::default(),
    );

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = app::app_router(auth_state, lending_state)
        .merge(
            Router::new()
                .route("/api/health", get(health))
                .with_state(pool),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
        .parse()
        .context("LISTEN_ADDR must be host:port")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /api/health
///
/// Reports whether the database answers.
async fn health(State(pool): State<PgPool>) -> AppResult<Json<serde_json::Value>> {
    sqlx::query("SELECT 1").execute(&pool).await?;
    Ok(Json(serde_json::json!({ "status": "ok", "database": "reachable" })))
}
