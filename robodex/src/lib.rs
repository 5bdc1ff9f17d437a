//! # robodex: Robot Hardware Catalog and Search
//!
//! `robodex` is a self-hostable catalog for robot hardware specifications. It stores normalized
//! spec sheets for mobile bases, manipulator arms, and mobile manipulators, and exposes a RESTful
//! API for browsing, structured capability search, and natural-language search over the catalog.
//!
//! ## Overview
//!
//! Robot selection is usually done by hand: integrators compare payload, reach, drive systems,
//! ROS support, and certifications across vendor datasheets that all slice the numbers
//! differently. `robodex` addresses this by keeping the specifications in one normalized store
//! and making them queryable, both with explicit filter parameters and with free-text questions
//! ("ROS robots that can carry 50kg") that are translated into the same structured filters.
//!
//! ### What It Does
//!
//! At its core, `robodex` manages catalog entries through authenticated CRUD endpoints, answers
//! public capability searches with conjunctive filters (type, payload, reach, ROS support, drive
//! system, arm degrees of freedom, force sensing), and forwards natural-language queries to an
//! OpenAI-compatible chat completions endpoint that extracts structured filters from the text.
//! Bulk import accepts whole spec-sheet collections in one request and reports per-entry results.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! uses PostgreSQL for all persistence needs. It can operate with either an embedded PostgreSQL
//! instance (useful for development) or an external PostgreSQL database (recommended for
//! production).
//!
//! ### Request Flow
//!
//! Catalog reads (`GET /api/v1/robots`, `GET /api/v1/robots/search`, `POST
//! /api/v1/robots/nl-query`) are public. Mutations pass through authentication first: the
//! [`CurrentUser`] extractor accepts a JWT session cookie (issued by the login and registration
//! endpoints) or a trusted proxy header (for deployments behind an SSO proxy), in that order.
//! Once authenticated, the request reaches the appropriate handler which interacts with the
//! database through repository interfaces.
//!
//! A natural-language query makes one extra hop: the query text is sent to the configured
//! language model endpoint, the model answers with a JSON filter object, and the filters run
//! through the same search path as `/robots/search`. The response carries the extracted filters
//! alongside the matches so clients can show what the model understood.
//!
//! [`CurrentUser`]: crate::api::models::users::CurrentUser
//!
//! ### Core Components
//!
//! The **API layer** ([`api`]) exposes the management surface under `/api/v1/*`: robot CRUD,
//! capability search, natural-language query, bulk import, session management, and the current
//! user profile. It uses RESTful conventions and documents itself via OpenAPI, served
//! interactively at `/docs`.
//!
//! The **authentication layer** ([`auth`]) handles session-based authentication with native
//! login/registration and can integrate with SSO proxy implementations for federated
//! authentication.
//!
//! The **database layer** ([`db`]) uses the repository pattern to abstract data access. Each
//! entity (robots, users) has a corresponding repository that handles queries and mutations.
//!
//! The **extraction layer** ([`nlq`]) turns free text into structured catalog filters behind the
//! [`FilterExtractor`](nlq::FilterExtractor) trait, with an OpenAI-compatible implementation as
//! the default backend.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use robodex::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Parse CLI arguments and load configuration
//!     let args = robodex::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     // Initialize telemetry (structured logging)
//!     robodex::telemetry::init_telemetry()?;
//!
//!     // Create and start the application
//!     let app = Application::new(config).await?;
//!
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application requires a PostgreSQL database and automatically runs migrations on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! // Run migrations
//! robodex::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod nlq;
mod openapi;
pub mod telemetry;
mod types;
use crate::config::CorsOrigin;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(test)]
mod test;

use crate::{
    api::models::users::Role,
    auth::password,
    db::handlers::{Repository, Users},
    db::models::users::UserCreateDBRequest,
    nlq::{FilterExtractor, OpenAiFilterExtractor},
    openapi::ApiDoc,
};
use axum::http::HeaderValue;
use axum::{
    Json, Router, http,
    routing::{delete, get, patch, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{RobotId, UserId};

/// Application state shared across all request handlers.
///
/// This struct contains all the shared resources needed by the API handlers,
/// including the database pool, configuration, and the natural-language
/// filter extractor.
///
/// # Fields
///
/// - `db`: PostgreSQL connection pool for catalog data
/// - `config`: Application configuration loaded from environment/files
/// - `extractor`: Backend that turns free-text queries into structured filters
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .extractor(Arc::new(OpenAiFilterExtractor::new(llm_config)))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub extractor: Arc<dyn FilterExtractor>,
}

/// Get the robodex database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// This function is idempotent - it will create a new admin user if one doesn't exist,
/// or update the password if the user already exists. This is typically called during
/// application startup to ensure there's always an admin user available.
///
/// # Arguments
///
/// - `email`: Email address for the admin user (also used as username)
/// - `password`: Optional password. If `None`, the user will have no password set
/// - `db`: PostgreSQL connection pool
///
/// # Returns
///
/// Returns the user ID of the created or existing admin user.
///
/// # Errors
///
/// Returns an error if database operations fail.
///
/// # Example
///
/// ```no_run
/// # use robodex::create_initial_admin_user;
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user_id = create_initial_admin_user(
///     "admin@example.com",
///     Some("secure_password"),
///     &pool
/// ).await?;
/// # Ok(())
/// # }
/// ```
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: Option<&str>, db: &PgPool) -> Result<UserId, sqlx::Error> {
    // Hash password if provided
    let password_hash = if let Some(pwd) = password {
        Some(password::hash_string(pwd).map_err(|e| sqlx::Error::Encode(format!("Failed to hash admin password: {e}").into()))?)
    } else {
        None
    };

    // Use a transaction to ensure atomicity
    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    // Check if user already exists
    if let Some(existing_user) = user_repo
        .get_user_by_email(email)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("Failed to check existing user: {e}")))?
    {
        // User exists - update password if provided
        if let Some(password_hash) = password_hash {
            sqlx::query("UPDATE users SET password_hash = $1 WHERE email = $2")
                .bind(password_hash)
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        return Ok(existing_user.id);
    }

    // Create new admin user
    let user_create = UserCreateDBRequest {
        username: email.to_string(),
        email: email.to_string(),
        display_name: None,
        avatar_url: None,
        is_admin: true,
        role: Role::Admin,
        auth_source: "system".to_string(),
        password_hash,
    };

    let created_user = user_repo
        .create(&user_create)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("Failed to create admin user: {e}")))?;

    tx.commit().await?;
    Ok(created_user.id)
}

/// Setup the database connection, run migrations, and initialize data
/// Returns: (embedded_db, pool)
async fn setup_database(config: &Config) -> anyhow::Result<(Option<db::embedded::EmbeddedDatabase>, PgPool)> {
    // Database connection - handle both embedded and external
    let (_embedded_db, database_url) = match &config.database {
        config::DatabaseConfig::Embedded { .. } => {
            let persistent = config.database.embedded_persistent();
            info!("Starting with embedded database (persistent: {})", persistent);
            if !persistent {
                info!("persistent=false: database will be ephemeral and data will be lost on shutdown");
            }
            #[cfg(feature = "embedded-db")]
            {
                let data_dir = config.database.embedded_data_dir();
                let embedded_db = db::embedded::EmbeddedDatabase::start(data_dir, persistent).await?;
                let url = embedded_db.connection_string().to_string();
                (Some(embedded_db), url)
            }
            #[cfg(not(feature = "embedded-db"))]
            {
                anyhow::bail!(
                    "Embedded database is configured but the feature is not enabled. \
                     Rebuild with --features embedded-db to use embedded database."
                );
            }
        }
        config::DatabaseConfig::External { url, .. } => {
            info!("Using external database");
            (None::<db::embedded::EmbeddedDatabase>, url.clone())
        }
    };

    let settings = config.database.pool_settings();
    let mut pool_options = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(settings.acquire_timeout_secs));
    // Zero means "never recycle" for both timeouts
    if settings.idle_timeout_secs > 0 {
        pool_options = pool_options.idle_timeout(std::time::Duration::from_secs(settings.idle_timeout_secs));
    }
    if settings.max_lifetime_secs > 0 {
        pool_options = pool_options.max_lifetime(std::time::Duration::from_secs(settings.max_lifetime_secs));
    }
    let pool = pool_options.connect(&database_url).await?;
    migrator().run(&pool).await?;

    // Create initial admin user if it doesn't exist
    create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {}", e))?;

    Ok((_embedded_db, pool))
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.auth.security.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            // Url serializes with a trailing slash; Origin header values carry none
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut exposed_headers = Vec::new();
    for name in &config.auth.security.cors.exposed_headers {
        exposed_headers.push(name.parse::<http::HeaderName>()?);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.auth.security.cors.allow_credentials)
        .expose_headers(exposed_headers);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - Authentication routes (login, registration, logout, password change)
/// - Catalog routes (robot CRUD, capability search, natural-language query, bulk import)
/// - Interactive API documentation
/// - CORS configuration
/// - Tracing middleware
///
/// # Errors
///
/// Returns an error if the CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    // Authentication routes (session lifecycle for browser clients)
    let auth_routes = Router::new()
        .route(
            "/auth/register",
            get(api::handlers::auth::get_registration_info).post(api::handlers::auth::register),
        )
        .route(
            "/auth/login",
            get(api::handlers::auth::get_login_info).post(api::handlers::auth::login),
        )
        .route("/auth/logout", post(api::handlers::auth::logout))
        .route("/auth/password-change", post(api::handlers::auth::change_password))
        .with_state(state.clone());

    // Catalog routes. Reads are public; writes require an authenticated user,
    // enforced by the CurrentUser extractor in the handlers.
    let api_routes = Router::new()
        .route("/robots", get(api::handlers::robots::list_robots))
        .route("/robots", post(api::handlers::robots::create_robot))
        .route("/robots/search", get(api::handlers::robots::search_robots))
        .route("/robots/nl-query", post(api::handlers::robots::nl_query))
        .route("/robots/bulk", post(api::handlers::robots::bulk_upload))
        .route("/robots/{id}", get(api::handlers::robots::get_robot))
        .route("/robots/{id}", patch(api::handlers::robots::update_robot))
        .route("/robots/{id}", delete(api::handlers::robots::delete_robot))
        // Current user profile
        .route("/users/me", get(api::handlers::users::get_current_user))
        // Raw OpenAPI document, also consumed by the interactive docs below
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api/v1", auth_routes.merge(api_routes))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// This is the top-level container for the entire application, managing:
/// - HTTP server and routing
/// - Database connections (external or embedded)
/// - Application configuration
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] initializes all resources, runs migrations,
///    and seeds the initial admin user
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal is received, the server drains in-flight
///    requests and releases the database
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
    _embedded_db: Option<db::embedded::EmbeddedDatabase>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting robodex with configuration: {:#?}", config);
        Self::new_with_pool(config, None).await
    }

    /// Create an application on an existing connection pool.
    ///
    /// Skips database provisioning (the pool's database is assumed to be migrated)
    /// but still seeds the initial admin user. Used by tests, where `sqlx::test`
    /// hands out a fresh migrated database per test.
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        let (_embedded_db, pool) = match pool {
            Some(pool) => {
                create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {}", e))?;
                (None, pool)
            }
            None => setup_database(&config).await?,
        };

        let extractor: Arc<dyn FilterExtractor> = Arc::new(OpenAiFilterExtractor::new(config.llm.clone()));

        let app_state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .extractor(extractor)
            .build();

        let router = build_router(&app_state)?;

        Ok(Self {
            router,
            config,
            pool,
            _embedded_db,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Robodex listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        // Clean up embedded database if it exists
        if let Some(embedded_db) = self._embedded_db {
            info!("Shutting down embedded database...");
            embedded_db.stop().await?;
        }

        Ok(())
    }
}
