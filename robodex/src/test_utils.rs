//! Test utilities for integration testing (available with `test-utils` feature).

use crate::api::models::robots::RobotSearchQuery;
use crate::api::models::users::Role;
use crate::config::{NativeAuthConfig, PoolSettings, ProxyHeaderAuthConfig, SecurityConfig};
use crate::db::handlers::repository::Repository;
use crate::db::handlers::users::Users;
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::errors::Result;
use crate::nlq::FilterExtractor;
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Filter extractor that answers every query with the same canned filters.
///
/// Keeps handler tests off the network; the real extractor is covered by the
/// wiremock-backed integration tests.
#[derive(Debug, Clone, Default)]
pub struct StubFilterExtractor {
    filters: RobotSearchQuery,
}

impl StubFilterExtractor {
    pub fn returning(filters: RobotSearchQuery) -> Self {
        Self { filters }
    }
}

#[async_trait::async_trait]
impl FilterExtractor for StubFilterExtractor {
    async fn extract_filters(&self, _query: &str) -> Result<RobotSearchQuery> {
        Ok(self.filters.clone())
    }
}

pub async fn create_test_app(pool: PgPool) -> TestServer {
    create_test_app_with_config(pool, create_test_config()).await
}

pub async fn create_test_app_with_config(pool: PgPool, config: crate::config::Config) -> TestServer {
    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

pub fn create_test_state(pool: PgPool) -> crate::AppState {
    create_test_state_with_config(pool, create_test_config())
}

pub fn create_test_state_with_config(pool: PgPool, config: crate::config::Config) -> crate::AppState {
    crate::AppState::builder()
        .db(pool)
        .config(config)
        .extractor(Arc::new(StubFilterExtractor::default()))
        .build()
}

pub fn create_test_config() -> crate::config::Config {
    crate::config::Config {
        database_url: None,
        database: crate::config::DatabaseConfig::External {
            // Overridden by the pool that sqlx::test injects
            url: "postgres://localhost:5432/robodex_test".to_string(),
            pool: PoolSettings {
                max_connections: 4,
                min_connections: 1,
                ..Default::default()
            },
        },
        host: "127.0.0.1".to_string(),
        port: 0,
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        llm: crate::config::LlmConfig::default(),
        auth: crate::config::AuthConfig {
            native: NativeAuthConfig {
                enabled: true,
                ..Default::default()
            },
            proxy_header: ProxyHeaderAuthConfig {
                enabled: true,
                ..Default::default()
            },
            security: SecurityConfig::default(),
        },
    }
}

/// Inserts a user directly through the repository, bypassing the API.
///
/// `Role::Admin` also sets the `is_admin` flag, matching what the seeding path
/// does for the initial admin account.
pub async fn create_test_user(pool: &PgPool, role: Role) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let user_id = Uuid::new_v4();
    let username = format!("testuser_{}", user_id.simple());
    let email = format!("{username}@example.com");

    let user_create = UserCreateDBRequest {
        username,
        email,
        display_name: Some("Test User".to_string()),
        avatar_url: None,
        is_admin: role == Role::Admin,
        role,
        auth_source: "test".to_string(),
        password_hash: None,
    };

    users_repo.create(&user_create).await.expect("Failed to create test user")
}

/// Proxy-header credentials for the given user, for use with `TestServer::add_header`.
pub fn add_auth_headers(user: &UserDBResponse) -> (HeaderName, HeaderValue) {
    let config = ProxyHeaderAuthConfig::default();
    (
        HeaderName::from_bytes(config.header_name.as_bytes()).expect("invalid proxy header name"),
        HeaderValue::from_str(&user.email).expect("invalid header value"),
    )
}
