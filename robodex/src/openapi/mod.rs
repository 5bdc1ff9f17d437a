//! OpenAPI/Swagger documentation configuration.
//!
//! This module defines the OpenAPI spec for the `/api/v1/*` endpoints. The
//! rendered document is served at `/api/v1/openapi.json` and browsable at
//! `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;

/// Security scheme for session-cookie authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "session_token".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "robodex_session",
                    "JWT session cookie issued by the login and registration endpoints. \
                     Deployments behind an authenticating proxy can use the configured \
                     trusted header instead.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/api/v1", description = "Robodex API server")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Robot catalog
        api::handlers::robots::list_robots,
        api::handlers::robots::search_robots,
        api::handlers::robots::nl_query,
        api::handlers::robots::get_robot,
        api::handlers::robots::create_robot,
        api::handlers::robots::update_robot,
        api::handlers::robots::delete_robot,
        api::handlers::robots::bulk_upload,
        // Authentication
        api::handlers::auth::get_registration_info,
        api::handlers::auth::register,
        api::handlers::auth::get_login_info,
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::change_password,
        // Users
        api::handlers::users::get_current_user,
    ),
    components(
        schemas(
            // Robot types
            crate::db::models::robots::RobotType,
            api::models::robots::RobotCreate,
            api::models::robots::RobotUpdate,
            api::models::robots::RobotResponse,
            api::models::robots::RobotSearchQuery,
            api::models::robots::NlQueryRequest,
            api::models::robots::NlQueryResponse,
            api::models::robots::BulkUploadRequest,
            api::models::robots::BulkUploadError,
            api::models::robots::BulkUploadResponse,
            // Auth types
            api::models::auth::RegisterRequest,
            api::models::auth::LoginRequest,
            api::models::auth::ChangePasswordRequest,
            api::models::auth::AuthResponse,
            api::models::auth::AuthSuccessResponse,
            api::models::auth::RegistrationInfo,
            api::models::auth::LoginInfo,
            // User types
            api::models::users::UserResponse,
            api::models::users::CurrentUser,
            api::models::users::Role,
        )
    ),
    tags(
        (name = "robots", description = "Robot hardware catalog.

Reads are public: list the catalog, fetch a single entry, search by structured
capability filters, or search with a free-text query that is translated into
the same filters by a language model. Writes require authentication."),
        (name = "authentication", description = "Account registration and session management.

Native authentication issues a JWT session cookie. Deployments behind an
authenticating proxy can rely on a trusted identity header instead."),
        (name = "users", description = "Introspection for the authenticated user."),
    ),
    info(
        title = "Robodex API",
        description = "Catalog and natural-language search service for robot hardware specifications.

## Authentication

Read endpoints are public. Write endpoints accept either a session cookie
(obtained via `/auth/login` or `/auth/register`) or, when proxy-header
authentication is enabled, a trusted identity header set by a fronting proxy.",
    ),
)]
pub struct ApiDoc;
