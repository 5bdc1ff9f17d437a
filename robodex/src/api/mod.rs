//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! The API is divided into several functional areas:
//!
//! - **Authentication** (`/api/v1/auth/*`): Registration, login, logout
//! - **Users** (`/api/v1/users/*`): Current-user introspection
//! - **Robots** (`/api/v1/robots/*`): Catalog CRUD, capability search,
//!   natural-language query, and bulk upload
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI/Swagger annotations using `utoipa`.
//! API documentation is available at `/docs` when the server is running.

pub mod handlers;
pub mod models;
