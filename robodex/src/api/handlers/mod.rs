//! HTTP request handlers for all API endpoints.
//!
//! This module contains Axum route handlers organized by resource type.
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication checks
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`auth`]: Registration, login, logout, and password management
//! - [`robots`]: Robot catalog CRUD, capability search, natural-language
//!   query, and bulk upload
//! - [`users`]: Current-user introspection
//!
//! # Authentication
//!
//! Write handlers require authentication via session cookies or the proxy
//! header. The [`crate::auth`] module provides the [`CurrentUser`] extractor
//! that handlers take as an argument to enforce this; read handlers on the
//! catalog are public.
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which automatically converts to
//! appropriate HTTP status codes and error responses.
//!
//! [`CurrentUser`]: crate::api::models::users::CurrentUser

pub mod auth;
pub mod robots;
pub mod users;
