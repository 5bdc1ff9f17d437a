//! Authentication and authorization system.
//!
//! This module provides the auth system including:
//! - User authentication (JWT session cookies and trusted proxy headers)
//! - Password hashing and validation
//!
//! # Authentication Methods
//!
//! The system supports two authentication methods:
//!
//! ## 1. Session Authentication
//!
//! Browser-based authentication using secure HTTP-only cookies:
//! - Users log in via `/api/v1/auth/login` with email/password
//! - A signed JWT is stored in a secure, HTTP-only cookie
//! - Tokens carry the user identity and expire on their own; there is no
//!   server-side session store
//!
//! ## 2. Proxy Header Authentication
//!
//! For deployments behind an authenticating reverse proxy:
//! - The proxy asserts the user's email in a configurable header
//! - Unknown users can be auto-created on first sight
//!
//! # Authorization
//!
//! Write operations on the catalog require any authenticated user. The
//! `is_admin` flag and role exist for operators inspecting accounts; no
//! endpoint distinguishes between roles today.
//!
//! # Modules
//!
//! - [`current_user`]: Extractors for getting the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`session`]: JWT session token creation and verification
//! - [`utils`]: Authentication helper functions
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use robodex::api::models::users::CurrentUser;
//! use axum::extract::State;
//!
//! async fn protected_handler(
//!     current_user: CurrentUser,
//!     State(state): State<AppState>,
//! ) -> Result<String, Error> {
//!     Ok(format!("Hello, {}!", current_user.username))
//! }
//! ```

pub mod current_user;
pub mod password;
pub mod session;
pub mod utils;
