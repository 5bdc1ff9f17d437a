//! API request and response data models.
//!
//! This module contains the data structures used for HTTP request deserialization
//! and response serialization. These models define the public API contract.
//!
//! # Design Principles
//!
//! - **Separation of Concerns**: API models are distinct from database models,
//!   allowing independent evolution of API and storage representations
//! - **Validation**: Models use serde for deserialization and validation
//! - **OpenAPI**: All models are annotated with `utoipa` for automatic API docs
//!
//! # Model Categories
//!
//! ## Resource Models
//!
//! - [`users`]: User profiles and roles
//! - [`robots`]: Robot catalog entries, search filters, and bulk upload payloads
//!
//! ## Authentication Models
//!
//! - [`auth`]: Login and registration payloads
//!
//! # Example
//!
//! ```ignore
//! use robodex::api::models::robots::{RobotCreate, RobotResponse};
//!
//! // Deserialize from JSON
//! let create_req: RobotCreate = serde_json::from_str(json_str)?;
//!
//! // Serialize to JSON
//! let response = RobotResponse { /* ... */ };
//! let json = serde_json::to_string(&response)?;
//! ```

pub mod auth;
pub mod robots;
pub mod users;
