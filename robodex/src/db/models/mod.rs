//! Database record models matching table schemas.
//!
//! This module contains struct definitions that directly correspond to database
//! table rows. These models are used by repositories to return query results
//! and accept insertion/update data.
//!
//! # Design Principles
//!
//! - **Schema Mapping**: Each model struct matches a database table schema
//! - **SQLx Integration**: Models derive `sqlx::FromRow` for query results
//! - **Separation**: Database models are distinct from API models to allow
//!   independent evolution of storage and API representations
//!
//! # Model Categories
//!
//! - [`users`]: User accounts, authentication, and profiles
//! - [`robots`]: Robot hardware specification catalog entries
//!
//! # Conversion to API Models
//!
//! Database models typically implement `From` or `Into` conversions to API models:
//!
//! ```ignore
//! use robodex::db::models::robots::RobotDBResponse;
//! use robodex::api::models::robots::RobotResponse;
//!
//! let db_robot: RobotDBResponse = /* ... */;
//! let api_response: RobotResponse = db_robot.into();
//! ```

pub mod robots;
pub mod users;
