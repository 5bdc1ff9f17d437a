//! Repository implementations for database access.
//!
//! This module provides repository structs for each major entity in the system.
//! Repositories follow a consistent pattern and implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//! - Uses the connection's transaction for ACID guarantees
//!
//! # Available Repositories
//!
//! - [`Users`]: User account management and authentication
//! - [`Robots`]: Robot catalog entries and capability search
//!
//! # Common Pattern
//!
//! All repositories follow this usage pattern:
//!
//! ```ignore
//! use robodex::db::handlers::{Robots, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     // Start a transaction
//!     let mut tx = pool.begin().await?;
//!
//!     // Create repository from transaction
//!     let mut repo = Robots::new(&mut tx);
//!
//!     // Perform operations
//!     let robots = repo.list(&Default::default()).await?;
//!
//!     // Commit or rollback
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```
//!
//! # The Repository Trait
//!
//! The [`Repository`] trait defines common CRUD operations that all repositories
//! should implement:
//!
//! - `create()`: Insert a new record
//! - `get_by_id()`: Fetch a record by ID
//! - `list()`: List records matching a filter
//! - `update()`: Apply a partial update by ID
//! - `delete()`: Delete a record by ID

pub mod repository;
pub mod robots;
pub mod users;

pub use repository::Repository;
pub use robots::Robots;
pub use users::Users;
