#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! `PostGIS` access for the POI atlas.
//!
//! Connection setup, idempotent schema provisioning for the `pois`
//! table, and the transactional batch loader. All writes are additive
//! inserts; there is no update or delete path.

pub mod db;
pub mod loader;
pub mod schema;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database connection or statement failure.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Data could not be encoded for the store.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
