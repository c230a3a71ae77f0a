#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Data acquisition for the POI atlas pipeline.
//!
//! Covers the three inputs the orchestrator consumes: the static
//! country registry (embedded TOML configs), the raw `.osm.pbf` extract
//! download, and the optional per-country boundary collections.

pub mod boundaries;
pub mod download;
pub mod progress;
pub mod registry;

/// Errors that can occur while acquiring a country's extract.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error while writing the downloaded file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while loading a boundary collection.
#[derive(Debug, thiserror::Error)]
pub enum BoundaryError {
    /// The configured collection file does not exist locally.
    #[error("Boundary collection not found: {path}")]
    Missing {
        /// Path that was configured for the country.
        path: String,
    },

    /// I/O error while reading the collection file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The collection file is not valid `GeoJSON`.
    #[error("Boundary collection parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
