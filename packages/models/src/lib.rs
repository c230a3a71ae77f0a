#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shared data model for the POI atlas pipeline.
//!
//! The normalized [`PointRecord`] persisted to `PostGIS`, the
//! [`Boundary`] polygons used for spatial partitioning, and the static
//! per-country [`CountryConfig`].

use std::collections::BTreeMap;

use serde::Deserialize;

/// A normalized point of interest, ready for insertion into the `pois`
/// table.
///
/// A record always carries exactly two finite coordinate components;
/// features without usable coordinates are skipped during
/// transformation and never reach this type.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    /// The feature's `name` property, when present.
    pub name: Option<String>,
    /// Every source property, coerced to text. JSON `null` values are
    /// kept as `None` so they map to hstore `NULL` rather than a
    /// `"null"` string.
    pub tags: BTreeMap<String, Option<String>>,
    /// `(longitude, latitude)` in SRID 4326.
    pub location: (f64, f64),
}

impl PointRecord {
    /// Returns the record's location as an EWKT literal, e.g.
    /// `SRID=4326;POINT(-70.6483 -33.4569)`.
    #[must_use]
    pub fn ewkt(&self) -> String {
        let (lon, lat) = self.location;
        format!("SRID=4326;POINT({lon} {lat})")
    }
}

/// A named administrative subdivision polygon within a country.
///
/// Immutable once loaded from a boundary collection. The geometry is
/// kept as raw `GeoJSON` (Polygon or `MultiPolygon`) since it is only
/// ever re-serialized for the clip step, never interpreted.
#[derive(Debug, Clone)]
pub struct Boundary {
    /// Subdivision name, read from the member's `name` or `NAME_1`
    /// property.
    pub name: String,
    /// All descriptive properties carried by the collection member.
    pub properties: serde_json::Map<String, serde_json::Value>,
    /// The member's `GeoJSON` geometry object.
    pub geometry: serde_json::Value,
}

/// Static configuration for one country: where to download its extract
/// and, optionally, which boundary collection partitions it.
#[derive(Debug, Clone, Deserialize)]
pub struct CountryConfig {
    /// Unique identifier, e.g. `"chile"`.
    pub id: String,
    /// Human-readable name for log messages.
    pub name: String,
    /// Download URL for the country's `.osm.pbf` extract.
    pub url: String,
    /// Local path to a `GeoJSON` collection of subdivision polygons.
    /// When absent, the country is processed as a single whole-extract
    /// partition.
    #[serde(default)]
    pub boundaries: Option<String>,
}
