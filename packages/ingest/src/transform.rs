//! Feature normalization: filtered `GeoJSON` features to
//! [`PointRecord`]s.
//!
//! Transformation never fails — a feature that cannot become a valid
//! record is skipped, silently reducing the partition's record count.

use std::collections::BTreeMap;

use poi_atlas_models::PointRecord;

/// Maps one filtered feature to a normalized record, or `None` when the
/// feature is skipped.
///
/// A feature is skipped when its properties are absent or empty, its
/// geometry is absent, its geometry type is not `"Point"`, or its
/// coordinate array has fewer than two numeric components. Otherwise
/// the first two components are taken as (longitude, latitude) — the
/// extract is already in SRID 4326, so no reprojection happens here.
#[must_use]
pub fn transform(feature: &serde_json::Value) -> Option<PointRecord> {
    let properties = feature["properties"].as_object().filter(|p| !p.is_empty())?;

    let geometry = feature.get("geometry").filter(|g| !g.is_null())?;
    if geometry["type"].as_str()? != "Point" {
        return None;
    }

    let coordinates = geometry["coordinates"].as_array()?;
    let lon = coordinates.first().and_then(serde_json::Value::as_f64)?;
    let lat = coordinates.get(1).and_then(serde_json::Value::as_f64)?;
    if !lon.is_finite() || !lat.is_finite() {
        return None;
    }

    let name = properties
        .get("name")
        .and_then(serde_json::Value::as_str)
        .map(String::from);

    let tags: BTreeMap<String, Option<String>> = properties
        .iter()
        .map(|(key, value)| (key.clone(), coerce_tag_value(value)))
        .collect();

    Some(PointRecord {
        name,
        tags,
        location: (lon, lat),
    })
}

/// Coerces a property value to tag text. JSON `null` stays absent (it
/// becomes hstore `NULL`); strings pass through unquoted; any other
/// value keeps its JSON rendering.
fn coerce_tag_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
