//! Boundary collection loading.
//!
//! A boundary collection is a local `GeoJSON` `FeatureCollection` whose
//! members describe one administrative subdivision each. Members must
//! carry a usable name (under `name` or `NAME_1`, the two keys common
//! to OSM and GADM exports) and a Polygon or `MultiPolygon` geometry;
//! members lacking either are a configuration defect in the collection
//! and are skipped silently rather than failing the country's run.

use std::path::Path;

use poi_atlas_models::Boundary;

use crate::BoundaryError;

/// Property keys a member's subdivision name may live under.
const NAME_KEYS: &[&str] = &["name", "NAME_1"];

/// Loads every usable boundary from the collection at `path`.
///
/// Boundaries are returned in collection order, which is the order the
/// orchestrator processes partitions in.
///
/// # Errors
///
/// Returns [`BoundaryError::Missing`] if the file does not exist, or a
/// parse/I/O error if it cannot be read as `GeoJSON`.
pub fn load_collection(path: &Path) -> Result<Vec<Boundary>, BoundaryError> {
    if !path.exists() {
        return Err(BoundaryError::Missing {
            path: path.display().to_string(),
        });
    }

    let text = std::fs::read_to_string(path)?;
    let collection: serde_json::Value = serde_json::from_str(&text)?;

    let members = collection["features"].as_array().cloned().unwrap_or_default();
    let total = members.len();

    let boundaries: Vec<Boundary> = members.iter().filter_map(parse_member).collect();

    if boundaries.len() < total {
        log::warn!(
            "{}: skipped {} of {total} boundary members (missing name or geometry)",
            path.display(),
            total - boundaries.len(),
        );
    }

    Ok(boundaries)
}

/// Parses one collection member into a [`Boundary`], or `None` if it
/// lacks a usable name or a Polygon/`MultiPolygon` geometry.
fn parse_member(member: &serde_json::Value) -> Option<Boundary> {
    let properties = member["properties"].as_object()?;

    let name = NAME_KEYS
        .iter()
        .find_map(|key| properties.get(*key).and_then(serde_json::Value::as_str))
        .filter(|n| !n.trim().is_empty())?;

    let geometry = member.get("geometry")?;
    let geometry_type = geometry["type"].as_str()?;
    if geometry_type != "Polygon" && geometry_type != "MultiPolygon" {
        return None;
    }

    Some(Boundary {
        name: name.to_string(),
        properties: properties.clone(),
        geometry: geometry.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_polygon_member_with_name() {
        let member = json!({
            "type": "Feature",
            "properties": { "name": "Valparaíso", "iso": "CL-VS" },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
            }
        });

        let boundary = parse_member(&member).expect("member should parse");
        assert_eq!(boundary.name, "Valparaíso");
        assert_eq!(boundary.geometry["type"], "Polygon");
        assert!(boundary.properties.contains_key("iso"));
    }

    #[test]
    fn reads_name_from_alternate_key() {
        let member = json!({
            "type": "Feature",
            "properties": { "NAME_1": "Región Metropolitana" },
            "geometry": { "type": "MultiPolygon", "coordinates": [] }
        });

        let boundary = parse_member(&member).expect("member should parse");
        assert_eq!(boundary.name, "Región Metropolitana");
    }

    #[test]
    fn skips_member_without_name() {
        let member = json!({
            "type": "Feature",
            "properties": { "iso": "CL-VS" },
            "geometry": { "type": "Polygon", "coordinates": [] }
        });

        assert!(parse_member(&member).is_none());
    }

    #[test]
    fn skips_member_with_blank_name() {
        let member = json!({
            "type": "Feature",
            "properties": { "name": "   " },
            "geometry": { "type": "Polygon", "coordinates": [] }
        });

        assert!(parse_member(&member).is_none());
    }

    #[test]
    fn skips_member_without_geometry() {
        let member = json!({
            "type": "Feature",
            "properties": { "name": "Atacama" }
        });

        assert!(parse_member(&member).is_none());
    }

    #[test]
    fn skips_member_with_point_geometry() {
        let member = json!({
            "type": "Feature",
            "properties": { "name": "Atacama" },
            "geometry": { "type": "Point", "coordinates": [1.0, 2.0] }
        });

        assert!(parse_member(&member).is_none());
    }

    #[test]
    fn missing_collection_file_is_reported_as_missing() {
        let err = load_collection(Path::new("/nonexistent/boundaries.geojson"))
            .expect_err("missing file should error");

        assert!(matches!(err, BoundaryError::Missing { .. }));
    }
}
