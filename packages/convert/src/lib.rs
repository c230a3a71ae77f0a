#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Spatial filter-convert engine.
//!
//! Wraps the external `ogr2ogr` tool to restrict a raw `.osm.pbf`
//! extract to its point layer, filter by the fixed category predicate,
//! and optionally clip to a subdivision polygon. The tool runs with no
//! timeout; a country-scale conversion can legitimately take minutes.

pub mod predicate;

use std::path::{Path, PathBuf};
use std::process::Command;

use poi_atlas_models::Boundary;

use crate::predicate::category_filter;

/// Errors that can occur during a filter/clip conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// I/O error preparing input or output files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The clip geometry could not be serialized.
    #[error("Clip geometry serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// ogr2ogr exited non-zero. Partial output must not be used.
    #[error("ogr2ogr failed: {stderr}")]
    Tool {
        /// Diagnostic text from the tool's stderr.
        stderr: String,
    },
}

/// Runs ogr2ogr over `extract_path`, writing the filtered point
/// features to `output_path` as `GeoJSON`.
///
/// Any stale file at `output_path` is removed first so a prior run's
/// contents can never leak into this result. When `clip` is given, the
/// boundary geometry is written to a temporary file next to the output
/// and passed via `-clipsrc`; that file is removed before this function
/// returns, on both the success and failure path.
///
/// # Errors
///
/// Returns [`ConversionError`] if file preparation fails or the tool
/// exits non-zero. On failure, whatever ended up at `output_path` is
/// unusable and the caller is expected to discard it.
pub fn filter_convert(
    extract_path: &Path,
    output_path: &Path,
    clip: Option<&Boundary>,
) -> Result<(), ConversionError> {
    if output_path.exists() {
        log::info!("Removing stale output {}", output_path.display());
        std::fs::remove_file(output_path)?;
    }

    let clip_path = clip
        .map(|boundary| write_clip_file(output_path, boundary))
        .transpose()?;

    let args = build_args(extract_path, output_path, clip_path.as_deref());
    let result = Command::new("ogr2ogr").args(&args).output();

    if let Some(path) = &clip_path
        && let Err(e) = std::fs::remove_file(path)
    {
        log::warn!("Failed to remove clip file {}: {e}", path.display());
    }

    let output = result?;

    if !output.status.success() {
        return Err(ConversionError::Tool {
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(())
}

/// Serializes the boundary geometry as a single-feature `GeoJSON` file
/// for `-clipsrc`, named after the (already unique) output path.
fn write_clip_file(output_path: &Path, boundary: &Boundary) -> Result<PathBuf, ConversionError> {
    let clip_path = clip_path_for(output_path);

    let feature = serde_json::json!({
        "type": "Feature",
        "properties": {},
        "geometry": boundary.geometry,
    });

    std::fs::write(&clip_path, serde_json::to_vec(&feature)?)?;
    Ok(clip_path)
}

/// Returns the clip-file path derived from the conversion output path.
fn clip_path_for(output_path: &Path) -> PathBuf {
    output_path.with_extension("clip.geojson")
}

/// Builds the ogr2ogr argument list. The trailing `points` selects the
/// point-geometry layer of the `.pbf` driver; other layers (lines,
/// multipolygons, relations) are never read.
fn build_args(extract_path: &Path, output_path: &Path, clip_path: Option<&Path>) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        "GeoJSON".to_string(),
        "-overwrite".to_string(),
        "-where".to_string(),
        category_filter(),
    ];

    if let Some(clip) = clip_path {
        args.push("-clipsrc".to_string());
        args.push(clip.display().to_string());
    }

    args.push(output_path.display().to_string());
    args.push(extract_path.display().to_string());
    args.push("points".to_string());

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_without_clip() {
        let args = build_args(
            Path::new("work/chile-latest.osm.pbf"),
            Path::new("work/out.geojson"),
            None,
        );

        assert_eq!(args[0..4], ["-f", "GeoJSON", "-overwrite", "-where"]);
        assert!(args[4].contains("\"amenity\"=>"));
        assert_eq!(
            args[5..],
            ["work/out.geojson", "work/chile-latest.osm.pbf", "points"]
        );
        assert!(!args.contains(&"-clipsrc".to_string()));
    }

    #[test]
    fn args_with_clip_insert_clipsrc_before_output() {
        let args = build_args(
            Path::new("work/chile-latest.osm.pbf"),
            Path::new("work/out.geojson"),
            Some(Path::new("work/out.clip.geojson")),
        );

        let clip_idx = args.iter().position(|a| a == "-clipsrc").expect("-clipsrc");
        assert_eq!(args[clip_idx + 1], "work/out.clip.geojson");
        assert_eq!(args[clip_idx + 2], "work/out.geojson");
        assert_eq!(args.last().map(String::as_str), Some("points"));
    }

    #[test]
    fn clip_path_derives_from_output_path() {
        assert_eq!(
            clip_path_for(Path::new("work/5f3a.geojson")),
            Path::new("work/5f3a.clip.geojson")
        );
    }

    #[test]
    fn failed_conversion_still_removes_clip_file() {
        let boundary = Boundary {
            name: "Maule".to_string(),
            properties: serde_json::Map::new(),
            geometry: serde_json::json!({ "type": "Polygon", "coordinates": [] }),
        };

        let out = std::env::temp_dir().join("poi_atlas_convert_fail_test.geojson");
        let result = filter_convert(
            Path::new("/nonexistent/extract.osm.pbf"),
            &out,
            Some(&boundary),
        );

        // Fails whether the tool is present (non-zero exit on a missing
        // source) or absent (spawn error); the clip file must be gone
        // on both paths.
        assert!(result.is_err());
        assert!(!clip_path_for(&out).exists());

        std::fs::remove_file(&out).ok();
    }

    #[test]
    fn clip_file_round_trips_geometry() {
        let boundary = Boundary {
            name: "Maule".to_string(),
            properties: serde_json::Map::new(),
            geometry: serde_json::json!({
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
            }),
        };

        let out = std::env::temp_dir().join("poi_atlas_clip_test.geojson");
        let clip = write_clip_file(&out, &boundary).expect("clip file written");

        let text = std::fs::read_to_string(&clip).expect("clip file readable");
        let feature: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(feature["geometry"]["type"], "Polygon");

        std::fs::remove_file(&clip).ok();
    }
}
