#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for loading filtered OSM points of interest into the
//! `PostGIS` database.
//!
//! The orchestrator walks the configured countries in order. Each
//! country is downloaded, split into partitions (one per configured
//! subdivision boundary, or a single whole-extract partition), and each
//! partition is filtered, transformed, and loaded strictly
//! sequentially. Failures are isolated to the unit they occur in: a
//! failed download skips the country, a failed conversion or load
//! abandons the partition, and the run always continues to the end.
//! Temporary artifacts are removed on every exit path.

pub mod progress;
pub mod transform;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use poi_atlas_models::{Boundary, CountryConfig, PointRecord};
use poi_atlas_source::progress::ProgressCallback;
use poi_atlas_source::{boundaries, download};
use switchy_database::Database;

use crate::transform::transform;

/// Lifecycle states for one country's run.
///
/// `FailedSkip` is reachable only from `Extracting`: a country whose
/// extract cannot be fetched has nothing to partition or clean up
/// beyond the partial download itself. Every other failure keeps the
/// country on the normal path so its extract is still removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryState {
    /// Not yet started.
    Pending,
    /// Downloading the raw extract.
    Extracting,
    /// Processing the current partition.
    Partitioning,
    /// The current partition finished, loaded or abandoned.
    PartitionDone,
    /// Removing the country's extract file.
    CleaningUp,
    /// Finished; the orchestrator advances to the next country.
    Done,
    /// Extract acquisition failed; the country was skipped whole.
    FailedSkip,
}

impl CountryState {
    const fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Extracting => "EXTRACTING",
            Self::Partitioning => "PARTITIONING",
            Self::PartitionDone => "PARTITION_DONE",
            Self::CleaningUp => "CLEANING_UP",
            Self::Done => "DONE",
            Self::FailedSkip => "FAILED_SKIP",
        }
    }
}

/// Logs and applies a state transition for a country.
fn transition(country_id: &str, state: &mut CountryState, next: CountryState) {
    log::debug!("{country_id}: {} -> {}", state.label(), next.label());
    *state = next;
}

/// One unit of filter/clip/load work: a subdivision boundary, or the
/// whole extract when the country configures no boundary collection.
#[derive(Debug)]
pub struct Partition {
    /// Label used in logs and the run summary.
    pub label: String,
    /// Clip polygon, absent for the whole-extract partition.
    pub boundary: Option<Boundary>,
}

/// Expands a country's resolved boundary set into its partition list.
///
/// `None` means no collection is configured and yields the single
/// implicit whole-extract partition. `Some(vec![])` means a collection
/// was configured but produced no usable members (missing file or all
/// members skipped); such a country has zero partitions and only
/// performs extract cleanup.
#[must_use]
pub fn plan_partitions(
    country: &CountryConfig,
    boundary_set: Option<Vec<Boundary>>,
) -> Vec<Partition> {
    boundary_set.map_or_else(
        || {
            vec![Partition {
                label: format!("{} (whole extract)", country.id),
                boundary: None,
            }]
        },
        |set| {
            set.into_iter()
                .map(|boundary| Partition {
                    label: format!("{}/{}", country.id, boundary.name),
                    boundary: Some(boundary),
                })
                .collect()
        },
    )
}

/// Terminal status of one partition.
#[derive(Debug)]
pub enum PartitionStatus {
    /// The partition's records were committed.
    Loaded {
        /// Rows inserted.
        records: u64,
        /// Features skipped during transformation.
        skipped: u64,
    },
    /// The filter/clip tool failed; the partition was abandoned.
    ConversionFailed {
        /// Diagnostic text.
        message: String,
    },
    /// Reading, transforming, or committing the output failed; the
    /// partition was abandoned.
    LoadFailed {
        /// Diagnostic text.
        message: String,
    },
}

/// Result of one partition job, after its cleanup has run.
#[derive(Debug)]
pub struct PartitionOutcome {
    /// The partition's label.
    pub partition: String,
    /// How the partition ended.
    pub status: PartitionStatus,
}

/// Result of one country's run.
#[derive(Debug)]
pub enum CountryOutcome {
    /// The country went through partitioning and cleanup; individual
    /// partitions may still have been abandoned.
    Completed {
        /// Outcome per partition, in processing order.
        partitions: Vec<PartitionOutcome>,
    },
    /// Extract acquisition failed and the country was skipped.
    FetchFailed {
        /// Diagnostic text.
        message: String,
    },
}

/// Per-country entry in the run summary.
#[derive(Debug)]
pub struct CountryReport {
    /// Country ID from the registry.
    pub country: String,
    /// Final state (`Done` or `FailedSkip`).
    pub state: CountryState,
    /// What happened.
    pub outcome: CountryOutcome,
}

/// Aggregate result of a full run across all configured countries.
#[derive(Debug)]
pub struct RunSummary {
    /// One report per country, in configuration order.
    pub countries: Vec<CountryReport>,
}

impl RunSummary {
    /// Total rows committed across every partition.
    #[must_use]
    pub fn records_loaded(&self) -> u64 {
        self.partition_outcomes()
            .filter_map(|outcome| match outcome.status {
                PartitionStatus::Loaded { records, .. } => Some(records),
                _ => None,
            })
            .sum()
    }

    /// Partitions abandoned due to conversion or load failures.
    #[must_use]
    pub fn partitions_abandoned(&self) -> usize {
        self.partition_outcomes()
            .filter(|outcome| {
                !matches!(outcome.status, PartitionStatus::Loaded { .. })
            })
            .count()
    }

    /// Countries skipped because their extract could not be fetched.
    #[must_use]
    pub fn countries_skipped(&self) -> usize {
        self.countries
            .iter()
            .filter(|report| matches!(report.outcome, CountryOutcome::FetchFailed { .. }))
            .count()
    }

    fn partition_outcomes(&self) -> impl Iterator<Item = &PartitionOutcome> {
        self.countries.iter().flat_map(|report| match &report.outcome {
            CountryOutcome::Completed { partitions } => partitions.as_slice(),
            CountryOutcome::FetchFailed { .. } => &[],
        })
    }
}

/// Runs the full pipeline over `countries`, in order.
///
/// Provisions the `pois` table first; that failure is the only fatal
/// one — no country is attempted against an unverified store. After
/// that the run always reaches the last configured country, no matter
/// how many partitions or countries were abandoned along the way.
///
/// # Errors
///
/// Returns an error if schema provisioning fails, the work directory
/// cannot be created, or the HTTP client cannot be built.
pub async fn run(
    db: &dyn Database,
    countries: &[CountryConfig],
    work_dir: &Path,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let start = Instant::now();

    poi_atlas_database::schema::ensure_schema(db).await?;
    std::fs::create_dir_all(work_dir)?;

    let client = download::build_client()?;
    let progress = progress.unwrap_or_else(poi_atlas_source::progress::null_progress);

    let mut reports = Vec::with_capacity(countries.len());

    for country in countries {
        log::info!("================ Processing: {} ================", country.name);
        reports.push(process_country(db, &client, country, work_dir, &progress).await);
    }

    let summary = RunSummary { countries: reports };
    log::info!(
        "Run complete: {} records loaded, {} partition(s) abandoned, {} country(ies) skipped, took {:.1}s",
        summary.records_loaded(),
        summary.partitions_abandoned(),
        summary.countries_skipped(),
        start.elapsed().as_secs_f64()
    );

    Ok(summary)
}

/// Drives one country through the state machine.
async fn process_country(
    db: &dyn Database,
    client: &reqwest::Client,
    country: &CountryConfig,
    work_dir: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> CountryReport {
    let mut state = CountryState::Pending;
    let extract_path = work_dir.join(format!("{}-latest.osm.pbf", country.id));

    transition(&country.id, &mut state, CountryState::Extracting);
    progress.set_message(format!("Downloading {}", country.name));

    if let Err(e) = download::fetch_extract(client, &country.url, &extract_path, progress).await {
        log::error!("{}: extract download failed: {e}", country.id);
        // A partial file may be left behind by an interrupted transfer.
        remove_artifact(&extract_path);
        transition(&country.id, &mut state, CountryState::FailedSkip);
        return CountryReport {
            country: country.id.clone(),
            state,
            outcome: CountryOutcome::FetchFailed {
                message: e.to_string(),
            },
        };
    }

    transition(&country.id, &mut state, CountryState::Partitioning);

    let boundary_set = match &country.boundaries {
        None => None,
        Some(path) => match boundaries::load_collection(Path::new(path)) {
            Ok(set) => {
                log::info!("{}: {} subdivision(s) to process", country.id, set.len());
                Some(set)
            }
            Err(e) => {
                // Nothing can be partitioned, but the extract below
                // still has to be cleaned up.
                log::error!("{}: boundary collection unusable: {e}", country.id);
                Some(Vec::new())
            }
        },
    };

    let partitions = plan_partitions(country, boundary_set);
    let mut outcomes = Vec::with_capacity(partitions.len());

    for partition in &partitions {
        if state == CountryState::PartitionDone {
            transition(&country.id, &mut state, CountryState::Partitioning);
        }
        outcomes.push(process_partition(db, &extract_path, work_dir, partition).await);
        transition(&country.id, &mut state, CountryState::PartitionDone);
    }

    transition(&country.id, &mut state, CountryState::CleaningUp);
    remove_artifact(&extract_path);
    transition(&country.id, &mut state, CountryState::Done);

    CountryReport {
        country: country.id.clone(),
        state,
        outcome: CountryOutcome::Completed {
            partitions: outcomes,
        },
    }
}

/// Runs one partition job: filter/clip, transform, load, cleanup.
///
/// The job's temporary output file is named by a generated UUID — never
/// by boundary property text — and is removed whether or not any stage
/// succeeded.
async fn process_partition(
    db: &dyn Database,
    extract_path: &Path,
    work_dir: &Path,
    partition: &Partition,
) -> PartitionOutcome {
    let job_id = uuid::Uuid::new_v4();
    let output_path = work_dir.join(format!("{job_id}.geojson"));

    log::info!("{}: filtering extract (job {job_id})...", partition.label);

    let status = match poi_atlas_convert::filter_convert(
        extract_path,
        &output_path,
        partition.boundary.as_ref(),
    ) {
        Err(e) => {
            log::error!("{}: conversion failed: {e}", partition.label);
            PartitionStatus::ConversionFailed {
                message: e.to_string(),
            }
        }
        Ok(()) => match transform_and_load(db, &output_path).await {
            Ok((records, skipped)) => {
                log::info!(
                    "{}: loaded {records} record(s), skipped {skipped} feature(s)",
                    partition.label
                );
                PartitionStatus::Loaded { records, skipped }
            }
            Err(e) => {
                log::error!("{}: load failed: {e}", partition.label);
                PartitionStatus::LoadFailed {
                    message: e.to_string(),
                }
            }
        },
    };

    remove_artifact(&output_path);

    PartitionOutcome {
        partition: partition.label.clone(),
        status,
    }
}

/// Reads a partition's filtered output, transforms every feature, and
/// commits the resulting records in one transaction.
///
/// Returns `(records inserted, features skipped)`.
async fn transform_and_load(
    db: &dyn Database,
    output_path: &Path,
) -> Result<(u64, u64), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(output_path)?;
    let collection: serde_json::Value = serde_json::from_str(&text)?;

    let features = collection["features"].as_array().cloned().unwrap_or_default();
    let records: Vec<PointRecord> = features.iter().filter_map(transform).collect();
    let skipped = (features.len() - records.len()) as u64;

    if records.is_empty() {
        return Ok((0, skipped));
    }

    let inserted = poi_atlas_database::loader::load(db, &records).await?;
    Ok((inserted, skipped))
}

/// Removes a temporary artifact, logging (but not failing on) errors.
/// Missing files are fine: cleanup runs unconditionally and the
/// artifact may never have been created.
fn remove_artifact(path: &Path) {
    if !path.exists() {
        return;
    }
    if let Err(e) = std::fs::remove_file(path) {
        log::warn!("Failed to remove {}: {e}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn country(id: &str, boundaries: Option<&str>) -> CountryConfig {
        CountryConfig {
            id: id.to_string(),
            name: id.to_string(),
            url: format!("https://example.com/{id}.osm.pbf"),
            boundaries: boundaries.map(String::from),
        }
    }

    fn boundary(name: &str) -> Boundary {
        Boundary {
            name: name.to_string(),
            properties: serde_json::Map::new(),
            geometry: json!({ "type": "Polygon", "coordinates": [] }),
        }
    }

    #[test]
    fn no_boundary_collection_yields_single_whole_extract_partition() {
        let partitions = plan_partitions(&country("uruguay", None), None);

        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[0].label, "uruguay (whole extract)");
        assert!(partitions[0].boundary.is_none());
    }

    #[test]
    fn boundary_set_yields_one_partition_per_subdivision_in_order() {
        let set = vec![boundary("Maule"), boundary("Biobío")];
        let partitions = plan_partitions(&country("chile", Some("x.geojson")), Some(set));

        let labels: Vec<&str> = partitions.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["chile/Maule", "chile/Biobío"]);
        assert!(partitions.iter().all(|p| p.boundary.is_some()));
    }

    #[test]
    fn empty_boundary_set_yields_no_partitions() {
        let partitions =
            plan_partitions(&country("chile", Some("missing.geojson")), Some(Vec::new()));

        assert!(partitions.is_empty());
    }

    #[test]
    fn summary_counts_span_countries_and_outcomes() {
        let summary = RunSummary {
            countries: vec![
                CountryReport {
                    country: "chile".to_string(),
                    state: CountryState::Done,
                    outcome: CountryOutcome::Completed {
                        partitions: vec![
                            PartitionOutcome {
                                partition: "chile/Maule".to_string(),
                                status: PartitionStatus::Loaded {
                                    records: 120,
                                    skipped: 3,
                                },
                            },
                            PartitionOutcome {
                                partition: "chile/Biobío".to_string(),
                                status: PartitionStatus::ConversionFailed {
                                    message: "ogr2ogr failed".to_string(),
                                },
                            },
                        ],
                    },
                },
                CountryReport {
                    country: "peru".to_string(),
                    state: CountryState::FailedSkip,
                    outcome: CountryOutcome::FetchFailed {
                        message: "connection refused".to_string(),
                    },
                },
            ],
        };

        assert_eq!(summary.records_loaded(), 120);
        assert_eq!(summary.partitions_abandoned(), 1);
        assert_eq!(summary.countries_skipped(), 1);
    }

    #[test]
    fn remove_artifact_deletes_existing_file() {
        let path = std::env::temp_dir().join("poi_atlas_artifact_test.geojson");
        std::fs::write(&path, "{}").expect("temp file written");

        remove_artifact(&path);

        assert!(!path.exists());
    }

    #[test]
    fn remove_artifact_tolerates_missing_file() {
        remove_artifact(Path::new("/nonexistent/poi_atlas_never_created.geojson"));
    }

    #[test]
    fn state_labels_match_lifecycle_names() {
        assert_eq!(CountryState::Pending.label(), "PENDING");
        assert_eq!(CountryState::FailedSkip.label(), "FAILED_SKIP");
        assert_eq!(CountryState::PartitionDone.label(), "PARTITION_DONE");
        assert_eq!(CountryState::CleaningUp.label(), "CLEANING_UP");
    }
}
