//! Idempotent provisioning of the `pois` table and its spatial index.
//!
//! Runs once before any country is processed. A failure here is fatal
//! for the whole run: no country is attempted against a store whose
//! schema could not be verified.

use switchy_database::Database;

use crate::StoreError;

/// Creates the `pois` table and its GIST index if they do not exist.
///
/// Also ensures the `hstore` and `postgis` extensions are installed,
/// since the tag column and geometry column depend on them.
///
/// # Errors
///
/// Returns [`StoreError`] if any provisioning statement fails.
pub async fn ensure_schema(db: &dyn Database) -> Result<(), StoreError> {
    db.exec_raw("CREATE EXTENSION IF NOT EXISTS hstore").await?;
    db.exec_raw("CREATE EXTENSION IF NOT EXISTS postgis").await?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS pois (
            id SERIAL PRIMARY KEY,
            name TEXT,
            tags HSTORE,
            geom GEOMETRY(Point, 4326)
        )",
    )
    .await?;

    db.exec_raw("CREATE INDEX IF NOT EXISTS pois_geom_idx ON pois USING GIST (geom)")
        .await?;

    log::info!("pois table and spatial index verified");
    Ok(())
}
