//! Transactional batch loader for normalized point records.
//!
//! A [`load`] call is one transaction: every record commits or none
//! does. Within the transaction, rows are sent in fixed-size multi-row
//! INSERT statements purely to bound round trips; the chunking has no
//! transactional meaning. Inserts are plain appends with no dedup key,
//! so re-loading the same records produces duplicate rows.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use poi_atlas_models::PointRecord;
use switchy_database::{Database, DatabaseValue};

use crate::StoreError;

/// Records per INSERT round trip.
pub const LOAD_BATCH_SIZE: usize = 500;

/// Appends `records` to the `pois` table inside a single transaction.
///
/// Returns the number of rows inserted. An empty input is a no-op
/// success returning 0.
///
/// # Errors
///
/// Returns [`StoreError`] if the transaction cannot be opened or any
/// statement fails; the transaction is rolled back and no rows are
/// persisted.
pub async fn load(db: &dyn Database, records: &[PointRecord]) -> Result<u64, StoreError> {
    if records.is_empty() {
        return Ok(0);
    }

    let txn = db.begin_transaction().await?;
    let mut inserted = 0u64;

    for chunk in records.chunks(LOAD_BATCH_SIZE) {
        let (sql, params) = build_insert(chunk);
        inserted += txn.exec_raw_params(&sql, &params).await?;
    }

    txn.commit().await?;

    Ok(inserted)
}

/// Builds one multi-row INSERT statement and its parameter list.
///
/// Each row uses 3 parameters: name, hstore-encoded tags, and the EWKT
/// point literal.
fn build_insert(records: &[PointRecord]) -> (String, Vec<DatabaseValue>) {
    let mut sql = String::from("INSERT INTO pois (name, tags, geom) VALUES ");
    let mut params: Vec<DatabaseValue> = Vec::with_capacity(records.len() * 3);
    let mut idx = 1u32;

    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        write!(
            sql,
            "(${idx}, ${t}::hstore, ${g}::geometry)",
            t = idx + 1,
            g = idx + 2,
        )
        .unwrap();

        params.push(
            record
                .name
                .as_ref()
                .map_or(DatabaseValue::Null, |n| DatabaseValue::String(n.clone())),
        );
        params.push(DatabaseValue::String(encode_hstore(&record.tags)));
        params.push(DatabaseValue::String(record.ewkt()));
        idx += 3;
    }

    (sql, params)
}

/// Encodes a tag mapping as an hstore input literal, e.g.
/// `"amenity"=>"cafe", "phone"=>NULL`.
///
/// Absent values become hstore `NULL`, never the string `"None"`.
#[must_use]
pub fn encode_hstore(tags: &BTreeMap<String, Option<String>>) -> String {
    tags.iter()
        .map(|(key, value)| match value {
            Some(v) => format!("\"{}\"=>\"{}\"", escape_hstore(key), escape_hstore(v)),
            None => format!("\"{}\"=>NULL", escape_hstore(key)),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escapes backslashes and double quotes for a double-quoted hstore
/// token.
fn escape_hstore(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
