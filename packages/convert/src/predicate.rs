//! The category predicate selecting which features count as points of
//! interest.
//!
//! osmconf-style `.pbf` layers fold secondary tags into a single
//! `other_tags` hstore-text column, so tag presence is tested with
//! `LIKE` patterns against the serialized `"key"=>` form. The key set
//! is fixed; it is not configurable per run.

/// Tag keys whose presence qualifies a feature as a point of interest.
pub const POI_TAG_KEYS: &[&str] = &[
    "amenity",
    "shop",
    "tourism",
    "office",
    "leisure",
    "sport",
    "healthcare",
    "building",
    "railway",
];

/// Builds the ogr2ogr `-where` clause: a boolean OR over presence
/// checks for every key in [`POI_TAG_KEYS`].
#[must_use]
pub fn category_filter() -> String {
    POI_TAG_KEYS
        .iter()
        .map(|key| format!("other_tags LIKE '%\"{key}\"=>%'"))
        .collect::<Vec<_>>()
        .join(" OR ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_covers_every_category_key() {
        let filter = category_filter();
        for key in POI_TAG_KEYS {
            assert!(
                filter.contains(&format!("\"{key}\"=>")),
                "missing {key} in filter"
            );
        }
    }

    #[test]
    fn filter_is_a_disjunction_of_nine_checks() {
        let filter = category_filter();
        assert_eq!(filter.matches(" OR ").count(), POI_TAG_KEYS.len() - 1);
        assert!(filter.starts_with("other_tags LIKE '%\"amenity\"=>%'"));
        assert!(filter.ends_with("other_tags LIKE '%\"railway\"=>%'"));
    }
}
