//! Country registry — loads all country configs from embedded TOML.
//!
//! Each `.toml` file in `packages/source/countries/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a country is as
//! simple as creating a new TOML file and adding it to the list below.
//! The parsed configs are plain values handed to the orchestrator at
//! construction time; nothing here is mutable process state.

use poi_atlas_models::CountryConfig;

/// TOML configs embedded at compile time, in processing order.
const COUNTRY_TOMLS: &[(&str, &str)] = &[
    ("chile", include_str!("../countries/chile.toml")),
    ("argentina", include_str!("../countries/argentina.toml")),
    ("uruguay", include_str!("../countries/uruguay.toml")),
    ("peru", include_str!("../countries/peru.toml")),
    ("colombia", include_str!("../countries/colombia.toml")),
    ("ecuador", include_str!("../countries/ecuador.toml")),
];

/// Total number of configured countries (used in tests).
#[cfg(test)]
const EXPECTED_COUNTRY_COUNT: usize = 6;

/// Returns all configured countries, parsed from embedded TOML, in the
/// order the pipeline processes them.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time
/// guarantee since the configs are embedded).
#[must_use]
pub fn all_countries() -> Vec<CountryConfig> {
    COUNTRY_TOMLS
        .iter()
        .map(|(name, text)| {
            toml::from_str(text).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Returns the countries to process, filtered by a comma-separated list
/// of IDs (e.g. from a `--countries` CLI flag). `None` selects every
/// configured country.
#[must_use]
pub fn enabled_countries(filter: Option<&str>) -> Vec<CountryConfig> {
    let all = all_countries();

    let Some(filter_str) = filter else {
        return all;
    };

    let ids: Vec<&str> = filter_str.split(',').map(str::trim).collect();

    let filtered: Vec<CountryConfig> = all
        .into_iter()
        .filter(|c| ids.contains(&c.id.as_str()))
        .collect();

    if filtered.is_empty() {
        log::warn!(
            "No matching countries found for filter {:?}. Available: {}",
            ids,
            all_countries()
                .iter()
                .map(|c| c.id.clone())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_countries() {
        let countries = all_countries();
        assert_eq!(countries.len(), EXPECTED_COUNTRY_COUNT);
    }

    #[test]
    fn country_ids_are_unique() {
        let countries = all_countries();
        let mut ids: Vec<&str> = countries.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), EXPECTED_COUNTRY_COUNT);
    }

    #[test]
    fn all_countries_have_required_fields() {
        for country in &all_countries() {
            assert!(!country.id.is_empty(), "country id is empty");
            assert!(!country.name.is_empty(), "country name is empty");
            assert!(
                country.url.starts_with("https://"),
                "{}: url is not https",
                country.id
            );
        }
    }

    #[test]
    fn filter_selects_configured_subset() {
        let countries = enabled_countries(Some("chile, uruguay"));
        let ids: Vec<&str> = countries.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["chile", "uruguay"]);
    }

    #[test]
    fn no_filter_selects_everything() {
        assert_eq!(enabled_countries(None).len(), EXPECTED_COUNTRY_COUNT);
    }

    #[test]
    fn only_chile_configures_boundaries() {
        for country in &all_countries() {
            if country.id == "chile" {
                assert!(country.boundaries.is_some());
            } else {
                assert!(country.boundaries.is_none(), "{}", country.id);
            }
        }
    }
}
