// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::camera::GeoPoint;
use crate::{ExplorerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub population: u64,
    /// Wikipedia article for the city. May be empty in hand-edited datasets.
    #[serde(default)]
    pub wiki: String,
}

impl City {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryGroup {
    #[serde(rename = "country")]
    pub name: String,
    pub iso2: String,
    pub cities: Vec<City>,
}

impl CountryGroup {
    pub fn marker_id(&self, city: &City) -> MarkerId {
        MarkerId::new(&self.iso2, &city.name)
    }
}

/// Marker identity: the pair (country code, city name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId {
    pub iso2: String,
    pub name: String,
}

impl MarkerId {
    pub fn new(iso2: &str, name: &str) -> Self {
        Self {
            iso2: iso2.to_string(),
            name: name.to_string(),
        }
    }

    /// Parses the `ISO:Name` form. City names may themselves contain colons.
    pub fn parse(s: &str) -> Option<Self> {
        let (iso2, name) = s.split_once(':')?;
        if iso2.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(iso2, name))
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.iso2, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub groups: Vec<CountryGroup>,
}

impl Dataset {
    pub fn new(groups: Vec<CountryGroup>) -> Self {
        let dataset = Self { groups };
        dataset.report_duplicates();
        dataset
    }

    /// The dataset compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(include_str!("data/cities.json"))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let groups: Vec<CountryGroup> = serde_json::from_str(json)?;
        Ok(Self::new(groups))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let dataset = Self::from_json(&content)?;
        log::info!(
            "Loaded dataset — path={} countries={} cities={}",
            path.display(),
            dataset.groups.len(),
            dataset.city_count()
        );
        Ok(dataset)
    }

    /// Loads `path` when given, falling back to the embedded dataset on any error.
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            match Self::from_path(path) {
                Ok(dataset) => return Ok(dataset),
                Err(e) => log::warn!(
                    "Dataset override unreadable, using embedded dataset — path={} error={}",
                    path.display(),
                    e
                ),
            }
        }
        Self::embedded()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.groups)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn city_count(&self) -> usize {
        self.groups.iter().map(|g| g.cities.len()).sum()
    }

    pub fn group(&self, iso2: &str) -> Option<&CountryGroup> {
        self.groups.iter().find(|g| g.iso2.eq_ignore_ascii_case(iso2))
    }

    /// Resolves a marker identity. Duplicate identities resolve to the first occurrence.
    pub fn find(&self, id: &MarkerId) -> Option<(&CountryGroup, &City)> {
        let group = self.groups.iter().find(|g| g.iso2 == id.iso2)?;
        let city = group.cities.iter().find(|c| c.name == id.name)?;
        Some((group, city))
    }

    /// Like [`Dataset::find`], but an unknown identity is an error.
    pub fn city(&self, id: &MarkerId) -> Result<(&CountryGroup, &City)> {
        self.find(id).ok_or_else(|| ExplorerError::UnknownCity {
                iso2: id.iso2.clone(),
                name: id.name.clone(),
            })
    }

    pub fn iter_cities(&self) -> impl Iterator<Item = (&CountryGroup, &City)> {
        self.groups
            .iter()
            .flat_map(|g| g.cities.iter().map(move |c| (g, c)))
    }

    fn report_duplicates(&self) {
        let mut seen = HashSet::new();
        for (group, city) in self.iter_cities() {
            let id = group.marker_id(city);
            if !seen.insert(id.clone()) {
                log::warn!("Duplicate marker identity in dataset — id={}", id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_dataset_loads() {
        let dataset = Dataset::embedded().unwrap();
        assert!(!dataset.groups.is_empty());

        let fr = dataset.group("FR").expect("France missing");
        assert_eq!(fr.name, "France");
        assert!(fr.cities.iter().any(|c| c.name == "Paris"));

        // Groups are ordered by display name
        let names: Vec<_> = dataset.groups.iter().map(|g| g.name.clone()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_embedded_groups_keep_top_cities_only() {
        use crate::geonames::{LARGE_COUNTRY_CITIES, LARGE_COUNTRY_POPULATION, SMALL_COUNTRY_CITIES};

        let dataset = Dataset::embedded().unwrap();
        assert!(dataset.groups.len() > 200);

        for group in &dataset.groups {
            let count = group.cities.len();
            let total: u64 = group.cities.iter().map(|c| c.population).sum();
            assert!(count > 0, "{} is empty", group.iso2);
            if total >= LARGE_COUNTRY_POPULATION {
                assert_eq!(count, LARGE_COUNTRY_CITIES, "{} total={}", group.iso2, total);
            } else {
                assert!(
                    count <= SMALL_COUNTRY_CITIES || count == LARGE_COUNTRY_CITIES,
                    "{} has {} cities, total={}",
                    group.iso2,
                    count,
                    total
                );
            }

            assert!(
                group.cities.windows(2).all(|w| w[0].population >= w[1].population),
                "{} not ordered by population",
                group.iso2
            );
            let names: HashSet<&str> = group.cities.iter().map(|c| c.name.as_str()).collect();
            assert_eq!(names.len(), count, "{} repeats a city name", group.iso2);
        }

        let fr = dataset.group("FR").unwrap();
        assert_eq!(fr.cities.len(), LARGE_COUNTRY_CITIES);
        assert_eq!(fr.cities[0].name, "Paris");
    }

    #[test]
    fn test_marker_id_parse() {
        let id = MarkerId::parse("JP:Tokyo").unwrap();
        assert_eq!(id, MarkerId::new("JP", "Tokyo"));
        assert_eq!(id.to_string(), "JP:Tokyo");

        let odd = MarkerId::parse("US:Name: With Colon").unwrap();
        assert_eq!(odd.name, "Name: With Colon");

        assert!(MarkerId::parse("nocolon").is_none());
        assert!(MarkerId::parse(":Paris").is_none());
    }

    #[test]
    fn test_find_uses_country_and_name() {
        let json = r#"[
            {"country": "Spain", "iso2": "ES", "cities": [
                {"name": "Valencia", "lat": 39.47, "lon": -0.38, "population": 800000, "wiki": ""}
            ]},
            {"country": "Venezuela", "iso2": "VE", "cities": [
                {"name": "Valencia", "lat": 10.16, "lon": -68.0, "population": 1400000, "wiki": ""}
            ]}
        ]"#;
        let dataset = Dataset::from_json(json).unwrap();
        let (group, city) = dataset.find(&MarkerId::new("VE", "Valencia")).unwrap();
        assert_eq!(group.iso2, "VE");
        assert_eq!(city.population, 1_400_000);

        let err = dataset.city(&MarkerId::new("FR", "Valencia")).unwrap_err();
        assert!(matches!(err, ExplorerError::UnknownCity { .. }));
    }
}
