// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::dataset::{City, CountryGroup, Dataset};
use std::collections::BTreeSet;

/// A country group as shown in the sidebar after filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredGroup<'a> {
    pub group: &'a CountryGroup,
    pub cities: Vec<&'a City>,
    /// True when the query matched the country itself (all cities kept).
    pub country_matched: bool,
}

/// Normalises raw search input. `None` means no active filter.
pub fn normalize_query(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Whether `group` matches the normalised query by country or by any city.
pub fn group_matches(group: &CountryGroup, query: &str) -> bool {
    contains_ci(&group.name, query) || group.cities.iter().any(|c| contains_ci(&c.name, query))
}

/// Groups whose name contains the query keep every city; groups with at least one
/// matching city keep only those cities; everything else is dropped.
/// The query is a literal substring, compared case-insensitively.
pub fn filter_groups<'a>(dataset: &'a Dataset, raw_query: &str) -> Vec<FilteredGroup<'a>> {
    let Some(query) = normalize_query(raw_query) else {
        return dataset
            .groups
            .iter()
            .map(|group| FilteredGroup {
                group,
                cities: group.cities.iter().collect(),
                country_matched: false,
            })
            .collect();
    };

    dataset
        .groups
        .iter()
        .filter_map(|group| {
            if contains_ci(&group.name, &query) {
                return Some(FilteredGroup {
                    group,
                    cities: group.cities.iter().collect(),
                    country_matched: true,
                });
            }
            let cities: Vec<&City> = group
                .cities
                .iter()
                .filter(|c| contains_ci(&c.name, &query))
                .collect();
            if cities.is_empty() {
                None
            } else {
                Some(FilteredGroup {
                    group,
                    cities,
                    country_matched: false,
                })
            }
        })
        .collect()
}

/// Which country groups are open in the sidebar.
///
/// Without a search at most one group is open at a time. While searching every
/// matching group is forced open and toggles flip a group's own flag without
/// closing the others.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    open: BTreeSet<String>,
    query: Option<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_query(&mut self, raw: &str) {
        self.query = normalize_query(raw);
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn is_expanded(&self, group: &CountryGroup) -> bool {
        self.open.contains(&group.iso2)
            || self
                .query
                .as_deref()
                .is_some_and(|q| group_matches(group, q))
    }

    pub fn toggle(&mut self, group: &CountryGroup) {
        let was_open = self.open.contains(&group.iso2);
        if self.query.is_none() {
            self.open.clear();
        }
        if was_open {
            self.open.remove(&group.iso2);
        } else {
            self.open.insert(group.iso2.clone());
        }
    }
}
