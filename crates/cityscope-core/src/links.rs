// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::dataset::City;
use urlencoding::encode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Wikipedia,
    ImageSearch,
    WikimediaCommons,
    StreetView,
    View3d,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLink {
    pub kind: LinkKind,
    pub label: &'static str,
    pub url: String,
}

pub fn wikipedia(city: &City) -> Option<String> {
    if city.wiki.is_empty() {
        None
    } else {
        Some(city.wiki.clone())
    }
}

pub fn image_search(city: &City) -> String {
    format!("https://www.google.com/search?tbm=isch&q={}", encode(&city.name))
}

pub fn wikimedia_commons(city: &City) -> String {
    format!(
        "https://commons.wikimedia.org/wiki/Special:Search?search={}",
        encode(&city.name)
    )
}

pub fn street_view(city: &City) -> String {
    format!(
        "https://www.google.com/maps/@?api=1&map_action=pano&viewpoint={},{}",
        city.lat, city.lon
    )
}

pub fn view_3d(city: &City) -> String {
    format!(
        "https://www.google.com/maps/place/{}/@{},{},15z",
        encode(&city.name),
        city.lat,
        city.lon
    )
}

/// All outbound links for the details panel, in display order.
pub fn all(city: &City) -> Vec<ExternalLink> {
    let mut links = Vec::with_capacity(5);
    if let Some(url) = wikipedia(city) {
        links.push(ExternalLink {
            kind: LinkKind::Wikipedia,
            label: "Wikipedia",
            url,
        });
    }
    links.push(ExternalLink {
        kind: LinkKind::ImageSearch,
        label: "Search images",
        url: image_search(city),
    });
    links.push(ExternalLink {
        kind: LinkKind::WikimediaCommons,
        label: "Wikimedia",
        url: wikimedia_commons(city),
    });
    links.push(ExternalLink {
        kind: LinkKind::StreetView,
        label: "Street View",
        url: street_view(city),
    });
    links.push(ExternalLink {
        kind: LinkKind::View3d,
        label: "3D View",
        url: view_3d(city),
    });
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rio() -> City {
        City {
            name: "Rio de Janeiro".to_string(),
            lat: -22.90642,
            lon: -43.18223,
            population: 6_023_699,
            wiki: "https://en.wikipedia.org/wiki/Rio_de_Janeiro".to_string(),
        }
    }

    #[test]
    fn test_link_urls() {
        let city = rio();
        assert_eq!(
            image_search(&city),
            "https://www.google.com/search?tbm=isch&q=Rio%20de%20Janeiro"
        );
        assert_eq!(
            street_view(&city),
            "https://www.google.com/maps/@?api=1&map_action=pano&viewpoint=-22.90642,-43.18223"
        );
        assert_eq!(
            view_3d(&city),
            "https://www.google.com/maps/place/Rio%20de%20Janeiro/@-22.90642,-43.18223,15z"
        );
    }

    #[test]
    fn test_wikipedia_link_is_optional() {
        let mut city = rio();
        assert_eq!(all(&city).len(), 5);
        assert_eq!(all(&city)[0].kind, LinkKind::Wikipedia);

        city.wiki.clear();
        let links = all(&city);
        assert_eq!(links.len(), 4);
        assert!(links.iter().all(|l| l.kind != LinkKind::Wikipedia));
    }
}
