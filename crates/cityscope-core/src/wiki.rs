// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Lookup of a representative photo for a city via the Wikipedia REST
//! `page/summary` endpoint.

use crate::config::ExplorerConfig;
use crate::dataset::City;
use crate::Result;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static THUMB_WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d+px-").expect("valid thumbnail width pattern"));

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageSource {
    pub source: String,
}

/// The subset of the summary response we care about.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageSummary {
    #[serde(default)]
    pub thumbnail: Option<ImageSource>,
    #[serde(default)]
    pub originalimage: Option<ImageSource>,
}

/// Page title taken from the city's Wikipedia link, or the city name when the
/// link has no `/wiki/` segment.
pub fn page_title(city: &City) -> String {
    match city.wiki.split_once("/wiki/") {
        Some((_, title)) if !title.is_empty() => title.to_string(),
        _ => city.name.clone(),
    }
}

pub fn summary_url(config: &ExplorerConfig, city: &City) -> String {
    format!(
        "{}{}",
        config.summary_endpoint,
        urlencoding::encode(&page_title(city))
    )
}

/// Prefers the thumbnail resized to `width`, then the original image.
pub fn choose_image_url(summary: &PageSummary, width: u32) -> Option<String> {
    if let Some(thumb) = summary.thumbnail.as_ref().filter(|t| !t.source.is_empty()) {
        let resized = THUMB_WIDTH.replace(&thumb.source, format!("/{}px-", width).as_str());
        return Some(resized.into_owned());
    }
    summary
        .originalimage
        .as_ref()
        .filter(|o| !o.source.is_empty())
        .map(|o| o.source.clone())
}

pub fn build_client(config: &ExplorerConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(crate::USER_AGENT)
        .timeout(config.request_timeout());
    if !config.use_system_proxy {
        builder = builder.no_proxy();
    }
    Ok(builder.build()?)
}

pub fn build_blocking_client(config: &ExplorerConfig) -> Result<reqwest::blocking::Client> {
    let mut builder = reqwest::blocking::Client::builder()
        .user_agent(crate::USER_AGENT)
        .timeout(config.request_timeout());
    if !config.use_system_proxy {
        builder = builder.no_proxy();
    }
    Ok(builder.build()?)
}

/// Resolves the image URL for `city`. `Ok(None)` when the page has no image.
pub async fn fetch_image_url(
    client: &reqwest::Client,
    config: &ExplorerConfig,
    city: &City,
) -> Result<Option<String>> {
    let url = summary_url(config, city);
    log::debug!("Fetching page summary — city={} url={}", city.name, url);

    let summary: PageSummary = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(choose_image_url(&summary, config.thumbnail_width))
}

/// Summary lookup followed by the image download.
pub async fn fetch_image_bytes(
    client: &reqwest::Client,
    config: &ExplorerConfig,
    city: &City,
) -> Result<Option<Vec<u8>>> {
    let Some(image_url) = fetch_image_url(client, config, city).await? else {
        log::debug!("No image on summary page — city={}", city.name);
        return Ok(None);
    };

    let bytes = client
        .get(&image_url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    log::debug!(
        "Downloaded city image — city={} url={} bytes={}",
        city.name,
        image_url,
        bytes.len()
    );
    Ok(Some(bytes.to_vec()))
}

pub fn fetch_image_url_blocking(
    client: &reqwest::blocking::Client,
    config: &ExplorerConfig,
    city: &City,
) -> Result<Option<String>> {
    let url = summary_url(config, city);
    let summary: PageSummary = client.get(&url).send()?.error_for_status()?.json()?;
    Ok(choose_image_url(&summary, config.thumbnail_width))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str, wiki: &str) -> City {
        City {
            name: name.to_string(),
            lat: 0.0,
            lon: 0.0,
            population: 0,
            wiki: wiki.to_string(),
        }
    }

    #[test]
    fn test_page_title_from_link() {
        let c = city("New York City", "https://en.wikipedia.org/wiki/New_York_City");
        assert_eq!(page_title(&c), "New_York_City");
    }

    #[test]
    fn test_page_title_falls_back_to_name() {
        assert_eq!(page_title(&city("Lyon", "")), "Lyon");
        assert_eq!(page_title(&city("Lyon", "https://example.org/Lyon")), "Lyon");
        assert_eq!(page_title(&city("Lyon", "https://en.wikipedia.org/wiki/")), "Lyon");
    }

    #[test]
    fn test_summary_url_encodes_title() {
        let config = ExplorerConfig::default();
        let c = city("São Paulo", "https://en.wikipedia.org/wiki/São_Paulo");
        assert_eq!(
            summary_url(&config, &c),
            "https://en.wikipedia.org/api/rest_v1/page/summary/S%C3%A3o_Paulo"
        );

        let slash = city("AC/DC Town", "");
        assert!(summary_url(&config, &slash).ends_with("AC%2FDC%20Town"));
    }

    #[test]
    fn test_thumbnail_is_resized() {
        let summary: PageSummary = serde_json::from_str(
            r#"{
                "title": "Paris",
                "thumbnail": {"source": "https://upload.wikimedia.org/a/b/320px-Paris.jpg/320px-Paris.jpg", "width": 320},
                "originalimage": {"source": "https://upload.wikimedia.org/a/b/Paris.jpg"}
            }"#,
        )
        .unwrap();
        assert_eq!(
            choose_image_url(&summary, 400).as_deref(),
            Some("https://upload.wikimedia.org/a/b/400px-Paris.jpg/320px-Paris.jpg")
        );
    }

    #[test]
    fn test_original_image_fallback_and_absence() {
        let original: PageSummary = serde_json::from_str(
            r#"{"originalimage": {"source": "https://upload.wikimedia.org/x.png"}}"#,
        )
        .unwrap();
        assert_eq!(
            choose_image_url(&original, 400).as_deref(),
            Some("https://upload.wikimedia.org/x.png")
        );

        let empty: PageSummary = serde_json::from_str(r#"{"type": "standard"}"#).unwrap();
        assert_eq!(choose_image_url(&empty, 400), None);
    }
}
