// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod camera;
pub mod config;
pub mod dataset;
pub mod details;
pub mod display;
pub mod filter;
pub mod geonames;
pub mod links;
pub mod markers;
pub mod session;
pub mod settings;
pub mod tiles;
pub mod wiki;

use std::path::PathBuf;
use thiserror::Error;

pub use camera::{Camera, GeoPoint};
pub use dataset::{City, CountryGroup, Dataset, MarkerId};
pub use session::Session;
pub use settings::{DisplaySettings, MapStyle, MarkerSize};

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unknown city '{name}' in country '{iso2}'")]
    UnknownCity { iso2: String, name: String },
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

/// Platform configuration directory, e.g. `~/.config/cityscope` on Linux.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "cityscope", "Cityscope")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".cityscope"))
}

/// Identifies this application to tile servers and the Wikipedia API.
pub const USER_AGENT: &str = concat!(
    "Cityscope/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/StarTuz/Cityscope)"
);
