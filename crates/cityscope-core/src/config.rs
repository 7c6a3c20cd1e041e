// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::camera::Camera;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_SUMMARY_ENDPOINT: &str = "https://en.wikipedia.org/api/rest_v1/page/summary/";

/// Read-only runtime configuration. Every key is optional in `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Base URL the URI-encoded page title is appended to.
    pub summary_endpoint: String,
    /// Width requested when rewriting Wikipedia thumbnail URLs.
    pub thumbnail_width: u32,
    pub request_timeout_secs: u64,
    /// When false, HTTP clients ignore `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
    /// Replaces the embedded dataset, e.g. the output of `cityscope generate`.
    pub dataset_path: Option<PathBuf>,
    pub auto_zoom_level: f64,
    pub initial_camera: Camera,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            summary_endpoint: DEFAULT_SUMMARY_ENDPOINT.to_string(),
            thumbnail_width: 400,
            request_timeout_secs: 10,
            use_system_proxy: true,
            dataset_path: None,
            auto_zoom_level: 6.0,
            initial_camera: Camera::default(),
        }
    }
}

impl ExplorerConfig {
    pub fn default_path() -> PathBuf {
        crate::get_config_root().join(CONFIG_FILE_NAME)
    }

    /// Loads the config from the platform config directory. Never fails: a missing
    /// file yields defaults, an unreadable one is logged and replaced by defaults.
    pub fn load() -> Self {
        let path = Self::default_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Config unreadable, using defaults — path={} error={}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file found, using defaults — path={}", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        log::debug!("Loaded config — path={}", path.display());
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
