// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapStyle {
    #[default]
    Default,
    Satellite,
    Terrain,
}

impl MapStyle {
    pub const ALL: [MapStyle; 3] = [MapStyle::Default, MapStyle::Satellite, MapStyle::Terrain];
}

impl fmt::Display for MapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MapStyle::Default => "Default",
            MapStyle::Satellite => "Satellite",
            MapStyle::Terrain => "Terrain",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl MarkerSize {
    pub const ALL: [MarkerSize; 3] = [MarkerSize::Small, MarkerSize::Medium, MarkerSize::Large];

    /// Circle radius in logical pixels.
    pub fn radius(self) -> f32 {
        match self {
            MarkerSize::Small => 6.0,
            MarkerSize::Medium => 8.0,
            MarkerSize::Large => 10.0,
        }
    }
}

impl fmt::Display for MarkerSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MarkerSize::Small => "Small",
            MarkerSize::Medium => "Medium",
            MarkerSize::Large => "Large",
        })
    }
}

/// Display preferences. Lives for the session only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySettings {
    pub map_style: MapStyle,
    pub auto_zoom: bool,
    pub show_markers: bool,
    pub marker_size: MarkerSize,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            map_style: MapStyle::Default,
            auto_zoom: true,
            show_markers: true,
            marker_size: MarkerSize::Medium,
        }
    }
}

/// One edit made from the settings overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingChange {
    MapStyle(MapStyle),
    AutoZoom(bool),
    ShowMarkers(bool),
    MarkerSize(MarkerSize),
}

impl DisplaySettings {
    /// Commits a change and reports whether anything actually changed.
    pub fn apply(&mut self, change: SettingChange) -> bool {
        let before = *self;
        match change {
            SettingChange::MapStyle(style) => self.map_style = style,
            SettingChange::AutoZoom(on) => self.auto_zoom = on,
            SettingChange::ShowMarkers(on) => self.show_markers = on,
            SettingChange::MarkerSize(size) => self.marker_size = size,
        }
        before != *self
    }
}
