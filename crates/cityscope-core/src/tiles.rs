// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::settings::MapStyle;

/// A raster tile provider described by a URL template with `{s}`, `{z}`, `{x}`
/// and `{y}` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileSource {
    pub id: &'static str,
    pub url_template: &'static str,
    pub subdomains: &'static str,
    pub max_zoom: u32,
    pub attribution: &'static str,
}

pub const OPENSTREETMAP: TileSource = TileSource {
    id: "osm",
    url_template: "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
    subdomains: "",
    max_zoom: 19,
    attribution: "© OpenStreetMap contributors",
};

pub const ESRI_WORLD_IMAGERY: TileSource = TileSource {
    id: "esri-imagery",
    url_template:
        "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
    subdomains: "",
    max_zoom: 18,
    attribution: "Tiles © Esri, i-cubed, USDA, USGS, AEX, GeoEye, Getmapping, Aerogrid, IGN, IGP, UPR-EGP, and the GIS User Community",
};

pub const CARTO_LABELS: TileSource = TileSource {
    id: "carto-labels",
    url_template: "https://{s}.basemaps.cartocdn.com/light_only_labels/{z}/{x}/{y}.png",
    subdomains: "abcd",
    max_zoom: 20,
    attribution: "© OpenStreetMap contributors © CARTO",
};

pub const OPENTOPOMAP: TileSource = TileSource {
    id: "opentopomap",
    url_template: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
    subdomains: "abc",
    max_zoom: 17,
    attribution: "Map data © OpenStreetMap contributors, SRTM | Map style © OpenTopoMap (CC-BY-SA)",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoords {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

/// Cache key: the same coordinates from different providers are different images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub source: &'static str,
    pub coords: TileCoords,
}

impl TileSource {
    pub fn url(&self, coords: TileCoords) -> String {
        let mut url = self
            .url_template
            .replace("{z}", &coords.z.to_string())
            .replace("{x}", &coords.x.to_string())
            .replace("{y}", &coords.y.to_string());
        if let Some(sub) = self.subdomain(coords) {
            url = url.replace("{s}", &sub.to_string());
        }
        url
    }

    /// Rotates through subdomains as `(x + y) mod n`.
    fn subdomain(&self, coords: TileCoords) -> Option<char> {
        let count = self.subdomains.chars().count();
        if count == 0 {
            return None;
        }
        let idx = ((coords.x as u64 + coords.y as u64) % count as u64) as usize;
        self.subdomains.chars().nth(idx)
    }

    pub fn key(&self, coords: TileCoords) -> TileKey {
        TileKey {
            source: self.id,
            coords,
        }
    }
}

/// Tile layers for a style, bottom first.
pub fn layers_for(style: MapStyle) -> &'static [TileSource] {
    match style {
        MapStyle::Default => &[OPENSTREETMAP],
        MapStyle::Satellite => &[ESRI_WORLD_IMAGERY, CARTO_LABELS],
        MapStyle::Terrain => &[OPENTOPOMAP],
    }
}

/// Highest zoom at which every layer of the style has tiles.
pub fn max_zoom_for(style: MapStyle) -> u32 {
    layers_for(style)
        .iter()
        .map(|l| l.max_zoom)
        .min()
        .unwrap_or(OPENSTREETMAP.max_zoom)
}
