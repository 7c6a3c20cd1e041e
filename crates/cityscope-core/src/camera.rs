// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};
use std::time::Duration;

// --- Slippy Map / Mercator Math ---
pub const TILE_SIZE: f64 = 256.0;
pub const MAX_LATITUDE: f64 = 85.0511;
pub const MAX_ZOOM: f64 = 19.0;

/// Widths at or below this are treated as a phone-sized viewport where the
/// details panel becomes a bottom sheet.
pub const COMPACT_VIEWPORT_WIDTH: f32 = 768.0;
/// Fraction of the viewport height the focused marker is lifted by in compact mode.
pub const SHEET_OFFSET_RATIO: f64 = 0.2;

pub fn lon_to_x(lon: f64, zoom: f64) -> f64 {
    ((lon + 180.0) / 360.0) * 2.0f64.powf(zoom) * TILE_SIZE
}

pub fn lat_to_y(lat: f64, zoom: f64) -> f64 {
    let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0
        * 2.0f64.powf(zoom)
        * TILE_SIZE
}

pub fn x_to_lon(x: f64, zoom: f64) -> f64 {
    (x / (TILE_SIZE * 2.0f64.powf(zoom))) * 360.0 - 180.0
}

pub fn y_to_lat(y: f64, zoom: f64) -> f64 {
    let n = std::f64::consts::PI - 2.0 * std::f64::consts::PI * y / (TILE_SIZE * 2.0f64.powf(zoom));
    n.sinh().atan().to_degrees()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// World pixel coordinates at `zoom`.
    pub fn project(&self, zoom: f64) -> (f64, f64) {
        (lon_to_x(self.lon, zoom), lat_to_y(self.lat, zoom))
    }

    pub fn unproject(x: f64, y: f64, zoom: f64) -> Self {
        Self::new(y_to_lat(y, zoom), x_to_lon(x, zoom))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub center: GeoPoint,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(20.0, 0.0),
            zoom: 3.0,
        }
    }
}

impl Camera {
    pub fn new(center: GeoPoint, zoom: f64) -> Self {
        Self { center, zoom }
    }

    /// Camera that frames `target` at `zoom`, shifted so the target sits above the
    /// bottom sheet on compact viewports. `viewport` is (width, height) in logical pixels.
    pub fn focus(target: GeoPoint, zoom: f64, viewport: Option<(f32, f32)>) -> Self {
        match viewport {
            Some((width, height)) if width <= COMPACT_VIEWPORT_WIDTH => {
                let (x, y) = target.project(zoom);
                let offset = height as f64 * SHEET_OFFSET_RATIO;
                Self::new(GeoPoint::unproject(x, y + offset, zoom), zoom)
            }
            _ => Self::new(target, zoom),
        }
    }
}

/// Eased flight between two cameras. Sampled once per frame by the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransition {
    pub from: Camera,
    pub to: Camera,
    pub duration: Duration,
}

impl CameraTransition {
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(1);

    pub fn new(from: Camera, to: Camera) -> Self {
        Self {
            from,
            to,
            duration: Self::DEFAULT_DURATION,
        }
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }

    /// Interpolates in projected space so the path is a straight line on screen.
    pub fn sample(&self, elapsed: Duration) -> Camera {
        if self.duration.is_zero() || self.is_finished(elapsed) {
            return self.to;
        }
        let t = ease_out_cubic(elapsed.as_secs_f64() / self.duration.as_secs_f64());

        let (x0, y0) = self.from.center.project(0.0);
        let (x1, y1) = self.to.center.project(0.0);
        let center = GeoPoint::unproject(x0 + (x1 - x0) * t, y0 + (y1 - y0) * t, 0.0);
        let zoom = self.from.zoom + (self.to.zoom - self.from.zoom) * t;

        Camera::new(center, zoom)
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}
