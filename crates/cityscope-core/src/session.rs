// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! UI-independent state of one explorer session: selection, camera, display
//! settings, sidebar expansion and the details-panel image lookup.

use crate::camera::{Camera, CameraTransition};
use crate::config::ExplorerConfig;
use crate::dataset::{City, CountryGroup, Dataset, MarkerId};
use crate::details::{ImageLookup, ImageStatus, RequestTicket};
use crate::filter::{self, ExpansionState, FilteredGroup};
use crate::markers::{self, Marker};
use crate::settings::{DisplaySettings, SettingChange};
use std::time::Duration;

#[derive(Debug, Clone)]
struct ActiveTransition {
    transition: CameraTransition,
    elapsed: Duration,
}

pub struct Session<T> {
    dataset: Dataset,
    markers: Vec<Marker>,
    settings: DisplaySettings,
    query: String,
    expansion: ExpansionState,
    selected: Option<MarkerId>,
    camera: Camera,
    transition: Option<ActiveTransition>,
    auto_zoom_level: f64,
    image: ImageLookup<T>,
}

impl<T> Session<T> {
    pub fn new(dataset: Dataset, config: &ExplorerConfig) -> Self {
        let markers = markers::all_markers(&dataset);
        Self {
            dataset,
            markers,
            settings: DisplaySettings::default(),
            query: String::new(),
            expansion: ExpansionState::new(),
            selected: None,
            camera: config.initial_camera,
            transition: None,
            auto_zoom_level: config.auto_zoom_level,
            image: ImageLookup::new(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    // --- Sidebar ---

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: String) {
        self.expansion.set_query(&query);
        self.query = query;
    }

    pub fn filtered_groups(&self) -> Vec<FilteredGroup<'_>> {
        filter::filter_groups(&self.dataset, &self.query)
    }

    pub fn is_expanded(&self, group: &CountryGroup) -> bool {
        self.expansion.is_expanded(group)
    }

    pub fn toggle_group(&mut self, iso2: &str) {
        if let Some(group) = self.dataset.group(iso2) {
            self.expansion.toggle(group);
        }
    }

    // --- Selection ---

    pub fn selected(&self) -> Option<&MarkerId> {
        self.selected.as_ref()
    }

    pub fn selected_city(&self) -> Option<(&CountryGroup, &City)> {
        self.selected.as_ref().and_then(|id| self.dataset.find(id))
    }

    /// Selects a city and starts its image lookup. Unknown identities leave the
    /// current selection untouched and return `None`.
    pub fn select(&mut self, id: MarkerId, viewport: Option<(f32, f32)>) -> Option<RequestTicket> {
        let target = self.dataset.find(&id)?.1.position();
        log::debug!("Selected city — id={}", id);
        self.selected = Some(id.clone());
        if self.settings.auto_zoom {
            self.fly_to(Camera::focus(target, self.auto_zoom_level, viewport));
        }
        Some(self.image.begin(id))
    }

    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            log::debug!("Selection cleared");
        }
        self.image.clear();
    }

    // --- Details panel image ---

    pub fn image_status(&self) -> &ImageStatus<T> {
        self.image.status()
    }

    pub fn resolve_image(&mut self, ticket: &RequestTicket, image: Option<T>) -> bool {
        self.image.resolve(ticket, image)
    }

    // --- Settings ---

    /// Commits a settings change. Turning auto-zoom on while a city is selected
    /// flies to that city.
    pub fn apply_setting(&mut self, change: SettingChange, viewport: Option<(f32, f32)>) {
        if !self.settings.apply(change) {
            return;
        }
        log::debug!("Setting changed — change={:?}", change);
        if let SettingChange::AutoZoom(true) = change {
            if let Some((_, city)) = self.selected_city() {
                let target = Camera::focus(city.position(), self.auto_zoom_level, viewport);
                self.fly_to(target);
            }
        }
    }

    /// The list handed to the map surface; empty when markers are hidden.
    pub fn visible_markers(&self) -> &[Marker] {
        markers::visible_markers(&self.markers, &self.settings)
    }

    // --- Camera ---

    pub fn fly_to(&mut self, target: Camera) {
        self.transition = Some(ActiveTransition {
            transition: CameraTransition::new(self.camera, target),
            elapsed: Duration::ZERO,
        });
    }

    /// Manual map interaction: jumps immediately and cancels any flight.
    pub fn set_camera(&mut self, camera: Camera) {
        self.transition = None;
        self.camera = camera;
    }

    /// Advances a running flight by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        let Some(active) = self.transition.as_mut() else {
            return;
        };
        active.elapsed += dt;
        self.camera = active.transition.sample(active.elapsed);
        if active.transition.is_finished(active.elapsed) {
            self.transition = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::GeoPoint;

    fn session() -> Session<&'static str> {
        let dataset = Dataset::from_json(
            r#"[
            {"country": "France", "iso2": "FR", "cities": [
                {"name": "Paris", "lat": 48.85341, "lon": 2.3488, "population": 2100000, "wiki": ""}
            ]},
            {"country": "Japan", "iso2": "JP", "cities": [
                {"name": "Tokyo", "lat": 35.6895, "lon": 139.69171, "population": 8336599, "wiki": ""}
            ]}
        ]"#,
        )
        .unwrap();
        Session::new(dataset, &ExplorerConfig::default())
    }

    #[test]
    fn test_select_flies_and_starts_lookup() {
        let mut s = session();
        let ticket = s.select(MarkerId::new("JP", "Tokyo"), None).unwrap();
        assert_eq!(s.selected().unwrap().name, "Tokyo");
        assert!(s.is_animating());
        assert_eq!(s.image_status(), &ImageStatus::Loading);

        s.advance(Duration::from_millis(400));
        assert!(s.is_animating());
        s.advance(Duration::from_millis(700));
        assert!(!s.is_animating());
        assert_eq!(s.camera().center, GeoPoint::new(35.6895, 139.69171));
        assert_eq!(s.camera().zoom, 6.0);

        assert!(s.resolve_image(&ticket, Some("tokyo.jpg")));
    }

    #[test]
    fn test_unknown_city_keeps_selection() {
        let mut s = session();
        s.select(MarkerId::new("FR", "Paris"), None);
        assert!(s.select(MarkerId::new("FR", "Tokyo"), None).is_none());
        assert_eq!(s.selected(), Some(&MarkerId::new("FR", "Paris")));
    }

    #[test]
    fn test_auto_zoom_off_keeps_camera() {
        let mut s = session();
        s.apply_setting(SettingChange::AutoZoom(false), None);
        let before = s.camera();
        s.select(MarkerId::new("FR", "Paris"), None);
        assert!(!s.is_animating());
        assert_eq!(s.camera(), before);

        // Re-enabling flies to the current selection
        s.apply_setting(SettingChange::AutoZoom(true), None);
        assert!(s.is_animating());
    }

    #[test]
    fn test_manual_pan_cancels_flight() {
        let mut s = session();
        s.select(MarkerId::new("FR", "Paris"), None);
        let manual = Camera::new(GeoPoint::new(0.0, 0.0), 4.0);
        s.set_camera(manual);
        assert!(!s.is_animating());
        s.advance(Duration::from_secs(1));
        assert_eq!(s.camera(), manual);
    }

    #[test]
    fn test_style_change_keeps_camera() {
        let mut s = session();
        s.set_camera(Camera::new(GeoPoint::new(10.0, 10.0), 5.0));
        s.apply_setting(
            SettingChange::MapStyle(crate::settings::MapStyle::Terrain),
            None,
        );
        assert_eq!(s.camera(), Camera::new(GeoPoint::new(10.0, 10.0), 5.0));
        assert!(!s.is_animating());
    }
}
