// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::style::palette;
use crate::Message;
use cityscope_core::camera::{lat_to_y, lon_to_x, x_to_lon, y_to_lat, TILE_SIZE};
use cityscope_core::markers::{draw_order, Marker};
use cityscope_core::tiles::{self, TileCoords, TileKey, TileSource};
use cityscope_core::{Camera, GeoPoint, MapStyle, MarkerId};
use iced::advanced::{self, layout, renderer, widget, Layout, Widget};
use iced::widget::image;
use iced::futures::channel::mpsc;
use iced::futures::{SinkExt, StreamExt};
use iced::{mouse, stream, Border, Element, Event, Length, Point, Radians, Rectangle, Subscription};
use lru::LruCache;
use std::collections::HashSet;
use std::io::Read;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const TILE_CACHE_SIZE: usize = 300;
const TILE_TIMEOUT: Duration = Duration::from_secs(10);
/// Presses that move less than this are clicks, not drags.
const CLICK_TOLERANCE: f32 = 5.0;
const MARKER_BORDER_WIDTH: f32 = 2.0;
const WHEEL_ZOOM_STEP: f64 = 0.2;

type Status = advanced::graphics::core::event::Status;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// --- Tile Management ---
/// Sender registered by the tile subscription; each finished fetch sends its key.
pub type TileNotifier = mpsc::UnboundedSender<TileKey>;

struct TileStore {
    tiles: Mutex<LruCache<TileKey, image::Handle>>,
    pending: Mutex<HashSet<TileKey>>,
    failed: Mutex<HashSet<TileKey>>,
    notifier: Mutex<Option<TileNotifier>>,
}

impl TileStore {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            tiles: Mutex::new(LruCache::new(capacity)),
            pending: Mutex::new(HashSet::new()),
            failed: Mutex::new(HashSet::new()),
            notifier: Mutex::new(None),
        }
    }

    /// Records the outcome of a fetch and wakes the UI so the tile is drawn.
    fn complete(&self, key: TileKey, handle: Option<image::Handle>) {
        match handle {
            Some(handle) => {
                lock(&self.tiles).put(key, handle);
            }
            None => {
                lock(&self.failed).insert(key);
            }
        }
        lock(&self.pending).remove(&key);

        if let Some(notifier) = lock(&self.notifier).as_ref() {
            // Receiver gone: the window is closing
            let _ = notifier.unbounded_send(key);
        }
    }
}

pub struct TileManager {
    store: Arc<TileStore>,
}

impl Default for TileManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TileManager {
    pub fn new() -> Self {
        let capacity = NonZeroUsize::new(TILE_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(TileStore::new(capacity)),
        }
    }

    /// Routes completion events to `notifier`. Fetches already in flight use it too.
    pub fn set_notifier(&self, notifier: TileNotifier) {
        *lock(&self.store.notifier) = Some(notifier);
    }

    pub fn get_tile(&self, key: TileKey) -> Option<image::Handle> {
        lock(&self.store.tiles).get(&key).cloned()
    }

    /// Marks `key` as in flight. `false` when it is cached, failed or already pending.
    fn begin(&self, key: TileKey) -> bool {
        let mut pending = lock(&self.store.pending);
        if pending.contains(&key) || lock(&self.store.failed).contains(&key) {
            return false;
        }
        if lock(&self.store.tiles).contains(&key) {
            return false;
        }
        pending.insert(key)
    }

    pub fn request_tile(&self, source: TileSource, coords: TileCoords) {
        let key = source.key(coords);
        if !self.begin(key) {
            return;
        }

        let store = Arc::clone(&self.store);
        let url = source.url(coords);

        std::thread::spawn(move || {
            let result = ureq::get(&url)
                .set("User-Agent", cityscope_core::USER_AGENT)
                .timeout(TILE_TIMEOUT)
                .call();

            let handle = match result {
                Ok(response) => {
                    let mut bytes = Vec::new();
                    match response.into_reader().read_to_end(&mut bytes) {
                        Ok(_) => Some(image::Handle::from_bytes(bytes)),
                        Err(e) => {
                            log::warn!("Tile body unreadable — url={} error={}", url, e);
                            None
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Tile fetch failed — url={} error={}", url, e);
                    None
                }
            };
            store.complete(key, handle);
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TileEventsId;

/// Long-lived subscription that hands a [`TileNotifier`] to the app, then turns
/// every finished tile fetch into [`Message::TileLoaded`].
pub fn tile_events() -> Subscription<Message> {
    Subscription::run_with_id(
        TileEventsId,
        stream::channel(100, |mut output: mpsc::Sender<Message>| async move {
            let (sender, mut receiver) = mpsc::unbounded();
            if output.send(Message::TileNotifierReady(sender)).await.is_err() {
                return;
            }
            while let Some(key) = receiver.next().await {
                if output.send(Message::TileLoaded(key)).await.is_err() {
                    break;
                }
            }
        }),
    )
}

/// Screen transform for one frame: world pixels at zoom 0 around the camera.
#[derive(Debug, Clone, Copy)]
struct Projection {
    bounds: Rectangle,
    camera_x: f64,
    camera_y: f64,
    scale: f64,
}

impl Projection {
    fn new(bounds: Rectangle, camera: Camera) -> Self {
        Self {
            bounds,
            camera_x: lon_to_x(camera.center.lon, 0.0),
            camera_y: lat_to_y(camera.center.lat, 0.0),
            scale: 2.0f64.powf(camera.zoom),
        }
    }

    fn world_to_screen(&self, wx: f64, wy: f64) -> Point {
        Point::new(
            self.bounds.x + self.bounds.width / 2.0 + ((wx - self.camera_x) * self.scale) as f32,
            self.bounds.y + self.bounds.height / 2.0 + ((wy - self.camera_y) * self.scale) as f32,
        )
    }

    fn to_screen(&self, point: GeoPoint) -> Point {
        self.world_to_screen(lon_to_x(point.lon, 0.0), lat_to_y(point.lat, 0.0))
    }

    /// Camera at `zoom` whose center is `(wx, wy)`, kept inside the world.
    fn clamped_camera(&self, wx: f64, wy: f64, zoom: f64) -> Camera {
        let scale = 2.0f64.powf(zoom);
        let half_vw = (self.bounds.width as f64 / 2.0) / scale;
        let half_vh = (self.bounds.height as f64 / 2.0) / scale;

        let x = if half_vw * 2.0 >= TILE_SIZE {
            TILE_SIZE / 2.0
        } else {
            wx.clamp(half_vw, TILE_SIZE - half_vw)
        };
        let y = if half_vh * 2.0 >= TILE_SIZE {
            TILE_SIZE / 2.0
        } else {
            wy.clamp(half_vh, TILE_SIZE - half_vh)
        };

        Camera::new(GeoPoint::new(y_to_lat(y, 0.0), x_to_lon(x, 0.0)), zoom)
    }
}

pub struct MapView<'a> {
    pub markers: &'a [Marker],
    pub selected: Option<&'a MarkerId>,
    pub tile_manager: &'a TileManager,
    pub camera: Camera,
    pub style: MapStyle,
    pub marker_radius: f32,
}

impl<'a> MapView<'a> {
    /// Topmost marker under `point`, within radius plus border.
    fn marker_at(&self, projection: &Projection, point: Point) -> Option<&'a Marker> {
        let reach = self.marker_radius + MARKER_BORDER_WIDTH;
        draw_order(self.markers, self.selected)
            .into_iter()
            .rev()
            .find(|m| projection.to_screen(m.position).distance(point) <= reach)
    }

    fn max_zoom(&self) -> f64 {
        tiles::max_zoom_for(self.style) as f64
    }

    /// Pointer handling shared by `on_event`. An unavailable cursor (e.g. one
    /// held by an overlay stacked above the map) never pans, zooms or clicks.
    fn handle_event(
        &self,
        state: &mut MapState,
        event: Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (Status, Option<Message>) {
        // Sync internal state when the camera was changed from outside (e.g. a flight)
        if state.last_prop != Some(self.camera) {
            state.current = self.camera;
            state.last_prop = Some(self.camera);
        }

        let camera = state.current;
        let projection = Projection::new(bounds, camera);
        let cursor_point = cursor.position_in(bounds);

        match event {
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if let Some(p) = cursor_point {
                    let d = match delta {
                        mouse::ScrollDelta::Lines { y, .. } => y as f64,
                        mouse::ScrollDelta::Pixels { y, .. } => (y as f64) / 100.0,
                    };
                    let min_zoom = (bounds.width as f64 / TILE_SIZE).log2().max(0.0);
                    let new_zoom =
                        (camera.zoom + d * WHEEL_ZOOM_STEP).clamp(min_zoom, self.max_zoom());

                    if (new_zoom - camera.zoom).abs() > 0.001 {
                        let new_scale = 2.0f64.powf(new_zoom);
                        let mx = (p.x as f64) - (bounds.width as f64 / 2.0);
                        let my = (p.y as f64) - (bounds.height as f64 / 2.0);

                        // Keep the world point under the cursor fixed
                        let new_wx = projection.camera_x + mx / projection.scale - mx / new_scale;
                        let new_wy = projection.camera_y + my / projection.scale - my / new_scale;
                        let new_camera = projection.clamped_camera(new_wx, new_wy, new_zoom);

                        state.current = new_camera;
                        return (Status::Captured, Some(Message::MapMoved(new_camera)));
                    }
                }
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if cursor.is_over(bounds) {
                    if let Some(position) = cursor.position() {
                        state.is_dragging = true;
                        state.press_position = Some(position);
                        state.last_cursor = Some(position);
                        return (Status::Captured, None);
                    }
                }
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                let was_dragging = state.is_dragging;
                let press_pos = state.press_position;
                let release_pos = cursor.position();

                state.is_dragging = false;
                state.press_position = None;
                state.last_cursor = None;

                if was_dragging {
                    let clicked = match (press_pos, release_pos) {
                        (Some(p1), Some(p2)) if p1.distance(p2) < CLICK_TOLERANCE => self
                            .marker_at(&projection, p2)
                            .map(|marker| Message::MarkerClicked(marker.id.clone())),
                        _ => None,
                    };
                    return (Status::Captured, clicked);
                }
            }
            Event::Mouse(mouse::Event::CursorMoved { position }) => {
                if state.is_dragging {
                    if let Some(last_pos) = state.last_cursor {
                        let delta = position - last_pos;
                        state.last_cursor = Some(position);

                        let new_wx = projection.camera_x - delta.x as f64 / projection.scale;
                        let new_wy = projection.camera_y - delta.y as f64 / projection.scale;
                        let new_camera = projection.clamped_camera(new_wx, new_wy, camera.zoom);

                        state.current = new_camera;
                        return (Status::Captured, Some(Message::MapMoved(new_camera)));
                    }
                }
            }
            _ => {}
        }

        (Status::Ignored, None)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MapState {
    is_dragging: bool,
    press_position: Option<Point>,
    last_cursor: Option<Point>,
    // Camera as modified by events not yet reflected in props
    current: Camera,
    last_prop: Option<Camera>,
}

impl MapState {
    fn camera(&self, prop: Camera) -> Camera {
        if self.last_prop == Some(prop) {
            self.current
        } else {
            prop
        }
    }
}

impl<'a, Theme, Renderer> Widget<Message, Theme, Renderer> for MapView<'a>
where
    Renderer: renderer::Renderer + advanced::image::Renderer<Handle = image::Handle>,
{
    fn size(&self) -> iced::Size<Length> {
        iced::Size {
            width: Length::Fill,
            height: Length::Fill,
        }
    }

    fn tag(&self) -> widget::tree::Tag {
        widget::tree::Tag::of::<MapState>()
    }

    fn state(&self) -> widget::tree::State {
        widget::tree::State::new(MapState::default())
    }

    fn layout(
        &self,
        _tree: &mut widget::Tree,
        _renderer: &Renderer,
        limits: &layout::Limits,
    ) -> layout::Node {
        layout::Node::new(limits.max())
    }

    fn draw(
        &self,
        tree: &widget::Tree,
        renderer: &mut Renderer,
        _theme: &Theme,
        _style: &renderer::Style,
        layout: Layout<'_>,
        _cursor: mouse::Cursor,
        _viewport: &Rectangle,
    ) {
        let state = tree.state.downcast_ref::<MapState>();
        let bounds = layout.bounds();
        let camera = state.camera(self.camera);
        let projection = Projection::new(bounds, camera);

        renderer.with_layer(bounds, |renderer| {
            renderer.fill_quad(
                renderer::Quad {
                    bounds,
                    border: Border::default(),
                    ..Default::default()
                },
                palette::MAP_BACKGROUND,
            );

            // --- Tile Layers ---
            let z = camera.zoom.floor().clamp(0.0, self.max_zoom()) as u32;
            let num_tiles = 2i64.pow(z);
            let tile_size_z0 = TILE_SIZE / 2.0f64.powf(z as f64);

            let half_w = (bounds.width as f64 / 2.0) / projection.scale;
            let half_h = (bounds.height as f64 / 2.0) / projection.scale;
            let min_tx = ((projection.camera_x - half_w) / tile_size_z0).floor() as i64;
            let max_tx = ((projection.camera_x + half_w) / tile_size_z0).ceil() as i64;
            let min_ty = ((projection.camera_y - half_h) / tile_size_z0).floor() as i64;
            let max_ty = ((projection.camera_y + half_h) / tile_size_z0).ceil() as i64;
            let tile_px = (tile_size_z0 * projection.scale) as f32;

            for (layer_index, source) in tiles::layers_for(self.style).iter().enumerate() {
                for tx in min_tx.max(0)..=max_tx.min(num_tiles - 1) {
                    for ty in min_ty.max(0)..=max_ty.min(num_tiles - 1) {
                        let coords = TileCoords {
                            x: tx as u32,
                            y: ty as u32,
                            z,
                        };
                        let origin = projection
                            .world_to_screen(tx as f64 * tile_size_z0, ty as f64 * tile_size_z0);
                        let tile_rect = Rectangle {
                            x: origin.x,
                            y: origin.y,
                            width: tile_px,
                            height: tile_px,
                        };

                        if let Some(handle) = self.tile_manager.get_tile(source.key(coords)) {
                            renderer.draw_image(
                                advanced::image::Image {
                                    handle,
                                    filter_method: image::FilterMethod::Linear,
                                    rotation: Radians(0.0),
                                    opacity: 1.0,
                                    snap: false,
                                },
                                tile_rect,
                            );
                        } else {
                            // Overlays stay transparent until loaded
                            if layer_index == 0 {
                                renderer.fill_quad(
                                    renderer::Quad {
                                        bounds: tile_rect,
                                        ..Default::default()
                                    },
                                    palette::TILE_PLACEHOLDER,
                                );
                            }
                            self.tile_manager.request_tile(*source, coords);
                        }
                    }
                }
            }
        });

        // --- Marker Layer ---
        renderer.with_layer(bounds, |renderer| {
            let radius = self.marker_radius;
            for marker in draw_order(self.markers, self.selected) {
                let center = projection.to_screen(marker.position);
                if !bounds.expand(radius + MARKER_BORDER_WIDTH).contains(center) {
                    continue;
                }
                let fill = if Some(&marker.id) == self.selected {
                    palette::MARKER_SELECTED
                } else {
                    palette::MARKER
                };
                renderer.fill_quad(
                    renderer::Quad {
                        bounds: Rectangle {
                            x: center.x - radius,
                            y: center.y - radius,
                            width: radius * 2.0,
                            height: radius * 2.0,
                        },
                        border: Border {
                            color: palette::MARKER_BORDER,
                            width: MARKER_BORDER_WIDTH,
                            radius: radius.into(),
                        },
                        ..Default::default()
                    },
                    fill,
                );
            }
        });
    }

    fn on_event(
        &mut self,
        tree: &mut widget::Tree,
        event: Event,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        _renderer: &Renderer,
        _clipboard: &mut dyn advanced::Clipboard,
        shell: &mut advanced::Shell<'_, Message>,
        _viewport: &Rectangle,
    ) -> Status {
        let state = tree.state.downcast_mut::<MapState>();
        let (status, message) = self.handle_event(state, event, layout.bounds(), cursor);
        if let Some(message) = message {
            shell.publish(message);
        }
        status
    }

    fn mouse_interaction(
        &self,
        tree: &widget::Tree,
        layout: Layout<'_>,
        cursor: mouse::Cursor,
        _viewport: &Rectangle,
        _renderer: &Renderer,
    ) -> mouse::Interaction {
        let state = tree.state.downcast_ref::<MapState>();
        let bounds = layout.bounds();

        if state.is_dragging {
            return mouse::Interaction::Grabbing;
        }
        match cursor.position_over(bounds) {
            Some(point) => {
                let projection = Projection::new(bounds, state.camera(self.camera));
                if self.marker_at(&projection, point).is_some() {
                    mouse::Interaction::Pointer
                } else {
                    mouse::Interaction::Grab
                }
            }
            None => mouse::Interaction::default(),
        }
    }
}

impl<'a, Theme, Renderer> From<MapView<'a>> for Element<'a, Message, Theme, Renderer>
where
    Theme: 'a,
    Renderer: 'a + renderer::Renderer + advanced::image::Renderer<Handle = image::Handle>,
{
    fn from(map_view: MapView<'a>) -> Self {
        Self::new(map_view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rectangle {
        Rectangle {
            x: 0.0,
            y: 0.0,
            width: 800.0,
            height: 600.0,
        }
    }

    #[test]
    fn test_camera_center_maps_to_viewport_center() {
        let camera = Camera::new(GeoPoint::new(48.85, 2.35), 6.0);
        let projection = Projection::new(bounds(), camera);
        let p = projection.to_screen(camera.center);
        assert!((p.x - 400.0).abs() < 1e-3);
        assert!((p.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_clamp_centers_small_world() {
        let projection = Projection::new(bounds(), Camera::new(GeoPoint::new(0.0, 0.0), 1.0));
        // At zoom 1 the world is 512px wide: narrower than the viewport
        let cam = projection.clamped_camera(10.0, 10.0, 1.0);
        assert!(cam.center.lon.abs() < 1e-9);
        assert!(cam.center.lat.abs() < 1e-9);
    }

    #[test]
    fn test_clamp_keeps_view_inside_world() {
        let projection = Projection::new(bounds(), Camera::new(GeoPoint::new(0.0, 0.0), 5.0));
        let cam = projection.clamped_camera(-50.0, 300.0, 5.0);
        let scale = 2.0f64.powf(5.0);
        let wx = lon_to_x(cam.center.lon, 0.0);
        let wy = lat_to_y(cam.center.lat, 0.0);
        assert!((wx - 400.0 / scale).abs() < 1e-6);
        assert!((wy - (TILE_SIZE - 300.0 / scale)).abs() < 1e-6);
    }

    #[test]
    fn test_hit_test_prefers_selected_marker() {
        let paris = Marker {
            id: MarkerId::new("FR", "Paris"),
            position: GeoPoint::new(48.85, 2.35),
        };
        let neighbour = Marker {
            id: MarkerId::new("FR", "Paris-Nord"),
            position: GeoPoint::new(48.8501, 2.3501),
        };
        let markers = vec![paris.clone(), neighbour.clone()];
        let tiles = TileManager::new();
        let camera = Camera::new(paris.position, 6.0);
        let projection = Projection::new(bounds(), camera);

        let view = MapView {
            markers: &markers,
            selected: None,
            tile_manager: &tiles,
            camera,
            style: MapStyle::Default,
            marker_radius: 8.0,
        };
        let center = Point::new(400.0, 300.0);
        assert_eq!(view.marker_at(&projection, center).unwrap().id, neighbour.id);

        let view = MapView {
            selected: Some(&paris.id),
            ..view
        };
        assert_eq!(view.marker_at(&projection, center).unwrap().id, paris.id);

        assert!(view.marker_at(&projection, Point::new(0.0, 0.0)).is_none());
    }

    fn key(x: u32) -> TileKey {
        tiles::layers_for(MapStyle::Default)[0].key(TileCoords { x, y: 0, z: 1 })
    }

    fn pixel() -> image::Handle {
        image::Handle::from_rgba(1, 1, vec![0u8; 4])
    }

    #[test]
    fn test_finished_fetch_notifies_and_caches() {
        let manager = TileManager::new();
        let (sender, mut receiver) = mpsc::unbounded();
        manager.set_notifier(sender);

        assert!(manager.begin(key(0)));
        assert!(!manager.begin(key(0)));
        manager.store.complete(key(0), Some(pixel()));

        assert_eq!(receiver.try_next().unwrap(), Some(key(0)));
        assert!(manager.get_tile(key(0)).is_some());
        assert!(!manager.begin(key(0)));
    }

    #[test]
    fn test_failed_fetch_notifies_and_is_not_retried() {
        let manager = TileManager::new();
        let (sender, mut receiver) = mpsc::unbounded();
        manager.set_notifier(sender);

        assert!(manager.begin(key(1)));
        manager.store.complete(key(1), None);

        assert_eq!(receiver.try_next().unwrap(), Some(key(1)));
        assert!(manager.get_tile(key(1)).is_none());
        assert!(!manager.begin(key(1)));
    }

    #[test]
    fn test_notifier_registered_mid_fetch_still_hears_completion() {
        let manager = TileManager::new();
        assert!(manager.begin(key(2)));

        let (sender, mut receiver) = mpsc::unbounded();
        manager.set_notifier(sender);
        manager.store.complete(key(2), Some(pixel()));

        assert_eq!(receiver.try_next().unwrap(), Some(key(2)));
    }

    fn press_and_release(
        view: &MapView<'_>,
        state: &mut MapState,
        cursor: mouse::Cursor,
    ) -> Vec<Message> {
        let mut messages = Vec::new();
        for event in [
            mouse::Event::ButtonPressed(mouse::Button::Left),
            mouse::Event::ButtonReleased(mouse::Button::Left),
        ] {
            let (_, message) = view.handle_event(state, Event::Mouse(event), bounds(), cursor);
            messages.extend(message);
        }
        messages
    }

    #[test]
    fn test_click_reaches_marker_only_with_cursor_available() {
        let paris = Marker {
            id: MarkerId::new("FR", "Paris"),
            position: GeoPoint::new(48.85, 2.35),
        };
        let markers = vec![paris.clone()];
        let tiles = TileManager::new();
        let view = MapView {
            markers: &markers,
            selected: None,
            tile_manager: &tiles,
            camera: Camera::new(paris.position, 6.0),
            style: MapStyle::Default,
            marker_radius: 8.0,
        };
        let center = Point::new(400.0, 300.0);

        let mut state = MapState::default();
        let messages = press_and_release(&view, &mut state, mouse::Cursor::Available(center));
        assert!(matches!(
            messages.as_slice(),
            [Message::MarkerClicked(id)] if *id == paris.id
        ));

        // An overlay above the map (the details card) holds the cursor
        let mut state = MapState::default();
        assert!(press_and_release(&view, &mut state, mouse::Cursor::Unavailable).is_empty());
        assert!(!state.is_dragging);

        let (status, message) = view.handle_event(
            &mut state,
            Event::Mouse(mouse::Event::WheelScrolled {
                delta: mouse::ScrollDelta::Lines { x: 0.0, y: 1.0 },
            }),
            bounds(),
            mouse::Cursor::Unavailable,
        );
        assert_eq!(status, Status::Ignored);
        assert!(message.is_none());
    }
}
