// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use cityscope_core::camera::COMPACT_VIEWPORT_WIDTH;
use cityscope_core::config::ExplorerConfig;
use cityscope_core::details::RequestTicket;
use cityscope_core::settings::SettingChange;
use cityscope_core::tiles::{self, TileKey};
use cityscope_core::{wiki, Camera, Dataset, MapStyle, MarkerId, Session};
use iced::widget::{button, column, container, horizontal_space, image, opaque, row, text, Stack};
use iced::{window, Alignment, Element, Length, Size, Subscription, Task, Theme};
use log::{debug, info, warn};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod details;
mod map;
mod settings;
mod sidebar;
mod style;
use map::{MapView, TileManager, TileNotifier};

fn main() -> iced::Result {
    init_logging();
    iced::application(App::title, App::update, App::view)
        .subscription(App::subscription)
        .theme(|_| Theme::Dark)
        .window_size(Size::new(1280.0, 800.0))
        .run_with(App::new)
}

fn init_logging() {
    let config = ConfigBuilder::new()
        .add_filter_allow_str("cityscope")
        .build();
    let _ = TermLogger::init(
        LevelFilter::Info,
        config,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

#[derive(Debug, Clone)]
pub enum Message {
    // Map
    MapMoved(Camera),
    MarkerClicked(MarkerId),
    Frame(Instant),
    TileNotifierReady(TileNotifier),
    TileLoaded(TileKey),
    WindowResized(Size),

    // Sidebar
    ToggleSidebar,
    SearchChanged(String),
    ToggleGroup(String),
    CitySelected(MarkerId),

    // Details
    CloseDetails,
    ImageLoaded(RequestTicket, Option<image::Handle>),
    OpenLink(String),

    // Settings
    OpenSettings,
    CloseSettings,
    SettingChanged(SettingChange),
}

struct App {
    session: Session<image::Handle>,
    config: Arc<ExplorerConfig>,
    client: Option<reqwest::Client>,
    tile_manager: TileManager,
    sidebar_open: bool,
    settings_open: bool,
    window_size: Option<Size>,
    last_frame: Option<Instant>,
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let config = ExplorerConfig::load();

        let dataset = match Dataset::load_or_embedded(config.dataset_path.as_deref()) {
            Ok(dataset) => dataset,
            Err(e) => {
                log::error!("Dataset unavailable — error={}", e);
                Dataset::default()
            }
        };
        info!(
            "Cityscope started — countries={} cities={}",
            dataset.groups.len(),
            dataset.city_count()
        );

        let client = match wiki::build_client(&config) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("HTTP client unavailable, photos disabled — error={}", e);
                None
            }
        };

        let app = Self {
            session: Session::new(dataset, &config),
            config: Arc::new(config),
            client,
            tile_manager: TileManager::new(),
            sidebar_open: true,
            settings_open: false,
            window_size: None,
            last_frame: None,
        };

        let size = window::get_latest()
            .and_then(window::get_size)
            .map(Message::WindowResized);

        (app, size)
    }

    fn title(&self) -> String {
        match self.session.selected_city() {
            Some((group, city)) => format!("Cityscope — {}", details::title(group, city)),
            None => "Cityscope".to_string(),
        }
    }

    fn viewport(&self) -> Option<(f32, f32)> {
        self.window_size.map(|s| (s.width, s.height))
    }

    fn is_compact(&self) -> bool {
        self.window_size
            .is_some_and(|s| s.width <= COMPACT_VIEWPORT_WIDTH)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::MapMoved(camera) => {
                self.session.set_camera(camera);
                self.last_frame = None;
            }
            Message::MarkerClicked(id) => return self.select_city(id),
            Message::Frame(now) => {
                let dt = self
                    .last_frame
                    .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
                self.session.advance(dt);
                self.last_frame = self.session.is_animating().then_some(now);
            }
            Message::TileNotifierReady(notifier) => self.tile_manager.set_notifier(notifier),
            // The redraw that follows every update picks the tile up
            Message::TileLoaded(_) => {}
            Message::WindowResized(size) => {
                debug!("Window resized — width={} height={}", size.width, size.height);
                self.window_size = Some(size);
            }
            Message::ToggleSidebar => {
                self.sidebar_open = !self.sidebar_open;
                self.session.clear_selection();
            }
            Message::SearchChanged(query) => self.session.set_query(query),
            Message::ToggleGroup(iso2) => self.session.toggle_group(&iso2),
            Message::CitySelected(id) => {
                self.sidebar_open = false;
                return self.select_city(id);
            }
            Message::CloseDetails => self.session.clear_selection(),
            Message::ImageLoaded(ticket, handle) => {
                if self.session.resolve_image(&ticket, handle) {
                    debug!("City image applied — city={}", ticket.city);
                }
            }
            Message::OpenLink(url) => {
                if let Err(e) = open::that(&url) {
                    warn!("Could not open link — url={} error={}", url, e);
                }
            }
            Message::OpenSettings => self.settings_open = true,
            Message::CloseSettings => self.settings_open = false,
            Message::SettingChanged(change) => {
                let viewport = self.viewport();
                self.session.apply_setting(change, viewport);
            }
        }
        Task::none()
    }

    fn select_city(&mut self, id: MarkerId) -> Task<Message> {
        let label = id.to_string();
        self.last_frame = None;
        match self.session.select(id, self.viewport()) {
            Some(ticket) => self.fetch_image(ticket),
            None => {
                warn!("Ignoring selection of unknown city — id={}", label);
                Task::none()
            }
        }
    }

    fn fetch_image(&self, ticket: RequestTicket) -> Task<Message> {
        let city = self.session.dataset().find(&ticket.city).map(|(_, c)| c.clone());
        let (Some(client), Some(city)) = (self.client.clone(), city) else {
            return Task::done(Message::ImageLoaded(ticket, None));
        };
        let config = Arc::clone(&self.config);

        Task::perform(
            async move {
                match wiki::fetch_image_bytes(&client, &config, &city).await {
                    Ok(bytes) => bytes.map(image::Handle::from_bytes),
                    Err(e) => {
                        warn!("City image lookup failed — city={} error={}", city.name, e);
                        None
                    }
                }
            },
            move |handle| Message::ImageLoaded(ticket.clone(), handle),
        )
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            window::resize_events().map(|(_id, size)| Message::WindowResized(size)),
            map::tile_events(),
        ];
        if self.session.is_animating() {
            subscriptions.push(window::frames().map(Message::Frame));
        }
        Subscription::batch(subscriptions)
    }

    fn view(&self) -> Element<'_, Message> {
        let content = column![self.view_top_bar(), self.view_body()];

        if self.settings_open {
            settings::overlay(content.into(), self.session.settings())
        } else {
            content.into()
        }
    }

    fn view_top_bar(&self) -> Element<'_, Message> {
        let dataset = self.session.dataset();
        container(
            row![
                button(text("☰").size(18))
                    .on_press(Message::ToggleSidebar)
                    .style(style::button_ghost),
                text("Cityscope").size(18),
                horizontal_space(),
                text(format!(
                    "{} countries · {} cities",
                    dataset.groups.len(),
                    dataset.city_count()
                ))
                .size(13)
                .color(style::palette::TEXT_SECONDARY),
                button(text("Settings"))
                    .on_press(Message::OpenSettings)
                    .padding([6, 12])
                    .style(style::button_secondary),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
        )
        .padding([8, 12])
        .width(Length::Fill)
        .style(style::container_sidebar)
        .into()
    }

    fn view_body(&self) -> Element<'_, Message> {
        let map = self.view_map();
        if self.sidebar_open {
            row![sidebar::view(&self.session), map].into()
        } else {
            map
        }
    }

    fn view_map(&self) -> Element<'_, Message> {
        let display = self.session.settings();
        let map_view = MapView {
            markers: self.session.visible_markers(),
            selected: self.session.selected(),
            tile_manager: &self.tile_manager,
            camera: self.session.camera(),
            style: display.map_style,
            marker_radius: display.marker_size.radius(),
        };

        let attribution = container(
            container(text(attribution(display.map_style)).size(11))
                .padding([2, 6])
                .style(style::container_attribution),
        )
        .align_right(Length::Fill)
        .align_bottom(Length::Fill)
        .padding(4);

        let mut layers = Stack::new().push(map_view).push(attribution);

        if let Some(panel) = details::view(&self.session, self.is_compact()) {
            // Presses on the card must not reach the map below
            let panel = opaque(panel);
            let placed = if self.is_compact() {
                container(panel).align_bottom(Length::Fill).width(Length::Fill)
            } else {
                container(panel).align_right(Length::Fill).height(Length::Fill)
            };
            layers = layers.push(placed.padding(12));
        }

        layers.width(Length::Fill).height(Length::Fill).into()
    }
}

/// Attribution line for every layer of the style.
fn attribution(style: MapStyle) -> String {
    tiles::layers_for(style)
        .iter()
        .map(|layer| layer.attribution)
        .collect::<Vec<_>>()
        .join(" | ")
}
