// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use iced::widget::{button, container, text_input};
use iced::{Background, Border, Color, Shadow, Theme};

pub mod palette {
    use iced::Color;

    pub const BACKGROUND: Color = Color::from_rgb(0.12, 0.12, 0.12); // #1e1e1e
    pub const SURFACE: Color = Color::from_rgb(0.18, 0.18, 0.18); // #2d2d2d
    pub const ACCENT_BLUE: Color = Color::from_rgb(0.23, 0.51, 0.96); // #3b82f6
    pub const TEXT_PRIMARY: Color = Color::from_rgb(0.9, 0.9, 0.9);
    pub const TEXT_SECONDARY: Color = Color::from_rgb(0.6, 0.6, 0.6);
    pub const BORDER: Color = Color::from_rgb(0.25, 0.25, 0.25);

    pub const MAP_BACKGROUND: Color = Color::from_rgb(0.05, 0.05, 0.05);
    pub const TILE_PLACEHOLDER: Color = Color::from_rgb(0.1, 0.1, 0.1);
    pub const MARKER: Color = Color::from_rgb(1.0, 160.0 / 255.0, 60.0 / 255.0); // #ffa03c
    pub const MARKER_SELECTED: Color = Color::from_rgb(1.0, 0.0, 0.0); // #ff0000
    pub const MARKER_BORDER: Color = Color::WHITE;
}

// Container Styles
pub fn container_sidebar(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(palette::BACKGROUND)),
        border: Border {
            color: palette::BORDER,
            width: 1.0,
            radius: 0.0.into(),
        },
        ..Default::default()
    }
}

pub fn container_card(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(palette::SURFACE)),
        border: Border {
            color: palette::BORDER,
            width: 1.0,
            radius: 8.0.into(),
        },
        shadow: Shadow {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.5),
            offset: iced::Vector::new(0.0, 4.0),
            blur_radius: 12.0,
        },
        text_color: Some(palette::TEXT_PRIMARY),
    }
}

/// Dimmed layer behind the settings dialog.
pub fn container_backdrop(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.6))),
        ..Default::default()
    }
}

pub fn container_attribution(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color::from_rgba(1.0, 1.0, 1.0, 0.7))),
        text_color: Some(Color::from_rgb(0.2, 0.2, 0.2)),
        border: Border {
            radius: 4.0.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn container_image_placeholder(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(palette::BACKGROUND)),
        text_color: Some(palette::TEXT_SECONDARY),
        border: Border {
            radius: 6.0.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

// Button Styles
pub fn button_primary(_theme: &Theme, status: button::Status) -> button::Style {
    let base = button::Style {
        background: None,
        text_color: palette::TEXT_PRIMARY,
        border: Border::default(),
        shadow: Shadow::default(),
    };

    match status {
        button::Status::Active => button::Style {
            background: Some(Background::Color(palette::ACCENT_BLUE)),
            border: Border {
                radius: 6.0.into(),
                ..Default::default()
            },
            text_color: Color::WHITE,
            shadow: Shadow {
                color: Color::from_rgba(0.23, 0.51, 0.96, 0.4),
                offset: iced::Vector::new(0.0, 2.0),
                blur_radius: 8.0,
            },
        },
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(Color::from_rgb(0.3, 0.6, 1.0))),
            border: Border {
                radius: 6.0.into(),
                ..Default::default()
            },
            text_color: Color::WHITE,
            shadow: Shadow {
                color: Color::from_rgba(0.23, 0.51, 0.96, 0.6),
                offset: iced::Vector::new(0.0, 4.0),
                blur_radius: 12.0,
            },
        },
        _ => base,
    }
}

pub fn button_secondary(_theme: &Theme, status: button::Status) -> button::Style {
    let background = match status {
        button::Status::Hovered => Color::from_rgb(0.25, 0.25, 0.25),
        _ => palette::SURFACE,
    };
    button::Style {
        background: Some(Background::Color(background)),
        text_color: palette::TEXT_PRIMARY,
        border: Border {
            color: palette::BORDER,
            width: 1.0,
            radius: 6.0.into(),
        },
        shadow: Shadow::default(),
    }
}

pub fn button_ghost(_theme: &Theme, status: button::Status) -> button::Style {
    let base = button::Style {
        background: None,
        text_color: palette::TEXT_PRIMARY,
        border: Border::default(),
        shadow: Shadow::default(),
    };

    match status {
        button::Status::Hovered | button::Status::Pressed => button::Style {
            background: Some(Background::Color(Color::from_rgba(1.0, 1.0, 1.0, 0.1))),
            text_color: Color::WHITE,
            border: Border {
                radius: 6.0.into(),
                ..Default::default()
            },
            ..base
        },
        _ => base,
    }
}

/// City row in the sidebar; the selected city is highlighted.
pub fn button_city_row(selected: bool) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |_theme, status| {
        let background = if selected {
            Some(Background::Color(Color::from_rgba(0.23, 0.51, 0.96, 0.25)))
        } else if status == button::Status::Hovered {
            Some(Background::Color(Color::from_rgba(1.0, 1.0, 1.0, 0.05)))
        } else {
            None
        };
        button::Style {
            background,
            text_color: if selected {
                Color::WHITE
            } else {
                palette::TEXT_SECONDARY
            },
            border: Border {
                radius: 6.0.into(),
                ..Default::default()
            },
            shadow: Shadow::default(),
        }
    }
}

pub fn input_search(theme: &Theme, status: text_input::Status) -> text_input::Style {
    let default = text_input::default(theme, status);
    text_input::Style {
        background: Background::Color(palette::SURFACE),
        border: Border {
            color: match status {
                text_input::Status::Focused => palette::ACCENT_BLUE,
                _ => palette::BORDER,
            },
            width: 1.0,
            radius: 6.0.into(),
        },
        value: palette::TEXT_PRIMARY,
        placeholder: palette::TEXT_SECONDARY,
        ..default
    }
}
