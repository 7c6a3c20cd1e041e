// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::style::{self, palette};
use crate::Message;
use cityscope_core::settings::SettingChange;
use cityscope_core::{DisplaySettings, MapStyle, MarkerSize};
use iced::widget::{
    button, center, checkbox, column, container, horizontal_space, mouse_area, opaque, pick_list,
    row, stack, text,
};
use iced::{Alignment, Element, Length};

const DIALOG_WIDTH: f32 = 360.0;

/// Settings dialog stacked over `base`. A click on the dimmed backdrop closes it.
pub fn overlay<'a>(base: Element<'a, Message>, settings: &DisplaySettings) -> Element<'a, Message> {
    let dialog = container(content(settings))
        .width(Length::Fixed(DIALOG_WIDTH))
        .padding(20)
        .style(style::container_card);

    stack![
        base,
        opaque(
            mouse_area(center(opaque(dialog)).style(style::container_backdrop))
                .on_press(Message::CloseSettings)
        )
    ]
    .into()
}

fn setting_row<'a>(
    label: &'a str,
    control: impl Into<Element<'a, Message>>,
) -> Element<'a, Message> {
    row![text(label).width(Length::Fill), control.into()]
        .spacing(12)
        .align_y(Alignment::Center)
        .into()
}

fn content(settings: &DisplaySettings) -> Element<'static, Message> {
    let header = row![
        text("Settings").size(20),
        horizontal_space(),
        button(text("×").size(20))
            .on_press(Message::CloseSettings)
            .padding([0, 8])
            .style(style::button_ghost),
    ]
    .align_y(Alignment::Center);

    let map_style = pick_list(MapStyle::ALL, Some(settings.map_style), |style| {
        Message::SettingChanged(SettingChange::MapStyle(style))
    })
    .width(Length::Fixed(140.0));

    let auto_zoom = checkbox("", settings.auto_zoom)
        .on_toggle(|on| Message::SettingChanged(SettingChange::AutoZoom(on)));

    let show_markers = checkbox("", settings.show_markers)
        .on_toggle(|on| Message::SettingChanged(SettingChange::ShowMarkers(on)));

    // Size has no effect while markers are hidden
    let marker_size: Element<'static, Message> = if settings.show_markers {
        pick_list(MarkerSize::ALL, Some(settings.marker_size), |size| {
            Message::SettingChanged(SettingChange::MarkerSize(size))
        })
        .width(Length::Fixed(140.0))
        .into()
    } else {
        text(settings.marker_size.to_string())
            .color(palette::TEXT_SECONDARY)
            .width(Length::Fixed(140.0))
            .into()
    };

    column![
        header,
        setting_row("Map style", map_style),
        setting_row("Zoom to selected city", auto_zoom),
        setting_row("Show markers", show_markers),
        setting_row("Marker size", marker_size),
        row![
            horizontal_space(),
            button(text("Close"))
                .on_press(Message::CloseSettings)
                .padding([6, 16])
                .style(style::button_primary),
        ],
    ]
    .spacing(16)
    .into()
}
