// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::style::{self, palette};
use crate::Message;
use cityscope_core::details::ImageStatus;
use cityscope_core::display::{flag_emoji, format_coordinates, format_population};
use cityscope_core::links::{self, ExternalLink, LinkKind};
use cityscope_core::{City, CountryGroup, Session};
use iced::widget::{
    button, column, container, horizontal_space, image, row, scrollable, text, Column, Row,
};
use iced::{Alignment, ContentFit, Element, Length, Theme};

pub const PANEL_WIDTH: f32 = 340.0;
const IMAGE_HEIGHT: f32 = 200.0;
const SHEET_MAX_HEIGHT: f32 = 360.0;

/// Details card for the selected city, or `None` when nothing is selected.
/// In compact mode the card spans the full width as a bottom sheet.
pub fn view(session: &Session<image::Handle>, compact: bool) -> Option<Element<'_, Message>> {
    let (group, city) = session.selected_city()?;

    let header = row![
        text(format!("{} {}", flag_emoji(&group.iso2), city.name)).size(22),
        horizontal_space(),
        button(text("×").size(20))
            .on_press(Message::CloseDetails)
            .padding([0, 8])
            .style(style::button_ghost),
    ]
    .align_y(Alignment::Center);

    let body = column![
        header,
        text(group.name.as_str()).color(palette::TEXT_SECONDARY),
        image_area(session.image_status()),
        facts(city),
        link_section(city),
    ]
    .spacing(12);

    let width = if compact {
        Length::Fill
    } else {
        Length::Fixed(PANEL_WIDTH)
    };

    let card = container(scrollable(body))
        .padding(16)
        .width(width)
        .style(style::container_card);

    Some(if compact {
        card.max_height(SHEET_MAX_HEIGHT).into()
    } else {
        card.into()
    })
}

fn image_area(status: &ImageStatus<image::Handle>) -> Element<'_, Message> {
    match status {
        ImageStatus::Ready(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(IMAGE_HEIGHT))
            .content_fit(ContentFit::Cover)
            .into(),
        ImageStatus::Loading => container(text("Loading image..."))
            .center_x(Length::Fill)
            .center_y(IMAGE_HEIGHT)
            .style(style::container_image_placeholder)
            .into(),
        // Nothing to show: the panel simply omits the image
        ImageStatus::Idle | ImageStatus::Unavailable => Column::new().into(),
    }
}

fn facts(city: &City) -> Element<'_, Message> {
    column![
        fact("Population", format_population(city.population)),
        fact("Coordinates", format_coordinates(city.lat, city.lon)),
    ]
    .spacing(4)
    .into()
}

fn fact<'a>(label: &'a str, value: String) -> Element<'a, Message> {
    row![
        text(label)
            .color(palette::TEXT_SECONDARY)
            .width(Length::Fixed(100.0)),
        text(value),
    ]
    .into()
}

fn link_button(link: ExternalLink) -> Element<'static, Message> {
    let style: fn(&Theme, button::Status) -> button::Style = match link.kind {
        LinkKind::StreetView | LinkKind::View3d => style::button_primary,
        _ => style::button_secondary,
    };
    button(text(link.label).size(13))
        .on_press(Message::OpenLink(link.url))
        .padding([6, 10])
        .style(style)
        .into()
}

fn link_section(city: &City) -> Element<'_, Message> {
    let mut reference = Vec::new();
    let mut photos = Vec::new();
    let mut experience = Vec::new();

    for link in links::all(city) {
        match link.kind {
            LinkKind::Wikipedia => reference.push(link_button(link)),
            LinkKind::ImageSearch | LinkKind::WikimediaCommons => photos.push(link_button(link)),
            LinkKind::StreetView | LinkKind::View3d => experience.push(link_button(link)),
        }
    }

    let mut sections = Column::new().spacing(8);
    for (title, buttons) in [
        ("Learn more", reference),
        ("Photos", photos),
        ("Explore", experience),
    ] {
        if buttons.is_empty() {
            continue;
        }
        sections = sections.push(
            column![
                text(title).size(12).color(palette::TEXT_SECONDARY),
                Row::with_children(buttons).spacing(6),
            ]
            .spacing(4),
        );
    }
    sections.into()
}

/// Window title for the selected city.
pub fn title(group: &CountryGroup, city: &City) -> String {
    format!("{}, {}", city.name, group.name)
}
