// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::style::{self, palette};
use crate::Message;
use cityscope_core::display::{flag_emoji, format_population};
use cityscope_core::filter::FilteredGroup;
use cityscope_core::{MarkerId, Session};
use iced::widget::{button, column, container, image, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length, Padding};

pub const SIDEBAR_WIDTH: f32 = 300.0;

pub fn view(session: &Session<image::Handle>) -> Element<'_, Message> {
    let search = text_input("Search countries or cities...", session.query())
        .on_input(Message::SearchChanged)
        .padding(10)
        .style(style::input_search);

    let groups = session.filtered_groups();
    let list: Element<'_, Message> = if groups.is_empty() {
        container(text("No results found.").color(palette::TEXT_SECONDARY))
            .padding(20)
            .center_x(Length::Fill)
            .into()
    } else {
        let entries = groups.into_iter().map(|fg| group_entry(session, fg));
        scrollable(Column::with_children(entries).spacing(4).padding([0, 8]))
            .height(Length::Fill)
            .into()
    };

    container(column![search, list].spacing(12))
        .padding(12)
        .width(Length::Fixed(SIDEBAR_WIDTH))
        .height(Length::Fill)
        .style(style::container_sidebar)
        .into()
}

fn group_entry<'a>(
    session: &'a Session<image::Handle>,
    filtered: FilteredGroup<'a>,
) -> Element<'a, Message> {
    let group = filtered.group;
    let expanded = session.is_expanded(group);
    let chevron = if expanded { "▾" } else { "▸" };

    let header = button(
        row![
            text(chevron).width(Length::Fixed(14.0)),
            text(flag_emoji(&group.iso2)),
            text(group.name.as_str()).width(Length::Fill),
            text(filtered.cities.len().to_string())
                .size(12)
                .color(palette::TEXT_SECONDARY),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    )
    .on_press(Message::ToggleGroup(group.iso2.clone()))
    .padding([6, 8])
    .width(Length::Fill)
    .style(style::button_ghost);

    if !expanded {
        return header.into();
    }

    let selected = session.selected();
    let cities = filtered.cities.into_iter().map(|city| {
        let id = group.marker_id(city);
        let is_selected = selected == Some(&id);
        city_row(id, &city.name, city.population, is_selected)
    });

    let city_list = Column::with_children(cities).spacing(2).padding(Padding {
        left: 22.0,
        ..Padding::ZERO
    });

    column![header, city_list].spacing(2).into()
}

fn city_row<'a>(
    id: MarkerId,
    name: &'a str,
    population: u64,
    selected: bool,
) -> Element<'a, Message> {
    button(
        row![
            text(name).width(Length::Fill),
            text(format_population(population)).size(12),
        ]
        .spacing(8),
    )
    .on_press(Message::CitySelected(id))
    .padding([4, 8])
    .width(Length::Fill)
    .style(style::button_city_row(selected))
    .into()
}
