// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::camera::GeoPoint;
use crate::dataset::{Dataset, MarkerId};
use crate::settings::DisplaySettings;

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub position: GeoPoint,
}

/// Every city in the dataset as a marker, in dataset order.
pub fn all_markers(dataset: &Dataset) -> Vec<Marker> {
    dataset
        .iter_cities()
        .map(|(group, city)| Marker {
            id: group.marker_id(city),
            position: city.position(),
        })
        .collect()
}

/// The marker list handed to the map surface. Empty when markers are hidden.
pub fn visible_markers<'a>(markers: &'a [Marker], settings: &DisplaySettings) -> &'a [Marker] {
    if settings.show_markers {
        markers
    } else {
        &[]
    }
}

/// Draw order: the selected marker goes last so it paints on top.
pub fn draw_order<'a>(markers: &'a [Marker], selected: Option<&MarkerId>) -> Vec<&'a Marker> {
    let mut ordered: Vec<&Marker> = markers.iter().filter(|m| Some(&m.id) != selected).collect();
    if let Some(sel) = selected {
        if let Some(marker) = markers.iter().find(|m| &m.id == sel) {
            ordered.push(marker);
        }
    }
    ordered
}
