// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::dataset::MarkerId;

#[derive(Debug, Clone, PartialEq)]
pub enum ImageStatus<T> {
    Idle,
    Loading,
    Ready(T),
    Unavailable,
}

/// Identifies one image request. Only the most recently issued ticket may
/// update the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    pub city: MarkerId,
}

/// Image state of the details panel, generic over the decoded image type so the
/// UI toolkit stays out of this crate.
#[derive(Debug, Clone)]
pub struct ImageLookup<T> {
    generation: u64,
    current: Option<MarkerId>,
    status: ImageStatus<T>,
}

impl<T> Default for ImageLookup<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            current: None,
            status: ImageStatus::Idle,
        }
    }
}

impl<T> ImageLookup<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a lookup for `city`, superseding any request still in flight.
    pub fn begin(&mut self, city: MarkerId) -> RequestTicket {
        self.generation += 1;
        self.current = Some(city.clone());
        self.status = ImageStatus::Loading;
        RequestTicket {
            generation: self.generation,
            city,
        }
    }

    /// Forgets the current city; late results for it are dropped.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
        self.status = ImageStatus::Idle;
    }

    /// Applies a finished request. Returns `false` when the ticket is stale and
    /// the result was discarded.
    pub fn resolve(&mut self, ticket: &RequestTicket, image: Option<T>) -> bool {
        if !self.is_current(ticket) {
            log::debug!(
                "Discarding stale image result — city={} generation={} current={}",
                ticket.city,
                ticket.generation,
                self.generation
            );
            return false;
        }
        self.status = match image {
            Some(image) => ImageStatus::Ready(image),
            None => ImageStatus::Unavailable,
        };
        true
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        ticket.generation == self.generation && self.current.as_ref() == Some(&ticket.city)
    }

    pub fn status(&self) -> &ImageStatus<T> {
        &self.status
    }
}
