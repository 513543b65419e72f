//! Boundary observation: which observed elements currently sit inside the
//! "now showing" band near the top of a column.

use std::collections::{BTreeMap, HashSet};
use std::ops::Range;

use super::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Invisible anchor placed where a track group starts.
    TrackMarker,
    /// Visible heading row carrying the track name as text.
    Heading,
}

/// An element registered for boundary-crossing notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedElement {
    pub id: String,
    pub column: Column,
    pub kind: ElementKind,
    /// Explicit track label attribute, preferred over parsing `text`.
    pub label: Option<String>,
    pub text: String,
    /// First content row occupied by the element.
    pub row: usize,
    /// Rows occupied; zero for anchors, which then behave as a single point.
    pub height: usize,
}

/// One boundary-crossing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crossing {
    pub id: String,
    pub column: Column,
    /// `true` when the element moved into the observed region.
    pub entering: bool,
}

/// Capability to watch elements cross the observed region. Notifications are
/// produced by the implementation and handed to
/// [`HeadingTracker::handle`](super::HeadingTracker::handle).
pub trait BoundaryObserver {
    fn observe(&mut self, element: &ObservedElement);
    fn unobserve(&mut self, id: &str);
}

/// The band of a viewport that counts as "now showing": everything below a
/// fixed top inset, minus the bottom `bottom_ratio` of the height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationRegion {
    pub top_inset: usize,
    pub bottom_ratio: f32,
}

impl Default for ObservationRegion {
    fn default() -> Self {
        Self {
            top_inset: 1,
            bottom_ratio: 0.8,
        }
    }
}

impl ObservationRegion {
    pub fn new(top_inset: usize, bottom_ratio: f32) -> Self {
        Self {
            top_inset,
            bottom_ratio: bottom_ratio.clamp(0.0, 1.0),
        }
    }

    /// Viewport rows inside the region. Never empty while the viewport has
    /// room for at least one row below the inset.
    pub fn rows(&self, viewport_height: usize) -> Range<usize> {
        let cut = (viewport_height as f32 * self.bottom_ratio).floor() as usize;
        let start = self.top_inset.min(viewport_height);
        let end = viewport_height
            .saturating_sub(cut)
            .max(start + 1)
            .min(viewport_height);
        start..end.max(start)
    }

    fn contains(&self, rows: &Range<usize>, top: isize, height: usize) -> bool {
        let start = rows.start as isize;
        let end = rows.end as isize;
        if height == 0 {
            start <= top && top < end
        } else {
            top < end && top + height as isize > start
        }
    }
}

/// Observes elements laid out in scrollable terminal columns.
pub struct ViewportObserver {
    region: ObservationRegion,
    elements: BTreeMap<String, ObservedElement>,
    intersecting: HashSet<String>,
}

impl ViewportObserver {
    pub fn new(region: ObservationRegion) -> Self {
        Self {
            region,
            elements: BTreeMap::new(),
            intersecting: HashSet::new(),
        }
    }

    /// Re-evaluate every element of `column` for the given scroll offset and
    /// report the ones whose intersection state changed, top to bottom.
    pub fn update(&mut self, column: Column, scroll: usize, viewport_height: usize) -> Vec<Crossing> {
        let rows = self.region.rows(viewport_height);
        let mut candidates: Vec<&ObservedElement> = self
            .elements
            .values()
            .filter(|element| element.column == column)
            .collect();
        candidates.sort_by_key(|element| element.row);

        let mut crossings = Vec::new();
        for element in candidates {
            let top = element.row as isize - scroll as isize;
            let now = self.region.contains(&rows, top, element.height);
            let was = self.intersecting.contains(&element.id);
            if now != was {
                crossings.push(Crossing {
                    id: element.id.clone(),
                    column,
                    entering: now,
                });
            }
        }

        for crossing in &crossings {
            if crossing.entering {
                self.intersecting.insert(crossing.id.clone());
            } else {
                self.intersecting.remove(&crossing.id);
            }
        }
        crossings
    }
}

impl Default for ViewportObserver {
    fn default() -> Self {
        Self::new(ObservationRegion::default())
    }
}

impl BoundaryObserver for ViewportObserver {
    fn observe(&mut self, element: &ObservedElement) {
        // A fresh registration starts outside so the next update reports it.
        self.intersecting.remove(&element.id);
        self.elements.insert(element.id.clone(), element.clone());
    }

    fn unobserve(&mut self, id: &str) {
        self.elements.remove(id);
        self.intersecting.remove(id);
    }
}
