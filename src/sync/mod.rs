//! Scroll/visibility synchronization between the lyrics and translation
//! columns: the shared "current track" heading and, on narrow viewports, the
//! active column. Everything here is cosmetic, so a missing anchor disables
//! the feature with a log line instead of failing.

mod active;
mod headings;
mod observer;

pub use active::{visible_fraction, ActiveColumnTracker, HorizontalSpan};
pub use headings::{
    extract_track_label, track_label, HeadingTracker, TrackHeadings, DEFAULT_TRACK_LABEL,
    REFRESH_DELAY,
};
pub use observer::{
    BoundaryObserver, Crossing, ElementKind, ObservationRegion, ObservedElement, ViewportObserver,
};

use tracing::warn;

use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// The two parallel columns of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Lyrics,
    Translation,
}

impl Column {
    pub fn other(self) -> Column {
        match self {
            Column::Lyrics => Column::Translation,
            Column::Translation => Column::Lyrics,
        }
    }

    /// Prefix for element ids rendered inside this column.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Column::Lyrics => "lyrics",
            Column::Translation => "trans",
        }
    }
}

/// Anchors the synchronizer needs from the rendered page.
#[derive(Debug, Clone, Default)]
pub struct SyncAnchors {
    pub lyrics_column: bool,
    pub translation_column: bool,
    pub headings: TrackHeadings,
}

/// Heading tracking plus active-column tracking for one dual-column view.
pub struct ScrollSync<O> {
    headings: HeadingTracker<O>,
    active: ActiveColumnTracker,
}

impl<O: BoundaryObserver> ScrollSync<O> {
    /// Wire the synchronizer to the page. Returns `None` when a column is
    /// missing; missing headings only leave those headings untouched.
    pub fn attach(
        observer: O,
        anchors: SyncAnchors,
        viewport_width: u16,
        narrow_threshold: u16,
    ) -> Option<Self> {
        if !anchors.lyrics_column || !anchors.translation_column {
            warn!(
                lyrics = anchors.lyrics_column,
                translation = anchors.translation_column,
                "scroll sync: required columns not found, staying inactive"
            );
            return None;
        }
        if anchors.headings.is_empty() {
            warn!("scroll sync: no track headings found, heading updates are skipped");
        }

        Some(Self {
            headings: HeadingTracker::new(observer, anchors.headings),
            active: ActiveColumnTracker::new(narrow_threshold, viewport_width),
        })
    }

    pub fn headings(&self) -> &HeadingTracker<O> {
        &self.headings
    }

    pub fn headings_mut(&mut self) -> &mut HeadingTracker<O> {
        &mut self.headings
    }

    pub fn active(&self) -> &ActiveColumnTracker {
        &self.active
    }

    /// Feed crossings produced by the observer and report heading changes.
    pub fn on_crossings(
        &mut self,
        crossings: &[Crossing],
        diagnostics: Option<&mut Diagnostics>,
    ) -> Option<String> {
        let label = self.headings.handle(crossings)?;
        if let Some(diagnostics) = diagnostics {
            diagnostics.record(DiagnosticKind::Heading, label.clone());
        }
        Some(label)
    }

    pub fn on_horizontal_scroll(
        &mut self,
        container: HorizontalSpan,
        lyrics: HorizontalSpan,
        translation: HorizontalSpan,
        diagnostics: Option<&mut Diagnostics>,
    ) -> Option<Column> {
        let changed = self.active.on_scroll(container, lyrics, translation)?;
        if let Some(diagnostics) = diagnostics {
            diagnostics.record(DiagnosticKind::ActiveColumn, format!("{changed:?}"));
        }
        Some(changed)
    }

    pub fn on_resize(&mut self, viewport_width: u16, diagnostics: Option<&mut Diagnostics>) -> bool {
        let crossed = self.active.on_resize(viewport_width);
        if crossed {
            if let Some(diagnostics) = diagnostics {
                let layout = if self.active.is_narrow() { "narrow" } else { "wide" };
                diagnostics.record(
                    DiagnosticKind::Viewport,
                    format!("{layout} at {viewport_width} columns"),
                );
            }
        }
        crossed
    }
}

impl ScrollSync<ViewportObserver> {
    /// Re-evaluate `column` after a vertical scroll and apply any crossings.
    pub fn on_vertical_scroll(
        &mut self,
        column: Column,
        scroll: usize,
        viewport_height: usize,
        diagnostics: Option<&mut Diagnostics>,
    ) -> Option<String> {
        let crossings = self
            .headings
            .observer_mut()
            .update(column, scroll, viewport_height);
        self.on_crossings(&crossings, diagnostics)
    }
}
