//! Active-column tracking for narrow viewports, where the two columns become
//! horizontally swipeable panes and only one of them is "in focus".

use tracing::debug;

use super::Column;

/// Horizontal extent of a column or of the scrolling container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalSpan {
    pub left: f64,
    pub right: f64,
}

impl HorizontalSpan {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn width(&self) -> f64 {
        (self.right - self.left).max(0.0)
    }
}

/// Share of `column` lying inside `container`, in `[0, 1]`.
pub fn visible_fraction(column: HorizontalSpan, container: HorizontalSpan) -> f64 {
    let width = column.width();
    if width <= 0.0 {
        return 0.0;
    }
    let visible = column.right.min(container.right) - column.left.max(container.left);
    (visible.max(0.0) / width).clamp(0.0, 1.0)
}

/// Decides which of the two columns is active.
///
/// While the viewport is wide both columns render side by side and neither
/// carries the marker; while narrow exactly one does.
#[derive(Debug, Clone)]
pub struct ActiveColumnTracker {
    narrow_threshold: u16,
    narrow: bool,
    current: Column,
}

impl ActiveColumnTracker {
    pub fn new(narrow_threshold: u16, viewport_width: u16) -> Self {
        Self {
            narrow_threshold,
            narrow: viewport_width <= narrow_threshold,
            current: Column::Lyrics,
        }
    }

    pub fn is_narrow(&self) -> bool {
        self.narrow
    }

    pub fn narrow_threshold(&self) -> u16 {
        self.narrow_threshold
    }

    /// The column carrying the active marker, `None` on wide viewports.
    pub fn active(&self) -> Option<Column> {
        self.narrow.then_some(self.current)
    }

    pub fn is_active(&self, column: Column) -> bool {
        self.active() == Some(column)
    }

    /// Recompute after a horizontal scroll of the container. Only the strictly
    /// more visible column takes over; ties keep the current one. Returns the
    /// new active column when it changed.
    pub fn on_scroll(
        &mut self,
        container: HorizontalSpan,
        lyrics: HorizontalSpan,
        translation: HorizontalSpan,
    ) -> Option<Column> {
        if !self.narrow {
            return None;
        }

        let lyrics_visible = visible_fraction(lyrics, container);
        let translation_visible = visible_fraction(translation, container);
        let next = if lyrics_visible > translation_visible {
            Column::Lyrics
        } else if translation_visible > lyrics_visible {
            Column::Translation
        } else {
            self.current
        };

        if next == self.current {
            return None;
        }
        debug!(
            ?next,
            lyrics_visible, translation_visible, "active column changed"
        );
        self.current = next;
        Some(next)
    }

    /// React to a viewport width change. Returns `true` when the change
    /// crossed the narrow/wide threshold.
    pub fn on_resize(&mut self, viewport_width: u16) -> bool {
        let narrow = viewport_width <= self.narrow_threshold;
        if narrow == self.narrow {
            return false;
        }
        self.narrow = narrow;
        if narrow {
            self.current = Column::Lyrics;
        }
        debug!(narrow, viewport_width, "viewport crossed narrow threshold");
        true
    }
}
