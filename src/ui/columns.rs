//! Lays a rendered column out as terminal lines and records where each track
//! anchor landed, so the viewport observer can watch those rows.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::helpers::lyric_lines;
use crate::lyrics::lyric_rows;
use crate::render::{ColumnBody, ColumnContent, SongBody, SongSection, TrackSection};
use crate::sync::{Column, ElementKind, ObservedElement};
use crate::tracks::track_slug;

const LYRIC_INDENT: usize = 2;

/// A column laid out into rows, plus the anchors found in it.
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    pub lines: Vec<Line<'static>>,
    pub elements: Vec<ObservedElement>,
}

impl ColumnLayout {
    pub fn build(content: &ColumnContent) -> Self {
        let mut layout = Self::default();
        match &content.body {
            ColumnBody::Placeholder(message) => layout.push_styled(
                message.clone(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
            ColumnBody::Loading => {
                layout.push_styled("Loading...", Style::default().fg(Color::Yellow))
            }
            ColumnBody::Error(message) => {
                layout.push_styled(format!("Error: {message}"), Style::default().fg(Color::Red))
            }
            ColumnBody::Cleared => {}
            ColumnBody::Tracks(tracks) => {
                for track in tracks {
                    layout.push_track(content.column, track);
                }
            }
        }
        layout
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    /// Row of the first element labelled `label`, if any.
    pub fn anchor_row(&self, label: &str) -> Option<usize> {
        self.elements
            .iter()
            .find(|element| element.label.as_deref() == Some(label))
            .map(|element| element.row)
    }

    fn push_styled(&mut self, text: impl Into<String>, style: Style) {
        self.lines.push(Line::from(Span::styled(text.into(), style)));
    }

    fn push_track(&mut self, column: Column, track: &TrackSection) {
        // Blank row first so the anchor sits below the observer's top inset.
        self.lines.push(Line::from(""));
        let row = self.lines.len();

        self.elements.push(ObservedElement {
            id: track.id.clone(),
            column,
            kind: ElementKind::TrackMarker,
            label: Some(track.label.clone()),
            text: String::new(),
            row,
            height: 0,
        });
        self.elements.push(ObservedElement {
            id: format!("{}-heading-{}", column.id_prefix(), track_slug(&track.label)),
            column,
            kind: ElementKind::Heading,
            label: None,
            text: track.label.clone(),
            row,
            height: 1,
        });
        self.push_styled(
            format!("── {} ──", track.label),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        for song in &track.songs {
            self.push_song(song);
        }
    }

    fn push_song(&mut self, song: &SongSection) {
        let mut title = Vec::new();
        if let Some(text) = &song.title {
            title.push(Span::styled(
                text.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        if !song.song_type.trim().is_empty() {
            title.push(Span::styled(
                format!(" ({})", song.song_type.trim()),
                Style::default().fg(Color::DarkGray),
            ));
        }
        if !title.is_empty() {
            self.lines.push(Line::from(title));
        }

        match &song.body {
            SongBody::Lyrics(lines) => {
                self.lines
                    .extend(lyric_lines(lyric_rows(lines), LYRIC_INDENT));
            }
            SongBody::Unavailable(message) => self.push_styled(
                format!("{}{message}", " ".repeat(LYRIC_INDENT)),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        }
        self.lines.push(Line::from(""));
    }
}

/// Vertical scroll state of one column.
#[derive(Debug, Clone, Default)]
pub struct ColumnView {
    pub layout: ColumnLayout,
    pub scroll: usize,
}

impl ColumnView {
    pub fn replace(&mut self, layout: ColumnLayout, keep_scroll: bool) {
        self.layout = layout;
        if !keep_scroll {
            self.scroll = 0;
        }
    }

    pub fn max_scroll(&self, viewport_height: usize) -> usize {
        self.layout.height().saturating_sub(viewport_height.max(1))
    }

    /// Scroll by `delta` rows, clamped to the content. Returns whether the
    /// offset moved.
    pub fn scroll_by(&mut self, delta: isize, viewport_height: usize) -> bool {
        let max = self.max_scroll(viewport_height) as isize;
        let next = (self.scroll as isize + delta).clamp(0, max.max(0)) as usize;
        let moved = next != self.scroll;
        self.scroll = next;
        moved
    }

    pub fn scroll_to(&mut self, row: usize, viewport_height: usize) -> bool {
        let next = row.min(self.max_scroll(viewport_height));
        let moved = next != self.scroll;
        self.scroll = next;
        moved
    }

    /// Pull the offset back inside the content after it shrank.
    pub fn clamp(&mut self, viewport_height: usize) {
        self.scroll = self.scroll.min(self.max_scroll(viewport_height));
    }
}
