use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::lyrics::LyricRow;

/// Turn lyric rows into styled terminal lines, indented by `indent` spaces.
pub(crate) fn lyric_lines(rows: Vec<LyricRow>, indent: usize) -> Vec<Line<'static>> {
    let strong = Style::default().add_modifier(Modifier::BOLD);
    rows.into_iter()
        .map(|row| {
            let mut spans = Vec::with_capacity(row.len() + 1);
            if indent > 0 {
                spans.push(Span::raw(" ".repeat(indent)));
            }
            spans.extend(row.into_iter().map(|fragment| {
                if fragment.strong {
                    Span::styled(fragment.text, strong)
                } else {
                    Span::raw(fragment.text)
                }
            }));
            Line::from(spans)
        })
        .collect()
}

/// Footer hint such as `[a] Author`.
pub(crate) fn key_hint(key: &'static str, label: &'static str) -> [Span<'static>; 2] {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    [Span::styled(key, key_style), Span::raw(label)]
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for the picker popups.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
