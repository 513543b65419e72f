use std::mem;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{debug, info, warn};

use super::columns::{ColumnLayout, ColumnView};
use super::helpers::{key_hint, surface_error};
use super::picker::Picker;
use crate::catalog::CatalogLoader;
use crate::config::AppConfig;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::CatalogError;
use crate::models::{AuthorIndexEntry, Song};
use crate::render::{song_types, ColumnBody, ColumnContent, SelectorKind};
use crate::selection::{AuthorRequest, Phase, SelectionController, SelectionEvent, Ticket};
use crate::sync::{
    Column, HorizontalSpan, ObservedElement, ScrollSync, SyncAnchors, TrackHeadings,
    ViewportObserver, REFRESH_DELAY,
};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows above each column body: the selector and the current-track heading.
const COLUMN_HEADER_ROWS: u16 = 2;
/// Poll interval of the event loop while nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);
/// Rows kept visible when paging.
const PAGE_OVERLAP: usize = 2;

/// Results sent back by the fetch workers.
pub(crate) enum WorkerMessage {
    CatalogReady(Vec<AuthorIndexEntry>),
    CatalogFailed(String),
    AuthorLoaded {
        ticket: Ticket,
        result: Result<Vec<Song>, CatalogError>,
    },
}

enum Mode {
    Normal,
    Picking(Picker),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state of the viewer.
pub struct App {
    loader: Arc<CatalogLoader>,
    controller: SelectionController,
    sync: Option<ScrollSync<ViewportObserver>>,
    diagnostics: Option<Diagnostics>,
    lyrics: ColumnView,
    translation: ColumnView,
    /// Focused column on wide terminals; narrow ones follow the active pane.
    focus: Column,
    /// Horizontal offset of the pane strip on narrow terminals.
    pane_offset: u16,
    viewport: (u16, u16),
    narrow_threshold: u16,
    /// Set when the last column rebuild kept the scroll offsets, so the
    /// tracked heading still describes what is on screen.
    scroll_kept: bool,
    mode: Mode,
    status: Option<StatusMessage>,
    sender: Sender<WorkerMessage>,
    receiver: Receiver<WorkerMessage>,
}

impl App {
    pub fn new(loader: CatalogLoader, config: &AppConfig, width: u16, height: u16) -> Self {
        let controller = SelectionController::new(Vec::new(), config.language);
        let anchors = SyncAnchors {
            lyrics_column: true,
            translation_column: true,
            headings: TrackHeadings::new(
                controller.lyrics().heading.clone(),
                controller.translation().heading.clone(),
            ),
        };
        let sync = ScrollSync::attach(
            ViewportObserver::default(),
            anchors,
            width,
            config.narrow_width,
        );
        let (sender, receiver) = mpsc::channel();

        let mut app = Self {
            loader: Arc::new(loader),
            controller,
            sync,
            diagnostics: config.debug.then(Diagnostics::default),
            lyrics: ColumnView::default(),
            translation: ColumnView::default(),
            focus: Column::Lyrics,
            pane_offset: 0,
            viewport: (width, height),
            narrow_threshold: config.narrow_width,
            scroll_kept: false,
            mode: Mode::Normal,
            status: None,
            sender,
            receiver,
        };
        app.refresh_columns(true);
        app
    }

    /// Kick off the catalog load on a worker thread.
    pub fn start(&mut self) -> Result<()> {
        let loader = Arc::clone(&self.loader);
        let sender = self.sender.clone();
        self.set_status(
            format!("Loading catalog from {}...", self.loader.describe_source()),
            StatusKind::Info,
        );
        thread::Builder::new()
            .name("catalog-init".into())
            .spawn(move || {
                let message = match loader.initialize() {
                    Ok(authors) => WorkerMessage::CatalogReady(authors.to_vec()),
                    Err(err) => WorkerMessage::CatalogFailed(err.to_string()),
                };
                if sender.send(message).is_err() {
                    debug!("viewer closed before the catalog finished loading");
                }
            })
            .context("failed to spawn catalog worker")?;
        Ok(())
    }

    /// Apply worker results, forward content updates to the synchronizer and
    /// run a scheduled anchor registration once it is due.
    pub fn tick(&mut self, now: Instant) {
        while let Ok(message) = self.receiver.try_recv() {
            self.handle_worker_message(message);
        }
        self.apply_selection_events(now);

        let due = self
            .sync
            .as_mut()
            .is_some_and(|sync| sync.headings_mut().take_due_refresh(now));
        if due {
            self.register_anchors();
        }
    }

    /// How long the event loop may block before the next [`App::tick`].
    pub fn poll_timeout(&self) -> Duration {
        let pending = self
            .sync
            .as_ref()
            .is_some_and(|sync| sync.headings().refresh_pending());
        if pending {
            REFRESH_DELAY
        } else {
            IDLE_POLL
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Picking(picker) => self.handle_picker_key(code, picker)?,
        };

        Ok(exit)
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.viewport = (width, height);
        let crossed = self
            .sync
            .as_mut()
            .is_some_and(|sync| sync.on_resize(width, self.diagnostics.as_mut()));
        if crossed {
            self.pane_offset = 0;
        } else {
            self.pane_offset = self.pane_offset.min(width);
        }

        let body_height = self.body_height();
        self.lyrics.clamp(body_height);
        self.translation.clamp(body_height);
        self.evaluate_column(Column::Lyrics);
        self.evaluate_column(Column::Translation);
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let page = self.body_height().saturating_sub(PAGE_OVERLAP).max(1) as isize;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Char('a') => {
                if self.controller.authors().is_empty() {
                    self.set_status("No authors available yet.", StatusKind::Error);
                } else {
                    self.clear_status();
                    return Ok(Mode::Picking(Picker::open(&self.controller.lyrics().selector)));
                }
            }
            KeyCode::Char('l') => {
                if self.controller.language_enabled() {
                    self.clear_status();
                    return Ok(Mode::Picking(Picker::open(
                        &self.controller.translation().selector,
                    )));
                }
                self.set_status("Select an author first.", StatusKind::Error);
            }
            KeyCode::Up => self.scroll_focused(-1),
            KeyCode::Down => self.scroll_focused(1),
            KeyCode::PageUp => self.scroll_focused(-page),
            KeyCode::PageDown => self.scroll_focused(page),
            KeyCode::Home => self.scroll_focused_to(0),
            KeyCode::End => self.scroll_focused_to(usize::MAX),
            KeyCode::Tab => {
                if !self.is_narrow() {
                    self.focus = self.focus.other();
                }
            }
            KeyCode::Left => self.swipe(-1),
            KeyCode::Right => self.swipe(1),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_picker_key(&mut self, code: KeyCode, mut picker: Picker) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::PageUp => picker.move_selection(-5),
            KeyCode::PageDown => picker.move_selection(5),
            KeyCode::Home => picker.select_first(),
            KeyCode::End => picker.select_last(),
            KeyCode::Enter => {
                let value = picker
                    .current()
                    .map(|item| item.value.clone())
                    .unwrap_or_default();
                match picker.kind {
                    SelectorKind::Author => self.select_author(&value),
                    SelectorKind::Language => self.select_language(&value),
                }
                return Ok(Mode::Normal);
            }
            _ => {}
        }
        Ok(Mode::Picking(picker))
    }

    fn select_author(&mut self, value: &str) {
        match self.controller.select_author(value) {
            AuthorRequest::Cleared => {
                self.record(DiagnosticKind::Selection, "author cleared");
                self.set_status("Author selection cleared.", StatusKind::Info);
            }
            AuthorRequest::Fetch(ticket) => {
                self.record(
                    DiagnosticKind::Selection,
                    format!("author {} (generation {})", ticket.author, ticket.generation),
                );
                self.set_status(
                    format!("Loading songs by {}...", ticket.author),
                    StatusKind::Info,
                );
                if let Err(err) = self.spawn_author_fetch(ticket.clone()) {
                    self.fail_fetch(&ticket, &err);
                }
            }
        }
        self.refresh_columns(true);
    }

    /// Report a fetch that never started as a failed load of `ticket`.
    fn fail_fetch(&mut self, ticket: &Ticket, err: &anyhow::Error) {
        let message = surface_error(err);
        warn!(author = %ticket.author, error = %message, "author fetch did not start");
        self.controller.finish_author(ticket, Err::<Vec<Song>, _>(message.clone()));
        self.set_status(message, StatusKind::Error);
    }

    fn select_language(&mut self, code: &str) {
        self.controller.select_language(code);
        let language = self.controller.state().language;
        self.record(DiagnosticKind::Selection, format!("language {language}"));
        self.refresh_columns(false);
    }

    fn spawn_author_fetch(&self, ticket: Ticket) -> Result<()> {
        let loader = Arc::clone(&self.loader);
        let sender = self.sender.clone();
        thread::Builder::new()
            .name("author-fetch".into())
            .spawn(move || {
                let result = loader.songs_by_author(&ticket.author);
                if sender.send(WorkerMessage::AuthorLoaded { ticket, result }).is_err() {
                    debug!("viewer closed before the author finished loading");
                }
            })
            .context("failed to spawn fetch worker")?;
        Ok(())
    }

    fn handle_worker_message(&mut self, message: WorkerMessage) {
        match message {
            WorkerMessage::CatalogReady(authors) => {
                info!(authors = authors.len(), "catalog ready");
                self.set_status(
                    format!(
                        "Loaded {} authors from {}.",
                        authors.len(),
                        self.loader.describe_source()
                    ),
                    StatusKind::Info,
                );
                self.controller.set_authors(authors);
                self.refresh_columns(true);
            }
            WorkerMessage::CatalogFailed(message) => {
                warn!(error = %message, "catalog failed to load");
                self.controller.fail_catalog(&message);
                self.set_status(message, StatusKind::Error);
                self.refresh_columns(true);
            }
            WorkerMessage::AuthorLoaded { ticket, result } => {
                if !self.controller.finish_author(&ticket, result) {
                    return;
                }
                match self.controller.phase() {
                    Phase::Ready => {
                        let text = self.loaded_summary(&ticket.author);
                        self.set_status(text, StatusKind::Info);
                    }
                    Phase::Error => {
                        let text = self.controller.state().error.clone().unwrap_or_default();
                        self.set_status(text, StatusKind::Error);
                    }
                    Phase::Idle | Phase::Loading => {}
                }
                self.refresh_columns(true);
            }
        }
    }

    /// Status line after an author loaded, e.g.
    /// `Loaded 12 songs by Mestre Bimba (1 album: Corrido, Quadra).`
    fn loaded_summary(&self, author: &str) -> String {
        let songs = self.controller.songs();
        let albums = self
            .controller
            .authors()
            .iter()
            .find(|entry| entry.name == author)
            .and_then(|entry| self.loader.author_summary(&entry.id))
            .map_or(0, |summary| summary.albums.len());
        let types = song_types(songs);

        let mut text = format!("Loaded {} songs by {author}", songs.len());
        if albums > 0 {
            let noun = if albums == 1 { "album" } else { "albums" };
            text.push_str(&format!(" ({albums} {noun}"));
            if !types.is_empty() {
                text.push_str(&format!(": {}", types.join(", ")));
            }
            text.push(')');
        }
        text.push('.');
        text
    }

    fn apply_selection_events(&mut self, now: Instant) {
        for event in self.controller.drain_events() {
            match event {
                SelectionEvent::ContentUpdated => {
                    let headings = TrackHeadings::new(
                        self.controller.lyrics().heading.clone(),
                        self.controller.translation().heading.clone(),
                    );
                    let scroll_kept = self.scroll_kept;
                    if let Some(sync) = self.sync.as_mut() {
                        let current = sync.headings().headings().current().map(str::to_string);
                        sync.headings_mut().reset_headings(headings);
                        if let Some(label) = current.filter(|_| scroll_kept) {
                            sync.headings_mut().set_track_heading(&label);
                        }
                        sync.headings_mut().schedule_refresh(now);
                    }
                }
            }
        }
    }

    /// Re-register every anchor of both columns and re-evaluate them at the
    /// current scroll offsets.
    fn register_anchors(&mut self) {
        let elements: Vec<ObservedElement> = self
            .lyrics
            .layout
            .elements
            .iter()
            .chain(&self.translation.layout.elements)
            .cloned()
            .collect();
        let count = elements.len();
        let Some(sync) = self.sync.as_mut() else {
            return;
        };
        sync.headings_mut().register(elements);
        self.record(DiagnosticKind::Registration, format!("{count} anchors"));

        self.evaluate_column(Column::Lyrics);
        self.evaluate_column(Column::Translation);
    }

    /// Rebuild both column layouts from the controller's content.
    fn refresh_columns(&mut self, reset_scroll: bool) {
        self.scroll_kept = !reset_scroll;
        let body_height = self.body_height();
        self.lyrics
            .replace(ColumnLayout::build(self.controller.lyrics()), !reset_scroll);
        self.translation
            .replace(ColumnLayout::build(self.controller.translation()), !reset_scroll);
        self.lyrics.clamp(body_height);
        self.translation.clamp(body_height);
    }

    fn scroll_focused(&mut self, delta: isize) {
        let column = self.focused_column();
        let body_height = self.body_height();
        if self.view_mut(column).scroll_by(delta, body_height) {
            self.evaluate_column(column);
        }
    }

    fn scroll_focused_to(&mut self, row: usize) {
        let column = self.focused_column();
        let body_height = self.body_height();
        if self.view_mut(column).scroll_to(row, body_height) {
            self.evaluate_column(column);
        }
    }

    fn evaluate_column(&mut self, column: Column) {
        let body_height = self.body_height();
        let scroll = self.view(column).scroll;
        if let Some(sync) = self.sync.as_mut() {
            sync.on_vertical_scroll(column, scroll, body_height, self.diagnostics.as_mut());
        }
    }

    /// Move the pane strip one quarter of the screen left or right.
    fn swipe(&mut self, direction: isize) {
        if !self.is_narrow() {
            return;
        }
        let width = self.viewport.0.max(1);
        let step = (width / 4).max(1);
        self.pane_offset = if direction < 0 {
            self.pane_offset.saturating_sub(step)
        } else {
            self.pane_offset.saturating_add(step).min(width)
        };

        let (container, lyrics, translation) = self.pane_spans();
        if let Some(sync) = self.sync.as_mut() {
            sync.on_horizontal_scroll(container, lyrics, translation, self.diagnostics.as_mut());
        }
    }

    /// Container and column extents of the pane strip, in strip coordinates.
    fn pane_spans(&self) -> (HorizontalSpan, HorizontalSpan, HorizontalSpan) {
        let width = f64::from(self.viewport.0);
        let offset = f64::from(self.pane_offset);
        (
            HorizontalSpan::new(offset, offset + width),
            HorizontalSpan::new(0.0, width),
            HorizontalSpan::new(width, 2.0 * width),
        )
    }

    fn is_narrow(&self) -> bool {
        self.viewport.0 <= self.narrow_threshold
    }

    fn active_column(&self) -> Option<Column> {
        self.sync.as_ref().and_then(|sync| sync.active().active())
    }

    fn focused_column(&self) -> Column {
        if self.is_narrow() {
            self.active_column().unwrap_or(Column::Lyrics)
        } else {
            self.focus
        }
    }

    /// Rows available to a column body: the screen minus footer, borders and
    /// the column header.
    fn body_height(&self) -> usize {
        self.viewport
            .1
            .saturating_sub(FOOTER_HEIGHT)
            .saturating_sub(2 + COLUMN_HEADER_ROWS) as usize
    }

    fn view(&self, column: Column) -> &ColumnView {
        match column {
            Column::Lyrics => &self.lyrics,
            Column::Translation => &self.translation,
        }
    }

    fn view_mut(&mut self, column: Column) -> &mut ColumnView {
        match column {
            Column::Lyrics => &mut self.lyrics,
            Column::Translation => &mut self.translation,
        }
    }

    fn content(&self, column: Column) -> &ColumnContent {
        match column {
            Column::Lyrics => self.controller.lyrics(),
            Column::Translation => self.controller.translation(),
        }
    }

    /// Heading shown above a column: the tracked label once tracks are on
    /// screen, else whatever the rendered content carries.
    fn heading(&self, column: Column) -> String {
        let content = self.content(column);
        if matches!(content.body, ColumnBody::Tracks(_)) {
            if let Some(label) = self
                .sync
                .as_ref()
                .and_then(|sync| sync.headings().headings().get(column))
            {
                return label.to_string();
            }
        }
        content.heading.clone().unwrap_or_default()
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        if self.is_narrow() {
            self.draw_panes(frame, content_area);
        } else {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(content_area);
            self.draw_column(frame, chunks[0], Column::Lyrics, 0);
            self.draw_column(frame, chunks[1], Column::Translation, 0);
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        if let Mode::Picking(picker) = &self.mode {
            picker.draw(frame, area);
        }
    }

    /// Narrow layout: both columns are full-width panes on a strip shifted
    /// left by `pane_offset`.
    fn draw_panes(&self, frame: &mut Frame, area: Rect) {
        let offset = self.pane_offset.min(area.width);
        let lyrics_width = area.width - offset;
        if lyrics_width > 0 {
            let rect = Rect {
                width: lyrics_width,
                ..area
            };
            self.draw_column(frame, rect, Column::Lyrics, offset);
        }
        if offset > 0 {
            let rect = Rect {
                x: area.x + lyrics_width,
                width: offset,
                ..area
            };
            self.draw_column(frame, rect, Column::Translation, 0);
        }
    }

    /// Draw one column into `area`; `clip_left` columns of it are scrolled
    /// out of view on the left.
    fn draw_column(&self, frame: &mut Frame, area: Rect, column: Column, clip_left: u16) {
        let content = self.content(column);
        let highlighted = match self.active_column() {
            Some(active) => active == column,
            None => !self.is_narrow() && self.focus == column,
        };
        let name = match column {
            Column::Lyrics => "Lyrics",
            Column::Translation => "Translation",
        };
        let title = if self.is_narrow() && highlighted {
            format!(" ● {name} ")
        } else {
            format!(" {name} ")
        };

        let mut borders = Borders::ALL;
        if clip_left > 0 {
            borders.remove(Borders::LEFT);
        }
        let border_style = if highlighted {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(title)
            .borders(borders)
            .border_style(border_style);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let selector = &content.selector;
        let label = match selector.kind {
            SelectorKind::Author => "Author: ",
            SelectorKind::Language => "Language: ",
        };
        let selector_line = if selector.enabled {
            Line::from(vec![
                Span::styled(label, Style::default().fg(Color::Gray)),
                Span::raw(selector.display().to_string()),
                Span::styled(" ▾", Style::default().fg(Color::DarkGray)),
            ])
        } else {
            Line::from(Span::styled(
                format!("{label}{}", selector.display()),
                Style::default().fg(Color::DarkGray),
            ))
        };
        frame.render_widget(Paragraph::new(selector_line).scroll((0, clip_left)), chunks[0]);

        let heading = Line::from(Span::styled(
            self.heading(column),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(heading).scroll((0, clip_left)), chunks[1]);

        let view = self.view(column);
        let scroll = u16::try_from(view.scroll).unwrap_or(u16::MAX);
        let body = Paragraph::new(view.layout.lines.clone()).scroll((scroll, clip_left));
        frame.render_widget(body, chunks[2]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let mut status_spans = Vec::new();
        if let Some(status) = &self.status {
            status_spans.push(Span::styled(status.text.clone(), status.kind.style()));
        }
        if let Some(diagnostics) = &self.diagnostics {
            if !status_spans.is_empty() {
                status_spans.push(Span::raw("   "));
            }
            status_spans.push(Span::styled(
                diagnostics.summary(),
                Style::default().fg(Color::DarkGray),
            ));
        }

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![Line::from(status_spans), instructions])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let mut spans = Vec::new();
        match &self.mode {
            Mode::Picking(_) => {
                spans.extend(key_hint("[↑↓]", " Navigate   "));
                spans.extend(key_hint("[Enter]", " Select   "));
                spans.extend(key_hint("[Esc]", " Cancel"));
            }
            Mode::Normal => {
                spans.extend(key_hint("[a]", " Author   "));
                spans.extend(key_hint("[l]", " Language   "));
                spans.extend(key_hint("[↑↓]", " Scroll   "));
                if self.is_narrow() {
                    spans.extend(key_hint("[←→]", " Swipe   "));
                } else {
                    spans.extend(key_hint("[Tab]", " Switch column   "));
                }
                spans.extend(key_hint("[q]", " Quit"));
            }
        }
        Line::from(spans)
    }

    fn record(&mut self, kind: DiagnosticKind, detail: impl Into<String>) {
        if let Some(diagnostics) = self.diagnostics.as_mut() {
            diagnostics.record(kind, detail);
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use serde_json::json;

    use super::*;
    use crate::catalog::{CatalogLayout, DirSource, INDEX_PATH};
    use crate::config::SourceConfig;
    use crate::models::Language;

    const WIDE: (u16, u16) = (120, 30);
    const NARROW: (u16, u16) = (80, 30);

    fn write_catalog(root: &Path) {
        fs::create_dir_all(root.join("authors")).unwrap();
        fs::write(
            root.join(INDEX_PATH),
            json!({
                "authors": [{ "id": "mestre-bimba", "name": "Mestre Bimba", "file": "bimba.json" }]
            })
            .to_string(),
        )
        .unwrap();

        let songs: Vec<_> = (1..=12)
            .map(|n| {
                json!({
                    "author": "Mestre Bimba",
                    "album": "Regional",
                    "track": format!("Track {}", n % 3 + 1),
                    "type": "Quadra",
                    "title": { "português": format!("Canto {n}"), "english": format!("Song {n}") },
                    "lyrics": {
                        "português": ["Iê, viva meu mestre|camará|"],
                        "translations": { "english": ["Hail, my master|comrade|"] }
                    }
                })
            })
            .collect();
        fs::write(
            root.join("authors/bimba.json"),
            json!({ "songs": songs }).to_string(),
        )
        .unwrap();
    }

    fn app(root: &Path, size: (u16, u16), debug: bool) -> App {
        let config = AppConfig {
            source: SourceConfig::Directory(root.to_path_buf()),
            layout: CatalogLayout::Sharded,
            narrow_width: 100,
            language: Language::English,
            debug,
        };
        let loader = CatalogLoader::new(Box::new(DirSource::new(root)), CatalogLayout::Sharded);
        App::new(loader, &config, size.0, size.1)
    }

    fn wait_for_worker(app: &mut App) {
        let message = app
            .receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("worker should answer");
        app.handle_worker_message(message);
    }

    fn screen(app: &App, size: (u16, u16)) -> String {
        let mut terminal = Terminal::new(TestBackend::new(size.0, size.1)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn load_bimba(app: &mut App) {
        app.start().unwrap();
        wait_for_worker(app);
        app.handle_key(KeyCode::Char('a')).unwrap();
        app.handle_key(KeyCode::Down).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        wait_for_worker(app);
        let now = Instant::now();
        app.tick(now);
        app.tick(now + REFRESH_DELAY);
    }

    #[test]
    fn idle_screen_shows_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());
        let mut app = app(dir.path(), WIDE, false);
        app.start().unwrap();
        wait_for_worker(&mut app);

        let text = screen(&app, WIDE);
        assert!(text.contains("Select an Author"));
        assert!(text.contains("Select a Language"));
        assert!(text.contains("Loaded 1 authors"));
    }

    #[test]
    fn selecting_an_author_renders_and_registers_tracks() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());
        let mut app = app(dir.path(), WIDE, true);
        load_bimba(&mut app);

        assert_eq!(app.controller.phase(), Phase::Ready);
        let sync = app.sync.as_ref().unwrap();
        // marker + heading per track, three tracks, two columns
        assert_eq!(sync.headings().registered_count(), 12);
        assert_eq!(sync.headings().headings().get(Column::Lyrics), Some("Track 1"));

        let text = screen(&app, WIDE);
        assert!(text.contains("Mestre Bimba"));
        assert!(text.contains("Song 3"));
        assert!(text.contains("[debug"));
        assert!(text.contains("Loaded 12 songs by Mestre Bimba (1 album: Quadra)."));
    }

    #[test]
    fn scrolling_moves_both_headings() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());
        let mut app = app(dir.path(), WIDE, false);
        load_bimba(&mut app);

        let row = app.lyrics.layout.anchor_row("Track 2").unwrap();
        let body_height = app.body_height();
        app.lyrics.scroll_to(row - 1, body_height);
        app.evaluate_column(Column::Lyrics);

        let headings = app.sync.as_ref().unwrap().headings().headings();
        assert_eq!(headings.get(Column::Lyrics), Some("Track 2"));
        assert_eq!(headings.get(Column::Translation), Some("Track 2"));
        assert_eq!(app.heading(Column::Translation), "Track 2");
    }

    #[test]
    fn language_change_keeps_the_heading_in_view() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());
        let mut app = app(dir.path(), WIDE, false);
        load_bimba(&mut app);

        let body_height = app.body_height();
        for column in [Column::Lyrics, Column::Translation] {
            let row = app.view(column).layout.anchor_row("Track 2").unwrap();
            app.view_mut(column).scroll_to(row + 4, body_height);
            app.evaluate_column(column);
        }
        assert_eq!(app.heading(Column::Lyrics), "Track 2");

        app.select_language("en");
        let now = Instant::now();
        app.tick(now);
        app.tick(now + REFRESH_DELAY);

        assert_eq!(app.heading(Column::Lyrics), "Track 2");
        assert_eq!(app.heading(Column::Translation), "Track 2");
    }

    #[test]
    fn fetch_that_never_started_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());
        let mut app = app(dir.path(), WIDE, false);
        app.start().unwrap();
        wait_for_worker(&mut app);

        let AuthorRequest::Fetch(ticket) = app.controller.select_author("Mestre Bimba") else {
            panic!("expected a fetch");
        };
        let err = Err::<(), _>(std::io::Error::other("thread limit reached"))
            .context("failed to spawn fetch worker")
            .unwrap_err();
        app.fail_fetch(&ticket, &err);

        assert_eq!(app.controller.phase(), Phase::Error);
        assert_eq!(
            app.status.as_ref().map(|status| status.text.as_str()),
            Some("thread limit reached")
        );
        assert_eq!(
            app.controller.lyrics().body,
            ColumnBody::Error("thread limit reached".to_string())
        );
    }

    #[test]
    fn language_picker_requires_an_author() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());
        let mut app = app(dir.path(), WIDE, false);
        app.start().unwrap();
        wait_for_worker(&mut app);

        app.handle_key(KeyCode::Char('l')).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(
            app.status.as_ref().map(|status| status.text.as_str()),
            Some("Select an author first.")
        );
    }

    #[test]
    fn swiping_switches_the_active_pane() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());
        let mut app = app(dir.path(), NARROW, false);
        load_bimba(&mut app);
        assert_eq!(app.active_column(), Some(Column::Lyrics));

        app.handle_key(KeyCode::Right).unwrap();
        app.handle_key(KeyCode::Right).unwrap();
        // half and half keeps the previous pane
        assert_eq!(app.active_column(), Some(Column::Lyrics));

        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.active_column(), Some(Column::Translation));
        assert_eq!(app.focused_column(), Column::Translation);
        assert!(screen(&app, NARROW).contains("● Translation"));

        app.handle_resize(140, 30);
        assert_eq!(app.active_column(), None);
        assert_eq!(app.pane_offset, 0);
    }

    #[test]
    fn clearing_the_author_resets_columns() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path());
        let mut app = app(dir.path(), WIDE, false);
        load_bimba(&mut app);

        app.handle_key(KeyCode::Char('a')).unwrap();
        app.handle_key(KeyCode::Home).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.controller.phase(), Phase::Idle);
        assert!(screen(&app, WIDE).contains("No lyrics available."));
    }
}
