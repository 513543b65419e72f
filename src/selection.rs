//! Reacts to author and language selections, owns the selection state and the
//! rendered content of both columns.
//!
//! Fetching is not done here: selecting an author hands out a [`Ticket`] that
//! the caller fulfils (usually on a worker thread) and returns through
//! [`SelectionController::finish_author`]. Tickets carry a generation number
//! so a slow response for an earlier selection can never overwrite a newer
//! one.

use std::fmt;

use tracing::{debug, info, warn};

use crate::models::{AuthorIndexEntry, Language, Song};
use crate::render::{
    empty_translations, render_lyrics, render_translations, ColumnBody, ColumnContent, Selector,
};

pub const NO_SONGS_MESSAGE: &str = "no songs found for this author";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Current selection. Replaced as a whole on every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub author: Option<String>,
    pub language: Language,
    pub loading: bool,
    pub error: Option<String>,
}

impl SelectionState {
    fn idle(language: Language) -> Self {
        Self {
            author: None,
            language,
            loading: false,
            error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Error
        } else if self.author.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }
}

/// Claim on the result of one author fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorRequest {
    /// The selection was cleared; nothing to fetch.
    Cleared,
    Fetch(Ticket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    /// Column content was replaced and anchors must be re-registered.
    ContentUpdated,
}

pub struct SelectionController {
    authors: Vec<AuthorIndexEntry>,
    state: SelectionState,
    generation: u64,
    songs: Vec<Song>,
    lyrics: ColumnContent,
    translation: ColumnContent,
    events: Vec<SelectionEvent>,
}

impl SelectionController {
    pub fn new(authors: Vec<AuthorIndexEntry>, language: Language) -> Self {
        let lyrics = render_lyrics(&[], &authors, None);
        Self {
            authors,
            state: SelectionState::idle(language),
            generation: 0,
            songs: Vec::new(),
            lyrics,
            translation: empty_translations(language, false),
            events: Vec::new(),
        }
    }

    /// Replace the author list once the catalog index is available.
    pub fn set_authors(&mut self, authors: Vec<AuthorIndexEntry>) {
        self.authors = authors;
        let selected = self.state.author.as_deref();
        self.lyrics.selector = render_lyrics(&[], &self.authors, selected).selector;
    }

    pub fn authors(&self) -> &[AuthorIndexEntry] {
        &self.authors
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn lyrics(&self) -> &ColumnContent {
        &self.lyrics
    }

    pub fn translation(&self) -> &ColumnContent {
        &self.translation
    }

    /// The language selector is only usable while an author is selected.
    pub fn language_enabled(&self) -> bool {
        self.state.author.is_some()
    }

    /// Handle a pick from the author selector. An empty value clears the
    /// selection; anything else starts a fetch the caller must perform.
    pub fn select_author(&mut self, value: &str) -> AuthorRequest {
        let author = value.trim();
        self.generation += 1;

        if author.is_empty() {
            info!("author selection cleared");
            self.state = SelectionState::idle(self.state.language);
            self.songs.clear();
            self.lyrics = render_lyrics(&[], &self.authors, None);
            self.translation = empty_translations(self.state.language, false);
            return AuthorRequest::Cleared;
        }

        info!(author, generation = self.generation, "loading author");
        self.state = SelectionState {
            author: Some(author.to_string()),
            language: self.state.language,
            loading: true,
            error: None,
        };
        self.lyrics = render_lyrics(&[], &self.authors, Some(author)).loading();
        self.translation = empty_translations(self.state.language, true).loading();

        AuthorRequest::Fetch(Ticket {
            generation: self.generation,
            author: author.to_string(),
        })
    }

    /// Apply the outcome of a fetch. Returns `false` when the ticket is stale
    /// and the result was dropped.
    pub fn finish_author<E: fmt::Display>(
        &mut self,
        ticket: &Ticket,
        result: Result<Vec<Song>, E>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                author = %ticket.author,
                ticket = ticket.generation,
                current = self.generation,
                "dropping stale author result"
            );
            return false;
        }

        match result {
            Ok(songs) if songs.is_empty() => {
                warn!(author = %ticket.author, "no songs found");
                self.fail_author(NO_SONGS_MESSAGE.to_string());
            }
            Ok(songs) => {
                info!(author = %ticket.author, songs = songs.len(), "author loaded");
                self.state = SelectionState {
                    loading: false,
                    error: None,
                    ..self.state.clone()
                };
                self.songs = songs;
                self.lyrics = render_lyrics(&self.songs, &self.authors, Some(&ticket.author));
                self.translation = render_translations(&self.songs, self.state.language, true);
                self.events.push(SelectionEvent::ContentUpdated);
            }
            Err(err) => {
                let message = err.to_string();
                let message = if message.trim().is_empty() {
                    UNKNOWN_ERROR_MESSAGE.to_string()
                } else {
                    message
                };
                warn!(author = %ticket.author, error = %message, "failed to load author");
                self.fail_author(message);
            }
        }
        true
    }

    /// Handle a pick from the language selector.
    pub fn select_language(&mut self, code: &str) {
        let language = Language::from_code(code);

        if self.state.author.is_none() {
            debug!(%language, "language picked without an author, clearing translations");
            self.translation = ColumnContent {
                body: ColumnBody::Cleared,
                ..self.translation.clone()
            };
            return;
        }

        self.state = SelectionState {
            language,
            ..self.state.clone()
        };
        if self.state.phase() != Phase::Ready {
            // The pending fetch renders with the new language.
            self.translation.selector = Selector::language(Some(language), true);
            return;
        }

        info!(%language, "translation language changed");
        self.translation = render_translations(&self.songs, language, true);
        self.events.push(SelectionEvent::ContentUpdated);
    }

    /// Show a page-level failure (the catalog itself could not be loaded).
    pub fn fail_catalog(&mut self, message: &str) {
        let message = if message.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE
        } else {
            message
        };
        self.generation += 1;
        self.state = SelectionState {
            author: None,
            language: self.state.language,
            loading: false,
            error: Some(message.to_string()),
        };
        self.songs.clear();
        self.lyrics = self.lyrics.failed(message);
        self.translation = empty_translations(self.state.language, false).failed(message);
    }

    /// Take the events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<SelectionEvent> {
        std::mem::take(&mut self.events)
    }

    fn fail_author(&mut self, message: String) {
        self.state = SelectionState {
            loading: false,
            error: Some(message.clone()),
            ..self.state.clone()
        };
        self.songs.clear();
        self.lyrics = self.lyrics.failed(&message);
        self.translation = empty_translations(self.state.language, true);
    }
}
