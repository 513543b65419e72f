//! Optional diagnostics for synchronization and selection events. Only
//! constructed when the viewer runs with `--debug`, and handed by reference to
//! the code paths that report into it.

use std::collections::VecDeque;

use tracing::debug;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Heading,
    ActiveColumn,
    Viewport,
    Selection,
    Registration,
}

impl DiagnosticKind {
    pub fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Heading => "heading",
            DiagnosticKind::ActiveColumn => "active",
            DiagnosticKind::Viewport => "viewport",
            DiagnosticKind::Selection => "selection",
            DiagnosticKind::Registration => "anchors",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub kind: DiagnosticKind,
    pub detail: String,
}

/// Bounded log of recent events, newest last.
#[derive(Debug)]
pub struct Diagnostics {
    events: VecDeque<DiagnosticEvent>,
    capacity: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Diagnostics {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, kind: DiagnosticKind, detail: impl Into<String>) {
        let detail = detail.into();
        debug!(target: "diagnostics", kind = kind.label(), %detail);
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(DiagnosticEvent { kind, detail });
    }

    pub fn latest(&self) -> Option<&DiagnosticEvent> {
        self.events.back()
    }

    pub fn events(&self) -> impl Iterator<Item = &DiagnosticEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// One-line summary for the footer.
    pub fn summary(&self) -> String {
        match self.latest() {
            Some(event) => format!(
                "[debug {}] {}: {}",
                self.events.len(),
                event.kind.label(),
                event.detail
            ),
            None => "[debug] no events yet".to_string(),
        }
    }
}
