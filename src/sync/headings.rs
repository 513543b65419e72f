use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::debug;

use super::observer::{BoundaryObserver, Crossing, ObservedElement};
use super::Column;

/// Settle time between a content replacement and re-registration.
pub const REFRESH_DELAY: Duration = Duration::from_millis(100);
/// Label used when an element gives no usable hint.
pub const DEFAULT_TRACK_LABEL: &str = "Track 1";

fn track_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)track\s+(\d+)").expect("track pattern is valid"))
}

/// Parse a `Track <n>` label out of free text.
pub fn extract_track_label(text: &str) -> String {
    track_pattern()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|number| format!("Track {}", number.as_str()))
        .unwrap_or_else(|| DEFAULT_TRACK_LABEL.to_string())
}

/// Label an element stands for: its explicit label attribute, else whatever
/// its text says.
pub fn track_label(element: &ObservedElement) -> String {
    element
        .label
        .as_deref()
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| extract_track_label(&element.text))
}

/// The "current track" heading of each column. `None` means the column has no
/// heading anchor and is skipped when writing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackHeadings {
    pub lyrics: Option<String>,
    pub translation: Option<String>,
}

impl TrackHeadings {
    pub fn new(lyrics: Option<String>, translation: Option<String>) -> Self {
        Self {
            lyrics,
            translation,
        }
    }

    pub fn get(&self, column: Column) -> Option<&str> {
        match column {
            Column::Lyrics => self.lyrics.as_deref(),
            Column::Translation => self.translation.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lyrics.is_none() && self.translation.is_none()
    }

    /// The label both headings show, if any column has a heading.
    pub fn current(&self) -> Option<&str> {
        self.lyrics.as_deref().or(self.translation.as_deref())
    }

    fn write_all(&mut self, label: &str) {
        for heading in [&mut self.lyrics, &mut self.translation].into_iter().flatten() {
            *heading = label.to_string();
        }
    }
}

/// Keeps both column headings on the track whose anchor most recently entered
/// the observed region. Both headings always show the same label since the
/// columns are aligned track by track.
pub struct HeadingTracker<O> {
    observer: O,
    registered: BTreeMap<String, ObservedElement>,
    headings: TrackHeadings,
    pending_refresh: Option<Instant>,
}

impl<O: BoundaryObserver> HeadingTracker<O> {
    pub fn new(observer: O, headings: TrackHeadings) -> Self {
        Self {
            observer,
            registered: BTreeMap::new(),
            headings,
            pending_refresh: None,
        }
    }

    /// Replace the observed set. Everything registered before is unobserved
    /// first, so running this twice with the same elements changes nothing.
    pub fn register(&mut self, elements: Vec<ObservedElement>) {
        for id in self.registered.keys() {
            self.observer.unobserve(id);
        }
        self.registered.clear();

        for element in elements {
            self.observer.observe(&element);
            self.registered.insert(element.id.clone(), element);
        }
        debug!(elements = self.registered.len(), "track anchors registered");
    }

    /// Swap in the heading anchors of freshly rendered content.
    pub fn reset_headings(&mut self, headings: TrackHeadings) {
        self.headings = headings;
    }

    /// Apply crossing notifications. Every entering element rewrites both
    /// headings; the label written last is returned.
    pub fn handle(&mut self, crossings: &[Crossing]) -> Option<String> {
        let mut applied = None;
        for crossing in crossings.iter().filter(|crossing| crossing.entering) {
            let Some(element) = self.registered.get(&crossing.id) else {
                continue;
            };
            let label = track_label(element);
            debug!(id = %crossing.id, %label, "track heading crossed");
            self.headings.write_all(&label);
            applied = Some(label);
        }
        applied
    }

    /// Force both headings to `label`.
    pub fn set_track_heading(&mut self, label: &str) {
        self.headings.write_all(label);
    }

    pub fn headings(&self) -> &TrackHeadings {
        &self.headings
    }

    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Ask for re-registration once new content had [`REFRESH_DELAY`] to settle.
    pub fn schedule_refresh(&mut self, now: Instant) {
        self.pending_refresh = Some(now + REFRESH_DELAY);
    }

    /// Whether a scheduled refresh is due; consumes the schedule when it is.
    pub fn take_due_refresh(&mut self, now: Instant) -> bool {
        match self.pending_refresh {
            Some(at) if now >= at => {
                self.pending_refresh = None;
                true
            }
            _ => false,
        }
    }

    pub fn refresh_pending(&self) -> bool {
        self.pending_refresh.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::sync::observer::ElementKind;

    /// Records registrations; crossings are fed to the tracker by hand.
    #[derive(Default)]
    struct FakeObserver {
        observed: HashSet<String>,
        observe_calls: usize,
    }

    impl BoundaryObserver for FakeObserver {
        fn observe(&mut self, element: &ObservedElement) {
            self.observe_calls += 1;
            self.observed.insert(element.id.clone());
        }

        fn unobserve(&mut self, id: &str) {
            self.observed.remove(id);
        }
    }

    fn element(id: &str, kind: ElementKind, label: Option<&str>, text: &str) -> ObservedElement {
        ObservedElement {
            id: id.to_string(),
            column: Column::Lyrics,
            kind,
            label: label.map(str::to_string),
            text: text.to_string(),
            row: 0,
            height: 1,
        }
    }

    fn entering(id: &str) -> Crossing {
        Crossing {
            id: id.to_string(),
            column: Column::Lyrics,
            entering: true,
        }
    }

    fn tracker() -> HeadingTracker<FakeObserver> {
        HeadingTracker::new(
            FakeObserver::default(),
            TrackHeadings::new(Some("Track 1".into()), Some("Track 1".into())),
        )
    }

    #[test]
    fn labels_prefer_the_attribute() {
        let marker = element("m", ElementKind::TrackMarker, Some("Lado B"), "Track 7");
        assert_eq!(track_label(&marker), "Lado B");

        let heading = element("h", ElementKind::Heading, None, "  track   12 ");
        assert_eq!(track_label(&heading), "Track 12");

        let blank = element("b", ElementKind::TrackMarker, Some("  "), "Intro");
        assert_eq!(track_label(&blank), DEFAULT_TRACK_LABEL);
    }

    #[test]
    fn entering_elements_update_both_headings() {
        let mut tracker = tracker();
        tracker.register(vec![
            element("lyrics-nest-Track-2", ElementKind::TrackMarker, Some("Track 2"), ""),
            element("lyrics-heading-Track-3", ElementKind::Heading, None, "Track 3"),
        ]);

        assert_eq!(
            tracker.handle(&[entering("lyrics-nest-Track-2")]),
            Some("Track 2".to_string())
        );
        assert_eq!(tracker.headings().get(Column::Lyrics), Some("Track 2"));
        assert_eq!(tracker.headings().get(Column::Translation), Some("Track 2"));

        tracker.handle(&[entering("lyrics-heading-Track-3")]);
        assert_eq!(tracker.headings().get(Column::Translation), Some("Track 3"));
    }

    #[test]
    fn leaving_and_unknown_elements_are_ignored() {
        let mut tracker = tracker();
        tracker.register(vec![element("a", ElementKind::TrackMarker, Some("Track 4"), "")]);

        let leaving = Crossing {
            entering: false,
            ..entering("a")
        };
        assert_eq!(tracker.handle(&[leaving, entering("stale")]), None);
        assert_eq!(tracker.headings().get(Column::Lyrics), Some("Track 1"));
    }

    #[test]
    fn missing_heading_anchor_is_skipped() {
        let mut tracker = HeadingTracker::new(
            FakeObserver::default(),
            TrackHeadings::new(None, Some("Track 1".into())),
        );
        tracker.set_track_heading("Track 9");
        assert_eq!(tracker.headings().get(Column::Lyrics), None);
        assert_eq!(tracker.headings().get(Column::Translation), Some("Track 9"));
    }

    #[test]
    fn registration_is_idempotent() {
        let mut tracker = tracker();
        let elements = vec![
            element("a", ElementKind::TrackMarker, Some("Track 1"), ""),
            element("b", ElementKind::Heading, None, "Track 2"),
        ];
        tracker.register(elements.clone());
        tracker.register(elements);
        assert_eq!(tracker.registered_count(), 2);
        assert_eq!(tracker.observer().observed.len(), 2);

        tracker.register(vec![element("c", ElementKind::TrackMarker, Some("Track 3"), "")]);
        assert_eq!(
            tracker.observer().observed,
            HashSet::from(["c".to_string()])
        );
        assert_eq!(tracker.observer().observe_calls, 5);
    }

    #[test]
    fn refresh_waits_for_the_settle_delay() {
        let mut tracker = tracker();
        let now = Instant::now();
        assert!(!tracker.take_due_refresh(now));

        tracker.schedule_refresh(now);
        assert!(tracker.refresh_pending());
        assert!(!tracker.take_due_refresh(now));
        assert!(tracker.take_due_refresh(now + REFRESH_DELAY));
        assert!(!tracker.take_due_refresh(now + REFRESH_DELAY * 2));
    }
}
