//! Popup list used for the author and language selectors.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};
use ratatui::Frame;

use super::helpers::centered_rect;
use crate::render::{Selector, SelectorKind};

const NO_AUTHOR_LABEL: &str = "(no author)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PickerItem {
    pub value: String,
    pub label: String,
}

/// Open selector popup. The selection index always points at an item.
#[derive(Debug, Clone)]
pub(crate) struct Picker {
    pub kind: SelectorKind,
    title: &'static str,
    items: Vec<PickerItem>,
    selected: usize,
}

impl Picker {
    /// Build the popup for `selector`, preselecting its current value. The
    /// author list starts with an entry that clears the selection.
    pub(crate) fn open(selector: &Selector) -> Self {
        let mut items = Vec::with_capacity(selector.options.len() + 1);
        if selector.kind == SelectorKind::Author {
            items.push(PickerItem {
                value: String::new(),
                label: NO_AUTHOR_LABEL.to_string(),
            });
        }
        items.extend(selector.options.iter().map(|option| PickerItem {
            value: option.value.clone(),
            label: option.label.clone(),
        }));

        let selected = selector
            .selected
            .as_deref()
            .and_then(|value| items.iter().position(|item| item.value == value))
            .unwrap_or(0);

        Self {
            kind: selector.kind,
            title: match selector.kind {
                SelectorKind::Author => "Choose an Author",
                SelectorKind::Language => "Choose language",
            },
            items,
            selected,
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.items.is_empty() {
            return;
        }
        let len = self.items.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    pub(crate) fn current(&self) -> Option<&PickerItem> {
        self.items.get(self.selected)
    }

    pub(crate) fn draw(&self, frame: &mut Frame, area: Rect) {
        let popup_area = centered_rect(60, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(self.title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|item| ListItem::new(item.label.clone()))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::NONE))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(self.selected));
        frame.render_stateful_widget(list, inner, &mut list_state);
    }
}
