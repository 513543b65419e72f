//! Ratatui front-end: the lyrics and translation columns side by side, or as
//! two swipeable panes on narrow terminals, with selector popups and a status
//! footer.

mod app;
mod columns;
mod helpers;
mod picker;
mod terminal;

pub use app::App;
pub use columns::{ColumnLayout, ColumnView};
pub use terminal::run_app;
