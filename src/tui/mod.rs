// TUI module for the interactive conversation selector
mod app;
mod events;
mod layout;
mod rendering;
mod terminal;

use std::path::Path;

use anyhow::Result;
pub use app::{
    Mode, Outcome, PreviewOrigin, PreviewState, SEARCH_DEBOUNCE, SearchState, Selector,
};
pub use events::Action;
pub use terminal::TerminalManager;

use crate::models::ConversationRecord;
use crate::store::ConversationStore;

/// Run the interactive selector. Returns `None` when the user cancels.
///
/// The terminal is restored on every exit path, including errors and panics.
pub fn run_selector(
    records: Vec<ConversationRecord>,
    store: &dyn ConversationStore,
    working_dir: &Path,
) -> Result<Option<ConversationRecord>> {
    let mut manager = TerminalManager::new()?;
    let mut selector = Selector::new(records, store, working_dir);

    let outcome = selector.run(manager.terminal_mut());
    manager.restore()?;

    Ok(match outcome? {
        Outcome::Selected(record) => Some(record),
        Outcome::Cancelled => None,
    })
}
