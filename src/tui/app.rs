//! Interactive selector state and event handling.
//!
//! The selector is a three-mode state machine:
//!
//! - **List**: browse records, change sort key and order, open preview or search
//! - **Search**: type a query; the store is searched once input pauses for
//!   [`SEARCH_DEBOUNCE`]
//! - **Preview**: scroll the cached messages of the highlighted record
//!
//! Preview remembers the mode it was opened from, so returning from a preview
//! opened during a search restores the query and its results.
//!
//! Escape and Ctrl+C cancel from every mode. Enter selects from every mode.
//!
//! # Architecture
//!
//! [`Selector::handle_action`] applies one decoded key and returns an [`Outcome`] once
//! the session is over. Time is passed in explicitly so debounce behaviour is testable
//! with synthetic instants. [`Selector::run`] drives the state machine against a real
//! terminal: it polls keys, fires due searches and redraws.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::{debug, warn};

use super::events::{Action, poll_event};
use super::rendering::{RenderState, render_ui};
use crate::error::StoreError;
use crate::models::{ConversationRecord, MessagePreview, SortKey};
use crate::store::ConversationStore;

/// Quiet period after the last keystroke before a search runs
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
/// Upper bound on previews fetched when opening a record
pub const PREVIEW_FETCH_LIMIT: usize = 10_000;
/// Lines above the preview messages (title, directory, hints, record line, separator)
pub const HEADER_LINES: u16 = 8;
/// Lines below the preview messages (separator, status)
pub const FOOTER_LINES: u16 = 3;
/// Smallest preview page regardless of terminal height
pub const MIN_PAGE_SIZE: usize = 5;
/// Height assumed until the first frame is measured
const DEFAULT_TERMINAL_HEIGHT: u16 = 24;
/// Longest accepted search query
const MAX_QUERY_LEN: usize = 256;

/// Duration for error status messages (milliseconds)
const STATUS_ERROR_DURATION_MS: u64 = 5000;

/// Type of status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Instant,
}

/// How the selector session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Selected(ConversationRecord),
    Cancelled,
}

/// Search query plus the deadline of its pending debounced search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub pending: Option<Instant>,
}

/// Mode a preview returns to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOrigin {
    List,
    Search(SearchState),
}

/// Cached messages of the record being previewed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewState {
    pub messages: Vec<MessagePreview>,
    /// Index of the first visible message
    pub offset: usize,
    pub origin: PreviewOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    List,
    Search(SearchState),
    Preview(PreviewState),
}

pub struct Selector<'a> {
    store: &'a dyn ConversationStore,
    working_dir: PathBuf,
    items: Vec<ConversationRecord>,
    selected_idx: usize,
    sort_key: SortKey,
    sort_descending: bool,
    mode: Mode,
    searching: bool,
    status_message: Option<StatusMessage>,
    terminal_height: u16,
    // Dirty state tracking for efficient rendering
    needs_redraw: bool,
}

impl<'a> Selector<'a> {
    /// Create a selector over `items`, sorted newest first
    pub fn new(
        items: Vec<ConversationRecord>,
        store: &'a dyn ConversationStore,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        let mut selector = Self {
            store,
            working_dir: working_dir.into(),
            items,
            selected_idx: 0,
            sort_key: SortKey::default(),
            sort_descending: true,
            mode: Mode::List,
            searching: false,
            status_message: None,
            terminal_height: DEFAULT_TERMINAL_HEIGHT,
            needs_redraw: true,
        };
        selector.sort_items();
        selector
    }

    pub fn items(&self) -> &[ConversationRecord] {
        &self.items
    }

    pub fn selected_idx(&self) -> usize {
        self.selected_idx
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn sort_descending(&self) -> bool {
        self.sort_descending
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn status_message(&self) -> Option<&StatusMessage> {
        self.status_message.as_ref()
    }

    /// Record the terminal height of the current frame
    pub fn set_terminal_height(&mut self, height: u16) {
        if self.terminal_height != height {
            self.terminal_height = height;
            self.needs_redraw = true;
        }
    }

    /// Number of preview messages visible at the current terminal height
    pub fn page_size(&self) -> usize {
        let available = self.terminal_height.saturating_sub(HEADER_LINES + FOOTER_LINES);
        (available as usize).max(MIN_PAGE_SIZE)
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<Outcome> {
        let mut last_draw_time = Instant::now();

        loop {
            let now = Instant::now();
            if self.clear_expired_status(now) {
                self.needs_redraw = true;
            }

            if let Some(query) = self.start_due_search(now) {
                // Show the searching indicator while the store is scanned
                self.draw(terminal)?;
                let result = self.store.search(&query, &self.working_dir);
                self.finish_search(result, Instant::now());
            }

            // Draw if dirty or if it's been >100ms (for terminal resize handling)
            if self.needs_redraw || now.duration_since(last_draw_time) >= Duration::from_millis(100)
            {
                self.draw(terminal)?;
                last_draw_time = now;
            }

            let action = poll_event(self.poll_timeout(Instant::now()))?;
            if let Some(outcome) = self.handle_action(action, Instant::now()) {
                return Ok(outcome);
            }
        }
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let size = terminal.size()?;
        self.set_terminal_height(size.height);

        terminal.draw(|f| {
            let state = RenderState {
                items: &self.items,
                selected_idx: self.selected_idx,
                mode: &self.mode,
                sort_key: self.sort_key,
                sort_descending: self.sort_descending,
                searching: self.searching,
                status_message: self.status_message.as_ref(),
                working_dir: &self.working_dir,
                page_size: self.page_size(),
            };
            render_ui(f, &state);
        })?;
        self.needs_redraw = false;
        Ok(())
    }

    /// Wait no longer than the pending debounce deadline
    fn poll_timeout(&self, now: Instant) -> Duration {
        let idle = Duration::from_millis(100);
        match &self.mode {
            Mode::Search(SearchState { pending: Some(deadline), .. }) => {
                deadline.saturating_duration_since(now).min(idle)
            }
            _ => idle,
        }
    }

    /// Apply one user action. Returns the outcome once the session is over.
    pub fn handle_action(&mut self, action: Action, now: Instant) -> Option<Outcome> {
        if action == Action::None {
            return None;
        }
        // Cancel wins in every mode
        if action == Action::Cancel {
            return Some(Outcome::Cancelled);
        }

        self.needs_redraw = true;
        match self.mode {
            Mode::List => self.handle_list_action(action),
            Mode::Search(_) => self.handle_search_action(action, now),
            Mode::Preview(_) => self.handle_preview_action(action),
        }
    }

    fn handle_list_action(&mut self, action: Action) -> Option<Outcome> {
        match action {
            Action::MoveUp => self.move_selection(-1),
            Action::MoveDown => self.move_selection(1),
            Action::Forward => self.enter_preview(),
            Action::Select => return self.selected_outcome(),
            Action::Input('/') => self.mode = Mode::Search(SearchState::default()),
            Action::Input('s') => {
                self.sort_key = self.sort_key.next();
                self.sort_items();
            }
            Action::Input('o') => {
                self.sort_descending = !self.sort_descending;
                self.sort_items();
            }
            _ => {}
        }
        None
    }

    fn handle_search_action(&mut self, action: Action, now: Instant) -> Option<Outcome> {
        match action {
            Action::MoveUp => self.move_selection(-1),
            Action::MoveDown => self.move_selection(1),
            Action::Forward => self.enter_preview(),
            Action::Select => return self.selected_outcome(),
            Action::Input(c) => {
                if let Mode::Search(state) = &mut self.mode
                    && state.query.chars().count() < MAX_QUERY_LEN
                {
                    state.query.push(c);
                    state.pending = Some(now + SEARCH_DEBOUNCE);
                }
            }
            Action::DeleteChar => {
                if let Mode::Search(state) = &mut self.mode {
                    state.query.pop();
                    state.pending = Some(now + SEARCH_DEBOUNCE);
                }
            }
            _ => {}
        }
        None
    }

    fn handle_preview_action(&mut self, action: Action) -> Option<Outcome> {
        let page_size = self.page_size();
        match action {
            Action::Back => self.leave_preview(),
            Action::MoveUp => {
                if let Mode::Preview(preview) = &mut self.mode
                    && preview.offset > 0
                {
                    preview.offset -= 1;
                }
            }
            Action::MoveDown => {
                if let Mode::Preview(preview) = &mut self.mode
                    && preview.offset + page_size < preview.messages.len()
                {
                    preview.offset += 1;
                }
            }
            Action::Select => return self.selected_outcome(),
            _ => {}
        }
        None
    }

    fn selected_outcome(&self) -> Option<Outcome> {
        self.items.get(self.selected_idx).cloned().map(Outcome::Selected)
    }

    fn move_selection(&mut self, delta: isize) {
        if self.items.is_empty() {
            self.selected_idx = 0;
            return;
        }

        let new_idx = (self.selected_idx as isize + delta).max(0) as usize;
        self.selected_idx = new_idx.min(self.items.len() - 1);
    }

    /// Open the highlighted record, scrolled so the newest messages are visible
    fn enter_preview(&mut self) {
        let Some(record) = self.items.get(self.selected_idx) else {
            return;
        };

        let messages = self.store.get_messages(&record.location, 0, PREVIEW_FETCH_LIMIT);
        let offset = messages.len().saturating_sub(self.page_size());
        debug!(session = %record.session_id, messages = messages.len(), "opening preview");

        let origin = match std::mem::replace(&mut self.mode, Mode::List) {
            Mode::Search(state) => PreviewOrigin::Search(state),
            _ => PreviewOrigin::List,
        };
        self.mode = Mode::Preview(PreviewState { messages, offset, origin });
    }

    /// Drop the cached messages and return to the mode the preview was opened from
    fn leave_preview(&mut self) {
        self.mode = match std::mem::replace(&mut self.mode, Mode::List) {
            Mode::Preview(PreviewState { origin: PreviewOrigin::Search(state), .. }) => {
                Mode::Search(state)
            }
            _ => Mode::List,
        };
    }

    fn sort_items(&mut self) {
        ConversationRecord::sort_by_key(&mut self.items, self.sort_key, self.sort_descending);
        self.selected_idx = 0;
    }

    /// Take the query of a search whose debounce deadline has passed
    ///
    /// Marks the selector as searching until [`Selector::finish_search`]. A debounce
    /// pending while previewing waits until the search mode is active again.
    pub fn start_due_search(&mut self, now: Instant) -> Option<String> {
        if let Mode::Search(state) = &mut self.mode
            && let Some(deadline) = state.pending
            && now >= deadline
        {
            state.pending = None;
            self.searching = true;
            self.needs_redraw = true;
            return Some(state.query.clone());
        }
        None
    }

    /// Replace the items with search results, or keep them and report the failure
    pub fn finish_search(
        &mut self,
        result: Result<Vec<ConversationRecord>, StoreError>,
        now: Instant,
    ) {
        self.searching = false;
        self.needs_redraw = true;

        match result {
            Ok(items) => {
                self.items = items;
                self.sort_items();
            }
            Err(e) => {
                warn!(error = %e, "search failed");
                self.set_status(
                    format!("✗ Search failed: {}", e),
                    MessageType::Error,
                    STATUS_ERROR_DURATION_MS,
                    now,
                );
            }
        }
    }

    /// Run a due search against the store. Returns true if one ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.start_due_search(now) {
            Some(query) => {
                let result = self.store.search(&query, &self.working_dir);
                self.finish_search(result, now);
                true
            }
            None => false,
        }
    }

    /// Set a transient status message with automatic expiry
    fn set_status(
        &mut self,
        text: impl Into<String>,
        message_type: MessageType,
        duration_ms: u64,
        now: Instant,
    ) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: now + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    /// Clear an expired status message. Returns true if one was cleared.
    fn clear_expired_status(&mut self, now: Instant) -> bool {
        let expired = self.status_message.as_ref().is_some_and(|msg| now >= msg.expires_at);
        if expired {
            self.status_message = None;
        }
        expired
    }
}
