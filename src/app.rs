use roster::catalog::{Character, FetchOutcome};
use roster::coordinator::ListCoordinator;
use roster::scroll::ScrollMetrics;
use std::borrow::Cow;
use tokio::time::Instant;

/// Scroll units per list row when turning the selection into
/// [`ScrollMetrics`]. With the default threshold of 300 this asks for the next
/// page once the selection is within 10 rows of the end.
pub const ROW_UNITS: f64 = 30.0;

/// Maximum allowed search input length.
pub const MAX_SEARCH_LENGTH: usize = 256;

/// Terminal-side state wrapped around the list coordinator.
pub struct App {
    pub list: ListCoordinator,
    /// Raw contents of the search box.
    pub search_input: String,
    /// Whether keystrokes go to the search box.
    pub search_mode: bool,
    pub selected: usize,
    /// Rows of the list area at the last draw, used for page-wise movement.
    pub viewport_rows: usize,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub spinner_frame: usize,
    pub needs_redraw: bool,
}

impl App {
    pub fn new(list: ListCoordinator) -> Self {
        Self {
            list,
            search_input: String::new(),
            search_mode: false,
            selected: 0,
            viewport_rows: 20,
            status_message: None,
            spinner_frame: 0,
            needs_redraw: true,
        }
    }

    pub fn selected_character(&self) -> Option<&Character> {
        self.list.items().get(self.selected)
    }

    /// The selection row as a viewport position: one row tall, sitting at the
    /// selected index of a document as long as the list.
    pub fn scroll_metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(
            self.selected as f64 * ROW_UNITS,
            self.list.items().len() as f64 * ROW_UNITS,
            ROW_UNITS,
        )
    }

    /// Move the selection down and report the movement as a scroll event.
    pub fn nav_down(&mut self, rows: usize) {
        let len = self.list.items().len();
        if len == 0 {
            return;
        }
        self.selected = self.selected.saturating_add(rows).min(len - 1);
        if self.list.on_scroll(self.scroll_metrics()) {
            tracing::debug!(selected = self.selected, "Scrolled near end, loading next page");
        }
    }

    pub fn nav_up(&mut self, rows: usize) {
        self.selected = self.selected.saturating_sub(rows);
        self.list.on_scroll(self.scroll_metrics());
    }

    /// Flip the favorite flag of the selected row.
    pub fn toggle_favorite(&mut self) {
        let Some(character) = self.selected_character().cloned() else {
            return;
        };
        let now_favorite = !self.list.is_favorite(&character);
        self.list.on_favorite_toggle(&character, now_favorite);
        if now_favorite {
            self.set_status(format!("★ {} added to favorites", character.name));
        } else {
            self.set_status(format!("{} removed from favorites", character.name));
        }
    }

    /// Feed a keystroke-level edit of the search box to the debouncer.
    pub fn edit_search(&mut self) {
        self.list
            .on_search_input(&self.search_input, Instant::now());
    }

    /// Commit any settled search edit. Called on every tick.
    pub fn poll_search(&mut self) {
        if self.list.poll_search(Instant::now()) {
            self.on_mode_transition();
        }
    }

    /// Commit the search box right away (Enter).
    pub fn commit_search(&mut self) {
        if self.list.commit_search_now() {
            self.on_mode_transition();
        }
    }

    fn on_mode_transition(&mut self) {
        self.selected = 0;
        self.needs_redraw = true;
    }

    /// Apply a catalog response delivered by a background task.
    pub fn handle_outcome(&mut self, outcome: FetchOutcome) {
        if self.list.handle_event(outcome) {
            self.clamp_selection();
            if !self.list.is_fetching() && self.list.items().is_empty() {
                if let Some(term) = self.list.committed_term() {
                    self.set_status(format!("No characters match '{}'", term));
                }
            }
        }
    }

    pub fn clamp_selection(&mut self) {
        let len = self.list.items().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Set a status message that will be displayed temporarily
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired (older than 3 seconds).
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}
