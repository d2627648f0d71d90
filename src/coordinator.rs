//! List orchestration core.
//!
//! [`ListCoordinator`] owns everything the character list shows: the
//! accumulated browse pages or the current search results, the pagination
//! cursor and the fetch state. It decides when to hit the catalog, and which
//! responses are still worth applying.
//!
//! Network calls run in spawned tasks that report back as [`FetchOutcome`]s
//! on an mpsc channel. The owner of the coordinator (the UI loop) feeds those
//! back through [`ListCoordinator::handle_event`]. Every request carries the
//! generation it was issued under; any mode transition bumps the generation
//! so late responses from a previous mode are dropped instead of merged.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::catalog::{CatalogClient, CatalogError, Character, FetchOutcome};
use crate::favorites::FavoritesStore;
use crate::scroll::{ScrollMetrics, ScrollSignal, DEFAULT_SCROLL_THRESHOLD};
use crate::search::{SearchDebouncer, DEFAULT_SEARCH_DEBOUNCE};

/// What the coordinator is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Idle,
    FetchingPage,
    Searching,
}

/// Tunables for the scroll trigger and search debounce.
#[derive(Debug, Clone, Copy)]
pub struct ListSettings {
    pub scroll_threshold: f64,
    pub search_debounce: Duration,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

/// One row of the view model.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry<'a> {
    pub character: &'a Character,
    pub is_favorite: bool,
}

/// Read-only snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel<'a> {
    pub items: Vec<ListEntry<'a>>,
    pub is_fetching: bool,
}

pub struct ListCoordinator {
    client: Arc<dyn CatalogClient>,
    favorites: Arc<dyn FavoritesStore>,
    event_tx: mpsc::Sender<FetchOutcome>,
    scroll: ScrollSignal,
    debouncer: SearchDebouncer,

    state: ListState,
    /// Last browse page whose results are in `items`. Starts at 1.
    cursor: u32,
    items: Vec<Character>,
    /// Non-blank term currently driving the list, if in search mode.
    committed_term: Option<String>,
    generation: u64,
    /// Set once the catalog reports no page past `cursor`.
    exhausted: bool,
    in_flight: Option<JoinHandle<()>>,
}

impl ListCoordinator {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        favorites: Arc<dyn FavoritesStore>,
        settings: ListSettings,
        event_tx: mpsc::Sender<FetchOutcome>,
    ) -> Self {
        Self {
            client,
            favorites,
            event_tx,
            scroll: ScrollSignal::new(settings.scroll_threshold),
            debouncer: SearchDebouncer::new(settings.search_debounce),
            state: ListState::Idle,
            cursor: 1,
            items: Vec::new(),
            committed_term: None,
            generation: 0,
            exhausted: false,
            in_flight: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn items(&self) -> &[Character] {
        &self.items
    }

    pub fn is_fetching(&self) -> bool {
        self.state != ListState::Idle
    }

    pub fn is_search_mode(&self) -> bool {
        self.committed_term.is_some()
    }

    pub fn committed_term(&self) -> Option<&str> {
        self.committed_term.as_deref()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Deadline of the pending search edit, for the event loop's timer.
    pub fn search_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    // ========================================================================
    // Browse mode
    // ========================================================================

    /// Issue the implicit page-1 fetch that populates an empty browse list.
    pub fn start(&mut self) {
        tracing::info!("Loading first catalog page");
        self.spawn_page_fetch(1);
    }

    /// Fetch and append the next browse page, unless something is already
    /// in flight, the list is showing search results, or the catalog has no
    /// more pages. Returns whether a request was issued.
    pub fn maybe_fetch_next_page(&mut self) -> bool {
        if self.state != ListState::Idle {
            tracing::trace!(state = ?self.state, "Fetch already in flight, ignoring advance");
            return false;
        }
        if self.is_search_mode() {
            tracing::trace!("Search results are not paginated, ignoring advance");
            return false;
        }
        if self.exhausted {
            tracing::trace!(cursor = self.cursor, "Catalog exhausted, ignoring advance");
            return false;
        }

        // An empty browse list means page 1 never landed; ask for it again
        // rather than skipping past it.
        let page = if self.items.is_empty() {
            1
        } else {
            self.cursor.saturating_add(1)
        };
        self.spawn_page_fetch(page);
        true
    }

    fn spawn_page_fetch(&mut self, page: u32) {
        let page = page.max(1);
        self.abort_in_flight();
        self.state = ListState::FetchingPage;

        let generation = self.generation;
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();

        tracing::debug!(page, generation, "Spawning page fetch");

        self.in_flight = Some(tokio::spawn(async move {
            let result = client.fetch_page(page).await;
            let outcome = FetchOutcome::Browse {
                page,
                generation,
                result,
            };
            if let Err(e) = tx.send(outcome).await {
                tracing::warn!(error = %e, "Failed to deliver page (receiver dropped)");
            }
        }));
    }

    // ========================================================================
    // Search mode
    // ========================================================================

    /// Apply a committed search term.
    ///
    /// A blank term leaves search mode: the cursor goes back to 1, the list
    /// is emptied and page 1 is fetched from scratch. Any other term replaces
    /// the list with that term's results once they arrive. Either way, every
    /// response still in flight becomes stale.
    pub fn run_search(&mut self, term: &str) {
        self.abort_in_flight();
        self.generation = self.generation.wrapping_add(1);
        self.scroll.reset();

        if term.trim().is_empty() {
            tracing::debug!(generation = self.generation, "Search cleared, restarting browse");
            self.committed_term = None;
            self.cursor = 1;
            self.items.clear();
            self.exhausted = false;
            self.state = ListState::Idle;
            self.start();
            return;
        }

        self.committed_term = Some(term.to_string());
        self.state = ListState::Searching;

        let generation = self.generation;
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();
        let term = term.to_string();

        tracing::debug!(term = %term, generation, "Spawning catalog search");

        self.in_flight = Some(tokio::spawn(async move {
            let result = client.search(&term).await;
            let outcome = FetchOutcome::Search {
                term,
                generation,
                result,
            };
            if let Err(e) = tx.send(outcome).await {
                tracing::warn!(error = %e, "Failed to deliver search results (receiver dropped)");
            }
        }));
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            tracing::trace!("Aborted in-flight catalog request");
        }
    }

    // ========================================================================
    // Responses
    // ========================================================================

    /// Apply a response from a spawned request. Returns false when the
    /// response was stale and dropped.
    pub fn handle_event(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.generation() != self.generation {
            tracing::debug!(
                generation = outcome.generation(),
                current = self.generation,
                "Dropping stale catalog response"
            );
            return false;
        }

        match outcome {
            FetchOutcome::Browse { page, result, .. } => self.apply_page(page, result),
            FetchOutcome::Search { term, result, .. } => self.apply_search(term, result),
        }
    }

    fn apply_page(&mut self, page: u32, result: Result<Vec<Character>, CatalogError>) -> bool {
        if self.state != ListState::FetchingPage || self.is_search_mode() {
            tracing::debug!(page, state = ?self.state, "Dropping unexpected page response");
            return false;
        }
        self.in_flight = None;
        self.state = ListState::Idle;

        match result {
            Ok(characters) if characters.is_empty() => {
                tracing::info!(page, "Catalog returned an empty page, no more pages");
                self.exhausted = true;
            }
            Ok(characters) => {
                tracing::debug!(page, count = characters.len(), "Appending catalog page");
                self.items.extend(characters);
                self.cursor = page;
            }
            Err(CatalogError::NotFound(_)) => {
                tracing::info!(page, "Reached end of catalog");
                self.exhausted = true;
            }
            Err(e) => {
                // Cursor stays put so the next advance retries this page
                tracing::warn!(page, error = %e, "Page fetch failed");
            }
        }
        true
    }

    fn apply_search(&mut self, term: String, result: Result<Vec<Character>, CatalogError>) -> bool {
        if self.state != ListState::Searching
            || self.committed_term.as_deref() != Some(term.as_str())
        {
            tracing::debug!(term = %term, "Dropping search results for superseded term");
            return false;
        }
        self.in_flight = None;
        self.state = ListState::Idle;

        match result {
            Ok(characters) => {
                tracing::debug!(term = %term, count = characters.len(), "Showing search results");
                self.items = characters;
            }
            Err(CatalogError::NoMatches(_)) => {
                tracing::debug!(term = %term, "Search matched nothing");
                self.items.clear();
            }
            Err(e) => {
                tracing::warn!(term = %term, error = %e, "Search failed, showing no results");
                self.items.clear();
            }
        }
        true
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    /// Whether `character` is currently a favorite. Always reads the store.
    pub fn is_favorite(&self, character: &Character) -> bool {
        self.favorites
            .get_favorites()
            .iter()
            .any(|fav| fav.id == character.id)
    }

    /// Add or remove a favorite. The visible list is left as is.
    pub fn set_favorite(&self, character: &Character, make_favorite: bool) {
        if make_favorite {
            self.favorites.add_favorite(character);
        } else {
            self.favorites.remove_favorite(character);
        }
    }

    /// Snapshot of the list with favorite flags.
    ///
    /// Reads the favorites store once per call, not once per row.
    pub fn view(&self) -> ViewModel<'_> {
        let favorite_ids: HashSet<u64> = self
            .favorites
            .get_favorites()
            .iter()
            .map(|fav| fav.id)
            .collect();

        ViewModel {
            items: self
                .items
                .iter()
                .map(|character| ListEntry {
                    character,
                    is_favorite: favorite_ids.contains(&character.id),
                })
                .collect(),
            is_fetching: self.is_fetching(),
        }
    }

    // ========================================================================
    // Presentation events
    // ========================================================================

    /// Raw viewport movement. Returns whether a page fetch was issued.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        let in_flight = self.is_fetching();
        if self.scroll.should_advance(metrics, in_flight) {
            return self.maybe_fetch_next_page();
        }
        false
    }

    /// Raw search box edit made at `now`. Nothing is requested until the
    /// debounce window passes; see [`poll_search`](Self::poll_search).
    pub fn on_search_input(&mut self, raw: &str, now: Instant) {
        self.debouncer.push(raw, now);
    }

    /// Commit the pending search edit if it has settled. Returns whether a
    /// search (or a return to browse mode) was started.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(term) => {
                self.run_search(&term);
                true
            }
            None => false,
        }
    }

    /// Commit the pending search edit right away.
    pub fn commit_search_now(&mut self) -> bool {
        match self.debouncer.flush() {
            Some(term) => {
                self.run_search(&term);
                true
            }
            None => false,
        }
    }

    pub fn on_favorite_toggle(&self, character: &Character, desired: bool) {
        self.set_favorite(character, desired);
    }
}

impl Drop for ListCoordinator {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}
