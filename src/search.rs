//! Search-as-you-type throttling.
//!
//! [`SearchDebouncer`] holds the latest raw edit and its deadline. The event
//! loop feeds it edits with [`push`](SearchDebouncer::push) and polls it on
//! every tick; a term is committed once the input has been quiet for the
//! debounce window and only if it differs from the last committed term.
//!
//! A fresh debouncer counts the empty term as already committed, since the
//! startup browse list is what a blank search shows.

use std::time::Duration;
use tokio::time::Instant;

/// Quiet period after the last edit before a term is committed.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
    last_committed: String,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            last_committed: String::new(),
        }
    }

    /// Record an edit made at `now`, replacing any pending one.
    pub fn push(&mut self, term: impl Into<String>, now: Instant) {
        self.pending = Some((term.into(), now + self.delay));
    }

    /// When the pending edit becomes eligible for commit, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_committed(&self) -> &str {
        &self.last_committed
    }

    /// Commit the pending term if its quiet window has elapsed.
    ///
    /// Returns `None` while still waiting, when nothing is pending, or when
    /// the settled term equals the last committed one.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= now => {}
            _ => return None,
        }
        let (term, _) = self.pending.take()?;
        self.commit(term)
    }

    /// Commit the pending term immediately, skipping the rest of the window.
    ///
    /// Used when the user explicitly confirms a search. Still subject to the
    /// distinct-until-changed rule.
    pub fn flush(&mut self) -> Option<String> {
        let (term, _) = self.pending.take()?;
        self.commit(term)
    }

    /// Drop any pending edit without committing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    fn commit(&mut self, term: String) -> Option<String> {
        if self.last_committed == term {
            tracing::trace!(term = %term, "Debounced term unchanged, not committing");
            return None;
        }
        self.last_committed = term.clone();
        Some(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_commits_after_quiet_window() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::default();
        debouncer.push("rick", start);

        assert_eq!(debouncer.poll(start + ms(499)), None);
        assert_eq!(debouncer.poll(start + ms(500)), Some("rick".to_string()));
        assert!(!debouncer.has_pending());
    }

    #[test]
    fn test_new_edit_restarts_window() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::default();
        debouncer.push("r", start);
        debouncer.push("ri", start + ms(200));
        debouncer.push("ric", start + ms(400));

        // 500ms after the first edit, but only 100ms after the last
        assert_eq!(debouncer.poll(start + ms(500)), None);
        assert_eq!(debouncer.poll(start + ms(900)), Some("ric".to_string()));
    }

    #[test]
    fn test_distinct_from_last_committed_not_last_raw() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::default();
        debouncer.push("rick", start);
        assert!(debouncer.poll(start + ms(500)).is_some());

        // Type away and back within one window: settles on the committed value
        debouncer.push("ric", start + ms(600));
        debouncer.push("rick", start + ms(700));
        assert_eq!(debouncer.poll(start + ms(1200)), None);
        assert_eq!(debouncer.last_committed(), "rick");
    }

    #[test]
    fn test_empty_term_starts_committed() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::default();
        debouncer.push("a", start);
        debouncer.push("", start + ms(100));
        assert_eq!(debouncer.poll(start + ms(600)), None);
    }

    #[test]
    fn test_clearing_after_search_commits_empty_once() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::default();
        debouncer.push("rick", start);
        assert!(debouncer.poll(start + ms(500)).is_some());

        debouncer.push("", start + ms(600));
        assert_eq!(debouncer.poll(start + ms(1100)), Some(String::new()));

        debouncer.push("", start + ms(1200));
        assert_eq!(debouncer.poll(start + ms(1700)), None);
    }

    #[test]
    fn test_flush_commits_immediately() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::default();
        debouncer.push("morty", start);
        assert_eq!(debouncer.flush(), Some("morty".to_string()));
        assert_eq!(debouncer.poll(start + ms(500)), None);
        assert_eq!(debouncer.flush(), None);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::new(ms(100));
        debouncer.push("summer", start);
        assert_eq!(debouncer.deadline(), Some(start + ms(100)));
        debouncer.cancel();
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.poll(start + ms(200)), None);
    }
}
