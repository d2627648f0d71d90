//! Property tests for the scroll trigger and the search debouncer.

use proptest::prelude::*;
use roster::scroll::{ScrollMetrics, ScrollSignal};
use roster::search::SearchDebouncer;
use std::time::Duration;
use tokio::time::Instant;

const WINDOW_MS: u64 = 500;

fn metrics_strategy() -> impl Strategy<Value = ScrollMetrics> {
    (0.0f64..5_000.0, 0.0f64..6_000.0, 1.0f64..1_000.0)
        .prop_map(|(offset, doc, viewport)| ScrollMetrics::new(offset, doc, viewport))
}

proptest! {
    #[test]
    fn scroll_never_fires_while_fetching(
        moves in prop::collection::vec(metrics_strategy(), 1..50),
        threshold in 0.0f64..1_000.0,
    ) {
        let mut signal = ScrollSignal::new(threshold);
        for metrics in moves {
            prop_assert!(!signal.should_advance(metrics, true));
            prop_assert_eq!(signal.last_offset(), metrics.offset);
        }
    }

    #[test]
    fn scroll_fires_only_when_moving_down_near_end(
        moves in prop::collection::vec(metrics_strategy(), 1..50),
        threshold in 0.0f64..1_000.0,
    ) {
        let mut signal = ScrollSignal::new(threshold);
        for metrics in moves {
            let previous = signal.last_offset();
            let fired = signal.should_advance(metrics, false);
            let expected =
                metrics.offset > previous && metrics.distance_from_bottom() < threshold;
            prop_assert_eq!(fired, expected);
            prop_assert_eq!(signal.last_offset(), metrics.offset);
        }
    }

    #[test]
    fn burst_within_window_commits_at_most_once(
        terms in prop::collection::vec("[a-z]{1,6}", 1..20),
        gaps in prop::collection::vec(0u64..WINDOW_MS, 20),
    ) {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(WINDOW_MS));
        let mut now = start;
        let mut commits = 0;

        for (term, gap) in terms.iter().zip(gaps.iter()) {
            now += Duration::from_millis(*gap);
            debouncer.push(term.as_str(), now);
            // Polling right before the deadline never commits
            if debouncer.poll(now + Duration::from_millis(WINDOW_MS - 1)).is_some() {
                commits += 1;
            }
        }
        if let Some(term) = debouncer.poll(now + Duration::from_millis(WINDOW_MS)) {
            prop_assert_eq!(&term, terms.last().unwrap());
            commits += 1;
        }
        prop_assert!(commits <= 1);
    }

    #[test]
    fn spaced_edits_commit_each_change_in_order(
        terms in prop::collection::vec("[a-z]{0,4}", 1..20),
    ) {
        let start = Instant::now();
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(WINDOW_MS));
        let mut committed = Vec::new();

        for (i, term) in terms.iter().enumerate() {
            let at = start + Duration::from_millis(i as u64 * (WINDOW_MS + 1));
            debouncer.push(term.as_str(), at);
            if let Some(c) = debouncer.poll(at + Duration::from_millis(WINDOW_MS)) {
                committed.push(c);
            }
        }

        // Distinct-until-changed, starting from the empty term
        let mut expected = Vec::new();
        let mut last = String::new();
        for term in &terms {
            if *term != last {
                expected.push(term.clone());
                last = term.clone();
            }
        }
        prop_assert_eq!(committed, expected);
    }
}
