//! Scroll-driven pagination trigger.
//!
//! [`ScrollSignal`] turns raw viewport positions into a single yes/no
//! "load the next page now" decision. It never touches the network.

/// Distance from the bottom of the document, in scroll units, inside which a
/// downward scroll asks for the next page.
pub const DEFAULT_SCROLL_THRESHOLD: f64 = 300.0;

/// Viewport position at the time of a scroll event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top of the document.
    pub offset: f64,
    /// Total scrollable height of the document.
    pub doc_height: f64,
    /// Height of the visible viewport.
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn new(offset: f64, doc_height: f64, viewport_height: f64) -> Self {
        Self {
            offset,
            doc_height,
            viewport_height,
        }
    }

    /// Remaining distance between the bottom of the viewport and the end of
    /// the document. Negative when overscrolled.
    pub fn distance_from_bottom(&self) -> f64 {
        self.doc_height - self.viewport_height - self.offset
    }
}

/// Advance decision with hysteresis on the previous offset.
#[derive(Debug, Clone)]
pub struct ScrollSignal {
    threshold: f64,
    last_offset: f64,
}

impl Default for ScrollSignal {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_THRESHOLD)
    }
}

impl ScrollSignal {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last_offset: 0.0,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn last_offset(&self) -> f64 {
        self.last_offset
    }

    /// Decide whether this event should advance pagination.
    ///
    /// True iff the offset grew since the previous event, the viewport is
    /// within the threshold of the bottom, and no fetch is in flight. The
    /// previous offset is recorded on every call, fired or not.
    pub fn should_advance(&mut self, metrics: ScrollMetrics, fetch_in_flight: bool) -> bool {
        let scrolling_down = metrics.offset > self.last_offset;
        self.last_offset = metrics.offset;

        scrolling_down && !fetch_in_flight && metrics.distance_from_bottom() < self.threshold
    }

    /// Forget the previous offset, e.g. after the list was replaced.
    pub fn reset(&mut self) {
        self.last_offset = 0.0;
    }
}
