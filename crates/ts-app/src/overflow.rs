//! Horizontal overflow detection for the trials table.

use ts_core::Millis;

/// Tracks whether the table is wider than its viewport.
///
/// The front end measures; this decides when a measurement is needed.
/// Trial changes and resizes ask for one right away. A theme change asks for
/// one after the relayout delay, once fonts and padding have settled.
#[derive(Debug, Clone)]
pub struct OverflowTracker {
    has_overflow: bool,
    dirty: bool,
    theme_recheck_at: Option<Millis>,
    relayout_delay: Millis,
}

impl OverflowTracker {
    pub fn new(relayout_delay: Millis) -> Self {
        Self {
            has_overflow: false,
            dirty: true,
            theme_recheck_at: None,
            relayout_delay,
        }
    }

    pub fn has_overflow(&self) -> bool {
        self.has_overflow
    }

    pub fn mark_trials_changed(&mut self) {
        self.dirty = true;
    }

    pub fn mark_resized(&mut self) {
        self.dirty = true;
    }

    pub fn mark_theme_changed(&mut self, now: Millis) {
        self.theme_recheck_at = Some(now + self.relayout_delay);
    }

    pub fn needs_measure(&self, now: Millis) -> bool {
        self.dirty || self.theme_recheck_at.is_some_and(|due| due <= now)
    }

    /// Store a measurement. Returns true if the overflow flag changed.
    pub fn record(&mut self, content_width: f32, viewport_width: f32, now: Millis) -> bool {
        let overflow = content_width > viewport_width + 0.5;
        self.dirty = false;
        if self.theme_recheck_at.is_some_and(|due| due <= now) {
            self.theme_recheck_at = None;
        }
        let changed = overflow != self.has_overflow;
        self.has_overflow = overflow;
        changed
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.theme_recheck_at
    }
}

impl Default for OverflowTracker {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_requests_measurement() {
        let mut tracker = OverflowTracker::default();
        assert!(tracker.needs_measure(0));
        assert!(!tracker.record(400.0, 500.0, 0));
        assert!(!tracker.needs_measure(0));

        tracker.mark_resized();
        assert!(tracker.needs_measure(0));
        assert!(tracker.record(600.0, 500.0, 0));
        assert!(tracker.has_overflow());
    }

    #[test]
    fn theme_change_waits_for_relayout() {
        let mut tracker = OverflowTracker::new(100);
        tracker.record(400.0, 500.0, 0);
        tracker.mark_theme_changed(1000);
        assert!(!tracker.needs_measure(1099));
        assert!(tracker.needs_measure(1100));
        tracker.record(400.0, 500.0, 1100);
        assert!(!tracker.needs_measure(1200));
        assert_eq!(tracker.next_due(), None);
    }
}
