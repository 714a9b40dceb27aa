//! Virtual-clock timer queue.
//!
//! Everything time-based in trialscope (deferred commits, announcement
//! delays, row animations) is scheduled here against a caller-supplied
//! millisecond clock. Nothing sleeps; callers advance the clock with
//! [`TimerQueue::drain_due`] from their event loop or from a test.

use crate::ids::Generation;

/// Milliseconds on the caller's clock.
pub type Millis = u64;

/// Handle returned by [`TimerQueue::schedule`], used for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Pending<E> {
    id: TimerId,
    due: Millis,
    generation: Generation,
    event: E,
}

/// A timer that came due.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<E> {
    pub id: TimerId,
    pub due: Millis,
    pub generation: Generation,
    pub event: E,
}

/// Cancellable one-shot timers tagged with a run generation.
///
/// Timers fire in due order; timers due at the same instant fire in the
/// order they were scheduled.
#[derive(Debug)]
pub struct TimerQueue<E> {
    next_id: u64,
    pending: Vec<Pending<E>>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Arm a timer that fires `delay` ms after `now`.
    pub fn schedule(
        &mut self,
        now: Millis,
        delay: Millis,
        generation: Generation,
        event: E,
    ) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due: now.saturating_add(delay),
            generation,
            event,
        });
        id
    }

    /// Cancel one timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        before != self.pending.len()
    }

    /// Cancel every timer armed for `generation`. Returns how many were dropped.
    pub fn cancel_generation(&mut self, generation: Generation) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.generation != generation);
        before - self.pending.len()
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Remove and return every timer due at or before `now`.
    pub fn drain_due(&mut self, now: Millis) -> Vec<Fired<E>> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        // ids are allocated in schedule order
        due.sort_by_key(|p| (p.due, p.id));
        due.into_iter()
            .map(|p| Fired {
                id: p.id,
                due: p.due,
                generation: p.generation,
                event: p.event,
            })
            .collect()
    }

    /// Earliest pending due time.
    pub fn next_due(&self) -> Option<Millis> {
        self.pending.iter().map(|p| p.due).min()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_due_then_schedule_order() {
        let g = Generation::default();
        let mut q = TimerQueue::new();
        q.schedule(0, 50, g, "late");
        q.schedule(0, 10, g, "a");
        q.schedule(0, 10, g, "b");

        assert!(q.drain_due(9).is_empty());
        let fired: Vec<_> = q.drain_due(100).into_iter().map(|f| f.event).collect();
        assert_eq!(fired, vec!["a", "b", "late"]);
        assert!(q.is_empty());
    }

    #[test]
    fn cancel_single_timer() {
        let g = Generation::default();
        let mut q = TimerQueue::new();
        let id = q.schedule(0, 10, g, 1);
        q.schedule(0, 10, g, 2);

        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        let fired: Vec<_> = q.drain_due(10).into_iter().map(|f| f.event).collect();
        assert_eq!(fired, vec![2]);
    }

    #[test]
    fn cancel_generation_leaves_newer_timers() {
        let old = Generation::default();
        let new = old.bump();
        let mut q = TimerQueue::new();
        q.schedule(0, 10, old, "stale");
        q.schedule(0, 20, old, "stale too");
        q.schedule(5, 10, new, "fresh");

        assert_eq!(q.cancel_generation(old), 2);
        let fired = q.drain_due(1_000);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].event, "fresh");
        assert_eq!(fired[0].generation, new);
        assert_eq!(fired[0].due, 15);
    }

    #[test]
    fn next_due_tracks_earliest() {
        let g = Generation::default();
        let mut q = TimerQueue::new();
        assert_eq!(q.next_due(), None);
        q.schedule(100, 300, g, ());
        q.schedule(100, 50, g, ());
        assert_eq!(q.next_due(), Some(150));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn drained_timers_come_out_in_due_order(
                delays in prop::collection::vec(0u64..500, 1..20),
                step in 1u64..200,
            ) {
                let g = Generation::default();
                let mut q = TimerQueue::new();
                for (i, d) in delays.iter().enumerate() {
                    q.schedule(0, *d, g, i);
                }

                let mut fired = Vec::new();
                let mut now = 0;
                while !q.is_empty() {
                    fired.extend(q.drain_due(now));
                    now += step;
                }

                prop_assert_eq!(fired.len(), delays.len());
                for f in &fired {
                    prop_assert_eq!(f.due, delays[f.event]);
                }
                // stable within one drain: equal due times keep schedule order
                for pair in fired.windows(2) {
                    if pair[0].due == pair[1].due {
                        prop_assert!(pair[0].event < pair[1].event);
                    }
                }
            }
        }
    }
}
