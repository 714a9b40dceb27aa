//! Presentation state of the trials table.
//!
//! The animator never touches the trial list. It watches it through
//! [`TableAnimator::observe`], decides what every row should look like at a
//! given instant, and tells the session when a deleted row may actually be
//! removed.

use tracing::{debug, warn};
use ts_core::{Generation, Millis, TimerQueue, TrialId};

use crate::config::TimingConfig;
use crate::overflow::OverflowTracker;
use crate::trial::Trial;

pub const EMPTY_TABLE_TEXT: &str = "No data yet. Run a simulation to see results.";
pub const TRAILING_ROW_TEXT: &str = "Run another simulation to add data";

#[derive(Debug, Clone, PartialEq)]
pub enum AnimatorEvent {
    /// The slide finished; the trial should be removed from the list now.
    DeleteReady(TrialId),
    /// The table is settled and accepts another deletion.
    DeleteFinished(TrialId),
    HighlightCleared(TrialId),
}

#[derive(Debug, Clone, PartialEq)]
enum AnimTimer {
    SlideFinished,
    Settled,
    HighlightExpired(TrialId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeletePhase {
    Sliding,
    Settling,
}

#[derive(Debug, Clone)]
struct Deletion {
    trial_id: TrialId,
    index: usize,
    row_height: f32,
    started: Millis,
    container_from: Option<f32>,
    trailing_moves: bool,
    phase: DeletePhase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContainerHeight {
    Auto,
    Fixed(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowSlot {
    Trial(TrialId),
    /// Invisible stand-in keeping a departing row's space.
    Placeholder { height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowRender {
    pub slot: RowSlot,
    /// Vertical translation; negative is upward.
    pub offset_y: f32,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailingRow {
    pub offset_y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    Empty,
    Rows {
        rows: Vec<RowRender>,
        /// "Add more" row, present while under the cap.
        trailing: Option<TrailingRow>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRenderState {
    pub body: TableBody,
    pub container_height: ContainerHeight,
    pub has_overflow: bool,
}

pub struct TableAnimator {
    max_trials: usize,
    slide_ms: Millis,
    settle_ms: Millis,
    highlight_ms: Millis,
    fallback_row_height: f32,
    row_height: Option<f32>,
    known: Vec<TrialId>,
    highlight: Option<TrialId>,
    deletion: Option<Deletion>,
    timers: TimerQueue<AnimTimer>,
    generation: Generation,
    overflow: OverflowTracker,
}

impl TableAnimator {
    pub fn new(max_trials: usize, timing: &TimingConfig) -> Self {
        Self {
            max_trials,
            slide_ms: timing.row_slide_ms,
            settle_ms: timing.settle_ms,
            highlight_ms: timing.highlight_ms,
            fallback_row_height: timing.fallback_row_height,
            row_height: None,
            known: Vec::new(),
            highlight: None,
            deletion: None,
            timers: TimerQueue::new(),
            generation: Generation::default(),
            overflow: OverflowTracker::new(timing.theme_relayout_ms),
        }
    }

    /// Forget everything; used when the simulation changes.
    pub fn reset(&mut self, max_trials: usize) {
        self.timers.cancel_generation(self.generation);
        self.generation = self.generation.bump();
        self.max_trials = max_trials;
        self.known.clear();
        self.highlight = None;
        self.deletion = None;
        self.overflow.mark_trials_changed();
    }

    pub fn max_trials(&self) -> usize {
        self.max_trials
    }

    pub fn highlighted(&self) -> Option<TrialId> {
        self.highlight
    }

    /// True from the start of a deletion until the table has settled.
    pub fn is_animating(&self) -> bool {
        self.deletion.is_some()
    }

    pub fn overflow(&self) -> &OverflowTracker {
        &self.overflow
    }

    pub fn overflow_mut(&mut self) -> &mut OverflowTracker {
        &mut self.overflow
    }

    /// Row height captured on the first deletion.
    pub fn row_height(&self) -> Option<f32> {
        self.row_height
    }

    /// Compare the list against the last one seen. A newly appended trial is
    /// highlighted; shrinking never highlights.
    pub fn observe(&mut self, trials: &[Trial], now: Millis) {
        let ids: Vec<TrialId> = trials.iter().map(|t| t.id).collect();
        if ids == self.known {
            return;
        }

        let grew = ids.len() > self.known.len();
        if grew {
            if let Some(last) = ids.last().copied().filter(|id| !self.known.contains(id)) {
                debug!(trial = %last, "highlighting new row");
                self.highlight = Some(last);
                self.timers.schedule(
                    now,
                    self.highlight_ms,
                    self.generation,
                    AnimTimer::HighlightExpired(last),
                );
            }
        }
        if self.highlight.is_some_and(|h| !ids.contains(&h)) {
            self.highlight = None;
        }

        self.known = ids;
        self.overflow.mark_trials_changed();
    }

    /// Start the removal animation for `trial_id`.
    ///
    /// `measured_row_height` and `measured_container_height` come from the
    /// front end, when it can measure. Returns false (and does nothing) if
    /// another deletion is in flight or the trial is not shown.
    pub fn begin_delete(
        &mut self,
        trials: &[Trial],
        trial_id: TrialId,
        measured_row_height: Option<f32>,
        measured_container_height: Option<f32>,
        now: Millis,
    ) -> bool {
        if let Some(active) = &self.deletion {
            debug!(trial = %trial_id, busy_with = %active.trial_id, "deletion already in flight");
            return false;
        }
        let Some(index) = trials.iter().position(|t| t.id == trial_id) else {
            warn!(trial = %trial_id, "delete requested for a row that is not shown");
            return false;
        };

        let fallback = self.fallback_row_height;
        let row_height = *self.row_height.get_or_insert_with(|| {
            measured_row_height
                .filter(|h| h.is_finite() && *h > 0.0)
                .unwrap_or(fallback)
        });

        self.deletion = Some(Deletion {
            trial_id,
            index,
            row_height,
            started: now,
            container_from: measured_container_height.filter(|h| h.is_finite() && *h > 0.0),
            trailing_moves: trials.len() < self.max_trials,
            phase: DeletePhase::Sliding,
        });
        self.timers
            .schedule(now, self.slide_ms, self.generation, AnimTimer::SlideFinished);
        debug!(trial = %trial_id, index, row_height, "row deletion started");
        true
    }

    pub fn tick(&mut self, now: Millis) -> Vec<AnimatorEvent> {
        let mut events = Vec::new();
        loop {
            let due = self.timers.drain_due(now);
            if due.is_empty() {
                break;
            }
            for fired in due {
                self.fire(fired.generation, fired.due, fired.event, &mut events);
            }
        }
        events
    }

    fn fire(
        &mut self,
        generation: Generation,
        due: Millis,
        event: AnimTimer,
        events: &mut Vec<AnimatorEvent>,
    ) {
        if generation != self.generation {
            return;
        }
        match event {
            AnimTimer::SlideFinished => {
                if let Some(deletion) = self.deletion.as_mut() {
                    deletion.phase = DeletePhase::Settling;
                    events.push(AnimatorEvent::DeleteReady(deletion.trial_id));
                    self.timers
                        .schedule(due, self.settle_ms, self.generation, AnimTimer::Settled);
                }
            }
            AnimTimer::Settled => {
                if let Some(deletion) = self.deletion.take() {
                    self.overflow.mark_trials_changed();
                    events.push(AnimatorEvent::DeleteFinished(deletion.trial_id));
                }
            }
            AnimTimer::HighlightExpired(id) => {
                if self.highlight == Some(id) {
                    self.highlight = None;
                    events.push(AnimatorEvent::HighlightCleared(id));
                }
            }
        }
    }

    pub fn next_due(&self) -> Option<Millis> {
        match (self.timers.next_due(), self.overflow.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// How the table should look at `now`.
    pub fn render_state(&self, trials: &[Trial], now: Millis) -> TableRenderState {
        let has_overflow = self.overflow.has_overflow();
        if trials.is_empty() {
            return TableRenderState {
                body: TableBody::Empty,
                container_height: self.container_height(now),
                has_overflow,
            };
        }

        let sliding = self
            .deletion
            .as_ref()
            .filter(|d| d.phase == DeletePhase::Sliding);
        let slide_offset = sliding.map_or(0.0, |d| -d.row_height * self.progress(d, now));

        let rows = trials
            .iter()
            .enumerate()
            .map(|(index, trial)| match sliding {
                Some(d) if trial.id == d.trial_id => RowRender {
                    slot: RowSlot::Placeholder {
                        height: d.row_height,
                    },
                    offset_y: 0.0,
                    highlighted: false,
                },
                Some(d) if index > d.index => RowRender {
                    slot: RowSlot::Trial(trial.id),
                    offset_y: slide_offset,
                    highlighted: self.highlight == Some(trial.id),
                },
                _ => RowRender {
                    slot: RowSlot::Trial(trial.id),
                    offset_y: 0.0,
                    highlighted: self.highlight == Some(trial.id),
                },
            })
            .collect();

        let trailing = (trials.len() < self.max_trials).then(|| TrailingRow {
            offset_y: match sliding {
                Some(d) if d.trailing_moves => slide_offset,
                _ => 0.0,
            },
        });

        TableRenderState {
            body: TableBody::Rows { rows, trailing },
            container_height: self.container_height(now),
            has_overflow,
        }
    }

    fn progress(&self, deletion: &Deletion, now: Millis) -> f32 {
        if self.slide_ms == 0 {
            return 1.0;
        }
        let t = (now.saturating_sub(deletion.started) as f32 / self.slide_ms as f32).clamp(0.0, 1.0);
        // ease-out cubic
        1.0 - (1.0 - t).powi(3)
    }

    fn container_height(&self, now: Millis) -> ContainerHeight {
        let Some(deletion) = &self.deletion else {
            return ContainerHeight::Auto;
        };
        let Some(from) = deletion.container_from else {
            return ContainerHeight::Auto;
        };
        let to = (from - deletion.row_height).max(0.0);
        match deletion.phase {
            DeletePhase::Sliding => {
                ContainerHeight::Fixed(from + (to - from) * self.progress(deletion, now))
            }
            DeletePhase::Settling => ContainerHeight::Fixed(to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn trial(id: u32) -> Trial {
        Trial {
            id: TrialId::new(id).unwrap(),
            timestamp: Utc::now(),
            inputs: Default::default(),
            outputs: Default::default(),
        }
    }

    fn animator() -> TableAnimator {
        TableAnimator::new(6, &TimingConfig::default())
    }

    fn rows(state: &TableRenderState) -> &[RowRender] {
        match &state.body {
            TableBody::Rows { rows, .. } => rows,
            TableBody::Empty => &[],
        }
    }

    #[test]
    fn append_highlights_only_the_new_row() {
        let mut table = animator();
        let mut list = vec![trial(1)];
        table.observe(&list, 0);
        assert_eq!(table.highlighted(), Some(TrialId::FIRST));

        list.push(trial(2));
        table.observe(&list, 500);
        assert_eq!(table.highlighted(), TrialId::new(2).ok());

        // The first row's expiry must not clear the second row's highlight.
        assert!(table.tick(1000).is_empty());
        assert_eq!(
            table.tick(1500),
            vec![AnimatorEvent::HighlightCleared(TrialId::new(2).unwrap())]
        );
    }

    #[test]
    fn shrinking_does_not_highlight() {
        let mut table = animator();
        let list = vec![trial(1), trial(2)];
        table.observe(&list, 0);
        table.tick(5000);
        table.observe(&list[..1], 6000);
        assert_eq!(table.highlighted(), None);
    }

    #[test]
    fn rows_below_slide_by_exactly_one_row() {
        let mut table = animator();
        let list = vec![trial(1), trial(2), trial(3)];
        table.observe(&list, 0);
        assert!(table.begin_delete(&list, TrialId::new(2).unwrap(), Some(40.0), Some(200.0), 0));

        let mid = table.render_state(&list, 150);
        let r = rows(&mid);
        assert_eq!(r[0].offset_y, 0.0);
        assert_eq!(r[1].slot, RowSlot::Placeholder { height: 40.0 });
        assert!(r[2].offset_y < 0.0 && r[2].offset_y > -40.0);

        let end = table.render_state(&list, 300);
        assert_eq!(rows(&end)[2].offset_y, -40.0);
        match &end.body {
            TableBody::Rows { trailing, .. } => {
                assert_eq!(trailing.map(|t| t.offset_y), Some(-40.0))
            }
            TableBody::Empty => panic!("expected rows"),
        }
        assert_eq!(end.container_height, ContainerHeight::Fixed(160.0));
    }

    #[test]
    fn one_deletion_at_a_time_and_height_is_cached() {
        let mut table = animator();
        let list = vec![trial(1), trial(2)];
        assert!(table.begin_delete(&list, TrialId::FIRST, None, None, 0));
        assert!(!table.begin_delete(&list, TrialId::new(2).unwrap(), Some(30.0), None, 10));
        assert_eq!(table.row_height(), Some(53.0));

        assert_eq!(
            table.tick(300),
            vec![AnimatorEvent::DeleteReady(TrialId::FIRST)]
        );
        assert!(table.is_animating());
        assert_eq!(
            table.tick(350),
            vec![AnimatorEvent::DeleteFinished(TrialId::FIRST)]
        );
        assert!(!table.is_animating());

        let remaining = vec![trial(2)];
        assert!(table.begin_delete(&remaining, TrialId::new(2).unwrap(), Some(30.0), None, 400));
        assert_eq!(table.row_height(), Some(53.0));
    }

    #[test]
    fn full_table_has_no_trailing_row() {
        let table = TableAnimator::new(2, &TimingConfig::default());
        let list = vec![trial(1), trial(2)];
        match table.render_state(&list, 0).body {
            TableBody::Rows { trailing, .. } => assert!(trailing.is_none()),
            TableBody::Empty => panic!("expected rows"),
        }
        assert_eq!(table.render_state(&[], 0).body, TableBody::Empty);
    }
}
