//! One user session: the orchestrator and the table animator driven from a
//! single clock.

use tracing::warn;
use ts_animation::AnimationAdapter;
use ts_catalog::Catalog;
use ts_core::{InputValue, Millis, TrialId};

use crate::announce::{Announcer, LiveRegion};
use crate::config::TimingConfig;
use crate::error::{InputError, RunError};
use crate::orchestrator::{OrchestratorEvent, RunTicket, TrialOrchestrator};
use crate::table_animator::{AnimatorEvent, TableAnimator, TableRenderState};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Run(OrchestratorEvent),
    Table(AnimatorEvent),
}

pub struct Session<A: Announcer = LiveRegion> {
    orchestrator: TrialOrchestrator<A>,
    table: TableAnimator,
}

impl<A: Announcer> Session<A> {
    /// Build a session with `initial` selected. An unknown initial
    /// simulation leaves the session without an active simulation.
    pub fn new(
        catalog: Catalog,
        adapter: AnimationAdapter,
        announcer: A,
        timing: TimingConfig,
        initial: Option<&str>,
    ) -> Self {
        let table = TableAnimator::new(0, &timing);
        let mut session = Self {
            orchestrator: TrialOrchestrator::new(catalog, adapter, announcer, timing),
            table,
        };
        let initial = initial
            .map(str::to_string)
            .or_else(|| {
                session
                    .orchestrator
                    .catalog()
                    .list_simulations()
                    .first()
                    .map(|s| s.id.clone())
            });
        match initial {
            Some(id) => {
                if let Err(err) = session.select_simulation(&id) {
                    warn!("initial simulation unavailable: {}", err);
                }
            }
            None => warn!("catalog has no simulations"),
        }
        session
    }

    pub fn orchestrator(&self) -> &TrialOrchestrator<A> {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut TrialOrchestrator<A> {
        &mut self.orchestrator
    }

    pub fn table(&self) -> &TableAnimator {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableAnimator {
        &mut self.table
    }

    pub fn select_simulation(&mut self, simulation_id: &str) -> Result<(), RunError> {
        let already = self
            .orchestrator
            .active_simulation()
            .is_some_and(|s| s.id == simulation_id);
        let result = self.orchestrator.select_simulation(simulation_id);
        if !already {
            self.table.reset(self.orchestrator.max_trials());
        }
        result
    }

    /// Load a different catalog and select its first simulation.
    pub fn replace_catalog(&mut self, catalog: Catalog) -> Result<(), RunError> {
        let first = catalog
            .list_simulations()
            .first()
            .map(|s| s.id.clone())
            .unwrap_or_default();
        let result = self.orchestrator.replace_catalog(catalog, &first);
        self.table.reset(self.orchestrator.max_trials());
        result
    }

    pub fn set_input(&mut self, input_id: &str, value: InputValue) -> Result<(), InputError> {
        self.orchestrator.set_input(input_id, value)
    }

    /// Start a run. Refused while a row removal is animating, since the
    /// removal lands in the trial list only when the slide ends.
    pub fn request_run(&mut self, now: Millis) -> Result<RunTicket, RunError> {
        if self.table.is_animating() {
            warn!("run refused while a trial is being removed");
            return Err(RunError::DeleteInProgress);
        }
        let ticket = self.orchestrator.request_run(now)?;
        self.table.observe(self.orchestrator.trials(), now);
        Ok(ticket)
    }

    /// Start animating a trial's removal. The trial leaves the list when the
    /// slide completes. Refused while a run is in flight or another removal
    /// is animating.
    pub fn request_delete(
        &mut self,
        trial_id: TrialId,
        measured_row_height: Option<f32>,
        measured_container_height: Option<f32>,
        now: Millis,
    ) -> bool {
        if self.orchestrator.is_running() {
            warn!(trial = %trial_id, "delete refused while a run is in flight");
            return false;
        }
        self.table.begin_delete(
            self.orchestrator.trials(),
            trial_id,
            measured_row_height,
            measured_container_height,
            now,
        )
    }

    pub fn tick(&mut self, now: Millis) -> Vec<SessionEvent> {
        let mut events: Vec<SessionEvent> = self
            .orchestrator
            .tick(now)
            .into_iter()
            .map(SessionEvent::Run)
            .collect();
        self.table.observe(self.orchestrator.trials(), now);

        for event in self.table.tick(now) {
            if let AnimatorEvent::DeleteReady(id) = &event {
                self.orchestrator.delete_trial(*id);
                events.extend(
                    self.orchestrator
                        .tick(now)
                        .into_iter()
                        .map(SessionEvent::Run),
                );
                self.table.observe(self.orchestrator.trials(), now);
            }
            events.push(SessionEvent::Table(event));
        }
        events
    }

    pub fn render_table(&self, now: Millis) -> TableRenderState {
        self.table.render_state(self.orchestrator.trials(), now)
    }

    pub fn next_due(&self) -> Option<Millis> {
        match (self.orchestrator.next_due(), self.table.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
