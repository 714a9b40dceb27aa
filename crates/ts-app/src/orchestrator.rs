//! Trial lifecycle: validation, playback, deferred commit.
//!
//! A run goes `Idle -> Validating -> Playing -> CommittingPending ->
//! Committed -> Idle`. The commit is deferred by the pre-delay, the animation's
//! modeled duration and the post-delay. When no animation can play the
//! trial is committed at once and only the completion announcement is
//! delayed.
//!
//! Switching simulation bumps the run generation. Timers armed under an
//! older generation are cancelled, and any that still come due are dropped.

use chrono::Utc;
use tracing::{debug, error, info, warn};
use ts_animation::AnimationAdapter;
use ts_catalog::{Catalog, SimulationDescriptor};
use ts_core::{Generation, InputValue, Millis, OutputValues, TimerQueue, TrialId};

use crate::announce::{Announcer, completion_announcement, start_announcement};
use crate::config::TimingConfig;
use crate::error::{INCOMPLETE_INPUTS_MESSAGE, InputError, RunError};
use crate::input_state::InputState;
use crate::trial::Trial;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Validating,
    Playing,
    CommittingPending,
    Committed,
}

#[derive(Debug, Clone, PartialEq)]
enum RunTimer {
    AnimationFinished,
    Commit,
    Announce(String),
}

#[derive(Debug, Clone)]
struct PendingRun {
    trial_id: TrialId,
    row: usize,
    outputs: OutputValues,
}

/// Returned by an accepted run request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    pub trial_id: TrialId,
    /// 1-based table row the trial will occupy.
    pub row: usize,
    pub animated: bool,
    /// When the trial will be committed; `None` if it already was.
    pub commit_at: Option<Millis>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrchestratorEvent {
    RunStarted { trial_id: TrialId, animated: bool },
    TrialCommitted { trial: Trial, row: usize },
    /// First commit of a session; the results table should be brought into
    /// view.
    ScrollResultsIntoView,
    RunCancelled { trial_id: TrialId },
    TrialDeleted { trial_id: TrialId },
}

pub struct TrialOrchestrator<A: Announcer> {
    catalog: Catalog,
    active: Option<SimulationDescriptor>,
    inputs: InputState,
    adapter: AnimationAdapter,
    announcer: A,
    timing: TimingConfig,
    timers: TimerQueue<RunTimer>,
    generation: Generation,
    state: RunState,
    pending: Option<PendingRun>,
    trials: Vec<Trial>,
    next_trial_id: TrialId,
    validation_error: Option<String>,
    max_trials_notice: bool,
    has_autoscrolled: bool,
    events: Vec<OrchestratorEvent>,
}

impl<A: Announcer> TrialOrchestrator<A> {
    /// No simulation is active until [`select_simulation`](Self::select_simulation).
    pub fn new(
        catalog: Catalog,
        adapter: AnimationAdapter,
        announcer: A,
        timing: TimingConfig,
    ) -> Self {
        Self {
            catalog,
            active: None,
            inputs: InputState::new(),
            adapter,
            announcer,
            timing,
            timers: TimerQueue::new(),
            generation: Generation::default(),
            state: RunState::Idle,
            pending: None,
            trials: Vec::new(),
            next_trial_id: TrialId::FIRST,
            validation_error: None,
            max_trials_notice: false,
            has_autoscrolled: false,
            events: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn active_simulation(&self) -> Option<&SimulationDescriptor> {
        self.active.as_ref()
    }

    pub fn inputs(&self) -> &InputState {
        &self.inputs
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(
            self.state,
            RunState::Validating | RunState::Playing | RunState::CommittingPending
        )
    }

    /// Message shown next to the run control after an incomplete request.
    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    /// Set when a run was refused because the table is full.
    pub fn max_trials_notice(&self) -> bool {
        self.max_trials_notice
    }

    pub fn dismiss_max_trials_notice(&mut self) {
        self.max_trials_notice = false;
    }

    pub fn next_trial_id(&self) -> TrialId {
        self.next_trial_id
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn adapter(&self) -> &AnimationAdapter {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut AnimationAdapter {
        &mut self.adapter
    }

    pub fn announcer(&self) -> &A {
        &self.announcer
    }

    pub fn announcer_mut(&mut self) -> &mut A {
        &mut self.announcer
    }

    pub fn max_trials(&self) -> usize {
        self.active.as_ref().map_or(0, |s| s.max_trials as usize)
    }

    /// Make `simulation_id` active with a fresh session.
    ///
    /// Any run in flight is cancelled, trials are discarded and numbering
    /// restarts at 1. Selecting the simulation that is already active does
    /// nothing.
    pub fn select_simulation(&mut self, simulation_id: &str) -> Result<(), RunError> {
        if self.active.as_ref().is_some_and(|s| s.id == simulation_id) {
            debug!(simulation_id, "simulation already active");
            return Ok(());
        }

        self.cancel_run();
        let dropped = self.timers.cancel_generation(self.generation);
        if dropped > 0 {
            debug!(dropped, generation = %self.generation, "cancelled timers");
        }
        self.generation = self.generation.bump();

        self.trials.clear();
        self.next_trial_id = TrialId::FIRST;
        self.validation_error = None;
        self.max_trials_notice = false;
        self.has_autoscrolled = false;

        let Some(simulation) = self.catalog.get_simulation(simulation_id).cloned() else {
            error!(simulation_id, "simulation not found");
            self.active = None;
            self.inputs.clear();
            self.adapter.unload();
            return Err(RunError::SimulationNotFound(simulation_id.to_string()));
        };

        info!(simulation_id, generation = %self.generation, "simulation selected");
        self.inputs.initialize(&simulation);
        self.adapter.load(
            &simulation.animation.resource,
            &simulation.animation.state_machine,
        );
        self.active = Some(simulation);
        Ok(())
    }

    /// Swap in a new catalog and select `simulation_id` from it.
    pub fn replace_catalog(&mut self, catalog: Catalog, simulation_id: &str) -> Result<(), RunError> {
        self.catalog = catalog;
        self.active = None;
        self.inputs.clear();
        self.select_simulation(simulation_id)
    }

    /// Edit one input. Refused while a run is in flight.
    pub fn set_input(&mut self, input_id: &str, value: InputValue) -> Result<(), InputError> {
        if self.is_running() {
            return Err(InputError::Running);
        }
        self.inputs.set_value(input_id, value)?;
        self.validation_error = None;
        if let Some(simulation) = &self.active {
            self.adapter.set_inputs(simulation, self.inputs.values());
        }
        Ok(())
    }

    /// Start a trial from the current inputs.
    pub fn request_run(&mut self, now: Millis) -> Result<RunTicket, RunError> {
        if self.is_running() {
            return Err(RunError::AlreadyRunning);
        }
        let Some(simulation) = self.active.clone() else {
            error!("run requested with no active simulation");
            return Err(RunError::SimulationNotFound(String::new()));
        };

        self.state = RunState::Validating;
        if !self.inputs.is_complete() {
            debug!(missing = ?self.inputs.missing(), "run refused, inputs incomplete");
            self.validation_error = Some(INCOMPLETE_INPUTS_MESSAGE.to_string());
            self.state = RunState::Idle;
            return Err(RunError::IncompleteInputs);
        }
        self.validation_error = None;

        if self.trials.len() >= simulation.max_trials as usize {
            warn!(max = simulation.max_trials, "run refused, trial table is full");
            self.max_trials_notice = true;
            self.state = RunState::Idle;
            return Err(RunError::MaxTrialsReached {
                max: simulation.max_trials,
            });
        }

        let values = self.inputs.values().clone();
        let mut outputs = self.catalog.lookup_outputs(&simulation.id, &values);
        if outputs.is_empty() {
            warn!(simulation_id = %simulation.id, "no precomputed result, recording zeros");
            outputs = simulation.zero_outputs();
        }

        let trial_id = self.next_trial_id;
        let row = self.trials.len() + 1;
        let description = self.catalog.lookup_description(&simulation.id, &values);
        let text = start_announcement(&simulation, &values, trial_id, description.as_deref());
        self.announcer.announce(&text, now);

        self.pending = Some(PendingRun {
            trial_id,
            row,
            outputs,
        });
        self.state = RunState::Playing;

        let animated = self.adapter.is_available()
            && match self.adapter.reset_and_play(&simulation, &values) {
                Ok(()) => true,
                Err(err) => {
                    warn!("animation could not start: {}", err);
                    false
                }
            };

        if animated {
            let delay = self.timing.pre_delay_ms + simulation.animation_duration_ms();
            self.timers.schedule(now, delay, self.generation, RunTimer::AnimationFinished);
            info!(trial = %trial_id, row, "trial started");
            self.events.push(OrchestratorEvent::RunStarted {
                trial_id,
                animated: true,
            });
            Ok(RunTicket {
                trial_id,
                row,
                animated: true,
                commit_at: Some(now + delay + self.timing.post_delay_ms),
            })
        } else {
            warn!(trial = %trial_id, status = ?self.adapter.status(), "animation unavailable, committing immediately");
            self.events.push(OrchestratorEvent::RunStarted {
                trial_id,
                animated: false,
            });
            self.commit(now, true);
            Ok(RunTicket {
                trial_id,
                row,
                animated: false,
                commit_at: None,
            })
        }
    }

    /// Remove a committed trial. Refused while a run is in flight.
    pub fn delete_trial(&mut self, trial_id: TrialId) -> bool {
        if self.is_running() {
            warn!(trial = %trial_id, "delete refused while a run is in flight");
            return false;
        }
        let Some(index) = self.trials.iter().position(|t| t.id == trial_id) else {
            warn!(trial = %trial_id, "delete of unknown trial");
            return false;
        };
        self.trials.remove(index);
        info!(trial = %trial_id, remaining = self.trials.len(), "trial deleted");
        self.events.push(OrchestratorEvent::TrialDeleted { trial_id });
        true
    }

    /// Fire due timers, advance the adapter's load and the announcer, and
    /// return what happened since the last call.
    pub fn tick(&mut self, now: Millis) -> Vec<OrchestratorEvent> {
        self.adapter.poll();

        loop {
            let fired = self.timers.drain_due(now);
            if fired.is_empty() {
                break;
            }
            for timer in fired {
                if timer.generation != self.generation {
                    debug!(generation = %timer.generation, "ignoring stale timer");
                    continue;
                }
                match timer.event {
                    RunTimer::AnimationFinished => {
                        if self.state == RunState::Playing {
                            self.state = RunState::CommittingPending;
                            self.timers.schedule(
                                timer.due,
                                self.timing.post_delay_ms,
                                self.generation,
                                RunTimer::Commit,
                            );
                        }
                    }
                    RunTimer::Commit => {
                        if self.state == RunState::CommittingPending {
                            self.commit(timer.due, false);
                        }
                    }
                    RunTimer::Announce(text) => self.announcer.announce(&text, timer.due),
                }
            }
        }

        self.announcer.tick(now);
        std::mem::take(&mut self.events)
    }

    /// Earliest time [`tick`](Self::tick) has work to do.
    pub fn next_due(&self) -> Option<Millis> {
        match (self.timers.next_due(), self.announcer.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn commit(&mut self, now: Millis, immediate: bool) {
        let Some(run) = self.pending.take() else {
            warn!("commit with no pending run");
            self.state = RunState::Idle;
            return;
        };

        let trial = Trial {
            id: run.trial_id,
            timestamp: Utc::now(),
            inputs: self.inputs.values().clone(),
            outputs: run.outputs,
        };
        self.trials.push(trial.clone());
        self.next_trial_id = run.trial_id.next();
        self.state = RunState::Committed;
        info!(trial = %run.trial_id, row = run.row, "trial committed");

        self.events.push(OrchestratorEvent::TrialCommitted {
            trial,
            row: run.row,
        });
        if !self.has_autoscrolled {
            self.has_autoscrolled = true;
            self.events.push(OrchestratorEvent::ScrollResultsIntoView);
        }

        let text = completion_announcement(run.trial_id, run.row);
        if immediate {
            self.timers.schedule(
                now,
                self.timing.fallback_announce_ms,
                self.generation,
                RunTimer::Announce(text),
            );
        } else {
            self.announcer.announce(&text, now);
        }
        self.state = RunState::Idle;
    }

    fn cancel_run(&mut self) {
        if let Some(run) = self.pending.take() {
            warn!(trial = %run.trial_id, "run cancelled");
            self.events.push(OrchestratorEvent::RunCancelled {
                trial_id: run.trial_id,
            });
        }
        self.adapter.stop();
        self.state = RunState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announce::LiveRegion;
    use ts_animation::HeadlessEngine;
    use ts_catalog::builtin_catalog;

    fn orchestrator() -> TrialOrchestrator<LiveRegion> {
        let catalog = builtin_catalog().unwrap();
        let engine = HeadlessEngine::for_simulation(catalog.get_simulation("plant-growth").unwrap());
        let mut orch = TrialOrchestrator::new(
            catalog,
            AnimationAdapter::new(Box::new(engine)),
            LiveRegion::default(),
            TimingConfig::default(),
        );
        orch.select_simulation("plant-growth").unwrap();
        orch
    }

    fn fill(orch: &mut TrialOrchestrator<LiveRegion>, level: &str) {
        for id in ["sunlightIntensity", "waterAmount", "soilNutrition"] {
            orch.set_input(id, level.into()).unwrap();
        }
    }

    #[test]
    fn incomplete_inputs_set_validation_error() {
        let mut orch = orchestrator();
        assert_eq!(orch.request_run(0), Err(RunError::IncompleteInputs));
        assert_eq!(orch.validation_error(), Some(INCOMPLETE_INPUTS_MESSAGE));
        assert_eq!(orch.state(), RunState::Idle);

        orch.set_input("sunlightIntensity", "Low".into()).unwrap();
        assert_eq!(orch.validation_error(), None);
    }

    #[test]
    fn commit_waits_for_pre_duration_and_post_delays() {
        let mut orch = orchestrator();
        fill(&mut orch, "High");
        let ticket = orch.request_run(0).unwrap();
        assert!(ticket.animated);
        assert_eq!(ticket.commit_at, Some(600 + 4000 + 800));
        assert_eq!(orch.state(), RunState::Playing);

        orch.tick(4600);
        assert_eq!(orch.state(), RunState::CommittingPending);
        orch.tick(5399);
        assert!(orch.trials().is_empty());
        orch.tick(5400);
        assert_eq!(orch.trials().len(), 1);
        assert_eq!(orch.state(), RunState::Idle);
    }

    #[test]
    fn a_single_late_tick_still_commits() {
        let mut orch = orchestrator();
        fill(&mut orch, "Low");
        orch.request_run(0).unwrap();
        let events = orch.tick(60_000);
        assert!(events
            .iter()
            .any(|e| matches!(e, OrchestratorEvent::TrialCommitted { row: 1, .. })));
    }

    #[test]
    fn inputs_and_runs_are_locked_while_running() {
        let mut orch = orchestrator();
        fill(&mut orch, "High");
        orch.request_run(0).unwrap();
        assert_eq!(
            orch.set_input("waterAmount", "Low".into()),
            Err(InputError::Running)
        );
        assert_eq!(orch.request_run(10), Err(RunError::AlreadyRunning));
    }

    #[test]
    fn unknown_simulation_leaves_nothing_active() {
        let mut orch = orchestrator();
        assert_eq!(
            orch.select_simulation("nope"),
            Err(RunError::SimulationNotFound("nope".to_string()))
        );
        assert!(orch.active_simulation().is_none());
        assert!(matches!(
            orch.request_run(0),
            Err(RunError::SimulationNotFound(_))
        ));
    }
}
