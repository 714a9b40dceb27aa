//! Failure-tolerant wrapper around an [`AnimationEngine`].

use tracing::{debug, error, info, warn};
use ts_catalog::SimulationDescriptor;
use ts_core::InputValueSet;

use crate::binding::bindings;
use crate::engine::{AnimationEngine, LoadStatus};
use crate::error::{AnimationError, AnimationResult};

/// Where the adapter is in its load lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterStatus {
    Unloaded,
    Loading,
    Ready,
    Failed(String),
}

/// Owns an engine and hides its quirks from the trial orchestrator.
///
/// A failed or missing animation never surfaces as an error to callers that
/// only need to know whether playback is available; see
/// [`AnimationAdapter::is_available`].
pub struct AnimationAdapter {
    engine: Box<dyn AnimationEngine>,
    status: AdapterStatus,
    resource: String,
    state_machine: String,
    input_handles: Vec<String>,
}

impl AnimationAdapter {
    pub fn new(engine: Box<dyn AnimationEngine>) -> Self {
        Self {
            engine,
            status: AdapterStatus::Unloaded,
            resource: String::new(),
            state_machine: String::new(),
            input_handles: Vec::new(),
        }
    }

    pub fn status(&self) -> &AdapterStatus {
        &self.status
    }

    /// True once the resource is loaded and playback can be requested.
    pub fn is_available(&self) -> bool {
        self.status == AdapterStatus::Ready
    }

    pub fn is_playing(&self) -> bool {
        self.is_available() && self.engine.is_playing()
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Start loading a resource. Failures are recorded in the status.
    pub fn load(&mut self, resource: &str, state_machine: &str) -> &AdapterStatus {
        self.unload();
        self.resource = resource.to_string();
        self.state_machine = state_machine.to_string();

        if resource.trim().is_empty() {
            let err = AnimationError::NoResource;
            warn!(engine = self.engine.name(), "{}", err);
            self.status = AdapterStatus::Failed(err.to_string());
            return &self.status;
        }

        info!(engine = self.engine.name(), resource, state_machine, "loading animation");
        match self.engine.begin_load(resource, state_machine) {
            Ok(()) => {
                self.status = AdapterStatus::Loading;
                self.poll();
            }
            Err(err) => {
                error!(resource, "failed to initialize animation: {}", err);
                self.status = AdapterStatus::Failed(err.to_string());
            }
        }
        &self.status
    }

    /// Drive an in-flight load forward.
    pub fn poll(&mut self) -> &AdapterStatus {
        if self.status != AdapterStatus::Loading {
            return &self.status;
        }

        match self.engine.poll_load() {
            LoadStatus::Pending => {}
            LoadStatus::Ready => {
                self.resolve_state_machine();
                self.acquire_inputs();
                info!(
                    resource = %self.resource,
                    state_machine = %self.state_machine,
                    inputs = ?self.input_handles,
                    "animation loaded"
                );
                self.status = AdapterStatus::Ready;
            }
            LoadStatus::Failed(message) => {
                error!(resource = %self.resource, "error loading animation: {}", message);
                self.status = AdapterStatus::Failed(message);
            }
        }
        &self.status
    }

    /// Drop the loaded resource and return to `Unloaded`.
    pub fn unload(&mut self) {
        if self.status == AdapterStatus::Ready && self.engine.is_playing() {
            self.engine.stop();
        }
        if self.status != AdapterStatus::Unloaded {
            self.engine.unload();
        }
        self.input_handles.clear();
        self.status = AdapterStatus::Unloaded;
    }

    /// Push current values into the engine. Returns how many inputs were set.
    pub fn set_inputs(
        &mut self,
        simulation: &SimulationDescriptor,
        values: &InputValueSet,
    ) -> usize {
        if !self.is_available() {
            return 0;
        }
        if self.input_handles.is_empty() {
            self.acquire_inputs();
        }

        let mut bound = 0;
        for binding in bindings(simulation, values) {
            if !self.input_handles.contains(&binding.animation_input) {
                warn!(name = %binding.animation_input, "could not find state machine input");
                continue;
            }
            match self
                .engine
                .set_named_input(&binding.animation_input, binding.value)
            {
                Ok(()) => {
                    debug!(name = %binding.animation_input, value = binding.value, "set state machine input");
                    bound += 1;
                }
                Err(err) => warn!(name = %binding.animation_input, "failed to set input: {}", err),
            }
        }
        bound
    }

    /// Bind inputs and start playback, restarting if already playing.
    pub fn play(
        &mut self,
        simulation: &SimulationDescriptor,
        values: &InputValueSet,
    ) -> AnimationResult<()> {
        self.ensure_ready()?;
        self.set_inputs(simulation, values);
        if self.engine.is_playing() {
            self.engine.stop();
        }
        self.engine.play()
    }

    /// Rewind and re-bind inputs without playing.
    pub fn reset(
        &mut self,
        simulation: &SimulationDescriptor,
        values: &InputValueSet,
    ) -> AnimationResult<()> {
        self.ensure_ready()?;
        match self.engine.reset() {
            Ok(()) => {
                self.acquire_inputs();
                self.set_inputs(simulation, values);
                Ok(())
            }
            Err(AnimationError::NotSupported { .. }) => {
                debug!("reset not available, stopping instead");
                if self.engine.is_playing() {
                    self.engine.stop();
                }
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Rewind, bind the current values and play from the start.
    ///
    /// If the engine cannot rewind, falls back to stop + rebind + play.
    pub fn reset_and_play(
        &mut self,
        simulation: &SimulationDescriptor,
        values: &InputValueSet,
    ) -> AnimationResult<()> {
        self.ensure_ready()?;
        if self.engine.is_playing() {
            self.engine.stop();
        }

        if let Err(err) = self.engine.reset() {
            warn!("reset failed ({}), restarting without rewind", err);
        }
        self.acquire_inputs();
        self.set_inputs(simulation, values);

        self.engine.play().inspect_err(|err| {
            error!("failed all animation restart attempts: {}", err);
        })
    }

    pub fn stop(&mut self) {
        if self.is_available() && self.engine.is_playing() {
            self.engine.stop();
        }
    }

    pub fn resize_to_container(&mut self, width: f32, height: f32) {
        if self.is_available() {
            self.engine.resize_to_container(width, height);
        }
    }

    fn ensure_ready(&self) -> AnimationResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(AnimationError::NotReady)
        }
    }

    fn resolve_state_machine(&mut self) {
        let names = self.engine.state_machine_names();
        if names.iter().any(|n| *n == self.state_machine) {
            return;
        }
        error!(
            state_machine = %self.state_machine,
            available = ?names,
            "state machine not found"
        );
        if let Some(first) = names.first() {
            warn!("falling back to first available state machine: {}", first);
            self.state_machine = first.clone();
        }
    }

    fn acquire_inputs(&mut self) {
        match self.engine.input_names(&self.state_machine) {
            Ok(names) => self.input_handles = names,
            Err(err) => {
                warn!("no state machine inputs found: {}", err);
                self.input_handles.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessEngine;
    use ts_catalog::builtin_catalog;

    fn plant() -> SimulationDescriptor {
        builtin_catalog()
            .unwrap()
            .get_simulation("plant-growth")
            .unwrap()
            .clone()
    }

    fn all_high() -> InputValueSet {
        [
            ("sunlightIntensity", "High"),
            ("waterAmount", "High"),
            ("soilNutrition", "High"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn load_then_reset_and_play_binds_inputs() {
        let sim = plant();
        let engine = HeadlessEngine::for_simulation(&sim);
        let probe = engine.probe();
        let mut adapter = AnimationAdapter::new(Box::new(engine));

        adapter.load(&sim.animation.resource, &sim.animation.state_machine);
        assert!(adapter.is_available());

        adapter.reset_and_play(&sim, &all_high()).unwrap();
        assert!(adapter.is_playing());
        assert_eq!(probe.input("sunlight_intensity"), Some(3.0));
        assert_eq!(probe.input("soil_nutrition"), Some(3.0));
        assert_eq!(probe.resets(), 1);
        assert_eq!(probe.plays(), 1);
    }

    #[test]
    fn empty_resource_fails_without_touching_engine() {
        let sim = plant();
        let engine = HeadlessEngine::for_simulation(&sim);
        let probe = engine.probe();
        let mut adapter = AnimationAdapter::new(Box::new(engine));

        assert!(matches!(adapter.load("  ", "SM"), AdapterStatus::Failed(_)));
        assert!(!adapter.is_available());
        assert_eq!(probe.loads(), 0);
        assert_eq!(
            adapter.reset_and_play(&sim, &all_high()),
            Err(AnimationError::NotReady)
        );
    }

    #[test]
    fn load_failure_is_recorded() {
        let sim = plant();
        let mut adapter =
            AnimationAdapter::new(Box::new(HeadlessEngine::failing("resource missing")));
        let status = adapter.load(&sim.animation.resource, &sim.animation.state_machine);
        assert!(matches!(status, AdapterStatus::Failed(msg) if msg.contains("resource missing")));
        assert_eq!(adapter.set_inputs(&sim, &all_high()), 0);
    }

    #[test]
    fn pending_load_becomes_ready_after_polls() {
        let sim = plant();
        let engine = HeadlessEngine::for_simulation(&sim).with_load_latency(2);
        let mut adapter = AnimationAdapter::new(Box::new(engine));

        assert_eq!(
            *adapter.load(&sim.animation.resource, &sim.animation.state_machine),
            AdapterStatus::Loading
        );
        assert_eq!(*adapter.poll(), AdapterStatus::Loading);
        assert_eq!(*adapter.poll(), AdapterStatus::Ready);
    }

    #[test]
    fn missing_state_machine_falls_back_to_first() {
        let sim = plant();
        let engine = HeadlessEngine::for_simulation(&sim).with_state_machines(["Main"]);
        let probe = engine.probe();
        let mut adapter = AnimationAdapter::new(Box::new(engine));
        adapter.load(&sim.animation.resource, "State_Machine_1");
        assert!(adapter.is_available());
        adapter.set_inputs(&sim, &all_high());
        assert_eq!(probe.input("water_intensity"), Some(3.0));
    }

    #[test]
    fn unknown_inputs_are_skipped() {
        let sim = plant();
        let engine = HeadlessEngine::new().with_inputs(["sunlight_intensity"]);
        let mut adapter = AnimationAdapter::new(Box::new(engine));
        adapter.load(&sim.animation.resource, &sim.animation.state_machine);
        assert_eq!(adapter.set_inputs(&sim, &all_high()), 1);
    }

    #[test]
    fn reset_without_rewind_support_still_plays() {
        let sim = plant();
        let engine = HeadlessEngine::for_simulation(&sim).without_reset();
        let probe = engine.probe();
        let mut adapter = AnimationAdapter::new(Box::new(engine));
        adapter.load(&sim.animation.resource, &sim.animation.state_machine);

        adapter.play(&sim, &all_high()).unwrap();
        adapter.reset_and_play(&sim, &all_high()).unwrap();
        assert!(probe.is_playing());
        assert_eq!(probe.plays(), 2);
        assert_eq!(probe.resets(), 0);
    }
}
