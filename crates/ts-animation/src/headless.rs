//! An engine with no drawing surface.
//!
//! Tracks load state, named inputs and play state exactly like a rendering
//! engine would, so the command line front end and tests can drive the
//! full trial lifecycle without a window.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use ts_catalog::SimulationDescriptor;

use crate::engine::{AnimationEngine, LoadStatus};
use crate::error::{AnimationError, AnimationResult};

#[derive(Debug, Default)]
struct HeadlessState {
    declared_inputs: Option<Vec<String>>,
    declared_state_machines: Option<Vec<String>>,
    fail_with: Option<String>,
    supports_reset: bool,
    load_latency: u32,
    polls_remaining: u32,
    loading: bool,
    loaded: Option<(String, String)>,
    inputs: BTreeMap<String, f64>,
    playing: bool,
    loads: u32,
    plays: u32,
    resets: u32,
}

pub struct HeadlessEngine {
    state: Rc<RefCell<HeadlessState>>,
}

/// Read-only view of a [`HeadlessEngine`] that stays usable after the
/// engine has been boxed into an adapter.
#[derive(Clone)]
pub struct HeadlessProbe {
    state: Rc<RefCell<HeadlessState>>,
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessEngine {
    /// Accepts any resource; exposes one state machine named as requested.
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(HeadlessState {
                supports_reset: true,
                ..HeadlessState::default()
            })),
        }
    }

    /// Exposes exactly the animation inputs the simulation binds.
    pub fn for_simulation(simulation: &SimulationDescriptor) -> Self {
        let names: Vec<String> = simulation
            .inputs
            .iter()
            .filter_map(|i| i.animation_input.clone())
            .collect();
        Self::new().with_inputs(names)
    }

    /// Every load fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        let engine = Self::new();
        engine.state.borrow_mut().fail_with = Some(message.into());
        engine
    }

    pub fn with_inputs<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.borrow_mut().declared_inputs =
            Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_state_machines<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.borrow_mut().declared_state_machines =
            Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Loads stay pending for `polls` calls to `poll_load`.
    pub fn with_load_latency(self, polls: u32) -> Self {
        self.state.borrow_mut().load_latency = polls;
        self
    }

    pub fn without_reset(self) -> Self {
        self.state.borrow_mut().supports_reset = false;
        self
    }

    pub fn probe(&self) -> HeadlessProbe {
        HeadlessProbe {
            state: Rc::clone(&self.state),
        }
    }
}

impl HeadlessProbe {
    pub fn input(&self, name: &str) -> Option<f64> {
        self.state.borrow().inputs.get(name).copied()
    }

    pub fn inputs(&self) -> BTreeMap<String, f64> {
        self.state.borrow().inputs.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    pub fn loaded_resource(&self) -> Option<String> {
        self.state.borrow().loaded.as_ref().map(|(r, _)| r.clone())
    }

    pub fn loads(&self) -> u32 {
        self.state.borrow().loads
    }

    pub fn plays(&self) -> u32 {
        self.state.borrow().plays
    }

    pub fn resets(&self) -> u32 {
        self.state.borrow().resets
    }
}

impl AnimationEngine for HeadlessEngine {
    fn name(&self) -> &str {
        "headless"
    }

    fn begin_load(&mut self, resource: &str, state_machine: &str) -> AnimationResult<()> {
        let mut s = self.state.borrow_mut();
        s.loads += 1;
        s.loaded = None;
        s.inputs.clear();
        s.playing = false;
        if let Some(message) = &s.fail_with {
            return Err(AnimationError::LoadFailed {
                resource: resource.to_string(),
                message: message.clone(),
            });
        }
        s.loading = true;
        s.polls_remaining = s.load_latency;
        s.loaded = Some((resource.to_string(), state_machine.to_string()));
        Ok(())
    }

    fn poll_load(&mut self) -> LoadStatus {
        let mut s = self.state.borrow_mut();
        if !s.loading {
            return if s.loaded.is_some() {
                LoadStatus::Ready
            } else {
                LoadStatus::Failed("nothing to load".to_string())
            };
        }
        if s.polls_remaining > 0 {
            s.polls_remaining -= 1;
            return LoadStatus::Pending;
        }
        s.loading = false;
        LoadStatus::Ready
    }

    fn state_machine_names(&self) -> Vec<String> {
        let s = self.state.borrow();
        match (&s.declared_state_machines, &s.loaded) {
            (Some(names), _) => names.clone(),
            (None, Some((_, requested))) => vec![requested.clone()],
            (None, None) => Vec::new(),
        }
    }

    fn input_names(&self, state_machine: &str) -> AnimationResult<Vec<String>> {
        if !self.state_machine_names().iter().any(|n| n == state_machine) {
            return Err(AnimationError::StateMachineMissing {
                name: state_machine.to_string(),
            });
        }
        let s = self.state.borrow();
        Ok(s.declared_inputs.clone().unwrap_or_default())
    }

    fn set_named_input(&mut self, name: &str, value: f64) -> AnimationResult<()> {
        let mut s = self.state.borrow_mut();
        let known = s
            .declared_inputs
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| n == name));
        if !known {
            return Err(AnimationError::UnknownInput {
                name: name.to_string(),
            });
        }
        s.inputs.insert(name.to_string(), value);
        Ok(())
    }

    fn play(&mut self) -> AnimationResult<()> {
        let mut s = self.state.borrow_mut();
        if s.loaded.is_none() || s.loading {
            return Err(AnimationError::NotReady);
        }
        s.playing = true;
        s.plays += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.state.borrow_mut().playing = false;
    }

    fn reset(&mut self) -> AnimationResult<()> {
        let mut s = self.state.borrow_mut();
        if !s.supports_reset {
            return Err(AnimationError::NotSupported { what: "reset" });
        }
        s.playing = false;
        s.inputs.clear();
        s.resets += 1;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    fn unload(&mut self) {
        let mut s = self.state.borrow_mut();
        s.loaded = None;
        s.loading = false;
        s.playing = false;
        s.inputs.clear();
    }
}
