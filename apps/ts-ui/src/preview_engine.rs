//! Animation engine drawn with egui.
//!
//! Understands `builtin:` resources (and any local file, shown as a generic
//! progress animation). Anything else fails to load, which leaves the app in
//! its no-animation mode.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use ts_animation::{AnimationEngine, AnimationError, AnimationResult, LoadStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreviewKind {
    #[default]
    None,
    Plant,
    Weather,
    Generic,
}

#[derive(Default)]
struct PreviewState {
    kind: PreviewKind,
    state_machine: String,
    declared_inputs: Vec<String>,
    inputs: BTreeMap<String, f64>,
    playing: bool,
    play_started: Option<Instant>,
}

pub struct PreviewEngine {
    state: Rc<RefCell<PreviewState>>,
}

/// Shared view of the engine for drawing.
#[derive(Clone)]
pub struct PreviewHandle {
    state: Rc<RefCell<PreviewState>>,
}

/// What the animation view needs for one frame.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub kind: PreviewKind,
    pub inputs: BTreeMap<String, f64>,
    pub playing: bool,
    pub elapsed: Option<Duration>,
}

impl PreviewEngine {
    pub fn new() -> (Self, PreviewHandle) {
        let state = Rc::new(RefCell::new(PreviewState::default()));
        (
            Self {
                state: Rc::clone(&state),
            },
            PreviewHandle { state },
        )
    }
}

impl PreviewHandle {
    /// Inputs the next loaded state machine exposes.
    pub fn declare_inputs<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.borrow_mut().declared_inputs = names.into_iter().map(Into::into).collect();
    }

    pub fn frame(&self) -> PreviewFrame {
        let s = self.state.borrow();
        PreviewFrame {
            kind: s.kind,
            inputs: s.inputs.clone(),
            playing: s.playing,
            elapsed: s.play_started.map(|t| t.elapsed()),
        }
    }
}

fn kind_for(resource: &str) -> Option<PreviewKind> {
    if let Some(name) = resource.strip_prefix("builtin:") {
        return Some(match name {
            "plant_growth" => PreviewKind::Plant,
            "weather" => PreviewKind::Weather,
            _ => PreviewKind::Generic,
        });
    }
    Path::new(resource).is_file().then_some(PreviewKind::Generic)
}

impl AnimationEngine for PreviewEngine {
    fn name(&self) -> &str {
        "egui-preview"
    }

    fn begin_load(&mut self, resource: &str, state_machine: &str) -> AnimationResult<()> {
        let mut s = self.state.borrow_mut();
        s.inputs.clear();
        s.playing = false;
        s.play_started = None;
        let Some(kind) = kind_for(resource) else {
            s.kind = PreviewKind::None;
            return Err(AnimationError::LoadFailed {
                resource: resource.to_string(),
                message: "resource is not available to the preview engine".to_string(),
            });
        };
        s.kind = kind;
        s.state_machine = state_machine.to_string();
        Ok(())
    }

    fn poll_load(&mut self) -> LoadStatus {
        match self.state.borrow().kind {
            PreviewKind::None => LoadStatus::Failed("nothing loaded".to_string()),
            _ => LoadStatus::Ready,
        }
    }

    fn state_machine_names(&self) -> Vec<String> {
        vec![self.state.borrow().state_machine.clone()]
    }

    fn input_names(&self, state_machine: &str) -> AnimationResult<Vec<String>> {
        let s = self.state.borrow();
        if s.state_machine != state_machine {
            return Err(AnimationError::StateMachineMissing {
                name: state_machine.to_string(),
            });
        }
        Ok(s.declared_inputs.clone())
    }

    fn set_named_input(&mut self, name: &str, value: f64) -> AnimationResult<()> {
        let mut s = self.state.borrow_mut();
        if !s.declared_inputs.iter().any(|n| n == name) {
            return Err(AnimationError::UnknownInput {
                name: name.to_string(),
            });
        }
        s.inputs.insert(name.to_string(), value);
        Ok(())
    }

    fn play(&mut self) -> AnimationResult<()> {
        let mut s = self.state.borrow_mut();
        if s.kind == PreviewKind::None {
            return Err(AnimationError::NotReady);
        }
        s.playing = true;
        s.play_started = Some(Instant::now());
        Ok(())
    }

    fn stop(&mut self) {
        self.state.borrow_mut().playing = false;
    }

    fn reset(&mut self) -> AnimationResult<()> {
        let mut s = self.state.borrow_mut();
        s.playing = false;
        s.play_started = None;
        s.inputs.clear();
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    fn resize_to_container(&mut self, width: f32, height: f32) {
        // Drawing reads its size from the layout each frame.
        tracing::debug!(width, height, "preview resized");
    }

    fn unload(&mut self) {
        let mut s = self.state.borrow_mut();
        s.kind = PreviewKind::None;
        s.inputs.clear();
        s.playing = false;
        s.play_started = None;
    }
}
