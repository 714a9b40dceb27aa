//! Boundary to the external animation engine.

use crate::error::{AnimationError, AnimationResult};

/// Progress of an asynchronous load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Pending,
    Ready,
    Failed(String),
}

/// A state-machine animation player driven by named numeric inputs.
///
/// Loading is asynchronous: [`begin_load`](AnimationEngine::begin_load)
/// starts it and [`poll_load`](AnimationEngine::poll_load) reports the
/// outcome. All other calls are only meaningful once loading reported
/// [`LoadStatus::Ready`].
pub trait AnimationEngine {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Start loading `resource` and instantiate `state_machine`.
    fn begin_load(&mut self, resource: &str, state_machine: &str) -> AnimationResult<()>;

    fn poll_load(&mut self) -> LoadStatus;

    /// State machines present in the loaded resource.
    fn state_machine_names(&self) -> Vec<String>;

    /// Names of the numeric inputs exposed by `state_machine`.
    fn input_names(&self, state_machine: &str) -> AnimationResult<Vec<String>>;

    fn set_named_input(&mut self, name: &str, value: f64) -> AnimationResult<()>;

    fn play(&mut self) -> AnimationResult<()>;

    fn stop(&mut self);

    /// Rewind to the initial frame. Input handles must be re-acquired after.
    ///
    /// Default implementation returns NotSupported.
    fn reset(&mut self) -> AnimationResult<()> {
        Err(AnimationError::NotSupported { what: "reset" })
    }

    fn is_playing(&self) -> bool;

    /// Match the drawing surface to its container.
    fn resize_to_container(&mut self, _width: f32, _height: f32) {}

    /// Release the loaded resource.
    fn unload(&mut self) {}
}
