//! ts-animation: boundary to the state-machine animation player.
//!
//! The engine itself is external. This crate defines the narrow interface
//! the rest of trialscope talks to ([`AnimationEngine`]), the policy that
//! turns input values into numeric engine inputs ([`binding`]), and the
//! [`AnimationAdapter`] that tracks load state and degrades gracefully when
//! the resource is missing or the engine misbehaves.

pub mod adapter;
pub mod binding;
pub mod engine;
pub mod error;
pub mod headless;

pub use adapter::{AdapterStatus, AnimationAdapter};
pub use binding::{Binding, bindings, numeric_value};
pub use engine::{AnimationEngine, LoadStatus};
pub use error::{AnimationError, AnimationResult};
pub use headless::{HeadlessEngine, HeadlessProbe};
