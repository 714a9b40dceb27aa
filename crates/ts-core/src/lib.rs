//! ts-core: shared foundation for trialscope.
//!
//! Contains:
//! - ids (trial ids and run generations)
//! - timing (virtual millisecond clock + cancellable timer queue)
//! - values (scalar input values, input/output maps)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod timing;
pub mod values;

pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use timing::{Fired, Millis, TimerId, TimerQueue};
pub use values::*;
