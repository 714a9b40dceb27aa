//! Shared application service layer for trialscope.
//!
//! This crate holds everything both front ends need: configuration, the
//! input state, the trial orchestrator, the table animator and the screen
//! reader announcer. Nothing here draws or sleeps; callers own the clock and
//! call `tick`.

pub mod announce;
pub mod config;
pub mod error;
pub mod input_state;
pub mod orchestrator;
pub mod overflow;
pub mod prefs;
pub mod session;
pub mod table_animator;
pub mod trial;

pub use announce::{
    Announcer, GENERIC_DESCRIPTION, LiveRegion, completion_announcement, input_summary,
    start_announcement,
};
pub use config::{AppConfig, TimingConfig};
pub use error::{AppError, AppResult, INCOMPLETE_INPUTS_MESSAGE, InputError, RunError};
pub use input_state::InputState;
pub use orchestrator::{OrchestratorEvent, RunState, RunTicket, TrialOrchestrator};
pub use overflow::OverflowTracker;
pub use prefs::{PreferenceStore, ThemePreference, default_preferences_path};
pub use session::{Session, SessionEvent};
pub use table_animator::{
    AnimatorEvent, ContainerHeight, EMPTY_TABLE_TEXT, RowRender, RowSlot, TRAILING_ROW_TEXT,
    TableAnimator, TableBody, TableRenderState, TrailingRow,
};
pub use trial::{MISSING_CELL, Trial, header_cells};
