pub mod animation_view;
pub mod input_panel;
pub mod notice;
pub mod trials_view;

pub use animation_view::AnimationView;
pub use input_panel::InputPanel;
pub use notice::show_max_trials_notice;
pub use trials_view::{ROW_HEIGHT, TrialsView};
