pub mod controller;
pub mod event;
pub mod summary;

pub use controller::{SessionController, SessionState};
pub use event::SessionEvent;
pub use summary::{mean_accuracy, PoseResult, WorkoutSummary, CHALLENGING_ACCURACY};
