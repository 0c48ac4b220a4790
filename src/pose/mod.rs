pub mod landmark;
pub mod reference;

pub use landmark::{IndexedLandmark, Landmark, LandmarkFrame, LandmarkIndex};
pub use reference::{ReferencePose, ReferenceTarget, WorkoutPlan};
