pub mod angle;
pub mod angle_smooth;
pub mod hold;
pub mod joints;
pub mod similarity;
pub mod smooth;

pub use angle::{angle_at, AngleExtractor, AngleSet};
pub use angle_smooth::AngleSmoother;
pub use hold::{HoldAccumulator, HoldPhase, HoldState};
pub use joints::{BodyFocusMode, Joint, JointAngleDefinition, PointRef, VIRTUAL_TORSO_OFFSET};
pub use similarity::{SimilarityResult, SimilarityScorer};
pub use smooth::LandmarkSmoother;
