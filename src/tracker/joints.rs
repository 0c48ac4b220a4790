//! Declarative joint-angle table per body-focus mode.
//!
//! Each joint is a triplet of point references; the angle is measured at the
//! middle point. Modes that cannot see part of the body substitute a virtual
//! point derived from a visible landmark.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pose::LandmarkIndex;
use crate::pose::LandmarkIndex as L;

/// Which part of the body participates in scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyFocusMode {
    #[default]
    Full,
    Upper,
    Lower,
}

impl fmt::Display for BodyFocusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Full => "full",
            Self::Upper => "upper",
            Self::Lower => "lower",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    LeftElbow,
    RightElbow,
    LeftShoulder,
    RightShoulder,
    LeftArmSpread,
    RightArmSpread,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Joint {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftArmSpread => "left_arm_spread",
            Self::RightArmSpread => "right_arm_spread",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Vertical distance (normalized image height) between a visible landmark and
/// the torso point it stands in for. Image Y grows downward.
pub const VIRTUAL_TORSO_OFFSET: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointRef {
    Real(LandmarkIndex),
    /// `base` shifted by `offset` (dx, dy, dz)
    Virtual { base: LandmarkIndex, offset: [f32; 3] },
}

impl PointRef {
    pub fn base(&self) -> LandmarkIndex {
        match *self {
            Self::Real(index) => index,
            Self::Virtual { base, .. } => base,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAngleDefinition {
    pub joint: Joint,
    pub points: [PointRef; 3],
}

const fn real(index: LandmarkIndex) -> PointRef {
    PointRef::Real(index)
}

const fn below(base: LandmarkIndex) -> PointRef {
    PointRef::Virtual {
        base,
        offset: [0.0, VIRTUAL_TORSO_OFFSET, 0.0],
    }
}

const fn above(base: LandmarkIndex) -> PointRef {
    PointRef::Virtual {
        base,
        offset: [0.0, -VIRTUAL_TORSO_OFFSET, 0.0],
    }
}

const fn def(joint: Joint, points: [PointRef; 3]) -> JointAngleDefinition {
    JointAngleDefinition { joint, points }
}

const LEFT_ELBOW: JointAngleDefinition =
    def(Joint::LeftElbow, [real(L::LeftShoulder), real(L::LeftElbow), real(L::LeftWrist)]);
const RIGHT_ELBOW: JointAngleDefinition =
    def(Joint::RightElbow, [real(L::RightShoulder), real(L::RightElbow), real(L::RightWrist)]);
const LEFT_KNEE: JointAngleDefinition =
    def(Joint::LeftKnee, [real(L::LeftHip), real(L::LeftKnee), real(L::LeftAnkle)]);
const RIGHT_KNEE: JointAngleDefinition =
    def(Joint::RightKnee, [real(L::RightHip), real(L::RightKnee), real(L::RightAnkle)]);

const FULL_BODY: [JointAngleDefinition; 8] = [
    LEFT_ELBOW,
    RIGHT_ELBOW,
    def(Joint::LeftShoulder, [real(L::LeftElbow), real(L::LeftShoulder), real(L::LeftHip)]),
    def(Joint::RightShoulder, [real(L::RightElbow), real(L::RightShoulder), real(L::RightHip)]),
    def(Joint::LeftHip, [real(L::LeftShoulder), real(L::LeftHip), real(L::LeftKnee)]),
    def(Joint::RightHip, [real(L::RightShoulder), real(L::RightHip), real(L::RightKnee)]),
    LEFT_KNEE,
    RIGHT_KNEE,
];

// Hips are assumed out of frame: a point below each shoulder replaces them
const UPPER_BODY: [JointAngleDefinition; 6] = [
    LEFT_ELBOW,
    RIGHT_ELBOW,
    def(Joint::LeftShoulder, [real(L::LeftElbow), real(L::LeftShoulder), below(L::LeftShoulder)]),
    def(Joint::RightShoulder, [real(L::RightElbow), real(L::RightShoulder), below(L::RightShoulder)]),
    def(Joint::LeftArmSpread, [real(L::RightShoulder), real(L::LeftShoulder), real(L::LeftElbow)]),
    def(Joint::RightArmSpread, [real(L::LeftShoulder), real(L::RightShoulder), real(L::RightElbow)]),
];

// Shoulders are assumed out of frame: a point above each hip replaces them
const LOWER_BODY: [JointAngleDefinition; 6] = [
    def(Joint::LeftHip, [above(L::LeftHip), real(L::LeftHip), real(L::LeftKnee)]),
    def(Joint::RightHip, [above(L::RightHip), real(L::RightHip), real(L::RightKnee)]),
    LEFT_KNEE,
    RIGHT_KNEE,
    def(Joint::LeftAnkle, [real(L::LeftKnee), real(L::LeftAnkle), real(L::LeftFootIndex)]),
    def(Joint::RightAnkle, [real(L::RightKnee), real(L::RightAnkle), real(L::RightFootIndex)]),
];

impl BodyFocusMode {
    pub fn definitions(&self) -> &'static [JointAngleDefinition] {
        match self {
            Self::Full => &FULL_BODY,
            Self::Upper => &UPPER_BODY,
            Self::Lower => &LOWER_BODY,
        }
    }

    pub fn joints(&self) -> impl Iterator<Item = Joint> {
        self.definitions().iter().map(|d| d.joint)
    }
}
