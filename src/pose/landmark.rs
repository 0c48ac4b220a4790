use serde::{Deserialize, Serialize};

/// BlazePose 33-point landmark indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;

    const ALL: [LandmarkIndex; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// A single normalized landmark estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Normalized X (0.0..1.0, left to right)
    pub x: f32,
    /// Normalized Y (0.0..1.0, top to bottom)
    pub y: f32,
    /// Relative depth, same scale as x
    pub z: f32,
    /// Detector visibility (0.0..1.0)
    #[serde(default = "default_visibility")]
    pub visibility: f32,
}

fn default_visibility() -> f32 {
    1.0
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }

    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility >= threshold
    }

    pub fn position(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Landmark as persisted by the storage side: index plus coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexedLandmark {
    pub index: usize,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default = "default_visibility")]
    pub visibility: f32,
}

/// One detection cycle, normalized to a fixed 33-slot array.
/// `None` marks a point the detector did not report.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    pub landmarks: [Option<Landmark>; LandmarkIndex::COUNT],
}

impl LandmarkFrame {
    pub fn new(landmarks: [Option<Landmark>; LandmarkIndex::COUNT]) -> Self {
        Self { landmarks }
    }

    pub fn empty() -> Self {
        Self {
            landmarks: [None; LandmarkIndex::COUNT],
        }
    }

    /// Builds a frame from a detector's ordered list; entries past 33 are dropped.
    pub fn from_slice(points: &[Landmark]) -> Self {
        let mut frame = Self::empty();
        for (slot, lm) in frame.landmarks.iter_mut().zip(points) {
            *slot = Some(*lm);
        }
        frame
    }

    /// Builds a frame from stored `{index, x, y, z, visibility}` entries.
    /// Returns the first out-of-range index as the error.
    pub fn from_indexed(points: &[IndexedLandmark]) -> Result<Self, usize> {
        let mut frame = Self::empty();
        for p in points {
            let slot = frame.landmarks.get_mut(p.index).ok_or(p.index)?;
            *slot = Some(Landmark::new(p.x, p.y, p.z, p.visibility));
        }
        Ok(frame)
    }

    pub fn get(&self, index: LandmarkIndex) -> Option<&Landmark> {
        self.landmarks[index as usize].as_ref()
    }

    pub fn set(&mut self, index: LandmarkIndex, landmark: Landmark) {
        self.landmarks[index as usize] = Some(landmark);
    }

    pub fn present_count(&self) -> usize {
        self.landmarks.iter().filter(|l| l.is_some()).count()
    }
}

impl Default for LandmarkFrame {
    fn default() -> Self {
        Self::empty()
    }
}
