use nalgebra::Vector3;
use std::collections::BTreeMap;

use super::joints::{BodyFocusMode, Joint, JointAngleDefinition, PointRef};
use crate::pose::LandmarkFrame;

/// Joint name -> angle in degrees. Joints that could not be measured are absent.
pub type AngleSet = BTreeMap<Joint, f32>;

/// Squared length below which a limb vector is treated as degenerate
const MIN_VECTOR_NORM_SQUARED: f32 = 1e-12;

/// Angle at `b` between the rays b->a and b->c, in degrees.
/// `None` if either ray has zero length.
pub fn angle_at(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> Option<f32> {
    let v1 = a - b;
    let v2 = c - b;
    let n1 = v1.norm_squared();
    let n2 = v2.norm_squared();
    if n1 < MIN_VECTOR_NORM_SQUARED || n2 < MIN_VECTOR_NORM_SQUARED {
        return None;
    }
    let cos = (v1.dot(&v2) / (n1.sqrt() * n2.sqrt())).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Computes the mode's joint angles from a (smoothed) landmark frame
pub struct AngleExtractor {
    /// Landmarks below this visibility are treated as absent
    min_visibility: f32,
}

impl AngleExtractor {
    pub fn new(min_visibility: f32) -> Self {
        Self { min_visibility }
    }

    pub fn extract(&self, frame: &LandmarkFrame, mode: BodyFocusMode) -> AngleSet {
        mode.definitions()
            .iter()
            .filter_map(|def| self.measure(frame, def).map(|angle| (def.joint, angle)))
            .collect()
    }

    fn measure(&self, frame: &LandmarkFrame, def: &JointAngleDefinition) -> Option<f32> {
        let [a, b, c] = def.points;
        angle_at(
            self.resolve(frame, a)?,
            self.resolve(frame, b)?,
            self.resolve(frame, c)?,
        )
    }

    fn resolve(&self, frame: &LandmarkFrame, point: PointRef) -> Option<Vector3<f32>> {
        let base = frame
            .get(point.base())
            .filter(|lm| lm.is_visible(self.min_visibility))?;
        let position = Vector3::from(base.position());
        match point {
            PointRef::Real(_) => Some(position),
            PointRef::Virtual { offset, .. } => Some(position + Vector3::from(offset)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Landmark, LandmarkIndex};
    use crate::tracker::VIRTUAL_TORSO_OFFSET;

    fn approx_eq_f32(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    fn v(x: f32, y: f32) -> Vector3<f32> {
        Vector3::new(x, y, 0.0)
    }

    fn set(frame: &mut LandmarkFrame, index: LandmarkIndex, x: f32, y: f32) {
        frame.set(index, Landmark::new(x, y, 0.0, 0.9));
    }

    /// Standing, arms straight down, legs straight
    fn standing_frame() -> LandmarkFrame {
        let mut f = LandmarkFrame::empty();
        set(&mut f, LandmarkIndex::LeftShoulder, 0.6, 0.3);
        set(&mut f, LandmarkIndex::RightShoulder, 0.4, 0.3);
        set(&mut f, LandmarkIndex::LeftElbow, 0.6, 0.45);
        set(&mut f, LandmarkIndex::RightElbow, 0.4, 0.45);
        set(&mut f, LandmarkIndex::LeftWrist, 0.6, 0.6);
        set(&mut f, LandmarkIndex::RightWrist, 0.4, 0.6);
        set(&mut f, LandmarkIndex::LeftHip, 0.58, 0.55);
        set(&mut f, LandmarkIndex::RightHip, 0.42, 0.55);
        set(&mut f, LandmarkIndex::LeftKnee, 0.58, 0.72);
        set(&mut f, LandmarkIndex::RightKnee, 0.42, 0.72);
        set(&mut f, LandmarkIndex::LeftAnkle, 0.58, 0.9);
        set(&mut f, LandmarkIndex::RightAnkle, 0.42, 0.9);
        set(&mut f, LandmarkIndex::LeftFootIndex, 0.62, 0.93);
        set(&mut f, LandmarkIndex::RightFootIndex, 0.38, 0.93);
        f
    }

    #[test]
    fn test_angle_right_angle() {
        let angle = angle_at(v(1.0, 0.0), v(0.0, 0.0), v(0.0, 1.0)).unwrap();
        assert!(approx_eq_f32(angle, 90.0, 1e-4));
    }

    #[test]
    fn test_angle_straight_line() {
        let angle = angle_at(v(0.0, 0.0), v(0.0, 0.5), v(0.0, 1.0)).unwrap();
        assert!(approx_eq_f32(angle, 180.0, 0.1));
        assert!(!angle.is_nan());
    }

    #[test]
    fn test_angle_collinear_same_side() {
        let angle = angle_at(v(0.0, 1.0), v(0.0, 0.0), v(0.0, 2.0)).unwrap();
        assert!(approx_eq_f32(angle, 0.0, 0.1));
    }

    #[test]
    fn test_angle_degenerate_is_none() {
        assert!(angle_at(v(0.5, 0.5), v(0.5, 0.5), v(0.0, 1.0)).is_none());
        assert!(angle_at(v(0.0, 1.0), v(0.5, 0.5), v(0.5, 0.5)).is_none());
    }

    #[test]
    fn test_full_body_all_joints() {
        let extractor = AngleExtractor::new(0.5);
        let angles = extractor.extract(&standing_frame(), BodyFocusMode::Full);
        assert_eq!(angles.len(), 8);
        assert!(approx_eq_f32(angles[&Joint::LeftElbow], 180.0, 0.1));
        assert!(approx_eq_f32(angles[&Joint::LeftKnee], 180.0, 0.1));
    }

    #[test]
    fn test_missing_landmark_omits_joint() {
        let extractor = AngleExtractor::new(0.5);
        let mut frame = standing_frame();
        frame.landmarks[LandmarkIndex::LeftWrist as usize] = None;
        let angles = extractor.extract(&frame, BodyFocusMode::Full);
        assert!(!angles.contains_key(&Joint::LeftElbow));
        assert!(angles.contains_key(&Joint::RightElbow));
        assert_eq!(angles.len(), 7);
    }

    #[test]
    fn test_low_visibility_omits_joint() {
        let extractor = AngleExtractor::new(0.5);
        let mut frame = standing_frame();
        frame.set(LandmarkIndex::RightKnee, Landmark::new(0.42, 0.72, 0.0, 0.1));
        let angles = extractor.extract(&frame, BodyFocusMode::Full);
        assert!(!angles.contains_key(&Joint::RightKnee));
        assert!(!angles.contains_key(&Joint::RightHip));
    }

    #[test]
    fn test_upper_body_uses_virtual_hip() {
        let extractor = AngleExtractor::new(0.5);
        let mut frame = standing_frame();
        for index in [LandmarkIndex::LeftHip, LandmarkIndex::RightHip] {
            frame.landmarks[index as usize] = None;
        }
        let angles = extractor.extract(&frame, BodyFocusMode::Upper);
        assert_eq!(angles.len(), 6);
        // Arm hanging straight down: elbow and virtual hip lie on the same ray
        assert!(approx_eq_f32(angles[&Joint::LeftShoulder], 0.0, 0.1));
    }

    #[test]
    fn test_upper_body_raised_arm() {
        let extractor = AngleExtractor::new(0.5);
        let mut frame = standing_frame();
        // Left arm straight out to the side
        set(&mut frame, LandmarkIndex::LeftElbow, 0.75, 0.3);
        set(&mut frame, LandmarkIndex::LeftWrist, 0.9, 0.3);
        let angles = extractor.extract(&frame, BodyFocusMode::Upper);
        assert!(approx_eq_f32(angles[&Joint::LeftShoulder], 90.0, 1e-2));
        assert!(approx_eq_f32(angles[&Joint::LeftArmSpread], 180.0, 0.1));
    }

    #[test]
    fn test_lower_body_uses_virtual_shoulder() {
        let extractor = AngleExtractor::new(0.5);
        let mut frame = standing_frame();
        for index in [LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder] {
            frame.landmarks[index as usize] = None;
        }
        let angles = extractor.extract(&frame, BodyFocusMode::Lower);
        assert_eq!(angles.len(), 6);
        assert!(approx_eq_f32(angles[&Joint::LeftHip], 180.0, 0.1));
    }

    #[test]
    fn test_virtual_point_position() {
        let extractor = AngleExtractor::new(0.5);
        let mut frame = LandmarkFrame::empty();
        set(&mut frame, LandmarkIndex::LeftShoulder, 0.6, 0.3);
        set(&mut frame, LandmarkIndex::LeftHip, 0.6, 0.55);

        let below = PointRef::Virtual {
            base: LandmarkIndex::LeftShoulder,
            offset: [0.0, VIRTUAL_TORSO_OFFSET, 0.0],
        };
        let p = extractor.resolve(&frame, below).unwrap();
        assert!(approx_eq_f32(p.x, 0.6, 1e-6));
        assert!(approx_eq_f32(p.y, 0.5, 1e-6));
        assert!(approx_eq_f32(p.z, 0.0, 1e-6));

        let above = PointRef::Virtual {
            base: LandmarkIndex::LeftHip,
            offset: [0.0, -VIRTUAL_TORSO_OFFSET, 0.0],
        };
        let p = extractor.resolve(&frame, above).unwrap();
        assert!(approx_eq_f32(p.y, 0.35, 1e-6));
    }

    #[test]
    fn test_virtual_point_needs_visible_base() {
        let extractor = AngleExtractor::new(0.5);
        let mut frame = LandmarkFrame::empty();
        frame.set(LandmarkIndex::LeftShoulder, Landmark::new(0.6, 0.3, 0.0, 0.1));
        let below = PointRef::Virtual {
            base: LandmarkIndex::LeftShoulder,
            offset: [0.0, VIRTUAL_TORSO_OFFSET, 0.0],
        };
        assert!(extractor.resolve(&frame, below).is_none());
    }

    #[test]
    fn test_empty_frame_no_angles() {
        let extractor = AngleExtractor::new(0.5);
        assert!(extractor.extract(&LandmarkFrame::empty(), BodyFocusMode::Full).is_empty());
    }
}
