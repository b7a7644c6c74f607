//! Squat form classification.
//!
//! [`FormState::from_snapshot`] measures the angles the classifier needs:
//!
//! | Angle | Vertex | Endpoints |
//! |---|---|---|
//! | back (per side) | hip | shoulder, plumb point one unit above the hip |
//! | knee (per side) | knee | shoulder, ankle |
//!
//! The back angle is measured against the image vertical: a torso pointing
//! straight up the frame reads 0° and one hanging straight down reads 180°.
//! A fully extended leg reads 180° at the knee.  When a side's landmarks are
//! missing, or their geometry is degenerate, that angle is reported as
//! [`UNOBSERVED_ANGLE_DEG`].  Callers evaluating a frame with nobody in view
//! report [`Defect::None`] for it without calling [`classify`].
//!
//! [`classify`] then checks, in order:
//!
//! 1. mean back angle below [`BACK_ROUNDED_BELOW_DEG`] → [`Defect::BackRounded`]
//! 2. shallower knee above [`DEPTH_KNEE_ABOVE_DEG`] → [`Defect::InsufficientDepth`]
//! 3. otherwise [`Defect::None`]

use formcoach_types::{BodyPart, Defect, PoseSnapshot};

use crate::geometry::{Point2, measure_angle};

/// Mean back angle under which the back counts as rounded.
pub const BACK_ROUNDED_BELOW_DEG: f64 = 165.0;

/// A squat is too shallow while both knees stay above this angle.
pub const DEPTH_KNEE_ABOVE_DEG: f64 = 90.0;

/// Angle assumed for a joint that could not be measured.
pub const UNOBSERVED_ANGLE_DEG: f64 = 180.0;

/// Joint angles relevant to one frame's classification, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormState {
    /// Mean of the left and right back angles.
    pub back_angle: f64,
    pub left_knee: f64,
    pub right_knee: f64,
}

impl FormState {
    pub fn new(back_angle: f64, left_knee: f64, right_knee: f64) -> Self {
        Self {
            back_angle,
            left_knee,
            right_knee,
        }
    }

    /// The state of a frame in which nothing was observed.
    pub fn unobserved() -> Self {
        Self::new(UNOBSERVED_ANGLE_DEG, UNOBSERVED_ANGLE_DEG, UNOBSERVED_ANGLE_DEG)
    }

    /// Measure every angle from `snapshot`.
    pub fn from_snapshot(snapshot: &PoseSnapshot) -> Self {
        let back_left = back_angle(snapshot, BodyPart::LeftShoulder, BodyPart::LeftHip);
        let back_right = back_angle(snapshot, BodyPart::RightShoulder, BodyPart::RightHip);
        Self {
            back_angle: (back_left + back_right) / 2.0,
            left_knee: knee_angle(
                snapshot,
                BodyPart::LeftShoulder,
                BodyPart::LeftKnee,
                BodyPart::LeftAnkle,
            ),
            right_knee: knee_angle(
                snapshot,
                BodyPart::RightShoulder,
                BodyPart::RightKnee,
                BodyPart::RightAnkle,
            ),
        }
    }

    /// The smaller (deeper) of the two knee angles.
    pub fn deepest_knee(&self) -> f64 {
        self.left_knee.min(self.right_knee)
    }
}

/// Pick the single [`Defect`] for a frame.  First match wins.
pub fn classify(state: &FormState) -> Defect {
    if state.back_angle < BACK_ROUNDED_BELOW_DEG {
        Defect::BackRounded
    } else if state.deepest_knee() > DEPTH_KNEE_ABOVE_DEG {
        Defect::InsufficientDepth
    } else {
        Defect::None
    }
}

fn point(snapshot: &PoseSnapshot, part: BodyPart) -> Option<Point2> {
    snapshot.get(part).map(Point2::from)
}

fn back_angle(snapshot: &PoseSnapshot, shoulder: BodyPart, hip: BodyPart) -> f64 {
    match (point(snapshot, shoulder), point(snapshot, hip)) {
        (Some(shoulder), Some(hip)) => measure_angle(hip, shoulder, hip.above()),
        _ => None,
    }
    .unwrap_or(UNOBSERVED_ANGLE_DEG)
}

fn knee_angle(snapshot: &PoseSnapshot, shoulder: BodyPart, knee: BodyPart, ankle: BodyPart) -> f64 {
    match (
        point(snapshot, shoulder),
        point(snapshot, knee),
        point(snapshot, ankle),
    ) {
        (Some(shoulder), Some(knee), Some(ankle)) => measure_angle(knee, shoulder, ankle),
        _ => None,
    }
    .unwrap_or(UNOBSERVED_ANGLE_DEG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcoach_types::Landmark;

    fn side(
        snap: PoseSnapshot,
        parts: [BodyPart; 4],
        coords: [(f64, f64); 4],
    ) -> PoseSnapshot {
        parts
            .into_iter()
            .zip(coords)
            .fold(snap, |s, (part, (x, y))| s.with(part, Landmark::new(x, y)))
    }

    const LEFT: [BodyPart; 4] = [
        BodyPart::LeftShoulder,
        BodyPart::LeftHip,
        BodyPart::LeftKnee,
        BodyPart::LeftAnkle,
    ];
    const RIGHT: [BodyPart; 4] = [
        BodyPart::RightShoulder,
        BodyPart::RightHip,
        BodyPart::RightKnee,
        BodyPart::RightAnkle,
    ];

    /// Upright torso, shoulders over a deep knee bend.
    const RIGHT_DEEP_SQUAT: [(f64, f64); 4] = [(0.6, 0.3), (0.6, 0.6), (0.95, 0.6), (0.6, 0.9)];
    /// Upright, straight-legged stance.
    const LEFT_STANDING: [(f64, f64); 4] = [(0.4, 0.2), (0.4, 0.5), (0.4, 0.7), (0.4, 0.9)];
    /// Measures exactly 180° at both the back and the knee.
    const LEFT_ALIGNED: [(f64, f64); 4] = [(0.4, 0.9), (0.4, 0.5), (0.4, 0.5), (0.4, 0.1)];

    #[test]
    fn back_rounded_takes_priority_over_depth() {
        let state = FormState::new(150.0, 120.0, 120.0);
        assert_eq!(classify(&state), Defect::BackRounded);
    }

    #[test]
    fn shallow_knees_are_insufficient_depth() {
        let state = FormState::new(170.0, 100.0, 95.0);
        assert_eq!(classify(&state), Defect::InsufficientDepth);
    }

    #[test]
    fn deep_straight_squat_is_clean() {
        let state = FormState::new(170.0, 80.0, 70.0);
        assert_eq!(classify(&state), Defect::None);
    }

    #[test]
    fn one_deep_knee_is_enough() {
        let state = FormState::new(175.0, 150.0, 85.0);
        assert_eq!(classify(&state), Defect::None);
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(
            classify(&FormState::new(BACK_ROUNDED_BELOW_DEG, 80.0, 80.0)),
            Defect::None
        );
        assert_eq!(
            classify(&FormState::new(180.0, DEPTH_KNEE_ABOVE_DEG, DEPTH_KNEE_ABOVE_DEG)),
            Defect::None
        );
    }

    #[test]
    fn empty_snapshot_defaults_to_unobserved() {
        let state = FormState::from_snapshot(&PoseSnapshot::new());
        assert_eq!(state, FormState::unobserved());
    }

    #[test]
    fn upright_torso_reads_zero_against_vertical_reference() {
        let snap = side(PoseSnapshot::new(), LEFT, LEFT_STANDING);
        let state = FormState::from_snapshot(&snap);
        // Left side ~0°, absent right side 180°.
        assert!((state.back_angle - 90.0).abs() < 1e-1);
        assert!((state.left_knee - 180.0).abs() < 1e-2);
        assert_eq!(classify(&state), Defect::BackRounded);
    }

    #[test]
    fn aligned_side_measures_straight() {
        let snap = side(PoseSnapshot::new(), LEFT, LEFT_ALIGNED);
        let state = FormState::from_snapshot(&snap);
        assert!((state.back_angle - 180.0).abs() < 5e-2);
        assert!((state.left_knee - 180.0).abs() < 5e-2);
    }

    #[test]
    fn forward_lean_measures_offset_from_vertical() {
        // Shoulders 30° forward of the hips on both sides.
        let lean = (30f64).to_radians();
        let (dx, dy) = (0.3 * lean.sin(), 0.3 * lean.cos());
        let snap = PoseSnapshot::new()
            .with(BodyPart::LeftHip, Landmark::new(0.4, 0.6))
            .with(BodyPart::LeftShoulder, Landmark::new(0.4 + dx, 0.6 - dy))
            .with(BodyPart::RightHip, Landmark::new(0.6, 0.6))
            .with(BodyPart::RightShoulder, Landmark::new(0.6 + dx, 0.6 - dy));
        let state = FormState::from_snapshot(&snap);
        assert!((state.back_angle - 30.0).abs() < 1e-2);
        assert_eq!(classify(&state), Defect::BackRounded);
    }

    #[test]
    fn right_side_only_matches_aligned_left_side() {
        let right_only = side(PoseSnapshot::new(), RIGHT, RIGHT_DEEP_SQUAT);
        let both = side(right_only.clone(), LEFT, LEFT_ALIGNED);

        let partial = FormState::from_snapshot(&right_only);
        let full = FormState::from_snapshot(&both);

        assert_eq!(partial.left_knee, UNOBSERVED_ANGLE_DEG);
        assert!((partial.back_angle - full.back_angle).abs() < 5e-2);
        assert!((partial.left_knee - full.left_knee).abs() < 5e-2);
        assert_eq!(partial.right_knee, full.right_knee);
        assert_eq!(classify(&partial), classify(&full));
        // The upright right torso reads ~0° against the vertical reference.
        assert_eq!(classify(&partial), Defect::BackRounded);
    }

    #[test]
    fn degenerate_joint_counts_as_unobserved() {
        // Knee detected exactly on the ankle.
        let snap = PoseSnapshot::new()
            .with(BodyPart::LeftShoulder, Landmark::new(0.4, 0.2))
            .with(BodyPart::LeftKnee, Landmark::new(0.4, 0.9))
            .with(BodyPart::LeftAnkle, Landmark::new(0.4, 0.9));
        let state = FormState::from_snapshot(&snap);
        assert_eq!(state.left_knee, UNOBSERVED_ANGLE_DEG);
    }

    #[test]
    fn classification_is_idempotent() {
        let snap = side(PoseSnapshot::new(), RIGHT, RIGHT_DEEP_SQUAT);
        let first = FormState::from_snapshot(&snap);
        for _ in 0..5 {
            let again = FormState::from_snapshot(&snap);
            assert_eq!(again, first);
            assert_eq!(classify(&again), classify(&first));
        }
    }
}
