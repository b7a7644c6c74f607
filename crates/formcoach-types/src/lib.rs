use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keypoints the form engine tracks.  Anything else a pose model reports is
/// ignored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl BodyPart {
    /// Every tracked keypoint, in MediaPipe index order.
    pub const ALL: [BodyPart; 8] = [
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftHip,
        BodyPart::RightHip,
        BodyPart::LeftKnee,
        BodyPart::RightKnee,
        BodyPart::LeftAnkle,
        BodyPart::RightAnkle,
    ];

    /// Slot of this keypoint in a 33-landmark MediaPipe Pose result.
    pub fn mediapipe_index(self) -> usize {
        match self {
            BodyPart::LeftShoulder => 11,
            BodyPart::RightShoulder => 12,
            BodyPart::LeftHip => 23,
            BodyPart::RightHip => 24,
            BodyPart::LeftKnee => 25,
            BodyPart::RightKnee => 26,
            BodyPart::LeftAnkle => 27,
            BodyPart::RightAnkle => 28,
        }
    }

    /// Inverse of [`BodyPart::mediapipe_index`].  Returns `None` for slots
    /// the engine does not track (face, arms, feet).
    pub fn from_mediapipe_index(index: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|part| part.mediapipe_index() == index)
    }
}

/// A single detected keypoint in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Landmark {
    /// Horizontal position, 0 = left edge, 1 = right edge.
    pub x: f64,
    /// Vertical position, 0 = top edge, 1 = bottom edge.
    pub y: f64,
    /// Model confidence that the keypoint is visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = Some(visibility);
        self
    }
}

/// All landmarks detected for one frame.  Missing entries mean the model did
/// not see that keypoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PoseSnapshot {
    landmarks: BTreeMap<BodyPart, Landmark>,
}

impl PoseSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a full MediaPipe Pose landmark list.
    ///
    /// Untracked slots are skipped; a short list simply leaves the missing
    /// tracked parts absent.
    pub fn from_mediapipe(landmarks: &[Landmark]) -> Self {
        landmarks
            .iter()
            .enumerate()
            .filter_map(|(i, lm)| BodyPart::from_mediapipe_index(i).map(|part| (part, *lm)))
            .collect()
    }

    /// Builder-style insert.
    pub fn with(mut self, part: BodyPart, landmark: Landmark) -> Self {
        self.insert(part, landmark);
        self
    }

    pub fn insert(&mut self, part: BodyPart, landmark: Landmark) {
        self.landmarks.insert(part, landmark);
    }

    pub fn get(&self, part: BodyPart) -> Option<&Landmark> {
        self.landmarks.get(&part)
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyPart, &Landmark)> {
        self.landmarks.iter().map(|(part, lm)| (*part, lm))
    }

    /// Drop every landmark whose reported visibility is below `threshold`.
    /// Landmarks without a visibility score are kept.
    pub fn retain_visible(&mut self, threshold: f64) {
        self.landmarks
            .retain(|_, lm| lm.visibility.is_none_or(|v| v >= threshold));
    }
}

impl FromIterator<(BodyPart, Landmark)> for PoseSnapshot {
    fn from_iter<I: IntoIterator<Item = (BodyPart, Landmark)>>(iter: I) -> Self {
        Self {
            landmarks: iter.into_iter().collect(),
        }
    }
}

/// The single form deviation reported for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Defect {
    None,
    BackRounded,
    InsufficientDepth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Correction,
    Encouragement,
}

/// A coaching cue handed to the voice/text channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub kind: FeedbackKind,
    pub message: String,
}

impl FeedbackEvent {
    pub fn correction(message: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Correction,
            message: message.into(),
        }
    }

    pub fn encouragement(message: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Encouragement,
            message: message.into(),
        }
    }
}

/// Error type shared by the coaching engine and its collaborators.
///
/// Missing landmarks and degenerate geometry are never errors; they are
/// resolved as data inside the perception layer.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CoachError {
    /// The pose model rejected a single frame.  The session continues.
    #[error("Detector Failure: {0}")]
    DetectorFailure(String),

    /// The pose model can no longer be used at all.
    #[error("Detector Unavailable: {0}")]
    DetectorUnavailable(String),

    /// The frame source (camera, recording) broke down.
    #[error("Frame Source Unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Feedback Sink Error: {0}")]
    Sink(String),

    #[error("Configuration Error: {0}")]
    Config(String),
}

impl CoachError {
    /// `true` for faults that only affect the current frame or message.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CoachError::DetectorFailure(_) | CoachError::Sink(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_part_mediapipe_index_roundtrip() {
        for part in BodyPart::ALL {
            assert_eq!(BodyPart::from_mediapipe_index(part.mediapipe_index()), Some(part));
        }
        assert_eq!(BodyPart::from_mediapipe_index(0), None); // nose
        assert_eq!(BodyPart::from_mediapipe_index(13), None); // left elbow
    }

    #[test]
    fn snapshot_from_mediapipe_picks_tracked_slots() {
        let landmarks: Vec<Landmark> = (0..33)
            .map(|i| Landmark::new(i as f64 / 100.0, 0.5))
            .collect();
        let snap = PoseSnapshot::from_mediapipe(&landmarks);
        assert_eq!(snap.len(), 8);
        let hip = snap.get(BodyPart::RightHip).unwrap();
        assert!((hip.x - 0.24).abs() < 1e-12);
    }

    #[test]
    fn snapshot_from_short_mediapipe_list_leaves_parts_absent() {
        let landmarks: Vec<Landmark> = (0..24).map(|_| Landmark::new(0.5, 0.5)).collect();
        let snap = PoseSnapshot::from_mediapipe(&landmarks);
        assert!(snap.get(BodyPart::LeftHip).is_some());
        assert!(snap.get(BodyPart::RightHip).is_none());
        assert!(snap.get(BodyPart::LeftAnkle).is_none());
    }

    #[test]
    fn retain_visible_drops_low_confidence_only() {
        let mut snap = PoseSnapshot::new()
            .with(BodyPart::LeftHip, Landmark::new(0.4, 0.6).with_visibility(0.9))
            .with(BodyPart::RightHip, Landmark::new(0.6, 0.6).with_visibility(0.2))
            .with(BodyPart::LeftKnee, Landmark::new(0.4, 0.8));
        snap.retain_visible(0.5);
        assert!(snap.get(BodyPart::LeftHip).is_some());
        assert!(snap.get(BodyPart::RightHip).is_none());
        assert!(snap.get(BodyPart::LeftKnee).is_some(), "no score means keep");
    }

    #[test]
    fn snapshot_json_uses_snake_case_keys() {
        let snap = PoseSnapshot::new().with(BodyPart::LeftShoulder, Landmark::new(0.1, 0.2));
        let json = serde_json::to_string(&snap).unwrap();
        assert_eq!(json, r#"{"left_shoulder":{"x":0.1,"y":0.2}}"#);
        let back: PoseSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn feedback_event_constructors_tag_kind() {
        assert_eq!(FeedbackEvent::correction("a").kind, FeedbackKind::Correction);
        assert_eq!(
            FeedbackEvent::encouragement("b").kind,
            FeedbackKind::Encouragement
        );
    }

    #[test]
    fn coach_error_display_and_recoverability() {
        let err = CoachError::DetectorFailure("bad frame".to_string());
        assert!(err.to_string().contains("Detector Failure"));
        assert!(err.is_recoverable());

        let err = CoachError::DetectorUnavailable("model gone".to_string());
        assert!(err.to_string().contains("model gone"));
        assert!(!err.is_recoverable());
    }
}
