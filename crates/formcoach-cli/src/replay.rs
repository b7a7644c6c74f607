//! Recorded-session playback.
//!
//! A recording is a JSON Lines file, one detector result per frame:
//!
//! ```text
//! {"width":640,"height":480,"landmarks":{"left_hip":{"x":0.41,"y":0.62,"visibility":0.93}, ...}}
//! {"width":640,"height":480,"mediapipe":[{"x":0.5,"y":0.1}, ... 33 entries]}
//! {"width":640,"height":480}
//! {"width":640,"height":480,"error":"inference timed out"}
//! ```
//!
//! The third line is a frame with nobody in view, the fourth a detector
//! failure.  Blank lines and lines starting with `#` are skipped.
//!
//! [`load_recording`] splits a recording into a [`ReplaySource`] (frame
//! geometry and timing) and a [`ReplayDetector`] (the recorded results), so
//! the engine sees the same collaborator boundaries it would with a live
//! camera and model.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use formcoach_runtime::{FeedbackSink, FrameSource, PoseDetector, VideoFrame};
use formcoach_types::{CoachError, FeedbackEvent, FeedbackKind, Landmark, PoseSnapshot};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

type Detection = Result<Option<PoseSnapshot>, CoachError>;

// ─────────────────────────────────────────────────────────────────────────────
// Recording format
// ─────────────────────────────────────────────────────────────────────────────

/// One line of a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReplayRecord {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Landmarks keyed by body part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<PoseSnapshot>,
    /// Raw 33-entry MediaPipe Pose landmark list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mediapipe: Option<Vec<Landmark>>,
    /// Simulated detector failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplayRecord {
    /// The detector outcome this record stands for.
    pub fn detection(&self) -> Detection {
        if let Some(reason) = &self.error {
            return Err(CoachError::DetectorFailure(reason.clone()));
        }
        Ok(match (&self.landmarks, &self.mediapipe) {
            (Some(snapshot), _) => Some(snapshot.clone()),
            (None, Some(raw)) => Some(PoseSnapshot::from_mediapipe(raw)),
            (None, None) => None,
        })
    }
}

/// Parse a whole recording.
pub fn parse_recording(text: &str) -> Result<Vec<ReplayRecord>, String> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let t = line.trim();
            !t.is_empty() && !t.starts_with('#')
        })
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| format!("line {}: {}", i + 1, e))
        })
        .collect()
}

/// Read and split the recording at `path`.
///
/// `fps` sets both the frame timestamps and the simulated inference delay;
/// `0` replays without delay.
pub fn load_recording(path: &Path, fps: u32) -> Result<(ReplaySource, ReplayDetector), String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read recording at {}: {}", path.display(), e))?;
    let records = parse_recording(&raw)?;
    Ok(split_recording(&records, fps))
}

pub fn split_recording(records: &[ReplayRecord], fps: u32) -> (ReplaySource, ReplayDetector) {
    let interval = if fps == 0 {
        Duration::ZERO
    } else {
        Duration::from_secs(1) / fps
    };
    let source = ReplaySource {
        frames: records.iter().map(|r| (r.width, r.height)).collect(),
        interval,
        emitted: 0,
    };
    let detector = ReplayDetector {
        results: records.iter().map(ReplayRecord::detection).collect(),
        latency: interval,
    };
    (source, detector)
}

// ─────────────────────────────────────────────────────────────────────────────
// Collaborators
// ─────────────────────────────────────────────────────────────────────────────

/// Yields one pixel-less frame per recorded line.
pub struct ReplaySource {
    frames: VecDeque<(u32, u32)>,
    interval: Duration,
    emitted: u32,
}

impl ReplaySource {
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, CoachError> {
        let Some((width, height)) = self.frames.pop_front() else {
            return Ok(None);
        };
        let timestamp = self.interval * self.emitted;
        self.emitted += 1;
        Ok(Some(VideoFrame::empty(width, height, timestamp)))
    }
}

/// Hands back the recorded results in order, after the configured delay.
pub struct ReplayDetector {
    results: VecDeque<Detection>,
    latency: Duration,
}

#[async_trait]
impl PoseDetector for ReplayDetector {
    async fn detect(&mut self, _frame: &VideoFrame) -> Detection {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.results.pop_front().unwrap_or_else(|| {
            Err(CoachError::DetectorUnavailable(
                "recording has no result for this frame".to_string(),
            ))
        })
    }
}

/// Prints cues to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    delivered: usize,
}

impl ConsoleSink {
    pub fn delivered(&self) -> usize {
        self.delivered
    }
}

impl FeedbackSink for ConsoleSink {
    fn deliver(&mut self, event: &FeedbackEvent) -> Result<(), CoachError> {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        let line = match event.kind {
            FeedbackKind::Correction => format!("▶ {}", event.message).yellow().bold(),
            FeedbackKind::Encouragement => format!("★ {}", event.message).green().bold(),
        };
        println!("  {} {}", format!("[{stamp}]").dimmed(), line);
        self.delivered += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcoach_types::BodyPart;

    const RECORDING: &str = r#"
# squat, three frames
{"width":640,"height":480,"landmarks":{"left_hip":{"x":0.4,"y":0.6,"visibility":0.9}}}
{"width":640,"height":480}

{"width":320,"height":240,"error":"inference timed out"}
"#;

    #[test]
    fn parses_records_and_skips_comments() {
        let records = parse_recording(RECORDING).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].width, 320);
    }

    #[test]
    fn parse_error_reports_line_number() {
        let err = parse_recording("{\"width\":1,\"height\":1}\nnot json").unwrap_err();
        assert!(err.starts_with("line 2"));
    }

    #[test]
    fn records_map_to_detector_outcomes() {
        let records = parse_recording(RECORDING).unwrap();

        let person = records[0].detection().unwrap().unwrap();
        assert!(person.get(BodyPart::LeftHip).is_some());

        assert_eq!(records[1].detection(), Ok(None));

        assert_eq!(
            records[2].detection(),
            Err(CoachError::DetectorFailure("inference timed out".to_string()))
        );
    }

    #[test]
    fn mediapipe_list_is_mapped_by_index() {
        let mut raw = vec![Landmark::new(0.0, 0.0); 33];
        raw[26] = Landmark::new(0.7, 0.8);
        let record = ReplayRecord {
            width: 10,
            height: 10,
            landmarks: None,
            mediapipe: Some(raw),
            error: None,
        };
        let snap = record.detection().unwrap().unwrap();
        assert_eq!(snap.get(BodyPart::RightKnee), Some(&Landmark::new(0.7, 0.8)));
        assert_eq!(snap.len(), 8);
    }

    #[test]
    fn source_timestamps_follow_fps() {
        let records = parse_recording(RECORDING).unwrap();
        let (mut source, _) = split_recording(&records, 10);
        let first = source.next_frame().unwrap().unwrap();
        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(first.timestamp, Duration::ZERO);
        assert_eq!(second.timestamp, Duration::from_millis(100));
        assert_eq!(source.remaining(), 1);
        source.next_frame().unwrap();
        assert!(source.next_frame().unwrap().is_none());
    }

    #[tokio::test]
    async fn detector_replays_in_order_then_reports_unavailable() {
        let records = parse_recording(RECORDING).unwrap();
        let (_, mut detector) = split_recording(&records, 0);
        let frame = VideoFrame::empty(640, 480, Duration::ZERO);

        assert!(detector.detect(&frame).await.unwrap().is_some());
        assert!(detector.detect(&frame).await.unwrap().is_none());
        assert!(matches!(
            detector.detect(&frame).await,
            Err(CoachError::DetectorFailure(_))
        ));
        assert!(matches!(
            detector.detect(&frame).await,
            Err(CoachError::DetectorUnavailable(_))
        ));
    }

    #[test]
    fn console_sink_counts_deliveries() {
        let mut sink = ConsoleSink::default();
        sink.deliver(&FeedbackEvent::correction("knees out")).unwrap();
        assert_eq!(sink.delivered(), 1);
    }
}
