//! Boundaries to the collaborators the engine does not own.
//!
//! - [`FrameSource`] – camera or recording that hands over frames.
//! - [`PoseDetector`] – the pose-estimation model.  Its `detect` call is the
//!   only point where a frame evaluation suspends.
//! - [`FeedbackSink`] – the voice/text channel that receives cues.
//!
//! [`BroadcastSink`] is the stock sink: it fans cues out over a Tokio
//! broadcast channel and never waits on a listener.

use std::time::Duration;

use async_trait::async_trait;
use formcoach_types::{CoachError, FeedbackEvent, PoseSnapshot};
use tokio::sync::broadcast;

/// Default number of cues buffered for slow [`BroadcastSink`] subscribers.
const DEFAULT_SINK_CAPACITY: usize = 32;

/// A raw image frame handed to the detector.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Presentation time since the start of the stream.
    pub timestamp: Duration,
    /// Raw pixel data (e.g. RGB24).  Opaque to the engine.
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// A frame with no pixel payload, for sources that only carry geometry.
    pub fn empty(width: u32, height: u32, timestamp: Duration) -> Self {
        Self {
            width,
            height,
            timestamp,
            data: Vec::new(),
        }
    }
}

/// Produces frames for the driver loop.
pub trait FrameSource: Send {
    /// Return the next frame, or `Ok(None)` once the stream has ended.
    ///
    /// # Errors
    ///
    /// Returns [`CoachError::SourceUnavailable`] when the device or recording
    /// can no longer deliver frames.
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, CoachError>;
}

/// A pose-estimation backend.
#[async_trait]
pub trait PoseDetector: Send {
    /// Detect body landmarks in `frame`.
    ///
    /// Returns `Ok(None)` when no person is in view.
    ///
    /// # Errors
    ///
    /// - [`CoachError::DetectorFailure`] – this frame could not be processed;
    ///   the session continues with the next one.
    /// - [`CoachError::DetectorUnavailable`] – the model is gone for good;
    ///   the session ends.
    async fn detect(&mut self, frame: &VideoFrame) -> Result<Option<PoseSnapshot>, CoachError>;
}

/// Receives coaching cues.  Implementations must return promptly.
pub trait FeedbackSink: Send {
    /// # Errors
    ///
    /// Returns [`CoachError::Sink`] if the cue could not be handed over.  The
    /// driver logs the failure and carries on.
    fn deliver(&mut self, event: &FeedbackEvent) -> Result<(), CoachError>;
}

/// Fans cues out to every current subscriber.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<FeedbackEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedbackEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(DEFAULT_SINK_CAPACITY)
    }
}

impl FeedbackSink for BroadcastSink {
    fn deliver(&mut self, event: &FeedbackEvent) -> Result<(), CoachError> {
        // No listeners is a normal condition, not an error.
        let _ = self.sender.send(event.clone());
        Ok(())
    }
}
