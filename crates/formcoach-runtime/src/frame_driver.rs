//! [`FrameDriver`] – the per-frame coaching loop.
//!
//! Each tick:
//!
//! 1. **Detect** – await [`PoseDetector::detect`] on the frame.  This is the
//!    only suspension point; a new detection never starts before the previous
//!    frame has been fully evaluated.
//! 2. **Measure** – build a [`FormState`] from the snapshot.  Missing
//!    keypoints read as 180°.
//! 3. **Classify** – [`classify`] picks the frame's [`Defect`].  A frame
//!    with nobody in view is not skipped: it reports every angle at 180° and
//!    [`Defect::None`], so the cooldown keeps pace with the frame clock.
//! 4. **Schedule** – the session's [`FeedbackScheduler`] decides whether a
//!    cue is due.
//! 5. **Deliver** – any cue goes to the [`FeedbackSink`].
//!
//! A [`CoachError::DetectorFailure`] skips steps 2–5 for that frame but still
//! counts down an active cooldown.  Any non-recoverable detector or source
//! error ends the session and is returned to the caller.
//!
//! # Cancellation
//!
//! The session's [`CancelToken`][crate::session::CancelToken] is checked
//! before each detection and again once it resolves.  A detection that
//! completes after teardown is discarded: no state changes and nothing is
//! delivered.
//!
//! [`FeedbackScheduler`]: crate::scheduler::FeedbackScheduler

use formcoach_perception::{FormState, PixelPoint, classify, overlay_points};
use formcoach_types::{CoachError, Defect, FeedbackEvent, PoseSnapshot};
use tracing::{debug, info, warn};

use crate::collaborators::{FeedbackSink, FrameSource, PoseDetector, VideoFrame};
use crate::session::{CoachSession, SessionStats};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration bundle for [`FrameDriver`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriverConfig {
    /// Landmarks reporting a visibility below this are treated as absent.
    /// `None` keeps every landmark the detector returns.
    pub min_visibility: Option<f64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// FrameReport
// ─────────────────────────────────────────────────────────────────────────────

/// What the detector produced for a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Person,
    NoPerson,
    /// The detector rejected this frame; the message is the detector's.
    Failed(String),
}

/// Outcome of one evaluated frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Zero-based index of the frame within the session.
    pub frame_index: u64,
    pub detection: Detection,
    /// Measured angles; `None` when the detector failed.
    pub form: Option<FormState>,
    /// Classification; `None` when the detector failed.
    pub defect: Option<Defect>,
    /// The cue delivered this frame, if any.
    pub event: Option<FeedbackEvent>,
    /// Cooldown carried into the next frame.
    pub cooldown: u32,
    /// Landmarks to highlight, in pixel space.
    pub overlay: Vec<PixelPoint>,
}

// ─────────────────────────────────────────────────────────────────────────────
// FrameDriver
// ─────────────────────────────────────────────────────────────────────────────

/// Wires a [`PoseDetector`] to a [`FeedbackSink`] through the form engine.
///
/// The driver is stateless across frames; everything that persists lives in
/// the [`CoachSession`] passed to each call.
pub struct FrameDriver<D, S> {
    detector: D,
    sink: S,
    config: DriverConfig,
}

impl<D: PoseDetector, S: FeedbackSink> FrameDriver<D, S> {
    pub fn new(detector: D, sink: S) -> Self {
        Self::with_config(detector, sink, DriverConfig::default())
    }

    pub fn with_config(detector: D, sink: S, config: DriverConfig) -> Self {
        Self {
            detector,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Tear the driver apart, returning its collaborators.
    pub fn into_parts(self) -> (D, S) {
        (self.detector, self.sink)
    }

    // -------------------------------------------------------------------------
    // Loop
    // -------------------------------------------------------------------------

    /// Drive frames from `source` until it runs dry or the session is
    /// cancelled, then return the session's counters.
    ///
    /// # Errors
    ///
    /// Returns the first non-recoverable error raised by `source` or the
    /// detector.
    pub async fn run<F: FrameSource>(
        &mut self,
        session: &mut CoachSession,
        source: &mut F,
    ) -> Result<SessionStats, CoachError> {
        info!("coaching session started");
        while !session.is_cancelled() {
            let Some(frame) = source.next_frame()? else {
                info!("frame source exhausted");
                break;
            };
            if self.tick(session, &frame).await?.is_none() {
                break;
            }
        }
        let stats = session.stats();
        info!(
            frames = stats.frames,
            corrections = stats.corrections,
            encouragements = stats.encouragements,
            detector_failures = stats.detector_failures,
            "coaching session finished"
        );
        Ok(stats)
    }

    /// Run one full detect → evaluate cycle for `frame`.
    ///
    /// Returns `Ok(None)` without touching the session when it was cancelled
    /// before detection started or while detection was in flight.
    pub async fn tick(
        &mut self,
        session: &mut CoachSession,
        frame: &VideoFrame,
    ) -> Result<Option<FrameReport>, CoachError> {
        if session.is_cancelled() {
            return Ok(None);
        }
        let detection = self.detector.detect(frame).await;
        if session.is_cancelled() {
            debug!("detection resolved after teardown; discarding");
            return Ok(None);
        }
        self.evaluate(session, frame.width, frame.height, detection)
            .map(Some)
    }

    /// Evaluate an already-resolved detection for a `width` × `height` frame.
    ///
    /// Exposed for hosts that run the detector themselves.
    ///
    /// # Errors
    ///
    /// Passes non-recoverable detector errors through untouched; the session
    /// is not advanced in that case.
    pub fn evaluate(
        &mut self,
        session: &mut CoachSession,
        width: u32,
        height: u32,
        detection: Result<Option<PoseSnapshot>, CoachError>,
    ) -> Result<FrameReport, CoachError> {
        let frame_index = session.stats().frames;

        let snapshot = match detection {
            Ok(snapshot) => snapshot,
            Err(CoachError::DetectorFailure(reason)) => {
                warn!(frame = frame_index, %reason, "detector failed; skipping feedback");
                session.scheduler_mut().idle();
                let stats = session.stats_mut();
                stats.frames += 1;
                stats.detector_failures += 1;
                return Ok(FrameReport {
                    frame_index,
                    detection: Detection::Failed(reason),
                    form: None,
                    defect: None,
                    event: None,
                    cooldown: session.cooldown(),
                    overlay: Vec::new(),
                });
            }
            Err(e) => return Err(e),
        };

        let (detection, form, defect, overlay) = match snapshot {
            Some(mut snapshot) => {
                if let Some(threshold) = self.config.min_visibility {
                    snapshot.retain_visible(threshold);
                }
                let form = FormState::from_snapshot(&snapshot);
                (
                    Detection::Person,
                    form,
                    classify(&form),
                    overlay_points(&snapshot, width, height),
                )
            }
            // Nobody in view: nothing to correct.
            None => (
                Detection::NoPerson,
                FormState::unobserved(),
                Defect::None,
                Vec::new(),
            ),
        };
        let event = session.scheduler_mut().schedule(defect);
        let cooldown = session.cooldown();

        debug!(
            frame = frame_index,
            back = form.back_angle,
            left_knee = form.left_knee,
            right_knee = form.right_knee,
            ?defect,
            cooldown,
            "frame evaluated"
        );

        let stats = session.stats_mut();
        stats.frames += 1;
        if detection == Detection::NoPerson {
            stats.frames_without_person += 1;
        }

        if let Some(ref event) = event {
            stats.record_event(event);
            info!(frame = frame_index, kind = ?event.kind, message = %event.message, "coaching cue");
            if let Err(e) = self.sink.deliver(event) {
                warn!(error = %e, "feedback sink rejected cue");
            }
        }

        Ok(FrameReport {
            frame_index,
            detection,
            form: Some(form),
            defect: Some(defect),
            event,
            cooldown,
            overlay,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
