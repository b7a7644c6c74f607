//! [`FeedbackScheduler`] – cooldown-gated coaching cue selector.
//!
//! Decides once per frame whether the athlete hears something.  The only
//! state is a frame countdown:
//!
//! | Cooldown | Defect | Result |
//! |---|---|---|
//! | `> 0` | any | nothing; cooldown − 1 |
//! | `0` | `BackRounded` | back correction; cooldown = 90 |
//! | `0` | `InsufficientDepth` | depth correction; cooldown = 90 |
//! | `0` | `None` | encouragement with p = 0.01, cooldown = 60; else nothing |
//!
//! The encouragement draw comes from an injected [`RandomSource`] so tests
//! can force either outcome.
//!
//! # Example
//!
//! ```rust
//! use formcoach_runtime::scheduler::{ConstantSource, FeedbackScheduler};
//! use formcoach_types::{Defect, FeedbackKind};
//!
//! let mut scheduler = FeedbackScheduler::new(Box::new(ConstantSource(0.5)));
//!
//! let cue = scheduler.schedule(Defect::BackRounded).unwrap();
//! assert_eq!(cue.kind, FeedbackKind::Correction);
//! assert_eq!(scheduler.cooldown(), 90);
//!
//! // Suppressed while cooling down.
//! assert!(scheduler.schedule(Defect::BackRounded).is_none());
//! assert_eq!(scheduler.cooldown(), 89);
//! ```

use formcoach_types::{Defect, FeedbackEvent};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Frames of silence after a correction.
pub const CORRECTION_COOLDOWN_FRAMES: u32 = 90;

/// Frames of silence after an encouragement.
pub const ENCOURAGEMENT_COOLDOWN_FRAMES: u32 = 60;

/// Chance per eligible clean frame of hearing an encouragement.
pub const ENCOURAGEMENT_PROBABILITY: f64 = 0.01;

pub const BACK_CUE: &str = "Coaching tip: keep your back straighter as you descend.";
pub const DEPTH_CUE: &str = "Try to go a bit deeper. Aim for thighs parallel to the floor.";
pub const ENCOURAGEMENT_CUE: &str = "Nice form. Keep breathing and stay tall through your chest.";

// ─────────────────────────────────────────────────────────────────────────────
// Random sources
// ─────────────────────────────────────────────────────────────────────────────

/// Supplies uniform draws in `[0, 1)` for the encouragement path.
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;
}

/// Draws from the thread-local generator seeded from OS entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntropySource;

impl RandomSource for EntropySource {
    fn next_unit(&mut self) -> f64 {
        rand::random::<f64>()
    }
}

/// Always returns the same draw.  `ConstantSource(1.0)` disables
/// encouragement entirely; `ConstantSource(0.0)` fires it on every eligible
/// frame.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSource(pub f64);

impl RandomSource for ConstantSource {
    fn next_unit(&mut self) -> f64 {
        self.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Transition
// ─────────────────────────────────────────────────────────────────────────────

/// One scheduler transition as a pure function.
///
/// `draw` is only invoked when the frame is eligible for encouragement
/// (cooldown at zero and no defect).  Returns the cue to emit, if any, and
/// the cooldown to carry into the next frame.
pub fn step(
    defect: Defect,
    cooldown: u32,
    draw: impl FnOnce() -> f64,
) -> (Option<FeedbackEvent>, u32) {
    if cooldown > 0 {
        return (None, cooldown - 1);
    }
    match defect {
        Defect::BackRounded => (
            Some(FeedbackEvent::correction(BACK_CUE)),
            CORRECTION_COOLDOWN_FRAMES,
        ),
        Defect::InsufficientDepth => (
            Some(FeedbackEvent::correction(DEPTH_CUE)),
            CORRECTION_COOLDOWN_FRAMES,
        ),
        Defect::None if draw() < ENCOURAGEMENT_PROBABILITY => (
            Some(FeedbackEvent::encouragement(ENCOURAGEMENT_CUE)),
            ENCOURAGEMENT_COOLDOWN_FRAMES,
        ),
        Defect::None => (None, 0),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FeedbackScheduler
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the cooldown counter and the random source for one session.
pub struct FeedbackScheduler {
    cooldown: u32,
    rng: Box<dyn RandomSource>,
}

impl FeedbackScheduler {
    /// Create a scheduler with cooldown 0.
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self { cooldown: 0, rng }
    }

    /// Create a scheduler drawing from [`EntropySource`].
    pub fn with_entropy() -> Self {
        Self::new(Box::new(EntropySource))
    }

    /// Frames left before another cue may be emitted.
    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Advance one classified frame.
    pub fn schedule(&mut self, defect: Defect) -> Option<FeedbackEvent> {
        let rng = &mut self.rng;
        let (event, cooldown) = step(defect, self.cooldown, || rng.next_unit());
        self.cooldown = cooldown;
        event
    }

    /// Advance one frame that produced no classification.  Counts down an
    /// active cooldown and never emits.
    pub fn idle(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    /// Return to the start-of-session state.
    pub fn reset(&mut self) {
        self.cooldown = 0;
    }
}

impl Default for FeedbackScheduler {
    fn default() -> Self {
        Self::with_entropy()
    }
}

impl std::fmt::Debug for FeedbackScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackScheduler")
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}
