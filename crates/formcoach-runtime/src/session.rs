//! Per-session state, owned by whoever starts coaching.
//!
//! A [`CoachSession`] carries the only state that survives from one frame to
//! the next: the [`FeedbackScheduler`] cooldown and the running
//! [`SessionStats`].  Its [`CancelToken`] can be cloned out and flipped from
//! anywhere (e.g. a Ctrl-C handler) to tear the session down.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use formcoach_types::{FeedbackEvent, FeedbackKind};
use serde::{Deserialize, Serialize};

use crate::scheduler::{FeedbackScheduler, RandomSource};

// ─────────────────────────────────────────────────────────────────────────────
// CancelToken
// ─────────────────────────────────────────────────────────────────────────────

/// Shared teardown flag.  Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SessionStats
// ─────────────────────────────────────────────────────────────────────────────

/// Running counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Frames that went through a full tick (including failures).
    pub frames: u64,
    /// Frames where the detector saw nobody.
    pub frames_without_person: u64,
    pub detector_failures: u64,
    pub corrections: u64,
    pub encouragements: u64,
}

impl SessionStats {
    pub(crate) fn record_event(&mut self, event: &FeedbackEvent) {
        match event.kind {
            FeedbackKind::Correction => self.corrections += 1,
            FeedbackKind::Encouragement => self.encouragements += 1,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CoachSession
// ─────────────────────────────────────────────────────────────────────────────

/// Everything one coaching session carries across frames.
#[derive(Debug)]
pub struct CoachSession {
    scheduler: FeedbackScheduler,
    cancel: CancelToken,
    stats: SessionStats,
}

impl CoachSession {
    /// Start a session whose encouragement draws come from `rng`.
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self {
            scheduler: FeedbackScheduler::new(rng),
            cancel: CancelToken::new(),
            stats: SessionStats::default(),
        }
    }

    /// Start a session drawing from OS entropy.
    pub fn with_entropy() -> Self {
        Self {
            scheduler: FeedbackScheduler::with_entropy(),
            cancel: CancelToken::new(),
            stats: SessionStats::default(),
        }
    }

    /// A handle that can cancel this session from elsewhere.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cooldown(&self) -> u32 {
        self.scheduler.cooldown()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Begin a fresh session in place: cooldown and counters go back to
    /// zero and a fresh, uncancelled token is issued.  Tokens handed out
    /// before the reset keep pointing at the old session.
    pub fn reset(&mut self) {
        self.scheduler.reset();
        self.stats = SessionStats::default();
        self.cancel = CancelToken::new();
    }

    pub(crate) fn scheduler_mut(&mut self) -> &mut FeedbackScheduler {
        &mut self.scheduler
    }

    pub(crate) fn stats_mut(&mut self) -> &mut SessionStats {
        &mut self.stats
    }
}
