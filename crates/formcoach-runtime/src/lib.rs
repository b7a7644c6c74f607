//! `formcoach-runtime` – The Coaching Loop
//!
//! Drives the form engine frame by frame and decides when the athlete hears
//! a cue.
//!
//! # Modules
//!
//! - [`frame_driver`] – [`FrameDriver`][frame_driver::FrameDriver]: awaits
//!   one detection per frame, then runs geometry → classification →
//!   scheduling and hands any cue to the output channel.  Frames are strictly
//!   serialized; a new detection never starts before the previous frame has
//!   been evaluated.
//! - [`scheduler`] – [`FeedbackScheduler`][scheduler::FeedbackScheduler]:
//!   the cooldown state machine that rate-limits corrections and the
//!   occasional encouragement.  Randomness is injected through
//!   [`RandomSource`][scheduler::RandomSource].
//! - [`session`] – [`CoachSession`][session::CoachSession]: the state one
//!   coaching session carries across frames, plus its
//!   [`CancelToken`][session::CancelToken].
//! - [`collaborators`] – the [`PoseDetector`][collaborators::PoseDetector],
//!   [`FrameSource`][collaborators::FrameSource] and
//!   [`FeedbackSink`][collaborators::FeedbackSink] boundaries.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: global
//!   `tracing` subscriber with an optional OTLP span exporter.

pub mod collaborators;
pub mod frame_driver;
pub mod scheduler;
pub mod session;
pub mod telemetry;

pub use collaborators::{BroadcastSink, FeedbackSink, FrameSource, PoseDetector, VideoFrame};
pub use frame_driver::{Detection, DriverConfig, FrameDriver, FrameReport};
pub use scheduler::{ConstantSource, EntropySource, FeedbackScheduler, RandomSource};
pub use session::{CancelToken, CoachSession, SessionStats};
pub use telemetry::{TracerProviderGuard, init_tracing};
