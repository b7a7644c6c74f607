//! `formcoach-perception` – Form Analysis layer.
//!
//! Turns a frame's body landmarks into the joint angles and form verdict the
//! coaching runtime reacts to.  Everything in this crate is a pure function
//! of its inputs.
//!
//! # Modules
//!
//! - [`geometry`] – [`angle_at`][geometry::angle_at]: the joint angle
//!   subtended at a vertex by two other points.
//! - [`form`] – [`FormState`][form::FormState] and
//!   [`classify`][form::classify]: aggregates back/knee angles for a
//!   [`PoseSnapshot`][formcoach_types::PoseSnapshot] and picks the single
//!   [`Defect`][formcoach_types::Defect] for the frame.
//! - [`overlay`] – [`overlay_points`][overlay::overlay_points]: projects the
//!   tracked landmarks into pixel space for the presentation layer.

pub mod form;
pub mod geometry;
pub mod overlay;

pub use form::{FormState, classify};
pub use geometry::{Point2, angle_at, measure_angle};
pub use overlay::{PixelPoint, overlay_points};
