//! Joint-angle geometry.
//!
//! A joint angle is the angle subtended at a *vertex* landmark by two limb
//! endpoints.  With `u = a − vertex` and `v = b − vertex`:
//!
//! ```text
//! θ = acos( clamp( (u · v) / (|u| |v| + ε), −1, 1 ) )
//! ```
//!
//! The `ε` keeps the division finite when an endpoint coincides with the
//! vertex.  Such an angle is defined but meaningless, so callers that care
//! should use [`measure_angle`], which reports it as unknown.
//!
//! # Example
//!
//! ```rust
//! use formcoach_perception::geometry::{angle_at, Point2};
//!
//! let vertex = Point2::new(0.0, 0.0);
//! let a = Point2::new(1.0, 0.0);
//! let b = Point2::new(0.0, 1.0);
//! assert!((angle_at(vertex, a, b) - 90.0).abs() < 1e-6);
//! ```

use formcoach_types::Landmark;
use tracing::trace;

/// Added to the magnitude product so the cosine never divides by zero.
const MAGNITUDE_EPSILON: f64 = 1e-9;

/// Vectors shorter than this make an angle unknown rather than measured.
pub const DEGENERATE_LENGTH: f64 = 1e-6;

// ────────────────────────────────────────────────────────────────────────────
// Point2
// ────────────────────────────────────────────────────────────────────────────

/// A 2-D point (or vector) in normalized image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }

    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Euclidean length.
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// The point one unit straight up (towards the top of the image) from
    /// `self`.  Image y grows downwards.
    pub fn above(self) -> Self {
        Self::new(self.x, self.y - 1.0)
    }
}

impl From<&Landmark> for Point2 {
    fn from(lm: &Landmark) -> Self {
        Self::new(lm.x, lm.y)
    }
}

impl From<Landmark> for Point2 {
    fn from(lm: Landmark) -> Self {
        Self::new(lm.x, lm.y)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Angles
// ────────────────────────────────────────────────────────────────────────────

/// Angle in degrees (`[0, 180]`) at `vertex` between the rays towards `a`
/// and `b`.
///
/// Never fails and never returns NaN for finite inputs.  When `a` or `b`
/// coincides with `vertex` the result is 90° and carries no information.
pub fn angle_at(vertex: Point2, a: Point2, b: Point2) -> f64 {
    let u = a.sub(vertex);
    let v = b.sub(vertex);
    let cos = u.dot(v) / (u.norm() * v.norm() + MAGNITUDE_EPSILON);
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Like [`angle_at`] but returns `None` when either limb vector is shorter
/// than [`DEGENERATE_LENGTH`].
pub fn measure_angle(vertex: Point2, a: Point2, b: Point2) -> Option<f64> {
    let degenerate = a.sub(vertex).norm() < DEGENERATE_LENGTH
        || b.sub(vertex).norm() < DEGENERATE_LENGTH;
    if degenerate {
        trace!(?vertex, ?a, ?b, "degenerate joint geometry");
        None
    } else {
        Some(angle_at(vertex, a, b))
    }
}
