//! Pixel-space projection of the tracked landmarks for the presentation
//! layer.  Read-only; nothing here feeds back into classification.

use formcoach_types::{BodyPart, PoseSnapshot};

/// A landmark position scaled to the current frame's pixel grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub part: BodyPart,
    pub x: f64,
    pub y: f64,
}

/// Every tracked landmark present in `snapshot`, scaled by the frame
/// dimensions.  Absent keypoints are simply not drawn.
pub fn overlay_points(snapshot: &PoseSnapshot, width: u32, height: u32) -> Vec<PixelPoint> {
    BodyPart::ALL
        .into_iter()
        .filter_map(|part| {
            snapshot.get(part).map(|lm| PixelPoint {
                part,
                x: lm.x * f64::from(width),
                y: lm.y * f64::from(height),
            })
        })
        .collect()
}
