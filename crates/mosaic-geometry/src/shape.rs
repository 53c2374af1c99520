//! Axis-aligned footprint rectangles and disk/terminator predicates.

use serde::{Deserialize, Serialize};

use crate::provider::Illumination;

/// One instrument footprint: an axis-aligned rectangle given by its center
/// and full side lengths, in whatever angular unit the caller works in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub center: (f64, f64),
    pub size: (f64, f64),
}

impl Rectangle {
    pub fn new(center: (f64, f64), size: (f64, f64)) -> Self {
        Self { center, size }
    }

    /// Corner coordinates in counter-clockwise order starting at the
    /// lower-left corner.
    pub fn corners(&self) -> [(f64, f64); 4] {
        let (cx, cy) = self.center;
        let dx = self.size.0 / 2.0;
        let dy = self.size.1 / 2.0;
        [
            (cx - dx, cy - dy),
            (cx + dx, cy - dy),
            (cx + dx, cy + dy),
            (cx - dx, cy + dy),
        ]
    }

    /// True if the rectangle and the disk of radius `radius` centered at
    /// `disk_center` share any area.
    pub fn intersects_disk(&self, disk_center: (f64, f64), radius: f64) -> bool {
        let (cx, cy) = self.center;
        let dx = self.size.0 / 2.0;
        let dy = self.size.1 / 2.0;
        // Closest point of the rectangle to the disk center.
        let px = disk_center.0.clamp(cx - dx, cx + dx);
        let py = disk_center.1.clamp(cy - dy, cy + dy);
        let dist_sq = (px - disk_center.0).powi(2) + (py - disk_center.1).powi(2);
        dist_sq <= radius * radius
    }

    /// Maximum of `dot(p - origin, dir)` over the rectangle; attained at a
    /// corner since the function is linear.
    pub fn max_support(&self, origin: (f64, f64), dir: (f64, f64)) -> f64 {
        self.corners()
            .iter()
            .map(|&(x, y)| (x - origin.0) * dir.0 + (y - origin.1) * dir.1)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// True if the rectangle reaches into the sun-lit part of the disk: it
    /// must intersect the disk and extend past the terminator half-plane.
    pub fn intersects_illuminated(
        &self,
        disk_center: (f64, f64),
        radius: f64,
        illumination: &Illumination,
    ) -> bool {
        if !self.intersects_disk(disk_center, radius) {
            return false;
        }
        let threshold = illumination.terminator_offset * radius;
        self.max_support(disk_center, illumination.sun_direction) >= threshold
    }
}
