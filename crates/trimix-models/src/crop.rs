//! Crop rectangle geometry.

use serde::{Deserialize, Serialize};

/// A crop rectangle in source-pixel coordinates.
///
/// The rectangle is computed and rendered as overlay feedback in the editor
/// but is not applied to exported output in the current contract; the export
/// path deliberately never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    /// X coordinate of the top-left corner, in source pixels.
    pub x: f64,
    /// Y coordinate of the top-left corner, in source pixels.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Target aspect ratio (width / height).
    pub aspect_ratio: f64,
}

/// Default aspect for mobile-friendly vertical clips.
pub const DEFAULT_CROP_ASPECT: f64 = 9.0 / 16.0;

impl CropRect {
    /// Largest rectangle of the given aspect that fits inside the source
    /// frame, centered.
    pub fn fitted(video_width: f64, video_height: f64, aspect_ratio: f64) -> Self {
        let (width, height) = if video_width / video_height > aspect_ratio {
            // Source is wider than the target ratio
            (video_height * aspect_ratio, video_height)
        } else {
            // Source is taller than the target ratio
            (video_width, video_width / aspect_ratio)
        };

        Self {
            x: (video_width - width) / 2.0,
            y: (video_height - height) / 2.0,
            width,
            height,
            aspect_ratio,
        }
    }

    /// Check that the rectangle lies within the source frame.
    pub fn is_valid(&self, video_width: f64, video_height: f64) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width > 0.0
            && self.height > 0.0
            && self.x + self.width <= video_width + 0.001 // float epsilon
            && self.y + self.height <= video_height + 0.001
    }

    /// Corner handle positions for overlay rendering, clockwise from top-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x, self.y),
            (self.x + self.width, self.y),
            (self.x + self.width, self.y + self.height),
            (self.x, self.y + self.height),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fitted_wide_source() {
        // 1920x1080 source, 9:16 target: crop is height-bound
        let rect = CropRect::fitted(1920.0, 1080.0, DEFAULT_CROP_ASPECT);
        assert!((rect.height - 1080.0).abs() < 1e-6);
        assert!((rect.width - 1080.0 * DEFAULT_CROP_ASPECT).abs() < 1e-6);
        assert!(rect.is_valid(1920.0, 1080.0));
        // Centered horizontally
        assert!((rect.x - (1920.0 - rect.width) / 2.0).abs() < 1e-6);
        assert!(rect.y.abs() < 1e-6);
    }

    #[test]
    fn test_fitted_tall_source() {
        // 720x1600 source, 16:9 target: crop is width-bound
        let rect = CropRect::fitted(720.0, 1600.0, 16.0 / 9.0);
        assert!((rect.width - 720.0).abs() < 1e-6);
        assert!((rect.height - 720.0 * 9.0 / 16.0).abs() < 1e-6);
        assert!(rect.is_valid(720.0, 1600.0));
    }

    #[test]
    fn test_square_aspect() {
        let rect = CropRect::fitted(1920.0, 1080.0, 1.0);
        assert!((rect.width - 1080.0).abs() < 1e-6);
        assert!((rect.height - 1080.0).abs() < 1e-6);
    }
}
