//! Axis-aligned crop rectangles in image-pixel coordinates.
//!
//! A [`CropRect`] is created from the two raw corner points of a mouse
//! drag, which may arrive in any order, and is normalized so that
//! `top_left <= bottom_right` componentwise and both corners lie inside
//! the source frame. A finalized rectangle renders itself as an ffmpeg
//! `crop=w:h:x:y` filter expression.

/// An axis-aligned pixel-space selection used to constrain extraction.
///
/// Invariants held by every constructed value: `top_left.0 <=
/// bottom_right.0`, `top_left.1 <= bottom_right.1`, both corners within
/// `[0, width] x [0, height]`, and non-zero area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// Upper-left corner `(x, y)`.
    pub top_left: (u32, u32),
    /// Lower-right corner `(x, y)`.
    pub bottom_right: (u32, u32),
}

impl CropRect {
    /// Edge length used when a drag is snapped to a fixed square.
    pub const SNAP_EDGE: u32 = 512;

    /// Normalize two raw drag corners against a `width x height` frame.
    ///
    /// The corners may be given in any order. Coordinates are clamped to
    /// the frame bounds before ordering. Returns `None` when the clamped
    /// rectangle has zero area (a click without a drag, or a drag entirely
    /// outside the frame).
    pub fn from_drag(
        first: (u32, u32),
        second: (u32, u32),
        width: u32,
        height: u32,
    ) -> Option<Self> {
        let clamp = |point: (u32, u32)| (point.0.min(width), point.1.min(height));
        let (x1, y1) = clamp(first);
        let (x2, y2) = clamp(second);

        let rect = Self {
            top_left: (x1.min(x2), y1.min(y2)),
            bottom_right: (x1.max(x2), y1.max(y2)),
        };
        if rect.pixel_width() == 0 || rect.pixel_height() == 0 {
            None
        } else {
            Some(rect)
        }
    }

    /// The corner a fixed-square drag ends at: `origin + (512, 512)`.
    pub fn snapped_corner(origin: (u32, u32)) -> (u32, u32) {
        (origin.0 + Self::SNAP_EDGE, origin.1 + Self::SNAP_EDGE)
    }

    /// Rectangle width in pixels.
    pub fn pixel_width(&self) -> u32 {
        self.bottom_right.0 - self.top_left.0
    }

    /// Rectangle height in pixels.
    pub fn pixel_height(&self) -> u32 {
        self.bottom_right.1 - self.top_left.1
    }

    /// Render as an ffmpeg `crop` video-filter expression.
    ///
    /// ```
    /// use fripper::CropRect;
    ///
    /// let rect = CropRect::from_drag((10, 20), (110, 220), 1920, 1080).unwrap();
    /// assert_eq!(rect.filter_expression(), "crop=100:200:10:20");
    /// ```
    pub fn filter_expression(&self) -> String {
        format!(
            "crop={}:{}:{}:{}",
            self.pixel_width(),
            self.pixel_height(),
            self.top_left.0,
            self.top_left.1,
        )
    }
}
