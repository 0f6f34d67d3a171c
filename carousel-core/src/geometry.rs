//! Cover-fit geometry.
//!
//! Pure functions for the crop/pan math behind dragging media inside a fixed
//! container. Offsets follow CSS `object-position` / `background-position`
//! semantics: an anchor of 0% aligns the media's left/top edge with the
//! container, 100% aligns its right/bottom edge, and the pixel offset of the
//! media relative to the container always lies in `[-max_offset, 0]`.

use serde::{Deserialize, Serialize};

/// Default scale epsilon added on top of the cover scale.
pub const DEFAULT_COVER_EPSILON: f64 = 0.001;

/// Tolerance below which an axis is treated as having no overflow.
const OVERFLOW_EPSILON: f64 = 1e-6;

/// A point in surface coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate in pixels.
    pub x: f64,
    /// Y coordinate in pixels.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero, negative or not finite.
    ///
    /// Surfaces report this shape before layout has settled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Area in square pixels (zero for empty sizes).
    #[must_use]
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width * self.height
        }
    }
}

/// An axis-aligned rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle's size.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Rendered area in square pixels.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.size().area()
    }

    /// Whether layout has produced a usable box yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Check if a point lies within this rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Pixel offset of media relative to its container's top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    /// Horizontal offset (zero or negative under cover-fit).
    pub x: f64,
    /// Vertical offset (zero or negative under cover-fit).
    pub y: f64,
}

impl Offset {
    /// Create a new offset.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Percentage anchor for object/background position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Horizontal anchor in percent (0 = left aligned, 100 = right aligned).
    pub x: f64,
    /// Vertical anchor in percent (0 = top aligned, 100 = bottom aligned).
    pub y: f64,
}

impl Anchor {
    /// The centered anchor, CSS's default for `object-position`.
    pub const CENTER: Self = Self { x: 50.0, y: 50.0 };

    /// The top-left anchor, CSS's default for `background-position`.
    pub const TOP_LEFT: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new anchor.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Clamp `value` into `[min, max]`.
///
/// Callers must pass `min <= max`. NaN inputs clamp to `min`.
#[must_use]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() || value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Scale `natural` so it covers `container` with no gaps.
///
/// The scale factor is `max(cw / nw, ch / nh) + epsilon`, so the result is at
/// least as large as the container on both axes and keeps the natural aspect
/// ratio. Returns `None` while either size is empty so the caller can wait for
/// layout and retry.
#[must_use]
pub fn compute_cover_bleed(natural: Size, container: Size, epsilon: f64) -> Option<Size> {
    if natural.is_empty() || container.is_empty() {
        return None;
    }
    let scale = (container.width / natural.width).max(container.height / natural.height)
        + epsilon.max(0.0);
    Some(Size::new(natural.width * scale, natural.height * scale))
}

/// Convert an anchor percentage into a pixel offset.
///
/// `max_offset` is the positive overflow (`display - container`) on the axis.
#[must_use]
pub fn percent_to_offset(percent: f64, max_offset: f64) -> f64 {
    -max_offset * (percent / 100.0)
}

/// Convert a pixel offset back into an anchor percentage.
///
/// Returns `None` when the axis has no overflow: any anchor renders the same
/// there, so the caller should keep whatever it already had.
#[must_use]
pub fn offset_to_percent(offset: f64, max_offset: f64) -> Option<f64> {
    if max_offset <= OVERFLOW_EPSILON || !max_offset.is_finite() {
        return None;
    }
    Some(clamp(-offset / max_offset * 100.0, 0.0, 100.0))
}

/// Geometry of one media pan gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaGeometry {
    /// Container box size.
    pub container: Size,
    /// Intrinsic media size.
    pub natural: Size,
    /// Cover-fit display size.
    pub display: Size,
    /// Most negative reachable offset on each axis.
    pub min_offset: Offset,
    /// Least negative reachable offset on each axis (always zero).
    pub max_offset: Offset,
    /// Offset when the gesture started.
    pub offset: Offset,
}

impl MediaGeometry {
    /// Compute the geometry for media anchored at `anchor` inside `container`.
    ///
    /// Returns `None` while either size is still unavailable.
    #[must_use]
    pub fn compute(natural: Size, container: Size, anchor: Anchor, epsilon: f64) -> Option<Self> {
        let display = compute_cover_bleed(natural, container, epsilon)?;
        let overflow_x = (display.width - container.width).max(0.0);
        let overflow_y = (display.height - container.height).max(0.0);
        Some(Self {
            container,
            natural,
            display,
            min_offset: Offset::new(-overflow_x, -overflow_y),
            max_offset: Offset::default(),
            offset: Offset::new(
                percent_to_offset(clamp(anchor.x, 0.0, 100.0), overflow_x),
                percent_to_offset(clamp(anchor.y, 0.0, 100.0), overflow_y),
            ),
        })
    }

    /// Positive overflow on each axis.
    #[must_use]
    pub fn overflow(&self) -> Size {
        Size::new(-self.min_offset.x, -self.min_offset.y)
    }

    /// Offset after moving the pointer by `(dx, dy)` from the gesture origin,
    /// clamped so the media always covers the container.
    #[must_use]
    pub fn pan(&self, dx: f64, dy: f64) -> Offset {
        Offset::new(
            clamp(self.offset.x + dx, self.min_offset.x, self.max_offset.x),
            clamp(self.offset.y + dy, self.min_offset.y, self.max_offset.y),
        )
    }

    /// Anchor for `offset`, keeping `fallback` on axes without overflow.
    #[must_use]
    pub fn anchor_for(&self, offset: Offset, fallback: Anchor) -> Anchor {
        let overflow = self.overflow();
        Anchor::new(
            offset_to_percent(offset.x, overflow.width).unwrap_or(fallback.x),
            offset_to_percent(offset.y, overflow.height).unwrap_or(fallback.y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_cover_bleed_portrait_container() {
        let display = compute_cover_bleed(
            Size::new(800.0, 600.0),
            Size::new(1080.0, 1350.0),
            0.0,
        )
        .expect("sizes are positive");

        assert!(display.width >= 1080.0);
        assert!((display.height - 1350.0).abs() < TOLERANCE);
        assert!((display.width / display.height - 800.0 / 600.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_cover_bleed_with_epsilon_keeps_aspect() {
        let display = compute_cover_bleed(
            Size::new(800.0, 600.0),
            Size::new(1080.0, 1350.0),
            DEFAULT_COVER_EPSILON,
        )
        .expect("sizes are positive");

        assert!(display.width >= 1080.0);
        assert!(display.height >= 1350.0);
        assert!((display.width / display.height - 800.0 / 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_cover_bleed_scales_down_oversized_media() {
        let display = compute_cover_bleed(
            Size::new(4000.0, 3000.0),
            Size::new(400.0, 400.0),
            0.0,
        )
        .expect("sizes are positive");

        assert!((display.height - 400.0).abs() < TOLERANCE);
        assert!(display.width > 400.0);
    }

    #[test]
    fn test_cover_bleed_defers_on_zero_container() {
        assert!(compute_cover_bleed(Size::new(800.0, 600.0), Size::default(), 0.0).is_none());
        assert!(compute_cover_bleed(Size::default(), Size::new(10.0, 10.0), 0.0).is_none());
    }

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-5.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(15.0, 0.0, 10.0), 10.0);
        assert_eq!(clamp(f64::NAN, -1.0, 1.0), -1.0);
    }

    #[test]
    fn test_percent_offset_conversion() {
        assert!((percent_to_offset(50.0, 200.0) + 100.0).abs() < TOLERANCE);
        assert!((percent_to_offset(0.0, 200.0)).abs() < TOLERANCE);
        assert_eq!(offset_to_percent(-100.0, 200.0), Some(50.0));
        assert_eq!(offset_to_percent(-10.0, 0.0), None);
    }

    #[test]
    fn test_pan_right_from_center_reduces_anchor() {
        let geometry = MediaGeometry {
            container: Size::new(400.0, 400.0),
            natural: Size::new(600.0, 400.0),
            display: Size::new(600.0, 400.0),
            min_offset: Offset::new(-200.0, 0.0),
            max_offset: Offset::default(),
            offset: Offset::new(-100.0, 0.0),
        };

        let offset = geometry.pan(50.0, 0.0);
        let anchor = geometry.anchor_for(offset, Anchor::CENTER);

        assert!((offset.x + 50.0).abs() < TOLERANCE);
        assert!((anchor.x - 25.0).abs() < TOLERANCE);
        assert!((anchor.y - 50.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_pan_clamps_to_cover_range() {
        let geometry = MediaGeometry::compute(
            Size::new(600.0, 400.0),
            Size::new(400.0, 400.0),
            Anchor::new(0.0, 50.0),
            0.0,
        )
        .expect("sizes are positive");

        let offset = geometry.pan(500.0, 0.0);
        assert!(offset.x.abs() < TOLERANCE);

        let offset = geometry.pan(-5000.0, 0.0);
        assert!((offset.x - geometry.min_offset.x).abs() < TOLERANCE);
    }

    #[test]
    fn test_rect_contains_and_area() {
        let rect = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert!(rect.contains(Point::new(10.0, 60.0)));
        assert!(!rect.contains(Point::new(111.0, 20.0)));
        assert!((rect.area() - 5000.0).abs() < TOLERANCE);
        assert!(Rect::default().is_empty());
    }
}
