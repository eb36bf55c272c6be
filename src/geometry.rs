//! Geometry kernel: polar conversion, slopes, line intersection and extents.
//!
//! Pure functions over `glam::DVec2`. Angles are in degrees.

use glam::{DVec2, dvec2};

use crate::errors::GeometryError;

/// Convert a polar pair (degrees, length) to Cartesian components
pub fn polar_to_cartesian(angle_deg: f64, length: f64) -> DVec2 {
    let rad = angle_deg.to_radians();
    dvec2(length * rad.cos(), length * rad.sin())
}

/// Convert Cartesian components to a polar pair, angle normalized to `[0, 360)`
pub fn cartesian_to_polar(v: DVec2) -> (f64, f64) {
    normalize_polar(v.y.atan2(v.x).to_degrees(), v.x.hypot(v.y))
}

/// Canonical form of a polar pair: non-negative length, angle in `[0, 360)`.
/// A zero length has angle 0.
pub fn normalize_polar(angle_deg: f64, length: f64) -> (f64, f64) {
    let (angle, length) = if length < 0.0 {
        (angle_deg + 180.0, -length)
    } else {
        (angle_deg, length)
    };
    let mut angle = angle.rem_euclid(360.0);
    // -0.0 and rounding right below 360 both have to land inside the range
    if angle >= 360.0 || angle == 0.0 || length == 0.0 {
        angle = 0.0;
    }
    (angle, length.abs())
}

/// Slope of the line through `p1` and `p2`.
///
/// Vertical lines yield a signed infinity (`+inf` when `p2` is not below `p1`).
/// Label placement relies on this sentinel, so it is not an error.
pub fn slope(p1: DVec2, p2: DVec2) -> f64 {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    if dx == 0.0 {
        if dy >= 0.0 { f64::INFINITY } else { f64::NEG_INFINITY }
    } else {
        dy / dx
    }
}

/// Slope of a line perpendicular to one with slope `m`
pub fn perpendicular_slope(m: f64) -> f64 {
    if m.is_infinite() {
        0.0
    } else if m == 0.0 {
        f64::INFINITY
    } else {
        -1.0 / m
    }
}

/// Crossing point of the line through `a` with slope `m1` and the line
/// through `b` with slope `m2`.
pub fn line_intersection(a: DVec2, b: DVec2, m1: f64, m2: f64) -> Result<DVec2, GeometryError> {
    match (m1.is_infinite(), m2.is_infinite()) {
        (true, true) => Err(GeometryError::ParallelLines),
        (true, false) => Ok(dvec2(a.x, b.y + m2 * (a.x - b.x))),
        (false, true) => Ok(dvec2(b.x, a.y + m1 * (b.x - a.x))),
        (false, false) => {
            if m1 == m2 {
                return Err(GeometryError::ParallelLines);
            }
            let x = (m1 * a.x - m2 * b.x + b.y - a.y) / (m1 - m2);
            Ok(dvec2(x, a.y + m1 * (x - a.x)))
        }
    }
}

/// Axis-aligned bounding box of a set of points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub min: DVec2,
    pub max: DVec2,
}

impl Default for Extent {
    fn default() -> Self {
        Self::new()
    }
}

impl Extent {
    /// Create an empty extent (will expand on first point)
    pub fn new() -> Self {
        Extent {
            min: DVec2::splat(f64::MAX),
            max: DVec2::splat(f64::MIN),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn expand(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Grow on every side by `margin`
    pub fn padded(self, margin: f64) -> Self {
        Extent {
            min: self.min - DVec2::splat(margin),
            max: self.max + DVec2::splat(margin),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}
