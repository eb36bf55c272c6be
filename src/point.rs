//! Points carrying both Cartesian and polar representations.

use std::fmt;

use glam::{DVec2, dvec2};

use crate::geometry::{cartesian_to_polar, normalize_polar, polar_to_cartesian};

/// Region of the plane relative to the diagram midpoint, numbered
/// clockwise from the top right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    UpperRight = 1,
    UpperLeft = 2,
    LowerLeft = 3,
    LowerRight = 4,
}

impl Quadrant {
    /// Classify `p` against `midpoint`. Ties fall to the lower/left side.
    pub fn classify(p: DVec2, midpoint: DVec2) -> Quadrant {
        if p.y > midpoint.y {
            if p.x > midpoint.x { Quadrant::UpperRight } else { Quadrant::UpperLeft }
        } else if p.x > midpoint.x {
            Quadrant::LowerRight
        } else {
            Quadrant::LowerLeft
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn is_upper(self) -> bool {
        matches!(self, Quadrant::UpperRight | Quadrant::UpperLeft)
    }

    pub fn is_right(self) -> bool {
        matches!(self, Quadrant::UpperRight | Quadrant::LowerRight)
    }

    /// Label placement pointing away from the midpoint
    pub fn outward_placement(self) -> &'static str {
        match self {
            Quadrant::UpperRight => "above right",
            Quadrant::UpperLeft => "above left",
            Quadrant::LowerLeft => "below left",
            Quadrant::LowerRight => "below right",
        }
    }
}

/// A resolved point.
///
/// Cartesian components are stored as a `DVec2`; the polar pair is derived
/// on every construction and mutation so both stay consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    cartesian: DVec2,
    polar_angle: f64,
    polar_length: f64,
    name: Option<String>,
    quadrant: Option<Quadrant>,
}

impl Default for Point {
    fn default() -> Self {
        Point::new(0.0, 0.0)
    }
}

impl Point {
    /// Point from Cartesian components (canonical), polar derived
    pub fn new(x: f64, y: f64) -> Self {
        Self::from_vec(dvec2(x, y))
    }

    pub fn from_vec(v: DVec2) -> Self {
        let (polar_angle, polar_length) = cartesian_to_polar(v);
        Point {
            cartesian: v,
            polar_angle,
            polar_length,
            name: None,
            quadrant: None,
        }
    }

    /// Point from a polar pair (canonical), Cartesian derived
    pub fn polar(angle_deg: f64, length: f64) -> Self {
        let (polar_angle, polar_length) = normalize_polar(angle_deg, length);
        Point {
            cartesian: polar_to_cartesian(angle_deg, length),
            polar_angle,
            polar_length,
            name: None,
            quadrant: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn x(&self) -> f64 {
        self.cartesian.x
    }

    pub fn y(&self) -> f64 {
        self.cartesian.y
    }

    pub fn vec(&self) -> DVec2 {
        self.cartesian
    }

    pub fn polar_angle(&self) -> f64 {
        self.polar_angle
    }

    pub fn polar_length(&self) -> f64 {
        self.polar_length
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn quadrant(&self) -> Option<Quadrant> {
        self.quadrant
    }

    pub fn set_cartesian(&mut self, x: f64, y: f64) {
        self.cartesian = dvec2(x, y);
        (self.polar_angle, self.polar_length) = cartesian_to_polar(self.cartesian);
    }

    pub fn set_polar(&mut self, angle_deg: f64, length: f64) {
        (self.polar_angle, self.polar_length) = normalize_polar(angle_deg, length);
        self.cartesian = polar_to_cartesian(angle_deg, length);
    }

    pub fn classify(&mut self, midpoint: &Point) {
        self.quadrant = Some(Quadrant::classify(self.cartesian, midpoint.cartesian));
    }

    /// Vector sum. The result is anonymous.
    pub fn add(&self, other: &Point) -> Point {
        Point::from_vec(self.cartesian + other.cartesian)
    }

    /// `A -| B`: x of the right operand, y of the left one
    pub fn right_projection(&self, other: &Point) -> Point {
        Point::new(other.x(), self.y())
    }

    /// `A !t! B`: `(A + B) · t`
    pub fn internal_point(&self, other: &Point, t: f64) -> Point {
        Point::from_vec((self.cartesian + other.cartesian) * t)
    }

    /// Arithmetic mean of a set of points, `None` when empty
    pub fn mean<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Point> {
        let (sum, count) = points
            .into_iter()
            .fold((DVec2::ZERO, 0usize), |(sum, n), p| (sum + p.cartesian, n + 1));
        (count > 0).then(|| Point::from_vec(sum / count as f64))
    }
}

/// Emits the TikZ coordinate form `(x,y)`
impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", format_number(self.x()), format_number(self.y()))
    }
}

/// Format a number with at most four decimals, trailing zeros trimmed.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let mut s = format!("{:.4}", rounded);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}
