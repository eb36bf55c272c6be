//! The token stream: raw text interleaved with expanded macros.

use enum_dispatch::enum_dispatch;

use crate::coordinate::{Coordinate, Node};
use crate::figure::{AnglePic, Axes, Circle, Grid};
use crate::geometry::Extent;
use crate::path::Draw;
use crate::point::Point;

/// Diagram-wide facts available while emitting
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub midpoint: Option<Point>,
    /// Extent of every point in the diagram
    pub extent: Extent,
}

/// Behavior shared by every token
#[enum_dispatch]
pub trait Emit {
    /// Append the expanded TikZ for this token
    fn emit(&self, scene: &Scene, out: &mut String);

    /// Points that take part in the midpoint
    fn points(&self) -> Vec<&Point> {
        Vec::new()
    }

    /// Quadrant classification and anything derived from it
    fn annotate(&mut self, _midpoint: &Point) {}
}

/// Source text outside any macro, emitted unchanged
#[derive(Debug, Clone, PartialEq)]
pub struct RawText(pub String);

impl Emit for RawText {
    fn emit(&self, _scene: &Scene, out: &mut String) {
        out.push_str(&self.0);
    }
}

#[enum_dispatch(Emit)]
#[derive(Debug, Clone)]
pub enum Token {
    Raw(RawText),
    Coordinate(Coordinate),
    Node(Node),
    Draw(Draw),
    Circle(Circle),
    AnglePic(AnglePic),
    Axes(Axes),
    Grid(Grid),
}

impl Token {
    pub fn as_draw(&self) -> Option<&Draw> {
        match self {
            Token::Draw(draw) => Some(draw),
            _ => None,
        }
    }

    pub fn as_coordinate(&self) -> Option<&Coordinate> {
        match self {
            Token::Coordinate(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Token::Raw(_))
    }
}
