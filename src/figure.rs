//! Derived figures: circumcircles, angle markers, axes and grids.

use glam::DVec2;

use crate::errors::GeometryError;
use crate::formatting::{Formatting, FormattingBuilder, Preset, Value};
use crate::geometry::{Extent, line_intersection, perpendicular_slope, slope};
use crate::point::{Point, format_number};
use crate::token::{Emit, Scene};

/// Margin added around the diagram by `\xyaxis` and `\grid`
const FRAME_MARGIN: f64 = 1.0;

/// Circle through three points
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
    pub formatting: Formatting,
}

impl Circle {
    /// The circumcircle of `a`, `b` and `c`: the crossing of two
    /// perpendicular bisectors. Collinear points have parallel bisectors.
    pub fn through(a: &Point, b: &Point, c: &Point, formatting: Formatting) -> Result<Self, GeometryError> {
        let (a, b, c) = (a.vec(), b.vec(), c.vec());
        let mid_ab = (a + b) / 2.0;
        let mid_bc = (b + c) / 2.0;
        let m1 = perpendicular_slope(slope(a, b));
        let m2 = perpendicular_slope(slope(b, c));
        let center = line_intersection(mid_ab, mid_bc, m1, m2)?;
        Ok(Circle {
            center: Point::from_vec(center),
            radius: center.distance(a),
            formatting,
        })
    }
}

impl Emit for Circle {
    fn emit(&self, _scene: &Scene, out: &mut String) {
        out.push_str(&format!(
            "\\draw [{}] {} circle [radius={}];",
            self.formatting,
            self.center,
            format_number(self.radius)
        ));
    }

    fn points(&self) -> Vec<&Point> {
        vec![&self.center]
    }

    fn annotate(&mut self, midpoint: &Point) {
        self.center.classify(midpoint);
    }
}

/// Angle marker `\pic {angle=A--B--C}` at vertex `B`
#[derive(Debug, Clone, PartialEq)]
pub struct AnglePic {
    /// Names of the three defining coordinates, vertex in the middle
    pub names: [String; 3],
    pub formatting: Formatting,
}

impl AnglePic {
    pub fn new(names: [String; 3], label: &str, list: &str) -> Self {
        let mut builder = FormattingBuilder::new().preset(Preset::Angle).items(list);
        if !label.is_empty() {
            builder = builder.set("quotes", Value::Text(format!("\"{label}\"")));
        }
        AnglePic {
            names,
            formatting: builder.build(),
        }
    }
}

impl Emit for AnglePic {
    fn emit(&self, _scene: &Scene, out: &mut String) {
        let [a, b, c] = &self.names;
        out.push_str(&format!("\\pic [{}] {{angle={a}--{b}--{c}}};", self.formatting));
    }
}

/// Integer-aligned frame around the diagram and the origin
fn frame(extent: &Extent) -> Extent {
    let mut frame = *extent;
    frame.expand(DVec2::ZERO);
    frame.padded(FRAME_MARGIN)
}

/// `\xyaxis`: arrowed x and y axes through the origin
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub x_label: String,
    pub y_label: String,
}

impl Emit for Axes {
    fn emit(&self, scene: &Scene, out: &mut String) {
        let f = frame(&scene.extent);
        let label = |placement: &str, text: &str| {
            if text.is_empty() {
                String::new()
            } else {
                format!(" node [{placement}] {{{text}}}")
            }
        };
        out.push_str(&format!(
            "\\draw [->] {}--{}{};\n\\draw [->] {}--{}{};",
            Point::new(f.min.x, 0.0),
            Point::new(f.max.x, 0.0),
            label("right", &self.x_label),
            Point::new(0.0, f.min.y),
            Point::new(0.0, f.max.y),
            label("above", &self.y_label),
        ));
    }
}

/// `\grid`: help lines over the diagram
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub formatting: Formatting,
}

impl Grid {
    pub fn new(list: &str) -> Self {
        Grid {
            formatting: Formatting::parse(list, Some(Preset::HelpLines)),
        }
    }
}

impl Emit for Grid {
    fn emit(&self, scene: &Scene, out: &mut String) {
        let f = frame(&scene.extent);
        out.push_str(&format!(
            "\\draw [{}] {} grid {};",
            self.formatting,
            Point::from_vec(f.min.floor()),
            Point::from_vec(f.max.ceil()),
        ));
    }
}
