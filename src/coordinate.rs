//! Named coordinates and placed nodes.

use crate::formatting::{Formatting, Value};
use crate::point::Point;
use crate::token::{Emit, Scene};

/// Keys that may be given as a label placement and moved into the
/// `label={...}` position slot.
const LABEL_PLACEMENTS: &[&str] = &[
    "above right",
    "above left",
    "below right",
    "below left",
    "above",
    "below",
    "left",
    "right",
];

/// Label text with its own formatting
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub formatting: Formatting,
}

impl Label {
    pub fn new(text: impl Into<String>, formatting: Formatting) -> Self {
        Label {
            text: text.into(),
            formatting,
        }
    }
}

/// A named coordinate: `\coor` or `\coordinate ... at ...;`
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub point: Point,
    pub name: String,
    pub label: Option<Label>,
    pub formatting: Formatting,
}

impl Coordinate {
    pub fn new(point: Point, name: impl Into<String>) -> Self {
        let name = name.into();
        Coordinate {
            point: point.named(name.clone()),
            name,
            label: None,
            formatting: Formatting::new(),
        }
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }

    /// Render the `label={...}` option value.
    ///
    /// A bare placement flag in the label's formatting moves into the
    /// position slot. Any other explicit placement (`above=3pt`,
    /// `anchor=south`) stays in the options and leaves the slot empty.
    /// Without one the label points away from the midpoint.
    fn label_option(&self, label: &Label) -> String {
        let flag = LABEL_PLACEMENTS
            .iter()
            .copied()
            .find(|key| label.formatting.get(key) == Some(&Value::Flag));
        let (placement, options) = match flag {
            Some(key) => (Some(key), label.formatting.without(key)),
            None if label.formatting.has_placement() => (None, label.formatting.clone()),
            None => (
                self.point.quadrant().map(|q| q.outward_placement()),
                label.formatting.clone(),
            ),
        };

        let mut out = String::from("{");
        if !options.is_empty() {
            out.push_str(&format!("[{options}]"));
        }
        if let Some(placement) = placement {
            out.push_str(placement);
            out.push(':');
        }
        out.push_str(&label.text);
        out.push('}');
        out
    }
}

impl Emit for Coordinate {
    fn emit(&self, _scene: &Scene, out: &mut String) {
        let mut options = self.formatting.clone();
        if let Some(label) = self.label.as_ref().filter(|l| !l.text.is_empty()) {
            options = options.with("label", Value::Text(self.label_option(label)));
        }
        out.push_str("\\coordinate ");
        if !options.is_empty() {
            out.push_str(&format!("[{options}] "));
        }
        out.push_str(&format!("({}) at {};", self.name, self.point));
    }

    fn points(&self) -> Vec<&Point> {
        vec![&self.point]
    }

    fn annotate(&mut self, midpoint: &Point) {
        self.point.classify(midpoint);
    }
}

/// A node placed at a point: `\node` and `\mass`
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub point: Point,
    pub label: String,
    pub formatting: Formatting,
}

impl Emit for Node {
    fn emit(&self, _scene: &Scene, out: &mut String) {
        out.push_str(&format!(
            "\\node [{}] at {} {{{}}};",
            self.formatting, self.point, self.label
        ));
    }

    fn points(&self) -> Vec<&Point> {
        vec![&self.point]
    }

    fn annotate(&mut self, midpoint: &Point) {
        self.point.classify(midpoint);
    }
}

/// A node inside a path, positioned by the path itself
#[derive(Debug, Clone, PartialEq)]
pub struct InlineNode {
    pub label: String,
    pub formatting: Formatting,
}

impl InlineNode {
    pub fn new(label: impl Into<String>, formatting: Formatting) -> Self {
        InlineNode {
            label: label.into(),
            formatting,
        }
    }
}

impl std::fmt::Display for InlineNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node [{}] {{{}}}", self.formatting, self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatting::Preset;

    fn emit(token: &impl Emit) -> String {
        let mut out = String::new();
        token.emit(&Scene::default(), &mut out);
        out
    }

    #[test]
    fn bare_coordinate_has_no_options() {
        let c = Coordinate::new(Point::new(1.0, 2.0), "A");
        assert_eq!(emit(&c), "\\coordinate (A) at (1,2);");
        assert_eq!(c.point.name(), Some("A"));
    }

    #[test]
    fn empty_label_is_omitted() {
        let c = Coordinate::new(Point::new(1.0, 2.0), "A").with_label(Label::new("", Formatting::new()));
        assert_eq!(emit(&c), "\\coordinate (A) at (1,2);");
    }

    #[test]
    fn label_points_away_from_midpoint() {
        let mut c = Coordinate::new(Point::new(1.0, 2.0), "A")
            .with_label(Label::new("$A$", Formatting::parse("red", None)));
        c.annotate(&Point::new(2.0, 3.0));
        assert_eq!(
            emit(&c),
            "\\coordinate [label={[red]below left:$A$}] (A) at (1,2);"
        );
    }

    #[test]
    fn explicit_label_placement_wins() {
        let mut c = Coordinate::new(Point::new(1.0, 2.0), "A")
            .with_label(Label::new("A", Formatting::parse("above, blue", None)));
        c.annotate(&Point::new(2.0, 3.0));
        assert_eq!(emit(&c), "\\coordinate [label={[blue]above:A}] (A) at (1,2);");
    }

    #[test]
    fn keyed_label_placement_suppresses_the_outward_one() {
        for (fmt, expected) in [
            ("above=3pt", "\\coordinate [label={[above=3pt]$A$}] (A) at (1,2);"),
            ("anchor=south", "\\coordinate [label={[anchor=south]$A$}] (A) at (1,2);"),
        ] {
            let mut c = Coordinate::new(Point::new(1.0, 2.0), "A")
                .with_label(Label::new("$A$", Formatting::parse(fmt, None)));
            c.annotate(&Point::new(2.0, 3.0));
            assert_eq!(emit(&c), expected, "{fmt}");
        }
    }

    #[test]
    fn unclassified_label_has_no_placement() {
        let c = Coordinate::new(Point::new(0.0, 0.0), "O").with_label(Label::new("O", Formatting::new()));
        assert_eq!(emit(&c), "\\coordinate [label={O}] (O) at (0,0);");
    }

    #[test]
    fn native_coordinate_keeps_formatting() {
        let c = Coordinate::new(Point::new(0.5, -1.0), "P")
            .with_formatting(Formatting::parse("draw, red", None));
        assert_eq!(emit(&c), "\\coordinate [draw, red] (P) at (0.5,-1);");
    }

    #[test]
    fn node_and_mass() {
        let node = Node {
            point: Point::new(1.0, 1.0),
            label: "$m$".into(),
            formatting: Formatting::parse("above", None),
        };
        assert_eq!(emit(&node), "\\node [above] at (1,1) {$m$};");

        let mass = Node {
            point: Point::new(0.0, 0.0),
            label: "M".into(),
            formatting: Formatting::parse("fill=red", Some(Preset::Mass)),
        };
        assert_eq!(
            emit(&mass),
            "\\node [fill=red, draw, minimum width=28.346pt, minimum height=28.346pt] at (0,0) {M};"
        );
    }

    #[test]
    fn inline_node_display() {
        let node = InlineNode::new("$F$", Formatting::parse("sloped", None));
        assert_eq!(node.to_string(), "node [sloped] {$F$}");
    }
}
