//! `\draw` paths: the bounded segment scanner and inline label placement.
//!
//! A path body is consumed one token at a time. Each pass skips whitespace
//! and tries, at the cursor, a coordinate `( ... )`, then a path operator,
//! then an inline `node [fmt] {label}`. Text that matches none of them is
//! never consumed, so the scan runs out of passes and fails.

use pest::Parser;
use pest::iterators::Pair;

use crate::coordinate::InlineNode;
use crate::errors::{ErrorKind, PathError};
use crate::formatting::{Formatting, Value};
use crate::geometry::slope;
use crate::log::{debug, trace};
use crate::point::Point;
use crate::resolve::Resolver;
use crate::token::{Emit, Scene};
use crate::{Rule, TikzParser};

/// Upper bound on scanner passes for one path body
pub const SCAN_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOperator {
    /// `--`
    Line,
    /// `-|`
    HorizontalFirst,
    /// `|-`
    VerticalFirst,
    Cycle,
    /// `--+`: next coordinate is relative to the pen, pen stays
    RelativeLine,
    /// `--++`: next coordinate is relative to the pen, pen moves
    IncrementalLine,
}

impl PathOperator {
    fn from_rule(rule: Rule) -> Option<Self> {
        Some(match rule {
            Rule::line_to => PathOperator::Line,
            Rule::horizontal_first => PathOperator::HorizontalFirst,
            Rule::vertical_first => PathOperator::VerticalFirst,
            Rule::cycle => PathOperator::Cycle,
            Rule::relative_line => PathOperator::RelativeLine,
            Rule::incremental_line => PathOperator::IncrementalLine,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PathOperator::Line => "--",
            PathOperator::HorizontalFirst => "-|",
            PathOperator::VerticalFirst => "|-",
            PathOperator::Cycle => "cycle",
            PathOperator::RelativeLine => "--+",
            PathOperator::IncrementalLine => "--++",
        }
    }

    /// Output form. Relative coordinates are emitted resolved, so their
    /// operators become plain lines.
    pub fn emitted(self) -> &'static str {
        match self {
            PathOperator::RelativeLine | PathOperator::IncrementalLine => "--",
            op => op.as_str(),
        }
    }

    fn is_relative(self) -> bool {
        matches!(self, PathOperator::RelativeLine | PathOperator::IncrementalLine)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Point(Point),
    Operator(PathOperator),
    Node(InlineNode),
}

/// A drawn path
#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub formatting: Formatting,
    pub segments: Vec<Segment>,
}

impl Draw {
    /// Scan a path body into segments, resolving coordinates as they appear
    pub fn parse(formatting: Formatting, body: &str, resolver: Resolver<'_>) -> Result<Self, ErrorKind> {
        let segments = PathScanner::new(body, resolver).run()?;
        Ok(Draw { formatting, segments })
    }

    /// Straight arrow from `from` to `to` with an optional label in between
    pub fn vector(from: Point, to: Point, label: &str, formatting: Formatting) -> Self {
        let mut segments = vec![Segment::Point(from), Segment::Operator(PathOperator::Line)];
        if !label.is_empty() {
            segments.push(Segment::Node(InlineNode::new(label, Formatting::new())));
        }
        segments.push(Segment::Point(to));
        Draw { formatting, segments }
    }

    pub fn is_closed(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Operator(PathOperator::Cycle)))
    }

    pub fn inline_nodes(&self) -> impl Iterator<Item = &InlineNode> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Node(node) => Some(node),
            _ => None,
        })
    }

    /// Derive placement for inline nodes from their neighbouring points.
    ///
    /// Requires classified points. Nodes with an explicit placement, or
    /// without a point on both sides, are left alone.
    pub fn place_labels(&mut self) {
        let points: Vec<usize> = self
            .segments
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s, Segment::Point(_)))
            .map(|(i, _)| i)
            .collect();
        let closed = self.is_closed();

        let mut updates = Vec::new();
        for (i, segment) in self.segments.iter().enumerate() {
            let Segment::Node(node) = segment else { continue };
            if node.formatting.has_placement() {
                continue;
            }
            let before = points
                .iter()
                .rev()
                .find(|&&j| j < i)
                .or_else(|| if closed { points.last() } else { None });
            let after = points
                .iter()
                .find(|&&j| j > i)
                .or_else(|| if closed { points.first() } else { None });
            let (Some(&b), Some(&a)) = (before, after) else { continue };
            if a == b {
                continue;
            }
            if let (Segment::Point(p1), Segment::Point(p2)) = (&self.segments[b], &self.segments[a]) {
                updates.push((i, derive_placement(p1, p2)));
            }
        }

        for (i, (sloped, placement)) in updates {
            if let Segment::Node(node) = &mut self.segments[i] {
                if sloped {
                    node.formatting = node.formatting.with("sloped", Value::Flag);
                }
                if let Some(placement) = placement {
                    trace!(label = node.label.as_str(), placement = placement.as_str(), "placed inline label");
                    node.formatting = node.formatting.with(placement, Value::Flag);
                }
            }
        }
    }
}

/// `(sloped, placement)` for a label between `p1` and `p2`.
///
/// Vertical and horizontal parts combine into one placement key such as
/// `above right`.
pub fn derive_placement(p1: &Point, p2: &Point) -> (bool, Option<String>) {
    let m = slope(p1.vec(), p2.vec());
    let sloped = m.is_finite() && m != 0.0;
    let (Some(q1), Some(q2)) = (p1.quadrant(), p2.quadrant()) else {
        return (sloped, None);
    };
    let vertical = match (q1.is_upper(), q2.is_upper()) {
        (true, true) => Some("above"),
        (false, false) => Some("below"),
        _ => None,
    };
    let horizontal = match (q1.is_right(), q2.is_right()) {
        (true, true) => Some("right"),
        (false, false) => Some("left"),
        _ => None,
    };
    let placement = match (vertical, horizontal) {
        (Some(v), Some(h)) => Some(format!("{v} {h}")),
        (Some(v), None) => Some(v.to_string()),
        (None, Some(h)) => Some(h.to_string()),
        (None, None) => None,
    };
    (sloped, placement)
}

impl Emit for Draw {
    fn emit(&self, _scene: &Scene, out: &mut String) {
        let mut body = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Point(p) => body.push_str(&p.to_string()),
                Segment::Operator(op) => body.push_str(op.emitted()),
                Segment::Node(node) => body.push_str(&format!(" {node} ")),
            }
        }
        out.push_str(&format!("\\draw [{}] {};", self.formatting, body.trim()));
    }

    fn points(&self) -> Vec<&Point> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Point(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn annotate(&mut self, midpoint: &Point) {
        for segment in &mut self.segments {
            if let Segment::Point(p) = segment {
                p.classify(midpoint);
            }
        }
        self.place_labels();
    }
}

/// Cursor over a path body
struct PathScanner<'s, 'r> {
    body: &'s str,
    cursor: usize,
    resolver: Resolver<'r>,
    /// Last absolute point, base for relative coordinates
    pen: Option<Point>,
    /// Relative operator waiting for its coordinate
    pending: Option<PathOperator>,
    segments: Vec<Segment>,
}

impl<'s, 'r> PathScanner<'s, 'r> {
    fn new(body: &'s str, resolver: Resolver<'r>) -> Self {
        PathScanner {
            body,
            cursor: 0,
            resolver,
            pen: None,
            pending: None,
            segments: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Segment>, ErrorKind> {
        for _ in 0..SCAN_LIMIT {
            if self.at_end() {
                return Ok(self.segments);
            }
            self.step()?;
        }
        if self.at_end() {
            return Ok(self.segments);
        }
        debug!(offset = self.cursor, rest = &self.body[self.cursor..], "path scan exhausted");
        Err(PathError::ExceededScanLimit { offset: self.cursor }.into())
    }

    fn at_end(&mut self) -> bool {
        let rest = &self.body[self.cursor..];
        self.cursor += rest.len() - rest.trim_start().len();
        self.cursor >= self.body.len()
    }

    /// Try each token kind once at the cursor. No match leaves it in place.
    fn step(&mut self) -> Result<(), ErrorKind> {
        let body = self.body;
        let rest = &body[self.cursor..];
        if let Some(pair) = match_prefix(Rule::path_coordinate, rest) {
            let len = pair.as_span().end();
            let expr = pair.into_inner().next().map_or("", |p| p.as_str());
            let point = self.resolve(expr)?;
            self.segments.push(Segment::Point(point));
            self.cursor += len;
        } else if let Some(pair) = match_prefix(Rule::path_operator, rest) {
            let len = pair.as_span().end();
            let op = pair
                .into_inner()
                .next()
                .and_then(|p| PathOperator::from_rule(p.as_rule()));
            if let Some(op) = op {
                self.pending = op.is_relative().then_some(op);
                self.segments.push(Segment::Operator(op));
                self.cursor += len;
            }
        } else if let Some(pair) = match_prefix(Rule::path_node, rest) {
            let len = pair.as_span().end();
            self.segments.push(Segment::Node(inline_node(pair)));
            self.cursor += len;
        }
        Ok(())
    }

    fn resolve(&mut self, expr: &str) -> Result<Point, ErrorKind> {
        let point = match self.pending.take() {
            Some(op) if op.is_relative() => {
                let pen = self.pen.as_ref().ok_or(PathError::MissingAnchor)?;
                let point = self.resolver.resolve_relative(expr, pen)?;
                if op == PathOperator::IncrementalLine {
                    self.pen = Some(point.clone());
                }
                point
            }
            _ => {
                let point = self.resolver.resolve(expr)?;
                self.pen = Some(point.clone());
                point
            }
        };
        trace!(expr, x = point.x(), y = point.y(), "path coordinate");
        Ok(point)
    }
}

fn match_prefix(rule: Rule, input: &str) -> Option<Pair<'_, Rule>> {
    TikzParser::parse(rule, input).ok()?.next()
}

fn inline_node(pair: Pair<'_, Rule>) -> InlineNode {
    let mut label = "";
    let mut options = "";
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::options => options = part.into_inner().next().map_or("", |p| p.as_str()),
            Rule::arg => label = part.into_inner().next().map_or("", |p| p.as_str()),
            _ => {}
        }
    }
    InlineNode::new(label, Formatting::parse(options, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Scope;
    use glam::dvec2;

    fn scope() -> Scope {
        let mut s = Scope::new();
        s.define("A", Point::new(1.0, 2.0));
        s.define("B", Point::new(3.0, 4.0));
        s
    }

    fn scan(body: &str) -> Result<Draw, ErrorKind> {
        let s = scope();
        Draw::parse(Formatting::new(), body, Resolver::new(&s))
    }

    fn emit(draw: &Draw) -> String {
        let mut out = String::new();
        draw.emit(&Scene::default(), &mut out);
        out
    }

    #[test]
    fn simple_line() {
        let draw = scan("(A)--(B)").unwrap();
        assert_eq!(
            draw.segments,
            vec![
                Segment::Point(Point::new(1.0, 2.0).named("A")),
                Segment::Operator(PathOperator::Line),
                Segment::Point(Point::new(3.0, 4.0).named("B")),
            ]
        );
        assert_eq!(emit(&draw), "\\draw [] (1,2)--(3,4);");
    }

    #[test]
    fn operators_and_cycle() {
        let draw = scan(" (0,0) -| (A) |- (B) -- cycle ").unwrap();
        let ops: Vec<_> = draw
            .segments
            .iter()
            .filter_map(|s| match s {
                Segment::Operator(op) => Some(*op),
                _ => None,
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                PathOperator::HorizontalFirst,
                PathOperator::VerticalFirst,
                PathOperator::Line,
                PathOperator::Cycle
            ]
        );
        assert!(draw.is_closed());
        assert_eq!(emit(&draw), "\\draw [] (0,0)-|(1,2)|-(3,4)--cycle;");
    }

    #[test]
    fn relative_keeps_pen_incremental_moves_it() {
        let draw = scan("(1,1)--+(1,0)--+(0,1)").unwrap();
        let pts: Vec<_> = draw.points().iter().map(|p| p.vec()).collect();
        assert_eq!(pts, vec![dvec2(1.0, 1.0), dvec2(2.0, 1.0), dvec2(1.0, 2.0)]);

        let draw = scan("(1,1)--++(1,0)--++(0,1)").unwrap();
        let pts: Vec<_> = draw.points().iter().map(|p| p.vec()).collect();
        assert_eq!(pts, vec![dvec2(1.0, 1.0), dvec2(2.0, 1.0), dvec2(2.0, 2.0)]);
        assert_eq!(emit(&draw), "\\draw [] (1,1)--(2,1)--(2,2);");
    }

    #[test]
    fn relative_without_anchor_fails() {
        assert_eq!(scan("--+(1,0)").unwrap_err(), ErrorKind::Path(PathError::MissingAnchor));
    }

    #[test]
    fn inline_nodes_are_parsed() {
        let draw = scan("(A) -- node[red] {$F$} (B)").unwrap();
        let nodes: Vec<_> = draw.inline_nodes().collect();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].label, "$F$");
        assert!(nodes[0].formatting.contains("color"));
        assert_eq!(emit(&draw), "\\draw [] (1,2)-- node [red] {$F$} (3,4);");
    }

    #[test]
    fn unmatched_text_exhausts_the_scan() {
        let err = scan("(A) -- ??? (B)").unwrap_err();
        assert_eq!(err, ErrorKind::Path(PathError::ExceededScanLimit { offset: 7 }));
        let err = scan("circle").unwrap_err();
        assert_eq!(err, ErrorKind::Path(PathError::ExceededScanLimit { offset: 0 }));
    }

    #[test]
    fn long_paths_fit_within_the_limit() {
        let body = vec!["(0,0)"; 50].join("--");
        assert_eq!(scan(&body).unwrap().segments.len(), 99);
    }

    #[test]
    fn unknown_coordinate_in_path() {
        assert!(matches!(scan("(A)--(Q)"), Err(ErrorKind::Resolution(_))));
    }

    #[test]
    fn placement_above_and_sloped() {
        let mid = Point::new(0.0, 0.0);
        let mut draw = Draw::vector(Point::new(1.0, 1.0), Point::new(3.0, 2.0), "v", Formatting::new());
        draw.annotate(&mid);
        let node = draw.inline_nodes().next().unwrap();
        assert_eq!(node.formatting.to_string(), "sloped, above right");
    }

    #[test]
    fn placement_horizontal_line() {
        let mid = Point::new(0.0, 0.0);
        let mut draw = Draw::vector(Point::new(-2.0, -1.0), Point::new(2.0, -1.0), "x", Formatting::new());
        draw.annotate(&mid);
        let node = draw.inline_nodes().next().unwrap();
        assert_eq!(node.formatting.to_string(), "below");
    }

    #[test]
    fn explicit_placement_suppresses_derivation() {
        let s = scope();
        let mut draw = Draw::parse(Formatting::new(), "(A)-- node[left]{x} (B)", Resolver::new(&s)).unwrap();
        draw.annotate(&Point::new(0.0, 0.0));
        let node = draw.inline_nodes().next().unwrap();
        assert_eq!(node.formatting.to_string(), "left");
    }

    #[test]
    fn trailing_node_wraps_on_cycle_only() {
        let mid = Point::new(0.0, 0.0);
        let s = scope();
        let mut open = Draw::parse(Formatting::new(), "(A)--(B) node{end}", Resolver::new(&s)).unwrap();
        open.annotate(&mid);
        assert!(open.inline_nodes().next().unwrap().formatting.is_empty());

        let mut closed =
            Draw::parse(Formatting::new(), "(A)--(B)--cycle node{end}", Resolver::new(&s)).unwrap();
        closed.annotate(&mid);
        assert_eq!(
            closed.inline_nodes().next().unwrap().formatting.to_string(),
            "sloped, above right"
        );
    }

    #[test]
    fn vector_without_label_has_no_node() {
        let draw = Draw::vector(Point::new(0.0, 0.0), Point::new(1.0, 0.0), "", Formatting::new());
        assert_eq!(draw.segments.len(), 3);
        assert_eq!(emit(&draw), "\\draw [] (0,0)--(1,0);");
    }
}
