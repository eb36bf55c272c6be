//! Coordinate expression resolution.
//!
//! A coordinate expression is one of, in priority order:
//! - a Cartesian pair `x,y`
//! - a polar pair `angle:length`
//! - a merge expression combining operands with `+`, `-|` or `!t!`
//!   (optionally inside `$...$`), reduced strictly left to right
//! - an intersection `intersection of A--B and C--D`, `A--B and C--D` or
//!   `A and B and C and D`
//! - a bare name
//!
//! Names are looked up in a [`Scope`] that only ever contains coordinates
//! defined earlier in the source.

use indexmap::IndexMap;
use pest::Parser;
use pest::iterators::Pair;

use crate::errors::{ErrorKind, ResolutionError};
use crate::geometry::{line_intersection, slope};
use crate::log::trace;
use crate::point::Point;
use crate::{Rule, TikzParser};

/// Named coordinates defined so far.
///
/// Append-only from the resolver's point of view: defining a name that
/// already exists replaces it, so the most recent definition wins. Names
/// keep the position of their first definition.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    points: IndexMap<String, Point>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name`, replacing any earlier definition
    pub fn define(&mut self, name: impl Into<String>, point: Point) {
        let name = name.into();
        let point = point.named(name.clone());
        self.points.insert(name, point);
    }

    pub fn get(&self, name: &str) -> Option<&Point> {
        self.points.get(name)
    }

    pub fn lookup(&self, name: &str) -> Result<Point, ResolutionError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| ResolutionError::UnknownCoordinate(name.to_string()))
    }

    /// Names and points in definition order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Point)> {
        self.points.iter().map(|(name, point)| (name.as_str(), point))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Resolves coordinate expressions against a scope
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    scope: &'a Scope,
}

impl<'a> Resolver<'a> {
    pub fn new(scope: &'a Scope) -> Self {
        Self { scope }
    }

    /// Resolve an expression to a concrete point
    pub fn resolve(&self, expr: &str) -> Result<Point, ErrorKind> {
        let expr = expr.trim();
        let mut pairs = TikzParser::parse(Rule::coordinate_expr, expr)
            .map_err(|_| ResolutionError::Syntax(expr.to_string()))?;
        let root = pairs
            .next()
            .and_then(|p| p.into_inner().next())
            .ok_or_else(|| ResolutionError::Syntax(expr.to_string()))?;
        let point = self.eval(root)?;
        trace!(expr, x = point.x(), y = point.y(), "resolved coordinate");
        Ok(point)
    }

    /// Resolve an expression as an offset from `anchor`
    pub fn resolve_relative(&self, expr: &str, anchor: &Point) -> Result<Point, ErrorKind> {
        Ok(anchor.add(&self.resolve(expr)?))
    }

    fn eval(&self, pair: Pair<'_, Rule>) -> Result<Point, ErrorKind> {
        match pair.as_rule() {
            Rule::cartesian => {
                let (x, y) = two_components(pair)?;
                Ok(Point::new(x, y))
            }
            Rule::polar => {
                let (angle, length) = two_components(pair)?;
                Ok(Point::polar(angle, length))
            }
            Rule::name => Ok(self.scope.lookup(pair.as_str())?),
            Rule::merge | Rule::group | Rule::operand => {
                let inner = pair.into_inner().next().ok_or_else(|| syntax_error("empty group"))?;
                self.eval(inner)
            }
            Rule::calc | Rule::chain => self.eval_chain(pair),
            Rule::intersection => self.eval_intersection(pair),
            rule => Err(syntax_error(&format!("{rule:?}"))),
        }
    }

    /// Fold `operand (op operand)*` left to right
    fn eval_chain(&self, pair: Pair<'_, Rule>) -> Result<Point, ErrorKind> {
        let mut inner = pair.into_inner();
        // A calc group wraps either a chain or a lone operand
        if let Some(first) = inner.peek() {
            if first.as_rule() == Rule::chain {
                return self.eval_chain(first);
            }
        }
        let first = inner.next().ok_or_else(|| syntax_error("empty merge"))?;
        let mut acc = self.eval(first)?;
        while let Some(op) = inner.next() {
            let rhs = inner.next().ok_or_else(|| syntax_error(op.as_str()))?;
            let rhs = self.eval(rhs)?;
            acc = apply_merge(op, &acc, &rhs)?;
        }
        Ok(acc)
    }

    fn eval_intersection(&self, pair: Pair<'_, Rule>) -> Result<Point, ErrorKind> {
        let line_pair = pair
            .into_inner()
            .find(|p| p.as_rule() == Rule::line_pair)
            .ok_or_else(|| syntax_error("intersection"))?;
        let ends = line_pair
            .into_inner()
            .map(|p| self.eval(p))
            .collect::<Result<Vec<_>, _>>()?;
        let [a1, a2, b1, b2] = ends.as_slice() else {
            return Err(syntax_error("intersection needs four points"));
        };
        let m1 = slope(a1.vec(), a2.vec());
        let m2 = slope(b1.vec(), b2.vec());
        let p = line_intersection(a1.vec(), b1.vec(), m1, m2)?;
        Ok(Point::from_vec(p))
    }
}

fn apply_merge(op: Pair<'_, Rule>, lhs: &Point, rhs: &Point) -> Result<Point, ErrorKind> {
    let op = op.into_inner().next().ok_or_else(|| syntax_error("operator"))?;
    match op.as_rule() {
        Rule::add => Ok(lhs.add(rhs)),
        Rule::project => Ok(lhs.right_projection(rhs)),
        Rule::interpolate => {
            let t = op
                .into_inner()
                .next()
                .map(|n| parse_number(n.as_str()))
                .ok_or_else(|| syntax_error("interpolation factor"))??;
            Ok(lhs.internal_point(rhs, t))
        }
        rule => Err(syntax_error(&format!("{rule:?}"))),
    }
}

fn two_components(pair: Pair<'_, Rule>) -> Result<(f64, f64), ErrorKind> {
    let mut inner = pair.into_inner();
    let mut next = || {
        inner
            .next()
            .ok_or_else(|| syntax_error("missing component"))
            .and_then(|c| parse_number(c.as_str()))
    };
    Ok((next()?, next()?))
}

/// Parse a numeric component; malformed text is an error, never zero.
pub(crate) fn parse_number(text: &str) -> Result<f64, ErrorKind> {
    let text = text.trim();
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ResolutionError::InvalidNumber(text.to_string()).into())
}

fn syntax_error(what: &str) -> ErrorKind {
    ResolutionError::Syntax(what.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GeometryError;
    use glam::dvec2;

    const EPS: f64 = 1e-9;

    fn scope() -> Scope {
        let mut s = Scope::new();
        s.define("A", Point::new(1.0, 2.0));
        s.define("B", Point::new(3.0, 4.0));
        s.define("C", Point::new(-1.0, 5.0));
        s
    }

    fn at(scope: &Scope, expr: &str) -> glam::DVec2 {
        Resolver::new(scope).resolve(expr).unwrap().vec()
    }

    fn close(a: glam::DVec2, b: glam::DVec2) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn cartesian_and_polar_literals() {
        let s = Scope::new();
        assert_eq!(at(&s, "1,2"), dvec2(1.0, 2.0));
        assert_eq!(at(&s, " -1.5 , 2e1 "), dvec2(-1.5, 20.0));
        assert!(close(at(&s, "90:2"), dvec2(0.0, 2.0)));
    }

    #[test]
    fn malformed_number_is_an_error() {
        let s = Scope::new();
        let err = Resolver::new(&s).resolve("1,x").unwrap_err();
        assert_eq!(err, ErrorKind::from(ResolutionError::InvalidNumber("x".into())));
    }

    #[test]
    fn bare_names_and_redefinition() {
        let mut s = scope();
        assert_eq!(at(&s, "A"), dvec2(1.0, 2.0));
        s.define("A", Point::new(9.0, 9.0));
        assert_eq!(at(&s, "A"), dvec2(9.0, 9.0));
        assert_eq!(s.get("A").and_then(|p| p.name()), Some("A"));
    }

    #[test]
    fn scope_iterates_in_definition_order() {
        let mut s = scope();
        s.define("D", Point::new(0.0, 0.0));
        s.define("A", Point::new(9.0, 9.0));
        let names: Vec<_> = s.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["A", "B", "C", "D"]);
        assert_eq!(s.iter().next().map(|(_, p)| p.vec()), Some(dvec2(9.0, 9.0)));
    }

    #[test]
    fn unknown_name_fails() {
        let s = scope();
        let err = Resolver::new(&s).resolve("Z").unwrap_err();
        assert_eq!(err, ErrorKind::from(ResolutionError::UnknownCoordinate("Z".into())));
        let err = Resolver::new(&s).resolve("A+Z").unwrap_err();
        assert_eq!(err, ErrorKind::from(ResolutionError::UnknownCoordinate("Z".into())));
    }

    #[test]
    fn merge_operators() {
        let s = scope();
        assert_eq!(at(&s, "A+B"), dvec2(4.0, 6.0));
        assert_eq!(at(&s, "A-|B"), dvec2(3.0, 2.0));
        assert_eq!(at(&s, "(A)!0.5!(B)"), dvec2(2.0, 3.0));
        assert_eq!(at(&s, "$(A)!0.5!(B)$"), dvec2(2.0, 3.0));
        assert_eq!(at(&s, "(A)+(1,-1)"), dvec2(2.0, 1.0));
        assert_eq!(at(&s, "($(A)!0.5!(B)$)+(0,1)"), dvec2(2.0, 4.0));
        assert_eq!(at(&s, "$(B)$"), dvec2(3.0, 4.0));
    }

    #[test]
    fn merge_is_left_associative() {
        let s = scope();
        assert_eq!(at(&s, "A+B+C"), at(&s, "(A+B)+C"));
        // -| is not associative, so the fold order is observable
        assert_eq!(at(&s, "A+B-|C"), at(&s, "(A+B)-|C"));
        assert_eq!(at(&s, "A+B-|C"), dvec2(-1.0, 6.0));
        assert_ne!(at(&s, "A+B-|C"), at(&s, "A+(B-|C)"));
    }

    #[test]
    fn intersection_is_order_independent() {
        let mut s = Scope::new();
        s.define("H1", Point::new(-2.0, 3.0));
        s.define("H2", Point::new(5.0, 3.0));
        s.define("V1", Point::new(1.0, -4.0));
        s.define("V2", Point::new(1.0, 7.0));
        let expected = dvec2(1.0, 3.0);
        for expr in [
            "H1 and H2 and V1 and V2",
            "V1 and V2 and H1 and H2",
            "H2 and H1 and V2 and V1",
            "H1--H2 and V1--V2",
            "intersection of V2--V1 and H1--H2",
        ] {
            assert!(close(at(&s, expr), expected), "{expr}");
        }
    }

    #[test]
    fn intersection_of_parallel_lines_fails() {
        let s = scope();
        let err = Resolver::new(&s).resolve("A--B and (0,0)--(2,2)").unwrap_err();
        assert_eq!(err, ErrorKind::Geometry(GeometryError::ParallelLines));
    }

    #[test]
    fn relative_resolution() {
        let s = scope();
        let p = Resolver::new(&s).resolve_relative("1,1", &Point::new(2.0, 2.0)).unwrap();
        assert_eq!(p.vec(), dvec2(3.0, 3.0));
    }

    #[test]
    fn garbage_is_a_syntax_error() {
        let s = scope();
        let err = Resolver::new(&s).resolve("A ++ ").unwrap_err();
        assert!(matches!(err, ErrorKind::Resolution(ResolutionError::Syntax(_))));
    }
}
