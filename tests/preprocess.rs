//! End-to-end checks of the public API.

use regex_lite::Regex;
use tikzmac::errors::{PathError, ResolutionError};
use tikzmac::path::SCAN_LIMIT;
use tikzmac::preamble::{EPILOGUE, preamble};
use tikzmac::{ErrorKind, PreprocessOptions, Preprocessor, Quadrant, preprocess, preprocess_with_options};

fn body(source: &str) -> String {
    preprocess_with_options(source, &PreprocessOptions::default().standalone(false)).unwrap()
}

/// Every `(x,y)` pair in emitted text
fn coordinates(text: &str) -> Vec<(f64, f64)> {
    let re = Regex::new(r"\((-?[0-9.]+),(-?[0-9.]+)\)").unwrap();
    re.captures_iter(text)
        .map(|c| (c[1].parse().unwrap(), c[2].parse().unwrap()))
        .collect()
}

#[test]
fn literal_text_round_trips() {
    for input in [
        "",
        "plain text",
        "\\begin{scope}\\node at (1,1) {x};\\end{scope}",
        "$\\vec{v}$ and \\pic[draw]{angle=A--B--C};",
    ] {
        let out = preprocess(input).unwrap();
        assert_eq!(out, format!("{}{}{}", preamble(), input, EPILOGUE));
    }
}

#[test]
fn two_coordinates_split_around_the_midpoint() {
    let pp = Preprocessor::new("\\coor{1,2}{A}{}{}\\coor{3,4}{B}{}{}").unwrap();
    let mid = pp.midpoint().unwrap();
    assert_eq!((mid.x(), mid.y()), (2.0, 3.0));
    let quadrants: Vec<_> = pp.points().map(|p| p.quadrant()).collect();
    assert_eq!(quadrants, vec![Some(Quadrant::LowerLeft), Some(Quadrant::UpperRight)]);
}

#[test]
fn draw_after_definitions() {
    let out = body("\\coor{1,2}{A}{}{}\\coor{3,4}{B}{}{}\\draw[] (A)--(B);");
    assert!(out.ends_with("\\draw [] (1,2)--(3,4);"), "{out}");
}

#[test]
fn intersection_ignores_operand_order() {
    let defs = "\\coor{-2,3}{H1}{}{}\\coor{5,3}{H2}{}{}\\coor{1,-4}{V1}{}{}\\coor{1,7}{V2}{}{}";
    for expr in [
        "H1 and H2 and V1 and V2",
        "V1 and V2 and H1 and H2",
        "H2 and H1 and V2 and V1",
        "V2 and V1 and H2 and H1",
    ] {
        let out = body(&format!("{defs}\\coor{{{expr}}}{{X}}{{}}{{}}"));
        assert!(out.ends_with("\\coordinate (X) at (1,3);"), "{expr}: {out}");
    }
}

#[test]
fn merge_chains_fold_left() {
    let defs = "\\coor{1,2}{A}{}{}\\coor{3,4}{B}{}{}\\coor{-1,5}{C}{}{}";
    let left = body(&format!("{defs}\\coor{{A+B+C}}{{P}}{{}}{{}}"));
    let grouped = body(&format!("{defs}\\coor{{(A+B)+C}}{{P}}{{}}{{}}"));
    assert_eq!(left, grouped);
    assert!(left.ends_with("(P) at (3,11);"));
}

#[test]
fn unmatched_path_terminates_with_scan_limit() {
    let garbage = "@".repeat(SCAN_LIMIT * 3);
    let err = preprocess(&format!("\\draw {garbage};")).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::Path(PathError::ExceededScanLimit { offset: 0 })
    );
}

#[test]
fn errors_point_at_the_failing_macro() {
    let source = "intro\n\\coor{0,0}{A}{}{}\n\\node{Q}{x}{}\n";
    let err = preprocess(source).unwrap_err();
    assert_eq!(
        err.kind(),
        &ErrorKind::Resolution(ResolutionError::UnknownCoordinate("Q".into()))
    );
    assert_eq!(&source[err.offset()..err.offset() + err.span.len()], "\\node{Q}{x}{}");
}

#[test]
fn error_renders_as_a_diagnostic() {
    let options = PreprocessOptions::default().source_name("figure.tikz");
    let err = preprocess_with_options("\\coor{1,x}{A}{}{}", &options).unwrap_err();
    let report = format!("{:?}", miette::Report::new(err));
    assert!(report.contains("invalid number `x`"), "{report}");
}

#[test]
fn emitted_coordinates_are_resolved() {
    let out = body(
        "\\coor{0,0}{O}{}{}\\coor{90:2}{N}{}{}\\draw (O)--(N)--++(1.5,0)--cycle;\\vec{O}{$(O)!0.5!(N)$}{}{}",
    );
    let coords = coordinates(&out);
    assert_eq!(
        coords,
        vec![(0.0, 0.0), (0.0, 2.0), (0.0, 0.0), (0.0, 2.0), (1.5, 2.0), (0.0, 0.0), (0.0, 1.0)]
    );
}

#[test]
fn numbers_are_trimmed_to_four_decimals() {
    let out = body("\\coor{30:1}{A}{}{}");
    assert_eq!(out, "\\coordinate (A) at (0.866,0.5);");
}
