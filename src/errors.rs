//! Error types with rich diagnostics using miette
//!
//! Every failure is fatal to a preprocessing call. The inner enums describe
//! what went wrong; [`PreprocessError`] attaches the source and the span of
//! the macro that failed.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source (block name or "<input>")
    pub name: String,
    /// The full macro source
    pub source: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }
}

// ============================================================================
// Lexing
// ============================================================================

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("malformed `\\{keyword}` macro")]
    #[diagnostic(
        code(tikzmac::lex::malformed_macro),
        help("check that every argument group is present and its braces are balanced")
    )]
    MalformedMacro { keyword: &'static str },
}

// ============================================================================
// Coordinate resolution
// ============================================================================

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("unknown coordinate `{0}`")]
    #[diagnostic(
        code(tikzmac::resolve::unknown_coordinate),
        help("coordinates must be defined before they are referenced")
    )]
    UnknownCoordinate(String),

    #[error("invalid number `{0}` in coordinate")]
    #[diagnostic(code(tikzmac::resolve::invalid_number))]
    InvalidNumber(String),

    #[error("cannot parse coordinate expression `{0}`")]
    #[diagnostic(code(tikzmac::resolve::syntax))]
    Syntax(String),
}

// ============================================================================
// Geometry
// ============================================================================

#[derive(Error, Diagnostic, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    #[error("lines are parallel and never intersect")]
    #[diagnostic(code(tikzmac::geometry::parallel_lines))]
    ParallelLines,
}

// ============================================================================
// Paths
// ============================================================================

#[derive(Error, Diagnostic, Debug, Clone, Copy, PartialEq)]
pub enum PathError {
    #[error("path scan made no progress past byte {offset} of the path body")]
    #[diagnostic(
        code(tikzmac::path::scan_limit),
        help("paths may only contain coordinates, `--`, `-|`, `|-`, `cycle`, `--+`, `--++` and `node`")
    )]
    ExceededScanLimit { offset: usize },

    #[error("relative coordinate has no preceding point")]
    #[diagnostic(code(tikzmac::path::missing_anchor))]
    MissingAnchor,
}

// ============================================================================
// Top level
// ============================================================================

/// Everything that can abort a preprocessing call
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),
}

/// A failed preprocessing call, pointing at the macro that caused it
#[derive(Error, Diagnostic, Debug)]
#[error("{kind}")]
#[diagnostic(code(tikzmac::preprocess))]
pub struct PreprocessError {
    pub kind: ErrorKind,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("while expanding this macro")]
    pub span: SourceSpan,
    #[help]
    pub help: Option<String>,
}

impl PreprocessError {
    pub(crate) fn new(kind: ErrorKind, ctx: &SourceContext, offset: usize, len: usize) -> Self {
        let help = kind.help().map(|h| h.to_string());
        Self {
            kind,
            src: ctx.named_source(),
            span: (offset, len).into(),
            help,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Byte offset of the failing macro in the source
    pub fn offset(&self) -> usize {
        self.span.offset()
    }
}
