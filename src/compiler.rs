//! Builds the token stream from lexed source and serializes it.

use pest::iterators::Pair;

use crate::coordinate::{Coordinate, Label, Node};
use crate::errors::{ErrorKind, LexError, PreprocessError, SourceContext};
use crate::figure::{AnglePic, Axes, Circle, Grid};
use crate::formatting::{Formatting, Preset};
use crate::geometry::Extent;
use crate::lexer::{Lexeme, MacroKind, MacroMatch, lex};
use crate::log::debug;
use crate::path::Draw;
use crate::point::Point;
use crate::preamble;
use crate::resolve::{Resolver, Scope};
use crate::token::{Emit, RawText, Scene, Token};
use crate::Rule;

/// Options for a preprocessing call
#[derive(Debug, Clone)]
pub struct PreprocessOptions {
    /// Wrap the body in the preamble and epilogue
    pub standalone: bool,
    /// Name shown in diagnostics
    pub source_name: String,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            standalone: true,
            source_name: "<input>".to_string(),
        }
    }
}

impl PreprocessOptions {
    pub fn standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }
}

/// One preprocessing run over a source string.
///
/// Construction does all the work: lexing, building tokens in source order,
/// the midpoint and the quadrant and label-placement passes. The result can
/// then be inspected or serialized.
#[derive(Debug)]
pub struct Preprocessor {
    ctx: SourceContext,
    options: PreprocessOptions,
    scope: Scope,
    tokens: Vec<Token>,
    scene: Scene,
}

impl Preprocessor {
    pub fn new(source: &str) -> Result<Self, PreprocessError> {
        Self::with_options(source, &PreprocessOptions::default())
    }

    pub fn with_options(source: &str, options: &PreprocessOptions) -> Result<Self, PreprocessError> {
        let ctx = SourceContext::new(&options.source_name, source);
        let lexemes = lex(source).map_err(|failure| {
            PreprocessError::new(failure.error.into(), &ctx, failure.span.start, failure.span.len())
        })?;

        let mut this = Preprocessor {
            ctx,
            options: options.clone(),
            scope: Scope::new(),
            tokens: Vec::with_capacity(lexemes.len()),
            scene: Scene::default(),
        };
        for lexeme in lexemes {
            let token = match lexeme {
                Lexeme::Raw { text, .. } => Token::Raw(RawText(text.to_string())),
                Lexeme::Macro(m) => this.build(&m).map_err(|kind| {
                    PreprocessError::new(kind, &this.ctx, m.span.start, m.span.len())
                })?,
            };
            this.tokens.push(token);
        }
        this.finish();
        Ok(this)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Mean of every point in the diagram, `None` when there are none
    pub fn midpoint(&self) -> Option<&Point> {
        self.scene.midpoint.as_ref()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn extent(&self) -> Extent {
        self.scene.extent
    }

    /// Every point that took part in the midpoint, in source order
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.tokens.iter().flat_map(|t| t.points())
    }

    /// The expanded body without preamble or epilogue
    pub fn body(&self) -> String {
        let mut out = String::with_capacity(self.ctx.source.len());
        for token in &self.tokens {
            token.emit(&self.scene, &mut out);
        }
        out
    }

    /// Final output, wrapped unless the options ask for the bare body
    pub fn output(&self) -> String {
        let body = self.body();
        if self.options.standalone {
            preamble::wrap(&body)
        } else {
            body
        }
    }

    fn build(&mut self, m: &MacroMatch<'_>) -> Result<Token, ErrorKind> {
        let resolver = Resolver::new(&self.scope);
        let pair = m.pair.clone();
        let token = match m.kind {
            MacroKind::Coor => {
                let [expr, name, label, fmt] = args(pair, m.kind)?;
                let name = name.trim();
                if name.is_empty() {
                    return Err(LexError::MalformedMacro { keyword: m.kind.keyword() }.into());
                }
                let point = resolver.resolve(expr)?;
                let label = Label::new(label.trim(), Formatting::parse(fmt, None));
                self.scope.define(name, point.clone());
                Token::Coordinate(Coordinate::new(point, name).with_label(label))
            }
            MacroKind::Coordinate => {
                let mut formatting = Formatting::new();
                let mut name = "";
                let mut expr = "";
                for part in pair.into_inner() {
                    match part.as_rule() {
                        Rule::options => formatting = Formatting::parse(inner_text(part), None),
                        Rule::coordinate_name => name = part.as_str(),
                        Rule::paren_body => expr = part.as_str(),
                        _ => {}
                    }
                }
                let point = resolver.resolve(expr)?;
                self.scope.define(name, point.clone());
                Token::Coordinate(Coordinate::new(point, name).with_formatting(formatting))
            }
            MacroKind::Node | MacroKind::Mass => {
                let [expr, label, fmt] = args(pair, m.kind)?;
                let preset = (m.kind == MacroKind::Mass).then_some(Preset::Mass);
                Token::Node(Node {
                    point: resolver.resolve(expr)?,
                    label: label.to_string(),
                    formatting: Formatting::parse(fmt, preset),
                })
            }
            MacroKind::Draw => {
                let mut formatting = Formatting::new();
                let mut body = "";
                for part in pair.into_inner() {
                    match part.as_rule() {
                        Rule::options => formatting = Formatting::parse(inner_text(part), None),
                        Rule::path_body => body = part.as_str(),
                        _ => {}
                    }
                }
                Token::Draw(Draw::parse(formatting, body, resolver)?)
            }
            MacroKind::Vec => {
                let [from, to, label, fmt] = args(pair, m.kind)?;
                let from = resolver.resolve(from)?;
                let to = resolver.resolve(to)?;
                Token::Draw(Draw::vector(from, to, label.trim(), Formatting::parse(fmt, Some(Preset::Vec))))
            }
            MacroKind::Circle => {
                let [a, b, c, fmt] = args(pair, m.kind)?;
                let (a, b, c) = (resolver.resolve(a)?, resolver.resolve(b)?, resolver.resolve(c)?);
                Token::Circle(Circle::through(&a, &b, &c, Formatting::parse(fmt, None))?)
            }
            MacroKind::Pic => {
                let [a, b, c, label, fmt] = args(pair, m.kind)?;
                let names = [a, b, c].map(|n| n.trim().to_string());
                for name in &names {
                    self.scope.lookup(name)?;
                }
                Token::AnglePic(AnglePic::new(names, label.trim(), fmt))
            }
            MacroKind::XyAxis => {
                let [x_label, y_label] = args(pair, m.kind)?;
                Token::Axes(Axes {
                    x_label: x_label.trim().to_string(),
                    y_label: y_label.trim().to_string(),
                })
            }
            MacroKind::Grid => {
                let [fmt] = args(pair, m.kind)?;
                Token::Grid(Grid::new(fmt))
            }
        };
        Ok(token)
    }

    /// Midpoint, extent and the annotation passes
    fn finish(&mut self) {
        let midpoint = Point::mean(self.points());
        let mut extent = Extent::new();
        for p in self.points() {
            extent.expand(p.vec());
        }
        if let Some(mid) = &midpoint {
            for token in &mut self.tokens {
                token.annotate(mid);
            }
        }
        debug!(
            tokens = self.tokens.len(),
            names = self.scope.len(),
            "built token stream"
        );
        self.scene = Scene { midpoint, extent };
    }
}

/// Argument texts of a brace-argument macro, exactly `N` of them
fn args<const N: usize>(pair: Pair<'_, Rule>, kind: MacroKind) -> Result<[&str; N], ErrorKind> {
    let texts: Vec<&str> = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::arg)
        .map(inner_text)
        .collect();
    texts
        .try_into()
        .map_err(|_| LexError::MalformedMacro { keyword: kind.keyword() }.into())
}

/// Text of the body inside an `arg` or `options` pair
fn inner_text(pair: Pair<'_, Rule>) -> &str {
    pair.into_inner().next().map_or("", |p| p.as_str())
}
