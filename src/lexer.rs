//! Splits source text into macro calls and the raw text between them.
//!
//! At every backslash the macro grammars are tried in a fixed order. The
//! first one that matches a prefix of the remaining text claims it. TeX
//! comments and control symbols (`\\`, `\%`) in raw text are skipped whole.

use std::ops::Range;

use pest::Parser;
use pest::iterators::Pair;

use crate::errors::LexError;
use crate::log::trace;
use crate::{Rule, TikzParser};

/// What to do when a keyword is present but its grammar does not match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchPolicy {
    /// Leave the text alone; it is ordinary TeX
    Literal,
    /// The keyword belongs to the preprocessor, so this is an error
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroKind {
    Coordinate,
    Coor,
    Node,
    Draw,
    Circle,
    Mass,
    Vec,
    Pic,
    XyAxis,
    Grid,
}

impl MacroKind {
    /// Match order. `\coordinate` precedes `\coor`, which is its prefix.
    pub const ALL: [MacroKind; 10] = [
        MacroKind::Coordinate,
        MacroKind::Coor,
        MacroKind::Node,
        MacroKind::Draw,
        MacroKind::Circle,
        MacroKind::Mass,
        MacroKind::Vec,
        MacroKind::Pic,
        MacroKind::XyAxis,
        MacroKind::Grid,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            MacroKind::Coordinate => "coordinate",
            MacroKind::Coor => "coor",
            MacroKind::Node => "node",
            MacroKind::Draw => "draw",
            MacroKind::Circle => "circle",
            MacroKind::Mass => "mass",
            MacroKind::Vec => "vec",
            MacroKind::Pic => "pic",
            MacroKind::XyAxis => "xyaxis",
            MacroKind::Grid => "grid",
        }
    }

    fn rule(self) -> Rule {
        match self {
            MacroKind::Coordinate => Rule::coordinate_macro,
            MacroKind::Coor => Rule::coor_macro,
            MacroKind::Node => Rule::node_macro,
            MacroKind::Draw => Rule::draw_macro,
            MacroKind::Circle => Rule::circle_macro,
            MacroKind::Mass => Rule::mass_macro,
            MacroKind::Vec => Rule::vec_macro,
            MacroKind::Pic => Rule::pic_macro,
            MacroKind::XyAxis => Rule::xyaxis_macro,
            MacroKind::Grid => Rule::grid_macro,
        }
    }

    pub fn on_mismatch(self) -> MismatchPolicy {
        match self {
            MacroKind::Coor | MacroKind::Draw => MismatchPolicy::Reject,
            _ => MismatchPolicy::Literal,
        }
    }

    /// The kind whose keyword starts `text` as a whole control word
    fn at_keyword(text: &str) -> Option<MacroKind> {
        let word = text.strip_prefix('\\')?;
        let len = word
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(word.len());
        let word = &word[..len];
        MacroKind::ALL.into_iter().find(|kind| kind.keyword() == word)
    }
}

/// A matched macro call
#[derive(Debug, Clone)]
pub struct MacroMatch<'a> {
    pub kind: MacroKind,
    /// Byte range in the source
    pub span: Range<usize>,
    pub pair: Pair<'a, Rule>,
}

#[derive(Debug, Clone)]
pub enum Lexeme<'a> {
    Raw { text: &'a str, span: Range<usize> },
    Macro(MacroMatch<'a>),
}

impl Lexeme<'_> {
    pub fn span(&self) -> Range<usize> {
        match self {
            Lexeme::Raw { span, .. } => span.clone(),
            Lexeme::Macro(m) => m.span.clone(),
        }
    }
}

/// A lexing failure and where it happened
#[derive(Debug, Clone, PartialEq)]
pub struct LexFailure {
    pub error: LexError,
    pub span: Range<usize>,
}

/// Split `source` into raw spans and macro calls, in source order.
///
/// Concatenating the text of every lexeme reproduces the source.
pub fn lex(source: &str) -> Result<Vec<Lexeme<'_>>, LexFailure> {
    let mut lexemes = Vec::new();
    let mut raw_start = 0;
    let mut pos = 0;

    while let Some(offset) = source[pos..].find(['\\', '%']) {
        let at = pos + offset;
        let rest = &source[at..];
        if rest.starts_with('%') {
            // comment runs to the end of the line
            pos = rest.find('\n').map_or(source.len(), |nl| at + nl + 1);
            continue;
        }
        match match_macro(rest) {
            Some((kind, pair)) => {
                let end = at + pair.as_span().end();
                if raw_start < at {
                    lexemes.push(Lexeme::Raw {
                        text: &source[raw_start..at],
                        span: raw_start..at,
                    });
                }
                trace!(keyword = kind.keyword(), start = at, end, "matched macro");
                lexemes.push(Lexeme::Macro(MacroMatch {
                    kind,
                    span: at..end,
                    pair,
                }));
                pos = end;
                raw_start = end;
            }
            None => {
                if let Some(kind) = MacroKind::at_keyword(rest)
                    .filter(|kind| kind.on_mismatch() == MismatchPolicy::Reject)
                {
                    return Err(LexFailure {
                        error: LexError::MalformedMacro {
                            keyword: kind.keyword(),
                        },
                        span: at..at + 1 + kind.keyword().len(),
                    });
                }
                pos = at + 1 + control_symbol_len(&rest[1..]);
            }
        }
    }

    if raw_start < source.len() {
        lexemes.push(Lexeme::Raw {
            text: &source[raw_start..],
            span: raw_start..source.len(),
        });
    }
    Ok(lexemes)
}

/// Length of the character after a backslash when it forms a control
/// symbol such as `\\` or `\%`. Letters start a control word and are left
/// for the next scan.
fn control_symbol_len(after: &str) -> usize {
    after
        .chars()
        .next()
        .filter(|c| !c.is_ascii_alphabetic())
        .map_or(0, char::len_utf8)
}

fn match_macro(rest: &str) -> Option<(MacroKind, Pair<'_, Rule>)> {
    MacroKind::ALL.into_iter().find_map(|kind| {
        let pair = TikzParser::parse(kind.rule(), rest).ok()?.next()?;
        Some((kind, pair))
    })
}
