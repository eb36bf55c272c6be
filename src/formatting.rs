//! Formatting records: the `key=value, flag, ...` option lists attached to
//! coordinates, nodes and paths.
//!
//! A list is split on top-level commas and each item is matched against a
//! fixed, ordered pattern table. Presets (`mass`, `vec`, `helplines`, `ang`)
//! contribute a bundle of defaults that explicit items override. Lengths with
//! a `pt`, `cm` or `mm` suffix are stored in points.

use std::fmt;

use crate::log::debug;
use crate::point::format_number;

/// Points per centimetre
pub const PT_PER_CM: f64 = 28.346;
/// Points per millimetre
pub const PT_PER_MM: f64 = 2.8346;

/// Keys whose value is written without the `key=` prefix
const BARE_KEYS: &[&str] = &["arrows", "color", "line style", "quotes"];

/// Keys that pin down where a label goes
const PLACEMENT_KEYS: &[&str] = &[
    "above",
    "below",
    "left",
    "right",
    "above left",
    "above right",
    "below left",
    "below right",
    "anchor",
];

const LINE_STYLES: &[&str] = &[
    "solid",
    "dashed",
    "dotted",
    "dashdotted",
    "dash dot",
    "densely dashed",
    "densely dotted",
    "densely dashdotted",
    "loosely dashed",
    "loosely dotted",
    "loosely dashdotted",
];

const COLORS: &[&str] = &[
    "red", "green", "blue", "cyan", "magenta", "yellow", "black", "gray", "white", "darkgray",
    "lightgray", "brown", "lime", "olive", "orange", "pink", "purple", "teal", "violet",
];

/// A single property value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Bare key such as `draw` or `sloped`
    Flag,
    /// Unitless number
    Number(f64),
    /// Length in points
    Length(f64),
    Text(String),
    Group(Formatting),
}

/// An ordered property map.
///
/// Overriding a key keeps the position of its first occurrence, so output
/// order is stable regardless of which preset or item set the value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Formatting {
    entries: Vec<(String, Value)>,
}

impl Formatting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a style list with an optional starting preset
    pub fn parse(list: &str, preset: Option<Preset>) -> Self {
        let mut builder = FormattingBuilder::new();
        if let Some(preset) = preset {
            builder = builder.preset(preset);
        }
        builder.items(list).build()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether an explicit label placement is present
    pub fn has_placement(&self) -> bool {
        PLACEMENT_KEYS.iter().any(|k| self.contains(k))
    }

    /// Copy of this record with `key` set to `value`
    pub fn with(&self, key: impl Into<String>, value: Value) -> Formatting {
        let mut next = self.clone();
        next.insert(key.into(), value);
        next
    }

    /// Copy of this record with `key` removed
    pub fn without(&self, key: &str) -> Formatting {
        Formatting {
            entries: self.entries.iter().filter(|(k, _)| k != key).cloned().collect(),
        }
    }

    fn insert(&mut self, key: String, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }
}

impl fmt::Display for Formatting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                Value::Flag => f.write_str(key)?,
                Value::Number(n) => write!(f, "{key}={}", format_number(*n))?,
                Value::Length(pt) => write!(f, "{key}={}pt", format_number(*pt))?,
                Value::Text(text) if BARE_KEYS.contains(&key.as_str()) => f.write_str(text)?,
                Value::Text(text) => write!(f, "{key}={text}")?,
                Value::Group(group) => write!(f, "{key}={{{group}}}")?,
            }
        }
        Ok(())
    }
}

/// Named bundle of default properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Mass,
    Vec,
    HelpLines,
    Angle,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Mass, Preset::Vec, Preset::HelpLines, Preset::Angle];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mass" => Some(Preset::Mass),
            "vec" => Some(Preset::Vec),
            "helplines" => Some(Preset::HelpLines),
            "ang" => Some(Preset::Angle),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Mass => "mass",
            Preset::Vec => "vec",
            Preset::HelpLines => "helplines",
            Preset::Angle => "ang",
        }
    }

    fn bundle(self) -> &'static str {
        match self {
            Preset::Mass => "fill=yellow!60, draw, minimum width=1cm, minimum height=1cm",
            Preset::Vec => "line width=1pt, ->",
            Preset::HelpLines => "gray!50, line width=0.2pt",
            Preset::Angle => {
                "fill=black!50, opacity=0.5, text opacity=0.9, draw=orange, <->, \
                 angle eccentricity=1.6, angle radius=0.5cm, text=orange, font=\\large"
            }
        }
    }
}

/// Builds an immutable [`Formatting`] from presets and explicit items.
///
/// Presets are applied first, in the order they were added, then explicit
/// items in source order.
#[derive(Debug, Default)]
pub struct FormattingBuilder {
    presets: Vec<Preset>,
    explicit: Vec<(String, Value)>,
}

impl FormattingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preset(mut self, preset: Preset) -> Self {
        if !self.presets.contains(&preset) {
            self.presets.push(preset);
        }
        self
    }

    /// Add the items of a style list. Preset names switch their preset on.
    pub fn items(mut self, list: &str) -> Self {
        for item in split_top_level(list) {
            if let Some(preset) = Preset::from_name(item) {
                self = self.preset(preset);
                continue;
            }
            match match_item(item) {
                Some(entry) => self.explicit.push(entry),
                None => debug!(item, "dropping unrecognized formatting item"),
            }
        }
        self
    }

    pub fn set(mut self, key: impl Into<String>, value: Value) -> Self {
        self.explicit.push((key.into(), value));
        self
    }

    pub fn build(self) -> Formatting {
        let mut out = Formatting::new();
        for preset in &self.presets {
            for item in split_top_level(preset.bundle()) {
                if let Some((key, value)) = match_item(item) {
                    out.insert(key, value);
                }
            }
        }
        for (key, value) in self.explicit {
            out.insert(key, value);
        }
        out
    }
}

/// Split on commas outside braces and double quotes. Items are trimmed and
/// empty items skipped.
pub fn split_top_level(list: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '{' if !quoted => depth += 1,
            '}' if !quoted => depth = depth.saturating_sub(1),
            '"' => quoted = !quoted,
            ',' if depth == 0 && !quoted => {
                items.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&list[start..]);
    items.into_iter().map(str::trim).filter(|s| !s.is_empty()).collect()
}

type Matcher = fn(&str) -> Option<(String, Value)>;

/// Ordered pattern table; the first matcher that accepts an item wins
const PATTERNS: &[(&str, Matcher)] = &[
    ("group", match_group),
    ("numeric", match_numeric),
    ("arrows", match_arrows),
    ("quotes", match_quotes),
    ("line style", match_line_style),
    ("color", match_color),
    ("assignment", match_assignment),
    ("flag", match_flag),
];

fn match_item(item: &str) -> Option<(String, Value)> {
    PATTERNS.iter().find_map(|(_kind, matcher)| matcher(item))
}

fn split_assignment(item: &str) -> Option<(&str, &str)> {
    let (key, value) = item.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    (!key.is_empty() && !value.is_empty()).then_some((key, value))
}

/// `key={...}` whose body is itself a well-formed style list
fn match_group(item: &str) -> Option<(String, Value)> {
    let (key, value) = split_assignment(item)?;
    let body = value.strip_prefix('{')?.strip_suffix('}')?;
    if !is_balanced(body) {
        return None;
    }
    let items = split_top_level(body);
    if items.is_empty() || items.iter().any(|i| match_item(i).is_none()) {
        return None;
    }
    Some((key.to_string(), Value::Group(Formatting::parse(body, None))))
}

fn match_numeric(item: &str) -> Option<(String, Value)> {
    let (key, value) = split_assignment(item)?;
    Some((key.to_string(), parse_length(value)?))
}

/// Parse a number with an optional `pt`, `cm` or `mm` suffix
pub fn parse_length(text: &str) -> Option<Value> {
    let text = text.trim();
    let (digits, scale) = if let Some(n) = text.strip_suffix("cm") {
        (n, Some(PT_PER_CM))
    } else if let Some(n) = text.strip_suffix("mm") {
        (n, Some(PT_PER_MM))
    } else if let Some(n) = text.strip_suffix("pt") {
        (n, Some(1.0))
    } else {
        (text, None)
    };
    let digits = digits.trim();
    if !digits.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '.' | '-' | '+')) {
        return None;
    }
    let n = digits.parse::<f64>().ok().filter(|n| n.is_finite())?;
    Some(match scale {
        Some(scale) => Value::Length(n * scale),
        None => Value::Number(n),
    })
}

fn match_arrows(item: &str) -> Option<(String, Value)> {
    if item.contains('=') || !item.contains('-') || item.contains(' ') {
        return None;
    }
    let tips_only = item.len() > 1 && item.chars().all(|c| matches!(c, '<' | '>' | '|' | '-'));
    let (tail, head) = item.split_once('-')?;
    // named tips may carry primes: `latex'`, `stealth''`
    let tip = |s: &str| {
        s.is_empty()
            || (s.starts_with('{') && s.ends_with('}'))
            || (s.starts_with(|c: char| c.is_ascii_alphabetic())
                && s.chars().all(|c| c.is_ascii_alphabetic() || c == '\''))
    };
    let named_tips = tip(tail) && tip(head) && !(tail.is_empty() && head.is_empty());
    (tips_only || named_tips).then(|| ("arrows".to_string(), Value::Text(item.to_string())))
}

fn match_quotes(item: &str) -> Option<(String, Value)> {
    (item.len() >= 2 && item.starts_with('"') && item.ends_with('"'))
        .then(|| ("quotes".to_string(), Value::Text(item.to_string())))
}

fn match_line_style(item: &str) -> Option<(String, Value)> {
    let normalized = normalize_words(item);
    LINE_STYLES
        .contains(&normalized.as_str())
        .then(|| ("line style".to_string(), Value::Text(normalized)))
}

/// A color name, optionally mixed: `red`, `blue!30`, `blue!30!black`.
///
/// Inside a mix any alphabetic name counts as a color, so user-defined
/// colors like `MyBlue!40` are kept.
fn match_color(item: &str) -> Option<(String, Value)> {
    let mixed = item.contains('!');
    let is_color = |name: &str| {
        COLORS.contains(&name)
            || (mixed && !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic()))
    };
    let mut parts = item.split('!');
    let base = parts.next()?;
    if !is_color(base) {
        return None;
    }
    for (i, part) in parts.enumerate() {
        let ok = if i % 2 == 0 {
            part.parse::<f64>().is_ok_and(|p| (0.0..=100.0).contains(&p))
        } else {
            is_color(part)
        };
        if !ok {
            return None;
        }
    }
    Some(("color".to_string(), Value::Text(item.to_string())))
}

fn match_assignment(item: &str) -> Option<(String, Value)> {
    let (key, value) = split_assignment(item)?;
    Some((normalize_words(key), Value::Text(value.to_string())))
}

fn match_flag(item: &str) -> Option<(String, Value)> {
    let words_only = item.starts_with(|c: char| c.is_ascii_alphabetic())
        && item.chars().all(|c| c.is_ascii_alphabetic() || c == ' ');
    words_only.then(|| (normalize_words(item), Value::Flag))
}

fn normalize_words(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_balanced(s: &str) -> bool {
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}
