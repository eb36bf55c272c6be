//! Fixed document header and footer wrapped around the expanded body.

use crate::formatting::{Formatting, Preset};

const PACKAGES: &str = "\\usepackage{pgfplots,ifthen}\n";

const LIBRARIES: &str = "\\usetikzlibrary{arrows.meta,angles,quotes,positioning,calc,\
intersections,decorations.markings,math,spy,matrix,patterns,shapes.geometric,shapes.misc}\n";

const DEFINITIONS: &str = "\\pgfplotsset{compat=1.16}\n\\def\\degree{^\\circ}\n";

const OPENING: &str = "\\begin{document}\n\\begin{tikzpicture}\n";

/// Closes the environments opened by [`preamble`]
pub const EPILOGUE: &str = "\n\\end{tikzpicture}\n\\end{document}";

/// Package imports, library imports, preset styles and the opening of the
/// picture environment.
///
/// Every preset is also declared as a TikZ style so hand-written TikZ in the
/// same document can use `mass`, `vec`, `helplines` and `ang`.
pub fn preamble() -> String {
    let mut out = String::new();
    out.push_str(PACKAGES);
    out.push_str(LIBRARIES);
    out.push_str(DEFINITIONS);
    out.push_str("\\tikzset{\n");
    for preset in Preset::ALL {
        let style = Formatting::parse("", Some(preset));
        out.push_str(&format!("  {}/.style={{{}}},\n", preset.name(), style));
    }
    out.push_str("}\n");
    out.push_str(OPENING);
    out
}

/// Wrap an expanded body into a standalone document
pub fn wrap(body: &str) -> String {
    let mut out = preamble();
    out.push_str(body);
    out.push_str(EPILOGUE);
    out
}
