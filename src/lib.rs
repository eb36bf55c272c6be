//! Expand a compact coordinate macro language into TikZ source.
//!
//! ```
//! let out = tikzmac::preprocess("\\coor{1,2}{A}{$A$}{}\\draw[] (A)--(3,4);").unwrap();
//! assert!(out.contains("\\draw [] (1,2)--(3,4);"));
//! ```

pub mod compiler;
pub mod coordinate;
pub mod errors;
pub mod figure;
pub mod formatting;
pub mod geometry;
pub mod lexer;
pub mod log;
pub mod path;
pub mod point;
pub mod preamble;
pub mod resolve;
pub mod token;

use pest_derive::Parser;

pub use compiler::{PreprocessOptions, Preprocessor};
pub use errors::{ErrorKind, PreprocessError};
pub use point::{Point, Quadrant};
pub use token::Token;

#[derive(Parser)]
#[grammar = "tikzmac.pest"]
pub struct TikzParser;

/// Expand every macro in `source` and wrap the result in the preamble.
///
/// Returns the complete document, or the first error with diagnostics.
pub fn preprocess(source: &str) -> Result<String, PreprocessError> {
    preprocess_with_options(source, &PreprocessOptions::default())
}

pub fn preprocess_with_options(source: &str, options: &PreprocessOptions) -> Result<String, PreprocessError> {
    Ok(Preprocessor::with_options(source, options)?.output())
}
