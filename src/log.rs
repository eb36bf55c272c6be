//! Conditional logging macros.
//!
//! With the `tracing` feature the preprocessor reports lexing, resolution and
//! placement decisions through `tracing`. Without it the macros expand to
//! nothing.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __tikzmac_debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __tikzmac_trace {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{__tikzmac_debug as debug, __tikzmac_trace as trace};
