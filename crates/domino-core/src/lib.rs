#![forbid(unsafe_code)]

//! Core: geometry, compass directions, colors, and logging shared by the
//! typed-collection and layout crates.

pub mod color;
pub mod direction;
pub mod geometry;
pub mod logging;

pub use color::Rgb;
pub use direction::{Axis, Direction};
pub use geometry::{Point, Rect, Size};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
