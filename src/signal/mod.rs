//! Signal conditioning primitives: smoothing filters and geometry.

pub mod filter;
pub mod geometry;

pub use filter::{EmaFilter, VectorEmaFilter};
