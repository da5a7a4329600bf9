//! Comparison and equality primitives.

pub mod equals;
pub mod gt0;

pub use equals::equals;
pub use gt0::{extract, greater, less, XB};
