//! From-pattern matching and to-pattern expansion.

pub mod glob;
pub mod template;

pub use glob::GlobPattern;
pub use template::{Case, Segment, Template};
