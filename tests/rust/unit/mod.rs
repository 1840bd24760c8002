//! Unit tests - public API behavior that needs no external files
//!
//! These exercise one layer at a time through the crate's public surface.

mod parser_robustness_tests;
mod pipeline_shape_tests;
