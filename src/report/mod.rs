//! Report generation.
//!
//! Renders the summary tables as Markdown or JSON.

pub mod generator;

pub use generator::*;
