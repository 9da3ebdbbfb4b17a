//! A Cypher syntax tree and its renderer.
//!
//! Statements are assembled from [`ast::Query`] clauses and turned into text
//! plus a flat parameter map with [`renderer::Renderer::build`]. Generated
//! variable and parameter names are assigned while rendering, in order of
//! appearance, which keeps the output stable for a given tree.

#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod ast;
pub mod renderer;
mod value;

pub use renderer::{escape, CypherStatement, Renderer};
pub use value::{CypherValue, TemporalKind};
