//! Python front end: tree-sitter parsing and literal evaluation.

pub mod python;

pub use python::{parse, PyLiteral};
