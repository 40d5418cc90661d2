// Selection expression parser module

pub mod ast;
pub mod lexer;
pub mod pipeline;
pub mod selection;

// Public API re-exports
pub use ast::{Bounds, Clause};
pub use pipeline::{apply_selection, parse_selection};
