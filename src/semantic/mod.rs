mod analyzer;
mod scope;
pub mod stdenv;
mod symbols;

pub use analyzer::*;
pub use scope::*;
pub use symbols::*;

use crate::{ast::Program, errors::ErrorReporter};

/// Semantic analysis of a parsed program, decorating it in place
pub fn check(program: &mut Program, reporter: &mut ErrorReporter) -> SymbolTable {
    SemanticAnalyzer::new(reporter).check(program)
}
