use std::rc::Rc;

pub mod ast;
pub mod codegen;
pub mod errors;
pub use errors::*;
pub mod frontend;
pub mod semantic;
mod utils;
pub use utils::*;

use ast::Program;
use codegen::CodegenResult;
use semantic::SymbolTable;

/// Syntax and semantic analysis of a source text. `None` when parsing stopped
/// at a syntax error; semantic errors are left in the reporter.
pub fn analyze(
    code: Rc<Vec<char>>,
    reporter: &mut ErrorReporter,
) -> Option<(Program, SymbolTable)> {
    let mut program = frontend::parse(code, reporter, false)?;
    let symbols = semantic::check(&mut program, reporter);
    Some((program, symbols))
}

/// Whole pipeline; assembly text only for a program without errors
pub fn compile(
    code: Rc<Vec<char>>,
    class_name: &str,
    reporter: &mut ErrorReporter,
) -> CodegenResult<Option<String>> {
    let Some((program, symbols)) = analyze(code, reporter) else {
        return Ok(None);
    };
    if reporter.has_errors() {
        return Ok(None);
    }
    codegen::generate(&program, &symbols, class_name).map(Some)
}
