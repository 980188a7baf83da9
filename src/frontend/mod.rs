mod parser;
mod scanner;
mod source;
mod token;

use std::rc::Rc;

pub use parser::*;
pub use scanner::*;
pub use source::*;
pub use token::*;

use crate::{ast::Program, errors::ErrorReporter};

/// Syntax analysis of a whole source text
pub fn parse(code: Rc<Vec<char>>, reporter: &mut ErrorReporter, verbose: bool) -> Option<Program> {
    let mut scanner = Scanner::new(code);
    if verbose {
        scanner.enable_debugging();
    }
    Parser::with(Box::new(scanner), reporter).parse()
}
