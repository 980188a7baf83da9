#![allow(dead_code)]

extern crate minic;

mod probe;
pub use probe::*;

use std::rc::Rc;

use minic::{ErrorReporter, frontend, semantic};

pub fn str_to_code_ref(input: &str) -> Rc<Vec<char>> {
    Rc::new(input.chars().collect())
}

/// Parses and, when parsing succeeded, checks the snippet
pub fn analyze_using_probe(input: &str) -> Probe {
    let mut reporter = ErrorReporter::new();
    let Some(mut program) = frontend::parse(str_to_code_ref(input), &mut reporter, false) else {
        return Probe::with(None, None, reporter);
    };
    let symbols = semantic::check(&mut program, &mut reporter);
    Probe::with(Some(program), Some(symbols), reporter)
}

/// Assembly text of an error free program
pub fn compile_to_text(input: &str) -> String {
    let mut reporter = ErrorReporter::new();
    let result = minic::compile(str_to_code_ref(input), "Test", &mut reporter);
    assert!(
        !reporter.has_errors(),
        "unexpected errors: {:?}",
        reporter.errors()
    );
    match result {
        Ok(Some(text)) => text,
        Ok(None) => panic!("no code generated"),
        Err(err) => panic!("code generation fault: {err}"),
    }
}
