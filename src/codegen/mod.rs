mod frame;
mod generator;
mod instruction;

pub use frame::*;
pub use generator::*;
pub use instruction::*;

use thiserror::Error;

use crate::{
    ast::{Program, Type},
    errors::SourcePos,
    semantic::SymbolTable,
};

/// Broken invariants of a checked program. These are faults of the compiler
/// itself, never diagnostics about the user's source.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("identifier \"{name}\" at {pos} is not bound to a declaration")]
    Unresolved { name: String, pos: SourcePos },
    #[error("expression at {0} has no valid type")]
    Untyped(SourcePos),
    #[error("type {0} has no runtime representation")]
    NoRepresentation(Type),
    #[error("operator \"{0}\" is out of place at {1}")]
    UnexpectedOperator(&'static str, SourcePos),
    #[error("invalid assignment target at {0}")]
    InvalidTarget(SourcePos),
    #[error("initializer list outside an array declaration at {0}")]
    MisplacedInitializer(SourcePos),
    #[error("array \"{name}\" declared at {pos} has no size")]
    ArraySizeMissing { name: String, pos: SourcePos },
    #[error("function \"{name}\" called from a global initializer at {pos}")]
    CallInInitializer { name: String, pos: SourcePos },
    #[error("main called explicitly at {0}")]
    MainCalled(SourcePos),
    #[error("main declared with parameters at {0}")]
    MainWithParameters(SourcePos),
    #[error("integer constant {literal} at {pos} does not fit in 32 bits")]
    IntOutOfRange { literal: String, pos: SourcePos },
    #[error("float constant {literal} at {pos} is out of range")]
    FloatOutOfRange { literal: String, pos: SourcePos },
}

pub type CodegenResult<T> = Result<T, CodegenError>;

/// Assembly text of the class `class_name` for an error free program
pub fn generate(program: &Program, symbols: &SymbolTable, class_name: &str) -> CodegenResult<String> {
    CodeGenerator::new(class_name, symbols).generate(program)
}
