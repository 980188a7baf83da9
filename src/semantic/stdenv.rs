use std::fmt::Write;

use crate::{ast::Type, errors::SourcePos};

use super::{ScopeStack, Symbol, SymbolKind, SymbolTable};

/// Runtime library class providing the built-in functions
pub const RUNTIME_CLASS: &str = "minic/lang/System";

pub struct StdFunction {
    pub name: &'static str,
    pub params: Vec<(&'static str, Type)>,
    pub return_ty: Type,
}

pub fn std_types() -> Vec<(&'static str, Type)> {
    vec![
        ("int", Type::Int),
        ("bool", Type::Bool),
        ("float", Type::Float),
        ("string", Type::String),
        ("void", Type::Void),
    ]
}

pub fn std_functions() -> Vec<StdFunction> {
    let function = |name, params, return_ty| StdFunction {
        name,
        params,
        return_ty,
    };
    vec![
        function("getInt", vec![], Type::Int),
        function("putInt", vec![("i", Type::Int)], Type::Void),
        function("getBool", vec![], Type::Bool),
        function("putBool", vec![("b", Type::Bool)], Type::Void),
        function("getFloat", vec![], Type::Float),
        function("putFloat", vec![("f", Type::Float)], Type::Void),
        function("getString", vec![], Type::String),
        function("putString", vec![("s", Type::String)], Type::Void),
        function("putLn", vec![], Type::Void),
    ]
}

/// Registers the standard environment in the global scope
pub fn populate(symbols: &mut SymbolTable, scopes: &mut ScopeStack) {
    for (name, ty) in std_types() {
        let id = symbols.declare(Symbol {
            name: name.to_string(),
            kind: SymbolKind::Type(ty),
            pos: SourcePos::default(),
        });
        scopes.enter(name, id);
    }
    for function in std_functions() {
        let params = function.params.into_iter().map(|(_, ty)| ty).collect();
        let id = symbols.declare(Symbol {
            name: function.name.to_string(),
            kind: SymbolKind::Fun {
                return_ty: function.return_ty,
                params,
                is_builtin: true,
            },
            pos: SourcePos::default(),
        });
        scopes.enter(function.name, id);
    }
}

/// Human readable listing of the standard environment
pub fn describe() -> String {
    let mut out = String::new();
    let types = std_types()
        .into_iter()
        .map(|(name, _)| name)
        .collect::<Vec<_>>();
    let _ = writeln!(out, "types: {}", types.join(", "));
    for function in std_functions() {
        let params = function
            .params
            .iter()
            .map(|(name, ty)| format!("{ty} {name}"))
            .collect::<Vec<_>>();
        let _ = writeln!(
            out,
            "{} {}({})",
            function.return_ty,
            function.name,
            params.join(", ")
        );
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn populate_global_scope() {
        let mut symbols = SymbolTable::default();
        let mut scopes = ScopeStack::new();
        populate(&mut symbols, &mut scopes);
        assert_eq!(symbols.len(), 14);

        let id = scopes.retrieve("putFloat").expect("putFloat");
        let Some(Symbol {
            kind: SymbolKind::Fun {
                params, return_ty, ..
            },
            ..
        }) = symbols.get(id)
        else {
            panic!("function expected");
        };
        assert_eq!(params, &vec![Type::Float]);
        assert_eq!(return_ty, &Type::Void);
        assert!(scopes.retrieve("getString").is_some());
        assert!(scopes.retrieve("main").is_none());
    }

    #[test]
    fn describe_lists_signatures() {
        let text = describe();
        assert!(text.starts_with("types: int, bool, float, string, void"));
        assert!(text.contains("void putInt(int i)"));
        assert!(text.contains("string getString()"));
    }
}
