use crate::{
    ast::{DeclId, Type},
    errors::SourcePos,
};

#[derive(Debug, Clone)]
pub enum SymbolKind {
    Type(Type),
    Var {
        ty: Type,
        is_global: bool,
    },
    Param {
        ty: Type,
    },
    Fun {
        return_ty: Type,
        params: Vec<Type>,
        is_builtin: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub pos: SourcePos,
}

impl Symbol {
    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Fun { .. })
    }

    /// Type an applied occurrence of the name has
    pub fn value_type(&self) -> Type {
        match &self.kind {
            SymbolKind::Var { ty, .. } | SymbolKind::Param { ty } => ty.clone(),
            SymbolKind::Fun { return_ty, .. } => return_ty.clone(),
            SymbolKind::Type(_) => Type::Error,
        }
    }
}

/// Every declaration of a compilation, standard environment included
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn declare(&mut self, symbol: Symbol) -> DeclId {
        self.symbols.push(symbol);
        DeclId(self.symbols.len() - 1)
    }

    pub fn get(&self, id: DeclId) -> Option<&Symbol> {
        self.symbols.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(idx, symbol)| (DeclId(idx), symbol))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
