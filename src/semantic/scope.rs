use crate::ast::DeclId;

const GLOBAL_LEVEL: usize = 1;

/// Identifier bindings of all open scopes, innermost last
pub struct ScopeStack {
    entries: Vec<Entry>,
    level: usize,
}

struct Entry {
    name: String,
    decl: DeclId,
    level: usize,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            level: GLOBAL_LEVEL,
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn is_global(&self) -> bool {
        self.level == GLOBAL_LEVEL
    }

    pub fn open_scope(&mut self) {
        self.level += 1;
    }

    /// Drops every binding of the innermost scope. The global scope stays open.
    pub fn close_scope(&mut self) {
        if self.is_global() {
            return;
        }
        while self.is_last_in_scope() {
            self.entries.pop();
        }
        self.level -= 1;
    }

    /// Binds `name` in the innermost scope, `false` if it is already bound there
    pub fn enter(&mut self, name: &str, decl: DeclId) -> bool {
        if self.is_declared_in_current(name) {
            return false;
        }
        self.entries.push(Entry {
            name: name.to_string(),
            decl,
            level: self.level,
        });
        true
    }

    pub fn retrieve(&self, name: &str) -> Option<DeclId> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.name == name)
            .map(|entry| entry.decl)
    }

    fn is_declared_in_current(&self, name: &str) -> bool {
        for entry in self.entries.iter().rev() {
            if entry.level < self.level {
                break;
            }
            if entry.name == name {
                return true;
            }
        }
        false
    }

    fn is_last_in_scope(&self) -> bool {
        self.entries
            .last()
            .is_some_and(|entry| entry.level == self.level)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn redeclaration_in_same_scope() {
        let mut scopes = ScopeStack::new();
        assert!(scopes.enter("x", DeclId(0)));
        assert!(!scopes.enter("x", DeclId(1)));
        assert_eq!(scopes.retrieve("x"), Some(DeclId(0)));
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let mut scopes = ScopeStack::new();
        scopes.enter("x", DeclId(0));
        scopes.open_scope();
        assert_eq!(scopes.level(), 2);
        assert!(scopes.enter("x", DeclId(1)));
        assert_eq!(scopes.retrieve("x"), Some(DeclId(1)));
        scopes.close_scope();
        assert_eq!(scopes.retrieve("x"), Some(DeclId(0)));
        assert!(scopes.is_global());
    }

    #[test]
    fn closed_bindings_are_gone() {
        let mut scopes = ScopeStack::new();
        scopes.open_scope();
        scopes.enter("tmp", DeclId(3));
        scopes.open_scope();
        scopes.close_scope();
        assert_eq!(scopes.retrieve("tmp"), Some(DeclId(3)));
        scopes.close_scope();
        assert_eq!(scopes.retrieve("tmp"), None);
    }

    #[test]
    fn global_scope_never_closes() {
        let mut scopes = ScopeStack::new();
        scopes.enter("g", DeclId(0));
        scopes.close_scope();
        assert_eq!(scopes.level(), 1);
        assert_eq!(scopes.retrieve("g"), Some(DeclId(0)));
    }
}
