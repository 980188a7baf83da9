use minic::{
    ErrorInfo, ErrorReporter,
    ast::*,
    semantic::SymbolTable,
};

/// Outcome of running the front end and the semantic analysis on a snippet
pub struct Probe {
    pub program: Option<Program>,
    pub symbols: Option<SymbolTable>,
    reporter: ErrorReporter,
}

impl Probe {
    pub fn with(
        program: Option<Program>,
        symbols: Option<SymbolTable>,
        reporter: ErrorReporter,
    ) -> Self {
        Self {
            program,
            symbols,
            reporter,
        }
    }

    pub fn errors(&self) -> &[ErrorInfo] {
        self.reporter.errors()
    }

    pub fn codes(&self) -> Vec<u8> {
        self.errors().iter().filter_map(ErrorInfo::code).collect()
    }

    pub fn printed(&self) -> Vec<String> {
        self.errors().iter().map(|err| err.to_string()).collect()
    }

    pub fn top_error_message(&self) -> Option<&str> {
        self.errors().first().map(ErrorInfo::message)
    }

    pub fn program(&self) -> &Program {
        self.program.as_ref().expect("program was not parsed")
    }

    pub fn assert_no_errors(&self) {
        assert!(
            self.errors().is_empty(),
            "unexpected errors: {:?}",
            self.printed()
        );
    }

    pub fn assert_codes(&self, expected: &[u8]) {
        assert_eq!(self.codes(), expected, "errors: {:?}", self.printed());
    }

    /// Names of identifiers the analysis left without a declaration
    pub fn unbound_idents(&self) -> Vec<String> {
        let mut unbound = Vec::new();
        for decl in self.program().decls.iter() {
            match decl {
                Decl::Var(var) => collect_var(var, &mut unbound),
                Decl::Fun(fun) => {
                    collect_ident(&fun.ident, &mut unbound);
                    for param in fun.params.iter() {
                        collect_ident(&param.ident, &mut unbound);
                    }
                    collect_block(&fun.body, &mut unbound);
                }
            }
        }
        unbound
    }
}

fn collect_ident(ident: &Ident, unbound: &mut Vec<String>) {
    if ident.decl.is_none() {
        unbound.push(ident.name.clone());
    }
}

fn collect_var(var: &VarDecl, unbound: &mut Vec<String>) {
    collect_ident(&var.ident, unbound);
    collect_expr(&var.init, unbound);
}

fn collect_block(block: &CompoundStmt, unbound: &mut Vec<String>) {
    for var in block.decls.iter() {
        collect_var(var, unbound);
    }
    for stmt in block.stmts.iter() {
        collect_stmt(stmt, unbound);
    }
}

fn collect_stmt(stmt: &Stmt, unbound: &mut Vec<String>) {
    match &stmt.kind {
        StmtKind::Assign { lhs, rhs } => {
            collect_expr(lhs, unbound);
            collect_expr(rhs, unbound);
        }
        StmtKind::If {
            cond,
            then,
            otherwise,
        } => {
            collect_expr(cond, unbound);
            collect_stmt(then, unbound);
            if let Some(otherwise) = otherwise {
                collect_stmt(otherwise, unbound);
            }
        }
        StmtKind::While { cond, body } => {
            collect_expr(cond, unbound);
            collect_stmt(body, unbound);
        }
        StmtKind::For {
            init,
            cond,
            update,
            body,
        } => {
            collect_expr(init, unbound);
            collect_expr(cond, unbound);
            collect_expr(update, unbound);
            collect_stmt(body, unbound);
        }
        StmtKind::Return(expr) | StmtKind::Call(expr) => collect_expr(expr, unbound),
        StmtKind::Compound(block) => collect_block(block, unbound),
    }
}

fn collect_expr(expr: &Expr, unbound: &mut Vec<String>) {
    match &expr.kind {
        ExprKind::Empty
        | ExprKind::IntLit(_)
        | ExprKind::FloatLit(_)
        | ExprKind::BoolLit(_)
        | ExprKind::StringLit(_) => {}
        ExprKind::Var(ident) => collect_ident(ident, unbound),
        ExprKind::Array { array, index } => {
            collect_expr(array, unbound);
            collect_expr(index, unbound);
        }
        ExprKind::Call { callee, args } => {
            collect_ident(callee, unbound);
            for arg in args.iter() {
                collect_expr(arg, unbound);
            }
        }
        ExprKind::Binary { left, right, .. }
        | ExprKind::Assign {
            lhs: left,
            rhs: right,
        } => {
            collect_expr(left, unbound);
            collect_expr(right, unbound);
        }
        ExprKind::Unary { operand, .. } => collect_expr(operand, unbound),
        ExprKind::InitList(items) => {
            for item in items.iter() {
                collect_expr(item, unbound);
            }
        }
    }
}
