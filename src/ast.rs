use std::fmt;

use crate::errors::SourcePos;

/// Index of a declaration in the symbol table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    Void,
    Array {
        element: Box<Type>,
        size: Option<usize>,
    },
    Error,
}

impl Type {
    pub fn array_of(element: Type, size: Option<usize>) -> Self {
        Type::Array {
            element: Box::new(element),
            size,
        }
    }

    /// Structural equality; the error type is equal to every type
    pub fn equals(&self, other: &Type) -> bool {
        use Type::*;
        match (self, other) {
            (Error, _) | (_, Error) => true,
            (Array { element: a, .. }, Array { element: b, .. }) => a.equals(b),
            (Array { .. }, _) | (_, Array { .. }) => false,
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }

    pub fn assignable_to(&self, target: &Type) -> bool {
        self.equals(target) || (self.is_int() && target.is_float())
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Type::Int)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Bool)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. })
    }

    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array { element, .. } => Some(element),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Array { element, .. } => write!(f, "{element}[]"),
            Type::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub ty: Type,
    pub pos: SourcePos,
}

#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub pos: SourcePos,
    pub decl: Option<DeclId>,
}

impl Ident {
    pub fn new(name: &str, pos: SourcePos) -> Self {
        Self {
            name: name.to_string(),
            pos,
            decl: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Program {
    pub decls: Vec<Decl>,
    pub pos: SourcePos,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Var(VarDecl),
    Fun(FunDecl),
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub ty: TypeSpec,
    pub ident: Ident,
    /// `ExprKind::Empty` when the declaration has no initializer
    pub init: Expr,
    pub is_global: bool,
    pub pos: SourcePos,
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
    pub ty: TypeSpec,
    pub ident: Ident,
    pub pos: SourcePos,
}

#[derive(Debug, Clone)]
pub struct FunDecl {
    pub return_ty: TypeSpec,
    pub ident: Ident,
    pub params: Vec<ParamDecl>,
    pub body: CompoundStmt,
    pub pos: SourcePos,
}

#[derive(Debug, Clone, Default)]
pub struct CompoundStmt {
    pub decls: Vec<VarDecl>,
    pub stmts: Vec<Stmt>,
    pub pos: SourcePos,
}

impl CompoundStmt {
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty() && self.stmts.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub pos: SourcePos,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Assign {
        lhs: Expr,
        rhs: Expr,
    },
    If {
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    For {
        init: Expr,
        cond: Expr,
        update: Expr,
        body: Box<Stmt>,
    },
    Return(Expr),
    Call(Expr),
    Compound(CompoundStmt),
}

#[derive(Debug, Clone, Default)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: SourcePos,
    /// Synthesized by semantic analysis
    pub ty: Option<Type>,
}

#[derive(Debug, Clone, Default)]
pub enum ExprKind {
    #[default]
    Empty,
    IntLit(String),
    FloatLit(String),
    BoolLit(bool),
    StringLit(String),
    Var(Ident),
    Array {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Ident,
        args: Vec<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: Operator,
        right: Box<Expr>,
    },
    Unary {
        op: Operator,
        operand: Box<Expr>,
    },
    Assign {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    InitList(Vec<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind, pos: SourcePos) -> Self {
        Self {
            kind,
            pos,
            ty: None,
        }
    }

    pub fn empty(pos: SourcePos) -> Self {
        Self::new(ExprKind::Empty, pos)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, ExprKind::Empty)
    }

    /// Synthesized type, the error type when analysis has not assigned one
    pub fn type_of(&self) -> Type {
        self.ty.clone().unwrap_or(Type::Error)
    }

    /// Wraps the expression in place into an int to float conversion node
    pub fn widen(&mut self) {
        let inner = std::mem::take(self);
        let pos = inner.pos;
        let op = Operator {
            op: Op::I2f,
            pos,
            ty: Some(Type::Int),
        };
        *self = Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(inner),
            },
            pos,
            ty: Some(Type::Float),
        };
    }

    pub fn is_widened(&self) -> bool {
        matches!(&self.kind, ExprKind::Unary { op, .. } if op.op == Op::I2f)
    }
}

#[derive(Debug, Clone)]
pub struct Operator {
    pub op: Op,
    pub pos: SourcePos,
    pub ty: Option<Type>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Op {
    Or,
    And,
    Not,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Plus,
    Minus,
    Times,
    Div,
    /// Synthetic int to float widening
    I2f,
}

impl Op {
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Op::Plus | Op::Minus | Op::Times | Op::Div)
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Op::Eq | Op::NotEq | Op::Less | Op::LessEq | Op::Greater | Op::GreaterEq
        )
    }

    /// Operators defined on `bool` operands
    pub fn accepts_bool(&self) -> bool {
        matches!(self, Op::And | Op::Or | Op::Eq | Op::NotEq)
    }

    pub fn spell(&self) -> &'static str {
        match self {
            Op::Or => "||",
            Op::And => "&&",
            Op::Not => "!",
            Op::Eq => "==",
            Op::NotEq => "!=",
            Op::Less => "<",
            Op::LessEq => "<=",
            Op::Greater => ">",
            Op::GreaterEq => ">=",
            Op::Plus => "+",
            Op::Minus => "-",
            Op::Times => "*",
            Op::Div => "/",
            Op::I2f => "i2f",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_type_equals_everything() {
        let all = [
            Type::Int,
            Type::Float,
            Type::Bool,
            Type::String,
            Type::Void,
            Type::array_of(Type::Int, Some(3)),
        ];
        for ty in all {
            assert!(Type::Error.equals(&ty));
            assert!(ty.equals(&Type::Error));
            assert!(Type::Error.assignable_to(&ty));
            assert!(ty.assignable_to(&Type::Error));
        }
    }

    #[test]
    fn structural_equality() {
        assert!(Type::Int.equals(&Type::Int));
        assert!(!Type::Int.equals(&Type::Float));
        assert!(!Type::Bool.equals(&Type::Int));
        let a = Type::array_of(Type::Float, Some(2));
        let b = Type::array_of(Type::Float, None);
        assert!(a.equals(&b));
        assert!(!a.equals(&Type::array_of(Type::Int, Some(2))));
        assert!(!a.equals(&Type::Float));
    }

    #[test]
    fn int_is_assignable_to_float() {
        assert!(Type::Int.assignable_to(&Type::Float));
        assert!(!Type::Float.assignable_to(&Type::Int));
        assert!(!Type::Bool.assignable_to(&Type::Int));
    }

    #[test]
    fn widen_wraps_once() {
        let mut expr = Expr::new(ExprKind::IntLit("3".into()), SourcePos::new(1, 5, 1, 5));
        expr.ty = Some(Type::Int);
        expr.widen();
        assert!(expr.is_widened());
        assert_eq!(expr.type_of(), Type::Float);
        assert_eq!(expr.pos, SourcePos::new(1, 5, 1, 5));
        let ExprKind::Unary { op, operand } = &expr.kind else {
            panic!("not a unary node");
        };
        assert_eq!(op.ty, Some(Type::Int));
        assert!(matches!(operand.kind, ExprKind::IntLit(ref v) if v == "3"));
    }
}
