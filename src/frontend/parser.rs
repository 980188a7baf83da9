use thiserror::Error;

use crate::{
    ast::*,
    errors::{ErrorReporter, SourcePos},
    frontend::{Token, TokenSource, TokenType},
};

#[derive(Debug, Error)]
#[error("syntax error at {position}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub position: SourcePos,
}

pub type ParseResult<T> = Result<T, SyntaxError>;

type ParseFn<'a> = fn(&mut Parser<'a>) -> ParseResult<Expr>;

const OR_OPERATORS: &[(TokenType, Op)] = &[(TokenType::Or, Op::Or)];
const AND_OPERATORS: &[(TokenType, Op)] = &[(TokenType::And, Op::And)];
const RELATIONAL_OPERATORS: &[(TokenType, Op)] = &[
    (TokenType::Eq, Op::Eq),
    (TokenType::NotEq, Op::NotEq),
    (TokenType::Less, Op::Less),
    (TokenType::LessEq, Op::LessEq),
    (TokenType::Greater, Op::Greater),
    (TokenType::GreaterEq, Op::GreaterEq),
];
const ADDITIVE_OPERATORS: &[(TokenType, Op)] =
    &[(TokenType::Plus, Op::Plus), (TokenType::Minus, Op::Minus)];
const MULTIPLICATIVE_OPERATORS: &[(TokenType, Op)] =
    &[(TokenType::Times, Op::Times), (TokenType::Div, Op::Div)];

pub struct Parser<'a> {
    scanner: Box<dyn TokenSource>,
    reporter: &'a mut ErrorReporter,
    current: Token,
    previous_position: SourcePos,
}

impl<'a> Parser<'a> {
    pub fn with(mut scanner: Box<dyn TokenSource>, reporter: &'a mut ErrorReporter) -> Self {
        let current = scanner.scan_token();
        Self {
            scanner,
            reporter,
            current,
            previous_position: SourcePos::default(),
        }
    }

    /// Parses the whole token stream. Stops at the first syntax error,
    /// which has been reported by then.
    pub fn parse(&mut self) -> Option<Program> {
        match self.parse_program() {
            Ok(program) => Some(program),
            Err(err) => {
                tracing::debug!(%err, "parsing stopped");
                None
            }
        }
    }

    fn parse_program(&mut self) -> ParseResult<Program> {
        let start = self.start();
        let mut decls = Vec::new();
        while self.current.t_type.is_type_specifier() {
            let decl_start = self.start();
            let ty = self.parse_type_specifier()?;
            let ident = self.parse_ident()?;
            if self.current.t_type == TokenType::LeftParen {
                let fun = self.parse_fun_part(ty, ident, decl_start)?;
                decls.push(Decl::Fun(fun));
            } else {
                let vars = self.parse_var_part(ty, ident, decl_start, true)?;
                decls.extend(vars.into_iter().map(Decl::Var));
            }
        }
        if !self.current.is_eof() {
            let text = self.current.text.clone();
            return Err(self.syntax_error("\"%\" not expected after end of program", &text));
        }
        let pos = if decls.is_empty() {
            self.current.position
        } else {
            self.finish(start)
        };
        Ok(Program { decls, pos })
    }
}

/// Declarations
impl Parser<'_> {
    fn parse_type_specifier(&mut self) -> ParseResult<TypeSpec> {
        let ty = match self.current.t_type {
            TokenType::Void => Type::Void,
            TokenType::Int => Type::Int,
            TokenType::Bool => Type::Bool,
            TokenType::Float => Type::Float,
            _ => return Err(self.syntax_error("Type specifier expected", "")),
        };
        let pos = self.current.position;
        self.accept_it();
        Ok(TypeSpec { ty, pos })
    }

    fn parse_ident(&mut self) -> ParseResult<Ident> {
        let ident = Ident::new(&self.current.text, self.current.position);
        self.accept(TokenType::Identifier)?;
        Ok(ident)
    }

    fn parse_fun_part(
        &mut self,
        return_ty: TypeSpec,
        ident: Ident,
        start: SourcePos,
    ) -> ParseResult<FunDecl> {
        self.accept(TokenType::LeftParen)?;
        let params = self.parse_params_list()?;
        self.accept(TokenType::RightParen)?;
        let body = self.parse_compound_stmt()?;
        Ok(FunDecl {
            return_ty,
            ident,
            params,
            body,
            pos: self.finish(start),
        })
    }

    fn parse_params_list(&mut self) -> ParseResult<Vec<ParamDecl>> {
        let mut params = Vec::new();
        if !self.current.t_type.is_type_specifier() {
            return Ok(params);
        }
        params.push(self.parse_parameter_decl()?);
        while self.current.t_type == TokenType::Comma {
            self.accept_it();
            match self.current.t_type {
                t if t.is_type_specifier() => params.push(self.parse_parameter_decl()?),
                TokenType::RightParen => {
                    return Err(self.syntax_error("Declaration after comma expected", ""));
                }
                t => {
                    return Err(self.syntax_error("Type specifier instead of % expected", t.spell()));
                }
            }
        }
        Ok(params)
    }

    fn parse_parameter_decl(&mut self) -> ParseResult<ParamDecl> {
        let start = self.start();
        let mut ty = self.parse_type_specifier()?;
        let ident = self.parse_ident()?;
        if self.current.t_type == TokenType::LeftBracket {
            ty = self.parse_array_suffix(&ty, start)?;
        }
        Ok(ParamDecl {
            ty,
            ident,
            pos: self.finish(start),
        })
    }

    /// `"[" INTLITERAL? "]"` following a declarator name
    fn parse_array_suffix(&mut self, element: &TypeSpec, start: SourcePos) -> ParseResult<TypeSpec> {
        self.accept(TokenType::LeftBracket)?;
        let mut size = None;
        if self.current.t_type == TokenType::IntLiteral {
            size = self.current.text.parse::<usize>().ok();
            self.accept_it();
        }
        self.accept(TokenType::RightBracket)?;
        Ok(TypeSpec {
            ty: Type::array_of(element.ty.clone(), size),
            pos: self.finish(start),
        })
    }

    fn parse_var_part(
        &mut self,
        base_ty: TypeSpec,
        ident: Ident,
        start: SourcePos,
        is_global: bool,
    ) -> ParseResult<Vec<VarDecl>> {
        let mut ty = base_ty.clone();
        if self.current.t_type == TokenType::LeftBracket {
            ty = self.parse_array_suffix(&base_ty, start)?;
        }
        let init = self.parse_optional_initializer()?;
        let mut decls = vec![VarDecl {
            ty,
            ident,
            init,
            is_global,
            pos: self.finish(start),
        }];
        while self.current.t_type == TokenType::Comma {
            self.accept_it();
            decls.push(self.parse_init_decl(&base_ty, is_global)?);
        }
        self.accept(TokenType::Semicolon)?;
        Ok(decls)
    }

    fn parse_init_decl(&mut self, base_ty: &TypeSpec, is_global: bool) -> ParseResult<VarDecl> {
        let start = self.start();
        let ident = self.parse_ident()?;
        let mut ty = base_ty.clone();
        if self.current.t_type == TokenType::LeftBracket {
            ty = self.parse_array_suffix(base_ty, start)?;
        }
        let init = self.parse_optional_initializer()?;
        Ok(VarDecl {
            ty,
            ident,
            init,
            is_global,
            pos: self.finish(start),
        })
    }

    fn parse_optional_initializer(&mut self) -> ParseResult<Expr> {
        if self.current.t_type != TokenType::Assign {
            return Ok(Expr::empty(self.previous_position));
        }
        self.accept_it();
        self.parse_initializer()
    }

    fn parse_initializer(&mut self) -> ParseResult<Expr> {
        if self.current.t_type != TokenType::LeftBrace {
            return self.parse_expr();
        }
        let start = self.start();
        self.accept_it();
        let mut elements = vec![self.parse_expr()?];
        while self.current.t_type == TokenType::Comma {
            self.accept_it();
            elements.push(self.parse_expr()?);
        }
        self.accept(TokenType::RightBrace)?;
        Ok(Expr::new(ExprKind::InitList(elements), self.finish(start)))
    }
}

/// Statements
impl Parser<'_> {
    fn parse_compound_stmt(&mut self) -> ParseResult<CompoundStmt> {
        let start = self.start();
        self.accept(TokenType::LeftBrace)?;
        let mut decls = Vec::new();
        while self.current.t_type.is_type_specifier() {
            let decl_start = self.start();
            let ty = self.parse_type_specifier()?;
            let ident = self.parse_ident()?;
            decls.extend(self.parse_var_part(ty, ident, decl_start, false)?);
        }
        let mut stmts = Vec::new();
        while self.starts_statement() {
            stmts.push(self.parse_stmt()?);
        }
        self.accept(TokenType::RightBrace)?;
        Ok(CompoundStmt {
            decls,
            stmts,
            pos: self.finish(start),
        })
    }

    fn starts_statement(&self) -> bool {
        use TokenType::*;
        matches!(
            self.current.t_type,
            LeftBrace | If | While | For | Return | Identifier
        )
    }

    fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.start();
        match self.current.t_type {
            TokenType::LeftBrace => {
                let body = self.parse_compound_stmt()?;
                let pos = body.pos;
                Ok(Stmt {
                    kind: StmtKind::Compound(body),
                    pos,
                })
            }
            TokenType::If => self.parse_if_stmt(start),
            TokenType::While => self.parse_while_stmt(start),
            TokenType::For => self.parse_for_stmt(start),
            TokenType::Return => self.parse_return_stmt(start),
            TokenType::Identifier => self.parse_ident_stmt(start),
            _ => {
                let text = self.current.text.clone();
                Err(self.syntax_error("Statement expected", &text))
            }
        }
    }

    fn parse_if_stmt(&mut self, start: SourcePos) -> ParseResult<Stmt> {
        self.accept_it();
        self.accept(TokenType::LeftParen)?;
        let cond = self.parse_expr()?;
        self.accept(TokenType::RightParen)?;
        let then = Box::new(self.parse_stmt()?);
        let mut otherwise = None;
        if self.current.t_type == TokenType::Else {
            self.accept_it();
            otherwise = Some(Box::new(self.parse_stmt()?));
        }
        Ok(Stmt {
            kind: StmtKind::If {
                cond,
                then,
                otherwise,
            },
            pos: self.finish(start),
        })
    }

    fn parse_while_stmt(&mut self, start: SourcePos) -> ParseResult<Stmt> {
        self.accept_it();
        self.accept(TokenType::LeftParen)?;
        let cond = self.parse_expr()?;
        self.accept(TokenType::RightParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt {
            kind: StmtKind::While { cond, body },
            pos: self.finish(start),
        })
    }

    fn parse_for_stmt(&mut self, start: SourcePos) -> ParseResult<Stmt> {
        self.accept_it();
        self.accept(TokenType::LeftParen)?;

        let mut init = Expr::empty(self.previous_position);
        if self.current.t_type != TokenType::Semicolon {
            init = self.parse_for_assignment()?;
        }
        self.accept(TokenType::Semicolon)?;

        let mut cond = Expr::empty(self.previous_position);
        if self.current.t_type != TokenType::Semicolon {
            cond = self.parse_expr()?;
        }
        self.accept(TokenType::Semicolon)?;

        let mut update = Expr::empty(self.previous_position);
        if self.current.t_type != TokenType::RightParen {
            update = self.parse_for_assignment()?;
        }
        self.accept(TokenType::RightParen)?;

        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt {
            kind: StmtKind::For {
                init,
                cond,
                update,
                body,
            },
            pos: self.finish(start),
        })
    }

    /// `ID "=" expr` inside a for-loop header
    fn parse_for_assignment(&mut self) -> ParseResult<Expr> {
        let start = self.start();
        let ident = self.parse_ident()?;
        let lhs = Expr::new(ExprKind::Var(ident), start);
        self.accept(TokenType::Assign)?;
        let rhs = self.parse_expr()?;
        let kind = ExprKind::Assign {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
        Ok(Expr::new(kind, self.finish(start)))
    }

    fn parse_return_stmt(&mut self, start: SourcePos) -> ParseResult<Stmt> {
        self.accept_it();
        let value = if self.current.t_type == TokenType::Semicolon {
            Expr::empty(self.previous_position)
        } else {
            self.parse_expr()?
        };
        self.accept(TokenType::Semicolon)?;
        Ok(Stmt {
            kind: StmtKind::Return(value),
            pos: self.finish(start),
        })
    }

    fn parse_ident_stmt(&mut self, start: SourcePos) -> ParseResult<Stmt> {
        let ident = self.parse_ident()?;
        let ident_pos = ident.pos;
        let kind = match self.current.t_type {
            TokenType::LeftParen => {
                let args = self.parse_arg_list()?;
                let call = Expr::new(ExprKind::Call { callee: ident, args }, self.finish(start));
                self.accept(TokenType::Semicolon)?;
                StmtKind::Call(call)
            }
            TokenType::LeftBracket => {
                self.accept_it();
                let index = self.parse_expr()?;
                self.accept(TokenType::RightBracket)?;
                let array = Expr::new(ExprKind::Var(ident), ident_pos);
                let lhs_kind = ExprKind::Array {
                    array: Box::new(array),
                    index: Box::new(index),
                };
                let lhs = Expr::new(lhs_kind, self.finish(start));
                self.accept(TokenType::Assign)?;
                let rhs = self.parse_expr()?;
                self.accept(TokenType::Semicolon)?;
                StmtKind::Assign { lhs, rhs }
            }
            TokenType::Assign => {
                self.accept_it();
                let lhs = Expr::new(ExprKind::Var(ident), ident_pos);
                let rhs = self.parse_expr()?;
                self.accept(TokenType::Semicolon)?;
                StmtKind::Assign { lhs, rhs }
            }
            _ => {
                let text = self.current.text.clone();
                return Err(self.syntax_error("Statement expected", &text));
            }
        };
        Ok(Stmt {
            kind,
            pos: self.finish(start),
        })
    }
}

/// Expressions
impl<'a> Parser<'a> {
    fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_left_assoc(OR_OPERATORS, Self::parse_and_expr)
    }

    fn parse_and_expr(&mut self) -> ParseResult<Expr> {
        self.parse_left_assoc(AND_OPERATORS, Self::parse_relational_expr)
    }

    /// Relational operators do not chain: `a < b < c` stops after `a < b`
    fn parse_relational_expr(&mut self) -> ParseResult<Expr> {
        let start = self.start();
        let left = self.parse_add_expr()?;
        let Some(op) = self.match_operator(RELATIONAL_OPERATORS) else {
            return Ok(left);
        };
        let right = self.parse_add_expr()?;
        Ok(self.make_binary(left, op, right, start))
    }

    fn parse_add_expr(&mut self) -> ParseResult<Expr> {
        self.parse_left_assoc(ADDITIVE_OPERATORS, Self::parse_mult_expr)
    }

    fn parse_mult_expr(&mut self) -> ParseResult<Expr> {
        self.parse_left_assoc(MULTIPLICATIVE_OPERATORS, Self::parse_unary_expr)
    }

    fn parse_left_assoc(
        &mut self,
        operators: &[(TokenType, Op)],
        operand: ParseFn<'a>,
    ) -> ParseResult<Expr> {
        let start = self.start();
        let mut left = operand(self)?;
        while let Some(op) = self.match_operator(operators) {
            let right = operand(self)?;
            left = self.make_binary(left, op, right, start);
        }
        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> ParseResult<Expr> {
        let start = self.start();
        let op = match self.current.t_type {
            TokenType::Plus => Op::Plus,
            TokenType::Minus => Op::Minus,
            TokenType::Not => Op::Not,
            _ => return self.parse_primary_expr(),
        };
        let op = self.take_operator(op);
        let operand = Box::new(self.parse_unary_expr()?);
        Ok(Expr::new(ExprKind::Unary { op, operand }, self.finish(start)))
    }

    fn parse_primary_expr(&mut self) -> ParseResult<Expr> {
        let text = self.current.text.clone();
        match self.current.t_type {
            TokenType::Identifier => self.parse_ident_expr(),
            TokenType::LeftParen => {
                self.accept_it();
                let expr = self.parse_expr()?;
                self.accept(TokenType::RightParen)?;
                Ok(expr)
            }
            TokenType::IntLiteral => Ok(self.parse_literal(ExprKind::IntLit(text))),
            TokenType::FloatLiteral => Ok(self.parse_literal(ExprKind::FloatLit(text))),
            TokenType::BoolLiteral => Ok(self.parse_literal(ExprKind::BoolLit(text == "true"))),
            TokenType::StringLiteral => Ok(self.parse_literal(ExprKind::StringLit(text))),
            _ => Err(self.syntax_error("Primary expression expected", &text)),
        }
    }

    fn parse_ident_expr(&mut self) -> ParseResult<Expr> {
        let start = self.start();
        let ident = self.parse_ident()?;
        match self.current.t_type {
            TokenType::LeftBracket => {
                let ident_pos = ident.pos;
                self.accept_it();
                let index = Box::new(self.parse_expr()?);
                self.accept(TokenType::RightBracket)?;
                let array = Box::new(Expr::new(ExprKind::Var(ident), ident_pos));
                Ok(Expr::new(ExprKind::Array { array, index }, self.finish(start)))
            }
            TokenType::LeftParen => {
                let args = self.parse_arg_list()?;
                let kind = ExprKind::Call {
                    callee: ident,
                    args,
                };
                Ok(Expr::new(kind, self.finish(start)))
            }
            _ => {
                let pos = ident.pos;
                Ok(Expr::new(ExprKind::Var(ident), pos))
            }
        }
    }

    fn parse_literal(&mut self, kind: ExprKind) -> Expr {
        let pos = self.current.position;
        self.accept_it();
        Expr::new(kind, pos)
    }

    fn parse_arg_list(&mut self) -> ParseResult<Vec<Expr>> {
        self.accept(TokenType::LeftParen)?;
        let mut args = Vec::new();
        if self.current.t_type != TokenType::RightParen {
            args.push(self.parse_expr()?);
            loop {
                match self.current.t_type {
                    TokenType::Comma => {
                        self.accept_it();
                        if self.current.t_type == TokenType::RightParen {
                            return Err(self.syntax_error("Argument after comma expected", ""));
                        }
                        args.push(self.parse_expr()?);
                    }
                    t if starts_expression(t) => {
                        return Err(
                            self.syntax_error("Comma between preceding arguments expected", "")
                        );
                    }
                    _ => break,
                }
            }
        }
        self.accept(TokenType::RightParen)?;
        Ok(args)
    }

    fn match_operator(&mut self, operators: &[(TokenType, Op)]) -> Option<Operator> {
        let op = operators
            .iter()
            .find(|(t_type, _)| *t_type == self.current.t_type)
            .map(|(_, op)| *op)?;
        Some(self.take_operator(op))
    }

    fn take_operator(&mut self, op: Op) -> Operator {
        let operator = Operator {
            op,
            pos: self.current.position,
            ty: None,
        };
        self.accept_it();
        operator
    }

    fn make_binary(&self, left: Expr, op: Operator, right: Expr, start: SourcePos) -> Expr {
        let kind = ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        };
        Expr::new(kind, self.finish(start))
    }
}

/// Token primitives
impl Parser<'_> {
    fn accept(&mut self, expected: TokenType) -> ParseResult<()> {
        if self.current.t_type == expected {
            self.accept_it();
            return Ok(());
        }
        Err(self.syntax_error("\"%\" expected here", expected.spell()))
    }

    fn accept_it(&mut self) {
        self.previous_position = self.current.position;
        self.current = self.scanner.scan_token();
    }

    /// Position of the first character of the current token
    fn start(&self) -> SourcePos {
        let p = self.current.position;
        SourcePos::new(p.start_line, p.start_col, p.start_line, p.start_col)
    }

    /// Extends a phrase up to the last character of the previous token
    fn finish(&self, start: SourcePos) -> SourcePos {
        SourcePos {
            end_line: self.previous_position.end_line,
            end_col: self.previous_position.end_col,
            ..start
        }
    }

    fn syntax_error(&mut self, template: &str, token_name: &str) -> SyntaxError {
        let position = self.current.position;
        self.reporter.report_error(template, token_name, position);
        SyntaxError {
            message: template.replace('%', token_name),
            position,
        }
    }
}

fn starts_expression(t_type: TokenType) -> bool {
    use TokenType::*;
    matches!(
        t_type,
        Identifier
            | LeftParen
            | IntLiteral
            | FloatLiteral
            | BoolLiteral
            | StringLiteral
            | Plus
            | Minus
            | Not
    )
}
