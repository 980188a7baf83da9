use crate::errors::SourcePos;

#[derive(Debug, Clone)]
pub struct Token {
    pub t_type: TokenType,
    pub text: String,
    pub position: SourcePos,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenType {
    Identifier,
    // operators
    Assign,
    Or,
    And,
    Not,
    Eq,
    NotEq,
    LessEq,
    Less,
    Greater,
    GreaterEq,
    Plus,
    Minus,
    Times,
    Div,
    // literals
    IntLiteral,
    FloatLiteral,
    BoolLiteral,
    StringLiteral,
    // keywords
    Bool,
    Else,
    Float,
    For,
    If,
    Int,
    Return,
    Void,
    While,
    // punctuation
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    //
    Error,
    Eof,
}

impl Token {
    pub fn is_err(&self) -> bool {
        matches!(self.t_type, TokenType::Error)
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.t_type, TokenType::Eof)
    }

    pub fn make(t_type: TokenType, text: &str, position: SourcePos) -> Self {
        Self {
            t_type,
            text: text.to_string(),
            position,
        }
    }
}

impl TokenType {
    /// Classifies a scanned identifier lexeme
    pub fn keyword(lexeme: &str) -> Self {
        use TokenType::*;
        match lexeme {
            "bool" => Bool,
            "else" => Else,
            "float" => Float,
            "for" => For,
            "if" => If,
            "int" => Int,
            "return" => Return,
            "void" => Void,
            "while" => While,
            "true" | "false" => BoolLiteral,
            _ => Identifier,
        }
    }

    /// Canonical spelling used by syntax error messages
    pub fn spell(&self) -> &'static str {
        use TokenType::*;
        match self {
            Identifier => "ID",
            Assign => "=",
            Or => "||",
            And => "&&",
            Not => "!",
            Eq => "==",
            NotEq => "!=",
            LessEq => "<=",
            Less => "<",
            Greater => ">",
            GreaterEq => ">=",
            Plus => "+",
            Minus => "-",
            Times => "*",
            Div => "/",
            IntLiteral => "INTLITERAL",
            FloatLiteral => "FLOATLITERAL",
            BoolLiteral => "BOOLLITERAL",
            StringLiteral => "STRINGLITERAL",
            Bool => "bool",
            Else => "else",
            Float => "float",
            For => "for",
            If => "if",
            Int => "int",
            Return => "return",
            Void => "void",
            While => "while",
            LeftBrace => "{",
            RightBrace => "}",
            LeftBracket => "[",
            RightBracket => "]",
            LeftParen => "(",
            RightParen => ")",
            Comma => ",",
            Semicolon => ";",
            Error => "ERROR",
            Eof => "EOF",
        }
    }

    /// Name printed by the verbose token listing
    pub fn kind_name(&self) -> &'static str {
        use TokenType::*;
        match self {
            Identifier => "ID",
            Assign => "ASSIGN",
            Or => "OR",
            And => "AND",
            Not => "NOT",
            Eq => "EQ",
            NotEq => "NOTEQ",
            LessEq => "LESSEQ",
            Less => "LESS",
            Greater => "GREATER",
            GreaterEq => "GREATEREQ",
            Plus => "PLUS",
            Minus => "MINUS",
            Times => "TIMES",
            Div => "DIV",
            IntLiteral => "INTLITERAL",
            FloatLiteral => "FLOATLITERAL",
            BoolLiteral => "BOOLLITERAL",
            StringLiteral => "STRINGLITERAL",
            Bool => "BOOL",
            Else => "ELSE",
            Float => "FLOAT",
            For => "FOR",
            If => "IF",
            Int => "INT",
            Return => "RETURN",
            Void => "VOID",
            While => "WHILE",
            LeftBrace => "LEFTBRACE",
            RightBrace => "RIGHTBRACE",
            LeftBracket => "LEFTBRACKET",
            RightBracket => "RIGHTBRACKET",
            LeftParen => "LEFTPAREN",
            RightParen => "RIGHTPAREN",
            Comma => "COMMA",
            Semicolon => "SEMICOLON",
            Error => "ERROR",
            Eof => "EOF",
        }
    }

    pub fn is_type_specifier(&self) -> bool {
        matches!(
            self,
            TokenType::Void | TokenType::Int | TokenType::Bool | TokenType::Float
        )
    }
}
