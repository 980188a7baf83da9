use std::{collections::VecDeque, rc::Rc};

use crate::errors::SourcePos;

use super::{SourceFile, Token, TokenType};

const MAX_LOOKAHEAD: usize = 5;

pub trait TokenSource {
    fn scan_token(&mut self) -> Token;
}

pub struct Scanner {
    source: SourceFile,
    current: Option<char>,
    lookahead: VecDeque<Option<char>>,
    line: usize,
    col: usize,
    lexeme: String,
    in_block_comment: bool,
    verbose: bool,
    token_count: usize,
}

impl TokenSource for Scanner {
    fn scan_token(&mut self) -> Token {
        let token = self.fetch_next_token();
        tracing::trace!(kind = ?token.t_type, text = token.text, "token");
        if self.verbose {
            self.print_token(&token);
        }
        token
    }
}

impl Scanner {
    pub fn new(code: Rc<Vec<char>>) -> Self {
        let mut source = SourceFile::new(code);
        let current = source.read_char();
        Self {
            source,
            current,
            lookahead: VecDeque::with_capacity(MAX_LOOKAHEAD),
            line: 1,
            col: 1,
            lexeme: String::new(),
            in_block_comment: false,
            verbose: false,
            token_count: 0,
        }
    }

    /// Prints every delivered token to stdout
    pub fn enable_debugging(&mut self) {
        self.verbose = true;
    }

    fn fetch_next_token(&mut self) -> Token {
        self.skip_non_code();
        self.lexeme.clear();

        let (start_line, start_col) = (self.line, self.col);
        let t_type = self.scan_lexeme();
        if t_type == TokenType::Eof {
            self.lexeme.push('$');
            let position = SourcePos::new(start_line, start_col, start_line, start_col);
            return Token::make(t_type, &self.lexeme, position);
        }
        let position = SourcePos::new(start_line, start_col, self.line, self.col - 1);
        Token::make(t_type, &self.lexeme, position)
    }

    fn scan_lexeme(&mut self) -> TokenType {
        use TokenType::*;
        let Some(ch) = self.current else {
            return Eof;
        };
        match ch {
            '(' => self.take_as(LeftParen),
            ')' => self.take_as(RightParen),
            '{' => self.take_as(LeftBrace),
            '}' => self.take_as(RightBrace),
            '[' => self.take_as(LeftBracket),
            ']' => self.take_as(RightBracket),
            ',' => self.take_as(Comma),
            ';' => self.take_as(Semicolon),
            '+' => self.take_as(Plus),
            '-' => self.take_as(Minus),
            '*' => self.take_as(Times),
            '/' => self.take_as(Div),
            '=' => self.take_pair('=', Eq, Assign),
            '!' => self.take_pair('=', NotEq, Not),
            '<' => self.take_pair('=', LessEq, Less),
            '>' => self.take_pair('=', GreaterEq, Greater),
            '|' => self.take_pair('|', Or, Error),
            '&' => self.take_pair('&', And, Error),
            '"' => self.scan_string(),
            '.' if is_digit(self.peek(1)) => {
                self.take();
                self.take_digits();
                self.scan_exponent();
                FloatLiteral
            }
            x if x.is_ascii_digit() => self.scan_number(),
            x if is_alphabetic(x) => self.scan_identifier(),
            _ => self.take_as(Error),
        }
    }

    fn scan_number(&mut self) -> TokenType {
        let mut t_type = TokenType::IntLiteral;
        self.take_digits();
        if self.current == Some('.') {
            self.take();
            self.take_digits();
            t_type = TokenType::FloatLiteral;
        }
        if self.scan_exponent() {
            t_type = TokenType::FloatLiteral;
        }
        t_type
    }

    /// Consumes `e[+-]digits` only when the digits are really there
    fn scan_exponent(&mut self) -> bool {
        if !matches!(self.current, Some('e' | 'E')) {
            return false;
        }
        let next = self.peek(1);
        let has_sign = matches!(next, Some('+' | '-'));
        let first_digit = if has_sign { self.peek(2) } else { next };
        if !is_digit(first_digit) {
            return false;
        }
        self.take();
        if has_sign {
            self.take();
        }
        self.take_digits();
        true
    }

    fn scan_string(&mut self) -> TokenType {
        // quotes are not part of the lexeme
        self.advance_char();
        loop {
            match self.current {
                Some('"') => {
                    self.advance_char();
                    break;
                }
                Some('\n') | None => {
                    println!("ERROR: unterminated string literal");
                    break;
                }
                Some('\\') => {
                    if self.peek(1) == Some('n') {
                        self.take();
                        self.take();
                    } else {
                        println!("ERROR: illegal escape sequence");
                        self.take();
                        // the escaped character stays in the literal
                        if !matches!(self.current, Some('\n') | None) {
                            self.take();
                        }
                    }
                }
                Some(_) => self.take(),
            }
        }
        TokenType::StringLiteral
    }

    fn scan_identifier(&mut self) -> TokenType {
        while let Some(ch) = self.current {
            if !is_alphanumeric(ch) {
                break;
            }
            self.take();
        }
        TokenType::keyword(&self.lexeme)
    }

    fn skip_non_code(&mut self) {
        loop {
            let current = self.current;
            match current {
                Some(' ' | '\t' | '\r' | '\n' | '\u{c}') => self.advance_char(),
                Some('/') if self.peek(1) == Some('/') => self.skip_comment_line(),
                Some('/') if self.peek(1) == Some('*') => {
                    if !self.skip_comment_block() {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    fn skip_comment_line(&mut self) {
        while let Some(ch) = self.current {
            if ch == '\n' {
                break;
            }
            self.advance_char();
        }
    }

    fn skip_comment_block(&mut self) -> bool {
        self.in_block_comment = true;
        self.advance_char();
        self.advance_char();
        while self.in_block_comment {
            let current = self.current;
            match current {
                Some('*') if self.peek(1) == Some('/') => {
                    self.advance_char();
                    self.advance_char();
                    self.in_block_comment = false;
                }
                Some(_) => self.advance_char(),
                None => {
                    println!("ERROR: unterminated multi-line comment.");
                    self.in_block_comment = false;
                    return false;
                }
            }
        }
        true
    }

    fn print_token(&mut self, token: &Token) {
        let n = self.token_count;
        self.token_count += 1;
        let p = &token.position;
        println!("token{n}.kind = Token.{}", token.t_type.kind_name());
        println!("token{n}.lexeme = \"{}\"", token.text);
        println!("token{n}.src_pos.start_line = {}", p.start_line);
        println!("token{n}.src_pos.end_line = {}", p.end_line);
        println!("token{n}.src_pos.start_col = {}", p.start_col);
        println!("token{n}.src_pos.end_col = {}", p.end_col);
        println!();
    }
}

/// Character level primitives
impl Scanner {
    fn peek(&mut self, n: usize) -> Option<char> {
        debug_assert!((1..=MAX_LOOKAHEAD).contains(&n));
        while self.lookahead.len() < n {
            let ch = self.source.read_char();
            self.lookahead.push_back(ch);
        }
        self.lookahead[n - 1]
    }

    fn advance_char(&mut self) {
        match self.current {
            None => return,
            Some('\n') => {
                self.line += 1;
                self.col = 1;
            }
            Some(_) => self.col += 1,
        }
        self.current = match self.lookahead.pop_front() {
            Some(ch) => ch,
            None => self.source.read_char(),
        };
    }

    fn take(&mut self) {
        if let Some(ch) = self.current {
            self.lexeme.push(ch);
        }
        self.advance_char();
    }

    fn take_as(&mut self, t_type: TokenType) -> TokenType {
        self.take();
        t_type
    }

    fn take_pair(&mut self, second: char, pair: TokenType, single: TokenType) -> TokenType {
        self.take();
        if self.current == Some(second) {
            self.take();
            return pair;
        }
        single
    }

    fn take_digits(&mut self) {
        while is_digit(self.current) {
            self.take();
        }
    }
}

fn is_digit(ch: Option<char>) -> bool {
    ch.is_some_and(|c| c.is_ascii_digit())
}

fn is_alphabetic(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic()
}

fn is_alphanumeric(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric()
}
