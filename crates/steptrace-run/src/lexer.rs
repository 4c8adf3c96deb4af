//! Lexer for the script language.
//!
//! Produces a flat token stream annotated with 1-based line numbers.
//! Newlines are tokens, since they terminate statements, except inside
//! parentheses or square brackets where they are dropped so argument
//! lists and list literals can span lines. `#` starts a comment that
//! runs to the end of the line.

use std::fmt;

use crate::error::ParseError;

/// One lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    // Keywords
    Fn,
    If,
    Else,
    While,
    Return,
    Raise,
    Break,
    Continue,
    And,
    Or,
    Not,
    True,
    False,
    Nil,
    // Operators and punctuation
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    /// Statement terminator outside brackets.
    Newline,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Int(n) => write!(f, "{n}"),
            Token::Float(x) => write!(f, "{x}"),
            Token::Str(s) => write!(f, "{s:?}"),
            Token::Ident(name) => f.write_str(name),
            Token::Fn => f.write_str("fn"),
            Token::If => f.write_str("if"),
            Token::Else => f.write_str("else"),
            Token::While => f.write_str("while"),
            Token::Return => f.write_str("return"),
            Token::Raise => f.write_str("raise"),
            Token::Break => f.write_str("break"),
            Token::Continue => f.write_str("continue"),
            Token::And => f.write_str("and"),
            Token::Or => f.write_str("or"),
            Token::Not => f.write_str("not"),
            Token::True => f.write_str("true"),
            Token::False => f.write_str("false"),
            Token::Nil => f.write_str("nil"),
            Token::Assign => f.write_str("="),
            Token::PlusAssign => f.write_str("+="),
            Token::MinusAssign => f.write_str("-="),
            Token::StarAssign => f.write_str("*="),
            Token::SlashAssign => f.write_str("/="),
            Token::EqEq => f.write_str("=="),
            Token::NotEq => f.write_str("!="),
            Token::Lt => f.write_str("<"),
            Token::Le => f.write_str("<="),
            Token::Gt => f.write_str(">"),
            Token::Ge => f.write_str(">="),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Percent => f.write_str("%"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::LBrace => f.write_str("{"),
            Token::RBrace => f.write_str("}"),
            Token::Comma => f.write_str(","),
            Token::Newline => f.write_str("end of line"),
        }
    }
}

/// Tokenizes source text. Each token carries the line it started on.
pub fn lex(source: &str) -> Result<Vec<(Token, u32)>, ParseError> {
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    /// Open parens plus open square brackets. Newlines are swallowed
    /// while this is nonzero.
    bracket_depth: usize,
    tokens: Vec<(Token, u32)>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            bracket_depth: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<(Token, u32)>, ParseError> {
        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '#' => self.skip_comment(),
                '\n' => {
                    self.bump();
                    if self.bracket_depth == 0 {
                        self.push(Token::Newline);
                    }
                    self.line += 1;
                }
                '"' => self.lex_string()?,
                c if c.is_ascii_digit() => self.lex_number()?,
                c if c.is_ascii_alphabetic() || c == '_' => self.lex_word(),
                c => {
                    self.bump();
                    self.lex_operator(c)?;
                }
            }
        }
        Ok(self.tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn push(&mut self, token: Token) {
        self.tokens.push((token, self.line));
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn lex_string(&mut self) -> Result<(), ParseError> {
        let line = self.line;
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(ParseError::UnterminatedString { line }),
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('r') => text.push('\r'),
                    Some('\\') => text.push('\\'),
                    Some('"') => text.push('"'),
                    None | Some('\n') => return Err(ParseError::UnterminatedString { line }),
                    Some(ch) => return Err(ParseError::InvalidEscape { ch, line }),
                },
                Some(ch) => text.push(ch),
            }
        }
        self.tokens.push((Token::Str(text), line));
        Ok(())
    }

    fn lex_number(&mut self) -> Result<(), ParseError> {
        let line = self.line;
        let mut lexeme = String::new();
        self.take_digits(&mut lexeme);
        let is_float =
            self.peek() == Some('.') && self.peek2().is_some_and(|c| c.is_ascii_digit());
        let token = if is_float {
            lexeme.push('.');
            self.bump();
            self.take_digits(&mut lexeme);
            let value = lexeme
                .parse::<f64>()
                .map_err(|_| ParseError::NumberOutOfRange {
                    lexeme: lexeme.clone(),
                    line,
                })?;
            Token::Float(value)
        } else {
            let value = lexeme
                .parse::<i64>()
                .map_err(|_| ParseError::NumberOutOfRange {
                    lexeme: lexeme.clone(),
                    line,
                })?;
            Token::Int(value)
        };
        self.tokens.push((token, line));
        Ok(())
    }

    fn take_digits(&mut self, lexeme: &mut String) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                lexeme.push(c);
                self.bump();
            } else {
                break;
            }
        }
    }

    fn lex_word(&mut self) {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                word.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let token = match word.as_str() {
            "fn" => Token::Fn,
            "if" => Token::If,
            "else" => Token::Else,
            "while" => Token::While,
            "return" => Token::Return,
            "raise" => Token::Raise,
            "break" => Token::Break,
            "continue" => Token::Continue,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "true" => Token::True,
            "false" => Token::False,
            "nil" => Token::Nil,
            _ => Token::Ident(word),
        };
        self.push(token);
    }

    fn lex_operator(&mut self, ch: char) -> Result<(), ParseError> {
        let token = match ch {
            '(' => {
                self.bracket_depth += 1;
                Token::LParen
            }
            ')' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                Token::RParen
            }
            '[' => {
                self.bracket_depth += 1;
                Token::LBracket
            }
            ']' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                Token::RBracket
            }
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            ',' => Token::Comma,
            '%' => Token::Percent,
            '+' => {
                if self.eat('=') {
                    Token::PlusAssign
                } else {
                    Token::Plus
                }
            }
            '-' => {
                if self.eat('=') {
                    Token::MinusAssign
                } else {
                    Token::Minus
                }
            }
            '*' => {
                if self.eat('=') {
                    Token::StarAssign
                } else {
                    Token::Star
                }
            }
            '/' => {
                if self.eat('=') {
                    Token::SlashAssign
                } else {
                    Token::Slash
                }
            }
            '=' => {
                if self.eat('=') {
                    Token::EqEq
                } else {
                    Token::Assign
                }
            }
            '<' => {
                if self.eat('=') {
                    Token::Le
                } else {
                    Token::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    Token::Ge
                } else {
                    Token::Gt
                }
            }
            '!' => {
                if self.eat('=') {
                    Token::NotEq
                } else {
                    return Err(ParseError::UnexpectedChar {
                        ch: '!',
                        line: self.line,
                    });
                }
            }
            other => {
                return Err(ParseError::UnexpectedChar {
                    ch: other,
                    line: self.line,
                })
            }
        };
        self.push(token);
        Ok(())
    }
}
