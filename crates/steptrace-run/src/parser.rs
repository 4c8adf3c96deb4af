//! Recursive-descent parser.
//!
//! One statement per line, blocks in braces. Operator precedence from
//! loosest to tightest: `or`, `and`, `not`, comparisons, `+ -`,
//! `* / %`, unary `-`, then calls and indexing. Comparisons do not
//! chain: `a < b < c` is a syntax error rather than a surprise.
//!
//! Placement rules are enforced here, not at runtime: `return` outside
//! a function and `break`/`continue` outside a loop are parse errors,
//! and a function body opens a fresh loop context so a `break` inside
//! `fn` cannot target a loop surrounding the definition.

use std::rc::Rc;

use steptrace_core::ast::{BinOp, Expr, FnDecl, Program, Stmt, Target, UnOp};

use crate::error::ParseError;
use crate::lexer::{lex, Token};

/// Parses source text into a program.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let tokens = lex(source)?;
    Parser::new(tokens).parse_program()
}

struct Parser {
    tokens: Vec<(Token, u32)>,
    pos: usize,
    /// Nesting depth of function bodies, for `return` placement.
    fn_depth: usize,
    /// Nesting depth of loops in the current function, for `break` and
    /// `continue` placement. Saved and reset across function bodies.
    loop_depth: usize,
}

impl Parser {
    fn new(tokens: Vec<(Token, u32)>) -> Self {
        Parser {
            tokens,
            pos: 0,
            fn_depth: 0,
            loop_depth: 0,
        }
    }

    fn parse_program(mut self) -> Result<Program, ParseError> {
        let mut stmts = Vec::new();
        self.skip_newlines();
        while !self.at_end() {
            stmts.push(self.parse_stmt()?);
            self.skip_newlines();
        }
        Ok(Program { stmts })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let stmt = match self.peek_token() {
            Some(Token::Fn) => self.parse_fn_def()?,
            Some(Token::If) => self.parse_if()?,
            Some(Token::While) => self.parse_while()?,
            Some(Token::Return) => self.parse_return()?,
            Some(Token::Raise) => self.parse_raise()?,
            Some(Token::Break) => self.parse_break()?,
            Some(Token::Continue) => self.parse_continue()?,
            _ => self.parse_assign_or_expr()?,
        };
        self.expect_stmt_end()?;
        Ok(stmt)
    }

    fn parse_fn_def(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance_line();
        let name = self.expect_ident("a function name")?;
        self.expect(Token::LParen, "`(`")?;
        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                let param = self.expect_ident("a parameter name")?;
                if params.contains(&param) {
                    return Err(ParseError::DuplicateParam { name: param, line });
                }
                params.push(param);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen, "`)`")?;

        let saved_loop_depth = self.loop_depth;
        self.loop_depth = 0;
        self.fn_depth += 1;
        let body = self.parse_block();
        self.fn_depth -= 1;
        self.loop_depth = saved_loop_depth;

        Ok(Stmt::FnDef {
            decl: Rc::new(FnDecl {
                name,
                params,
                body: body?,
                line,
            }),
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance_line();
        let cond = self.parse_expr()?;
        let then_body = self.parse_block()?;
        let else_body = if self.eat(&Token::Else) {
            if self.check(&Token::If) {
                // `else if` becomes a nested statement so it keeps its
                // own source line in the trace
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_body,
            else_body,
            line,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance_line();
        let cond = self.parse_expr()?;
        self.loop_depth += 1;
        let body = self.parse_block();
        self.loop_depth -= 1;
        Ok(Stmt::While {
            cond,
            body: body?,
            line,
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance_line();
        if self.fn_depth == 0 {
            return Err(ParseError::ReturnOutsideFunction { line });
        }
        let value = if self.at_stmt_end() {
            None
        } else {
            Some(self.parse_expr()?)
        };
        Ok(Stmt::Return { value, line })
    }

    fn parse_raise(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance_line();
        let message = self.parse_expr()?;
        Ok(Stmt::Raise { message, line })
    }

    fn parse_break(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance_line();
        if self.loop_depth == 0 {
            return Err(ParseError::BreakOutsideLoop { line });
        }
        Ok(Stmt::Break { line })
    }

    fn parse_continue(&mut self) -> Result<Stmt, ParseError> {
        let line = self.advance_line();
        if self.loop_depth == 0 {
            return Err(ParseError::ContinueOutsideLoop { line });
        }
        Ok(Stmt::Continue { line })
    }

    fn parse_assign_or_expr(&mut self) -> Result<Stmt, ParseError> {
        let line = self.current_line();
        let expr = self.parse_expr()?;
        if let Some(op) = self.peek_augmented_op() {
            self.advance_line();
            let target = Self::expr_to_target(expr, line)?;
            let value = self.parse_expr()?;
            return Ok(Stmt::AugAssign {
                target,
                op,
                value,
                line,
            });
        }
        if self.eat(&Token::Assign) {
            let target = Self::expr_to_target(expr, line)?;
            let value = self.parse_expr()?;
            return Ok(Stmt::Assign {
                target,
                value,
                line,
            });
        }
        Ok(Stmt::Expr { expr, line })
    }

    fn peek_augmented_op(&self) -> Option<BinOp> {
        match self.peek_token() {
            Some(Token::PlusAssign) => Some(BinOp::Add),
            Some(Token::MinusAssign) => Some(BinOp::Sub),
            Some(Token::StarAssign) => Some(BinOp::Mul),
            Some(Token::SlashAssign) => Some(BinOp::Div),
            _ => None,
        }
    }

    /// Reinterprets an already-parsed expression as an assignment
    /// target. Only names and index chains rooted at a name qualify.
    fn expr_to_target(expr: Expr, line: u32) -> Result<Target, ParseError> {
        match expr {
            Expr::Name(name) => Ok(Target::Name(name)),
            Expr::Index { base, index } => Ok(Target::Index {
                base: Box::new(Self::expr_to_target(*base, line)?),
                index: *index,
            }),
            _ => Err(ParseError::InvalidAssignTarget { line }),
        }
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(Token::LBrace, "`{`")?;
        self.skip_newlines();
        let mut stmts = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.at_end() {
                return Err(ParseError::UnexpectedEof {
                    expected: "`}`".to_string(),
                });
            }
            stmts.push(self.parse_stmt()?);
            self.skip_newlines();
        }
        self.expect(Token::RBrace, "`}`")?;
        Ok(stmts)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            expr = Expr::Binary {
                op: BinOp::Or,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_not()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_not()?;
            expr = Expr::Binary {
                op: BinOp::And,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
        Ok(expr)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Not) {
            let operand = self.parse_not()?;
            return Ok(Expr::Unary {
                op: UnOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_additive()?;
        let op = match self.peek_token() {
            Some(Token::EqEq) => BinOp::Eq,
            Some(Token::NotEq) => BinOp::Ne,
            Some(Token::Lt) => BinOp::Lt,
            Some(Token::Le) => BinOp::Le,
            Some(Token::Gt) => BinOp::Gt,
            Some(Token::Ge) => BinOp::Ge,
            _ => return Ok(lhs),
        };
        self.advance_line();
        let rhs = self.parse_additive()?;
        Ok(Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_term()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.advance_line();
            let rhs = self.parse_term()?;
            expr = Expr::Binary {
                op,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Mod,
                _ => break,
            };
            self.advance_line();
            let rhs = self.parse_unary()?;
            expr = Expr::Binary {
                op,
                lhs: Box::new(expr),
                rhs: Box::new(rhs),
            };
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Minus) {
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnOp::Neg,
                operand: Box::new(operand),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&Token::LParen) {
                let args = self.parse_call_args()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else if self.eat(&Token::LBracket) {
                let index = self.parse_expr()?;
                self.expect(Token::RBracket, "`]`")?;
                expr = Expr::Index {
                    base: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
                if self.check(&Token::RParen) {
                    break;
                }
            }
        }
        self.expect(Token::RParen, "`)`")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.advance() {
            Some((Token::Int(n), _)) => Ok(Expr::Int(n)),
            Some((Token::Float(x), _)) => Ok(Expr::Float(x)),
            Some((Token::Str(s), _)) => Ok(Expr::Str(s)),
            Some((Token::True, _)) => Ok(Expr::Bool(true)),
            Some((Token::False, _)) => Ok(Expr::Bool(false)),
            Some((Token::Nil, _)) => Ok(Expr::Nil),
            Some((Token::Ident(name), _)) => Ok(Expr::Name(name)),
            Some((Token::LParen, _)) => {
                let expr = self.parse_expr()?;
                self.expect(Token::RParen, "`)`")?;
                Ok(expr)
            }
            Some((Token::LBracket, _)) => {
                let mut items = Vec::new();
                if !self.check(&Token::RBracket) {
                    loop {
                        items.push(self.parse_expr()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                        if self.check(&Token::RBracket) {
                            break;
                        }
                    }
                }
                self.expect(Token::RBracket, "`]`")?;
                Ok(Expr::List(items))
            }
            Some((token, line)) => Err(ParseError::UnexpectedToken {
                found: token.to_string(),
                expected: "an expression".to_string(),
                line,
            }),
            None => Err(ParseError::UnexpectedEof {
                expected: "an expression".to_string(),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Token stream helpers
    // ------------------------------------------------------------------

    fn peek_token(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    fn check(&self, token: &Token) -> bool {
        self.peek_token() == Some(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Option<(Token, u32)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    /// Consumes the current token, returning its line. Callers have
    /// already matched the token via `peek_token`.
    fn advance_line(&mut self) -> u32 {
        let line = self.current_line();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        line
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn at_stmt_end(&self) -> bool {
        matches!(
            self.peek_token(),
            None | Some(Token::Newline) | Some(Token::RBrace)
        )
    }

    fn current_line(&self) -> u32 {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|(_, line)| *line)
            .unwrap_or(1)
    }

    fn expect(&mut self, expected: Token, describe: &str) -> Result<u32, ParseError> {
        match self.tokens.get(self.pos) {
            Some((token, line)) if *token == expected => {
                let line = *line;
                self.pos += 1;
                Ok(line)
            }
            Some((token, line)) => Err(ParseError::UnexpectedToken {
                found: token.to_string(),
                expected: describe.to_string(),
                line: *line,
            }),
            None => Err(ParseError::UnexpectedEof {
                expected: describe.to_string(),
            }),
        }
    }

    fn expect_ident(&mut self, describe: &str) -> Result<String, ParseError> {
        match self.tokens.get(self.pos) {
            Some((Token::Ident(name), _)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            Some((token, line)) => Err(ParseError::UnexpectedToken {
                found: token.to_string(),
                expected: describe.to_string(),
                line: *line,
            }),
            None => Err(ParseError::UnexpectedEof {
                expected: describe.to_string(),
            }),
        }
    }

    /// A statement ends at a newline, at the end of input, or right
    /// before a closing brace. The brace is left for `parse_block`.
    fn expect_stmt_end(&mut self) -> Result<(), ParseError> {
        match self.tokens.get(self.pos) {
            None | Some((Token::RBrace, _)) => Ok(()),
            Some((Token::Newline, _)) => {
                self.pos += 1;
                Ok(())
            }
            Some((token, line)) => Err(ParseError::UnexpectedToken {
                found: token.to_string(),
                expected: "end of line".to_string(),
                line: *line,
            }),
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat(&Token::Newline) {}
    }
}
