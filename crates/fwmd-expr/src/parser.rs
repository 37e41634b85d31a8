// Dweve FWMD - Fixed-Width Microdata Engine
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Lexer and recursive-descent parser for the restricted expression
//! grammar.
//!
//! The allowed grammar, in precedence order from loosest to tightest:
//!
//! ```text
//! expr    = or
//! or      = and ("or" and)*
//! and     = not ("and" not)*
//! not     = "not" not | cmp
//! cmp     = add (("==" | "!=" | "<" | "<=" | ">" | ">=") add)?
//! add     = mul (("+" | "-") mul)*
//! mul     = unary (("*" | "/" | "%") unary)*
//! unary   = "-" unary | postfix
//! postfix = atom            (any "." or "[" here is rejected)
//! atom    = literal | field | func "(" expr ")" | "(" expr ")"
//! ```
//!
//! Everything outside this (attribute access, subscripting, assignment,
//! calls beyond the `int`/`float`/`str`/`len` whitelist) fails
//! compilation. Rejection happens before any evaluation machinery exists,
//! so a hostile expression never gets an evaluator at all.

use crate::ast::{BinaryOp, Expr, ExprLiteral, Func, UnaryOp};
use crate::error::{ExprError, ExprResult};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    LParen,
    RParen,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    True,
    False,
    // Lexed so rejections can name the construct precisely.
    Dot,
    LBracket,
    RBracket,
    Assign,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Int(n) => format!("`{}`", n),
            Token::Float(n) => format!("`{}`", n),
            Token::Str(s) => format!("string `{}`", s),
            Token::Ident(s) => format!("`{}`", s),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Plus => "`+`".to_string(),
            Token::Minus => "`-`".to_string(),
            Token::Star => "`*`".to_string(),
            Token::Slash => "`/`".to_string(),
            Token::Percent => "`%`".to_string(),
            Token::EqEq => "`==`".to_string(),
            Token::NotEq => "`!=`".to_string(),
            Token::Lt => "`<`".to_string(),
            Token::Le => "`<=`".to_string(),
            Token::Gt => "`>`".to_string(),
            Token::Ge => "`>=`".to_string(),
            Token::And => "`and`".to_string(),
            Token::Or => "`or`".to_string(),
            Token::Not => "`not`".to_string(),
            Token::True => "`true`".to_string(),
            Token::False => "`false`".to_string(),
            Token::Dot => "`.`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::Assign => "`=`".to_string(),
        }
    }
}

fn lex(text: &str) -> ExprResult<Vec<Token>> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::EqEq);
                    i += 2;
                } else {
                    tokens.push(Token::Assign);
                    i += 1;
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::NotEq);
                    i += 2;
                } else {
                    return Err(ExprError::Syntax("unexpected character `!`".to_string()));
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            '"' | '\'' => {
                let quote = c;
                let mut s = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(&ch) => {
                            s.push(ch);
                            i += 1;
                        }
                        None => {
                            return Err(ExprError::Syntax(
                                "unterminated string literal".to_string(),
                            ))
                        }
                    }
                }
                tokens.push(Token::Str(s));
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let mut is_float = false;
                if i < chars.len()
                    && chars[i] == '.'
                    && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
                {
                    is_float = true;
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                if is_float {
                    let n: f64 = text
                        .parse()
                        .map_err(|_| ExprError::Syntax(format!("bad number `{}`", text)))?;
                    tokens.push(Token::Float(n));
                } else {
                    match text.parse::<i64>() {
                        Ok(n) => tokens.push(Token::Int(n)),
                        Err(_) => {
                            let n: f64 = text.parse().map_err(|_| {
                                ExprError::Syntax(format!("bad number `{}`", text))
                            })?;
                            tokens.push(Token::Float(n));
                        }
                    }
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "true" | "True" => Token::True,
                    "false" | "False" => Token::False,
                    _ => Token::Ident(word),
                });
            }
            other => {
                return Err(ExprError::Syntax(format!(
                    "unexpected character `{}`",
                    other
                )))
            }
        }
    }

    Ok(tokens)
}

/// Parse expression text into the restricted syntax tree.
pub fn parse(text: &str) -> ExprResult<Expr> {
    let tokens = lex(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(unexpected(tok)),
    }
}

/// Map a stray token to its rejection. The disallowed constructs get
/// named errors; anything else is a plain syntax error.
fn unexpected(tok: &Token) -> ExprError {
    match tok {
        Token::Dot => ExprError::Disallowed("attribute access"),
        Token::LBracket | Token::RBracket => ExprError::Disallowed("subscripting"),
        Token::Assign => ExprError::Disallowed("assignment"),
        other => ExprError::Syntax(format!("unexpected {}", other.describe())),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, tok: &Token) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Token, what: &str) -> ExprResult<()> {
        if self.eat(&tok) {
            Ok(())
        } else {
            match self.peek() {
                Some(found) => Err(match found {
                    Token::Dot | Token::LBracket | Token::RBracket | Token::Assign => {
                        unexpected(found)
                    }
                    _ => ExprError::Syntax(format!(
                        "expected {}, found {}",
                        what,
                        found.describe()
                    )),
                }),
                None => Err(ExprError::Syntax(format!(
                    "expected {}, found end of expression",
                    what
                ))),
            }
        }
    }

    fn parse_or(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = Expr::Binary {
                op: BinaryOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.parse_not()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_not()?;
            lhs = Expr::Binary {
                op: BinaryOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> ExprResult<Expr> {
        if self.eat(&Token::Not) {
            let operand = self.parse_not()?;
            Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            })
        } else {
            self.parse_cmp()
        }
    }

    fn parse_cmp(&mut self) -> ExprResult<Expr> {
        let lhs = self.parse_add()?;
        let op = match self.peek() {
            Some(Token::EqEq) => Some(BinaryOp::Eq),
            Some(Token::NotEq) => Some(BinaryOp::Ne),
            Some(Token::Lt) => Some(BinaryOp::Lt),
            Some(Token::Le) => Some(BinaryOp::Le),
            Some(Token::Gt) => Some(BinaryOp::Gt),
            Some(Token::Ge) => Some(BinaryOp::Ge),
            _ => None,
        };
        let Some(op) = op else {
            return Ok(lhs);
        };
        self.advance();
        let rhs = self.parse_add()?;
        Ok(Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_add(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_mul()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_mul(&mut self) -> ExprResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> ExprResult<Expr> {
        if self.eat(&Token::Minus) {
            let operand = self.parse_unary()?;
            Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            })
        } else {
            self.parse_postfix()
        }
    }

    fn parse_postfix(&mut self) -> ExprResult<Expr> {
        let expr = self.parse_atom()?;
        // The grammar has no postfix forms; anything dangling here is a
        // rejected construct, named for the error message.
        match self.peek() {
            Some(Token::Dot) => Err(ExprError::Disallowed("attribute access")),
            Some(Token::LBracket) => Err(ExprError::Disallowed("subscripting")),
            Some(Token::Assign) => Err(ExprError::Disallowed("assignment")),
            _ => Ok(expr),
        }
    }

    fn parse_atom(&mut self) -> ExprResult<Expr> {
        match self.advance() {
            Some(Token::Int(n)) => Ok(Expr::Literal(ExprLiteral::Int(n))),
            Some(Token::Float(n)) => Ok(Expr::Literal(ExprLiteral::Float(n))),
            Some(Token::Str(s)) => Ok(Expr::Literal(ExprLiteral::Text(s))),
            Some(Token::True) => Ok(Expr::Literal(ExprLiteral::Bool(true))),
            Some(Token::False) => Ok(Expr::Literal(ExprLiteral::Bool(false))),
            Some(Token::Ident(name)) => {
                if self.eat(&Token::LParen) {
                    let Some(func) = Func::from_name(&name) else {
                        return Err(ExprError::UnknownFunction { name });
                    };
                    let arg = self.parse_or()?;
                    if self.peek() == Some(&Token::Comma) {
                        return Err(ExprError::Syntax(format!(
                            "`{}` takes a single argument",
                            name
                        )));
                    }
                    self.expect(Token::RParen, "`)`")?;
                    Ok(Expr::Call {
                        func,
                        arg: Box::new(arg),
                    })
                } else {
                    Ok(Expr::Field(name))
                }
            }
            Some(Token::LParen) => {
                let expr = self.parse_or()?;
                self.expect(Token::RParen, "`)`")?;
                Ok(expr)
            }
            Some(tok) => Err(unexpected(&tok)),
            None => Err(ExprError::Syntax("empty expression".to_string())),
        }
    }
}
