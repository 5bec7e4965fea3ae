// ABOUTME: Recursive descent parser for the embedded expression language
// ABOUTME: Builds an Expr tree from lexer tokens, including arrow-function arguments

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::{ExprError, Result};
use super::lexer::{Lexer, Spanned, Token};

/// Parse a complete expression. Trailing tokens are an error.
pub fn parse(input: &str) -> Result<Expr> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser::new(tokens);
    let expr = parser.parse_expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(ExprError::UnexpectedToken {
            expected: "end of expression".to_string(),
            found: token.to_string(),
        }),
    }
}

/// Deepest nesting of groups, lists, arguments, lambda bodies and negations
pub const MAX_DEPTH: usize = 64;

pub struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Spanned>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.nested(Self::parse_additive)
    }

    /// Run `parse` one nesting level down, failing past MAX_DEPTH
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.peek() == Some(&Token::Minus) {
            self.pos += 1;
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.pos += 1;
                    let name = self.expect_ident("property or method name")?;
                    if self.peek() == Some(&Token::LParen) {
                        self.pos += 1;
                        let args = self.parse_list_items(Token::RParen)?;
                        expr = Expr::Call {
                            target: Box::new(expr),
                            method: name,
                            args,
                        };
                    } else {
                        expr = Expr::Member {
                            target: Box::new(expr),
                            name,
                        };
                    }
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    let index = self.parse_expr()?;
                    self.expect(Token::RBracket)?;
                    expr = Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        if let Some((params, consumed)) = self.arrow_params_ahead() {
            self.pos += consumed;
            let body = self.parse_expr()?;
            return Ok(Expr::Lambda {
                params,
                body: Box::new(body),
            });
        }

        let token = self.advance("an expression")?;
        match token {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::Bool(true),
                "false" => Expr::Bool(false),
                _ => Expr::Ident(name),
            }),
            Token::LBracket => Ok(Expr::List(self.parse_list_items(Token::RBracket)?)),
            Token::LParen => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            other => Err(ExprError::UnexpectedToken {
                expected: "an expression".to_string(),
                found: other.to_string(),
            }),
        }
    }

    /// Comma separated expressions up to `close`, which is consumed
    fn parse_list_items(&mut self, close: Token) -> Result<Vec<Expr>> {
        let mut items = Vec::new();
        if self.peek() == Some(&close) {
            self.pos += 1;
            return Ok(items);
        }
        loop {
            items.push(self.parse_expr()?);
            match self.advance(&close.to_string())? {
                Token::Comma => {
                    // allow a trailing comma
                    if self.peek() == Some(&close) {
                        self.pos += 1;
                        return Ok(items);
                    }
                }
                t if t == close => return Ok(items),
                other => {
                    return Err(ExprError::UnexpectedToken {
                        expected: format!("',' or {}", close),
                        found: other.to_string(),
                    })
                }
            }
        }
    }

    /// Detects `x =>` and `(a, b) =>` without consuming anything.
    /// Returns the parameter names and the number of tokens they span.
    fn arrow_params_ahead(&self) -> Option<(Vec<String>, usize)> {
        match self.peek_at(0)? {
            Token::Ident(name) if self.peek_at(1) == Some(&Token::Arrow) => {
                Some((vec![name.clone()], 2))
            }
            Token::LParen => {
                let mut params = Vec::new();
                let mut offset = 1;
                if self.peek_at(offset) == Some(&Token::RParen) {
                    offset += 1;
                } else {
                    loop {
                        match self.peek_at(offset)? {
                            Token::Ident(name) => params.push(name.clone()),
                            _ => return None,
                        }
                        offset += 1;
                        match self.peek_at(offset)? {
                            Token::Comma => offset += 1,
                            Token::RParen => {
                                offset += 1;
                                break;
                            }
                            _ => return None,
                        }
                    }
                }
                if self.peek_at(offset) == Some(&Token::Arrow) {
                    Some((params, offset + 1))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|s| &s.token)
    }

    fn advance(&mut self, expected: &str) -> Result<Token> {
        let token = self
            .tokens
            .get(self.pos)
            .map(|s| s.token.clone())
            .ok_or_else(|| ExprError::UnexpectedEnd {
                expected: expected.to_string(),
            })?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, wanted: Token) -> Result<()> {
        let found = self.advance(&wanted.to_string())?;
        if found == wanted {
            Ok(())
        } else {
            Err(ExprError::UnexpectedToken {
                expected: wanted.to_string(),
                found: found.to_string(),
            })
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<String> {
        match self.advance(expected)? {
            Token::Ident(name) => Ok(name),
            other => Err(ExprError::UnexpectedToken {
                expected: expected.to_string(),
                found: other.to_string(),
            }),
        }
    }
}
