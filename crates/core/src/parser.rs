//! Recursive-descent parser for permission expressions.
//!
//! Precedence, highest to lowest: parenthesized sub-expression and
//! attribute paths (handled by the tokenizer), comparison operators
//! (one level, left-associative), `in`, `not` (prefix), `and`, `or`.
//! `a or b and c` therefore parses as `a or (b and c)`, and
//! `not a and b` as `(not a) and b`.

use crate::ast::{CmpOp, Expr, Literal};
use crate::error::SyntaxError;
use crate::lexer::{self, Spanned, Token};

/// Parse a permission expression string into an AST.
///
/// The entire input must form one expression; trailing tokens are a
/// syntax error. Errors carry the expression text and the offset of the
/// offending token for the caret diagnostic.
pub fn parse_expression(text: &str) -> Result<Expr, SyntaxError> {
    let tokens = lexer::lex(text).map_err(|e| e.with_expression(text))?;
    let mut parser = Parser::new(&tokens);
    let expr = parser
        .parse_complete()
        .map_err(|e| e.with_expression(text))?;
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Word(x) if x == w)
    }

    fn err(&self, msg: impl Into<String>) -> SyntaxError {
        SyntaxError::at(msg, self.cur().offset)
    }

    fn unexpected(&self) -> SyntaxError {
        self.err(format!("Unexpected token {}", self.peek().describe()))
    }

    fn parse_complete(&mut self) -> Result<Expr, SyntaxError> {
        let expr = self.parse_or_expr()?;
        if self.peek() != &Token::Eof {
            return Err(self.unexpected());
        }
        Ok(expr)
    }

    fn parse_or_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_and_expr()?;
        while self.is_word("or") {
            self.advance();
            let right = self.parse_and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_not_expr()?;
        while self.is_word("and") {
            self.advance();
            let right = self.parse_not_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not_expr(&mut self) -> Result<Expr, SyntaxError> {
        if self.is_word("not") {
            self.advance();
            let operand = self.parse_not_expr()?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.parse_in_expr()
    }

    fn parse_in_expr(&mut self) -> Result<Expr, SyntaxError> {
        let left = self.parse_cmp_expr()?;
        if self.is_word("in") {
            self.advance();
            let list = self.parse_list_literal()?;
            return Ok(Expr::In {
                needle: Box::new(left),
                haystack: Box::new(list),
            });
        }
        Ok(left)
    }

    fn parse_cmp_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_primary()?;
        while let Some(op) = self.peek_cmp_op() {
            self.advance();
            let right = self.parse_primary()?;
            left = Expr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn peek_cmp_op(&self) -> Option<CmpOp> {
        match self.peek() {
            Token::Eq => Some(CmpOp::Eq),
            Token::Neq => Some(CmpOp::Ne),
            Token::Gt => Some(CmpOp::Gt),
            Token::Lt => Some(CmpOp::Lt),
            Token::Gte => Some(CmpOp::Ge),
            Token::Lte => Some(CmpOp::Le),
            _ => None,
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek().clone() {
            Token::Word(w) => match w.as_str() {
                "true" | "True" => {
                    self.advance();
                    Ok(Expr::Literal(Literal::Bool(true)))
                }
                "false" | "False" => {
                    self.advance();
                    Ok(Expr::Literal(Literal::Bool(false)))
                }
                "null" | "None" => {
                    self.advance();
                    Ok(Expr::Literal(Literal::Null))
                }
                // Keywords never start a primary
                "and" | "or" | "not" | "in" => Err(self.unexpected()),
                _ => {
                    self.advance();
                    Ok(Expr::Ident(w))
                }
            },
            Token::Path(segments) => {
                self.advance();
                let mut segments = segments;
                let root = segments.remove(0);
                Ok(Expr::Path { root, segments })
            }
            Token::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::Str(s)))
            }
            Token::Int(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Int(n)))
            }
            Token::Float(f) => {
                self.advance();
                Ok(Expr::Literal(Literal::Float(f)))
            }
            Token::LParen => {
                self.advance();
                let expr = self.parse_or_expr()?;
                if self.peek() != &Token::RParen {
                    return Err(self.err(format!(
                        "Expected ')', got {}",
                        self.peek().describe()
                    )));
                }
                self.advance();
                Ok(expr)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_list_literal(&mut self) -> Result<Expr, SyntaxError> {
        if self.peek() != &Token::LBracket {
            return Err(self.err(format!(
                "Expected a list after 'in', got {}",
                self.peek().describe()
            )));
        }
        self.advance();

        let mut items = Vec::new();
        if self.peek() == &Token::RBracket {
            self.advance();
            return Ok(Expr::List(items));
        }

        items.push(self.parse_primary()?);
        while self.peek() == &Token::Comma {
            self.advance();
            if self.peek() == &Token::RBracket {
                return Err(self.err("Empty list element"));
            }
            items.push(self.parse_primary()?);
        }

        if self.peek() != &Token::RBracket {
            return Err(self.err(format!(
                "Expected ']', got {}",
                self.peek().describe()
            )));
        }
        self.advance();
        Ok(Expr::List(items))
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
