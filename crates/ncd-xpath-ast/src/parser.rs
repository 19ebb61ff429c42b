//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! A recursive-descent parser for the XPath 1.0 grammar (W3C Rec §3),
//! extended only at the lexical level (see [`crate::lexer`]) to keep
//! `prefix:local` axis/function/type names intact. Operator keywords
//! (`and`, `or`, `div`, `mod`) arrive from the lexer as plain names and are
//! recognized here by grammatical position, exactly as the XPath spec's
//! own "ExprToken" disambiguation does it.

use std::fmt;

use crate::ast::{Axis, BinOp, Expr, NodeTest, NodeType, PathExpr, PathRoot, QName, Step};
use crate::lexer::{self, Token};

#[derive(Debug)]
pub struct ParseError {
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = lexer::tokenize(input).map_err(|e| ParseError {
        message: format!("lex error: {e}"),
    })?;
    let mut p = Parser { tokens, pos: 0 };
    let expr = p.parse_or_expr()?;
    if p.pos != p.tokens.len() {
        return Err(ParseError {
            message: format!("trailing tokens after expression: {:?}", &p.tokens[p.pos..]),
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, t: &Token) -> Result<(), ParseError> {
        match self.bump() {
            Some(ref got) if got == t => Ok(()),
            got => Err(ParseError {
                message: format!("expected {t}, got {got:?}"),
            }),
        }
    }

    fn peek_is_name(&self, s: &str) -> bool {
        matches!(self.peek(), Some(Token::Name(n)) if n == s)
    }

    fn eat_name(&mut self, s: &str) -> bool {
        if self.peek_is_name(s) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    // OrExpr ::= AndExpr ('or' AndExpr)*
    fn parse_or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and_expr()?;
        while self.eat_name("or") {
            let rhs = self.parse_and_expr()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // AndExpr ::= EqualityExpr ('and' EqualityExpr)*
    fn parse_and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_equality_expr()?;
        while self.eat_name("and") {
            let rhs = self.parse_equality_expr()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // EqualityExpr ::= RelationalExpr (('=' | '!=') RelationalExpr)*
    fn parse_equality_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_relational_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinOp::Eq,
                Some(Token::Ne) => BinOp::Ne,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_relational_expr()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // RelationalExpr ::= AdditiveExpr (('<' | '>' | '<=' | '>=') AdditiveExpr)*
    fn parse_relational_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinOp::Lt,
                Some(Token::Le) => BinOp::Le,
                Some(Token::Gt) => BinOp::Gt,
                Some(Token::Ge) => BinOp::Ge,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_additive_expr()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_additive_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_multiplicative_expr()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary_expr()?;
        loop {
            let op = if matches!(self.peek(), Some(Token::Star)) {
                BinOp::Mul
            } else if self.peek_is_name("div") {
                BinOp::Div
            } else if self.peek_is_name("mod") {
                BinOp::Mod
            } else {
                break;
            };
            self.pos += 1;
            let rhs = self.parse_unary_expr()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary_expr(&mut self) -> Result<Expr, ParseError> {
        if matches!(self.peek(), Some(Token::Minus)) {
            self.pos += 1;
            let inner = self.parse_unary_expr()?;
            return Ok(Expr::Negate(Box::new(inner)));
        }
        self.parse_union_expr()
    }

    // UnionExpr ::= PathExpr ('|' PathExpr)*
    fn parse_union_expr(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_path_expr()?;
        if !matches!(self.peek(), Some(Token::Pipe)) {
            return Ok(first);
        }
        let mut parts = vec![first];
        while matches!(self.peek(), Some(Token::Pipe)) {
            self.pos += 1;
            parts.push(self.parse_path_expr()?);
        }
        Ok(Expr::Union(parts))
    }

    fn parse_path_expr(&mut self) -> Result<Expr, ParseError> {
        // Absolute paths: '/' or '//' at the start.
        if matches!(self.peek(), Some(Token::Slash)) {
            self.pos += 1;
            let steps = if self.at_step_start() {
                self.parse_relative_location_path()?
            } else {
                Vec::new()
            };
            return Ok(Expr::Path(PathExpr {
                root: PathRoot::Absolute,
                steps,
            }));
        }
        if matches!(self.peek(), Some(Token::DoubleSlash)) {
            self.pos += 1;
            let mut steps = self.parse_relative_location_path()?;
            steps.insert(
                0,
                Step {
                    axis: Axis::DescendantOrSelf,
                    test: NodeTest::Kind(NodeType::Node, None),
                    predicates: Vec::new(),
                },
            );
            return Ok(Expr::Path(PathExpr {
                root: PathRoot::Absolute,
                steps,
            }));
        }

        // Otherwise, try a relative location path starting with a step, or
        // fall back to a filter expression (primary expr + predicates)
        // optionally followed by `/`/`//` steps.
        if self.at_step_start() {
            let steps = self.parse_relative_location_path()?;
            return Ok(Expr::Path(PathExpr {
                root: PathRoot::Relative,
                steps,
            }));
        }

        let primary = self.parse_filter_expr()?;
        if matches!(self.peek(), Some(Token::Slash) | Some(Token::DoubleSlash)) {
            let mut steps = Vec::new();
            if matches!(self.peek(), Some(Token::DoubleSlash)) {
                self.pos += 1;
                steps.push(Step {
                    axis: Axis::DescendantOrSelf,
                    test: NodeTest::Kind(NodeType::Node, None),
                    predicates: Vec::new(),
                });
                steps.extend(self.parse_relative_location_path()?);
            } else {
                self.pos += 1;
                steps.extend(self.parse_relative_location_path()?);
            }
            return Ok(Expr::Path(PathExpr {
                root: PathRoot::Filter(Box::new(primary)),
                steps,
            }));
        }
        Ok(primary)
    }

    fn at_step_start(&self) -> bool {
        match self.peek() {
            Some(Token::Dot) | Some(Token::DotDot) | Some(Token::At) | Some(Token::Star) => true,
            Some(Token::Name(n)) => {
                // An axis name followed by '::' is unambiguous; a bare
                // name is a node test too. Function calls (name followed
                // by '(') and the node-type tests are handled inside
                // parse_node_test/parse_filter_expr by lookahead.
                n != "and" && n != "or" && n != "div" && n != "mod"
            }
            _ => false,
        }
    }

    fn parse_relative_location_path(&mut self) -> Result<Vec<Step>, ParseError> {
        let mut steps = vec![self.parse_step()?];
        loop {
            if matches!(self.peek(), Some(Token::Slash)) {
                self.pos += 1;
                steps.push(self.parse_step()?);
            } else if matches!(self.peek(), Some(Token::DoubleSlash)) {
                self.pos += 1;
                steps.push(Step {
                    axis: Axis::DescendantOrSelf,
                    test: NodeTest::Kind(NodeType::Node, None),
                    predicates: Vec::new(),
                });
                steps.push(self.parse_step()?);
            } else {
                break;
            }
        }
        Ok(steps)
    }

    fn parse_step(&mut self) -> Result<Step, ParseError> {
        if matches!(self.peek(), Some(Token::Dot)) {
            self.pos += 1;
            return Ok(Step {
                axis: Axis::SelfAxis,
                test: NodeTest::Kind(NodeType::Node, None),
                predicates: Vec::new(),
            });
        }
        if matches!(self.peek(), Some(Token::DotDot)) {
            self.pos += 1;
            return Ok(Step {
                axis: Axis::Parent,
                test: NodeTest::Kind(NodeType::Node, None),
                predicates: Vec::new(),
            });
        }

        let axis = if matches!(self.peek(), Some(Token::At)) {
            self.pos += 1;
            Axis::Attribute
        } else if let Some(Token::Name(name)) = self.peek().cloned() {
            if self.tokens.get(self.pos + 1) == Some(&Token::ColonColon) {
                let axis = Axis::from_name(&name).ok_or_else(|| ParseError {
                    message: format!("unknown axis '{name}'"),
                })?;
                self.pos += 2;
                axis
            } else {
                Axis::Child
            }
        } else {
            Axis::Child
        };

        let test = self.parse_node_test()?;
        let mut predicates = Vec::new();
        while matches!(self.peek(), Some(Token::LBracket)) {
            predicates.push(self.parse_predicate()?);
        }
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn parse_node_test(&mut self) -> Result<NodeTest, ParseError> {
        if matches!(self.peek(), Some(Token::Star)) {
            self.pos += 1;
            return Ok(NodeTest::Wildcard);
        }
        let name = match self.bump() {
            Some(Token::Name(n)) => n,
            got => {
                return Err(ParseError {
                    message: format!("expected node test, got {got:?}"),
                });
            }
        };
        // `prefix:*`
        if let Some(prefix) = name.strip_suffix(":*") {
            return Ok(NodeTest::WildcardNamespace(prefix.to_owned()));
        }
        // node-type tests: a bare NCName (no colon) followed by '('.
        if !name.contains(':') && matches!(self.peek(), Some(Token::LParen)) {
            let node_type = match name.as_str() {
                "node" => Some(NodeType::Node),
                "text" => Some(NodeType::Text),
                "comment" => Some(NodeType::Comment),
                "processing-instruction" => Some(NodeType::ProcessingInstruction),
                _ => None,
            };
            if let Some(node_type) = node_type {
                self.pos += 1;
                let literal = if matches!(node_type, NodeType::ProcessingInstruction)
                    && !matches!(self.peek(), Some(Token::RParen))
                {
                    match self.bump() {
                        Some(Token::Literal(s)) => Some(s),
                        got => {
                            return Err(ParseError {
                                message: format!("expected string literal, got {got:?}"),
                            });
                        }
                    }
                } else {
                    None
                };
                self.expect(&Token::RParen)?;
                return Ok(NodeTest::Kind(node_type, literal));
            }
        }
        Ok(NodeTest::Name(QName::parse(&name)))
    }

    fn parse_predicate(&mut self) -> Result<Expr, ParseError> {
        self.expect(&Token::LBracket)?;
        let expr = self.parse_or_expr()?;
        self.expect(&Token::RBracket)?;
        Ok(expr)
    }

    // FilterExpr ::= PrimaryExpr Predicate*
    fn parse_filter_expr(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary_expr()?;
        while matches!(self.peek(), Some(Token::LBracket)) {
            let pred = self.parse_predicate()?;
            expr = Expr::Path(PathExpr {
                root: PathRoot::Filter(Box::new(expr)),
                steps: vec![Step {
                    axis: Axis::SelfAxis,
                    test: NodeTest::Kind(NodeType::Node, None),
                    predicates: vec![pred],
                }],
            });
        }
        Ok(expr)
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, ParseError> {
        match self.peek().cloned() {
            Some(Token::Dollar) => {
                self.pos += 1;
                let name = match self.bump() {
                    Some(Token::Name(n)) => n,
                    got => {
                        return Err(ParseError {
                            message: format!("expected variable name, got {got:?}"),
                        });
                    }
                };
                Ok(Expr::Variable(QName::parse(&name)))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.parse_or_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Literal(s)) => {
                self.pos += 1;
                Ok(Expr::Literal(s))
            }
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(Expr::Number(n))
            }
            Some(Token::Name(name)) => {
                self.pos += 1;
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.pos += 1;
                    let mut args = Vec::new();
                    if !matches!(self.peek(), Some(Token::RParen)) {
                        args.push(self.parse_or_expr()?);
                        while matches!(self.peek(), Some(Token::Comma)) {
                            self.pos += 1;
                            args.push(self.parse_or_expr()?);
                        }
                    }
                    self.expect(&Token::RParen)?;
                    Ok(Expr::Call(QName::parse(&name), args))
                } else {
                    Err(ParseError {
                        message: format!("unexpected name '{name}' in primary expression"),
                    })
                }
            }
            got => Err(ParseError {
                message: format!("unexpected token in primary expression: {got:?}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_absolute_path_with_predicate() {
        let expr = parse("/ex:top/ex:ifs/ex:if[ex:name='eth0']").unwrap();
        match expr {
            Expr::Path(p) => {
                assert_eq!(p.root, PathRoot::Absolute);
                assert_eq!(p.steps.len(), 3);
            }
            other => panic!("expected path, got {other:?}"),
        }
    }

    #[test]
    fn parses_current_function_relative_path() {
        let expr = parse("current()/../ex:name").unwrap();
        match expr {
            Expr::Path(p) => {
                assert!(matches!(p.root, PathRoot::Filter(_)));
                assert_eq!(p.steps.len(), 2);
            }
            other => panic!("expected path, got {other:?}"),
        }
    }

    #[test]
    fn parses_boolean_and_arithmetic() {
        let expr = parse("1 + 2 = 3 and true()").unwrap();
        assert!(matches!(expr, Expr::Binary(BinOp::And, ..)));
    }

    #[test]
    fn parses_descendant_step() {
        let expr = parse("//ex:if").unwrap();
        match expr {
            Expr::Path(p) => assert_eq!(p.steps.len(), 2),
            other => panic!("expected path, got {other:?}"),
        }
    }

    #[test]
    fn parses_parent_axis_path_arg_shape() {
        let expr = parse("../../ex:ifs/ex:if[ex:name=current()/../ex:name]/ex:name").unwrap();
        assert!(matches!(expr, Expr::Path(_)));
    }
}
