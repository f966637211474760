// This file is part of thrive, a compiler.
// Copyright 2025 Jeffrey Sharp
//
// SPDX-License-Identifier: GPL-3.0-or-later
//
// thrive is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published
// by the Free Software Foundation, either version 3 of the License,
// or (at your option) any later version.
//
// thrive is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with thrive.  If not, see <http://www.gnu.org/licenses/>.

//! Parser.
//!
//! Expressions are parsed by precedence climbing: a primary, then a loop
//! consuming infix operators whose binding power meets the minimum.  The
//! recursion for a left-associative operator passes `bp + 1`; assignment
//! passes `bp` unchanged, making it right-associative.

use crate::name::Name;

use super::ast::{BinOp, Node, NodeId};
use super::token::{Token, TokenKind};

// ----------------------------------------------------------------------------

/// Parses `tokens` into the `ast` arena and returns the arena length.
///
/// Parsing stops at the end-of-file token or, silently, when the arena has
/// reached `cap` nodes at a statement boundary.
pub fn parse<'a>(tokens: &[Token<'a>], ast: &mut Vec<Node>, cap: usize) -> usize {
    ast.clear();
    if tokens.is_empty() {
        return 0;
    }

    let mut parser = Parser { tokens, pos: 0, ast: &mut *ast };

    while !matches!(parser.peek().kind, TokenKind::Eof) && parser.ast.len() < cap {
        parser.parse_stmt();
    }

    ast.len()
}

/// Infix operators recognized by the expression parser.
#[derive(Clone, Copy, Debug)]
enum InfixOp {
    Binary(BinOp),
    Assign,
}

/// Returns the infix operator and binding power for a token, if any.
/// Higher binding power binds tighter.
fn infix_op(kind: TokenKind) -> Option<(InfixOp, i32)> {
    use TokenKind::*;

    match kind {            //  op                      bp
        Mul    => Some((InfixOp::Binary(BinOp::Mul), 50)),
        Div    => Some((InfixOp::Binary(BinOp::Div), 50)),
        Add    => Some((InfixOp::Binary(BinOp::Add), 40)),
        Sub    => Some((InfixOp::Binary(BinOp::Sub), 40)),
        Assign => Some((InfixOp::Assign,             10)),
        _      => None,
    }
}

struct Parser<'a, 't> {
    tokens: &'t [Token<'a>],
    pos:    usize,
    ast:    &'t mut Vec<Node>,
}

impl<'a> Parser<'a, '_> {
    /// Returns the current token; saturates at the final token.
    fn peek(&self) -> Token<'a> {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Consumes the current token if it has the given kind.
    fn accept(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Appends a node to the arena and returns its index.
    fn alloc(&mut self, node: Node) -> NodeId {
        let id = self.ast.len() as NodeId;
        self.ast.push(node);
        id
    }

    /// Parses one statement: a declaration, a return, or a bare expression
    /// whose value is discarded.
    fn parse_stmt(&mut self) {
        // u32 NAME = EXPR
        if self.accept(TokenKind::U32) {
            let name = match self.peek().kind {
                TokenKind::Ident(text) => Name::new(text.as_bytes()),
                _                      => Name::EMPTY,
            };
            let id = self.alloc(Node::Decl(name, 0));
            self.advance();
            self.accept(TokenKind::Assign);
            let expr = self.parse_expr(0);
            self.ast[id as usize] = Node::Decl(name, expr);
            return;
        }

        // ret EXPR
        if self.accept(TokenKind::Ret) {
            let id = self.alloc(Node::Return(0));
            let expr = self.parse_expr(0);
            self.ast[id as usize] = Node::Return(expr);
            return;
        }

        self.parse_expr(0);
    }

    fn parse_expr(&mut self, min_bp: i32) -> NodeId {
        let mut left = self.parse_primary();

        loop {
            let (op, bp) = match infix_op(self.peek().kind) {
                Some((op, bp)) if bp >= min_bp => (op, bp),
                _                              => break,
            };

            self.advance();

            let next_min = match op {
                InfixOp::Assign => bp,
                _               => bp + 1,
            };
            let right = self.parse_expr(next_min);

            left = match op {
                InfixOp::Binary(op) => self.alloc(Node::Binary(op, left, right)),
                InfixOp::Assign     => self.alloc(Node::Assign(left, right)),
            };
        }

        left
    }

    fn parse_primary(&mut self) -> NodeId {
        match self.peek().kind {
            TokenKind::Int(value) => {
                self.advance();
                self.alloc(Node::Int(value))
            }
            TokenKind::Float(value) => {
                self.advance();
                self.alloc(Node::Float(value))
            }
            TokenKind::Ident(text) => {
                self.advance();
                self.alloc(Node::Var(Name::new(text.as_bytes())))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr(0);
                // A missing `)` is tolerated
                self.accept(TokenKind::RParen);
                inner
            }
            _ => {
                // Unexpected token: consume it and continue as if it were 0
                self.advance();
                self.alloc(Node::Int(0))
            }
        }
    }
}

// ----------------------------------------------------------------------------
