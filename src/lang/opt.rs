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

//! AST optimizer: constant propagation, constant folding, and dead-code
//! elimination, performed in place on the arena.

use crate::name::Name;

use super::ast::{BinOp, Node, NodeId};

// ----------------------------------------------------------------------------

/// Capacity of the constant symbol table.
const MAX_CONSTANTS: usize = 128;

/// A constant value tracked for propagation.
#[derive(Clone, Copy, PartialEq, Debug)]
enum Const {
    Int(i32),
    Float(f64),
}

impl Const {
    fn node(self) -> Node {
        match self {
            Self::Int(value)   => Node::Int(value),
            Self::Float(value) => Node::Float(value),
        }
    }
}

/// Fixed-capacity open-addressed symbol table keyed by name: DJB2 hashing
/// with linear probing.  The first writer of a name wins; inserts into a
/// full table are silently skipped.
struct ConstTable {
    slots: [Option<(Name, Const)>; MAX_CONSTANTS],
    count: usize,
}

impl ConstTable {
    fn new() -> Self {
        Self {
            slots: [None; MAX_CONSTANTS],
            count: 0,
        }
    }

    /// DJB2: `h = h * 33 + c`, seeded with 5381.
    fn hash(name: &Name) -> usize {
        let mut hash = 5381u32;
        for &byte in name.bytes() {
            hash = hash.wrapping_mul(33).wrapping_add(u32::from(byte));
        }
        hash as usize % MAX_CONSTANTS
    }

    fn find(&self, name: &Name) -> Option<Const> {
        if name.is_empty() {
            return None;
        }

        let start = Self::hash(name);
        let mut idx = start;

        loop {
            match self.slots[idx] {
                Some((key, value)) if key == *name => return Some(value),
                None                               => return None,
                _                                  => {}
            }
            idx = (idx + 1) % MAX_CONSTANTS;
            if idx == start {
                return None;
            }
        }
    }

    fn insert(&mut self, name: Name, value: Const) {
        if name.is_empty() || self.count >= MAX_CONSTANTS || self.find(&name).is_some() {
            return;
        }

        let start = Self::hash(&name);
        let mut idx = start;

        loop {
            if self.slots[idx].is_none() {
                self.slots[idx] = Some((name, value));
                self.count += 1;
                return;
            }
            idx = (idx + 1) % MAX_CONSTANTS;
            if idx == start {
                return;
            }
        }
    }
}

// ----------------------------------------------------------------------------

/// Optimizes the arena in place, shrinking it to the surviving nodes.
///
/// Five passes: record literal-initialized declarations; propagate and fold
/// every statement sub-tree; re-record declarations whose initializers
/// folded down to literals; substitute those into returns; then eliminate
/// dead nodes and compact the arena.
pub fn optimize(ast: &mut Vec<Node>) {
    let mut consts = ConstTable::new();

    scan_constants(ast, &mut consts);

    for id in 0..ast.len() {
        if ast[id].is_stmt() {
            optimize_node(ast, &consts, id as NodeId);
        }
    }

    scan_constants(ast, &mut consts);

    for id in 0..ast.len() {
        if matches!(ast[id], Node::Return(_)) {
            optimize_node(ast, &consts, id as NodeId);
        }
    }

    sweep(ast, &consts);
}

/// Records every declaration whose initializer is a bare literal.
/// Existing entries are kept.
fn scan_constants(ast: &[Node], consts: &mut ConstTable) {
    for node in ast {
        if let Node::Decl(name, expr) = *node {
            match ast[expr as usize] {
                Node::Int(value)   => consts.insert(name, Const::Int(value)),
                Node::Float(value) => consts.insert(name, Const::Float(value)),
                _                  => {}
            }
        }
    }
}

/// Recursively propagates constants and folds literal operations within a
/// sub-tree, bottom-up.
fn optimize_node(ast: &mut [Node], consts: &ConstTable, id: NodeId) {
    match ast[id as usize] {
        Node::Binary(_, left, right) => {
            optimize_node(ast, consts, left);
            optimize_node(ast, consts, right);
            fold_binary(ast, id);
        }
        Node::Assign(left, right) => {
            optimize_node(ast, consts, left);
            optimize_node(ast, consts, right);
        }
        Node::Decl(_, expr) | Node::Return(expr) => {
            optimize_node(ast, consts, expr);
        }
        Node::Var(name) => {
            if let Some(value) = consts.find(&name) {
                ast[id as usize] = value.node();
            }
        }
        Node::Int(_) | Node::Float(_) => {}
    }
}

/// Rewrites a binary node whose children are both literals into a literal.
/// Integer operands promote to float when the other operand is a float.
/// Division by zero leaves the node untouched.
fn fold_binary(ast: &mut [Node], id: NodeId) {
    let (op, left, right) = match ast[id as usize] {
        Node::Binary(op, left, right) => (op, left, right),
        _                             => return,
    };

    let folded = match (ast[left as usize], ast[right as usize]) {
        (Node::Int(a),   Node::Int(b))   => eval_int(op, a, b).map(Node::Int),
        (Node::Int(a),   Node::Float(b)) => eval_float(op, f64::from(a), b).map(Node::Float),
        (Node::Float(a), Node::Int(b))   => eval_float(op, a, f64::from(b)).map(Node::Float),
        (Node::Float(a), Node::Float(b)) => eval_float(op, a, b).map(Node::Float),
        _                                => None,
    };

    if let Some(node) = folded {
        ast[id as usize] = node;
    }
}

/// Two's-complement modular i32 arithmetic with truncating division.
/// Returns [`None`] on division by zero.
fn eval_int(op: BinOp, a: i32, b: i32) -> Option<i32> {
    match op {
        BinOp::Add           => Some(a.wrapping_add(b)),
        BinOp::Sub           => Some(a.wrapping_sub(b)),
        BinOp::Mul           => Some(a.wrapping_mul(b)),
        BinOp::Div if b != 0 => Some(a.wrapping_div(b)),
        BinOp::Div           => None,
    }
}

/// IEEE-754 f64 arithmetic.  Returns [`None`] on division by zero.
fn eval_float(op: BinOp, a: f64, b: f64) -> Option<f64> {
    match op {
        BinOp::Add             => Some(a + b),
        BinOp::Sub             => Some(a - b),
        BinOp::Mul             => Some(a * b),
        BinOp::Div if b != 0.0 => Some(a / b),
        BinOp::Div             => None,
    }
}

// ----------------------------------------------------------------------------

/// Mark-sweep-compact dead-code elimination.
///
/// Roots are RETURN and ASSIGN statements, plus declarations whose names
/// never became constants: their initializers still run at startup.  A
/// declaration whose name was fully propagated is dead.  Live nodes are
/// streamed forward and every surviving child index is rewritten through
/// the relocation table.
fn sweep(ast: &mut Vec<Node>, consts: &ConstTable) {
    let len = ast.len();
    let mut alive = vec![false; len];

    for id in 0..len {
        let root = match ast[id] {
            Node::Return(_) | Node::Assign(..) => true,
            Node::Decl(name, _)                => consts.find(&name).is_none(),
            _                                  => false,
        };
        if root {
            mark(ast, &mut alive, id as NodeId);
        }
    }

    // Compact live nodes forward, recording old index -> new index
    let mut reloc: Vec<NodeId> = vec![0; len];
    let mut next = 0;

    for id in 0..len {
        if alive[id] {
            let node = ast[id];
            ast[next] = node;
            reloc[id] = next as NodeId;
            next += 1;
        }
    }
    ast.truncate(next);

    // Relink the surviving child indices
    for node in ast.iter_mut() {
        match node {
            Node::Binary(_, left, right) | Node::Assign(left, right) => {
                *left = reloc[*left as usize];
                *right = reloc[*right as usize];
            }
            Node::Decl(_, expr) | Node::Return(expr) => {
                *expr = reloc[*expr as usize];
            }
            Node::Int(_) | Node::Float(_) | Node::Var(_) => {}
        }
    }
}

/// Marks a node and everything reachable from it as alive.
fn mark(ast: &[Node], alive: &mut [bool], id: NodeId) {
    if alive[id as usize] {
        return;
    }
    alive[id as usize] = true;

    match ast[id as usize] {
        Node::Binary(_, left, right) | Node::Assign(left, right) => {
            mark(ast, alive, left);
            mark(ast, alive, right);
        }
        Node::Decl(_, expr) | Node::Return(expr) => {
            mark(ast, alive, expr);
        }
        Node::Int(_) | Node::Float(_) | Node::Var(_) => {}
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::lang::lexer::tokenize;
    use crate::lang::parser::parse;
    use super::*;

    fn build(src: &[u8]) -> Vec<Node> {
        let mut tokens = Vec::new();
        assert!( tokenize(src, &mut tokens, src.len() + 1) );

        let mut ast = Vec::new();
        parse(&tokens, &mut ast, 65_536);
        ast
    }

    fn name(text: &str) -> Name {
        Name::new(text.as_bytes())
    }

    // === Constant table ===

    #[test]
    fn const_table_insert_find() {
        let mut table = ConstTable::new();

        table.insert(name("a"), Const::Int(1));
        table.insert(name("b"), Const::Float(2.5));

        assert_eq!( table.find(&name("a")), Some(Const::Int(1))     );
        assert_eq!( table.find(&name("b")), Some(Const::Float(2.5)) );
        assert_eq!( table.find(&name("c")), None                    );
    }

    #[test]
    fn const_table_first_writer_wins() {
        let mut table = ConstTable::new();

        table.insert(name("a"), Const::Int(1));
        table.insert(name("a"), Const::Int(2));

        assert_eq!( table.find(&name("a")), Some(Const::Int(1)) );
        assert_eq!( table.count, 1 );
    }

    #[test]
    fn const_table_empty_name_rejected() {
        let mut table = ConstTable::new();

        table.insert(Name::EMPTY, Const::Int(1));

        assert_eq!( table.find(&Name::EMPTY), None );
        assert_eq!( table.count, 0 );
    }

    #[test]
    fn const_table_probes_on_collision() {
        let first = name("v0");

        // By pigeonhole, some other name below hashes to the same slot
        let second = (1..1000)
            .map(|i| Name::new(format!("v{}", i).as_bytes()))
            .find(|n| ConstTable::hash(n) == ConstTable::hash(&first))
            .unwrap();

        let mut table = ConstTable::new();
        table.insert(first, Const::Int(1));
        table.insert(second, Const::Int(2));

        assert_eq!( table.find(&first),  Some(Const::Int(1)) );
        assert_eq!( table.find(&second), Some(Const::Int(2)) );
    }

    #[test]
    fn const_table_overflow_skipped() {
        let mut table = ConstTable::new();

        for i in 0..MAX_CONSTANTS {
            table.insert(Name::new(format!("c{}", i).as_bytes()), Const::Int(i as i32));
        }
        assert_eq!( table.count, MAX_CONSTANTS );

        table.insert(name("overflow"), Const::Int(1));

        assert_eq!( table.find(&name("overflow")), None );
        assert_eq!( table.count, MAX_CONSTANTS );
    }

    // === Folding ===

    #[test]
    fn eval_int_wraps() {
        assert_eq!( eval_int(BinOp::Add, i32::MAX, 1),  Some(i32::MIN) );
        assert_eq!( eval_int(BinOp::Mul, 1 << 30, 4),   Some(0)        );
        assert_eq!( eval_int(BinOp::Div, 7, 2),         Some(3)        );
        assert_eq!( eval_int(BinOp::Div, -7, 2),        Some(-3)       );
        assert_eq!( eval_int(BinOp::Div, 7, 0),         None           );
        assert_eq!( eval_int(BinOp::Div, i32::MIN, -1), Some(i32::MIN) );
    }

    #[test]
    fn fold_promotes_int_to_float() {
        let mut ast = vec![
            Node::Int(3),
            Node::Float(0.5),
            Node::Binary(BinOp::Mul, 0, 1),
        ];

        fold_binary(&mut ast, 2);

        assert_eq!( ast[2], Node::Float(1.5) );
    }

    // === Whole-arena scenarios ===

    #[test]
    fn optimize_program() {
        let source: &[u8] = b"\
u32 a   = 42
u32 b   = 27
u32 res = a + b * 10.0f * (2 + 4)
ret res
";
        let mut ast = build(source);
        optimize(&mut ast);

        assert_eq!( ast.len(), 2 );
        assert_eq!( ast[0], Node::Return(1) );
        match ast[1] {
            Node::Float(value) => assert!( (value - 1662.0).abs() < 1e-6 ),
            node               => panic!("expected float, got {:?}", node),
        }
    }

    #[test]
    fn optimize_hex_decl() {
        let mut ast = build(b"u32 x = 0x1F_00\nret x");
        optimize(&mut ast);

        assert_eq!( ast, [Node::Return(1), Node::Int(7936)] );
    }

    #[test]
    fn optimize_bare_return() {
        let mut ast = build(b"ret 1 + 2 * 3");
        optimize(&mut ast);

        assert_eq!( ast, [Node::Return(1), Node::Int(7)] );
    }

    #[test]
    fn optimize_chained_decls() {
        let mut ast = build(b"u32 a = 1\nu32 b = a + 1\nret b");
        optimize(&mut ast);

        assert_eq!( ast, [Node::Return(1), Node::Int(2)] );
    }

    #[test]
    fn optimize_division_by_zero_preserved() {
        let mut ast = build(b"u32 z = 10 / 0\nret z");
        optimize(&mut ast);

        // The fold is skipped; the declaration and its expression survive
        assert_eq!( ast, [
            Node::Decl(name("z"), 3),
            Node::Int(10),
            Node::Int(0),
            Node::Binary(BinOp::Div, 1, 2),
            Node::Return(5),
            Node::Var(name("z")),
        ]);
    }

    #[test]
    fn optimize_float_division_by_zero_preserved() {
        let mut ast = build(b"ret 1.0 / 0.0");
        optimize(&mut ast);

        assert_eq!( ast.len(), 4 );
        assert_eq!( ast[3], Node::Binary(BinOp::Div, 1, 2) );
    }

    #[test]
    fn optimize_assign_is_root() {
        let mut ast = build(b"u32 a = 1\na = 2");
        optimize(&mut ast);

        // The declaration dies; the assignment survives with its LHS
        // propagated to a literal
        assert_eq!( ast, [Node::Int(1), Node::Int(2), Node::Assign(0, 1)] );
    }

    #[test]
    fn optimize_is_idempotent() {
        for source in [
            &b"u32 a = 1\nu32 b = a + 1\nret b"[..],
            &b"u32 z = 10 / 0\nret z"[..],
            &b"u32 a = 1\na = 2"[..],
        ] {
            let mut once = build(source);
            optimize(&mut once);

            let mut twice = once.clone();
            optimize(&mut twice);

            assert_eq!( once, twice );
        }
    }

    #[test]
    fn optimize_indices_stay_valid() {
        let mut ast = build(b"u32 a = 1\nu32 z = 10 / 0\nz = z + a\nret z");
        optimize(&mut ast);

        for node in &ast {
            match *node {
                Node::Binary(_, left, right) | Node::Assign(left, right) => {
                    assert!( (left as usize) < ast.len() );
                    assert!( (right as usize) < ast.len() );
                }
                Node::Decl(_, expr) | Node::Return(expr) => {
                    assert!( (expr as usize) < ast.len() );
                }
                _ => {}
            }
        }
    }
}
