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

//! Windows x64 NASM code generator.
//!
//! Storage model: global static data, no stack frames for locals.  A
//! declaration whose initializer is an integer literal is placed in
//! `.data`, statically initialized; every other declaration lands in
//! `.bss` and is initialized at runtime by its lowered statement.
//!
//! Lowering is a stack machine: every expression pushes exactly one 64-bit
//! value, and binary operations pop two and push one.  The left operand is
//! lowered first, so `pop rbx` yields the right operand and `pop rax` the
//! left.

mod emit;

use crate::lang::ast::{BinOp, Node, NodeId};
use crate::name::Name;

use self::emit::Emitter;

// ----------------------------------------------------------------------------

/// Capacity of the global symbol table.
const MAX_GLOBALS: usize = 128;

/// Sections a global symbol can land in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Section {
    /// Runtime-initialized storage (`resq`).
    Bss,

    /// Statically initialized storage (`dq`).
    Data,
}

/// A global symbol.  `value` is meaningful only for [`Section::Data`].
struct Symbol {
    name:    Name,
    section: Section,
    value:   i32,
}

// ----------------------------------------------------------------------------

/// Generates NASM text for the arena into `out`, truncating silently at
/// `cap` bytes.  Returns the produced length.
pub fn codegen(ast: &[Node], out: &mut Vec<u8>, cap: usize) -> usize {
    {
        let mut gen = Codegen {
            ast,
            out: Emitter::new(out, cap),
            globals: Vec::with_capacity(MAX_GLOBALS),
        };

        gen.out.str("bits 64\ndefault rel\n\n");
        gen.scan_globals();
        gen.emit_data();
        gen.emit_bss();
        gen.emit_text();
    }

    out.len()
}

struct Codegen<'a> {
    ast:     &'a [Node],
    out:     Emitter<'a>,
    globals: Vec<Symbol>,
}

impl Codegen<'_> {
    fn find(&self, name: &Name) -> Option<&Symbol> {
        self.globals.iter().find(|sym| sym.name == *name)
    }

    /// Registers a global.  Duplicate names are ignored after the first
    /// registration; a full table drops further symbols.
    fn register(&mut self, name: Name, section: Section, value: i32) {
        if self.find(&name).is_some() || self.globals.len() >= MAX_GLOBALS {
            return;
        }
        self.globals.push(Symbol { name, section, value });
    }

    /// Classifies every declared symbol into `.data` or `.bss`.
    fn scan_globals(&mut self) {
        for node in self.ast {
            if let Node::Decl(name, expr) = *node {
                match self.ast[expr as usize] {
                    Node::Int(value) => self.register(name, Section::Data, value),
                    _                => self.register(name, Section::Bss, 0),
                }
            }
        }
    }

    fn emit_data(&mut self) {
        self.out.str("segment .data\n");
        for sym in &self.globals {
            if sym.section == Section::Data {
                self.out.str("    ");
                self.out.name(&sym.name);
                self.out.str(": dq ");
                self.out.int(sym.value);
                self.out.str("\n");
            }
        }
        self.out.str("\n");
    }

    fn emit_bss(&mut self) {
        self.out.str("segment .bss\n");
        for sym in &self.globals {
            if sym.section == Section::Bss {
                self.out.str("    ");
                self.out.name(&sym.name);
                self.out.str(": resq 1\n");
            }
        }
        self.out.str("\n");
    }

    fn emit_text(&mut self) {
        self.out.str("segment .text\nglobal main\nextern ExitProcess\n\nmain:\n");
        self.out.str("    sub rsp, 40 ; Shadow space (32) + Align (8)\n\n");

        let mut last_is_return = false;
        for id in 0..self.ast.len() {
            if self.ast[id].is_stmt() {
                self.emit_node(id as NodeId);
                last_is_return = matches!(self.ast[id], Node::Return(_));
            }
        }

        if !last_is_return {
            self.out.str("    xor rcx, rcx\n    call ExitProcess\n");
        }
    }

    fn emit_node(&mut self, id: NodeId) {
        match self.ast[id as usize] {
            Node::Int(value) => {
                self.out.str("    mov  rax, ");
                self.out.int(value);
                self.out.str("\n    push rax\n");
            }

            Node::Float(value) => {
                self.out.str("    mov  rax, 0x");
                self.out.hex64(value.to_bits());
                self.out.str(" ; float hex\n    push rax\n");
            }

            Node::Var(name) => {
                self.out.str("    mov  rax, [rel ");
                self.out.name(&name);
                self.out.str("]\n    push rax\n");
            }

            Node::Binary(op, left, right) => {
                self.emit_node(left);
                self.emit_node(right);
                self.out.str(match op {
                    BinOp::Add => "    pop  rbx\n    pop  rax\n    add  rax, rbx\n    push rax\n",
                    BinOp::Sub => "    pop  rbx\n    pop  rax\n    sub  rax, rbx\n    push rax\n",
                    BinOp::Mul => "    pop  rbx\n    pop  rax\n    imul rax, rbx\n    push rax\n",
                    BinOp::Div => "    pop  rbx\n    pop  rax\n    cqo\n    idiv rbx\n    push rax\n",
                });
            }

            Node::Decl(name, expr) => {
                // A symbol already initialized in .data needs no code
                if let Some(sym) = self.find(&name) {
                    if sym.section == Section::Data {
                        return;
                    }
                }
                self.emit_node(expr);
                self.store(&name);
            }

            Node::Assign(left, right) => {
                // Only stores through a variable destination are defined
                if let Node::Var(name) = self.ast[left as usize] {
                    self.emit_node(right);
                    self.store(&name);
                }
            }

            Node::Return(expr) => {
                self.emit_node(expr);
                self.out.str("    pop  rcx\n    call ExitProcess\n");
            }
        }
    }

    fn store(&mut self, name: &Name) {
        self.out.str("    pop  rax\n    mov  [rel ");
        self.out.name(name);
        self.out.str("], rax\n");
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::lang::lexer::tokenize;
    use crate::lang::opt::optimize;
    use crate::lang::parser::parse;
    use super::*;

    fn build(src: &[u8]) -> Vec<Node> {
        let mut tokens = Vec::new();
        assert!( tokenize(src, &mut tokens, src.len() + 1) );

        let mut ast = Vec::new();
        parse(&tokens, &mut ast, 65_536);
        ast
    }

    fn emit(ast: &[Node]) -> String {
        let mut out = Vec::new();
        let len = codegen(ast, &mut out, 65_536);
        assert_eq!( len, out.len() );
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn codegen_static_data() {
        let text = emit(&build(b"u32 a = 42\nret a"));

        assert_eq!( text, "\
bits 64
default rel

segment .data
    a: dq 42

segment .bss

segment .text
global main
extern ExitProcess

main:
    sub rsp, 40 ; Shadow space (32) + Align (8)

    mov  rax, [rel a]
    push rax
    pop  rcx
    call ExitProcess
");
    }

    #[test]
    fn codegen_runtime_init() {
        let text = emit(&build(b"u32 a = 1 + 2"));

        assert_eq!( text, "\
bits 64
default rel

segment .data

segment .bss
    a: resq 1

segment .text
global main
extern ExitProcess

main:
    sub rsp, 40 ; Shadow space (32) + Align (8)

    mov  rax, 1
    push rax
    mov  rax, 2
    push rax
    pop  rbx
    pop  rax
    add  rax, rbx
    push rax
    pop  rax
    mov  [rel a], rax
    xor rcx, rcx
    call ExitProcess
");
    }

    #[test]
    fn codegen_operators() {
        let text = emit(&build(b"ret 8 - 2 * 3 / (1 - 2)"));

        assert!( text.contains("    sub  rax, rbx\n") );
        assert!( text.contains("    imul rax, rbx\n") );
        assert!( text.contains("    cqo\n    idiv rbx\n") );
    }

    #[test]
    fn codegen_negative_int() {
        let text = emit(&[Node::Return(1), Node::Int(-5)]);

        assert!( text.contains("    mov  rax, -5\n    push rax\n") );
    }

    #[test]
    fn codegen_float_hex() {
        let text = emit(&[Node::Return(1), Node::Float(1662.0)]);

        assert!( text.contains("    mov  rax, 0x4099F80000000000 ; float hex\n    push rax\n") );
        assert!( text.ends_with("    pop  rcx\n    call ExitProcess\n") );
    }

    #[test]
    fn codegen_duplicate_decl_keeps_first() {
        let text = emit(&build(b"u32 a = 1\nu32 a = 2"));

        assert!(  text.contains("    a: dq 1\n") );
        assert!( !text.contains("    a: dq 2\n") );
    }

    #[test]
    fn codegen_assign_to_non_var_skipped() {
        let ast = [Node::Int(1), Node::Int(2), Node::Assign(0, 1)];
        let text = emit(&ast);

        assert!( !text.contains("mov  [rel") );
        assert!(  text.contains("    xor rcx, rcx\n    call ExitProcess\n") );
    }

    #[test]
    fn codegen_terminator_reinstated_after_return() {
        // A later non-return statement reinstates the terminator
        let text = emit(&build(b"ret 1\nu32 b = 2 + 3"));

        assert!( text.ends_with("    xor rcx, rcx\n    call ExitProcess\n") );
    }

    #[test]
    fn codegen_truncates_at_capacity() {
        let ast = build(b"ret 1 + 2");
        let mut out = Vec::new();

        let len = codegen(&ast, &mut out, 10);

        assert_eq!( len, 10 );
        assert_eq!( out, b"bits 64\nde" );
    }

    #[test]
    fn codegen_optimized_program() {
        let source: &[u8] = b"\
u32 a   = 42
u32 b   = 27
u32 res = a + b * 10.0f * (2 + 4)
ret res
";
        let mut ast = build(source);
        optimize(&mut ast);
        let text = emit(&ast);

        assert_eq!( text, "\
bits 64
default rel

segment .data

segment .bss

segment .text
global main
extern ExitProcess

main:
    sub rsp, 40 ; Shadow space (32) + Align (8)

    mov  rax, 0x4099F80000000000 ; float hex
    push rax
    pop  rcx
    call ExitProcess
");
    }

    #[test]
    fn codegen_unoptimized_program() {
        let source: &[u8] = b"\
u32 a   = 42
u32 b   = 27
u32 res = a + b * 10.0f * (2 + 4)
ret res
";
        let text = emit(&build(source));

        assert!( text.contains("    a: dq 42\n") );
        assert!( text.contains("    b: dq 27\n") );
        assert!( text.contains("    res: resq 1\n") );
        assert!( text.contains("    pop  rax\n    mov  [rel res], rax\n") );
        assert!( text.contains("    mov  rax, [rel res]\n    push rax\n") );
        assert!( text.ends_with("    pop  rcx\n    call ExitProcess\n") );
    }
}
