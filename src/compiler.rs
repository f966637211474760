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

//! Top-level compiler interface.
//!
//! Owns the pipeline buffers for one compilation, runs the stages in
//! order, and reports per-stage timings.  With optimization enabled, the
//! optimizer runs after the first assembly emission and the assembly is
//! regenerated from the rewritten arena, so both emissions are measured.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::gen;
use crate::lang::{lexer, opt, parser};
use crate::message::{self, Severity};
use crate::metrics::{Stage, Timings};

// ----------------------------------------------------------------------------

/// Hard upper bound on the AST arena, keeping node indices in 16 bits.
const MAX_AST_NODES: usize = 65_536;

/// Extra output capacity beyond the per-byte estimate, so the section
/// skeleton fits even for tiny sources.
const TEXT_SLACK: usize = 1024;

/// Compilation options.
#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    /// Run constant propagation, folding, and dead-code elimination.
    pub optimized: bool,
}

/// Compiles the file at `path` into NASM text at `out_path` and reports
/// per-stage timings on the console.
pub fn compile_file(path: &Path, out_path: &Path, options: Options) -> Result<()> {
    let mut timings = Timings::new();

    let source = timings
        .time(Stage::FileRead, || fs::read(path))
        .with_context(|| format!("cannot read {}", path.display()))?;

    let text = compile(&source, options, &mut timings)?;

    timings
        .time(Stage::FileWrite, || fs::write(out_path, &text))
        .with_context(|| format!("cannot write {}", out_path.display()))?;

    timings.report();
    Ok(())
}

/// Runs the pipeline stages over `source` and returns the assembly text.
fn compile(source: &[u8], options: Options, timings: &mut Timings) -> Result<Vec<u8>> {
    if source.is_empty() {
        bail!("source file is empty");
    }

    let tokens_cap = source.len() + 1;
    let ast_cap = source.len().min(MAX_AST_NODES);
    let text_cap = source.len() * 16 + TEXT_SLACK;

    let mut tokens = Vec::with_capacity(tokens_cap);
    let mut ast = Vec::with_capacity(ast_cap);
    let mut text = Vec::with_capacity(text_cap);

    let ok = timings.time(Stage::Tokenize, || {
        lexer::tokenize(source, &mut tokens, tokens_cap)
    });
    if !ok {
        bail!("token buffer exhausted ({} tokens)", tokens_cap);
    }

    timings.time(Stage::Parse, || parser::parse(&tokens, &mut ast, ast_cap));

    timings.time(Stage::Codegen, || gen::codegen(&ast, &mut text, text_cap));

    if options.optimized {
        timings.time(Stage::Optimize, || opt::optimize(&mut ast));
        timings.time(Stage::CodegenOptimized, || {
            gen::codegen(&ast, &mut text, text_cap)
        });
    }

    if text.len() == text_cap {
        message::report(Severity::Warning, "assembly output truncated");
    }

    Ok(text)
}

// ----------------------------------------------------------------------------
