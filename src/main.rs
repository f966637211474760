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

mod compiler;
mod gen;
mod lang;
mod message;
mod metrics;
mod name;
mod num;

use std::fs;
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use compiler::Options;
use message::Severity;

/// Compiler for the Thrive language: emits Windows x64 NASM assembly.
#[derive(Debug, Parser)]
#[command(name = "thrive")]
struct Cli {
    /// Thrive source file to compile
    file: PathBuf,

    /// Run constant propagation, folding, and dead-code elimination
    #[arg(long)]
    optimized: bool,

    /// Recompile whenever the source file changes
    #[arg(long)]
    hot_reload: bool,

    /// Output path for the generated assembly
    #[arg(short, long, default_value = "thrive_optimized.asm")]
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        message::report(Severity::Fatal, &format!("{:#}", err));
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = Options { optimized: cli.optimized };

    compiler::compile_file(&cli.file, &cli.output, options)?;

    if cli.hot_reload {
        watch(cli, options)?;
    }

    Ok(())
}

/// How often the watched source file is polled for changes.
const POLL_PERIOD: Duration = Duration::from_millis(100);

/// Polls the source file and recompiles on every modification.  A compile
/// failure is reported and the watch continues.
fn watch(cli: &Cli, options: Options) -> Result<()> {
    let mut stamp = fs::metadata(&cli.file)?.modified()?;

    loop {
        thread::sleep(POLL_PERIOD);

        let current = match fs::metadata(&cli.file).and_then(|meta| meta.modified()) {
            Ok(time) => time,
            // The file may be mid-replace by an editor
            Err(_) => continue,
        };
        if current == stamp {
            continue;
        }
        stamp = current;

        message::say("recompile");
        if let Err(err) = compiler::compile_file(&cli.file, &cli.output, options) {
            message::report(Severity::Error, &format!("{:#}", err));
        }
    }
}

// ----------------------------------------------------------------------------
