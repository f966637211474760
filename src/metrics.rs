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

//! Per-stage compile timing.

use std::time::{Duration, Instant};

use colored::Colorize;

use crate::message;

// ----------------------------------------------------------------------------

/// Pipeline stages measured by the driver.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stage {
    /// Reading the source file.
    FileRead,

    /// Tokenization.
    Tokenize,

    /// Parsing tokens into the AST arena.
    Parse,

    /// Assembly generation.
    Codegen,

    /// AST optimization.
    Optimize,

    /// Assembly generation after optimization.
    CodegenOptimized,

    /// Writing the assembly file.
    FileWrite,
}

impl Stage {
    /// Fixed-width report label.
    fn label(self) -> &'static str {
        match self {
            Self::FileRead         => "time_io_file_read ",
            Self::Tokenize         => "time_tokenization ",
            Self::Parse            => "time_ast          ",
            Self::Codegen          => "time_asm          ",
            Self::Optimize         => "time_ast_optimized",
            Self::CodegenOptimized => "time_asm_optimized",
            Self::FileWrite        => "time_io_file_write",
        }
    }
}

// ----------------------------------------------------------------------------

/// Measurement above which a report line turns yellow, in milliseconds.
const MS_MID: f64 = 0.02;

/// Measurement above which a report line turns red, in milliseconds.
const MS_HIGH: f64 = 0.75;

/// Timing samples for one compilation.
pub struct Timings {
    samples: Vec<(Stage, Duration)>,
}

impl Timings {
    pub fn new() -> Self {
        Self { samples: Vec::new() }
    }

    /// Runs `f`, recording the elapsed time under `stage`.
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.samples.push((stage, start.elapsed()));
        result
    }

    /// Prints one colored line per recorded stage, plus the total.
    pub fn report(&self) {
        let total: f64 = self.samples.iter().map(|&(_, d)| millis(d)).sum();

        for &(stage, duration) in &self.samples {
            report_line(stage.label(), millis(duration), total);
        }
        report_line("time_total        ", total, total);
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self::new()
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1e3
}

fn report_line(label: &str, ms: f64, total: f64) {
    let percent = if total > 0.0 { ms / total * 100.0 } else { 0.0 };

    let value = format!("{:.6}ms {:6.2}%", ms, percent);
    let value = if ms >= MS_HIGH {
        value.as_str().red()
    } else if ms >= MS_MID {
        value.as_str().yellow()
    } else {
        value.as_str().green()
    };

    println!("{} {}: {}", message::PREFIX.blue(), label, value);
}

// ----------------------------------------------------------------------------
