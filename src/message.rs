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

//! Compiler console messages.

use std::fmt::{self, Display, Formatter};

use colored::Colorize;

/// Prefix for every console line.
pub const PREFIX: &str = "[thrive]";

/// Message severity levels.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Severity {
    /// For informational messages.
    Normal,

    /// For potential problems that do not prevent compilation.
    Warning,

    /// For problems that make the current compilation fail.
    Error,

    /// For severe, unrecoverable problems.
    /// The compiler terminates immediately.
    Fatal,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match *self {
            Severity::Normal  => "",
            Severity::Warning => "warning: ",
            Severity::Error   => "error: ",
            Severity::Fatal   => "fatal: ",
        })
    }
}

/// Prints a message at the given severity.  Informational messages go to
/// standard output, everything else to standard error.
pub fn report(severity: Severity, message: &str) {
    let label = severity.to_string();
    let label = match severity {
        Severity::Normal                  => label.as_str().normal(),
        Severity::Warning                 => label.as_str().yellow(),
        Severity::Error | Severity::Fatal => label.as_str().red(),
    };

    if severity == Severity::Normal {
        println!("{} {}{}", PREFIX.blue(), label, message);
    } else {
        eprintln!("{} {}{}", PREFIX.blue(), label, message);
    }
}

/// Prints an informational message.
pub fn say(message: &str) {
    report(Severity::Normal, message);
}

// ----------------------------------------------------------------------------
