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

//! Bounded assembly text emitter.

use std::fmt::{self, Write};

use crate::name::Name;

/// Append-only text emitter over a caller-provided byte buffer.  Bytes
/// beyond `cap` are dropped silently; emission never fails.
pub struct Emitter<'a> {
    buf: &'a mut Vec<u8>,
    cap: usize,
}

impl<'a> Emitter<'a> {
    /// Creates an emitter over `buf`, clearing it first.
    pub fn new(buf: &'a mut Vec<u8>, cap: usize) -> Self {
        buf.clear();
        Self { buf, cap }
    }

    /// Emits a string.
    pub fn str(&mut self, text: &str) {
        let room = self.cap - self.buf.len();
        let bytes = text.as_bytes();
        self.buf.extend_from_slice(&bytes[..bytes.len().min(room)]);
    }

    /// Emits a symbol name.
    pub fn name(&mut self, name: &Name) {
        self.str(name.as_str());
    }

    /// Emits a decimal integer: no leading zeros, `-` prefix when negative.
    pub fn int(&mut self, value: i32) {
        let _ = write!(self, "{}", value);
    }

    /// Emits a raw f64 bit pattern as 16 upper-case hex digits.
    pub fn hex64(&mut self, bits: u64) {
        let _ = write!(self, "{:016X}", bits);
    }
}

impl Write for Emitter<'_> {
    fn write_str(&mut self, text: &str) -> fmt::Result {
        self.str(text);
        Ok(())
    }
}

// ----------------------------------------------------------------------------
