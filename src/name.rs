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

//! Symbol names.

use std::fmt::{self, Debug, Display, Formatter};

/// Maximum significant length of a name, in bytes.
pub const NAME_MAX: usize = 31;

/// A symbol name, stored inline: at most [`NAME_MAX`] significant bytes,
/// NUL-terminated within a 32-byte field.  Longer input is truncated.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Name([u8; NAME_MAX + 1]);

impl Name {
    /// The empty name.
    pub const EMPTY: Self = Self([0; NAME_MAX + 1]);

    /// Creates a name from the given bytes, truncated to [`NAME_MAX`].
    pub fn new(bytes: &[u8]) -> Self {
        let mut buf = [0; NAME_MAX + 1];
        let len = bytes.len().min(NAME_MAX);
        buf[..len].copy_from_slice(&bytes[..len]);
        Self(buf)
    }

    /// Returns the count of significant bytes.
    pub fn len(&self) -> usize {
        self.0.iter().position(|&b| b == 0).unwrap_or(NAME_MAX)
    }

    /// Returns whether the name is empty.
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    /// Returns the significant bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.0[..self.len()]
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(self.bytes()).unwrap_or("")
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Debug for Name {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Name({:?})", self.as_str())
    }
}

// ----------------------------------------------------------------------------
