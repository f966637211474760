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

//! Lexical analyzer.

use crate::num::{self, Base};

use super::token::{Token, TokenKind};

// ----------------------------------------------------------------------------

/// Logical characters recognized by the lexer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Char {
    /// Space, tab, CR, other control bytes.  Skipped.
    Space,

    /// `\n`.  Skipped; increments the line counter.
    Lf,

    /// `A`-`Z`, `a`-`z`, `_`.  Starts or continues an identifier.
    Letter,

    /// `0`-`9`.  Starts a number; continues an identifier.
    Digit,

    /// `.` - starts a float literal.
    Dot,

    /// `"` - starts a string literal.
    Quote,

    /// `(`.
    LParen,

    /// `)`.
    RParen,

    /// `+`.
    Plus,

    /// `-`.
    Minus,

    /// `*`.
    Star,

    /// `/`.
    Slash,

    /// `=`.
    Equal,

    /// Everything else.  Skipped without emitting a token.
    Other,
}

/// Mapping of 7-bit ASCII bytes to `Char` logical characters.
static CHARS: [Char; 128] = {
    use Char::*;
    const __: Char = Other;
[
//  x0      x1      x2      x3      x4      x5      x6      x7      CHARS
    Space,  Space,  Space,  Space,  Space,  Space,  Space,  Space,  // ........
    Space,  Space,  Lf,     Space,  Space,  Space,  Space,  Space,  // .tn..r..
    Space,  Space,  Space,  Space,  Space,  Space,  Space,  Space,  // ........
    Space,  Space,  Space,  Space,  Space,  Space,  Space,  Space,  // ........
    Space,  __,     Quote,  __,     __,     __,     __,     __,     //  !"#$%&'
    LParen, RParen, Star,   Plus,   __,     Minus,  Dot,    Slash,  // ()*+,-./
    Digit,  Digit,  Digit,  Digit,  Digit,  Digit,  Digit,  Digit,  // 01234567
    Digit,  Digit,  __,     __,     __,     Equal,  __,     __,     // 89:;<=>?
    __,     Letter, Letter, Letter, Letter, Letter, Letter, Letter, // @ABCDEFG
    Letter, Letter, Letter, Letter, Letter, Letter, Letter, Letter, // HIJKLMNO
    Letter, Letter, Letter, Letter, Letter, Letter, Letter, Letter, // PQRSTUVW
    Letter, Letter, Letter, __,     __,     __,     __,     Letter, // XYZ[\]^_
    __,     Letter, Letter, Letter, Letter, Letter, Letter, Letter, // `abcdefg
    Letter, Letter, Letter, Letter, Letter, Letter, Letter, Letter, // hijklmno
    Letter, Letter, Letter, Letter, Letter, Letter, Letter, Letter, // pqrstuvw
    Letter, Letter, Letter, __,     __,     __,     __,     __,     // xyz{|}~. <- DEL
]};

/// Returns the logical character for a source byte.
#[inline]
fn classify(byte: u8) -> Char {
    if byte < 0x80 { CHARS[byte as usize] } else { Char::Other }
}

// ----------------------------------------------------------------------------

/// Tokenizes `src` into `tokens`, ending with an [`TokenKind::Eof`] token.
///
/// At most `cap` tokens are produced.  Returns `false` for empty input,
/// zero capacity, or when capacity is exhausted before the end-of-file
/// token is stored; `tokens` then holds the tokens produced so far.
pub fn tokenize<'a>(src: &'a [u8], tokens: &mut Vec<Token<'a>>, cap: usize) -> bool {
    tokens.clear();
    if src.is_empty() || cap == 0 {
        return false;
    }

    let mut lexer = Lexer::new(src);

    loop {
        let token = lexer.next();
        if tokens.len() == cap {
            return false;
        }
        let eof = matches!(token.kind, TokenKind::Eof);
        tokens.push(token);
        if eof {
            return true;
        }
    }
}

/// A lexical analyzer.  Reads source bytes and yields tokens.
struct Lexer<'a> {
    src:  &'a [u8],
    pos:  usize,
    line: u32,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a [u8]) -> Self {
        Self { src, pos: 0, line: 1 }
    }

    /// Advances to the next token and returns it.
    fn next(&mut self) -> Token<'a> {
        loop {
            let byte = match self.src.get(self.pos) {
                Some(&byte) => byte,
                None        => return self.token(TokenKind::Eof, self.pos),
            };

            match classify(byte) {
                Char::Space  => self.pos += 1,
                Char::Lf     => { self.line += 1; self.pos += 1; }
                Char::Letter => return self.scan_ident(),
                Char::Digit  |
                Char::Dot    => return self.scan_number(),
                Char::Quote  => return self.scan_str(),
                Char::LParen => return self.punct(TokenKind::LParen),
                Char::RParen => return self.punct(TokenKind::RParen),
                Char::Plus   => return self.punct(TokenKind::Add),
                Char::Minus  => return self.punct(TokenKind::Sub),
                Char::Star   => return self.punct(TokenKind::Mul),
                Char::Slash  => return self.punct(TokenKind::Div),
                Char::Equal  => return self.punct(TokenKind::Assign),
                Char::Other  => self.pos += 1,
            }
        }
    }

    fn token(&self, kind: TokenKind<'a>, pos: usize) -> Token<'a> {
        Token { kind, pos: pos as u32, line: self.line }
    }

    fn punct(&mut self, kind: TokenKind<'a>) -> Token<'a> {
        let token = self.token(kind, self.pos);
        self.pos += 1;
        token
    }

    /// Scans an identifier or keyword.
    fn scan_ident(&mut self) -> Token<'a> {
        let start = self.pos;

        while let Some(&byte) = self.src.get(self.pos) {
            match classify(byte) {
                Char::Letter | Char::Digit => self.pos += 1,
                _                          => break,
            }
        }

        let text = &self.src[start..self.pos];
        let kind = match text {
            b"u32" => TokenKind::U32,
            b"ret" => TokenKind::Ret,
            b"ext" => TokenKind::Ext,
            _      => TokenKind::Ident(std::str::from_utf8(text).unwrap_or_default()),
        };

        self.token(kind, start)
    }

    /// Scans an integer or float literal.
    fn scan_number(&mut self) -> Token<'a> {
        let start = self.pos;

        // Hex / binary prefix
        if self.src[self.pos] == b'0' {
            match self.src.get(self.pos + 1) {
                Some(&(b'x' | b'X')) => { self.pos += 2; return self.scan_radix(start, Base::Hex); }
                Some(&(b'b' | b'B')) => { self.pos += 2; return self.scan_radix(start, Base::Bin); }
                _ => {}
            }
        }

        // Decimal / float
        let mut is_float = false;
        let mut seen_dot = false;
        let mut seen_exp = false;

        while let Some(&byte) = self.src.get(self.pos) {
            match byte {
                b'0'..=b'9' | b'_' => self.pos += 1,
                b'.' if !seen_dot && !seen_exp => {
                    seen_dot = true;
                    is_float = true;
                    self.pos += 1;
                }
                b'e' | b'E' if !seen_exp => {
                    seen_exp = true;
                    is_float = true;
                    self.pos += 1;
                    if let Some(&(b'+' | b'-')) = self.src.get(self.pos) {
                        self.pos += 1;
                    }
                }
                b'f' | b'F' => {
                    // Float suffix
                    is_float = true;
                    self.pos += 1;
                    break;
                }
                _ => break,
            }
        }

        let text = &self.src[start..self.pos];
        let kind = if is_float {
            TokenKind::Float(num::parse_f64(text))
        } else {
            TokenKind::Int(num::parse_i32(text, Some(Base::Dec)))
        };

        self.token(kind, start)
    }

    /// Scans the digits of a prefixed integer literal.  `start` is the
    /// position of the `0` that began the prefix.
    fn scan_radix(&mut self, start: usize, base: Base) -> Token<'a> {
        let radix = base.radix();

        while let Some(&byte) = self.src.get(self.pos) {
            if byte == b'_' {
                self.pos += 1;
                continue;
            }
            match num::digit(byte) {
                Some(d) if d < radix => self.pos += 1,
                _                    => break,
            }
        }

        let text = &self.src[start..self.pos];
        self.token(TokenKind::Int(num::parse_i32(text, None)), start)
    }

    /// Scans a string literal.  The payload view excludes the quotes and
    /// keeps escape sequences raw; a backslash escapes the following byte.
    fn scan_str(&mut self) -> Token<'a> {
        let start = self.pos;
        self.pos += 1;
        let content = self.pos;

        while let Some(&byte) = self.src.get(self.pos) {
            if byte == b'"' {
                break;
            }
            if byte == b'\\' && self.pos + 1 < self.src.len() {
                self.pos += 1;
            }
            self.pos += 1;
        }

        let text = &self.src[content..self.pos];

        if let Some(&b'"') = self.src.get(self.pos) {
            self.pos += 1;
        }

        self.token(TokenKind::Str(text), start)
    }
}

// ----------------------------------------------------------------------------
