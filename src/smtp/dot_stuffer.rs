/*
 * dot_stuffer.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Postino, a streaming mail submission client.
 *
 * Postino is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Postino is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Postino.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Dot stuffing for SMTP DATA (RFC 5321 §4.5.2: lines starting with `.` get
//! an extra `.`). Line boundaries are tracked across write calls, so a dot
//! split from its preceding CRLF by a chunk boundary is still escaped.

#[derive(Clone, Copy, PartialEq)]
enum LinePos {
    /// At the beginning of a line (initial state, or immediately after CRLF).
    LineStart,
    /// Mid-line.
    Normal,
    /// Saw CR, waiting for LF.
    SawCr,
}

/// Escapes leading dots in a DATA-mode byte stream and produces the
/// end-of-data terminator. The beginning of the message counts as the start
/// of a line. When escaping is disabled, bytes pass through unchanged but
/// line position is still tracked so the terminator stays normalized.
pub struct DotStuffer {
    pos: LinePos,
    emitted: bool,
    escape: bool,
}

impl DotStuffer {
    pub fn new(disable_escaping: bool) -> Self {
        Self {
            pos: LinePos::LineStart,
            emitted: false,
            escape: !disable_escaping,
        }
    }

    /// Process a body chunk, returning the bytes to put on the wire.
    pub fn write(&mut self, chunk: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(chunk.len() + 2);
        let mut start = 0;
        for (i, &b) in chunk.iter().enumerate() {
            match self.pos {
                LinePos::LineStart => {
                    if b == b'.' && self.escape {
                        out.extend_from_slice(&chunk[start..i]);
                        out.push(b'.');
                        start = i;
                    }
                    self.pos = if b == b'\r' {
                        LinePos::SawCr
                    } else {
                        LinePos::Normal
                    };
                }
                LinePos::Normal => {
                    if b == b'\r' {
                        self.pos = LinePos::SawCr;
                    }
                }
                LinePos::SawCr => {
                    self.pos = if b == b'\n' {
                        LinePos::LineStart
                    } else if b == b'\r' {
                        LinePos::SawCr
                    } else {
                        LinePos::Normal
                    };
                }
            }
        }
        if start < chunk.len() {
            self.emitted = true;
            out.extend_from_slice(&chunk[start..]);
        }
        out
    }

    /// Emit the end-of-data terminator and reset.
    ///
    /// The terminator is shortened when the stream already ends mid-CRLF:
    /// after a complete CRLF only `.CRLF` is appended, after a bare CR the
    /// missing LF is supplied first.
    pub fn end(&mut self) -> Vec<u8> {
        let terminator: &[u8] = match self.pos {
            LinePos::LineStart if self.emitted => b".\r\n",
            LinePos::SawCr => b"\n.\r\n",
            _ => b"\r\n.\r\n",
        };
        self.pos = LinePos::LineStart;
        self.emitted = false;
        terminator.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_after_crlf_is_doubled() {
        let mut s = DotStuffer::new(false);
        assert_eq!(s.write(b".\r\n"), b"..\r\n");
    }

    #[test]
    fn dot_at_stream_start_is_doubled() {
        let mut s = DotStuffer::new(false);
        assert_eq!(s.write(b".hidden\r\n"), b"..hidden\r\n");
    }

    #[test]
    fn dot_only_at_line_start() {
        let mut s = DotStuffer::new(false);
        assert_eq!(s.write(b"a.b\r\nc.d\r\n"), b"a.b\r\nc.d\r\n");
    }

    #[test]
    fn multiple_dots_double_only_the_first() {
        let mut s = DotStuffer::new(false);
        assert_eq!(s.write(b"...\r\n"), b"....\r\n");
    }

    #[test]
    fn boundary_chunk_triple_is_byte_exact() {
        let mut s = DotStuffer::new(false);
        assert_eq!(s.write(b".a\r\n.b\r"), b"..a\r\n..b\r");
        assert_eq!(s.write(b"\n.c\r\n"), b"\n..c\r\n");
        assert_eq!(s.write(b".d"), b"..d");
    }

    #[test]
    fn disabled_escaping_passes_through() {
        let mut s = DotStuffer::new(true);
        assert_eq!(s.write(b".a\r\n.b\r"), b".a\r\n.b\r");
        assert_eq!(s.write(b"\n.c\r\n"), b"\n.c\r\n");
        assert_eq!(s.write(b".d"), b".d");
    }

    #[test]
    fn disabled_escaping_still_normalizes_terminator() {
        let mut s = DotStuffer::new(true);
        s.write(b"body\r\n");
        assert_eq!(s.end(), b".\r\n");
    }

    #[test]
    fn terminator_after_mid_line() {
        let mut s = DotStuffer::new(false);
        s.write(b"Subject: x\r\n\r\nBody");
        assert_eq!(s.end(), b"\r\n.\r\n");
    }

    #[test]
    fn terminator_after_crlf() {
        let mut s = DotStuffer::new(false);
        s.write(b"Body\r\n");
        assert_eq!(s.end(), b".\r\n");
    }

    #[test]
    fn terminator_after_bare_cr() {
        let mut s = DotStuffer::new(false);
        s.write(b"Body\r");
        assert_eq!(s.end(), b"\n.\r\n");
    }

    #[test]
    fn terminator_for_empty_body() {
        let mut s = DotStuffer::new(false);
        assert_eq!(s.end(), b"\r\n.\r\n");
    }

    #[test]
    fn end_resets_for_reuse() {
        let mut s = DotStuffer::new(false);
        s.write(b"one\r\n");
        s.end();
        assert_eq!(s.write(b".two\r\n"), b"..two\r\n");
        assert_eq!(s.end(), b".\r\n");
    }

    #[test]
    fn no_bare_dot_line_before_terminator() {
        let mut s = DotStuffer::new(false);
        let mut wire = Vec::new();
        for chunk in [&b"para\r\n"[..], b".\r", b"\nmore\r\n", b"."] {
            wire.extend(s.write(chunk));
        }
        wire.extend(s.end());
        let lines: Vec<&[u8]> = wire.split(|&b| b == b'\n').collect();
        let bare_dots = lines.iter().filter(|l| *l == b".\r" || *l == b".").count();
        assert_eq!(bare_dots, 1);
        assert!(wire.ends_with(b"\r\n.\r\n"));
    }
}
