/*
 * reply.rs
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

//! Incremental SMTP reply parser: reassembles complete replies (status code,
//! multi-line text) from arbitrarily chunked server bytes.

use bytes::{Buf, BytesMut};

/// A complete server reply. Multi-line replies (`NNN-text`) are accumulated
/// until the terminating `NNN text` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status_code: u16,
    /// Text of the final line.
    pub status_line: String,
    /// Text of every line, in arrival order.
    pub lines: Vec<String>,
    pub success: bool,
}

/// Reassembles replies from a byte stream. Lines end at the first CRLF; a
/// lone CR is ordinary line data. Feeding the same stream in any chunking
/// yields the same sequence of replies.
pub struct ReplyParser {
    buf: BytesMut,
    /// Prefix of `buf` already scanned without finding a CRLF.
    scanned: usize,
    pending: Vec<String>,
}

impl Default for ReplyParser {
    fn default() -> Self {
        Self {
            buf: BytesMut::with_capacity(4096),
            scanned: 0,
            pending: Vec::new(),
        }
    }
}

impl ReplyParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes and return every reply completed by them.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Reply> {
        self.buf.extend_from_slice(chunk);
        let mut replies = Vec::new();
        loop {
            // Resume one byte early so a CR left at the old buffer end can
            // pair with an LF that arrived in this chunk.
            let from = self.scanned.saturating_sub(1);
            let found = self.buf[from..].windows(2).position(|w| w == b"\r\n");
            let Some(at) = found else {
                self.scanned = self.buf.len();
                break;
            };
            let line_end = from + at;
            if let Some(reply) = self.process_line(line_end) {
                replies.push(reply);
            }
            self.buf.advance(line_end + 2);
            self.scanned = 0;
        }
        replies
    }

    /// Drop any buffered bytes and partial reply (used on hard error).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.scanned = 0;
        self.pending.clear();
    }

    fn process_line(&mut self, line_end: usize) -> Option<Reply> {
        let line = &self.buf[..line_end];
        if line.len() < 4 || !line[..3].iter().all(u8::is_ascii_digit) {
            // Unparseable line: flush as a synthetic permanent error carrying
            // the raw line, discarding any accumulated reply.
            let raw = String::from_utf8_lossy(line).into_owned();
            self.pending.clear();
            return Some(Reply {
                status_code: 500,
                status_line: raw.clone(),
                lines: vec![raw],
                success: false,
            });
        }
        let status_code: u16 = String::from_utf8_lossy(&line[..3]).parse().unwrap_or(0);
        let more = line[3] == b'-';
        let text = String::from_utf8_lossy(&line[4..]).into_owned();
        self.pending.push(text);
        if more {
            return None;
        }
        let lines = std::mem::take(&mut self.pending);
        let status_line = lines.last().cloned().unwrap_or_default();
        Some(Reply {
            status_code,
            status_line,
            lines,
            success: (200..300).contains(&status_code),
        })
    }
}
