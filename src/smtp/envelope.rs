/*
 * envelope.rs
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

//! SMTP envelope: sender, recipients, and per-recipient delivery progress.

use std::collections::VecDeque;

/// The envelope of one message transaction. Recipients move from the pending
/// queue into the sent or failed list as the server answers each RCPT, so
/// `queued + sent + failed` always covers every recipient exactly once.
///
/// Addresses are used verbatim inside `MAIL FROM:<…>` / `RCPT TO:<…>`; the
/// caller is responsible for correct mailbox syntax.
#[derive(Debug, Clone)]
pub struct Envelope {
    from: String,
    to: Vec<String>,
    rcpt_queue: VecDeque<String>,
    rcpt_sent: Vec<String>,
    rcpt_failed: Vec<String>,
}

impl Envelope {
    pub fn new(from: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            from: from.into(),
            rcpt_queue: to.iter().cloned().collect(),
            to,
            rcpt_sent: Vec::new(),
            rcpt_failed: Vec::new(),
        }
    }

    pub fn from_addr(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &[String] {
        &self.to
    }

    /// Recipients the server accepted.
    pub fn rcpt_sent(&self) -> &[String] {
        &self.rcpt_sent
    }

    /// Recipients the server rejected.
    pub fn rcpt_failed(&self) -> &[String] {
        &self.rcpt_failed
    }

    pub fn queued(&self) -> usize {
        self.rcpt_queue.len()
    }

    pub(crate) fn next_recipient(&mut self) -> Option<String> {
        self.rcpt_queue.pop_front()
    }

    pub(crate) fn record_sent(&mut self, rcpt: String) {
        self.rcpt_sent.push(rcpt);
    }

    pub(crate) fn record_failed(&mut self, rcpt: String) {
        self.rcpt_failed.push(rcpt);
    }

    pub(crate) fn all_failed(&self) -> bool {
        self.rcpt_failed.len() == self.to.len()
    }
}
