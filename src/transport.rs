/*
 * transport.rs
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

//! Transport seam: the byte-oriented duplex the protocol core writes to.
//! The core never touches a socket; it hands wire bytes to a [`Transport`]
//! and is fed inbound bytes through its event entry points.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closing,
    Closed,
}

/// Abstract duplex owned by the client for the lifetime of a session.
pub trait Transport {
    /// Queue bytes for delivery, in call order.
    fn send(&mut self, data: &[u8]);

    /// Request an orderly close.
    fn close(&mut self);

    /// Pause inbound delivery (backpressure toward the server).
    fn suspend(&mut self);

    /// Resume inbound delivery.
    fn resume(&mut self);

    fn ready_state(&self) -> ReadyState;
}

/// Queue-backed transport: the core pushes wire bytes here and an IO driver
/// drains them to the socket, observing the close request and suspend flag.
pub struct BufferedTransport {
    state: ReadyState,
    outbound: VecDeque<Vec<u8>>,
    close_requested: bool,
    suspended: bool,
}

impl Default for BufferedTransport {
    fn default() -> Self {
        Self {
            state: ReadyState::Connecting,
            outbound: VecDeque::new(),
            close_requested: false,
            suspended: false,
        }
    }
}

impl BufferedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_open(&mut self) {
        self.state = ReadyState::Open;
    }

    pub fn set_closed(&mut self) {
        self.state = ReadyState::Closed;
    }

    /// Next queued wire chunk, oldest first.
    pub fn take_outbound(&mut self) -> Option<Vec<u8>> {
        self.outbound.pop_front()
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }
}

impl Transport for BufferedTransport {
    fn send(&mut self, data: &[u8]) {
        if self.state == ReadyState::Open {
            self.outbound.push_back(data.to_vec());
        }
    }

    fn close(&mut self) {
        self.close_requested = true;
        self.state = ReadyState::Closing;
    }

    fn suspend(&mut self) {
        self.suspended = true;
    }

    fn resume(&mut self) {
        self.suspended = false;
    }

    fn ready_state(&self) -> ReadyState {
        self.state
    }
}
