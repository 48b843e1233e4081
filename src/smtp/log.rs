/*
 * log.rs
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

//! Bounded wire transcript: the last N chunks exchanged with the server,
//! tagged by direction. Intended for post-mortem debugging of a session.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Client,
    Server,
}

#[derive(Debug, Clone)]
pub struct TrafficEntry {
    pub direction: Direction,
    pub bytes: Vec<u8>,
}

/// FIFO ring of traffic entries. Capacity 0 disables recording entirely;
/// otherwise the oldest entry is evicted on overflow.
pub struct TrafficLog {
    capacity: usize,
    entries: VecDeque<TrafficEntry>,
}

impl TrafficLog {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity: capacity as usize,
            entries: VecDeque::new(),
        }
    }

    pub fn record(&mut self, direction: Direction, bytes: &[u8]) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(TrafficEntry {
            direction,
            bytes: bytes.to_vec(),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &TrafficEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_entry_evicted_at_capacity() {
        let mut log = TrafficLog::new(2);
        log.record(Direction::Client, b"one");
        log.record(Direction::Server, b"two");
        log.record(Direction::Client, b"three");
        let bytes: Vec<&[u8]> = log.entries().map(|e| e.bytes.as_slice()).collect();
        assert_eq!(bytes, [&b"two"[..], &b"three"[..]]);
    }

    #[test]
    fn zero_capacity_disables_recording() {
        let mut log = TrafficLog::new(0);
        log.record(Direction::Client, b"one");
        assert!(log.is_empty());
    }

    #[test]
    fn directions_preserved() {
        let mut log = TrafficLog::new(4);
        log.record(Direction::Client, b"EHLO x\r\n");
        log.record(Direction::Server, b"250 OK\r\n");
        let dirs: Vec<Direction> = log.entries().map(|e| e.direction).collect();
        assert_eq!(dirs, [Direction::Client, Direction::Server]);
        assert_eq!(log.len(), 2);
    }
}
