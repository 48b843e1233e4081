/*
 * event.rs
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

//! Session errors and the caller-visible event stream.

use std::io;

/// Session error (network, protocol, auth, envelope). Any error ends the
/// session; the connection is closed after it is reported.
#[derive(Debug)]
pub enum SmtpError {
    /// Malformed or unexpected protocol exchange.
    Protocol(String),
    /// Authentication failed or credentials are unusable.
    Auth(String),
    /// The envelope was rejected (sender, or every recipient).
    Envelope(String),
    /// Socket-level failure, passed through verbatim.
    Transport(io::Error),
}

impl std::fmt::Display for SmtpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SmtpError::Protocol(m) | SmtpError::Auth(m) | SmtpError::Envelope(m) => {
                write!(f, "{}", m)
            }
            SmtpError::Transport(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SmtpError {}

impl From<io::Error> for SmtpError {
    fn from(e: io::Error) -> Self {
        SmtpError::Transport(e)
    }
}

/// Events the client queues for the caller. Drained with
/// [`poll_event`](crate::smtp::client::SmtpClient::poll_event); state
/// transitions always complete before the corresponding event is queued.
#[derive(Debug)]
pub enum SmtpEvent {
    /// The session is idle: an envelope may be submitted, or QUIT sent.
    Idle,
    /// DATA was accepted; body bytes may be streamed. Carries the recipients
    /// rejected during RCPT (partial failure is not an error).
    Ready { failed_recipients: Vec<String> },
    /// The outbound queue drained; more body data is welcome.
    Drain,
    /// The server answered the end-of-data terminator.
    Done { success: bool },
    /// The session failed and is closing.
    Error(SmtpError),
    /// The connection is fully closed. Queued exactly once per session.
    Closed,
}
