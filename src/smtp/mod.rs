/*
 * mod.rs
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

//! SMTP/LMTP submission: reply parsing, session state machine, dot-stuffed
//! DATA streaming, wire transcript, and the one-shot submission driver.

pub mod client;
pub mod dot_stuffer;
pub mod envelope;
pub mod event;
pub mod log;
pub mod options;
pub mod reply;
pub mod session;

pub use client::{SessionState, SmtpClient};
pub use dot_stuffer::DotStuffer;
pub use envelope::Envelope;
pub use event::{SmtpError, SmtpEvent};
pub use log::{Direction, TrafficEntry, TrafficLog};
pub use options::{AuthCredentials, SmtpOptions};
pub use reply::{Reply, ReplyParser};
pub use session::{drive_session, submit_message};
