/*
 * lib.rs
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

//! Postino: a streaming SMTP/LMTP submission client.
//!
//! The protocol core is deterministic and transport-agnostic: server bytes
//! go in through [`SmtpClient::on_data`], wire bytes come out through the
//! owned [`Transport`], and session progress (idle, ready for body, done,
//! errors, close) is drained as [`SmtpEvent`]s. The `net` and
//! `smtp::session` modules supply the tokio/rustls edge and a one-shot
//! [`submit_message`] convenience on top.

pub mod net;
pub mod sasl;
pub mod smtp;
pub mod transport;

pub use sasl::SaslMechanism;
pub use smtp::{
    submit_message, AuthCredentials, Envelope, SessionState, SmtpClient, SmtpError, SmtpEvent,
    SmtpOptions,
};
pub use transport::{BufferedTransport, ReadyState, Transport};
