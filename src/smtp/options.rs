/*
 * options.rs
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

//! Per-session client configuration.

use crate::sasl::SaslMechanism;

/// Credentials for AUTH. `pass` is used by PLAIN and LOGIN, `token` by
/// XOAUTH2.
#[derive(Debug, Clone)]
pub struct AuthCredentials {
    pub user: String,
    pub pass: Option<String>,
    pub token: Option<String>,
}

impl AuthCredentials {
    pub fn password(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: Some(pass.into()),
            token: None,
        }
    }

    pub fn bearer(user: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: None,
            token: Some(token.into()),
        }
    }
}

/// Session options, fixed for the lifetime of a client.
#[derive(Debug, Clone)]
pub struct SmtpOptions {
    /// Connect with implicit TLS (SMTPS).
    pub use_ssl: bool,
    /// Extra trusted root certificate (DER), handed to the TLS layer.
    pub ca: Option<Vec<u8>>,
    /// Hostname announced in EHLO/LHLO.
    pub name: String,
    /// Credentials; `None` disables authentication.
    pub auth: Option<AuthCredentials>,
    /// Forced mechanism; `None` selects from the server's AUTH capability.
    pub auth_method: Option<SaslMechanism>,
    /// Pass DATA bytes through without dot-stuffing.
    pub disable_escaping: bool,
    /// Speak LMTP (LHLO instead of EHLO).
    pub lmtp: bool,
    /// Transcript ring capacity in entries; 0 disables logging.
    pub log_length: u32,
}

impl Default for SmtpOptions {
    fn default() -> Self {
        Self {
            use_ssl: false,
            ca: None,
            name: "localhost".to_string(),
            auth: None,
            auth_method: None,
            disable_escaping: false,
            lmtp: false,
            log_length: 0,
        }
    }
}
