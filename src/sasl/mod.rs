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

//! SASL client pieces for SMTP submission: PLAIN and XOAUTH2 initial
//! responses, and the LOGIN prompt exchange.

mod mechanism;
mod plain;
mod xoauth2;

pub use mechanism::SaslMechanism;
pub use plain::plain_initial_response;
pub use xoauth2::xoauth2_initial_response;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

#[derive(Debug)]
pub struct SaslError {
    pub message: String,
}

impl SaslError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { message: msg.into() }
    }
}

impl std::fmt::Display for SaslError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SaslError {}

/// The two prompts a LOGIN exchange issues, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPrompt {
    Username,
    Password,
}

impl LoginPrompt {
    fn expected(&self) -> &'static [u8] {
        match self {
            LoginPrompt::Username => b"Username:",
            LoginPrompt::Password => b"Password:",
        }
    }
}

/// Validate a 334 LOGIN challenge: its base64 payload must decode to exactly
/// `Username:` or `Password:` (case-sensitive). Anything else is a protocol
/// error.
pub fn check_login_challenge(challenge_b64: &str, prompt: LoginPrompt) -> Result<(), SaslError> {
    let decoded = STANDARD
        .decode(challenge_b64.trim())
        .map_err(|_| SaslError::new("LOGIN challenge is not valid base64"))?;
    if decoded == prompt.expected() {
        Ok(())
    } else {
        Err(SaslError::new(format!(
            "unexpected LOGIN challenge: {}",
            String::from_utf8_lossy(&decoded)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_prompt_accepted() {
        assert!(check_login_challenge("VXNlcm5hbWU6", LoginPrompt::Username).is_ok());
    }

    #[test]
    fn password_prompt_accepted() {
        assert!(check_login_challenge("UGFzc3dvcmQ6", LoginPrompt::Password).is_ok());
    }

    #[test]
    fn prompts_are_order_sensitive() {
        assert!(check_login_challenge("UGFzc3dvcmQ6", LoginPrompt::Username).is_err());
    }

    #[test]
    fn case_variant_prompt_rejected() {
        // base64("username:")
        assert!(check_login_challenge("dXNlcm5hbWU6", LoginPrompt::Username).is_err());
    }

    #[test]
    fn garbage_challenge_rejected() {
        assert!(check_login_challenge("!!!", LoginPrompt::Username).is_err());
    }
}
