/*
 * xoauth2.rs
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

//! XOAUTH2 SASL mechanism for Gmail and Outlook submission.
//!
//! Single-shot mechanism (no challenge-response rounds). The initial client
//! response is:
//!
//! ```text
//! base64("user=" {user} "\x01" "auth=Bearer " {access_token} "\x01\x01")
//! ```
//!
//! See <https://developers.google.com/gmail/imap/xoauth2-protocol>

/// Build the raw XOAUTH2 initial response (before base64 encoding).
pub fn xoauth2_initial_response(user: &str, access_token: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(user.len() + access_token.len() + 20);
    out.extend_from_slice(b"user=");
    out.extend_from_slice(user.as_bytes());
    out.push(0x01);
    out.extend_from_slice(b"auth=Bearer ");
    out.extend_from_slice(access_token.as_bytes());
    out.extend_from_slice(&[0x01, 0x01]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    #[test]
    fn initial_response_layout() {
        let raw = xoauth2_initial_response("user@example.com", "ya29.token123");
        let expected = b"user=user@example.com\x01auth=Bearer ya29.token123\x01\x01";
        assert_eq!(raw, expected.to_vec());
    }

    #[test]
    fn wire_encoding() {
        let b64 = STANDARD.encode(xoauth2_initial_response("user@host", "abcde"));
        assert_eq!(b64, "dXNlcj11c2VyQGhvc3QBYXV0aD1CZWFyZXIgYWJjZGUBAQ==");
    }
}
