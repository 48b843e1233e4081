/*
 * plain.rs
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

//! PLAIN SASL (RFC 4616).

/// Build the PLAIN initial response: NUL user NUL password, over raw bytes.
/// Caller base64-encodes for the wire (`AUTH PLAIN <base64>`).
pub fn plain_initial_response(user: &str, password: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(user.len() + password.len() + 2);
    out.push(0);
    out.extend_from_slice(user.as_bytes());
    out.push(0);
    out.extend_from_slice(password.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    #[test]
    fn initial_response_layout() {
        assert_eq!(plain_initial_response("abc", "def"), b"\0abc\0def");
    }

    #[test]
    fn wire_encoding() {
        let b64 = STANDARD.encode(plain_initial_response("abc", "def"));
        assert_eq!(b64, "AGFiYwBkZWY=");
    }
}
