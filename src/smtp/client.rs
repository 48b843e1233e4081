/*
 * client.rs
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

//! Reply-driven SMTP/LMTP session machine and caller facade: greeting,
//! EHLO/LHLO capability negotiation, AUTH (PLAIN, LOGIN, XOAUTH2), envelope
//! establishment, streaming DATA with dot-stuffing, RSET and QUIT.
//!
//! One message per session. Inbound bytes arrive through the `on_*` entry
//! points; wire bytes leave through the owned [`Transport`]; caller-visible
//! progress is queued as [`SmtpEvent`]s and drained with `poll_event`.

use std::collections::VecDeque;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::sasl::{
    check_login_challenge, plain_initial_response, xoauth2_initial_response, LoginPrompt,
    SaslMechanism,
};
use crate::smtp::dot_stuffer::DotStuffer;
use crate::smtp::envelope::Envelope;
use crate::smtp::event::{SmtpError, SmtpEvent};
use crate::smtp::log::{Direction, TrafficEntry, TrafficLog};
use crate::smtp::options::{AuthCredentials, SmtpOptions};
use crate::smtp::reply::{Reply, ReplyParser};
use crate::transport::{ReadyState, Transport};

/// Protocol step the session is in. The active state selects the handler
/// for the next complete server reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Greeting,
    Ehlo,
    Helo,
    AuthLoginUser,
    AuthLoginPass,
    AuthXOAuth2,
    AuthComplete,
    Idle,
    Mail,
    Rcpt,
    Data,
    Streaming,
    Rset,
    Quit,
    Closed,
}

/// SMTP submission client over an abstract transport.
pub struct SmtpClient<T: Transport> {
    options: SmtpOptions,
    transport: T,
    parser: ReplyParser,
    stuffer: DotStuffer,
    log: TrafficLog,
    state: SessionState,
    supported_auth: Vec<String>,
    authenticated_as: Option<String>,
    envelope: Option<Envelope>,
    in_flight_rcpt: Option<String>,
    data_mode: bool,
    destroyed: bool,
    events: VecDeque<SmtpEvent>,
}

impl<T: Transport> SmtpClient<T> {
    pub fn new(options: SmtpOptions, transport: T) -> Self {
        let stuffer = DotStuffer::new(options.disable_escaping);
        let log = TrafficLog::new(options.log_length);
        Self {
            options,
            transport,
            parser: ReplyParser::new(),
            stuffer,
            log,
            state: SessionState::Connecting,
            supported_auth: Vec::new(),
            authenticated_as: None,
            envelope: None,
            in_flight_rcpt: None,
            data_mode: false,
            destroyed: false,
            events: VecDeque::new(),
        }
    }

    /// Next queued caller event, oldest first.
    pub fn poll_event(&mut self) -> Option<SmtpEvent> {
        self.events.pop_front()
    }

    pub fn session_state(&self) -> SessionState {
        self.state
    }

    pub fn authenticated_as(&self) -> Option<&str> {
        self.authenticated_as.as_deref()
    }

    pub fn envelope(&self) -> Option<&Envelope> {
        self.envelope.as_ref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Recorded wire transcript (empty unless `log_length` > 0).
    pub fn transcript(&self) -> impl Iterator<Item = &TrafficEntry> {
        self.log.entries()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // ---- transport events ----------------------------------------------

    /// Begin a session: the next inbound reply is the server greeting.
    pub fn connect(&mut self) {
        if self.destroyed {
            return;
        }
        self.parser.reset();
        self.state = SessionState::Connecting;
    }

    pub fn on_open(&mut self) {
        if self.destroyed {
            return;
        }
        self.state = SessionState::Greeting;
    }

    pub fn on_data(&mut self, chunk: &[u8]) {
        if self.destroyed {
            return;
        }
        self.log.record(Direction::Server, chunk);
        for reply in self.parser.feed(chunk) {
            self.handle_reply(reply);
        }
    }

    pub fn on_drain(&mut self) {
        if self.destroyed {
            return;
        }
        self.events.push_back(SmtpEvent::Drain);
    }

    pub fn on_error(&mut self, error: std::io::Error) {
        if self.destroyed {
            return;
        }
        self.events.push_back(SmtpEvent::Error(SmtpError::Transport(error)));
        self.close();
    }

    pub fn on_close(&mut self) {
        self.destroy();
    }

    // ---- caller operations ---------------------------------------------

    /// Submit an envelope. Valid only while the session is idle; sends
    /// `MAIL FROM` and drives the recipient queue from the replies.
    pub fn use_envelope(&mut self, envelope: Envelope) -> Result<(), SmtpError> {
        if self.destroyed {
            return Err(SmtpError::Protocol("session is closed".to_string()));
        }
        if self.state != SessionState::Idle || self.data_mode {
            return Err(SmtpError::Protocol(
                "envelope submitted while session is busy".to_string(),
            ));
        }
        let cmd = format!("MAIL FROM:<{}>", envelope.from_addr());
        self.envelope = Some(envelope);
        self.state = SessionState::Mail;
        self.send_command(&cmd);
        Ok(())
    }

    /// Stream body bytes. Only meaningful in data mode; otherwise a no-op
    /// (in particular after `end` while the final reply is outstanding).
    pub fn send(&mut self, data: &[u8]) {
        if self.destroyed || !self.data_mode {
            return;
        }
        let wire = self.stuffer.write(data);
        self.send_raw(&wire);
    }

    /// Finish the body: optionally write a final chunk, then the
    /// end-of-data terminator, and await the server's verdict.
    pub fn end(&mut self, last: Option<&[u8]>) {
        if self.destroyed || !self.data_mode {
            return;
        }
        if let Some(data) = last {
            let wire = self.stuffer.write(data);
            self.send_raw(&wire);
        }
        let terminator = self.stuffer.end();
        self.send_raw(&terminator);
        self.data_mode = false;
        self.state = SessionState::Streaming;
    }

    /// Abort the current transaction with RSET and re-authenticate,
    /// optionally with replacement credentials.
    pub fn reset(&mut self, new_auth: Option<AuthCredentials>) {
        if self.destroyed {
            return;
        }
        if let Some(auth) = new_auth {
            self.options.auth = Some(auth);
        }
        self.envelope = None;
        self.in_flight_rcpt = None;
        self.data_mode = false;
        self.send_command("RSET");
        self.state = SessionState::Rset;
    }

    pub fn suspend(&mut self) {
        if self.destroyed {
            return;
        }
        if self.transport.ready_state() == ReadyState::Open {
            self.transport.suspend();
        }
    }

    pub fn resume(&mut self) {
        if self.destroyed {
            return;
        }
        if self.transport.ready_state() == ReadyState::Open {
            self.transport.resume();
        }
    }

    /// Say goodbye; the connection closes once the server acknowledges.
    pub fn quit(&mut self) {
        if self.destroyed {
            return;
        }
        self.send_command("QUIT");
        self.state = SessionState::Quit;
    }

    /// Close the connection, or finish tearing down if it is already gone.
    pub fn close(&mut self) {
        if self.destroyed {
            return;
        }
        if self.transport.ready_state() == ReadyState::Open {
            self.transport.close();
        } else {
            self.destroy();
        }
    }

    // ---- reply dispatch ------------------------------------------------

    fn handle_reply(&mut self, reply: Reply) {
        if self.destroyed {
            return;
        }
        match self.state {
            SessionState::Connecting | SessionState::Idle | SessionState::Closed => {}
            SessionState::Greeting => self.on_greeting(reply),
            SessionState::Ehlo => self.on_ehlo(reply),
            SessionState::Helo => self.on_helo(reply),
            SessionState::AuthLoginUser => self.on_auth_login_user(reply),
            SessionState::AuthLoginPass => self.on_auth_login_pass(reply),
            SessionState::AuthXOAuth2 => self.on_auth_xoauth2(reply),
            SessionState::AuthComplete => self.on_auth_complete(reply),
            SessionState::Mail => self.on_mail(reply),
            SessionState::Rcpt => self.on_rcpt(reply),
            SessionState::Data => self.on_data_accepted(reply),
            SessionState::Streaming => self.on_streaming(reply),
            SessionState::Rset => self.on_rset(reply),
            SessionState::Quit => self.close(),
        }
    }

    fn on_greeting(&mut self, reply: Reply) {
        if reply.status_code != 220 {
            self.fail(SmtpError::Protocol(format!(
                "Invalid greeting: {}",
                reply.status_line
            )));
            return;
        }
        let verb = if self.options.lmtp { "LHLO" } else { "EHLO" };
        let cmd = format!("{} {}", verb, self.options.name);
        self.send_command(&cmd);
        self.state = SessionState::Ehlo;
    }

    fn on_ehlo(&mut self, reply: Reply) {
        if !reply.success {
            if self.options.lmtp {
                // LMTP has no HELO to fall back to.
                self.fail(SmtpError::Protocol(reply.status_line));
                return;
            }
            let cmd = format!("HELO {}", self.options.name);
            self.send_command(&cmd);
            self.state = SessionState::Helo;
            return;
        }
        for line in &reply.lines {
            let upper = line.trim().to_uppercase();
            if let Some(rest) = upper.strip_prefix("AUTH ") {
                self.supported_auth
                    .extend(rest.split_whitespace().map(str::to_string));
            }
        }
        self.authenticate();
    }

    fn on_helo(&mut self, reply: Reply) {
        if !reply.success {
            self.fail(SmtpError::Protocol(reply.status_line));
            return;
        }
        self.authenticate();
    }

    /// Pick a mechanism and open the AUTH exchange; straight to idle when
    /// no credentials are configured.
    fn authenticate(&mut self) {
        let Some(auth) = self.options.auth.clone() else {
            self.enter_idle();
            return;
        };
        let mechanism = self.options.auth_method.unwrap_or_else(|| {
            if self.supports_auth("PLAIN") {
                SaslMechanism::Plain
            } else if self.supports_auth("LOGIN") {
                SaslMechanism::Login
            } else {
                SaslMechanism::Plain
            }
        });
        match mechanism {
            SaslMechanism::Plain => {
                let pass = auth.pass.as_deref().unwrap_or("");
                let b64 = BASE64.encode(plain_initial_response(&auth.user, pass));
                self.send_command(&format!("AUTH PLAIN {}", b64));
                self.state = SessionState::AuthComplete;
            }
            SaslMechanism::Login => {
                self.send_command("AUTH LOGIN");
                self.state = SessionState::AuthLoginUser;
            }
            SaslMechanism::XOAuth2 => {
                let Some(token) = auth.token.as_deref() else {
                    self.fail(SmtpError::Auth(
                        "XOAUTH2 requires an access token".to_string(),
                    ));
                    return;
                };
                let b64 = BASE64.encode(xoauth2_initial_response(&auth.user, token));
                self.send_command(&format!("AUTH XOAUTH2 {}", b64));
                self.state = SessionState::AuthXOAuth2;
            }
        }
    }

    fn on_auth_login_user(&mut self, reply: Reply) {
        if reply.status_code != 334
            || check_login_challenge(&reply.status_line, LoginPrompt::Username).is_err()
        {
            self.fail(SmtpError::Protocol(format!(
                "Invalid login sequence while waiting for \"334 VXNlcm5hbWU6\": {}",
                reply.status_line
            )));
            return;
        }
        let user = self
            .options
            .auth
            .as_ref()
            .map(|a| a.user.clone())
            .unwrap_or_default();
        self.send_command(&BASE64.encode(user.as_bytes()));
        self.state = SessionState::AuthLoginPass;
    }

    fn on_auth_login_pass(&mut self, reply: Reply) {
        if reply.status_code != 334
            || check_login_challenge(&reply.status_line, LoginPrompt::Password).is_err()
        {
            self.fail(SmtpError::Protocol(format!(
                "Invalid login sequence while waiting for \"334 UGFzc3dvcmQ6\": {}",
                reply.status_line
            )));
            return;
        }
        let pass = self
            .options
            .auth
            .as_ref()
            .and_then(|a| a.pass.clone())
            .unwrap_or_default();
        self.send_command(&BASE64.encode(pass.as_bytes()));
        self.state = SessionState::AuthComplete;
    }

    fn on_auth_xoauth2(&mut self, reply: Reply) {
        if reply.success {
            self.on_auth_complete(reply);
        } else {
            // The 334 carries a base64 error payload; answering with an
            // empty line makes the server fail the exchange with a final
            // status we can report.
            self.send_command("");
            self.state = SessionState::AuthComplete;
        }
    }

    fn on_auth_complete(&mut self, reply: Reply) {
        if !reply.success {
            self.fail(SmtpError::Auth(reply.status_line));
            return;
        }
        self.authenticated_as = self.options.auth.as_ref().map(|a| a.user.clone());
        self.enter_idle();
    }

    fn on_mail(&mut self, reply: Reply) {
        if !reply.success {
            self.fail(SmtpError::Envelope(reply.status_line));
            return;
        }
        let next = self.envelope.as_mut().and_then(Envelope::next_recipient);
        match next {
            None => self.fail(SmtpError::Envelope(
                "Can't send mail - no recipients defined".to_string(),
            )),
            Some(rcpt) => {
                let cmd = format!("RCPT TO:<{}>", rcpt);
                self.in_flight_rcpt = Some(rcpt);
                self.state = SessionState::Rcpt;
                self.send_command(&cmd);
            }
        }
    }

    fn on_rcpt(&mut self, reply: Reply) {
        if let (Some(env), Some(rcpt)) = (self.envelope.as_mut(), self.in_flight_rcpt.take()) {
            if reply.success {
                env.record_sent(rcpt);
            } else {
                env.record_failed(rcpt);
            }
        }
        let next = self.envelope.as_mut().and_then(Envelope::next_recipient);
        if let Some(rcpt) = next {
            let cmd = format!("RCPT TO:<{}>", rcpt);
            self.in_flight_rcpt = Some(rcpt);
            self.send_command(&cmd);
            return;
        }
        let all_failed = self.envelope.as_ref().map_or(true, Envelope::all_failed);
        if all_failed {
            self.fail(SmtpError::Envelope(
                "Can't send mail - all recipients were rejected".to_string(),
            ));
            return;
        }
        self.send_command("DATA");
        self.state = SessionState::Data;
    }

    fn on_data_accepted(&mut self, reply: Reply) {
        if reply.status_code != 250 && reply.status_code != 354 {
            self.fail(SmtpError::Protocol(reply.status_line));
            return;
        }
        self.data_mode = true;
        self.state = SessionState::Idle;
        let failed_recipients = self
            .envelope
            .as_ref()
            .map(|e| e.rcpt_failed().to_vec())
            .unwrap_or_default();
        self.events.push_back(SmtpEvent::Ready { failed_recipients });
    }

    fn on_streaming(&mut self, reply: Reply) {
        self.events.push_back(SmtpEvent::Done {
            success: reply.success,
        });
        self.enter_idle();
    }

    fn on_rset(&mut self, reply: Reply) {
        if !reply.success {
            self.fail(SmtpError::Protocol(reply.status_line));
            return;
        }
        self.authenticated_as = None;
        self.authenticate();
    }

    // ---- internals -----------------------------------------------------

    fn enter_idle(&mut self) {
        self.state = SessionState::Idle;
        self.events.push_back(SmtpEvent::Idle);
    }

    fn supports_auth(&self, mechanism: &str) -> bool {
        self.supported_auth.iter().any(|m| m == mechanism)
    }

    fn send_command(&mut self, cmd: &str) {
        let mut wire = Vec::with_capacity(cmd.len() + 2);
        wire.extend_from_slice(cmd.as_bytes());
        wire.extend_from_slice(b"\r\n");
        self.send_raw(&wire);
    }

    fn send_raw(&mut self, wire: &[u8]) {
        self.log.record(Direction::Client, wire);
        self.transport.send(wire);
    }

    /// Report an error and collapse the session.
    fn fail(&mut self, error: SmtpError) {
        self.envelope = None;
        self.in_flight_rcpt = None;
        self.data_mode = false;
        self.events.push_back(SmtpEvent::Error(error));
        self.close();
    }

    /// Final teardown. Safe to call repeatedly; `Closed` is queued once.
    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.state = SessionState::Closed;
        self.parser.reset();
        self.envelope = None;
        self.events.push_back(SmtpEvent::Closed);
    }
}
