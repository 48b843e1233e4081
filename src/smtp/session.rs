/*
 * session.rs
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

//! One-shot submission: connect, drive a full session for a single message,
//! QUIT. Built on the streaming client; callers that need incremental body
//! delivery or multiple transactions drive [`SmtpClient`] themselves.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::net;
use crate::smtp::client::SmtpClient;
use crate::smtp::envelope::Envelope;
use crate::smtp::event::{SmtpError, SmtpEvent};
use crate::smtp::options::SmtpOptions;
use crate::transport::BufferedTransport;

/// Submit one message. Connects per `options.use_ssl` / `options.ca`,
/// authenticates when credentials are configured, and returns the
/// recipients the server rejected (empty when all were accepted). An
/// envelope where every recipient is rejected is an error.
pub async fn submit_message(
    host: &str,
    port: u16,
    options: SmtpOptions,
    envelope: Envelope,
    message: &[u8],
) -> Result<Vec<String>, SmtpError> {
    if options.use_ssl {
        let ca = options.ca.clone();
        let stream = net::connect_implicit_tls(host, port, ca.as_deref()).await?;
        drive_session(stream, options, envelope, message).await
    } else {
        let stream = net::connect_plain(host, port).await?;
        drive_session(stream, options, envelope, message).await
    }
}

/// Drive a complete session over an established stream.
pub async fn drive_session<S>(
    mut stream: S,
    options: SmtpOptions,
    envelope: Envelope,
    message: &[u8],
) -> Result<Vec<String>, SmtpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut client = SmtpClient::new(options, BufferedTransport::new());
    client.connect();
    client.transport_mut().set_open();
    client.on_open();

    let mut envelope = Some(envelope);
    let mut failed_recipients = Vec::new();
    let mut accepted = None;
    let mut read_buf = [0u8; 4096];

    loop {
        while let Some(event) = client.poll_event() {
            match event {
                SmtpEvent::Idle => match envelope.take() {
                    Some(env) => client.use_envelope(env)?,
                    None => client.quit(),
                },
                SmtpEvent::Ready {
                    failed_recipients: failed,
                } => {
                    failed_recipients = failed;
                    client.send(message);
                    client.end(None);
                }
                SmtpEvent::Done { success } => accepted = Some(success),
                SmtpEvent::Drain => {}
                SmtpEvent::Error(error) => return Err(error),
                SmtpEvent::Closed => {
                    return match accepted {
                        Some(true) => Ok(failed_recipients),
                        Some(false) => Err(SmtpError::Protocol(
                            "message rejected after data".to_string(),
                        )),
                        None => Err(SmtpError::Protocol(
                            "connection closed before message was accepted".to_string(),
                        )),
                    };
                }
            }
        }

        let mut wrote = false;
        while let Some(chunk) = client.transport_mut().take_outbound() {
            stream.write_all(&chunk).await?;
            wrote = true;
        }
        if wrote {
            stream.flush().await?;
            client.on_drain();
        }

        if client.transport_mut().close_requested() {
            client.transport_mut().set_closed();
            let _ = stream.shutdown().await;
            client.on_close();
            continue;
        }

        let n = stream.read(&mut read_buf).await?;
        if n == 0 {
            client.on_close();
            continue;
        }
        client.on_data(&read_buf[..n]);
    }
}
