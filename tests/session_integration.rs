/*
 * session_integration.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * Integration tests for the submission driver: a scripted SMTP server on an
 * ephemeral local port exercises the full conversation (greeting, EHLO,
 * AUTH, envelope, dot-stuffed DATA, QUIT) through submit_message.
 *
 * Run with:
 *   cargo test --test session_integration -- --nocapture
 */

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use postino::{submit_message, AuthCredentials, Envelope, SmtpError, SmtpOptions};

/// What the scripted server observed.
struct ServerRecord {
    commands: Vec<String>,
    data: String,
}

/// Serve exactly one session. Recipients in `reject` get 550; the message
/// body gets 554 when `reject_body` is set.
async fn serve_one(
    listener: TcpListener,
    reject: Vec<String>,
    reject_body: bool,
) -> ServerRecord {
    let (stream, _) = listener.accept().await.expect("accept");
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut commands = Vec::new();
    let mut data = String::new();

    write_half
        .write_all(b"220 postino.test ESMTP\r\n")
        .await
        .expect("greeting");

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await.expect("read command") == 0 {
            break;
        }
        let cmd = line.trim_end().to_string();
        commands.push(cmd.clone());
        let verb = cmd.split(' ').next().unwrap_or("").to_uppercase();
        match verb.as_str() {
            "EHLO" => {
                write_half
                    .write_all(b"250-postino.test\r\n250-AUTH PLAIN LOGIN\r\n250 SIZE 10240000\r\n")
                    .await
                    .expect("ehlo reply");
            }
            "AUTH" => {
                write_half
                    .write_all(b"235 2.7.0 accepted\r\n")
                    .await
                    .expect("auth reply");
            }
            "MAIL" => {
                write_half
                    .write_all(b"250 2.1.0 sender ok\r\n")
                    .await
                    .expect("mail reply");
            }
            "RCPT" => {
                let addr = cmd
                    .trim_start_matches("RCPT TO:<")
                    .trim_end_matches('>')
                    .to_string();
                let reply: &[u8] = if reject.contains(&addr) {
                    b"550 5.1.1 no such user\r\n"
                } else {
                    b"250 2.1.5 recipient ok\r\n"
                };
                write_half.write_all(reply).await.expect("rcpt reply");
            }
            "DATA" => {
                write_half
                    .write_all(b"354 end data with <CRLF>.<CRLF>\r\n")
                    .await
                    .expect("data reply");
                loop {
                    line.clear();
                    if reader.read_line(&mut line).await.expect("read data") == 0 {
                        break;
                    }
                    if line.trim_end() == "." {
                        break;
                    }
                    data.push_str(&line);
                }
                let reply: &[u8] = if reject_body {
                    b"554 5.6.0 content rejected\r\n"
                } else {
                    b"250 2.0.0 queued\r\n"
                };
                write_half.write_all(reply).await.expect("final reply");
            }
            "QUIT" => {
                write_half.write_all(b"221 2.0.0 bye\r\n").await.expect("quit reply");
                break;
            }
            _ => {
                write_half
                    .write_all(b"500 5.5.1 unrecognized\r\n")
                    .await
                    .expect("error reply");
            }
        }
    }

    ServerRecord { commands, data }
}

#[tokio::test]
async fn submits_message_and_reports_rejected_recipients() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let server = tokio::spawn(serve_one(
        listener,
        vec!["nobody@example.org".to_string()],
        false,
    ));

    let options = SmtpOptions {
        name: "client.test".to_string(),
        auth: Some(AuthCredentials::password("abc", "def")),
        ..SmtpOptions::default()
    };
    let envelope = Envelope::new(
        "sender@example.org",
        vec!["nobody@example.org".into(), "friend@example.org".into()],
    );
    let message = b"Subject: test\r\n\r\n.leading dot line\r\nplain line\r\n";

    let failed = submit_message("127.0.0.1", port, options, envelope, message)
        .await
        .expect("submission succeeds");
    assert_eq!(failed, ["nobody@example.org"]);

    let record = server.await.expect("server task");
    assert!(record.commands.contains(&"EHLO client.test".to_string()));
    assert!(record
        .commands
        .contains(&"AUTH PLAIN AGFiYwBkZWY=".to_string()));
    assert!(record.commands.contains(&"QUIT".to_string()));
    // The leading dot reached the server stuffed; the terminator did not
    // leak into the stored body.
    assert!(record.data.contains("..leading dot line\r\n"));
    assert!(record.data.contains("plain line\r\n"));
    assert!(!record.data.contains("\r\n.\r\n"));
}

#[tokio::test]
async fn all_recipients_rejected_fails_the_submission() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    tokio::spawn(serve_one(
        listener,
        vec!["a@example.org".to_string(), "b@example.org".to_string()],
        false,
    ));

    let envelope = Envelope::new(
        "sender@example.org",
        vec!["a@example.org".into(), "b@example.org".into()],
    );
    let err = submit_message(
        "127.0.0.1",
        port,
        SmtpOptions::default(),
        envelope,
        b"Subject: x\r\n\r\nhello\r\n",
    )
    .await
    .expect_err("submission fails");
    match err {
        SmtpError::Envelope(msg) => {
            assert_eq!(msg, "Can't send mail - all recipients were rejected");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn rejected_body_fails_the_submission() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    tokio::spawn(serve_one(listener, Vec::new(), true));

    let envelope = Envelope::new("sender@example.org", vec!["friend@example.org".into()]);
    let err = submit_message(
        "127.0.0.1",
        port,
        SmtpOptions::default(),
        envelope,
        b"Subject: x\r\n\r\nhello\r\n",
    )
    .await
    .expect_err("submission fails");
    assert!(matches!(err, SmtpError::Protocol(_)));
}
