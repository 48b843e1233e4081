/*
 * net.rs
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

//! Socket connect helpers: plain TCP for submission on 25/587 test setups,
//! implicit TLS (SMTPS 465) via rustls. Certificate verification is the TLS
//! layer's business; callers may supply one extra trusted root (DER).

use std::io;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName};
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

/// Root certificate store: platform native certs first, Mozilla roots as
/// fallback, plus an optional caller-provided root.
fn build_root_store(extra_root: Option<&[u8]>) -> RootCertStore {
    let mut roots = RootCertStore::empty();
    if let Ok(certs) = rustls_native_certs::load_native_certs() {
        for cert in certs {
            let _ = roots.add(cert);
        }
    }
    if roots.is_empty() {
        roots.roots = webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();
    }
    if let Some(der) = extra_root {
        let _ = roots.add(CertificateDer::from(der.to_vec()));
    }
    roots
}

fn default_connector() -> &'static TlsConnector {
    static DEFAULT_CONNECTOR: std::sync::OnceLock<TlsConnector> = std::sync::OnceLock::new();
    DEFAULT_CONNECTOR.get_or_init(|| {
        let config = ClientConfig::builder()
            .with_root_certificates(build_root_store(None))
            .with_no_client_auth();
        TlsConnector::from(Arc::new(config))
    })
}

/// Connect without TLS.
pub async fn connect_plain(host: &str, port: u16) -> io::Result<TcpStream> {
    let addr = format!("{}:{}", host, port);
    TcpStream::connect(&addr).await
}

/// Connect with implicit TLS (e.g. SMTPS 465): TCP connect then immediate
/// TLS handshake.
pub async fn connect_implicit_tls(
    host: &str,
    port: u16,
    extra_root: Option<&[u8]>,
) -> io::Result<TlsStream<TcpStream>> {
    let addr = format!("{}:{}", host, port);
    let tcp = TcpStream::connect(&addr).await?;
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid host name"))?;
    match extra_root {
        None => default_connector().connect(server_name, tcp).await,
        Some(der) => {
            let config = ClientConfig::builder()
                .with_root_certificates(build_root_store(Some(der)))
                .with_no_client_auth();
            TlsConnector::from(Arc::new(config))
                .connect(server_name, tcp)
                .await
        }
    }
}
