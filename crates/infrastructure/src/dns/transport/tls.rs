//! TLS Transport for DNS queries: DNS-over-TLS (RFC 7858)
//!
//! TCP framing over a rustls session verified against the system trust
//! roots. The client config is static and shared; the connection itself
//! lives for exactly one query.

use super::tcp::{connect, read_with_length_prefix, send_with_length_prefix};
use super::{BodyEncoding, DnsTransport, TransportResponse};
use crate::dns::codec::EncodedQuery;
use async_trait::async_trait;
use ferrous_dig_domain::{DomainError, UpstreamAddr};
use rustls::pki_types::ServerName;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, warn};

/// Shared TLS config trusting the system roots. Built once, used by both
/// DoT and DoH.
pub(crate) static SHARED_TLS_CONFIG: LazyLock<Arc<rustls::ClientConfig>> = LazyLock::new(|| {
    install_crypto_provider();

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(system_root_store())
        .with_no_client_auth();

    Arc::new(config)
});

/// Certificates from the operating system's trust store. Falls back to the
/// bundled Mozilla roots only when the system store yields nothing usable.
pub fn system_root_store() -> rustls::RootCertStore {
    let loaded = rustls_native_certs::load_native_certs();
    for error in &loaded.errors {
        warn!(error = %error, "Failed to load a native root certificate source");
    }

    let mut root_store = rustls::RootCertStore::empty();
    let (added, ignored) = root_store.add_parsable_certificates(loaded.certs);
    debug!(added, ignored, "System trust roots loaded");

    if root_store.is_empty() {
        warn!("No system trust roots found, using bundled webpki roots");
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    root_store
}

/// More than one rustls backend is compiled in (reqwest brings its own),
/// so the process default has to be chosen explicitly.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// DNS-over-TLS transport (RFC 7858)
pub struct TlsTransport {
    upstream_addr: UpstreamAddr,
    hostname: String,
    server: String,
    config: Arc<rustls::ClientConfig>,
}

impl TlsTransport {
    pub fn new(upstream_addr: UpstreamAddr, hostname: String) -> Self {
        Self::with_config(upstream_addr, hostname, SHARED_TLS_CONFIG.clone())
    }

    /// Uses `config` instead of the shared system-roots config.
    pub fn with_config(
        upstream_addr: UpstreamAddr,
        hostname: String,
        config: Arc<rustls::ClientConfig>,
    ) -> Self {
        let server = format!("tls://{}", upstream_addr);
        Self {
            upstream_addr,
            hostname,
            server,
            config,
        }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let server_name = ServerName::try_from(self.hostname.clone()).map_err(|e| {
            DomainError::InvalidDestination(format!(
                "Invalid TLS hostname '{}': {}",
                self.hostname, e
            ))
        })?;

        let tcp_stream = connect(&self.upstream_addr, &self.server).await?;

        let connector = tokio_rustls::TlsConnector::from(self.config.clone());
        let mut tls_stream = connector
            .connect(server_name, tcp_stream)
            .await
            .map_err(|e| DomainError::HandshakeError {
                server: self.server.clone(),
                reason: e.to_string(),
            })?;

        debug!(server = %self.server, hostname = %self.hostname, "TLS connection established");

        send_with_length_prefix(&mut tls_stream, message_bytes, &self.server).await?;

        debug!(
            server = %self.server,
            bytes_sent = message_bytes.len(),
            "TLS query sent"
        );

        let response_bytes = read_with_length_prefix(&mut tls_stream, &self.server).await?;

        debug!(
            server = %self.server,
            response_len = response_bytes.len(),
            "TLS response received"
        );

        Ok(response_bytes)
    }
}

#[async_trait]
impl DnsTransport for TlsTransport {
    async fn send(
        &self,
        query: &EncodedQuery,
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let bytes = tokio::time::timeout(timeout, self.exchange(&query.bytes))
            .await
            .map_err(|_| DomainError::Timeout {
                server: self.server.clone(),
            })??;

        Ok(TransportResponse {
            bytes,
            encoding: BodyEncoding::Wire,
            protocol_used: "TLS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TLS"
    }
}
