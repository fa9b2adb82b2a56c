//! HTTPS Transport for DNS queries: DNS-over-HTTPS (RFC 8484)
//!
//! Three request shapes, chosen by `DohMethod`:
//!
//! ```text
//! POST /dns-query                       Content-Type: application/dns-message
//! GET  /dns-query?dns=<base64url>       Accept: application/dns-message
//! GET  /resolve?name=<qname>&type=<t>   Accept: application/dns-json
//! ```
//!
//! The response body is decoded according to its `Content-Type`, so a JSON
//! answer to a wire-format request is still understood.

use super::{BodyEncoding, DnsTransport, TransportResponse};
use crate::dns::codec::EncodedQuery;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ferrous_dig_domain::{DohMethod, DomainError, RecordType};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use std::error::Error as _;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// Shared client on the DoT trust config. No idle connections are kept:
/// every query is one request.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    let mut tls_config = super::tls::SHARED_TLS_CONFIG.as_ref().clone();
    tls_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    reqwest::Client::builder()
        .use_preconfigured_tls(tls_config)
        .pool_max_idle_per_host(0)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// Wire-format media type (RFC 8484 §6)
const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

const DNS_JSON_CONTENT_TYPE: &str = "application/dns-json";

/// DNS-over-HTTPS transport (RFC 8484)
pub struct HttpsTransport {
    url: String,
    method: DohMethod,
}

impl HttpsTransport {
    pub fn new(url: String, method: DohMethod) -> Self {
        Self { url, method }
    }

    fn build_request(&self, query: &EncodedQuery) -> reqwest::RequestBuilder {
        match self.method {
            DohMethod::Post => SHARED_CLIENT
                .post(&self.url)
                .header(CONTENT_TYPE, DNS_MESSAGE_CONTENT_TYPE)
                .header(ACCEPT, DNS_MESSAGE_CONTENT_TYPE)
                .body(query.bytes.clone()),
            DohMethod::Get => SHARED_CLIENT
                .get(&self.url)
                .query(&[("dns", URL_SAFE_NO_PAD.encode(&query.bytes))])
                .header(ACCEPT, DNS_MESSAGE_CONTENT_TYPE),
            DohMethod::Json => {
                let record_type = match query.question.record_type {
                    RecordType::Unknown(code) => code.to_string(),
                    known => known.to_string(),
                };
                SHARED_CLIENT
                    .get(&self.url)
                    .query(&[
                        ("name", query.question.name.as_str()),
                        ("type", record_type.as_str()),
                    ])
                    .header(ACCEPT, DNS_JSON_CONTENT_TYPE)
            }
        }
    }

    async fn exchange(&self, query: &EncodedQuery) -> Result<TransportResponse, DomainError> {
        debug!(
            url = %self.url,
            method = %self.method,
            bytes_sent = query.bytes.len(),
            "Sending DoH query"
        );

        let response = self
            .build_request(query)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DomainError::HttpError {
                server: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let encoding = body_encoding(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );

        let body = response.bytes().await.map_err(|e| self.request_error(e))?;

        debug!(
            url = %self.url,
            response_len = body.len(),
            encoding = ?encoding,
            "DoH response received"
        );

        Ok(TransportResponse {
            bytes: body.to_vec(),
            encoding,
            protocol_used: "HTTPS",
        })
    }

    fn request_error(&self, e: reqwest::Error) -> DomainError {
        let server = self.url.clone();
        let reason = error_chain(&e);

        if e.is_timeout() {
            DomainError::Timeout { server }
        } else if is_tls_failure(&e) {
            DomainError::HandshakeError { server, reason }
        } else {
            DomainError::NetworkError { server, reason }
        }
    }
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    async fn send(
        &self,
        query: &EncodedQuery,
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        tokio::time::timeout(timeout, self.exchange(query))
            .await
            .map_err(|_| DomainError::Timeout {
                server: self.url.clone(),
            })?
    }

    fn protocol_name(&self) -> &'static str {
        "HTTPS"
    }
}

/// JSON bodies are recognized by media type; everything else is wire format.
fn body_encoding(content_type: Option<&str>) -> BodyEncoding {
    let media_type = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    match media_type.as_deref() {
        Some(DNS_JSON_CONTENT_TYPE) | Some("application/json") => BodyEncoding::Json,
        _ => BodyEncoding::Wire,
    }
}

/// reqwest's top-level message is terse; the cause is further down.
fn error_chain(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn is_tls_failure(e: &reqwest::Error) -> bool {
    let mut source = e.source();
    while let Some(cause) = source {
        if cause.downcast_ref::<rustls::Error>().is_some() {
            return true;
        }
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io
                .get_ref()
                .is_some_and(|inner| inner.downcast_ref::<rustls::Error>().is_some())
            {
                return true;
            }
        }
        source = cause.source();
    }
    false
}
