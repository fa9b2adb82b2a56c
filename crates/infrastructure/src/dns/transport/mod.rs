pub mod https;
pub mod resolver;
pub mod tcp;
pub mod tls;
pub mod udp;

use super::codec::{EncodedQuery, JsonMessage, ResponseParser};
use async_trait::async_trait;
use ferrous_dig_domain::{Destination, DnsResponse, DohMethod, DomainError};
use std::time::Duration;

/// How a transport's response body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// RFC 1035 wire format (UDP, TCP, TLS and `application/dns-message`).
    Wire,
    /// `application/dns-json`.
    Json,
}

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,

    pub encoding: BodyEncoding,

    pub protocol_used: &'static str,
}

impl TransportResponse {
    /// Decodes the body and, for wire-format bodies, checks the message ID
    /// against the query's.
    pub fn decode(&self, query: &EncodedQuery, server: &str) -> Result<DnsResponse, DomainError> {
        match self.encoding {
            BodyEncoding::Json => JsonMessage::decode(&self.bytes, &query.question, server),
            BodyEncoding::Wire => {
                let parsed = ResponseParser::parse(&self.bytes, server)?;
                if parsed.id != query.id {
                    return Err(DomainError::MalformedResponse {
                        server: server.to_string(),
                        reason: format!(
                            "response ID {:#06x} does not match query ID {:#06x}",
                            parsed.id, query.id
                        ),
                    });
                }
                Ok(parsed.response)
            }
        }
    }
}

/// One request/response round trip. `timeout` bounds the whole exchange,
/// including connection setup and any hostname lookup.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        query: &EncodedQuery,
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
    #[cfg(feature = "dns-over-rustls")]
    Tls(tls::TlsTransport),
    #[cfg(feature = "dns-over-https")]
    Https(https::HttpsTransport),
}

impl Transport {
    pub async fn send(
        &self,
        query: &EncodedQuery,
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, query, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, query, timeout).await,
            #[cfg(feature = "dns-over-rustls")]
            Self::Tls(t) => DnsTransport::send(t, query, timeout).await,
            #[cfg(feature = "dns-over-https")]
            Self::Https(t) => DnsTransport::send(t, query, timeout).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(_) => "UDP",
            Self::Tcp(_) => "TCP",
            #[cfg(feature = "dns-over-rustls")]
            Self::Tls(_) => "TLS",
            #[cfg(feature = "dns-over-https")]
            Self::Https(_) => "HTTPS",
        }
    }
}

pub fn create_transport(
    destination: &Destination,
    doh_method: DohMethod,
) -> Result<Transport, DomainError> {
    match destination {
        Destination::Udp { addr } => Ok(Transport::Udp(udp::UdpTransport::new(addr.clone()))),
        Destination::Tcp { addr } => Ok(Transport::Tcp(tcp::TcpTransport::new(addr.clone()))),

        #[cfg(feature = "dns-over-rustls")]
        Destination::Tls { addr, hostname } => Ok(Transport::Tls(tls::TlsTransport::new(
            addr.clone(),
            hostname.to_string(),
        ))),

        #[cfg(not(feature = "dns-over-rustls"))]
        Destination::Tls { .. } => Err(DomainError::InvalidDestination(format!(
            "TLS feature not enabled. Enable 'dns-over-rustls' feature to use: {}",
            destination
        ))),

        #[cfg(feature = "dns-over-https")]
        Destination::Https { url, .. } => Ok(Transport::Https(https::HttpsTransport::new(
            url.to_string(),
            doh_method,
        ))),

        #[cfg(not(feature = "dns-over-https"))]
        Destination::Https { url, .. } => {
            let _ = doh_method;
            Err(DomainError::InvalidDestination(format!(
                "HTTPS feature not enabled. Enable 'dns-over-https' feature to use: {}",
                url
            )))
        }
    }
}
