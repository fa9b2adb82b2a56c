//! UDP Transport for DNS queries (RFC 1035 §4.2.1)
//!
//! Standard DNS transport. Messages are sent as-is (no framing) over a
//! connected socket, so only the queried server's datagrams are accepted.
//! If the response has the TC (truncated) bit set, the dispatcher retries via TCP.

use super::{resolver, BodyEncoding, DnsTransport, TransportResponse};
use crate::dns::codec::EncodedQuery;
use async_trait::async_trait;
use ferrous_dig_domain::{DomainError, UpstreamAddr};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

/// Largest datagram a UDP socket can deliver.
const MAX_UDP_RESPONSE_SIZE: usize = 65535;

/// DNS over UDP transport
pub struct UdpTransport {
    upstream_addr: UpstreamAddr,
    server: String,
}

impl UdpTransport {
    pub fn new(upstream_addr: UpstreamAddr) -> Self {
        let server = format!("udp://{}", upstream_addr);
        Self {
            upstream_addr,
            server,
        }
    }

    fn network_error(&self, what: &str, e: std::io::Error) -> DomainError {
        DomainError::NetworkError {
            server: self.server.clone(),
            reason: format!("{}: {}", what, e),
        }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let addrs = resolver::socket_addrs(&self.upstream_addr, &self.server).await?;
        let Some(&server_addr) = addrs.first() else {
            return Err(DomainError::NetworkError {
                server: self.server.clone(),
                reason: "no address to send to".to_string(),
            });
        };

        // Bind to ephemeral port (0 = OS assigns)
        let bind_addr = if server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| self.network_error("failed to bind UDP socket", e))?;

        // Connected: the kernel filters foreign sources and reports ICMP
        // unreachable as ConnectionRefused on the next send/recv.
        socket
            .connect(server_addr)
            .await
            .map_err(|e| self.network_error("failed to connect UDP socket", e))?;

        let bytes_sent = socket
            .send(message_bytes)
            .await
            .map_err(|e| self.network_error("failed to send UDP query", e))?;

        debug!(
            server = %self.server,
            bytes_sent = bytes_sent,
            "UDP query sent"
        );

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        let bytes_received = socket
            .recv(&mut recv_buf)
            .await
            .map_err(|e| self.network_error("failed to receive UDP response", e))?;
        recv_buf.truncate(bytes_received);

        debug!(
            server = %self.server,
            response_len = bytes_received,
            "UDP response received"
        );

        Ok(recv_buf)
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
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
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
