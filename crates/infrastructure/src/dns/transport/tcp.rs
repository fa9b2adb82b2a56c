//! TCP Transport for DNS queries (RFC 1035 §4.2.2, RFC 7766)
//!
//! Every message is preceded by its length as a 2-byte big-endian integer.
//! One connection per query; it is closed when the transport returns.

use super::{resolver, BodyEncoding, DnsTransport, TransportResponse};
use crate::dns::codec::EncodedQuery;
use async_trait::async_trait;
use ferrous_dig_domain::{DomainError, UpstreamAddr};
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

pub struct TcpTransport {
    upstream_addr: UpstreamAddr,
    server: String,
}

impl TcpTransport {
    pub fn new(upstream_addr: UpstreamAddr) -> Self {
        let server = format!("tcp://{}", upstream_addr);
        Self {
            upstream_addr,
            server,
        }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let mut stream = connect(&self.upstream_addr, &self.server).await?;

        send_with_length_prefix(&mut stream, message_bytes, &self.server).await?;

        debug!(
            server = %self.server,
            bytes_sent = message_bytes.len(),
            "TCP query sent"
        );

        let response_bytes = read_with_length_prefix(&mut stream, &self.server).await?;

        debug!(
            server = %self.server,
            response_len = response_bytes.len(),
            "TCP response received"
        );

        Ok(response_bytes)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
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
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

/// Opens a stream to the upstream, trying each resolved address in turn.
pub(crate) async fn connect(
    upstream_addr: &UpstreamAddr,
    server: &str,
) -> Result<TcpStream, DomainError> {
    let addrs = resolver::socket_addrs(upstream_addr, server).await?;

    let stream = TcpStream::connect(&addrs[..])
        .await
        .map_err(|e| DomainError::NetworkError {
            server: server.to_string(),
            reason: format!("connection failed: {}", e),
        })?;

    stream.set_nodelay(true).map_err(|e| DomainError::NetworkError {
        server: server.to_string(),
        reason: format!("failed to set TCP_NODELAY: {}", e),
    })?;

    Ok(stream)
}

pub(crate) async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
    server: &str,
) -> Result<(), DomainError>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        DomainError::MalformedQuery(format!(
            "message of {} bytes does not fit a 2-byte length prefix",
            message_bytes.len()
        ))
    })?;

    let write_error = |e: std::io::Error| DomainError::NetworkError {
        server: server.to_string(),
        reason: format!("failed to write DNS message: {}", e),
    };

    stream
        .write_all(&length.to_be_bytes())
        .await
        .map_err(write_error)?;
    stream.write_all(message_bytes).await.map_err(write_error)?;
    stream.flush().await.map_err(write_error)?;

    Ok(())
}

pub(crate) async fn read_with_length_prefix<S>(
    stream: &mut S,
    server: &str,
) -> Result<Vec<u8>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| read_error(server, "length prefix", e))?;

    let response_len = u16::from_be_bytes(len_buf) as usize;

    if response_len == 0 {
        return Err(DomainError::MalformedResponse {
            server: server.to_string(),
            reason: "zero-length response frame".to_string(),
        });
    }

    let mut response = vec![0u8; response_len];
    stream
        .read_exact(&mut response)
        .await
        .map_err(|e| read_error(server, "response body", e))?;

    Ok(response)
}

/// EOF before the frame is complete means the peer hung up mid-message.
fn read_error(server: &str, what: &str, e: std::io::Error) -> DomainError {
    if e.kind() == ErrorKind::UnexpectedEof {
        DomainError::ConnectionClosed {
            server: server.to_string(),
            reason: format!("connection closed while reading {}", what),
        }
    } else {
        DomainError::NetworkError {
            server: server.to_string(),
            reason: format!("failed to read {}: {}", what, e),
        }
    }
}
