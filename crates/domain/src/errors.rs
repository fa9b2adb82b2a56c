use thiserror::Error;

/// Every failure a lookup can end with.
///
/// Transport variants carry `server`, the destination rendered with its
/// scheme (`tcp://8.8.8.8:53`, `https://dns.google/dns-query`), so a single
/// failed invocation is diagnosable from the message alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    #[error("Invalid query type: {0}")]
    InvalidQueryType(String),

    #[error("Invalid query class: {0}")]
    InvalidQueryClass(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Failed to encode query: {0}")]
    MalformedQuery(String),

    #[error("Timeout waiting for {server}")]
    Timeout { server: String },

    #[error("Network error talking to {server}: {reason}")]
    NetworkError { server: String, reason: String },

    #[error("TLS handshake with {server} failed: {reason}")]
    HandshakeError { server: String, reason: String },

    #[error("{server} returned HTTP {status}")]
    HttpError { server: String, status: u16 },

    #[error("Malformed response from {server}: {reason}")]
    MalformedResponse { server: String, reason: String },

    #[error("Connection closed by {server}: {reason}")]
    ConnectionClosed { server: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    /// True for failures that happened after a transport was constructed.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            DomainError::Timeout { .. }
                | DomainError::NetworkError { .. }
                | DomainError::HandshakeError { .. }
                | DomainError::HttpError { .. }
                | DomainError::MalformedResponse { .. }
                | DomainError::ConnectionClosed { .. }
        )
    }
}
