use ferrous_dig_domain::{DomainError, UpstreamAddr};
use std::net::SocketAddr;

/// Resolves a hostname to all its IP addresses (IPv4 + IPv6).
///
/// Runs inside the caller's exchange deadline, so it takes no timeout of
/// its own.
pub async fn resolve_all(
    hostname: &str,
    port: u16,
    server: &str,
) -> Result<Vec<SocketAddr>, DomainError> {
    let target = format!("{}:{}", hostname, port);

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host(&target)
        .await
        .map_err(|e| DomainError::NetworkError {
            server: server.to_string(),
            reason: format!("could not resolve {}: {}", hostname, e),
        })?
        .collect();

    if addrs.is_empty() {
        return Err(DomainError::NetworkError {
            server: server.to_string(),
            reason: format!("no addresses found for {}", hostname),
        });
    }

    Ok(addrs)
}

/// Socket addresses to try for an upstream, resolving it if needed.
pub async fn socket_addrs(
    addr: &UpstreamAddr,
    server: &str,
) -> Result<Vec<SocketAddr>, DomainError> {
    match addr {
        UpstreamAddr::Resolved(socket_addr) => Ok(vec![*socket_addr]),
        UpstreamAddr::Unresolved { hostname, port } => resolve_all(hostname, *port, server).await,
    }
}
