use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_DNS_PORT: u16 = 53;
pub const DEFAULT_TLS_PORT: u16 = 853;

/// Represents a nameserver address that may or may not be resolved to an IP.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UpstreamAddr {
    Resolved(SocketAddr),
    Unresolved { hostname: Arc<str>, port: u16 },
}

impl UpstreamAddr {
    pub fn port(&self) -> u16 {
        match self {
            UpstreamAddr::Resolved(addr) => addr.port(),
            UpstreamAddr::Unresolved { port, .. } => *port,
        }
    }

    /// Returns (hostname, port) if this address still needs a lookup.
    pub fn unresolved_parts(&self) -> Option<(&str, u16)> {
        match self {
            UpstreamAddr::Unresolved { hostname, port } => Some((hostname, *port)),
            UpstreamAddr::Resolved(_) => None,
        }
    }

    /// Host part as written by the user: the IP literal or the hostname.
    pub fn host(&self) -> String {
        match self {
            UpstreamAddr::Resolved(addr) => addr.ip().to_string(),
            UpstreamAddr::Unresolved { hostname, .. } => hostname.to_string(),
        }
    }
}

impl fmt::Display for UpstreamAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamAddr::Resolved(addr) => write!(f, "{}", addr),
            UpstreamAddr::Unresolved { hostname, port } => write!(f, "{}:{}", hostname, port),
        }
    }
}

/// Transport selector. Also the shape of the caller's mutually exclusive
/// protocol flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Udp,
    Tcp,
    Tls,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Udp => "udp",
            Scheme::Tcp => "tcp",
            Scheme::Tls => "tls",
            Scheme::Https => "https",
        }
    }

    fn default_port(&self) -> u16 {
        match self {
            Scheme::Udp | Scheme::Tcp => DEFAULT_DNS_PORT,
            Scheme::Tls => DEFAULT_TLS_PORT,
            Scheme::Https => 443,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a single query goes and over which wire protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    Udp {
        addr: UpstreamAddr,
    },
    Tcp {
        addr: UpstreamAddr,
    },
    Tls {
        addr: UpstreamAddr,
        hostname: Arc<str>,
    },
    Https {
        url: Arc<str>,
        hostname: Arc<str>,
    },
}

impl Destination {
    /// Builds a destination from a nameserver string and an optional
    /// protocol flag.
    ///
    /// A flag takes precedence over the scheme implied by the string: a bare
    /// host or an explicit `udp://`, `tcp://` or `tls://` prefix is
    /// re-targeted at the flagged protocol. `Scheme::Https` only accepts a
    /// complete `https://host/path` URL.
    pub fn resolve(target: &str, flag: Option<Scheme>) -> Result<Self, DomainError> {
        let target = target.trim();
        let target = target.strip_prefix('@').unwrap_or(target);

        if target.is_empty() {
            return Err(DomainError::InvalidDestination(
                "nameserver address is empty".to_string(),
            ));
        }

        let (explicit, rest) = split_scheme(target)?;

        let scheme = match (flag, explicit) {
            (Some(Scheme::Https), Some(Scheme::Https)) => Scheme::Https,
            (Some(Scheme::Https), _) => {
                return Err(DomainError::InvalidDestination(format!(
                    "'{}' is not a DNS-over-HTTPS URL (expected https://HOST/PATH)",
                    target
                )))
            }
            (Some(_), Some(Scheme::Https)) => {
                return Err(DomainError::InvalidDestination(format!(
                    "'{}' is an HTTPS URL but a {} transport was requested",
                    target,
                    flag.map(|s| s.as_str()).unwrap_or_default()
                )))
            }
            (Some(flagged), _) => flagged,
            (None, Some(explicit)) => explicit,
            (None, None) => Scheme::Udp,
        };

        match scheme {
            Scheme::Https => parse_https(target),
            Scheme::Udp => Ok(Destination::Udp {
                addr: parse_upstream_addr(rest, scheme)?,
            }),
            Scheme::Tcp => Ok(Destination::Tcp {
                addr: parse_upstream_addr(rest, scheme)?,
            }),
            Scheme::Tls => {
                let addr = parse_upstream_addr(rest, scheme)?;
                let hostname: Arc<str> = addr.host().into();
                Ok(Destination::Tls { addr, hostname })
            }
        }
    }

    pub fn scheme(&self) -> Scheme {
        match self {
            Destination::Udp { .. } => Scheme::Udp,
            Destination::Tcp { .. } => Scheme::Tcp,
            Destination::Tls { .. } => Scheme::Tls,
            Destination::Https { .. } => Scheme::Https,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Destination::Udp { .. } => "UDP",
            Destination::Tcp { .. } => "TCP",
            Destination::Tls { .. } => "TLS",
            Destination::Https { .. } => "HTTPS",
        }
    }

    pub fn addr(&self) -> Option<&UpstreamAddr> {
        match self {
            Destination::Udp { addr } | Destination::Tcp { addr } | Destination::Tls { addr, .. } => {
                Some(addr)
            }
            Destination::Https { .. } => None,
        }
    }

    pub fn hostname(&self) -> Option<&str> {
        match self {
            Destination::Tls { hostname, .. } | Destination::Https { hostname, .. } => {
                Some(hostname)
            }
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Destination::Https { url, .. } => Some(url),
            _ => None,
        }
    }

    /// The TCP destination a truncated UDP answer is retried against: same
    /// host, same port. `None` for every other scheme.
    pub fn truncation_fallback(&self) -> Option<Destination> {
        match self {
            Destination::Udp { addr } => Some(Destination::Tcp { addr: addr.clone() }),
            _ => None,
        }
    }
}

impl FromStr for Destination {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Destination::resolve(s, None)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Udp { addr } => write!(f, "udp://{}", addr),
            Destination::Tcp { addr } => write!(f, "tcp://{}", addr),
            Destination::Tls { addr, .. } => write!(f, "tls://{}", addr),
            Destination::Https { url, .. } => write!(f, "{}", url),
        }
    }
}

fn split_scheme(target: &str) -> Result<(Option<Scheme>, &str), DomainError> {
    let Some((prefix, rest)) = target.split_once("://") else {
        return Ok((None, target));
    };

    let scheme = match prefix.to_ascii_lowercase().as_str() {
        "udp" => Scheme::Udp,
        "tcp" => Scheme::Tcp,
        "tls" => Scheme::Tls,
        "https" => Scheme::Https,
        other => {
            return Err(DomainError::InvalidDestination(format!(
                "unknown scheme '{}' in '{}'. Expected udp://, tcp://, tls:// or https://",
                other, target
            )))
        }
    };

    Ok((Some(scheme), rest))
}

fn parse_port(port_str: &str, original: &str) -> Result<u16, DomainError> {
    match port_str.parse::<u16>() {
        Ok(0) | Err(_) => Err(DomainError::InvalidDestination(format!(
            "invalid port '{}' in '{}'",
            port_str, original
        ))),
        Ok(port) => Ok(port),
    }
}

fn is_valid_hostname(host: &str) -> bool {
    let host = host.strip_suffix('.').unwrap_or(host);
    !host.is_empty()
        && host.len() <= 253
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}

/// Parses `host`, `host:port`, `IP`, `IP:port`, `IPv6` or `[IPv6]:port`.
fn parse_upstream_addr(s: &str, scheme: Scheme) -> Result<UpstreamAddr, DomainError> {
    let invalid = || {
        DomainError::InvalidDestination(format!(
            "'{}' is not a valid host[:port] for {}",
            s, scheme
        ))
    };
    let default_port = scheme.default_port();

    if s.is_empty() || s.contains('/') {
        return Err(invalid());
    }

    if let Some(bracketed) = s.strip_prefix('[') {
        let (host, rest) = bracketed.split_once(']').ok_or_else(invalid)?;
        let ip: IpAddr = host.parse().map_err(|_| invalid())?;
        let port = match rest {
            "" => default_port,
            _ => parse_port(rest.strip_prefix(':').ok_or_else(invalid)?, s)?,
        };
        return Ok(UpstreamAddr::Resolved(SocketAddr::new(ip, port)));
    }

    if let Ok(ip) = s.parse::<IpAddr>() {
        return Ok(UpstreamAddr::Resolved(SocketAddr::new(ip, default_port)));
    }

    let (host, port) = match s.rsplit_once(':') {
        Some((host, port_str)) => (host, parse_port(port_str, s)?),
        None => (s, default_port),
    };

    if let Ok(ip) = host.parse::<IpAddr>() {
        if ip.is_ipv6() {
            // IPv6 with a port must be bracketed
            return Err(invalid());
        }
        return Ok(UpstreamAddr::Resolved(SocketAddr::new(ip, port)));
    }

    if !is_valid_hostname(host) {
        return Err(invalid());
    }

    Ok(UpstreamAddr::Unresolved {
        hostname: host.into(),
        port,
    })
}

fn parse_https(target: &str) -> Result<Destination, DomainError> {
    let invalid = |why: &str| {
        DomainError::InvalidDestination(format!("invalid DNS-over-HTTPS URL '{}': {}", target, why))
    };

    let (_, rest) = target
        .split_once("://")
        .ok_or_else(|| invalid("missing https:// scheme"))?;

    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, path) = rest.split_at(authority_end);
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    if authority.is_empty() {
        return Err(invalid("missing host"));
    }
    if !path.starts_with('/') || path.len() < 2 {
        return Err(invalid("missing path (there is no default, e.g. /dns-query)"));
    }

    let hostname = if let Some(bracketed) = authority.strip_prefix('[') {
        let (host, rest) = bracketed
            .split_once(']')
            .ok_or_else(|| invalid("unterminated IPv6 literal"))?;
        host.parse::<IpAddr>()
            .map_err(|_| invalid("bad IPv6 literal"))?;
        if let Some(port) = rest.strip_prefix(':') {
            parse_port(port, target)?;
        } else if !rest.is_empty() {
            return Err(invalid("garbage after IPv6 literal"));
        }
        host
    } else {
        let host = match authority.rsplit_once(':') {
            Some((host, port)) => {
                parse_port(port, target)?;
                host
            }
            None => authority,
        };
        if host.parse::<IpAddr>().is_err() && !is_valid_hostname(host) {
            return Err(invalid("bad host"));
        }
        host
    };

    Ok(Destination::Https {
        url: target.into(),
        hostname: hostname.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_hostname() {
        assert!(is_valid_hostname("dns.google"));
        assert!(is_valid_hostname("dns.google."));
        assert!(is_valid_hostname("localhost"));
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("bad host"));
        assert!(!is_valid_hostname("a..b"));
        assert!(!is_valid_hostname("-leading.example"));
    }

    #[test]
    fn test_split_scheme_unknown() {
        assert!(split_scheme("ftp://1.1.1.1").is_err());
        assert_eq!(split_scheme("1.1.1.1").unwrap(), (None, "1.1.1.1"));
    }
}
