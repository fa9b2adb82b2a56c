use super::ConfigError;
use crate::{EdnsOptions, DEFAULT_EDNS_PAYLOAD};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Smallest payload a DNS/UDP responder is always allowed to send (RFC 1035).
const MIN_UDP_PAYLOAD: u16 = 512;

/// How DNS-over-HTTPS requests are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DohMethod {
    /// RFC 8484 POST with an `application/dns-message` body.
    #[default]
    Post,
    /// RFC 8484 GET with a base64url `dns` parameter.
    Get,
    /// JSON API GET with `name` and `type` parameters.
    Json,
}

impl DohMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DohMethod::Post => "post",
            DohMethod::Get => "get",
            DohMethod::Json => "json",
        }
    }
}

impl fmt::Display for DohMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DohMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "post" => Ok(DohMethod::Post),
            "get" => Ok(DohMethod::Get),
            "json" => Ok(DohMethod::Json),
            _ => Err(format!("Unknown DoH method '{}'. Expected post, get or json", s)),
        }
    }
}

/// Immutable settings shared by every transport of one invocation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_edns_payload")]
    pub edns_payload: u16,

    #[serde(default)]
    pub dnssec_ok: bool,

    #[serde(default)]
    pub doh_method: DohMethod,

    /// Where the system nameserver is read from when none is given.
    #[serde(default = "default_resolv_conf")]
    pub resolv_conf: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            edns_payload: default_edns_payload(),
            dnssec_ok: false,
            doh_method: DohMethod::default(),
            resolv_conf: default_resolv_conf(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn edns(&self) -> EdnsOptions {
        EdnsOptions {
            max_payload: self.edns_payload,
            dnssec_ok: self.dnssec_ok,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "client.timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.edns_payload < MIN_UDP_PAYLOAD {
            return Err(ConfigError::Validation(format!(
                "client.edns_payload must be at least {} (got {})",
                MIN_UDP_PAYLOAD, self.edns_payload
            )));
        }
        Ok(())
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_edns_payload() -> u16 {
    DEFAULT_EDNS_PAYLOAD
}

fn default_resolv_conf() -> String {
    "/etc/resolv.conf".to_string()
}
