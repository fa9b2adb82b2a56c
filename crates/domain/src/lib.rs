//! ferrous-dig domain layer: destinations, queries, responses and errors.
pub mod config;
pub mod destination;
pub mod dns_query;
pub mod dns_record;
pub mod dns_response;
pub mod errors;

pub use config::{CliOverrides, ClientConfig, Config, ConfigError, DohMethod, LoggingConfig};
pub use destination::{Destination, Scheme, UpstreamAddr, DEFAULT_DNS_PORT, DEFAULT_TLS_PORT};
pub use dns_query::{DnsQuery, EdnsOptions, Question, DEFAULT_EDNS_PAYLOAD};
pub use dns_record::{fqdn, names_match, DnsClass, RecordData, RecordType, ResourceRecord};
pub use dns_response::{DnsResponse, ResponseCode, ResponseFlags};
pub use errors::DomainError;
