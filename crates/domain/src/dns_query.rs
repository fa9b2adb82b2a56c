use super::{fqdn, names_match, DnsClass, DomainError, RecordType};
use std::sync::Arc;

pub const DEFAULT_EDNS_PAYLOAD: u16 = 4096;

/// EDNS(0) pseudo-record advertised with a query (RFC 6891).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdnsOptions {
    pub max_payload: u16,
    pub dnssec_ok: bool,
}

impl Default for EdnsOptions {
    fn default() -> Self {
        Self {
            max_payload: DEFAULT_EDNS_PAYLOAD,
            dnssec_ok: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub record_type: RecordType,
    pub class: DnsClass,
}

impl Question {
    pub fn new(name: &str, record_type: RecordType, class: DnsClass) -> Self {
        Self {
            name: fqdn(name),
            record_type,
            class,
        }
    }

    /// Echo check: case-insensitive name, identical type and class.
    pub fn matches(&self, other: &Question) -> bool {
        names_match(&self.name, &other.name)
            && self.record_type == other.record_type
            && self.class == other.class
    }
}

/// A query with exactly one question. Immutable once handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    pub question: Question,
    pub edns: Option<EdnsOptions>,
    pub recursion_desired: bool,
}

impl DnsQuery {
    pub fn new(domain: impl Into<Arc<str>>, record_type: RecordType, class: DnsClass) -> Self {
        let domain: Arc<str> = domain.into();
        Self {
            question: Question::new(&domain, record_type, class),
            edns: None,
            recursion_desired: true,
        }
    }

    /// Validates user-supplied type and class strings before anything touches
    /// the network.
    pub fn parse(domain: &str, record_type: &str, class: &str) -> Result<Self, DomainError> {
        let record_type: RecordType = record_type
            .parse()
            .map_err(|_| DomainError::InvalidQueryType(record_type.to_string()))?;
        let class: DnsClass = class
            .parse()
            .map_err(|_| DomainError::InvalidQueryClass(class.to_string()))?;

        if domain.trim().is_empty() {
            return Err(DomainError::InvalidDomainName(
                "query name is empty".to_string(),
            ));
        }

        Ok(Self::new(domain.trim(), record_type, class))
    }

    pub fn with_edns(mut self, edns: EdnsOptions) -> Self {
        self.edns = Some(edns);
        self
    }

    pub fn domain(&self) -> &str {
        &self.question.name
    }

    pub fn record_type(&self) -> RecordType {
        self.question.record_type
    }
}
