use super::{DnsClass, RecordType};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// One entry of an answer, authority or additional section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub name: String,

    pub record_type: RecordType,

    pub class: DnsClass,

    pub ttl: u32,

    pub data: RecordData,
}

impl ResourceRecord {
    pub fn new(name: &str, class: DnsClass, ttl: u32, data: RecordData) -> Self {
        Self {
            name: fqdn(name),
            record_type: data.record_type(),
            class,
            ttl,
            data,
        }
    }
}

/// Typed record payloads. Types without a dedicated variant land in
/// `Unsupported` with their presentation-format text, never dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    CNAME(String),
    NS(String),
    PTR(String),
    MX {
        preference: u16,
        exchange: String,
    },
    TXT(Vec<String>),
    SRV {
        priority: u16,
        weight: u16,
        port: u16,
        target: String,
    },
    SOA {
        mname: String,
        rname: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    Unsupported {
        record_type: RecordType,
        data: String,
    },
}

impl RecordData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::AAAA(_) => RecordType::AAAA,
            RecordData::CNAME(_) => RecordType::CNAME,
            RecordData::NS(_) => RecordType::NS,
            RecordData::PTR(_) => RecordType::PTR,
            RecordData::MX { .. } => RecordType::MX,
            RecordData::TXT(_) => RecordType::TXT,
            RecordData::SRV { .. } => RecordType::SRV,
            RecordData::SOA { .. } => RecordType::SOA,
            RecordData::Unsupported { record_type, .. } => *record_type,
        }
    }
}

/// Presentation format, as in a zone file.
impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::A(ip) => write!(f, "{}", ip),
            RecordData::AAAA(ip) => write!(f, "{}", ip),
            RecordData::CNAME(name) | RecordData::NS(name) | RecordData::PTR(name) => {
                f.write_str(name)
            }
            RecordData::MX {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            RecordData::TXT(strings) => {
                let quoted: Vec<String> = strings.iter().map(|s| format!("{:?}", s)).collect();
                f.write_str(&quoted.join(" "))
            }
            RecordData::SRV {
                priority,
                weight,
                port,
                target,
            } => write!(f, "{} {} {} {}", priority, weight, port, target),
            RecordData::SOA {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => write!(
                f,
                "{} {} {} {} {} {} {}",
                mname, rname, serial, refresh, retry, expire, minimum
            ),
            RecordData::Unsupported { data, .. } => f.write_str(data),
        }
    }
}

/// Absolute form of a domain name: always ends with a dot.
pub fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

/// Case-insensitive comparison that ignores the trailing root dot.
pub fn names_match(a: &str, b: &str) -> bool {
    a.trim_end_matches('.')
        .eq_ignore_ascii_case(b.trim_end_matches('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fqdn() {
        assert_eq!(fqdn("example.com"), "example.com.");
        assert_eq!(fqdn("example.com."), "example.com.");
        assert_eq!(fqdn("."), ".");
    }

    #[test]
    fn test_names_match() {
        assert!(names_match("Example.COM.", "example.com"));
        assert!(!names_match("example.org.", "example.com."));
    }

    #[test]
    fn test_record_type_follows_data() {
        let record = ResourceRecord::new(
            "mail.example.com",
            DnsClass::IN,
            300,
            RecordData::MX {
                preference: 10,
                exchange: "mx.example.com.".to_string(),
            },
        );
        assert_eq!(record.record_type, RecordType::MX);
        assert_eq!(record.name, "mail.example.com.");
        assert_eq!(record.data.to_string(), "10 mx.example.com.");
    }
}
