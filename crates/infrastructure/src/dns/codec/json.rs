//! DoH JSON bodies (`application/dns-json`).
//!
//! The format is the one served by the public JSON DNS APIs:
//!
//! ```text
//! {"Status":0,"TC":false,"RD":true,"RA":true,"AD":false,"CD":false,
//!  "Question":[{"name":"example.com.","type":1}],
//!  "Answer":[{"name":"example.com.","type":1,"TTL":3600,"data":"93.184.216.34"}]}
//! ```
//!
//! Classes are not part of the format; decoding takes them from the question
//! that was asked. Encoding adds them back so printed output is unambiguous.

use ferrous_dig_domain::{
    fqdn, DnsClass, DnsResponse, DomainError, Question, RecordData, RecordType, ResourceRecord,
    ResponseCode, ResponseFlags,
};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonMessage {
    #[serde(rename = "Status")]
    pub status: u16,

    #[serde(rename = "TC", default)]
    pub truncated: bool,

    #[serde(rename = "RD", default)]
    pub recursion_desired: bool,

    #[serde(rename = "RA", default)]
    pub recursion_available: bool,

    #[serde(rename = "AD", default)]
    pub authentic_data: bool,

    #[serde(rename = "CD", default)]
    pub checking_disabled: bool,

    #[serde(rename = "Question", default)]
    pub question: Vec<JsonQuestion>,

    #[serde(rename = "Answer", default, skip_serializing_if = "Vec::is_empty")]
    pub answer: Vec<JsonRecord>,

    #[serde(rename = "Authority", default, skip_serializing_if = "Vec::is_empty")]
    pub authority: Vec<JsonRecord>,

    #[serde(rename = "Additional", default, skip_serializing_if = "Vec::is_empty")]
    pub additional: Vec<JsonRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonQuestion {
    pub name: String,

    #[serde(rename = "type")]
    pub record_type: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRecord {
    pub name: String,

    #[serde(rename = "type")]
    pub record_type: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<u16>,

    #[serde(rename = "TTL", default)]
    pub ttl: u32,

    pub data: String,
}

impl JsonMessage {
    /// Decodes a DoH JSON body into the shape a wire response decodes to.
    pub fn decode(body: &[u8], asked: &Question, server: &str) -> Result<DnsResponse, DomainError> {
        let message: JsonMessage =
            serde_json::from_slice(body).map_err(|e| DomainError::MalformedResponse {
                server: server.to_string(),
                reason: format!("invalid DNS JSON body: {}", e),
            })?;

        message
            .into_response(asked.class)
            .map_err(|reason| DomainError::MalformedResponse {
                server: server.to_string(),
                reason,
            })
    }

    /// Maps the JSON structure onto a `DnsResponse`. Missing classes are
    /// filled in with `class`.
    pub fn into_response(self, class: DnsClass) -> Result<DnsResponse, String> {
        let class_of = |code: Option<u16>| code.map(DnsClass::from_u16).unwrap_or(class);

        let questions = self
            .question
            .iter()
            .map(|q| {
                Question::new(
                    &q.name,
                    RecordType::from_u16(q.record_type),
                    class_of(q.class),
                )
            })
            .collect();

        let convert = |records: Vec<JsonRecord>| -> Result<Vec<ResourceRecord>, String> {
            records
                .into_iter()
                .map(|r| {
                    let data = parse_record_data(RecordType::from_u16(r.record_type), &r.data)?;
                    Ok(ResourceRecord::new(&r.name, class_of(r.class), r.ttl, data))
                })
                .collect()
        };

        Ok(DnsResponse {
            flags: ResponseFlags {
                authoritative: false,
                truncated: self.truncated,
                recursion_desired: self.recursion_desired,
                recursion_available: self.recursion_available,
                authentic_data: self.authentic_data,
                checking_disabled: self.checking_disabled,
            },
            rcode: ResponseCode::from_u16(self.status),
            questions,
            answers: convert(self.answer)?,
            authority: convert(self.authority)?,
            additional: convert(self.additional)?,
            edns: None,
        })
    }

    /// The JSON rendering of a response, with classes included.
    pub fn from_response(response: &DnsResponse) -> Self {
        let records = |records: &[ResourceRecord]| -> Vec<JsonRecord> {
            records
                .iter()
                .map(|r| JsonRecord {
                    name: r.name.clone(),
                    record_type: r.record_type.to_u16(),
                    class: Some(r.class.to_u16()),
                    ttl: r.ttl,
                    data: r.data.to_string(),
                })
                .collect()
        };

        Self {
            status: response.rcode.to_u16(),
            truncated: response.flags.truncated,
            recursion_desired: response.flags.recursion_desired,
            recursion_available: response.flags.recursion_available,
            authentic_data: response.flags.authentic_data,
            checking_disabled: response.flags.checking_disabled,
            question: response
                .questions
                .iter()
                .map(|q| JsonQuestion {
                    name: q.name.clone(),
                    record_type: q.record_type.to_u16(),
                    class: Some(q.class.to_u16()),
                })
                .collect(),
            answer: records(&response.answers),
            authority: records(&response.authority),
            additional: records(&response.additional),
        }
    }
}

/// Parses the presentation-format `data` string of a JSON record.
fn parse_record_data(record_type: RecordType, data: &str) -> Result<RecordData, String> {
    let invalid = || format!("invalid {} data '{}'", record_type, data);
    let fields: Vec<&str> = data.split_whitespace().collect();

    let parsed = match record_type {
        RecordType::A => RecordData::A(data.trim().parse::<Ipv4Addr>().map_err(|_| invalid())?),
        RecordType::AAAA => {
            RecordData::AAAA(data.trim().parse::<Ipv6Addr>().map_err(|_| invalid())?)
        }
        RecordType::CNAME => RecordData::CNAME(fqdn(data.trim())),
        RecordType::NS => RecordData::NS(fqdn(data.trim())),
        RecordType::PTR => RecordData::PTR(fqdn(data.trim())),
        RecordType::MX => match fields.as_slice() {
            [preference, exchange] => RecordData::MX {
                preference: preference.parse().map_err(|_| invalid())?,
                exchange: fqdn(exchange),
            },
            _ => return Err(invalid()),
        },
        RecordType::TXT => RecordData::TXT(parse_txt_strings(data)),
        RecordType::SRV => match fields.as_slice() {
            [priority, weight, port, target] => RecordData::SRV {
                priority: priority.parse().map_err(|_| invalid())?,
                weight: weight.parse().map_err(|_| invalid())?,
                port: port.parse().map_err(|_| invalid())?,
                target: fqdn(target),
            },
            _ => return Err(invalid()),
        },
        RecordType::SOA => match fields.as_slice() {
            [mname, rname, serial, refresh, retry, expire, minimum] => RecordData::SOA {
                mname: fqdn(mname),
                rname: fqdn(rname),
                serial: serial.parse().map_err(|_| invalid())?,
                refresh: refresh.parse().map_err(|_| invalid())?,
                retry: retry.parse().map_err(|_| invalid())?,
                expire: expire.parse().map_err(|_| invalid())?,
                minimum: minimum.parse().map_err(|_| invalid())?,
            },
            _ => return Err(invalid()),
        },
        other => RecordData::Unsupported {
            record_type: other,
            data: data.to_string(),
        },
    };

    Ok(parsed)
}

/// TXT data arrives either bare (`v=spf1 -all`) or as one or more quoted
/// character-strings (`"v=spf1" "-all"`).
fn parse_txt_strings(data: &str) -> Vec<String> {
    let trimmed = data.trim();
    if !trimmed.starts_with('"') {
        return vec![trimmed.to_string()];
    }

    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = trimmed.chars();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', false) => in_quotes = true,
            ('"', true) => {
                strings.push(std::mem::take(&mut current));
                in_quotes = false;
            }
            ('\\', true) => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            (c, true) => current.push(c),
            (_, false) => {}
        }
    }

    if in_quotes {
        strings.push(current);
    }

    strings
}
