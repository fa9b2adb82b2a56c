use super::type_map::{DnsClassMapper, RecordTypeMapper};
use ferrous_dig_domain::{
    fqdn, DnsResponse, DomainError, EdnsOptions, Question, RecordData, ResourceRecord,
    ResponseCode, ResponseFlags,
};
use hickory_proto::op::{Message, MessageType};
use hickory_proto::rr::{RData, Record};
use tracing::debug;

/// A decoded wire response and the ID it carried.
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    pub id: u16,
    pub response: DnsResponse,
}

pub struct ResponseParser;

impl ResponseParser {
    /// Decodes a wire-format response. `server` only labels the error.
    pub fn parse(response_bytes: &[u8], server: &str) -> Result<ParsedResponse, DomainError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            DomainError::MalformedResponse {
                server: server.to_string(),
                reason: format!("failed to decode DNS message: {}", e),
            }
        })?;

        if message.message_type() != MessageType::Response {
            return Err(DomainError::MalformedResponse {
                server: server.to_string(),
                reason: "QR bit not set".to_string(),
            });
        }

        let flags = ResponseFlags {
            authoritative: message.authoritative(),
            truncated: message.truncated(),
            recursion_desired: message.recursion_desired(),
            recursion_available: message.recursion_available(),
            authentic_data: message.authentic_data(),
            checking_disabled: message.checking_disabled(),
        };

        let rcode = ResponseCode::from_u16(u16::from(message.response_code()));

        let questions = message
            .queries()
            .iter()
            .map(|q| {
                Question::new(
                    &q.name().to_utf8(),
                    RecordTypeMapper::from_hickory(q.query_type()),
                    DnsClassMapper::from_hickory(q.query_class()),
                )
            })
            .collect();

        let edns = message.extensions().as_ref().map(|edns| EdnsOptions {
            max_payload: edns.max_payload(),
            dnssec_ok: edns.flags().dnssec_ok,
        });

        let response = DnsResponse {
            flags,
            rcode,
            questions,
            answers: Self::convert_records(message.answers()),
            authority: Self::convert_records(message.name_servers()),
            additional: Self::convert_records(message.additionals()),
            edns,
        };

        debug!(
            id = message.id(),
            rcode = %response.rcode,
            answers = response.answers.len(),
            authority = response.authority.len(),
            truncated = response.flags.truncated,
            "DNS response parsed"
        );

        Ok(ParsedResponse {
            id: message.id(),
            response,
        })
    }

    fn convert_records(records: &[Record]) -> Vec<ResourceRecord> {
        records.iter().map(Self::convert_record).collect()
    }

    fn convert_record(record: &Record) -> ResourceRecord {
        let data = Self::convert_rdata(record);
        ResourceRecord {
            name: fqdn(&record.name().to_utf8()),
            record_type: RecordTypeMapper::from_hickory(record.record_type()),
            class: DnsClassMapper::from_hickory(record.dns_class()),
            ttl: record.ttl(),
            data,
        }
    }

    fn convert_rdata(record: &Record) -> RecordData {
        match record.data() {
            RData::A(a) => RecordData::A(a.0),
            RData::AAAA(aaaa) => RecordData::AAAA(aaaa.0),
            RData::CNAME(name) => RecordData::CNAME(name.0.to_utf8()),
            RData::NS(name) => RecordData::NS(name.0.to_utf8()),
            RData::PTR(name) => RecordData::PTR(name.0.to_utf8()),
            RData::MX(mx) => RecordData::MX {
                preference: mx.preference(),
                exchange: mx.exchange().to_utf8(),
            },
            RData::TXT(txt) => RecordData::TXT(
                txt.txt_data()
                    .iter()
                    .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                    .collect(),
            ),
            RData::SRV(srv) => RecordData::SRV {
                priority: srv.priority(),
                weight: srv.weight(),
                port: srv.port(),
                target: srv.target().to_utf8(),
            },
            // Timers are i32 in hickory but unsigned on the wire (RFC 1035 §3.3.13).
            RData::SOA(soa) => RecordData::SOA {
                mname: soa.mname().to_utf8(),
                rname: soa.rname().to_utf8(),
                serial: soa.serial(),
                refresh: soa.refresh() as u32,
                retry: soa.retry() as u32,
                expire: soa.expire() as u32,
                minimum: soa.minimum(),
            },
            other => RecordData::Unsupported {
                record_type: RecordTypeMapper::from_hickory(record.record_type()),
                data: other.to_string(),
            },
        }
    }
}
