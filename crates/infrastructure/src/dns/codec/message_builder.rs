//! DNS Message Builder
//!
//! Turns a domain `DnsQuery` into wire-format bytes with `hickory-proto`.

use super::type_map::{DnsClassMapper, RecordTypeMapper};
use ferrous_dig_domain::{DnsQuery, DomainError, EdnsOptions, Question};
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::Name;
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// A query ready for the wire, with what is needed to validate the reply.
#[derive(Debug, Clone)]
pub struct EncodedQuery {
    pub id: u16,
    pub bytes: Vec<u8>,
    pub question: Question,
}

pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a query with a random ID.
    pub fn build_query(query: &DnsQuery) -> Result<EncodedQuery, DomainError> {
        Self::build_query_with_id(query, fastrand::u16(..))
    }

    /// Build a query with a caller-chosen ID. DoH uses 0 (RFC 8484 §4.1).
    pub fn build_query_with_id(query: &DnsQuery, id: u16) -> Result<EncodedQuery, DomainError> {
        let question = &query.question;

        let name = Name::from_str(&question.name).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", question.name, e))
        })?;

        let mut hickory_query = Query::query(name, RecordTypeMapper::to_hickory(&question.record_type));
        hickory_query.set_query_class(DnsClassMapper::to_hickory(&question.class));

        let mut message = Message::new();
        message
            .set_id(id)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(query.recursion_desired)
            .add_query(hickory_query);

        if let Some(edns) = &query.edns {
            message.set_edns(Self::build_edns(edns));
        }

        let bytes = Self::serialize_message(&message)?;

        Ok(EncodedQuery {
            id,
            bytes,
            question: question.clone(),
        })
    }

    fn build_edns(options: &EdnsOptions) -> Edns {
        let mut edns = Edns::new();
        edns.set_max_payload(options.max_payload);
        edns.set_version(0);
        edns.set_dnssec_ok(options.dnssec_ok);
        edns
    }

    fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message
            .emit(&mut encoder)
            .map_err(|e| DomainError::MalformedQuery(format!("Failed to serialize DNS message: {}", e)))?;

        Ok(buf)
    }
}
