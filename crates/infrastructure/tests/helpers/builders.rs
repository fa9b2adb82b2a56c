#![allow(dead_code)]

use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::Ipv4Addr;
use std::str::FromStr;

pub const EXAMPLE_IP: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);
pub const EXAMPLE_TTL: u32 = 3600;

/// A response skeleton echoing the query's ID, flags and question.
pub fn reply_to(query_bytes: &[u8]) -> Message {
    let query = Message::from_vec(query_bytes).expect("mock received an undecodable query");
    let mut reply = Message::new();
    reply
        .set_id(query.id())
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(query.recursion_desired())
        .set_recursion_available(true)
        .add_queries(query.queries().to_vec());
    reply
}

pub fn a_record_reply(query_bytes: &[u8]) -> Vec<u8> {
    let mut reply = reply_to(query_bytes);
    let name = reply.queries()[0].name().clone();
    reply.add_answer(Record::from_rdata(
        name,
        EXAMPLE_TTL,
        RData::A(A(EXAMPLE_IP)),
    ));
    reply.to_vec().unwrap()
}

/// TC=1 with an empty answer section, as a server that ran out of room.
pub fn truncated_reply(query_bytes: &[u8]) -> Vec<u8> {
    let mut reply = reply_to(query_bytes);
    reply.set_truncated(true);
    reply.to_vec().unwrap()
}

pub fn wrong_id_reply(query_bytes: &[u8]) -> Vec<u8> {
    let mut reply = Message::from_vec(&a_record_reply(query_bytes)).unwrap();
    let id = reply.id().wrapping_add(1);
    reply.set_id(id);
    reply.to_vec().unwrap()
}

pub fn wrong_question_reply(query_bytes: &[u8]) -> Vec<u8> {
    let query = Message::from_vec(query_bytes).unwrap();
    let mut reply = Message::new();
    reply
        .set_id(query.id())
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .add_query(Query::query(
            Name::from_str("attacker.example.").unwrap(),
            RecordType::A,
        ));
    reply.to_vec().unwrap()
}

/// The DoH JSON body equivalent to `a_record_reply` for `name`.
pub fn a_record_json(name: &str) -> String {
    format!(
        r#"{{"Status":0,"TC":false,"RD":true,"RA":true,"AD":false,"CD":false,
"Question":[{{"name":"{name}","type":1}}],
"Answer":[{{"name":"{name}","type":1,"TTL":{ttl},"data":"{ip}"}}]}}"#,
        name = name,
        ttl = EXAMPLE_TTL,
        ip = EXAMPLE_IP
    )
}
