//! Glue between the domain types and `hickory-proto` wire messages, plus the
//! DoH JSON body format.

pub mod json;
pub mod message_builder;
pub mod response_parser;
pub mod type_map;

pub use json::{JsonMessage, JsonQuestion, JsonRecord};
pub use message_builder::{EncodedQuery, MessageBuilder};
pub use response_parser::{ParsedResponse, ResponseParser};
pub use type_map::{DnsClassMapper, RecordTypeMapper};
