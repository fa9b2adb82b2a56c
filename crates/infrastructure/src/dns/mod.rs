pub mod client;
pub mod codec;
pub mod transport;

pub use client::DnsClient;
pub use codec::{EncodedQuery, JsonMessage, MessageBuilder, ResponseParser};
