mod dns_exchanger;
mod nameserver_source;

pub use dns_exchanger::{DnsExchanger, Exchange};
pub use nameserver_source::NameserverSource;
