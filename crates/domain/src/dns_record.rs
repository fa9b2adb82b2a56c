mod class;
mod record;
mod record_type;

pub use class::DnsClass;
pub use record::{fqdn, names_match, RecordData, ResourceRecord};
pub use record_type::RecordType;
