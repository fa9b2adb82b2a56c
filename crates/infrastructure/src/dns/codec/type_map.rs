//! Mapping between the domain's `RecordType`/`DnsClass` and hickory's.
//!
//! Both sides keep an `Unknown(u16)` escape hatch, so the conversion goes
//! through the numeric code and never loses a type.

use ferrous_dig_domain::{DnsClass, RecordType};
use hickory_proto::rr::{DNSClass as HickoryClass, RecordType as HickoryRecordType};

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    /// Domain → hickory, for building queries.
    pub fn to_hickory(record_type: &RecordType) -> HickoryRecordType {
        HickoryRecordType::from(record_type.to_u16())
    }

    /// Hickory → domain, for decoding responses.
    pub fn from_hickory(hickory_type: HickoryRecordType) -> RecordType {
        RecordType::from_u16(u16::from(hickory_type))
    }
}

pub struct DnsClassMapper;

impl DnsClassMapper {
    pub fn to_hickory(class: &DnsClass) -> HickoryClass {
        match class {
            DnsClass::IN => HickoryClass::IN,
            DnsClass::CH => HickoryClass::CH,
            DnsClass::HS => HickoryClass::HS,
            DnsClass::NONE => HickoryClass::NONE,
            DnsClass::ANY => HickoryClass::ANY,
            DnsClass::Unknown(code) => HickoryClass::Unknown(*code),
        }
    }

    pub fn from_hickory(class: HickoryClass) -> DnsClass {
        DnsClass::from_u16(u16::from(class))
    }
}
