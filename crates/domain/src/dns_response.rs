use super::{EdnsOptions, Question, ResourceRecord};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    NoError,
    FormErr,
    ServFail,
    NXDomain,
    NotImp,
    Refused,
    Other(u16),
}

impl ResponseCode {
    pub fn from_u16(code: u16) -> Self {
        match code {
            0 => ResponseCode::NoError,
            1 => ResponseCode::FormErr,
            2 => ResponseCode::ServFail,
            3 => ResponseCode::NXDomain,
            4 => ResponseCode::NotImp,
            5 => ResponseCode::Refused,
            other => ResponseCode::Other(other),
        }
    }

    pub fn to_u16(&self) -> u16 {
        match self {
            ResponseCode::NoError => 0,
            ResponseCode::FormErr => 1,
            ResponseCode::ServFail => 2,
            ResponseCode::NXDomain => 3,
            ResponseCode::NotImp => 4,
            ResponseCode::Refused => 5,
            ResponseCode::Other(code) => *code,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::FormErr => "FORMERR",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::NXDomain => "NXDOMAIN",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::Other(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::Other(code) => write!(f, "RCODE{}", code),
            known => f.write_str(known.as_str()),
        }
    }
}

/// Header bits of a response, minus the ID which transports check and drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseFlags {
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub authentic_data: bool,
    pub checking_disabled: bool,
}

/// A decoded response, independent of the transport and body encoding it
/// arrived in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsResponse {
    pub flags: ResponseFlags,
    pub rcode: ResponseCode,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
    pub edns: Option<EdnsOptions>,
}

impl DnsResponse {
    pub fn is_truncated(&self) -> bool {
        self.flags.truncated
    }

    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }

    /// Verifies the response answers `asked`.
    ///
    /// Servers commonly drop the question section on FORMERR/REFUSED, so an
    /// empty section is tolerated only when the rcode is not NOERROR.
    pub fn check_question(&self, asked: &Question) -> Result<(), String> {
        match self.questions.as_slice() {
            [] if self.rcode != ResponseCode::NoError => Ok(()),
            [] => Err("response has no question section".to_string()),
            [echoed] if echoed.matches(asked) => Ok(()),
            [echoed] => Err(format!(
                "question mismatch: asked {} {} {}, got {} {} {}",
                asked.name,
                asked.class,
                asked.record_type,
                echoed.name,
                echoed.class,
                echoed.record_type
            )),
            many => Err(format!(
                "expected one question in response, got {}",
                many.len()
            )),
        }
    }
}
