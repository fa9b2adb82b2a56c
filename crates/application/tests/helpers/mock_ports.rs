#![allow(dead_code)]

use async_trait::async_trait;
use ferrous_dig_application::ports::{DnsExchanger, Exchange, NameserverSource};
use ferrous_dig_domain::{
    Destination, DnsClass, DnsQuery, DnsResponse, DomainError, RecordData, ResourceRecord,
    ResponseCode, ResponseFlags,
};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Answers every query with a fixed A record and remembers what it was asked.
#[derive(Clone, Default)]
pub struct MockDnsExchanger {
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<(DnsQuery, Destination)>>>,
    error: Arc<Mutex<Option<DomainError>>>,
}

impl MockDnsExchanger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: DomainError) -> Self {
        let mock = Self::default();
        *mock.error.lock().unwrap() = Some(error);
        mock
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_destination(&self) -> Option<Destination> {
        self.seen.lock().unwrap().last().map(|(_, d)| d.clone())
    }

    pub fn last_query(&self) -> Option<DnsQuery> {
        self.seen.lock().unwrap().last().map(|(q, _)| q.clone())
    }
}

#[async_trait]
impl DnsExchanger for MockDnsExchanger {
    async fn exchange(
        &self,
        query: &DnsQuery,
        destination: &Destination,
    ) -> Result<Exchange, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((query.clone(), destination.clone()));

        if let Some(error) = self.error.lock().unwrap().clone() {
            return Err(error);
        }

        Ok(Exchange {
            response: a_record_response(query, Ipv4Addr::new(93, 184, 216, 34)),
            elapsed: Duration::from_millis(12),
            answered_by: destination.clone(),
            truncation_retried: false,
        })
    }
}

pub fn a_record_response(query: &DnsQuery, ip: Ipv4Addr) -> DnsResponse {
    DnsResponse {
        flags: ResponseFlags {
            recursion_desired: true,
            recursion_available: true,
            ..ResponseFlags::default()
        },
        rcode: ResponseCode::NoError,
        questions: vec![query.question.clone()],
        answers: vec![ResourceRecord::new(
            &query.question.name,
            DnsClass::IN,
            3600,
            RecordData::A(ip),
        )],
        authority: vec![],
        additional: vec![],
        edns: None,
    }
}

pub struct MockNameserverSource {
    result: Result<Vec<String>, DomainError>,
}

impl MockNameserverSource {
    pub fn with(nameservers: &[&str]) -> Self {
        Self {
            result: Ok(nameservers.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn unreadable() -> Self {
        Self {
            result: Err(DomainError::InvalidDestination(
                "could not read /etc/resolv.conf: No such file or directory".to_string(),
            )),
        }
    }
}

impl NameserverSource for MockNameserverSource {
    fn nameservers(&self) -> Result<Vec<String>, DomainError> {
        self.result.clone()
    }

    fn origin(&self) -> String {
        "/etc/resolv.conf".to_string()
    }
}
