use async_trait::async_trait;
use ferrous_dig_domain::{Destination, DnsQuery, DnsResponse, DomainError};
use std::time::Duration;

/// Outcome of one dispatched query.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub response: DnsResponse,
    pub elapsed: Duration,
    /// The destination that produced `response`. Differs from the requested
    /// one only after a UDP truncation retry.
    pub answered_by: Destination,
    pub truncation_retried: bool,
}

#[async_trait]
pub trait DnsExchanger: Send + Sync {
    async fn exchange(
        &self,
        query: &DnsQuery,
        destination: &Destination,
    ) -> Result<Exchange, DomainError>;
}
