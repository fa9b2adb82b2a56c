//! The client dispatcher: one query, one destination, at most one
//! truncation retry.

use super::codec::{EncodedQuery, MessageBuilder};
use super::transport::create_transport;
use async_trait::async_trait;
use ferrous_dig_application::ports::{DnsExchanger, Exchange};
use ferrous_dig_domain::{ClientConfig, Destination, DnsQuery, DnsResponse, DomainError};
use std::time::Instant;
use tracing::{debug, info};

pub struct DnsClient {
    config: ClientConfig,
}

impl DnsClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub async fn exchange(
        &self,
        query: &DnsQuery,
        destination: &Destination,
    ) -> Result<Exchange, DomainError> {
        let query = self.with_edns(query);
        let start = Instant::now();

        let mut response = self.exchange_once(&query, destination).await?;
        let mut answered_by = destination.clone();
        let mut truncation_retried = false;

        if response.is_truncated() {
            if let Some(fallback) = destination.truncation_fallback() {
                info!(
                    server = %destination,
                    retry = %fallback,
                    "Truncated UDP response, retrying over TCP"
                );
                response = self.exchange_once(&query, &fallback).await?;
                answered_by = fallback;
                truncation_retried = true;
            }
        }

        let elapsed = start.elapsed();

        response
            .check_question(&query.question)
            .map_err(|reason| DomainError::MalformedResponse {
                server: answered_by.to_string(),
                reason,
            })?;

        Ok(Exchange {
            response,
            elapsed,
            answered_by,
            truncation_retried,
        })
    }

    /// EDNS(0) from the configuration, unless the caller already set one.
    fn with_edns(&self, query: &DnsQuery) -> DnsQuery {
        match query.edns {
            Some(_) => query.clone(),
            None => query.clone().with_edns(self.config.edns()),
        }
    }

    fn encode(query: &DnsQuery, destination: &Destination) -> Result<EncodedQuery, DomainError> {
        match destination {
            Destination::Https { .. } => MessageBuilder::build_query_with_id(query, 0),
            _ => MessageBuilder::build_query(query),
        }
    }

    async fn exchange_once(
        &self,
        query: &DnsQuery,
        destination: &Destination,
    ) -> Result<DnsResponse, DomainError> {
        let transport = create_transport(destination, self.config.doh_method)?;
        let encoded = Self::encode(query, destination)?;

        debug!(
            server = %destination,
            protocol = transport.protocol_name(),
            id = encoded.id,
            domain = %query.domain(),
            record_type = %query.record_type(),
            "Sending query"
        );

        let raw = transport.send(&encoded, self.config.timeout()).await?;

        debug!(
            server = %destination,
            protocol = raw.protocol_used,
            response_len = raw.bytes.len(),
            encoding = ?raw.encoding,
            "Response received"
        );

        raw.decode(&encoded, &destination.to_string())
    }
}

#[async_trait]
impl DnsExchanger for DnsClient {
    async fn exchange(
        &self,
        query: &DnsQuery,
        destination: &Destination,
    ) -> Result<Exchange, DomainError> {
        DnsClient::exchange(self, query, destination).await
    }
}
