use crate::ports::{DnsExchanger, Exchange, NameserverSource};
use ferrous_dig_domain::{Destination, DnsQuery, DomainError, Scheme};
use std::sync::Arc;
use tracing::debug;

/// Everything one invocation asks for, as typed by the user.
#[derive(Debug, Clone)]
pub struct LookupRequest {
    pub name: String,
    pub record_type: String,
    pub class: String,
    /// `None` falls back to the system nameserver.
    pub nameserver: Option<String>,
    pub transport: Option<Scheme>,
}

impl LookupRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: "A".to_string(),
            class: "IN".to_string(),
            nameserver: None,
            transport: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub query: DnsQuery,
    pub destination: Destination,
    /// Set when the nameserver came from the system configuration.
    pub system_nameserver: Option<String>,
    pub exchange: Exchange,
}

pub struct LookupUseCase {
    exchanger: Arc<dyn DnsExchanger>,
    nameservers: Arc<dyn NameserverSource>,
}

impl LookupUseCase {
    pub fn new(exchanger: Arc<dyn DnsExchanger>, nameservers: Arc<dyn NameserverSource>) -> Self {
        Self {
            exchanger,
            nameservers,
        }
    }

    pub async fn execute(&self, request: &LookupRequest) -> Result<LookupOutcome, DomainError> {
        // Type and class are checked before any destination or socket exists.
        let query = DnsQuery::parse(&request.name, &request.record_type, &request.class)?;

        let (target, system_nameserver) = match &request.nameserver {
            Some(nameserver) => (nameserver.clone(), None),
            None => {
                let system = self.system_nameserver()?;
                (system.clone(), Some(system))
            }
        };

        let destination = Destination::resolve(&target, request.transport)?;

        debug!(
            domain = %query.domain(),
            record_type = %query.record_type(),
            server = %destination,
            "Dispatching lookup"
        );

        let exchange = self.exchanger.exchange(&query, &destination).await?;

        Ok(LookupOutcome {
            query,
            destination,
            system_nameserver,
            exchange,
        })
    }

    fn system_nameserver(&self) -> Result<String, DomainError> {
        let origin = self.nameservers.origin();
        let nameservers = self.nameservers.nameservers()?;

        nameservers.into_iter().next().ok_or_else(|| {
            DomainError::InvalidDestination(format!(
                "no nameserver given and none listed in {}",
                origin
            ))
        })
    }
}
