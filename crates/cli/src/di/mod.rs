use ferrous_dig_application::use_cases::LookupUseCase;
use ferrous_dig_domain::Config;
use ferrous_dig_infrastructure::dns::DnsClient;
use ferrous_dig_infrastructure::system::ResolvConf;
use std::sync::Arc;

pub struct UseCases {
    pub lookup: Arc<LookupUseCase>,
}

impl UseCases {
    pub fn new(config: &Config) -> Self {
        let client = Arc::new(DnsClient::new(config.client.clone()));
        let resolv_conf = Arc::new(ResolvConf::new(config.client.resolv_conf.clone()));

        Self {
            lookup: Arc::new(LookupUseCase::new(client, resolv_conf)),
        }
    }
}
