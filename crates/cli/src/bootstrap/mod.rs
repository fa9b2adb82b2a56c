mod logging;

pub use logging::init_logging;

use ferrous_dig_domain::{CliOverrides, Config};
use tracing::debug;

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides)?;
    debug!(
        timeout_ms = config.client.timeout_ms,
        edns_payload = config.client.edns_payload,
        doh_method = %config.client.doh_method,
        "Configuration loaded"
    );
    Ok(config)
}
