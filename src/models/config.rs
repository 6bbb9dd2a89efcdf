//! Configuration model loaded from external sources.

use serde::Deserialize;

fn default_token_ttl_days() -> i64 {
    90
}

fn default_dispatch_interval_secs() -> u64 {
    60
}

#[derive(Clone, Debug, Deserialize)]
/// Settings shared by the HTTP server and the event worker.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// Endpoint of the emailer's subscriber socket campaigns are published to.
    pub zmq_emailer_pub: String,
    /// Endpoint publishing delivery events back from the emailer.
    pub zmq_events_sub: String,
    /// HS256 secret shared with the hosted auth provider.
    pub jwt_secret: String,
    pub webhook_secret: String,
    pub unsubscribe_secret: String,
    pub unsubscribe_base_url: String,
    #[serde(default = "default_token_ttl_days")]
    pub unsubscribe_token_ttl_days: i64,
    #[serde(default = "default_dispatch_interval_secs")]
    pub dispatch_interval_secs: u64,
}

#[cfg(feature = "server")]
impl ServerConfig {
    /// Loads `config/default.yaml`, the optional `config/{APP_ENV}.yaml`
    /// profile (defaults to `local`) and `APP_*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".into());

        config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(config::Environment::with_prefix("APP"))
            .build()?
            .try_deserialize::<ServerConfig>()
    }
}
