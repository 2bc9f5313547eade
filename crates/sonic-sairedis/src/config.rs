//! Profile settings of the redis backend.

use log::info;
use sonic_sai::{SaiError, SaiResult, ServiceMethodTable};
use std::time::Duration;

pub const KEY_SYNC_TIMEOUT_MS: &str = "SAI_REDIS_SYNC_TIMEOUT_MS";

pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    /// How long a call waits for its response.
    pub sync_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
        }
    }
}

impl RedisConfig {
    pub fn from_services(services: &ServiceMethodTable) -> SaiResult<Self> {
        let mut config = Self::default();
        if let Some(value) = services.get_value(KEY_SYNC_TIMEOUT_MS) {
            let ms: u64 = value.trim().parse().map_err(|e| {
                SaiError::invalid_parameter(format!("{}={}: {}", KEY_SYNC_TIMEOUT_MS, value, e))
            })?;
            config.sync_timeout = Duration::from_millis(ms);
        }
        info!("Redis backend sync timeout {:?}", config.sync_timeout);
        Ok(config)
    }
}
