//! Redis SAI backend.
//!
//! [`RedisSai`] implements [`sonic_sai::SaiApi`] by serializing each call
//! onto the `ASIC_STATE` channel of a [`StateStore`] and waiting for the
//! matching `GETRESPONSE`. Notifications published by the switch process
//! on `NOTIFICATIONS` are decoded and handed to the registered handler on a
//! dedicated thread.
//!
//! ```no_run
//! # #[cfg(feature = "redis")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use sonic_sai::{ObjectId, ObjectType, ProfileMap, SaiApi, ServiceMethodTable};
//! use sonic_sairedis::{RedisSai, RedisStore, RedisStoreConfig};
//! use std::sync::Arc;
//!
//! let store = RedisStore::connect(RedisStoreConfig::default())?;
//! let sai = RedisSai::new(Arc::new(store));
//! sai.initialize(ServiceMethodTable::from_profile(ProfileMap::default()), None)?;
//! let switch_id = sai.create(ObjectType::Switch, ObjectId::NULL, &[])?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "redis"))]
//! # fn main() {}
//! ```

pub mod client;
pub mod config;
pub mod protocol;
pub mod store;

pub use client::RedisSai;
pub use config::{RedisConfig, DEFAULT_SYNC_TIMEOUT, KEY_SYNC_TIMEOUT_MS};
pub use store::{InMemoryStore, StateStore, StoreError};

#[cfg(feature = "redis")]
pub use store::{RedisStore, RedisStoreConfig};
