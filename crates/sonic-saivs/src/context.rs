//! The lock-guarded virtual switch context.
//!
//! One [`VsContext`] exists between `initialize` and `shutdown`. It sits
//! behind the process lock; every method here assumes that lock is held,
//! so internal paths (bootstrap, flush, aging, the admin channel) call each
//! other directly instead of re-entering the public API.

use crate::clock::Clock;
use crate::config::VsConfig;
use crate::state::SwitchState;
use crossbeam_channel::Sender;
use log::{debug, warn};
use sonic_sai::{
    ChannelMessage, Notification, ObjectId, ObjectType, OidAllocator, SaiError, SaiResult,
    SwitchIndexPool,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Switches by switch index.
#[derive(Debug, Default)]
pub struct SwitchRegistry {
    switches: BTreeMap<u8, SwitchState>,
}

impl SwitchRegistry {
    pub fn insert(&mut self, index: u8, state: SwitchState) {
        self.switches.insert(index, state);
    }

    pub fn remove(&mut self, switch_id: ObjectId) -> SaiResult<SwitchState> {
        let index = Self::index_of(switch_id)?;
        self.switches
            .remove(&index)
            .ok_or_else(|| SaiError::not_found(switch_id.to_string()))
    }

    pub fn get(&self, switch_id: ObjectId) -> SaiResult<&SwitchState> {
        let index = Self::index_of(switch_id)?;
        self.switches
            .get(&index)
            .ok_or_else(|| SaiError::not_found(switch_id.to_string()))
    }

    pub fn get_mut(&mut self, switch_id: ObjectId) -> SaiResult<&mut SwitchState> {
        let index = Self::index_of(switch_id)?;
        self.switches
            .get_mut(&index)
            .ok_or_else(|| SaiError::not_found(switch_id.to_string()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SwitchState> {
        self.switches.values_mut()
    }

    pub fn len(&self) -> usize {
        self.switches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }

    fn index_of(switch_id: ObjectId) -> SaiResult<u8> {
        switch_id.expect_type(ObjectType::Switch)?;
        Ok(switch_id.switch_index())
    }
}

/// Everything guarded by the process lock.
pub struct VsContext {
    pub(crate) config: VsConfig,
    pub(crate) registry: SwitchRegistry,
    pub(crate) oids: OidAllocator,
    pub(crate) switch_indexes: SwitchIndexPool,
    pub(crate) unittests_enabled: bool,
    notifications: Sender<ChannelMessage>,
    clock: Arc<dyn Clock>,
}

impl VsContext {
    pub fn new(config: VsConfig, notifications: Sender<ChannelMessage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            registry: SwitchRegistry::default(),
            oids: OidAllocator::new(),
            switch_indexes: SwitchIndexPool::new(),
            unittests_enabled: false,
            notifications,
            clock,
        }
    }

    pub fn config(&self) -> &VsConfig {
        &self.config
    }

    pub fn registry(&self) -> &SwitchRegistry {
        &self.registry
    }

    pub(crate) fn now(&self) -> u64 {
        self.clock.now_secs()
    }

    /// Queues a notification for the notification thread.
    pub(crate) fn notify(&self, ntf: Notification) {
        let msg = match ntf.encode() {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Dropping {} notification: {}", ntf.op(), e);
                return;
            }
        };
        debug!("Queueing {} for {}", msg.op, msg.key);
        if self.notifications.send(msg).is_err() {
            debug!("Notification thread gone, dropping {}", ntf.op());
        }
    }
}
