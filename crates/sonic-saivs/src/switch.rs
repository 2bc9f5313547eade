//! The virtual switch backend.

use crate::clock::{Clock, SystemClock};
use crate::config::VsConfig;
use crate::context::VsContext;
use crossbeam_channel::{unbounded, Sender};
use log::{debug, info, warn};
use parking_lot::Mutex;
use sonic_sai::notification::handle_message;
use sonic_sai::{
    Attribute, ChannelMessage, EventLoop, FdbEntryKey, NotificationHandler, ObjectId, ObjectKey,
    ObjectType, SaiApi, SaiError, SaiResult, ServiceMethodTable, StatId, StatsMode,
};
use std::sync::Arc;
use std::time::Duration;

/// Cadence of the FDB aging thread.
pub const AGING_INTERVAL: Duration = Duration::from_secs(1);

struct Shared {
    state: Mutex<Option<VsContext>>,
    clock: Arc<dyn Clock>,
}

struct Workers {
    notifications: EventLoop,
    admin: EventLoop,
    aging: EventLoop,
    admin_tx: Sender<ChannelMessage>,
}

impl Workers {
    fn stop(&mut self) {
        self.aging.stop();
        self.admin.stop();
        self.notifications.stop();
    }
}

/// An in-memory switch implementing [`SaiApi`].
///
/// All calls serialize on one lock around the switch registry. Background
/// threads deliver notifications, apply admin messages and age learned
/// FDB entries.
pub struct VirtualSwitch {
    shared: Arc<Shared>,
    workers: Mutex<Option<Workers>>,
}

impl VirtualSwitch {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    /// Uses `clock` for FDB learn times and aging.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(None),
                clock,
            }),
            workers: Mutex::new(None),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.workers.lock().is_some()
    }

    /// Sender side of the administrative channel.
    pub fn admin_channel(&self) -> SaiResult<Sender<ChannelMessage>> {
        self.workers
            .lock()
            .as_ref()
            .map(|w| w.admin_tx.clone())
            .ok_or(SaiError::Uninitialized)
    }

    /// Feeds a MAC observed on `bridge_port_id` into the learning path.
    pub fn learn_fdb_entry(&self, key: &FdbEntryKey, bridge_port_id: ObjectId) -> SaiResult<()> {
        self.with_context(|ctx| ctx.learn_fdb_entry(key, bridge_port_id))
    }

    /// Runs one aging pass if the store lock is free.
    ///
    /// Returns `None` when the lock is contended or the backend is not
    /// initialized, the number of aged entries otherwise.
    pub fn age_fdb_entries(&self) -> Option<usize> {
        age_once(&self.shared)
    }

    fn with_context<T>(&self, f: impl FnOnce(&mut VsContext) -> SaiResult<T>) -> SaiResult<T> {
        let mut guard = self.shared.state.lock();
        let ctx = guard.as_mut().ok_or(SaiError::Uninitialized)?;
        f(ctx)
    }

    fn start_workers(
        &self,
        config: VsConfig,
        handler: Option<Arc<dyn NotificationHandler>>,
    ) -> SaiResult<Workers> {
        let (ntf_tx, ntf_rx) = unbounded::<ChannelMessage>();
        let (admin_tx, admin_rx) = unbounded::<ChannelMessage>();

        *self.shared.state.lock() = Some(VsContext::new(
            config,
            ntf_tx,
            Arc::clone(&self.shared.clock),
        ));

        let notifications = EventLoop::spawn("vs-notifications", ntf_rx, move |msg| {
            handle_message(handler.as_ref(), &msg)
        })?;

        let shared = Arc::clone(&self.shared);
        let admin = EventLoop::spawn("vs-admin", admin_rx, move |msg: ChannelMessage| {
            let mut guard = shared.state.lock();
            let Some(ctx) = guard.as_mut() else {
                debug!("Dropping admin {} after shutdown", msg.op);
                return;
            };
            if let Err(e) = ctx.handle_admin(&msg) {
                warn!("Admin {} {} failed: {}", msg.op, msg.key, e);
            }
        })?;

        let shared = Arc::clone(&self.shared);
        let aging = EventLoop::spawn_periodic("vs-fdb-aging", AGING_INTERVAL, move || {
            age_once(&shared);
        })?;

        Ok(Workers {
            notifications,
            admin,
            aging,
            admin_tx,
        })
    }
}

impl Default for VirtualSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for VirtualSwitch {
    fn drop(&mut self) {
        if let Some(mut workers) = self.workers.get_mut().take() {
            workers.stop();
        }
    }
}

fn age_once(shared: &Shared) -> Option<usize> {
    let Some(mut guard) = shared.state.try_lock() else {
        debug!("Store busy, skipping FDB aging cycle");
        return None;
    };
    guard.as_mut().map(VsContext::age_fdb_entries)
}

impl SaiApi for VirtualSwitch {
    fn initialize(
        &self,
        services: ServiceMethodTable,
        handler: Option<Arc<dyn NotificationHandler>>,
    ) -> SaiResult<()> {
        let mut workers = self.workers.lock();
        if workers.is_some() {
            return Err(SaiError::failure("virtual switch already initialized"));
        }
        services.validate()?;
        let config = VsConfig::from_services(&services)?;

        match self.start_workers(config, handler) {
            Ok(started) => {
                *workers = Some(started);
                info!("Virtual switch initialized");
                Ok(())
            }
            Err(e) => {
                *self.shared.state.lock() = None;
                Err(e)
            }
        }
    }

    fn shutdown(&self) -> SaiResult<()> {
        let mut workers = self.workers.lock().take().ok_or(SaiError::Uninitialized)?;
        workers.stop();
        *self.shared.state.lock() = None;
        info!("Virtual switch shut down");
        Ok(())
    }

    fn create(&self, object_type: ObjectType, switch_id: ObjectId, attrs: &[Attribute]) -> SaiResult<ObjectId> {
        self.with_context(|ctx| ctx.create(object_type, switch_id, attrs))
    }

    fn remove(&self, object_type: ObjectType, oid: ObjectId) -> SaiResult<()> {
        self.with_context(|ctx| ctx.remove(object_type, oid))
    }

    fn set(&self, object_type: ObjectType, oid: ObjectId, attr: &Attribute) -> SaiResult<()> {
        self.with_context(|ctx| ctx.set(object_type, oid, attr))
    }

    fn get(&self, object_type: ObjectType, oid: ObjectId, attrs: &mut [Attribute]) -> SaiResult<()> {
        self.with_context(|ctx| ctx.get(object_type, oid, attrs))
    }

    fn create_entry(&self, key: &ObjectKey, attrs: &[Attribute]) -> SaiResult<()> {
        self.with_context(|ctx| ctx.create_entry(key, attrs))
    }

    fn remove_entry(&self, key: &ObjectKey) -> SaiResult<()> {
        self.with_context(|ctx| ctx.remove_entry(key))
    }

    fn set_entry(&self, key: &ObjectKey, attr: &Attribute) -> SaiResult<()> {
        self.with_context(|ctx| ctx.set_entry(key, attr))
    }

    fn get_entry(&self, key: &ObjectKey, attrs: &mut [Attribute]) -> SaiResult<()> {
        self.with_context(|ctx| ctx.get_entry(key, attrs))
    }

    fn get_stats_ext(
        &self,
        object_type: ObjectType,
        oid: ObjectId,
        ids: &[StatId],
        mode: StatsMode,
    ) -> SaiResult<Vec<u64>> {
        self.with_context(|ctx| ctx.get_stats_ext(object_type, oid, ids, mode))
    }

    fn clear_stats(&self, object_type: ObjectType, oid: ObjectId, ids: &[StatId]) -> SaiResult<()> {
        self.with_context(|ctx| ctx.clear_stats(object_type, oid, ids))
    }

    fn flush_fdb_entries(&self, switch_id: ObjectId, attrs: &[Attribute]) -> SaiResult<()> {
        self.with_context(|ctx| ctx.flush_fdb_entries(switch_id, attrs))
    }
}
