//! Shared fixtures for the redis backend integration tests.
//!
//! [`Responder`] plays the switch process side: it answers every request
//! on `ASIC_STATE` from a small object map, the way the syncd daemon would.

#![allow(dead_code)]

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use sonic_sai::{
    Attribute, ChannelMessage, FdbEventData, FieldValue, Notification, NotificationHandler,
    ProfileMap, SaiApi, SaiStatus, ServiceMethodTable, StatsMode, Transfer,
};
use sonic_sairedis::protocol::{self, *};
use sonic_sairedis::{InMemoryStore, RedisSai, StateStore, KEY_SYNC_TIMEOUT_MS};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const WAIT: Duration = Duration::from_secs(3);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn services(timeout_ms: u64) -> ServiceMethodTable {
    let profile: ProfileMap = [(KEY_SYNC_TIMEOUT_MS, timeout_ms.to_string())]
        .into_iter()
        .collect();
    ServiceMethodTable::from_profile(profile)
}

#[derive(Default)]
pub struct SwitchSide {
    pub objects: HashMap<String, Vec<Attribute>>,
    pub counters: HashMap<String, HashMap<String, u64>>,
    pub requests: Vec<ChannelMessage>,
}

impl SwitchSide {
    fn answer(&mut self, msg: &ChannelMessage) -> ChannelMessage {
        self.requests.push(msg.clone());
        match self.handle(msg) {
            Ok((status, fvs)) => protocol::response(status, fvs),
            Err(status) => protocol::response(status, vec![]),
        }
    }

    fn handle(&mut self, msg: &ChannelMessage) -> Result<(SaiStatus, Vec<FieldValue>), SaiStatus> {
        let attrs = || protocol::decode_attrs(&msg.fvs).map_err(|_| SaiStatus::InvalidParameter);
        match msg.op.as_str() {
            OP_CREATE => {
                if self.objects.contains_key(&msg.key) {
                    return Err(SaiStatus::ItemAlreadyExists);
                }
                self.objects.insert(msg.key.clone(), attrs()?);
                Ok((SaiStatus::Success, vec![]))
            }
            OP_REMOVE => {
                self.objects.remove(&msg.key).ok_or(SaiStatus::ItemNotFound)?;
                Ok((SaiStatus::Success, vec![]))
            }
            OP_SET => {
                let stored = self.objects.get_mut(&msg.key).ok_or(SaiStatus::ItemNotFound)?;
                for attr in attrs()? {
                    stored.retain(|a| a.id != attr.id);
                    stored.push(attr);
                }
                Ok((SaiStatus::Success, vec![]))
            }
            OP_GET => {
                let stored = self.objects.get(&msg.key).ok_or(SaiStatus::ItemNotFound)?;
                let mut requested = attrs()?;
                let mut status = SaiStatus::Success;
                for slot in requested.iter_mut() {
                    let value = stored
                        .iter()
                        .find(|a| a.id == slot.id)
                        .map(|a| &a.value)
                        .ok_or(SaiStatus::NotImplemented)?;
                    match slot.value.fill_from(value) {
                        Ok(Transfer::Filled) => {}
                        Ok(Transfer::Overflow { .. }) => status = SaiStatus::BufferOverflow,
                        Err(_) => return Err(SaiStatus::InvalidParameter),
                    }
                }
                let fvs = protocol::encode_attrs(&requested).map_err(|_| SaiStatus::Failure)?;
                Ok((status, fvs))
            }
            OP_GET_STATS => {
                let mode = msg
                    .get_field(STATS_MODE_FIELD)
                    .ok_or(SaiStatus::InvalidParameter)
                    .and_then(|m| protocol::parse_stats_mode(m).map_err(|_| SaiStatus::InvalidParameter))?;
                let counters = self.counters.entry(msg.key.clone()).or_default();
                let fvs = msg
                    .fvs
                    .iter()
                    .filter(|(name, _)| name != STATS_MODE_FIELD)
                    .map(|(name, _)| {
                        let value = counters.get(name).copied().unwrap_or(0);
                        if mode == StatsMode::ReadAndClear {
                            counters.insert(name.clone(), 0);
                        }
                        (name.clone(), value.to_string())
                    })
                    .collect();
                Ok((SaiStatus::Success, fvs))
            }
            OP_CLEAR_STATS => {
                let counters = self.counters.entry(msg.key.clone()).or_default();
                for (name, _) in &msg.fvs {
                    counters.insert(name.clone(), 0);
                }
                Ok((SaiStatus::Success, vec![]))
            }
            OP_FLUSH_FDB => Ok((SaiStatus::Success, vec![])),
            _ => Err(SaiStatus::NotSupported),
        }
    }
}

/// Answers requests on a background thread until dropped.
pub struct Responder {
    pub side: Arc<Mutex<SwitchSide>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Responder {
    pub fn start(store: Arc<InMemoryStore>) -> Self {
        let requests = store.subscribe(ASIC_STATE_CHANNEL).unwrap();
        let side = Arc::new(Mutex::new(SwitchSide::default()));
        let running = Arc::new(AtomicBool::new(true));

        let handle = {
            let side = Arc::clone(&side);
            let running = Arc::clone(&running);
            thread::spawn(move || {
                while running.load(Ordering::SeqCst) {
                    let payload = match requests.recv_timeout(Duration::from_millis(50)) {
                        Ok(payload) => payload,
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    };
                    let msg = ChannelMessage::decode(&payload).unwrap();
                    let reply = side.lock().answer(&msg);
                    store.publish(GETRESPONSE_CHANNEL, &reply.encode()).unwrap();
                }
            })
        };

        Self {
            side,
            running,
            handle: Some(handle),
        }
    }

    pub fn set_counter(&self, key: &str, name: &str, value: u64) {
        self.side
            .lock()
            .counters
            .entry(key.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }

    pub fn last_request(&self) -> Option<ChannelMessage> {
        self.side.lock().requests.last().cloned()
    }
}

impl Drop for Responder {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Forwards FDB notifications to a channel the test can wait on.
pub struct Recorder {
    tx: Sender<Vec<FdbEventData>>,
}

impl NotificationHandler for Recorder {
    fn on_fdb_event(&self, events: &[FdbEventData]) {
        let _ = self.tx.send(events.to_vec());
    }
}

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub sai: RedisSai,
    pub responder: Responder,
    pub events: Receiver<Vec<FdbEventData>>,
}

/// An initialized backend answered by a [`Responder`].
pub fn harness() -> Harness {
    init_logging();
    let store = Arc::new(InMemoryStore::new());
    let responder = Responder::start(Arc::clone(&store));
    let sai = RedisSai::new(store.clone());
    let (tx, events) = unbounded();
    sai.initialize(services(2_000), Some(Arc::new(Recorder { tx })))
        .unwrap();

    Harness {
        store,
        sai,
        responder,
        events,
    }
}

/// Publishes a notification the way the switch process does.
pub fn publish_notification(store: &InMemoryStore, ntf: &Notification) {
    let msg = ntf.encode().unwrap();
    store.publish(NOTIFICATIONS_CHANNEL, &msg.encode()).unwrap();
}
