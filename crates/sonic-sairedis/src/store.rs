//! State store used to reach the switch process.
//!
//! The backend only needs three things from the store: an atomic counter
//! for virtual ids and publish/subscribe channels for requests, responses
//! and notifications.

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;
use parking_lot::Mutex;
use sonic_sai::SaiError;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from state store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store connection error: {0}")]
    Connection(String),

    #[error("Store command error: {0}")]
    Command(String),
}

impl From<StoreError> for SaiError {
    fn from(e: StoreError) -> Self {
        SaiError::failure(e.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_connection_refusal() || e.is_connection_dropped() {
            StoreError::Connection(e.to_string())
        } else {
            StoreError::Command(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Key-value counter plus publish/subscribe.
pub trait StateStore: Send + Sync {
    /// Atomically increments `key` and returns the new value.
    fn increment(&self, key: &str) -> Result<u64>;

    fn publish(&self, channel: &str, payload: &str) -> Result<()>;

    /// Starts receiving every payload published on `channel` from now on.
    fn subscribe(&self, channel: &str) -> Result<Receiver<String>>;
}

/// Process-local store, for tests and single-process setups.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    counters: Mutex<HashMap<String, u64>>,
    subscribers: Mutex<HashMap<String, Vec<Sender<String>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, key: &str) -> u64 {
        self.counters.lock().get(key).copied().unwrap_or(0)
    }
}

impl StateStore for InMemoryStore {
    fn increment(&self, key: &str) -> Result<u64> {
        let mut counters = self.counters.lock();
        let value = counters.entry(key.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    fn publish(&self, channel: &str, payload: &str) -> Result<()> {
        let mut subscribers = self.subscribers.lock();
        if let Some(senders) = subscribers.get_mut(channel) {
            senders.retain(|tx| tx.send(payload.to_string()).is_ok());
            if senders.is_empty() {
                debug!("No subscribers left on {}", channel);
            }
        }
        Ok(())
    }

    fn subscribe(&self, channel: &str) -> Result<Receiver<String>> {
        let (tx, rx) = unbounded();
        self.subscribers
            .lock()
            .entry(channel.to_string())
            .or_default()
            .push(tx);
        Ok(rx)
    }
}

#[cfg(feature = "redis")]
pub use self::redis_store::{RedisStore, RedisStoreConfig};

#[cfg(feature = "redis")]
mod redis_store {
    use super::{Result, StateStore, StoreError};
    use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
    use log::{debug, info, warn};
    use parking_lot::Mutex;
    use redis::Commands;
    use sonic_sai::channel::POLL_TIMEOUT;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    /// ASIC_DB, where the switch process keeps its state.
    pub const ASIC_DB: u8 = 1;

    /// Connection settings for a redis server.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RedisStoreConfig {
        pub host: String,
        pub port: u16,
        pub db: u8,
    }

    impl RedisStoreConfig {
        pub fn new(host: impl Into<String>, port: u16, db: u8) -> Self {
            Self {
                host: host.into(),
                port,
                db,
            }
        }

        /// Returns the Redis connection URI.
        pub fn uri(&self) -> String {
            format!("redis://{}:{}/{}", self.host, self.port, self.db)
        }
    }

    impl Default for RedisStoreConfig {
        fn default() -> Self {
            Self::new("127.0.0.1", 6379, ASIC_DB)
        }
    }

    /// [`StateStore`] on a redis server.
    ///
    /// Commands share one connection; every subscription gets its own
    /// connection and reader thread. [`StateStore::subscribe`] returns once
    /// the server has acknowledged SUBSCRIBE. Readers exit when their
    /// receiver is dropped or, within one poll interval, when the store is.
    pub struct RedisStore {
        config: RedisStoreConfig,
        client: redis::Client,
        connection: Mutex<redis::Connection>,
        running: Arc<AtomicBool>,
    }

    impl RedisStore {
        pub fn connect(config: RedisStoreConfig) -> Result<Self> {
            let uri = config.uri();
            let client = redis::Client::open(uri.clone())
                .map_err(|e| StoreError::Connection(format!("{}: {}", uri, e)))?;
            let connection = client
                .get_connection()
                .map_err(|e| StoreError::Connection(format!("{}: {}", uri, e)))?;
            info!("Connected to Redis: {} (db={})", config.host, config.db);
            Ok(Self {
                config,
                client,
                connection: Mutex::new(connection),
                running: Arc::new(AtomicBool::new(true)),
            })
        }

        pub fn config(&self) -> &RedisStoreConfig {
            &self.config
        }
    }

    impl Drop for RedisStore {
        fn drop(&mut self) {
            self.running.store(false, Ordering::SeqCst);
        }
    }

    impl StateStore for RedisStore {
        fn increment(&self, key: &str) -> Result<u64> {
            let value: u64 = self.connection.lock().incr(key, 1)?;
            Ok(value)
        }

        fn publish(&self, channel: &str, payload: &str) -> Result<()> {
            let _: () = self.connection.lock().publish(channel, payload)?;
            Ok(())
        }

        fn subscribe(&self, channel: &str) -> Result<Receiver<String>> {
            let mut connection = self.client.get_connection()?;
            let (tx, rx) = unbounded();
            let channel = channel.to_string();
            let running = Arc::clone(&self.running);

            spawn_reader(format!("redis-sub-{}", channel), move |ready| {
                let mut pubsub = connection.as_pubsub();
                if let Err(e) = pubsub
                    .subscribe(&channel)
                    .and_then(|()| pubsub.set_read_timeout(Some(POLL_TIMEOUT)))
                {
                    warn!("SUBSCRIBE {} failed: {}", channel, e);
                    let _ = ready.send(Err(e.into()));
                    return;
                }
                debug!("Subscribed to {}", channel);
                let _ = ready.send(Ok(()));

                pump(&running, &tx, || match pubsub.get_message() {
                    Ok(msg) => match msg.get_payload::<String>() {
                        Ok(payload) => Poll::Message(payload),
                        Err(e) => {
                            warn!("Dropping undecodable payload on {}: {}", channel, e);
                            Poll::Idle
                        }
                    },
                    Err(e) if e.is_timeout() => Poll::Idle,
                    Err(e) => {
                        warn!("Subscription {} ended: {}", channel, e);
                        Poll::Closed
                    }
                });
                debug!("Unsubscribed from {}", channel);
            })?;
            Ok(rx)
        }
    }

    /// One read from a subscription.
    enum Poll {
        Message(String),
        Idle,
        Closed,
    }

    /// Forwards messages from `next` to `tx` while `running` holds.
    fn pump(running: &AtomicBool, tx: &Sender<String>, mut next: impl FnMut() -> Poll) {
        while running.load(Ordering::SeqCst) {
            match next() {
                Poll::Message(payload) => {
                    if tx.send(payload).is_err() {
                        break;
                    }
                }
                Poll::Idle => {}
                Poll::Closed => break,
            }
        }
    }

    /// Runs `reader` on a named thread and waits for its ready signal.
    fn spawn_reader<F>(name: String, reader: F) -> Result<()>
    where
        F: FnOnce(Sender<Result<()>>) + Send + 'static,
    {
        let (ready_tx, ready_rx) = bounded(1);
        thread::Builder::new()
            .name(name.clone())
            .spawn(move || reader(ready_tx))
            .map_err(|e| StoreError::Connection(format!("failed to spawn {}: {}", name, e)))?;
        ready_rx
            .recv()
            .map_err(|_| StoreError::Connection(format!("{} exited before subscribing", name)))?
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use pretty_assertions::assert_eq;
        use std::time::Duration;

        #[test]
        fn test_connect_refused() {
            match RedisStore::connect(RedisStoreConfig::new("127.0.0.1", 1, ASIC_DB)) {
                Err(StoreError::Connection(msg)) => {
                    assert!(msg.starts_with("redis://127.0.0.1:1/1"))
                }
                Err(e) => panic!("unexpected {}", e),
                Ok(_) => panic!("connected to port 1"),
            }
        }

        #[test]
        fn test_spawn_reader_waits_for_ready() {
            let subscribed = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&subscribed);
            spawn_reader("ready".to_string(), move |ready| {
                thread::sleep(Duration::from_millis(50));
                flag.store(true, Ordering::SeqCst);
                let _ = ready.send(Ok(()));
            })
            .unwrap();
            assert!(subscribed.load(Ordering::SeqCst));
        }

        #[test]
        fn test_spawn_reader_reports_failure() {
            let err = spawn_reader("fails".to_string(), |ready| {
                let _ = ready.send(Err(StoreError::Command("no such channel".to_string())));
            })
            .unwrap_err();
            assert_eq!(err.to_string(), "Store command error: no such channel");

            let err = spawn_reader("silent".to_string(), |_| {}).unwrap_err();
            assert!(matches!(err, StoreError::Connection(_)));
        }

        #[test]
        fn test_pump_stops_when_store_is_dropped() {
            let running = Arc::new(AtomicBool::new(true));
            let (tx, rx) = unbounded();
            let reader = {
                let running = Arc::clone(&running);
                thread::spawn(move || {
                    pump(&running, &tx, || {
                        thread::sleep(Duration::from_millis(10));
                        Poll::Idle
                    })
                })
            };

            running.store(false, Ordering::SeqCst);
            reader.join().unwrap();
            assert!(rx.try_recv().is_err());
        }

        #[test]
        fn test_pump_forwards_until_closed() {
            let running = AtomicBool::new(true);
            let (tx, rx) = unbounded();
            let mut script = vec![
                Poll::Closed,
                Poll::Message("two".into()),
                Poll::Idle,
                Poll::Message("one".into()),
            ];
            pump(&running, &tx, || script.pop().unwrap_or(Poll::Closed));
            assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec!["one", "two"]);
        }

        #[test]
        fn test_uri() {
            assert_eq!(RedisStoreConfig::default().uri(), "redis://127.0.0.1:6379/1");
            assert_eq!(
                RedisStoreConfig::new("10.0.0.1", 6380, 4).uri(),
                "redis://10.0.0.1:6380/4"
            );
        }
    }
}
