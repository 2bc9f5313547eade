//! Channel messages and the worker loops that consume them.
//!
//! Every asynchronous path in both backends (notifications, the virtual
//! switch admin channel, FDB aging, redis responses) is a [`ChannelMessage`]
//! stream drained by an [`EventLoop`] thread.

use crate::error::{SaiError, SaiResult};
use crossbeam_channel::{bounded, select, Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long a loop blocks before re-checking its run flag.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(500);

/// A field-value pair.
pub type FieldValue = (String, String);

/// Operation, key and field-values of one channel message.
///
/// The key is a composite `category:identifier`, usually an
/// [`ObjectKey`](crate::ObjectKey) in string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub op: String,
    pub key: String,
    pub fvs: Vec<FieldValue>,
}

impl ChannelMessage {
    pub fn new(op: impl Into<String>, key: impl Into<String>, fvs: Vec<FieldValue>) -> Self {
        Self {
            op: op.into(),
            key: key.into(),
            fvs,
        }
    }

    /// Returns the value for a field, if present.
    pub fn get_field(&self, field: &str) -> Option<&str> {
        self.fvs
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    /// Flattens into the list form `[key, op, field1, value1, ...]`.
    pub fn to_wire(&self) -> Vec<String> {
        let mut data = Vec::with_capacity(2 + self.fvs.len() * 2);
        data.push(self.key.clone());
        data.push(self.op.clone());
        for (f, v) in &self.fvs {
            data.push(f.clone());
            data.push(v.clone());
        }
        data
    }

    /// Parses the list form produced by [`to_wire`](Self::to_wire).
    pub fn from_wire(data: &[String]) -> SaiResult<Self> {
        if data.len() < 2 {
            return Err(SaiError::invalid_parameter(
                "channel message must have at least key and operation",
            ));
        }
        if data.len() % 2 != 0 {
            return Err(SaiError::invalid_parameter(format!(
                "channel message {} has a dangling field",
                data[0]
            )));
        }

        let fvs = data[2..]
            .chunks(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect();

        Ok(Self::new(data[1].clone(), data[0].clone(), fvs))
    }

    /// Encodes as a JSON array of strings, the payload published on a
    /// store channel.
    pub fn encode(&self) -> String {
        serde_json::Value::from(self.to_wire()).to_string()
    }

    pub fn decode(payload: &str) -> SaiResult<Self> {
        let data: Vec<String> = serde_json::from_str(payload)
            .map_err(|e| SaiError::invalid_parameter(format!("undecodable channel payload: {}", e)))?;
        Self::from_wire(&data)
    }
}

/// A worker thread draining one message source.
///
/// The thread runs until [`stop`](Self::stop) is called or the loop is
/// dropped. Stopping clears the run flag, wakes the thread and joins it.
pub struct EventLoop {
    name: String,
    running: Arc<AtomicBool>,
    wake: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl EventLoop {
    /// Spawns a loop calling `on_message` for every message of `source`.
    ///
    /// The loop also ends when every sender of `source` is gone.
    pub fn spawn<T, F>(name: impl Into<String>, source: Receiver<T>, mut on_message: F) -> SaiResult<Self>
    where
        T: Send + 'static,
        F: FnMut(T) + Send + 'static,
    {
        let name = name.into();
        let thread_name = name.clone();
        Self::start(name, move |running, wake_rx| {
            while running.load(Ordering::Acquire) {
                select! {
                    recv(source) -> msg => match msg {
                        Ok(msg) => on_message(msg),
                        Err(_) => {
                            debug!("{}: message source closed", thread_name);
                            break;
                        }
                    },
                    recv(wake_rx) -> _ => {},
                    default(POLL_TIMEOUT) => {},
                }
            }
        })
    }

    /// Spawns a loop calling `tick` once per `period`.
    pub fn spawn_periodic<F>(name: impl Into<String>, period: Duration, mut tick: F) -> SaiResult<Self>
    where
        F: FnMut() + Send + 'static,
    {
        Self::start(name.into(), move |running, wake_rx| {
            while running.load(Ordering::Acquire) {
                match wake_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        if running.load(Ordering::Acquire) {
                            tick();
                        }
                    }
                    Ok(()) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        })
    }

    fn start<B>(name: String, body: B) -> SaiResult<Self>
    where
        B: FnOnce(Arc<AtomicBool>, Receiver<()>) + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let (wake_tx, wake_rx) = bounded(1);

        let flag = Arc::clone(&running);
        let log_name = name.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                debug!("{}: started", log_name);
                body(flag, wake_rx);
                debug!("{}: exited", log_name);
            })
            .map_err(|e| SaiError::failure(format!("failed to spawn {}: {}", name, e)))?;

        info!("Started {} thread", name);
        Ok(Self {
            name,
            running,
            wake: Some(wake_tx),
            handle: Some(handle),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signals the thread and waits for it to exit.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        self.running.store(false, Ordering::Release);
        if let Some(wake) = self.wake.take() {
            // A full slot already holds a pending wake-up.
            let _ = wake.try_send(());
        }
        if handle.join().is_err() {
            warn!("{} thread panicked", self.name);
        }
        info!("Stopped {} thread", self.name);
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
