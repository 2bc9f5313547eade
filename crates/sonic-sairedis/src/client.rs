//! The redis backend.
//!
//! Calls are validated locally, turned into requests and answered by the
//! switch process. Virtual ids are allocated here, so `create` knows the new
//! id before the request leaves. One call is in flight at a time.

use crate::config::RedisConfig;
use crate::protocol::{self, *};
use crate::store::StateStore;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, info, warn};
use parking_lot::Mutex;
use sonic_sai::notification::handle_message;
use sonic_sai::{
    Attribute, ChannelMessage, EventLoop, FieldValue, NotificationHandler, ObjectId, ObjectKey,
    ObjectType, SaiApi, SaiError, SaiResult, SaiStatus, ServiceMethodTable, StatId, StatsMode,
    SwitchIndexPool,
};
use std::sync::Arc;

struct Session {
    config: RedisConfig,
    responses: Receiver<String>,
    switch_indexes: SwitchIndexPool,
    notifications: EventLoop,
}

/// A [`SaiApi`] forwarding every call through a [`StateStore`].
pub struct RedisSai {
    store: Arc<dyn StateStore>,
    session: Mutex<Option<Session>>,
}

impl RedisSai {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            session: Mutex::new(None),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Sends one request and waits for its response.
    fn call(&self, msg: ChannelMessage) -> SaiResult<(SaiStatus, Vec<FieldValue>)> {
        let guard = self.session.lock();
        let session = guard.as_ref().ok_or(SaiError::Uninitialized)?;
        self.round_trip(session, msg)
    }

    /// Like [`call`](Self::call), failing on any status but success.
    fn call_ok(&self, msg: ChannelMessage) -> SaiResult<Vec<FieldValue>> {
        let context = format!("{} {}", msg.op, msg.key);
        match self.call(msg)? {
            (SaiStatus::Success, fvs) => Ok(fvs),
            (status, _) => Err(SaiError::with_context(status, context)),
        }
    }

    fn round_trip(
        &self,
        session: &Session,
        msg: ChannelMessage,
    ) -> SaiResult<(SaiStatus, Vec<FieldValue>)> {
        for stale in session.responses.try_iter() {
            warn!("Discarding stale response {}", stale);
        }

        self.store.publish(ASIC_STATE_CHANNEL, &msg.encode())?;
        debug!("Sent {} {}", msg.op, msg.key);

        let payload = match session.responses.recv_timeout(session.config.sync_timeout) {
            Ok(payload) => payload,
            Err(RecvTimeoutError::Timeout) => {
                return Err(SaiError::failure(format!(
                    "{} {} timed out after {:?}",
                    msg.op, msg.key, session.config.sync_timeout
                )))
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(SaiError::failure("response channel closed"))
            }
        };

        let (status, fvs) = protocol::parse_response(ChannelMessage::decode(&payload)?)?;
        debug!("{} {} returned {}", msg.op, msg.key, status);
        Ok((status, fvs))
    }

    fn new_vid(&self, session: &mut Session, object_type: ObjectType, switch_id: ObjectId) -> SaiResult<ObjectId> {
        if object_type == ObjectType::Switch {
            return Ok(ObjectId::for_switch(session.switch_indexes.allocate()?));
        }
        switch_id.expect_type(ObjectType::Switch)?;
        let counter = self.store.increment(VIDCOUNTER)?;
        ObjectId::encode(switch_id.switch_index(), object_type, counter)
    }

    /// Runs a get and copies the answered values into `attrs`.
    ///
    /// An overflow answer carries the caller's list buffers with their
    /// counts set to the required sizes; those are copied back too.
    fn get_key(&self, key: &ObjectKey, attrs: &mut [Attribute]) -> SaiResult<()> {
        let msg = protocol::request(OP_GET, key, protocol::encode_attrs(attrs)?);
        let (status, fvs) = self.call(msg)?;
        let result = match status {
            SaiStatus::Success => Ok(()),
            SaiStatus::BufferOverflow => Err(SaiError::buffer_overflow(key.to_string())),
            status => return Err(SaiError::with_context(status, key.to_string())),
        };

        for answered in protocol::decode_attrs(&fvs)? {
            if let Some(slot) = attrs.iter_mut().find(|a| a.id == answered.id) {
                slot.value = answered.value;
            }
        }
        result
    }
}

impl SaiApi for RedisSai {
    fn initialize(
        &self,
        services: ServiceMethodTable,
        handler: Option<Arc<dyn NotificationHandler>>,
    ) -> SaiResult<()> {
        let mut session = self.session.lock();
        if session.is_some() {
            return Err(SaiError::failure("redis backend already initialized"));
        }
        services.validate()?;
        let config = RedisConfig::from_services(&services)?;

        let responses = self.store.subscribe(GETRESPONSE_CHANNEL)?;
        let incoming = self.store.subscribe(NOTIFICATIONS_CHANNEL)?;
        let notifications = EventLoop::spawn("sairedis-notifications", incoming, move |payload: String| {
            match ChannelMessage::decode(&payload) {
                Ok(msg) => handle_message(handler.as_ref(), &msg),
                Err(e) => warn!("Dropping undecodable notification: {}", e),
            }
        })?;

        *session = Some(Session {
            config,
            responses,
            switch_indexes: SwitchIndexPool::new(),
            notifications,
        });
        info!("Redis backend initialized");
        Ok(())
    }

    fn shutdown(&self) -> SaiResult<()> {
        let mut session = self.session.lock().take().ok_or(SaiError::Uninitialized)?;
        session.notifications.stop();
        info!("Redis backend shut down");
        Ok(())
    }

    fn create(&self, object_type: ObjectType, switch_id: ObjectId, attrs: &[Attribute]) -> SaiResult<ObjectId> {
        if !object_type.is_oid_object() {
            return Err(SaiError::invalid_parameter(format!(
                "{} is not created by object id",
                object_type
            )));
        }
        let mut guard = self.session.lock();
        let session = guard.as_mut().ok_or(SaiError::Uninitialized)?;
        let vid = self.new_vid(session, object_type, switch_id)?;
        let key = ObjectKey::Object {
            object_type,
            oid: vid,
        };
        let msg = protocol::request(OP_CREATE, &key, protocol::encode_attrs(attrs)?);
        match self.round_trip(session, msg)? {
            (SaiStatus::Success, _) => {}
            (status, _) => return Err(SaiError::with_context(status, key.to_string())),
        }
        debug!("Created {}", key);
        Ok(vid)
    }

    fn remove(&self, object_type: ObjectType, oid: ObjectId) -> SaiResult<()> {
        oid.expect_type(object_type)?;
        let key = ObjectKey::from_oid(oid)?;
        self.call_ok(protocol::request(OP_REMOVE, &key, vec![])).map(drop)
    }

    fn set(&self, object_type: ObjectType, oid: ObjectId, attr: &Attribute) -> SaiResult<()> {
        oid.expect_type(object_type)?;
        let key = ObjectKey::from_oid(oid)?;
        self.set_entry(&key, attr)
    }

    fn get(&self, object_type: ObjectType, oid: ObjectId, attrs: &mut [Attribute]) -> SaiResult<()> {
        oid.expect_type(object_type)?;
        self.get_key(&ObjectKey::from_oid(oid)?, attrs)
    }

    fn create_entry(&self, key: &ObjectKey, attrs: &[Attribute]) -> SaiResult<()> {
        let msg = protocol::request(OP_CREATE, key, protocol::encode_attrs(attrs)?);
        self.call_ok(msg).map(drop)
    }

    fn remove_entry(&self, key: &ObjectKey) -> SaiResult<()> {
        self.call_ok(protocol::request(OP_REMOVE, key, vec![])).map(drop)
    }

    fn set_entry(&self, key: &ObjectKey, attr: &Attribute) -> SaiResult<()> {
        let msg = protocol::request(OP_SET, key, protocol::encode_attrs(std::slice::from_ref(attr))?);
        self.call_ok(msg).map(drop)
    }

    fn get_entry(&self, key: &ObjectKey, attrs: &mut [Attribute]) -> SaiResult<()> {
        self.get_key(key, attrs)
    }

    fn get_stats_ext(
        &self,
        object_type: ObjectType,
        oid: ObjectId,
        ids: &[StatId],
        mode: StatsMode,
    ) -> SaiResult<Vec<u64>> {
        oid.expect_type(object_type)?;
        let key = ObjectKey::from_oid(oid)?;
        let fvs = self.call_ok(protocol::stats_request(&key, ids, mode))?;
        protocol::decode_counters(ids, &fvs)
    }

    fn clear_stats(&self, object_type: ObjectType, oid: ObjectId, ids: &[StatId]) -> SaiResult<()> {
        oid.expect_type(object_type)?;
        let key = ObjectKey::from_oid(oid)?;
        let fvs = ids
            .iter()
            .map(|id| (id.name().to_string(), String::new()))
            .collect();
        self.call_ok(protocol::request(OP_CLEAR_STATS, &key, fvs)).map(drop)
    }

    fn flush_fdb_entries(&self, switch_id: ObjectId, attrs: &[Attribute]) -> SaiResult<()> {
        switch_id.expect_type(ObjectType::Switch)?;
        let key = ObjectKey::from_oid(switch_id)?;
        let msg = protocol::request(OP_FLUSH_FDB, &key, protocol::encode_attrs(attrs)?);
        self.call_ok(msg).map(drop)
    }
}
