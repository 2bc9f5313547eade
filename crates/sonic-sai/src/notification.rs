//! Switch notifications.
//!
//! Notifications travel as [`ChannelMessage`]s: the op names the kind, the
//! key is the originating switch and the `data` field holds the JSON
//! payload. The notification thread decodes them and calls the registered
//! [`NotificationHandler`].

use crate::attr::Attribute;
use crate::channel::ChannelMessage;
use crate::enums::{FdbEventType, PortEventType, PortOperStatus, SwitchOperStatus};
use crate::error::{SaiError, SaiResult};
use crate::key::{FdbEntryKey, ObjectKey};
use crate::oid::ObjectId;
use crate::types::ObjectType;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DATA_FIELD: &str = "data";

/// One entry of an FDB event notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FdbEventData {
    pub event_type: FdbEventType,
    pub fdb_entry: FdbEntryKey,
    pub attrs: Vec<Attribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortOperStatusData {
    pub port_id: ObjectId,
    pub status: PortOperStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortEventData {
    pub port_id: ObjectId,
    pub event: PortEventType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketEventData {
    pub switch_id: ObjectId,
    pub packet: Vec<u8>,
    pub attrs: Vec<Attribute>,
}

/// A decoded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    SwitchStateChange {
        switch_id: ObjectId,
        status: SwitchOperStatus,
    },
    FdbEvent(Vec<FdbEventData>),
    PortStateChange(Vec<PortOperStatusData>),
    PortEvent(Vec<PortEventData>),
    SwitchShutdownRequest {
        switch_id: ObjectId,
    },
    PacketEvent(PacketEventData),
}

#[derive(Serialize, Deserialize)]
struct SwitchStatePayload {
    switch_id: ObjectId,
    status: SwitchOperStatus,
}

impl Notification {
    pub const SWITCH_STATE_CHANGE: &'static str = "switch_state_change";
    pub const FDB_EVENT: &'static str = "fdb_event";
    pub const PORT_STATE_CHANGE: &'static str = "port_state_change";
    pub const PORT_EVENT: &'static str = "port_event";
    pub const SWITCH_SHUTDOWN_REQUEST: &'static str = "switch_shutdown_request";
    pub const PACKET_EVENT: &'static str = "packet_event";

    /// The channel op naming this notification kind.
    pub fn op(&self) -> &'static str {
        match self {
            Notification::SwitchStateChange { .. } => Self::SWITCH_STATE_CHANGE,
            Notification::FdbEvent(_) => Self::FDB_EVENT,
            Notification::PortStateChange(_) => Self::PORT_STATE_CHANGE,
            Notification::PortEvent(_) => Self::PORT_EVENT,
            Notification::SwitchShutdownRequest { .. } => Self::SWITCH_SHUTDOWN_REQUEST,
            Notification::PacketEvent(_) => Self::PACKET_EVENT,
        }
    }

    /// The switch the notification originates from.
    pub fn switch_id(&self) -> ObjectId {
        match self {
            Notification::SwitchStateChange { switch_id, .. }
            | Notification::SwitchShutdownRequest { switch_id } => *switch_id,
            Notification::FdbEvent(events) => events
                .first()
                .map(|e| e.fdb_entry.switch_id)
                .unwrap_or(ObjectId::NULL),
            Notification::PortStateChange(ports) => ports
                .first()
                .map(|p| p.port_id.switch_id())
                .unwrap_or(ObjectId::NULL),
            Notification::PortEvent(ports) => ports
                .first()
                .map(|p| p.port_id.switch_id())
                .unwrap_or(ObjectId::NULL),
            Notification::PacketEvent(p) => p.switch_id,
        }
    }

    pub fn encode(&self) -> SaiResult<ChannelMessage> {
        let data = match self {
            Notification::SwitchStateChange { switch_id, status } => {
                serde_json::to_string(&SwitchStatePayload {
                    switch_id: *switch_id,
                    status: *status,
                })
            }
            Notification::FdbEvent(events) => serde_json::to_string(events),
            Notification::PortStateChange(ports) => serde_json::to_string(ports),
            Notification::PortEvent(ports) => serde_json::to_string(ports),
            Notification::SwitchShutdownRequest { switch_id } => serde_json::to_string(switch_id),
            Notification::PacketEvent(p) => serde_json::to_string(p),
        }
        .map_err(|e| SaiError::failure(format!("failed to encode {}: {}", self.op(), e)))?;

        let switch_id = self.switch_id();
        let key = if switch_id.is_null() {
            ObjectType::Switch.name().to_string()
        } else {
            ObjectKey::Object {
                object_type: ObjectType::Switch,
                oid: switch_id,
            }
            .to_string()
        };

        Ok(ChannelMessage::new(
            self.op(),
            key,
            vec![(DATA_FIELD.to_string(), data)],
        ))
    }

    pub fn decode(msg: &ChannelMessage) -> SaiResult<Self> {
        let data = msg.get_field(DATA_FIELD).ok_or_else(|| {
            SaiError::invalid_parameter(format!("{} notification without data", msg.op))
        })?;
        let bad = |e: serde_json::Error| {
            SaiError::invalid_parameter(format!("undecodable {} notification: {}", msg.op, e))
        };

        let ntf = match msg.op.as_str() {
            Self::SWITCH_STATE_CHANGE => {
                let p: SwitchStatePayload = serde_json::from_str(data).map_err(bad)?;
                Notification::SwitchStateChange {
                    switch_id: p.switch_id,
                    status: p.status,
                }
            }
            Self::FDB_EVENT => Notification::FdbEvent(serde_json::from_str(data).map_err(bad)?),
            Self::PORT_STATE_CHANGE => {
                Notification::PortStateChange(serde_json::from_str(data).map_err(bad)?)
            }
            Self::PORT_EVENT => Notification::PortEvent(serde_json::from_str(data).map_err(bad)?),
            Self::SWITCH_SHUTDOWN_REQUEST => Notification::SwitchShutdownRequest {
                switch_id: serde_json::from_str(data).map_err(bad)?,
            },
            Self::PACKET_EVENT => Notification::PacketEvent(serde_json::from_str(data).map_err(bad)?),
            other => {
                return Err(SaiError::not_implemented(format!("notification {}", other)));
            }
        };
        Ok(ntf)
    }
}

/// Callbacks invoked on the notification thread.
///
/// Every method defaults to a no-op so a handler only implements the events
/// it cares about.
pub trait NotificationHandler: Send + Sync {
    fn on_switch_state_change(&self, _switch_id: ObjectId, _status: SwitchOperStatus) {}

    fn on_fdb_event(&self, _events: &[FdbEventData]) {}

    fn on_port_state_change(&self, _ports: &[PortOperStatusData]) {}

    fn on_port_event(&self, _ports: &[PortEventData]) {}

    fn on_switch_shutdown_request(&self, _switch_id: ObjectId) {}

    fn on_packet_event(&self, _packet: &PacketEventData) {}
}

/// Calls the handler method matching a notification.
pub fn dispatch(handler: &dyn NotificationHandler, ntf: &Notification) {
    match ntf {
        Notification::SwitchStateChange { switch_id, status } => {
            handler.on_switch_state_change(*switch_id, *status)
        }
        Notification::FdbEvent(events) => handler.on_fdb_event(events),
        Notification::PortStateChange(ports) => handler.on_port_state_change(ports),
        Notification::PortEvent(ports) => handler.on_port_event(ports),
        Notification::SwitchShutdownRequest { switch_id } => {
            handler.on_switch_shutdown_request(*switch_id)
        }
        Notification::PacketEvent(packet) => handler.on_packet_event(packet),
    }
}

/// Decodes a channel message and hands it to the handler.
///
/// Undecodable messages and unknown ops are logged and dropped; without a
/// handler, decoded notifications are dropped too.
pub fn handle_message(handler: Option<&Arc<dyn NotificationHandler>>, msg: &ChannelMessage) {
    let ntf = match Notification::decode(msg) {
        Ok(ntf) => ntf,
        Err(e) => {
            warn!("Dropping notification {} {}: {}", msg.op, msg.key, e);
            return;
        }
    };

    match handler {
        Some(handler) => dispatch(handler.as_ref(), &ntf),
        None => debug!("No handler registered, dropping {}", ntf.op()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::FdbEntryAttr;
    use crate::mac::MacAddress;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        fdb: Mutex<Vec<FdbEventData>>,
        shutdowns: Mutex<Vec<ObjectId>>,
    }

    impl NotificationHandler for Recorder {
        fn on_fdb_event(&self, events: &[FdbEventData]) {
            self.fdb.lock().unwrap().extend_from_slice(events);
        }

        fn on_switch_shutdown_request(&self, switch_id: ObjectId) {
            self.shutdowns.lock().unwrap().push(switch_id);
        }
    }

    fn sample_fdb_event() -> Notification {
        let switch_id = ObjectId::for_switch(0);
        Notification::FdbEvent(vec![FdbEventData {
            event_type: FdbEventType::Learned,
            fdb_entry: FdbEntryKey::new(
                switch_id,
                MacAddress::new([0, 1, 2, 3, 4, 5]),
                ObjectId::encode(0, ObjectType::Vlan, 1).unwrap(),
            ),
            attrs: vec![Attribute::new(
                FdbEntryAttr::BridgePortId,
                ObjectId::encode(0, ObjectType::BridgePort, 2).unwrap(),
            )],
        }])
    }

    #[test]
    fn test_encode_decode() {
        let ntf = sample_fdb_event();
        let msg = ntf.encode().unwrap();
        assert_eq!(msg.op, "fdb_event");
        assert_eq!(msg.key, "SAI_OBJECT_TYPE_SWITCH:oid:0x21000000000000");
        assert_eq!(Notification::decode(&msg).unwrap(), ntf);
    }

    #[test]
    fn test_dispatch_routes_by_kind() {
        let recorder = Arc::new(Recorder::default());
        let handler: Arc<dyn NotificationHandler> = recorder.clone();

        handle_message(Some(&handler), &sample_fdb_event().encode().unwrap());
        let shutdown = Notification::SwitchShutdownRequest {
            switch_id: ObjectId::for_switch(2),
        };
        handle_message(Some(&handler), &shutdown.encode().unwrap());

        assert_eq!(recorder.fdb.lock().unwrap().len(), 1);
        assert_eq!(*recorder.shutdowns.lock().unwrap(), vec![ObjectId::for_switch(2)]);
    }

    #[test]
    fn test_unknown_op_dropped() {
        let recorder = Arc::new(Recorder::default());
        let handler: Arc<dyn NotificationHandler> = recorder.clone();
        let msg = ChannelMessage::new("bogus", "SAI_OBJECT_TYPE_SWITCH", vec![("data".into(), "{}".into())]);
        assert!(Notification::decode(&msg).is_err());
        handle_message(Some(&handler), &msg);
        handle_message(None, &sample_fdb_event().encode().unwrap());
        assert!(recorder.fdb.lock().unwrap().is_empty());
    }
}
