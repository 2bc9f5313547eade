//! Shared SAI object model for the sairedis and saivs backends.
//!
//! This crate holds everything both backends agree on: status codes, object
//! types and ids, attribute ids and values, object keys, stat ids, the
//! notification model, the channel message format with its worker loop,
//! and the [`SaiApi`] trait itself.
//!
//! # Architecture
//!
//! - [`error`]: status codes and the [`SaiError`] type
//! - [`types`], [`oid`], [`key`]: how objects are named
//! - [`attr`], [`enums`], [`stats`]: what objects carry
//! - [`notification`], [`channel`]: asynchronous events
//! - [`api`]: the backend trait, bulk helpers and the service method table
//!
//! # Example
//!
//! ```
//! use sonic_sai::{ObjectId, ObjectType};
//!
//! let oid = ObjectId::encode(1, ObjectType::Port, 42).unwrap();
//! assert_eq!(oid.object_type(), Some(ObjectType::Port));
//! assert_eq!(oid.switch_id(), ObjectId::for_switch(1));
//! ```

pub mod api;
pub mod attr;
pub mod channel;
pub mod enums;
pub mod error;
pub mod key;
pub mod mac;
pub mod notification;
pub mod oid;
pub mod stats;
pub mod types;

pub use api::{BulkOpMode, ProfileMap, SaiApi, ServiceMethodTable};
pub use attr::{AttrId, AttrValue, Attribute, SaiList, Transfer, ValueKind};
pub use channel::{ChannelMessage, EventLoop, FieldValue};
pub use error::{SaiError, SaiResult, SaiStatus};
pub use key::{FdbEntryKey, IpPrefix, NeighborEntryKey, ObjectKey, RouteEntryKey};
pub use mac::MacAddress;
pub use notification::{
    FdbEventData, Notification, NotificationHandler, PacketEventData, PortEventData,
    PortOperStatusData,
};
pub use oid::{ObjectId, OidAllocator, SwitchIndexPool};
pub use stats::{StatId, StatsMode};
pub use types::ObjectType;
