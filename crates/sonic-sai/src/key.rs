//! Object keys.
//!
//! Objects are addressed either by an [`ObjectId`] or, for the entry
//! types, by a structural key. [`ObjectKey`] covers both and gives each
//! object one canonical string form, which is what the object store and
//! the channel protocol index by.

use crate::error::{SaiError, SaiResult};
use crate::mac::MacAddress;
use crate::oid::ObjectId;
use crate::types::ObjectType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// An IP prefix used as a route destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpPrefix {
    addr: IpAddr,
    prefix_len: u8,
}

impl IpPrefix {
    pub fn new(addr: IpAddr, prefix_len: u8) -> SaiResult<Self> {
        let max = if addr.is_ipv4() { 32 } else { 128 };
        if prefix_len > max {
            return Err(SaiError::invalid_parameter(format!(
                "prefix length {} exceeds {} for {}",
                prefix_len, max, addr
            )));
        }
        Ok(Self { addr, prefix_len })
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

impl FromStr for IpPrefix {
    type Err = SaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SaiError::invalid_parameter(format!("invalid IP prefix {}", s));
        let (addr, len) = s.split_once('/').ok_or_else(invalid)?;
        let addr: IpAddr = addr.parse().map_err(|_| invalid())?;
        let len: u8 = len.parse().map_err(|_| invalid())?;
        IpPrefix::new(addr, len)
    }
}

impl TryFrom<String> for IpPrefix {
    type Error = SaiError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IpPrefix> for String {
    fn from(p: IpPrefix) -> String {
        p.to_string()
    }
}

/// FDB entry key: a MAC address within a bridge or VLAN domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FdbEntryKey {
    pub switch_id: ObjectId,
    pub mac: MacAddress,
    #[serde(rename = "bvid")]
    pub bv_id: ObjectId,
}

impl FdbEntryKey {
    pub fn new(switch_id: ObjectId, mac: MacAddress, bv_id: ObjectId) -> Self {
        Self {
            switch_id,
            mac,
            bv_id,
        }
    }
}

/// Route entry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteEntryKey {
    pub switch_id: ObjectId,
    #[serde(rename = "vr")]
    pub vr_id: ObjectId,
    #[serde(rename = "dest")]
    pub destination: IpPrefix,
}

/// Neighbor entry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NeighborEntryKey {
    pub switch_id: ObjectId,
    #[serde(rename = "rif")]
    pub rif_id: ObjectId,
    #[serde(rename = "ip")]
    pub ip_address: IpAddr,
}

/// Key of any object in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKey {
    Object {
        object_type: ObjectType,
        oid: ObjectId,
    },
    Fdb(FdbEntryKey),
    Route(RouteEntryKey),
    Neighbor(NeighborEntryKey),
}

impl ObjectKey {
    /// Key of an id-addressed object; the type is taken from the id bits.
    pub fn from_oid(oid: ObjectId) -> SaiResult<Self> {
        match oid.object_type() {
            Some(ObjectType::Null) => Err(SaiError::invalid_parameter("null object id")),
            Some(object_type) if object_type.is_oid_object() => {
                Ok(ObjectKey::Object { object_type, oid })
            }
            _ => Err(SaiError::invalid_object_id(format!(
                "{} does not name an object",
                oid
            ))),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectKey::Object { object_type, .. } => *object_type,
            ObjectKey::Fdb(_) => ObjectType::FdbEntry,
            ObjectKey::Route(_) => ObjectType::RouteEntry,
            ObjectKey::Neighbor(_) => ObjectType::NeighborEntry,
        }
    }

    /// The switch the object belongs to.
    pub fn switch_id(&self) -> ObjectId {
        match self {
            ObjectKey::Object { oid, .. } => oid.switch_id(),
            ObjectKey::Fdb(k) => k.switch_id,
            ObjectKey::Route(k) => k.switch_id,
            ObjectKey::Neighbor(k) => k.switch_id,
        }
    }

    pub fn oid(&self) -> Option<ObjectId> {
        match self {
            ObjectKey::Object { oid, .. } => Some(*oid),
            _ => None,
        }
    }

    /// Canonical serialized form of the object part of the key.
    ///
    /// Ids serialize as `oid:0x...`, entry keys as compact JSON.
    pub fn serialize_id(&self) -> SaiResult<String> {
        let json = match self {
            ObjectKey::Object { oid, .. } => return Ok(oid.to_string()),
            ObjectKey::Fdb(k) => serde_json::to_string(k),
            ObjectKey::Route(k) => serde_json::to_string(k),
            ObjectKey::Neighbor(k) => serde_json::to_string(k),
        };
        json.map_err(|e| SaiError::failure(format!("serializing {} key: {}", self.object_type(), e)))
    }

    /// Parses the object part of a key for the given type.
    pub fn deserialize_id(object_type: ObjectType, id: &str) -> SaiResult<Self> {
        let bad_key = |e: serde_json::Error| {
            SaiError::invalid_parameter(format!("invalid {} key {}: {}", object_type, id, e))
        };
        match object_type {
            ObjectType::FdbEntry => serde_json::from_str(id).map(ObjectKey::Fdb).map_err(bad_key),
            ObjectType::RouteEntry => serde_json::from_str(id).map(ObjectKey::Route).map_err(bad_key),
            ObjectType::NeighborEntry => {
                serde_json::from_str(id).map(ObjectKey::Neighbor).map_err(bad_key)
            }
            t if t.is_oid_object() => {
                let oid: ObjectId = id.parse()?;
                oid.expect_type(t)?;
                Ok(ObjectKey::Object { object_type: t, oid })
            }
            t => Err(SaiError::not_implemented(format!("keys of {}", t))),
        }
    }
}

impl fmt::Display for ObjectKey {
    /// `SAI_OBJECT_TYPE_X:<serialized id>`, the composite channel key.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.serialize_id().map_err(|_| fmt::Error)?;
        write!(f, "{}:{}", self.object_type(), id)
    }
}

impl FromStr for ObjectKey {
    type Err = SaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (type_name, id) = s
            .split_once(':')
            .ok_or_else(|| SaiError::invalid_parameter(format!("invalid object key {}", s)))?;
        ObjectKey::deserialize_id(type_name.parse()?, id)
    }
}

impl From<FdbEntryKey> for ObjectKey {
    fn from(k: FdbEntryKey) -> Self {
        ObjectKey::Fdb(k)
    }
}

impl From<RouteEntryKey> for ObjectKey {
    fn from(k: RouteEntryKey) -> Self {
        ObjectKey::Route(k)
    }
}

impl From<NeighborEntryKey> for ObjectKey {
    fn from(k: NeighborEntryKey) -> Self {
        ObjectKey::Neighbor(k)
    }
}
