//! SAI object types.
//!
//! Every create/remove/set/get call is dispatched on an [`ObjectType`]. Most
//! types are addressed by an object id; the "entry" types (FDB, route,
//! neighbor, ...) are addressed by a structural key instead.

use crate::error::SaiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! define_object_types {
    ($($variant:ident = $value:literal => $name:literal),* $(,)?) => {
        /// SAI object type (matches `sai_object_type_t` numbering).
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum ObjectType {
            $($variant = $value),*
        }

        impl ObjectType {
            /// All known object types in numeric order.
            pub const ALL: &'static [ObjectType] = &[$(ObjectType::$variant),*];

            /// Returns the `SAI_OBJECT_TYPE_*` name.
            pub const fn name(&self) -> &'static str {
                match self {
                    $(ObjectType::$variant => $name),*
                }
            }

            /// Decodes the numeric value carried in object ids.
            pub const fn from_raw(raw: u8) -> Option<Self> {
                match raw {
                    $($value => Some(ObjectType::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

define_object_types! {
    Null = 0 => "SAI_OBJECT_TYPE_NULL",
    Port = 1 => "SAI_OBJECT_TYPE_PORT",
    Lag = 2 => "SAI_OBJECT_TYPE_LAG",
    VirtualRouter = 3 => "SAI_OBJECT_TYPE_VIRTUAL_ROUTER",
    NextHop = 4 => "SAI_OBJECT_TYPE_NEXT_HOP",
    NextHopGroup = 5 => "SAI_OBJECT_TYPE_NEXT_HOP_GROUP",
    RouterInterface = 6 => "SAI_OBJECT_TYPE_ROUTER_INTERFACE",
    AclTable = 7 => "SAI_OBJECT_TYPE_ACL_TABLE",
    AclEntry = 8 => "SAI_OBJECT_TYPE_ACL_ENTRY",
    AclCounter = 9 => "SAI_OBJECT_TYPE_ACL_COUNTER",
    AclRange = 10 => "SAI_OBJECT_TYPE_ACL_RANGE",
    AclTableGroup = 11 => "SAI_OBJECT_TYPE_ACL_TABLE_GROUP",
    AclTableGroupMember = 12 => "SAI_OBJECT_TYPE_ACL_TABLE_GROUP_MEMBER",
    Hostif = 13 => "SAI_OBJECT_TYPE_HOSTIF",
    MirrorSession = 14 => "SAI_OBJECT_TYPE_MIRROR_SESSION",
    Samplepacket = 15 => "SAI_OBJECT_TYPE_SAMPLEPACKET",
    Stp = 16 => "SAI_OBJECT_TYPE_STP",
    HostifTrapGroup = 17 => "SAI_OBJECT_TYPE_HOSTIF_TRAP_GROUP",
    Policer = 18 => "SAI_OBJECT_TYPE_POLICER",
    Wred = 19 => "SAI_OBJECT_TYPE_WRED",
    QosMap = 20 => "SAI_OBJECT_TYPE_QOS_MAP",
    Queue = 21 => "SAI_OBJECT_TYPE_QUEUE",
    Scheduler = 22 => "SAI_OBJECT_TYPE_SCHEDULER",
    SchedulerGroup = 23 => "SAI_OBJECT_TYPE_SCHEDULER_GROUP",
    BufferPool = 24 => "SAI_OBJECT_TYPE_BUFFER_POOL",
    BufferProfile = 25 => "SAI_OBJECT_TYPE_BUFFER_PROFILE",
    IngressPriorityGroup = 26 => "SAI_OBJECT_TYPE_INGRESS_PRIORITY_GROUP",
    LagMember = 27 => "SAI_OBJECT_TYPE_LAG_MEMBER",
    Hash = 28 => "SAI_OBJECT_TYPE_HASH",
    Udf = 29 => "SAI_OBJECT_TYPE_UDF",
    UdfMatch = 30 => "SAI_OBJECT_TYPE_UDF_MATCH",
    UdfGroup = 31 => "SAI_OBJECT_TYPE_UDF_GROUP",
    FdbEntry = 32 => "SAI_OBJECT_TYPE_FDB_ENTRY",
    Switch = 33 => "SAI_OBJECT_TYPE_SWITCH",
    HostifTrap = 34 => "SAI_OBJECT_TYPE_HOSTIF_TRAP",
    HostifTableEntry = 35 => "SAI_OBJECT_TYPE_HOSTIF_TABLE_ENTRY",
    NeighborEntry = 36 => "SAI_OBJECT_TYPE_NEIGHBOR_ENTRY",
    RouteEntry = 37 => "SAI_OBJECT_TYPE_ROUTE_ENTRY",
    Vlan = 38 => "SAI_OBJECT_TYPE_VLAN",
    VlanMember = 39 => "SAI_OBJECT_TYPE_VLAN_MEMBER",
    HostifPacket = 40 => "SAI_OBJECT_TYPE_HOSTIF_PACKET",
    TunnelMap = 41 => "SAI_OBJECT_TYPE_TUNNEL_MAP",
    Tunnel = 42 => "SAI_OBJECT_TYPE_TUNNEL",
    TunnelTermTableEntry = 43 => "SAI_OBJECT_TYPE_TUNNEL_TERM_TABLE_ENTRY",
    FdbFlush = 44 => "SAI_OBJECT_TYPE_FDB_FLUSH",
    NextHopGroupMember = 45 => "SAI_OBJECT_TYPE_NEXT_HOP_GROUP_MEMBER",
    StpPort = 46 => "SAI_OBJECT_TYPE_STP_PORT",
    RpfGroup = 47 => "SAI_OBJECT_TYPE_RPF_GROUP",
    RpfGroupMember = 48 => "SAI_OBJECT_TYPE_RPF_GROUP_MEMBER",
    L2mcGroup = 49 => "SAI_OBJECT_TYPE_L2MC_GROUP",
    L2mcGroupMember = 50 => "SAI_OBJECT_TYPE_L2MC_GROUP_MEMBER",
    IpmcGroup = 51 => "SAI_OBJECT_TYPE_IPMC_GROUP",
    IpmcGroupMember = 52 => "SAI_OBJECT_TYPE_IPMC_GROUP_MEMBER",
    L2mcEntry = 53 => "SAI_OBJECT_TYPE_L2MC_ENTRY",
    IpmcEntry = 54 => "SAI_OBJECT_TYPE_IPMC_ENTRY",
    McastFdbEntry = 55 => "SAI_OBJECT_TYPE_MCAST_FDB_ENTRY",
    HostifUserDefinedTrap = 56 => "SAI_OBJECT_TYPE_HOSTIF_USER_DEFINED_TRAP",
    Bridge = 57 => "SAI_OBJECT_TYPE_BRIDGE",
    BridgePort = 58 => "SAI_OBJECT_TYPE_BRIDGE_PORT",
    TunnelMapEntry = 59 => "SAI_OBJECT_TYPE_TUNNEL_MAP_ENTRY",
    Tam = 60 => "SAI_OBJECT_TYPE_TAM",
    DebugCounter = 80 => "SAI_OBJECT_TYPE_DEBUG_COUNTER",
}

impl ObjectType {
    /// Returns true for types addressed by a structural key rather than an id.
    pub const fn is_entry(&self) -> bool {
        matches!(
            self,
            ObjectType::FdbEntry
                | ObjectType::NeighborEntry
                | ObjectType::RouteEntry
                | ObjectType::McastFdbEntry
                | ObjectType::L2mcEntry
                | ObjectType::IpmcEntry
        )
    }

    /// Returns true for types that are created through an object id.
    ///
    /// `Null`, the entry types and the two API-only pseudo types
    /// (`FdbFlush`, `HostifPacket`) are excluded.
    pub const fn is_oid_object(&self) -> bool {
        !self.is_entry()
            && !matches!(
                self,
                ObjectType::Null | ObjectType::FdbFlush | ObjectType::HostifPacket
            )
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectType {
    type Err = SaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| SaiError::invalid_parameter(format!("unknown object type {}", s)))
    }
}

impl TryFrom<String> for ObjectType {
    type Error = SaiError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ObjectType> for String {
    fn from(t: ObjectType) -> String {
        t.name().to_string()
    }
}
