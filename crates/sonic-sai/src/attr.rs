//! Strongly-typed attribute ids and values.
//!
//! Each object type with modelled attributes gets its own id enum; [`AttrId`]
//! wraps them so a single attribute map can hold any of them. Attribute
//! names (`SAI_PORT_ATTR_SPEED`, ...) only matter to the wire codec.

use crate::error::{SaiError, SaiResult};
use crate::mac::MacAddress;
use crate::oid::ObjectId;
use crate::types::ObjectType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// The shape of value an attribute carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    U8,
    U16,
    U32,
    S32,
    U64,
    Mac,
    Ip,
    Oid,
    OidList,
    U32List,
    S32List,
    CharData,
}

impl ValueKind {
    /// Returns true for list-shaped values that take part in size negotiation.
    pub const fn is_list(&self) -> bool {
        matches!(self, ValueKind::OidList | ValueKind::U32List | ValueKind::S32List)
    }
}

macro_rules! define_attrs {
    (@ro ro) => { true };
    (@ro) => { false };
    ($(#[$meta:meta])* $enum:ident => $object_type:ident {
        $($variant:ident = $value:literal => $name:literal : $kind:ident $(, $ro:ident)?;)*
    }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $enum {
            $($variant = $value),*
        }

        impl $enum {
            pub const ALL: &'static [$enum] = &[$($enum::$variant),*];

            pub const fn name(&self) -> &'static str {
                match self {
                    $($enum::$variant => $name),*
                }
            }

            pub const fn value_kind(&self) -> ValueKind {
                match self {
                    $($enum::$variant => ValueKind::$kind),*
                }
            }

            pub const fn is_read_only(&self) -> bool {
                match self {
                    $($enum::$variant => define_attrs!(@ro $($ro)?)),*
                }
            }
        }

        impl From<$enum> for AttrId {
            fn from(attr: $enum) -> AttrId {
                AttrId::$object_type(attr)
            }
        }
    };
}

define_attrs! {
    /// Switch attributes.
    SwitchAttr => Switch {
        PortNumber = 0 => "SAI_SWITCH_ATTR_PORT_NUMBER": U32, ro;
        PortList = 1 => "SAI_SWITCH_ATTR_PORT_LIST": OidList, ro;
        CpuPort = 2 => "SAI_SWITCH_ATTR_CPU_PORT": Oid, ro;
        DefaultVirtualRouterId = 3 => "SAI_SWITCH_ATTR_DEFAULT_VIRTUAL_ROUTER_ID": Oid, ro;
        DefaultVlanId = 4 => "SAI_SWITCH_ATTR_DEFAULT_VLAN_ID": Oid, ro;
        Default1QBridgeId = 5 => "SAI_SWITCH_ATTR_DEFAULT_1Q_BRIDGE_ID": Oid, ro;
        DefaultTrapGroup = 6 => "SAI_SWITCH_ATTR_DEFAULT_TRAP_GROUP": Oid, ro;
        SrcMacAddress = 7 => "SAI_SWITCH_ATTR_SRC_MAC_ADDRESS": Mac;
        FdbAgingTime = 8 => "SAI_SWITCH_ATTR_FDB_AGING_TIME": U32;
        InitSwitch = 9 => "SAI_SWITCH_ATTR_INIT_SWITCH": Bool;
        OperStatus = 10 => "SAI_SWITCH_ATTR_OPER_STATUS": S32, ro;
        HardwareInfo = 11 => "SAI_SWITCH_ATTR_SWITCH_HARDWARE_INFO": CharData;
    }
}

define_attrs! {
    /// Port attributes.
    PortAttr => Port {
        Type = 0 => "SAI_PORT_ATTR_TYPE": S32, ro;
        OperStatus = 1 => "SAI_PORT_ATTR_OPER_STATUS": S32, ro;
        HwLaneList = 2 => "SAI_PORT_ATTR_HW_LANE_LIST": U32List;
        Speed = 3 => "SAI_PORT_ATTR_SPEED": U32;
        AdminState = 4 => "SAI_PORT_ATTR_ADMIN_STATE": Bool;
        Mtu = 5 => "SAI_PORT_ATTR_MTU": U32;
        PortVlanId = 6 => "SAI_PORT_ATTR_PORT_VLAN_ID": U16;
        FecMode = 7 => "SAI_PORT_ATTR_FEC_MODE": S32;
    }
}

define_attrs! {
    LagAttr => Lag {
        PortList = 0 => "SAI_LAG_ATTR_PORT_LIST": OidList, ro;
    }
}

define_attrs! {
    LagMemberAttr => LagMember {
        LagId = 0 => "SAI_LAG_MEMBER_ATTR_LAG_ID": Oid;
        PortId = 1 => "SAI_LAG_MEMBER_ATTR_PORT_ID": Oid;
    }
}

define_attrs! {
    VirtualRouterAttr => VirtualRouter {
        AdminV4State = 0 => "SAI_VIRTUAL_ROUTER_ATTR_ADMIN_V4_STATE": Bool;
        AdminV6State = 1 => "SAI_VIRTUAL_ROUTER_ATTR_ADMIN_V6_STATE": Bool;
        SrcMacAddress = 2 => "SAI_VIRTUAL_ROUTER_ATTR_SRC_MAC_ADDRESS": Mac;
    }
}

define_attrs! {
    NextHopAttr => NextHop {
        Type = 0 => "SAI_NEXT_HOP_ATTR_TYPE": S32;
        Ip = 1 => "SAI_NEXT_HOP_ATTR_IP": Ip;
        RouterInterfaceId = 2 => "SAI_NEXT_HOP_ATTR_ROUTER_INTERFACE_ID": Oid;
    }
}

define_attrs! {
    NextHopGroupAttr => NextHopGroup {
        Type = 0 => "SAI_NEXT_HOP_GROUP_ATTR_TYPE": S32;
    }
}

define_attrs! {
    NextHopGroupMemberAttr => NextHopGroupMember {
        NextHopGroupId = 0 => "SAI_NEXT_HOP_GROUP_MEMBER_ATTR_NEXT_HOP_GROUP_ID": Oid;
        NextHopId = 1 => "SAI_NEXT_HOP_GROUP_MEMBER_ATTR_NEXT_HOP_ID": Oid;
    }
}

define_attrs! {
    RouterInterfaceAttr => RouterInterface {
        VirtualRouterId = 0 => "SAI_ROUTER_INTERFACE_ATTR_VIRTUAL_ROUTER_ID": Oid;
        Type = 1 => "SAI_ROUTER_INTERFACE_ATTR_TYPE": S32;
        PortId = 2 => "SAI_ROUTER_INTERFACE_ATTR_PORT_ID": Oid;
        VlanId = 3 => "SAI_ROUTER_INTERFACE_ATTR_VLAN_ID": Oid;
        SrcMacAddress = 4 => "SAI_ROUTER_INTERFACE_ATTR_SRC_MAC_ADDRESS": Mac;
        Mtu = 5 => "SAI_ROUTER_INTERFACE_ATTR_MTU": U32;
    }
}

define_attrs! {
    AclTableAttr => AclTable {
        Stage = 0 => "SAI_ACL_TABLE_ATTR_ACL_STAGE": S32;
        Size = 1 => "SAI_ACL_TABLE_ATTR_SIZE": U32;
    }
}

define_attrs! {
    AclEntryAttr => AclEntry {
        TableId = 0 => "SAI_ACL_ENTRY_ATTR_TABLE_ID": Oid;
        Priority = 1 => "SAI_ACL_ENTRY_ATTR_PRIORITY": U32;
        AdminState = 2 => "SAI_ACL_ENTRY_ATTR_ADMIN_STATE": Bool;
    }
}

define_attrs! {
    AclCounterAttr => AclCounter {
        TableId = 0 => "SAI_ACL_COUNTER_ATTR_TABLE_ID": Oid;
        Packets = 1 => "SAI_ACL_COUNTER_ATTR_PACKETS": U64;
        Bytes = 2 => "SAI_ACL_COUNTER_ATTR_BYTES": U64;
    }
}

define_attrs! {
    HostifAttr => Hostif {
        Type = 0 => "SAI_HOSTIF_ATTR_TYPE": S32;
        ObjId = 1 => "SAI_HOSTIF_ATTR_OBJ_ID": Oid;
        Name = 2 => "SAI_HOSTIF_ATTR_NAME": CharData;
        OperStatus = 3 => "SAI_HOSTIF_ATTR_OPER_STATUS": Bool;
    }
}

define_attrs! {
    HostifTrapGroupAttr => HostifTrapGroup {
        AdminState = 0 => "SAI_HOSTIF_TRAP_GROUP_ATTR_ADMIN_STATE": Bool;
        Queue = 1 => "SAI_HOSTIF_TRAP_GROUP_ATTR_QUEUE": U32;
    }
}

define_attrs! {
    HostifTrapAttr => HostifTrap {
        TrapType = 0 => "SAI_HOSTIF_TRAP_ATTR_TRAP_TYPE": S32;
        PacketAction = 1 => "SAI_HOSTIF_TRAP_ATTR_PACKET_ACTION": S32;
        TrapGroup = 2 => "SAI_HOSTIF_TRAP_ATTR_TRAP_GROUP": Oid;
    }
}

define_attrs! {
    MirrorSessionAttr => MirrorSession {
        Type = 0 => "SAI_MIRROR_SESSION_ATTR_TYPE": S32;
        MonitorPort = 1 => "SAI_MIRROR_SESSION_ATTR_MONITOR_PORT": Oid;
    }
}

define_attrs! {
    PolicerAttr => Policer {
        MeterType = 0 => "SAI_POLICER_ATTR_METER_TYPE": S32;
        Mode = 1 => "SAI_POLICER_ATTR_MODE": S32;
        Cir = 2 => "SAI_POLICER_ATTR_CIR": U64;
    }
}

define_attrs! {
    QosMapAttr => QosMap {
        Type = 0 => "SAI_QOS_MAP_ATTR_TYPE": S32;
    }
}

define_attrs! {
    QueueAttr => Queue {
        Type = 0 => "SAI_QUEUE_ATTR_TYPE": S32;
        Port = 1 => "SAI_QUEUE_ATTR_PORT": Oid;
        Index = 2 => "SAI_QUEUE_ATTR_INDEX": U8;
    }
}

define_attrs! {
    SchedulerAttr => Scheduler {
        SchedulingType = 0 => "SAI_SCHEDULER_ATTR_SCHEDULING_TYPE": S32;
        SchedulingWeight = 1 => "SAI_SCHEDULER_ATTR_SCHEDULING_WEIGHT": U8;
    }
}

define_attrs! {
    BufferPoolAttr => BufferPool {
        Type = 0 => "SAI_BUFFER_POOL_ATTR_TYPE": S32;
        Size = 1 => "SAI_BUFFER_POOL_ATTR_SIZE": U64;
    }
}

define_attrs! {
    BufferProfileAttr => BufferProfile {
        PoolId = 0 => "SAI_BUFFER_PROFILE_ATTR_POOL_ID": Oid;
        BufferSize = 1 => "SAI_BUFFER_PROFILE_ATTR_BUFFER_SIZE": U64;
    }
}

define_attrs! {
    TunnelAttr => Tunnel {
        Type = 0 => "SAI_TUNNEL_ATTR_TYPE": S32;
        UnderlayInterface = 1 => "SAI_TUNNEL_ATTR_UNDERLAY_INTERFACE": Oid;
        OverlayInterface = 2 => "SAI_TUNNEL_ATTR_OVERLAY_INTERFACE": Oid;
    }
}

define_attrs! {
    TunnelMapAttr => TunnelMap {
        Type = 0 => "SAI_TUNNEL_MAP_ATTR_TYPE": S32;
    }
}

define_attrs! {
    /// FDB entry attributes.
    FdbEntryAttr => FdbEntry {
        Type = 0 => "SAI_FDB_ENTRY_ATTR_TYPE": S32;
        PacketAction = 1 => "SAI_FDB_ENTRY_ATTR_PACKET_ACTION": S32;
        BridgePortId = 2 => "SAI_FDB_ENTRY_ATTR_BRIDGE_PORT_ID": Oid;
    }
}

define_attrs! {
    NeighborEntryAttr => NeighborEntry {
        DstMacAddress = 0 => "SAI_NEIGHBOR_ENTRY_ATTR_DST_MAC_ADDRESS": Mac;
        PacketAction = 1 => "SAI_NEIGHBOR_ENTRY_ATTR_PACKET_ACTION": S32;
    }
}

define_attrs! {
    RouteEntryAttr => RouteEntry {
        PacketAction = 0 => "SAI_ROUTE_ENTRY_ATTR_PACKET_ACTION": S32;
        NextHopId = 1 => "SAI_ROUTE_ENTRY_ATTR_NEXT_HOP_ID": Oid;
    }
}

define_attrs! {
    /// VLAN attributes.
    VlanAttr => Vlan {
        VlanId = 0 => "SAI_VLAN_ATTR_VLAN_ID": U16;
        MemberList = 1 => "SAI_VLAN_ATTR_MEMBER_LIST": OidList, ro;
        MaxLearnedAddresses = 2 => "SAI_VLAN_ATTR_MAX_LEARNED_ADDRESSES": U32;
        LearnDisable = 3 => "SAI_VLAN_ATTR_LEARN_DISABLE": Bool;
    }
}

define_attrs! {
    VlanMemberAttr => VlanMember {
        VlanId = 0 => "SAI_VLAN_MEMBER_ATTR_VLAN_ID": Oid;
        BridgePortId = 1 => "SAI_VLAN_MEMBER_ATTR_BRIDGE_PORT_ID": Oid;
        VlanTaggingMode = 2 => "SAI_VLAN_MEMBER_ATTR_VLAN_TAGGING_MODE": S32;
    }
}

define_attrs! {
    /// Filters accepted by an FDB flush.
    FdbFlushAttr => FdbFlush {
        BridgePortId = 0 => "SAI_FDB_FLUSH_ATTR_BRIDGE_PORT_ID": Oid;
        BvId = 1 => "SAI_FDB_FLUSH_ATTR_BV_ID": Oid;
        EntryType = 2 => "SAI_FDB_FLUSH_ATTR_ENTRY_TYPE": S32;
    }
}

define_attrs! {
    BridgeAttr => Bridge {
        Type = 0 => "SAI_BRIDGE_ATTR_TYPE": S32;
        PortList = 1 => "SAI_BRIDGE_ATTR_PORT_LIST": OidList, ro;
    }
}

define_attrs! {
    BridgePortAttr => BridgePort {
        Type = 0 => "SAI_BRIDGE_PORT_ATTR_TYPE": S32;
        PortId = 1 => "SAI_BRIDGE_PORT_ATTR_PORT_ID": Oid;
        BridgeId = 2 => "SAI_BRIDGE_PORT_ATTR_BRIDGE_ID": Oid;
        FdbLearningMode = 3 => "SAI_BRIDGE_PORT_ATTR_FDB_LEARNING_MODE": S32;
        AdminState = 4 => "SAI_BRIDGE_PORT_ATTR_ADMIN_STATE": Bool;
    }
}

define_attrs! {
    /// Debug counter attributes. The index is assigned by the switch.
    DebugCounterAttr => DebugCounter {
        Index = 0 => "SAI_DEBUG_COUNTER_ATTR_INDEX": U32, ro;
        Type = 1 => "SAI_DEBUG_COUNTER_ATTR_TYPE": S32;
        BindMethod = 2 => "SAI_DEBUG_COUNTER_ATTR_BIND_METHOD": S32;
        InDropReasonList = 3 => "SAI_DEBUG_COUNTER_ATTR_IN_DROP_REASON_LIST": S32List;
        OutDropReasonList = 4 => "SAI_DEBUG_COUNTER_ATTR_OUT_DROP_REASON_LIST": S32List;
    }
}

macro_rules! define_attr_id {
    ($($variant:ident($inner:ident)),* $(,)?) => {
        /// An attribute id of any object type.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum AttrId {
            $($variant($inner)),*
        }

        impl AttrId {
            /// The object type this attribute belongs to.
            pub const fn object_type(&self) -> ObjectType {
                match self {
                    $(AttrId::$variant(_) => ObjectType::$variant),*
                }
            }

            pub const fn name(&self) -> &'static str {
                match self {
                    $(AttrId::$variant(a) => a.name()),*
                }
            }

            pub const fn value_kind(&self) -> ValueKind {
                match self {
                    $(AttrId::$variant(a) => a.value_kind()),*
                }
            }

            /// Read-only attributes are computed by the switch and rejected
            /// on `set`.
            pub const fn is_read_only(&self) -> bool {
                match self {
                    $(AttrId::$variant(a) => a.is_read_only()),*
                }
            }

            /// Looks an attribute up by its SAI name.
            pub fn from_name(name: &str) -> Option<Self> {
                $(
                    if let Some(a) = $inner::ALL.iter().find(|a| a.name() == name) {
                        return Some(AttrId::$variant(*a));
                    }
                )*
                None
            }
        }
    };
}

define_attr_id! {
    Switch(SwitchAttr),
    Port(PortAttr),
    Lag(LagAttr),
    LagMember(LagMemberAttr),
    VirtualRouter(VirtualRouterAttr),
    NextHop(NextHopAttr),
    NextHopGroup(NextHopGroupAttr),
    NextHopGroupMember(NextHopGroupMemberAttr),
    RouterInterface(RouterInterfaceAttr),
    AclTable(AclTableAttr),
    AclEntry(AclEntryAttr),
    AclCounter(AclCounterAttr),
    Hostif(HostifAttr),
    HostifTrapGroup(HostifTrapGroupAttr),
    HostifTrap(HostifTrapAttr),
    MirrorSession(MirrorSessionAttr),
    Policer(PolicerAttr),
    QosMap(QosMapAttr),
    Queue(QueueAttr),
    Scheduler(SchedulerAttr),
    BufferPool(BufferPoolAttr),
    BufferProfile(BufferProfileAttr),
    Tunnel(TunnelAttr),
    TunnelMap(TunnelMapAttr),
    FdbEntry(FdbEntryAttr),
    NeighborEntry(NeighborEntryAttr),
    RouteEntry(RouteEntryAttr),
    Vlan(VlanAttr),
    VlanMember(VlanMemberAttr),
    FdbFlush(FdbFlushAttr),
    Bridge(BridgeAttr),
    BridgePort(BridgePortAttr),
    DebugCounter(DebugCounterAttr),
}

impl fmt::Debug for AttrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for AttrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttrId {
    type Err = SaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AttrId::from_name(s)
            .ok_or_else(|| SaiError::invalid_parameter(format!("unknown attribute {}", s)))
    }
}

impl TryFrom<String> for AttrId {
    type Error = SaiError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AttrId> for String {
    fn from(id: AttrId) -> String {
        id.name().to_string()
    }
}

/// A list value together with the caller's buffer capacity.
///
/// On `get`, `count` is the capacity the caller offers; on return it holds
/// the number of items written, or the required size when the buffer was
/// too small.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaiList<T> {
    count: u32,
    items: Vec<T>,
}

/// Result of copying a stored value into a caller buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Filled,
    Overflow { required: u32 },
}

impl<T: Clone> SaiList<T> {
    /// Creates an empty output buffer able to hold `capacity` items.
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            count: capacity,
            items: Vec::new(),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn fill_from(&mut self, stored: &SaiList<T>) -> Transfer {
        let required = stored.items.len() as u32;
        if required > self.count {
            self.count = required;
            self.items.clear();
            return Transfer::Overflow { required };
        }
        self.items = stored.items.clone();
        self.count = required;
        Transfer::Filled
    }
}

impl<T> From<Vec<T>> for SaiList<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            count: items.len() as u32,
            items,
        }
    }
}

/// An owned attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    S32(i32),
    U64(u64),
    Mac(MacAddress),
    Ip(IpAddr),
    Oid(ObjectId),
    OidList(SaiList<ObjectId>),
    U32List(SaiList<u32>),
    S32List(SaiList<i32>),
    CharData(String),
}

impl AttrValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            AttrValue::Bool(_) => ValueKind::Bool,
            AttrValue::U8(_) => ValueKind::U8,
            AttrValue::U16(_) => ValueKind::U16,
            AttrValue::U32(_) => ValueKind::U32,
            AttrValue::S32(_) => ValueKind::S32,
            AttrValue::U64(_) => ValueKind::U64,
            AttrValue::Mac(_) => ValueKind::Mac,
            AttrValue::Ip(_) => ValueKind::Ip,
            AttrValue::Oid(_) => ValueKind::Oid,
            AttrValue::OidList(_) => ValueKind::OidList,
            AttrValue::U32List(_) => ValueKind::U32List,
            AttrValue::S32List(_) => ValueKind::S32List,
            AttrValue::CharData(_) => ValueKind::CharData,
        }
    }

    /// Builds an output slot for a `get` of the given kind.
    ///
    /// Lists get a buffer of `capacity` items; scalars get a zero value.
    pub fn placeholder(kind: ValueKind, capacity: u32) -> Self {
        match kind {
            ValueKind::Bool => AttrValue::Bool(false),
            ValueKind::U8 => AttrValue::U8(0),
            ValueKind::U16 => AttrValue::U16(0),
            ValueKind::U32 => AttrValue::U32(0),
            ValueKind::S32 => AttrValue::S32(0),
            ValueKind::U64 => AttrValue::U64(0),
            ValueKind::Mac => AttrValue::Mac(MacAddress::ZERO),
            ValueKind::Ip => AttrValue::Ip(IpAddr::from([0u8, 0, 0, 0])),
            ValueKind::Oid => AttrValue::Oid(ObjectId::NULL),
            ValueKind::OidList => AttrValue::OidList(SaiList::with_capacity(capacity)),
            ValueKind::U32List => AttrValue::U32List(SaiList::with_capacity(capacity)),
            ValueKind::S32List => AttrValue::S32List(SaiList::with_capacity(capacity)),
            ValueKind::CharData => AttrValue::CharData(String::new()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            AttrValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            AttrValue::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_s32(&self) -> Option<i32> {
        match self {
            AttrValue::S32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_mac(&self) -> Option<MacAddress> {
        match self {
            AttrValue::Mac(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_oid(&self) -> Option<ObjectId> {
        match self {
            AttrValue::Oid(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_oid_list(&self) -> Option<&[ObjectId]> {
        match self {
            AttrValue::OidList(v) => Some(v.items()),
            _ => None,
        }
    }

    pub fn as_u32_list(&self) -> Option<&[u32]> {
        match self {
            AttrValue::U32List(v) => Some(v.items()),
            _ => None,
        }
    }

    /// Normalizes a value for storage: list counts always match their items.
    pub fn into_stored(self) -> Self {
        match self {
            AttrValue::OidList(l) => AttrValue::OidList(l.into_items().into()),
            AttrValue::U32List(l) => AttrValue::U32List(l.into_items().into()),
            AttrValue::S32List(l) => AttrValue::S32List(l.into_items().into()),
            other => other,
        }
    }

    /// Copies a stored value into this output slot.
    ///
    /// Scalars are overwritten. Lists honour the slot's capacity: an
    /// undersized slot has its count set to the required size and reports
    /// [`Transfer::Overflow`] without copying any item.
    pub fn fill_from(&mut self, stored: &AttrValue) -> SaiResult<Transfer> {
        match (self, stored) {
            (AttrValue::OidList(out), AttrValue::OidList(s)) => Ok(out.fill_from(s)),
            (AttrValue::U32List(out), AttrValue::U32List(s)) => Ok(out.fill_from(s)),
            (AttrValue::S32List(out), AttrValue::S32List(s)) => Ok(out.fill_from(s)),
            (out, stored) if stored.kind().is_list() => Err(SaiError::invalid_parameter(format!(
                "{:?} buffer offered for a {:?} value",
                out.kind(),
                stored.kind()
            ))),
            (out, stored) => {
                *out = stored.clone();
                Ok(Transfer::Filled)
            }
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<u32> for AttrValue {
    fn from(v: u32) -> Self {
        AttrValue::U32(v)
    }
}

impl From<ObjectId> for AttrValue {
    fn from(v: ObjectId) -> Self {
        AttrValue::Oid(v)
    }
}

impl From<MacAddress> for AttrValue {
    fn from(v: MacAddress) -> Self {
        AttrValue::Mac(v)
    }
}

impl From<Vec<ObjectId>> for AttrValue {
    fn from(v: Vec<ObjectId>) -> Self {
        AttrValue::OidList(v.into())
    }
}

/// One attribute id/value pair as passed across the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttrId,
    pub value: AttrValue,
}

impl Attribute {
    pub fn new(id: impl Into<AttrId>, value: impl Into<AttrValue>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }

    /// An output slot for `get`, sized for list attributes by `capacity`.
    pub fn request(id: impl Into<AttrId>, capacity: u32) -> Self {
        let id = id.into();
        Self {
            id,
            value: AttrValue::placeholder(id.value_kind(), capacity),
        }
    }

    /// Checks the value shape against the attribute id.
    pub fn check_kind(&self) -> SaiResult<()> {
        if self.value.kind() != self.id.value_kind() {
            return Err(SaiError::invalid_parameter(format!(
                "{} expects a {:?} value, got {:?}",
                self.id,
                self.id.value_kind(),
                self.value.kind()
            )));
        }
        Ok(())
    }
}

/// Finds the value of an attribute in a caller-supplied list.
pub fn find_attr(attrs: &[Attribute], id: impl Into<AttrId>) -> Option<&AttrValue> {
    let id = id.into();
    attrs.iter().find(|a| a.id == id).map(|a| &a.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_attr_metadata() {
        let id: AttrId = PortAttr::OperStatus.into();
        assert_eq!(id.object_type(), ObjectType::Port);
        assert_eq!(id.name(), "SAI_PORT_ATTR_OPER_STATUS");
        assert!(id.is_read_only());
        assert!(!AttrId::from(PortAttr::Speed).is_read_only());
        assert_eq!(AttrId::from_name("SAI_VLAN_ATTR_MEMBER_LIST"), Some(VlanAttr::MemberList.into()));
        assert_eq!(AttrId::from_name("SAI_VLAN_ATTR_NOPE"), None);
    }

    #[test]
    fn test_list_negotiation() {
        let stored = AttrValue::from(vec![ObjectId::from_raw(1), ObjectId::from_raw(2), ObjectId::from_raw(3)]);

        let mut slot = AttrValue::placeholder(ValueKind::OidList, 2);
        assert_eq!(slot.fill_from(&stored).unwrap(), Transfer::Overflow { required: 3 });
        match &slot {
            AttrValue::OidList(l) => {
                assert_eq!(l.count(), 3);
                assert!(l.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }

        let mut slot = AttrValue::placeholder(ValueKind::OidList, 3);
        assert_eq!(slot.fill_from(&stored).unwrap(), Transfer::Filled);
        assert_eq!(slot, stored);
    }

    #[test]
    fn test_scalar_slot_for_list_rejected() {
        let stored = AttrValue::from(vec![ObjectId::from_raw(1)]);
        let mut slot = AttrValue::U32(0);
        assert!(slot.fill_from(&stored).is_err());
    }

    #[test]
    fn test_check_kind() {
        assert!(Attribute::new(PortAttr::Speed, 100_000u32).check_kind().is_ok());
        assert!(Attribute::new(PortAttr::Speed, true).check_kind().is_err());
    }

    #[test]
    fn test_attribute_serde() {
        let attr = Attribute::new(SwitchAttr::FdbAgingTime, 5u32);
        let json = serde_json::to_string(&attr).unwrap();
        assert_eq!(json, r#"{"id":"SAI_SWITCH_ATTR_FDB_AGING_TIME","value":{"u32":5}}"#);
        let back: Attribute = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attr);
    }
}
