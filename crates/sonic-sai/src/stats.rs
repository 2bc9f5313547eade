//! Statistics counter ids.

use crate::error::SaiError;
use crate::types::ObjectType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How `get_stats_ext` treats counters after reading them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatsMode {
    #[default]
    Read,
    ReadAndClear,
}

macro_rules! define_stats {
    ($enum:ident { $($variant:ident = $value:literal => $name:literal),* $(,)? }) => {
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
        }
    };
}

define_stats!(PortStat {
    IfInOctets = 0 => "SAI_PORT_STAT_IF_IN_OCTETS",
    IfInUcastPkts = 1 => "SAI_PORT_STAT_IF_IN_UCAST_PKTS",
    IfInNonUcastPkts = 2 => "SAI_PORT_STAT_IF_IN_NON_UCAST_PKTS",
    IfInDiscards = 3 => "SAI_PORT_STAT_IF_IN_DISCARDS",
    IfInErrors = 4 => "SAI_PORT_STAT_IF_IN_ERRORS",
    IfOutOctets = 9 => "SAI_PORT_STAT_IF_OUT_OCTETS",
    IfOutUcastPkts = 10 => "SAI_PORT_STAT_IF_OUT_UCAST_PKTS",
    IfOutNonUcastPkts = 11 => "SAI_PORT_STAT_IF_OUT_NON_UCAST_PKTS",
    IfOutDiscards = 12 => "SAI_PORT_STAT_IF_OUT_DISCARDS",
    IfOutErrors = 13 => "SAI_PORT_STAT_IF_OUT_ERRORS",
    InDropReasonRangeBase = 0x1000 => "SAI_PORT_STAT_IN_DROP_REASON_RANGE_BASE",
    OutDropReasonRangeBase = 0x2000 => "SAI_PORT_STAT_OUT_DROP_REASON_RANGE_BASE",
});

define_stats!(QueueStat {
    Packets = 0 => "SAI_QUEUE_STAT_PACKETS",
    Bytes = 1 => "SAI_QUEUE_STAT_BYTES",
    DroppedPackets = 2 => "SAI_QUEUE_STAT_DROPPED_PACKETS",
    DroppedBytes = 3 => "SAI_QUEUE_STAT_DROPPED_BYTES",
});

define_stats!(IngressPriorityGroupStat {
    Packets = 0 => "SAI_INGRESS_PRIORITY_GROUP_STAT_PACKETS",
    Bytes = 1 => "SAI_INGRESS_PRIORITY_GROUP_STAT_BYTES",
    XoffRoomWatermarkBytes = 2 => "SAI_INGRESS_PRIORITY_GROUP_STAT_XOFF_ROOM_WATERMARK_BYTES",
});

define_stats!(BufferPoolStat {
    CurrOccupancyBytes = 0 => "SAI_BUFFER_POOL_STAT_CURR_OCCUPANCY_BYTES",
    WatermarkBytes = 1 => "SAI_BUFFER_POOL_STAT_WATERMARK_BYTES",
    DroppedPackets = 2 => "SAI_BUFFER_POOL_STAT_DROPPED_PACKETS",
});

define_stats!(RouterInterfaceStat {
    InOctets = 0 => "SAI_ROUTER_INTERFACE_STAT_IN_OCTETS",
    InPackets = 1 => "SAI_ROUTER_INTERFACE_STAT_IN_PACKETS",
    OutOctets = 2 => "SAI_ROUTER_INTERFACE_STAT_OUT_OCTETS",
    OutPackets = 3 => "SAI_ROUTER_INTERFACE_STAT_OUT_PACKETS",
    InErrorPackets = 4 => "SAI_ROUTER_INTERFACE_STAT_IN_ERROR_PACKETS",
    OutErrorPackets = 5 => "SAI_ROUTER_INTERFACE_STAT_OUT_ERROR_PACKETS",
});

define_stats!(DebugCounterStat {
    Packets = 0 => "SAI_DEBUG_COUNTER_STAT_PACKETS",
});

/// A counter id of any object type that has statistics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatId {
    Port(PortStat),
    Queue(QueueStat),
    IngressPriorityGroup(IngressPriorityGroupStat),
    BufferPool(BufferPoolStat),
    RouterInterface(RouterInterfaceStat),
    DebugCounter(DebugCounterStat),
}

impl StatId {
    pub const fn object_type(&self) -> ObjectType {
        match self {
            StatId::Port(_) => ObjectType::Port,
            StatId::Queue(_) => ObjectType::Queue,
            StatId::IngressPriorityGroup(_) => ObjectType::IngressPriorityGroup,
            StatId::BufferPool(_) => ObjectType::BufferPool,
            StatId::RouterInterface(_) => ObjectType::RouterInterface,
            StatId::DebugCounter(_) => ObjectType::DebugCounter,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            StatId::Port(s) => s.name(),
            StatId::Queue(s) => s.name(),
            StatId::IngressPriorityGroup(s) => s.name(),
            StatId::BufferPool(s) => s.name(),
            StatId::RouterInterface(s) => s.name(),
            StatId::DebugCounter(s) => s.name(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        fn find<T: Copy>(all: &[T], name: &str, f: impl Fn(&T) -> &'static str) -> Option<T> {
            all.iter().copied().find(|s| f(s) == name)
        }

        find(PortStat::ALL, name, PortStat::name)
            .map(StatId::Port)
            .or_else(|| find(QueueStat::ALL, name, QueueStat::name).map(StatId::Queue))
            .or_else(|| {
                find(IngressPriorityGroupStat::ALL, name, IngressPriorityGroupStat::name)
                    .map(StatId::IngressPriorityGroup)
            })
            .or_else(|| find(BufferPoolStat::ALL, name, BufferPoolStat::name).map(StatId::BufferPool))
            .or_else(|| {
                find(RouterInterfaceStat::ALL, name, RouterInterfaceStat::name)
                    .map(StatId::RouterInterface)
            })
            .or_else(|| {
                find(DebugCounterStat::ALL, name, DebugCounterStat::name).map(StatId::DebugCounter)
            })
    }
}

impl fmt::Debug for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StatId {
    type Err = SaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatId::from_name(s).ok_or_else(|| SaiError::invalid_parameter(format!("unknown stat {}", s)))
    }
}

impl TryFrom<String> for StatId {
    type Error = SaiError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<StatId> for String {
    fn from(id: StatId) -> String {
        id.name().to_string()
    }
}

impl From<PortStat> for StatId {
    fn from(s: PortStat) -> Self {
        StatId::Port(s)
    }
}

impl From<QueueStat> for StatId {
    fn from(s: QueueStat) -> Self {
        StatId::Queue(s)
    }
}

impl From<RouterInterfaceStat> for StatId {
    fn from(s: RouterInterfaceStat) -> Self {
        StatId::RouterInterface(s)
    }
}

impl From<DebugCounterStat> for StatId {
    fn from(s: DebugCounterStat) -> Self {
        StatId::DebugCounter(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_names() {
        let id: StatId = "SAI_QUEUE_STAT_DROPPED_BYTES".parse().unwrap();
        assert_eq!(id, StatId::Queue(QueueStat::DroppedBytes));
        assert_eq!(id.object_type(), ObjectType::Queue);
        assert_eq!(StatId::Port(PortStat::IfInOctets).to_string(), "SAI_PORT_STAT_IF_IN_OCTETS");
        assert!("SAI_PORT_STAT_NOPE".parse::<StatId>().is_err());
    }
}
