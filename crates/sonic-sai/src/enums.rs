//! Enumerated attribute values.
//!
//! SAI carries these as `int32_t` inside attribute values; the Rust side
//! keeps them as enums and converts at the attribute boundary.

use crate::error::SaiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! define_s32_enum {
    ($(#[$meta:meta])* $enum:ident { $($variant:ident = $value:literal => $name:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum $enum {
            $($variant = $value),*
        }

        impl $enum {
            /// Returns the raw value stored in attributes.
            pub const fn as_s32(&self) -> i32 {
                *self as i32
            }

            /// Decodes a raw attribute value.
            pub const fn from_s32(raw: i32) -> Option<Self> {
                match raw {
                    $($value => Some($enum::$variant),)*
                    _ => None,
                }
            }

            /// Returns the SAI symbolic name.
            pub const fn name(&self) -> &'static str {
                match self {
                    $($enum::$variant => $name),*
                }
            }
        }

        impl fmt::Display for $enum {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $enum {
            type Err = SaiError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($enum::$variant),)*
                    _ => Err(SaiError::invalid_parameter(format!(
                        "unknown {} value {}",
                        stringify!($enum),
                        s
                    ))),
                }
            }
        }

        impl TryFrom<String> for $enum {
            type Error = SaiError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$enum> for String {
            fn from(v: $enum) -> String {
                v.name().to_string()
            }
        }
    };
}

define_s32_enum!(
    /// Whether an FDB entry is learned (and aged) or administratively pinned.
    FdbEntryType {
        Dynamic = 0 => "SAI_FDB_ENTRY_TYPE_DYNAMIC",
        Static = 1 => "SAI_FDB_ENTRY_TYPE_STATIC",
    }
);

define_s32_enum!(
    /// Entry type selector of an FDB flush.
    FdbFlushEntryType {
        Dynamic = 0 => "SAI_FDB_FLUSH_ENTRY_TYPE_DYNAMIC",
        Static = 1 => "SAI_FDB_FLUSH_ENTRY_TYPE_STATIC",
        All = 2 => "SAI_FDB_FLUSH_ENTRY_TYPE_ALL",
    }
);

define_s32_enum!(
    /// Kind of FDB notification.
    FdbEventType {
        Learned = 0 => "SAI_FDB_EVENT_LEARNED",
        Aged = 1 => "SAI_FDB_EVENT_AGED",
        Move = 2 => "SAI_FDB_EVENT_MOVE",
        Flushed = 3 => "SAI_FDB_EVENT_FLUSHED",
    }
);

define_s32_enum!(
    PacketAction {
        Drop = 0 => "SAI_PACKET_ACTION_DROP",
        Forward = 1 => "SAI_PACKET_ACTION_FORWARD",
        Copy = 2 => "SAI_PACKET_ACTION_COPY",
        CopyCancel = 3 => "SAI_PACKET_ACTION_COPY_CANCEL",
        Trap = 4 => "SAI_PACKET_ACTION_TRAP",
        Log = 5 => "SAI_PACKET_ACTION_LOG",
        Deny = 6 => "SAI_PACKET_ACTION_DENY",
        Transit = 7 => "SAI_PACKET_ACTION_TRANSIT",
    }
);

define_s32_enum!(
    /// Port operational status.
    PortOperStatus {
        Unknown = 0 => "SAI_PORT_OPER_STATUS_UNKNOWN",
        Up = 1 => "SAI_PORT_OPER_STATUS_UP",
        Down = 2 => "SAI_PORT_OPER_STATUS_DOWN",
        Testing = 3 => "SAI_PORT_OPER_STATUS_TESTING",
        NotPresent = 4 => "SAI_PORT_OPER_STATUS_NOT_PRESENT",
    }
);

define_s32_enum!(
    PortType {
        Logical = 0 => "SAI_PORT_TYPE_LOGICAL",
        Cpu = 1 => "SAI_PORT_TYPE_CPU",
    }
);

define_s32_enum!(
    /// Port add/delete events.
    PortEventType {
        Add = 0 => "SAI_PORT_EVENT_ADD",
        Delete = 1 => "SAI_PORT_EVENT_DELETE",
    }
);

define_s32_enum!(
    SwitchOperStatus {
        Unknown = 0 => "SAI_SWITCH_OPER_STATUS_UNKNOWN",
        Up = 1 => "SAI_SWITCH_OPER_STATUS_UP",
        Down = 2 => "SAI_SWITCH_OPER_STATUS_DOWN",
        Failed = 3 => "SAI_SWITCH_OPER_STATUS_FAILED",
    }
);

define_s32_enum!(
    BridgeType {
        OneQ = 0 => "SAI_BRIDGE_TYPE_1Q",
        OneD = 1 => "SAI_BRIDGE_TYPE_1D",
    }
);

define_s32_enum!(
    BridgePortType {
        Port = 0 => "SAI_BRIDGE_PORT_TYPE_PORT",
        SubPort = 1 => "SAI_BRIDGE_PORT_TYPE_SUB_PORT",
        OneQRouter = 2 => "SAI_BRIDGE_PORT_TYPE_1Q_ROUTER",
        OneDRouter = 3 => "SAI_BRIDGE_PORT_TYPE_1D_ROUTER",
        Tunnel = 4 => "SAI_BRIDGE_PORT_TYPE_TUNNEL",
    }
);

define_s32_enum!(
    VlanTaggingMode {
        Untagged = 0 => "SAI_VLAN_TAGGING_MODE_UNTAGGED",
        Tagged = 1 => "SAI_VLAN_TAGGING_MODE_TAGGED",
        PriorityTagged = 2 => "SAI_VLAN_TAGGING_MODE_PRIORITY_TAGGED",
    }
);

define_s32_enum!(
    DebugCounterType {
        PortInDropReasons = 0 => "SAI_DEBUG_COUNTER_TYPE_PORT_IN_DROP_REASONS",
        PortOutDropReasons = 1 => "SAI_DEBUG_COUNTER_TYPE_PORT_OUT_DROP_REASONS",
        SwitchInDropReasons = 2 => "SAI_DEBUG_COUNTER_TYPE_SWITCH_IN_DROP_REASONS",
        SwitchOutDropReasons = 3 => "SAI_DEBUG_COUNTER_TYPE_SWITCH_OUT_DROP_REASONS",
    }
);
