//! Virtual switch SAI backend.
//!
//! [`VirtualSwitch`] implements [`sonic_sai::SaiApi`] over an in-memory
//! object store. Creating a switch populates the default objects a real
//! ASIC reports (CPU port, data ports from the lane map, default VLAN,
//! 1Q bridge, virtual router and trap group). Learned FDB entries are aged
//! by a background thread, and FDB, port and switch events reach the
//! registered [`NotificationHandler`](sonic_sai::NotificationHandler) on a
//! dedicated notification thread.
//!
//! ```no_run
//! use sonic_sai::{ObjectId, ObjectType, ProfileMap, SaiApi, ServiceMethodTable};
//! use sonic_saivs::VirtualSwitch;
//!
//! let profile: ProfileMap = [("SAI_VS_SWITCH_TYPE", "SAI_VS_SWITCH_TYPE_BCM56850")]
//!     .into_iter()
//!     .collect();
//! let vs = VirtualSwitch::new();
//! vs.initialize(ServiceMethodTable::from_profile(profile), None)?;
//! let switch_id = vs.create(ObjectType::Switch, ObjectId::NULL, &[])?;
//! # Ok::<(), sonic_sai::SaiError>(())
//! ```

pub mod admin;
mod bootstrap;
pub mod clock;
pub mod config;
pub mod context;
mod crud;
mod fdb;
pub mod state;
pub mod switch;

pub use bootstrap::{DEFAULT_FDB_AGING_TIME, DEFAULT_PORT_MTU, DEFAULT_SRC_MAC, DEFAULT_VLAN_ID};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BootType, ConfigError, LaneMap, LaneMapEntry, SwitchType, VsConfig};
pub use context::{SwitchRegistry, VsContext};
pub use state::{FdbInfo, SwitchState, MAX_DEBUG_COUNTERS};
pub use switch::{VirtualSwitch, AGING_INTERVAL};
