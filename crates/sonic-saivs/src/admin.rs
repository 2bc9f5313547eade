//! Administrative channel used by tests to poke at the virtual switch.
//!
//! Operations:
//! - `enable_unittests` with key `true`/`false`
//! - `set_ro`: key is an object key, fields map attribute names to JSON
//!   encoded values; read-only attributes are accepted
//! - `set_stats`: key is an object key, fields map stat names to counts
//!
//! `set_ro` and `set_stats` are refused until unit tests are enabled.

use crate::context::VsContext;
use log::{info, warn};
use sonic_sai::attr::PortAttr;
use sonic_sai::enums::PortOperStatus;
use sonic_sai::{
    AttrId, AttrValue, Attribute, ChannelMessage, Notification, ObjectKey, PortOperStatusData,
    SaiError, SaiResult, StatId,
};

pub const ENABLE_UNITTESTS: &str = "enable_unittests";
pub const SET_READ_ONLY: &str = "set_ro";
pub const SET_STATS: &str = "set_stats";

impl VsContext {
    /// Applies one administrative message.
    pub fn handle_admin(&mut self, msg: &ChannelMessage) -> SaiResult<()> {
        match msg.op.as_str() {
            ENABLE_UNITTESTS => {
                let enable = match msg.key.as_str() {
                    "true" => true,
                    "false" => false,
                    other => {
                        return Err(SaiError::invalid_parameter(format!(
                            "{} expects true or false, got {}",
                            ENABLE_UNITTESTS, other
                        )))
                    }
                };
                info!("Unit test mode {}", if enable { "enabled" } else { "disabled" });
                self.unittests_enabled = enable;
                Ok(())
            }
            SET_READ_ONLY => {
                self.require_unittests(SET_READ_ONLY)?;
                let key: ObjectKey = msg.key.parse()?;
                let attrs = msg
                    .fvs
                    .iter()
                    .map(|(name, value)| decode_attr(name, value))
                    .collect::<SaiResult<Vec<_>>>()?;
                // Every field is checked before the first write.
                for attr in &attrs {
                    self.check_set(&key, attr, true)?;
                }
                for attr in &attrs {
                    self.set_read_only(&key, attr)?;
                }
                Ok(())
            }
            SET_STATS => {
                self.require_unittests(SET_STATS)?;
                let key: ObjectKey = msg.key.parse()?;
                let state = self.registry.get_mut(key.switch_id())?;
                if !state.contains(&key) {
                    return Err(SaiError::not_found(key.to_string()));
                }
                let counters = msg
                    .fvs
                    .iter()
                    .map(|(name, value)| {
                        let id: StatId = name.parse()?;
                        let count = value.parse::<u64>().map_err(|e| {
                            SaiError::invalid_parameter(format!("{}={}: {}", name, value, e))
                        })?;
                        Ok((id, count))
                    })
                    .collect::<SaiResult<Vec<_>>>()?;
                for (id, count) in counters {
                    state.set_counter(&key, id, count);
                }
                Ok(())
            }
            other => {
                warn!("Ignoring unknown admin operation {}", other);
                Ok(())
            }
        }
    }

    fn require_unittests(&self, op: &str) -> SaiResult<()> {
        if self.unittests_enabled {
            Ok(())
        } else {
            Err(SaiError::failure(format!("{} requires unit test mode", op)))
        }
    }

    fn set_read_only(&mut self, key: &ObjectKey, attr: &Attribute) -> SaiResult<()> {
        self.set_on_key(key, attr, true)?;

        if attr.id == AttrId::from(PortAttr::OperStatus) {
            if let (Some(port_id), Some(status)) = (
                key.oid(),
                attr.value.as_s32().and_then(PortOperStatus::from_s32),
            ) {
                self.notify(Notification::PortStateChange(vec![PortOperStatusData {
                    port_id,
                    status,
                }]));
            }
        }
        Ok(())
    }
}

fn decode_attr(name: &str, value: &str) -> SaiResult<Attribute> {
    let id = AttrId::from_name(name)
        .ok_or_else(|| SaiError::invalid_parameter(format!("unknown attribute {}", name)))?;
    let value: AttrValue = serde_json::from_str(value)
        .map_err(|e| SaiError::invalid_parameter(format!("{}: {}", name, e)))?;
    Ok(Attribute::new(id, value))
}
