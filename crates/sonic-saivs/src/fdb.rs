//! FDB learning, aging and flush.
//!
//! Dynamic entries live twice: as an `FdbEntry` object in the store and as
//! an [`FdbInfo`] record keyed by the same [`FdbEntryKey`]. Every path that
//! adds or drops one side updates the other under the same lock.

use crate::context::VsContext;
use crate::crud::fdb_entry_type;
use crate::state::{AttributeMap, FdbInfo, SwitchState};
use log::{debug, error, info};
use sonic_sai::attr::{FdbEntryAttr, FdbFlushAttr, SwitchAttr, VlanAttr};
use sonic_sai::enums::{FdbEntryType, FdbEventType, FdbFlushEntryType, PacketAction};
use sonic_sai::{
    AttrId, AttrValue, Attribute, FdbEntryKey, FdbEventData, MacAddress, Notification, ObjectId,
    ObjectKey, ObjectType, SaiError, SaiResult,
};

/// VLAN number of a bridge/VLAN domain, 0 when it is not a VLAN.
fn vlan_id_of(state: &SwitchState, bv_id: ObjectId) -> u16 {
    state
        .by_oid(bv_id)
        .and_then(|r| r.get(VlanAttr::VlanId))
        .and_then(AttrValue::as_u16)
        .unwrap_or(0)
}

/// Brings the learned index in line with the stored entry.
///
/// Static or missing entries lose their index record; dynamic entries get
/// one, keeping the original learn time when already indexed.
pub(crate) fn sync_mirror(state: &mut SwitchState, key: &FdbEntryKey, now: u64) {
    let record = state.object(&ObjectKey::Fdb(*key));
    let dynamic = record
        .and_then(|r| r.get(FdbEntryAttr::Type))
        .and_then(AttrValue::as_s32)
        == Some(FdbEntryType::Dynamic.as_s32());

    if !dynamic {
        state.fdb_info.remove(key);
        return;
    }

    let bridge_port_id = record
        .and_then(|r| r.get_oid(FdbEntryAttr::BridgePortId))
        .unwrap_or(ObjectId::NULL);
    let vlan_id = vlan_id_of(state, key.bv_id);
    let learned_at = state.fdb_info.get(key).map_or(now, |info| info.learned_at);
    state.fdb_info.insert(
        *key,
        FdbInfo {
            bridge_port_id,
            vlan_id,
            learned_at,
        },
    );
}

fn entry_type_attr(entry_type: FdbEntryType) -> Attribute {
    Attribute::new(FdbEntryAttr::Type, AttrValue::S32(entry_type.as_s32()))
}

/// Parsed flush filter; `None` fields match everything.
#[derive(Debug, Default)]
struct FlushFilter {
    bridge_port_id: Option<ObjectId>,
    bv_id: Option<ObjectId>,
    entry_type: Option<FdbFlushEntryType>,
}

impl FlushFilter {
    fn parse(attrs: &[Attribute]) -> SaiResult<Self> {
        let mut filter = FlushFilter::default();
        for attr in attrs {
            attr.check_kind()?;
            match attr.id {
                AttrId::FdbFlush(FdbFlushAttr::BridgePortId) => {
                    filter.bridge_port_id = attr.value.as_oid();
                }
                AttrId::FdbFlush(FdbFlushAttr::BvId) => {
                    filter.bv_id = attr.value.as_oid();
                }
                AttrId::FdbFlush(FdbFlushAttr::EntryType) => {
                    let value = attr.value.as_s32().and_then(FdbFlushEntryType::from_s32);
                    filter.entry_type = Some(value.ok_or_else(|| {
                        SaiError::invalid_parameter(format!(
                            "invalid flush entry type {:?}",
                            attr.value
                        ))
                    })?);
                }
                other => {
                    return Err(SaiError::invalid_parameter(format!(
                        "{} is not an FDB flush attribute",
                        other
                    )))
                }
            }
        }
        Ok(filter)
    }

    fn matches(&self, key: &FdbEntryKey, attrs: &AttributeMap, entry_type: FdbEntryType) -> bool {
        if let Some(port) = self.bridge_port_id {
            let stored = attrs
                .get(&AttrId::from(FdbEntryAttr::BridgePortId))
                .and_then(AttrValue::as_oid);
            if stored != Some(port) {
                return false;
            }
        }
        if let Some(bv_id) = self.bv_id {
            if key.bv_id != bv_id {
                return false;
            }
        }
        match self.entry_type.unwrap_or(FdbFlushEntryType::All) {
            FdbFlushEntryType::All => true,
            FdbFlushEntryType::Dynamic => entry_type == FdbEntryType::Dynamic,
            FdbFlushEntryType::Static => entry_type == FdbEntryType::Static,
        }
    }

    /// The consolidated event reported for one flushed group.
    fn event(&self, switch_id: ObjectId, entry_type: FdbEntryType) -> FdbEventData {
        FdbEventData {
            event_type: FdbEventType::Flushed,
            fdb_entry: FdbEntryKey::new(
                switch_id,
                MacAddress::ZERO,
                self.bv_id.unwrap_or(ObjectId::NULL),
            ),
            attrs: vec![
                Attribute::new(
                    FdbEntryAttr::BridgePortId,
                    self.bridge_port_id.unwrap_or(ObjectId::NULL),
                ),
                entry_type_attr(entry_type),
            ],
        }
    }
}

impl VsContext {
    /// Records a MAC seen on `bridge_port_id`.
    ///
    /// Static entries are left alone. A dynamic entry is refreshed and
    /// reported as moved when its port changed.
    pub fn learn_fdb_entry(&mut self, key: &FdbEntryKey, bridge_port_id: ObjectId) -> SaiResult<()> {
        bridge_port_id.expect_type(ObjectType::BridgePort)?;
        let now = self.now();
        let state = self.registry.get_mut(key.switch_id)?;
        if state.by_oid(bridge_port_id).is_none() {
            return Err(SaiError::not_found(bridge_port_id.to_string()));
        }
        let object_key = ObjectKey::Fdb(*key);

        let event_type = match state.object_mut(&object_key) {
            Some(record) => {
                let entry_type = record.get(FdbEntryAttr::Type).map(fdb_entry_type).transpose()?;
                if entry_type == Some(FdbEntryType::Static) {
                    debug!("Ignoring learn of static entry {}", object_key);
                    return Ok(());
                }
                let previous = record.get_oid(FdbEntryAttr::BridgePortId);
                record.set(FdbEntryAttr::BridgePortId, bridge_port_id);
                // A refreshed entry restarts its aging window.
                state.fdb_info.remove(key);
                sync_mirror(state, key, now);
                (previous != Some(bridge_port_id)).then_some(FdbEventType::Move)
            }
            None => {
                let mut attrs = AttributeMap::new();
                attrs.insert(
                    FdbEntryAttr::Type.into(),
                    AttrValue::S32(FdbEntryType::Dynamic.as_s32()),
                );
                attrs.insert(
                    FdbEntryAttr::PacketAction.into(),
                    AttrValue::S32(PacketAction::Forward.as_s32()),
                );
                attrs.insert(FdbEntryAttr::BridgePortId.into(), AttrValue::Oid(bridge_port_id));
                state.insert(object_key, attrs)?;
                sync_mirror(state, key, now);
                Some(FdbEventType::Learned)
            }
        };

        if let Some(event_type) = event_type {
            debug!("FDB {:?} {} on {}", event_type, object_key, bridge_port_id);
            self.notify(Notification::FdbEvent(vec![FdbEventData {
                event_type,
                fdb_entry: *key,
                attrs: vec![
                    entry_type_attr(FdbEntryType::Dynamic),
                    Attribute::new(FdbEntryAttr::PacketAction, AttrValue::S32(PacketAction::Forward.as_s32())),
                    Attribute::new(FdbEntryAttr::BridgePortId, bridge_port_id),
                ],
            }]));
        }
        Ok(())
    }

    /// Removes dynamic entries older than the switch aging time.
    ///
    /// Returns the number of entries aged out across all switches.
    pub fn age_fdb_entries(&mut self) -> usize {
        let now = self.now();
        let mut events = Vec::new();

        for state in self.registry.iter_mut() {
            let aging_time = state
                .by_oid(state.switch_id())
                .and_then(|r| r.get(SwitchAttr::FdbAgingTime))
                .and_then(AttrValue::as_u32)
                .unwrap_or(0);
            if aging_time == 0 {
                continue;
            }

            let expired: Vec<(FdbEntryKey, FdbInfo)> = state
                .fdb_info
                .iter()
                .filter(|(_, info)| now.saturating_sub(info.learned_at) >= u64::from(aging_time))
                .map(|(key, info)| (*key, *info))
                .collect();

            for (key, info) in expired {
                state.fdb_info.remove(&key);
                if state.remove(&ObjectKey::Fdb(key)).is_none() {
                    error!("Learned entry {} had no stored FDB object", ObjectKey::Fdb(key));
                }
                events.push(FdbEventData {
                    event_type: FdbEventType::Aged,
                    fdb_entry: key,
                    attrs: vec![
                        entry_type_attr(FdbEntryType::Dynamic),
                        Attribute::new(FdbEntryAttr::BridgePortId, info.bridge_port_id),
                    ],
                });
            }
        }

        let aged = events.len();
        if aged > 0 {
            info!("Aged out {} FDB entries", aged);
        }
        for event in events {
            self.notify(Notification::FdbEvent(vec![event]));
        }
        aged
    }

    /// Removes every FDB entry of the switch matching all given filters.
    pub fn flush_fdb_entries(&mut self, switch_id: ObjectId, attrs: &[Attribute]) -> SaiResult<()> {
        let filter = FlushFilter::parse(attrs)?;
        let state = self.registry.get_mut(switch_id)?;

        let matched: Vec<(FdbEntryKey, FdbEntryType)> = state
            .objects(ObjectType::FdbEntry)
            .filter_map(|record| {
                let ObjectKey::Fdb(key) = record.key else {
                    return None;
                };
                let entry_type = record
                    .get(FdbEntryAttr::Type)
                    .and_then(AttrValue::as_s32)
                    .and_then(FdbEntryType::from_s32)
                    .unwrap_or(FdbEntryType::Static);
                filter.matches(&key, &record.attrs, entry_type).then_some((key, entry_type))
            })
            .collect();

        let mut flushed_static = 0;
        let mut flushed_dynamic = 0;
        for (key, entry_type) in &matched {
            state.remove(&ObjectKey::Fdb(*key));
            state.fdb_info.remove(key);
            match entry_type {
                FdbEntryType::Static => flushed_static += 1,
                FdbEntryType::Dynamic => flushed_dynamic += 1,
            }
        }

        info!(
            "Flushed {} static and {} dynamic FDB entries on {}",
            flushed_static, flushed_dynamic, switch_id
        );
        if flushed_static > 0 {
            self.notify(Notification::FdbEvent(vec![filter.event(switch_id, FdbEntryType::Static)]));
        }
        if flushed_dynamic > 0 {
            self.notify(Notification::FdbEvent(vec![filter.event(switch_id, FdbEntryType::Dynamic)]));
        }
        Ok(())
    }
}
