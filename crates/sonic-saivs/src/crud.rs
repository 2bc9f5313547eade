//! Generic create/remove/set/get over the object store.
//!
//! One handler per primitive, dispatched on the object type. The caller
//! holds the process lock.

use crate::bootstrap;
use crate::context::VsContext;
use crate::fdb;
use crate::state::{AttributeMap, SwitchState};
use log::{debug, info};
use sonic_sai::attr::{BridgeAttr, BridgePortAttr, DebugCounterAttr, FdbEntryAttr, LagAttr, LagMemberAttr, PortAttr, SwitchAttr, VlanAttr, VlanMemberAttr};
use sonic_sai::enums::{FdbEntryType, PortType};
use sonic_sai::{
    AttrId, AttrValue, Attribute, ObjectId, ObjectKey, ObjectType, SaiError, SaiResult, StatId,
    StatsMode, Transfer,
};
use std::collections::BTreeSet;

/// Object types the virtual switch does not model.
fn check_supported(object_type: ObjectType) -> SaiResult<()> {
    match object_type {
        ObjectType::Udf
        | ObjectType::UdfMatch
        | ObjectType::UdfGroup
        | ObjectType::L2mcGroup
        | ObjectType::L2mcGroupMember
        | ObjectType::IpmcGroup
        | ObjectType::IpmcGroupMember
        | ObjectType::RpfGroup
        | ObjectType::RpfGroupMember
        | ObjectType::McastFdbEntry
        | ObjectType::L2mcEntry
        | ObjectType::IpmcEntry
        | ObjectType::Tam => Err(SaiError::not_implemented(object_type.name())),
        _ => Ok(()),
    }
}

/// Checks attribute/object type agreement, value shapes and duplicates.
/// Read-only attributes are refused unless `allow_read_only`.
pub(crate) fn validate_attrs(
    object_type: ObjectType,
    attrs: &[Attribute],
    allow_read_only: bool,
) -> SaiResult<()> {
    let mut seen = BTreeSet::new();
    for attr in attrs {
        if attr.id.object_type() != object_type {
            return Err(SaiError::invalid_parameter(format!(
                "{} is not an attribute of {}",
                attr.id, object_type
            )));
        }
        attr.check_kind()?;
        if !allow_read_only && attr.id.is_read_only() {
            return Err(SaiError::invalid_parameter(format!("{} is read-only", attr.id)));
        }
        if !seen.insert(attr.id) {
            return Err(SaiError::invalid_parameter(format!("duplicate attribute {}", attr.id)));
        }
    }
    Ok(())
}

pub(crate) fn to_attribute_map(attrs: &[Attribute]) -> AttributeMap {
    attrs
        .iter()
        .map(|a| (a.id, a.value.clone().into_stored()))
        .collect()
}

/// Key of an id-addressed object, checking the id against the type.
fn oid_key(object_type: ObjectType, oid: ObjectId) -> SaiResult<ObjectKey> {
    oid.expect_type(object_type)?;
    ObjectKey::from_oid(oid)
}

fn entry_key(key: &ObjectKey) -> SaiResult<()> {
    check_supported(key.object_type())?;
    if key.oid().is_some() {
        return Err(SaiError::invalid_parameter(format!(
            "{} is addressed by object id",
            key.object_type()
        )));
    }
    key.switch_id().expect_type(ObjectType::Switch)
}

/// Recomputes read-only lists derived from other objects.
fn refresh_derived(state: &mut SwitchState, key: &ObjectKey) {
    let Some(oid) = key.oid() else {
        return;
    };

    let (attr, items): (AttrId, Vec<ObjectId>) = match key.object_type() {
        ObjectType::Vlan => (
            VlanAttr::MemberList.into(),
            state.referencing(ObjectType::VlanMember, VlanMemberAttr::VlanId.into(), oid),
        ),
        ObjectType::Bridge => (
            BridgeAttr::PortList.into(),
            state.referencing(ObjectType::BridgePort, BridgePortAttr::BridgeId.into(), oid),
        ),
        ObjectType::Lag => (
            LagAttr::PortList.into(),
            state.referencing(ObjectType::LagMember, LagMemberAttr::LagId.into(), oid),
        ),
        ObjectType::Switch => {
            let ports = data_ports(state);
            if let Some(record) = state.object_mut(key) {
                record.set(SwitchAttr::PortNumber, ports.len() as u32);
            }
            (SwitchAttr::PortList.into(), ports)
        }
        _ => return,
    };

    if let Some(record) = state.object_mut(key) {
        record.set(attr, items);
    }
}

/// Front panel ports, excluding the CPU port.
pub(crate) fn data_ports(state: &SwitchState) -> Vec<ObjectId> {
    state
        .objects(ObjectType::Port)
        .filter(|r| {
            r.get(PortAttr::Type).and_then(AttrValue::as_s32) != Some(PortType::Cpu.as_s32())
        })
        .filter_map(|r| r.key.oid())
        .collect()
}

impl VsContext {
    pub fn create(
        &mut self,
        object_type: ObjectType,
        switch_id: ObjectId,
        attrs: &[Attribute],
    ) -> SaiResult<ObjectId> {
        check_supported(object_type)?;
        validate_attrs(object_type, attrs, false)?;

        if object_type == ObjectType::Switch {
            return self.create_switch(attrs);
        }
        if !object_type.is_oid_object() {
            return Err(SaiError::invalid_parameter(format!(
                "{} is not created by object id",
                object_type
            )));
        }

        let state = self.registry.get_mut(switch_id)?;
        let mut map = to_attribute_map(attrs);

        let debug_index = if object_type == ObjectType::DebugCounter {
            let index = state.debug_counters.allocate()?;
            map.insert(DebugCounterAttr::Index.into(), AttrValue::U32(index));
            Some(index)
        } else {
            None
        };

        let inserted = self
            .oids
            .allocate(switch_id.switch_index(), object_type)
            .and_then(|oid| state.insert(ObjectKey::Object { object_type, oid }, map).map(|()| oid));

        match inserted {
            Ok(oid) => {
                debug!("Created {:?}", oid);
                Ok(oid)
            }
            Err(e) => {
                if let Some(index) = debug_index {
                    state.debug_counters.release(index);
                }
                Err(e)
            }
        }
    }

    fn create_switch(&mut self, attrs: &[Attribute]) -> SaiResult<ObjectId> {
        let index = self.switch_indexes.allocate()?;
        let state = bootstrap::build_switch(index, attrs, &self.config, &mut self.oids)?;
        let switch_id = state.switch_id();
        info!(
            "Created switch {} with {} objects",
            switch_id,
            state.object_count()
        );
        self.registry.insert(index, state);
        Ok(switch_id)
    }

    pub fn remove(&mut self, object_type: ObjectType, oid: ObjectId) -> SaiResult<()> {
        let key = oid_key(object_type, oid)?;

        if object_type == ObjectType::Switch {
            self.registry.remove(oid)?;
            info!("Removed switch {}", oid);
            return Ok(());
        }

        let state = self.registry.get_mut(oid.switch_id())?;
        let record = state
            .remove(&key)
            .ok_or_else(|| SaiError::not_found(key.to_string()))?;

        if object_type == ObjectType::DebugCounter {
            if let Some(index) = record.get(DebugCounterAttr::Index).and_then(AttrValue::as_u32) {
                state.debug_counters.release(index);
            }
        }
        debug!("Removed {:?}", oid);
        Ok(())
    }

    pub fn set(&mut self, object_type: ObjectType, oid: ObjectId, attr: &Attribute) -> SaiResult<()> {
        let key = oid_key(object_type, oid)?;
        self.set_on_key(&key, attr, false)
    }

    /// Fails the way [`set_on_key`](Self::set_on_key) would, without writing.
    pub(crate) fn check_set(
        &self,
        key: &ObjectKey,
        attr: &Attribute,
        allow_read_only: bool,
    ) -> SaiResult<()> {
        validate_attrs(key.object_type(), std::slice::from_ref(attr), allow_read_only)?;
        if key.object_type() == ObjectType::FdbEntry && attr.id == AttrId::from(FdbEntryAttr::Type) {
            fdb_entry_type(&attr.value)?;
        }
        if !self.registry.get(key.switch_id())?.contains(key) {
            return Err(SaiError::not_found(key.to_string()));
        }
        Ok(())
    }

    /// Replaces one attribute of an existing object.
    pub(crate) fn set_on_key(
        &mut self,
        key: &ObjectKey,
        attr: &Attribute,
        allow_read_only: bool,
    ) -> SaiResult<()> {
        self.check_set(key, attr, allow_read_only)?;

        let now = self.now();
        let state = self.registry.get_mut(key.switch_id())?;
        let record = state
            .object_mut(key)
            .ok_or_else(|| SaiError::not_found(key.to_string()))?;
        record.attrs.insert(attr.id, attr.value.clone().into_stored());

        if let ObjectKey::Fdb(fdb_key) = key {
            fdb::sync_mirror(state, fdb_key, now);
        }
        debug!("Set {} on {}", attr.id, key);
        Ok(())
    }

    pub fn get(&mut self, object_type: ObjectType, oid: ObjectId, attrs: &mut [Attribute]) -> SaiResult<()> {
        let key = oid_key(object_type, oid)?;
        self.get_on_key(&key, attrs)
    }

    fn get_on_key(&mut self, key: &ObjectKey, attrs: &mut [Attribute]) -> SaiResult<()> {
        for attr in attrs.iter() {
            if attr.id.object_type() != key.object_type() {
                return Err(SaiError::invalid_parameter(format!(
                    "{} is not an attribute of {}",
                    attr.id,
                    key.object_type()
                )));
            }
        }

        let state = self.registry.get_mut(key.switch_id())?;
        if !state.contains(key) {
            return Err(SaiError::not_found(key.to_string()));
        }
        refresh_derived(state, key);
        let record = state
            .object(key)
            .ok_or_else(|| SaiError::not_found(key.to_string()))?;

        let mut overflow = Vec::new();
        for attr in attrs.iter_mut() {
            let stored = record
                .attrs
                .get(&attr.id)
                .ok_or_else(|| SaiError::not_implemented(format!("{} on {}", attr.id, key)))?;
            if let Transfer::Overflow { required } = attr.value.fill_from(stored)? {
                overflow.push(format!("{} needs {}", attr.id, required));
            }
        }

        if !overflow.is_empty() {
            return Err(SaiError::buffer_overflow(overflow.join(", ")));
        }
        Ok(())
    }

    pub fn create_entry(&mut self, key: &ObjectKey, attrs: &[Attribute]) -> SaiResult<()> {
        entry_key(key)?;
        validate_attrs(key.object_type(), attrs, false)?;

        let fdb_type = match key {
            ObjectKey::Fdb(_) => {
                let value = sonic_sai::attr::find_attr(attrs, FdbEntryAttr::Type).ok_or_else(|| {
                    SaiError::invalid_parameter("FDB entry needs SAI_FDB_ENTRY_ATTR_TYPE")
                })?;
                Some(fdb_entry_type(value)?)
            }
            _ => None,
        };

        let now = self.now();
        let state = self.registry.get_mut(key.switch_id())?;
        state.insert(*key, to_attribute_map(attrs))?;

        if let (ObjectKey::Fdb(fdb_key), Some(FdbEntryType::Dynamic)) = (key, fdb_type) {
            fdb::sync_mirror(state, fdb_key, now);
        }
        debug!("Created {}", key);
        Ok(())
    }

    pub fn remove_entry(&mut self, key: &ObjectKey) -> SaiResult<()> {
        entry_key(key)?;
        let state = self.registry.get_mut(key.switch_id())?;
        state
            .remove(key)
            .ok_or_else(|| SaiError::not_found(key.to_string()))?;
        if let ObjectKey::Fdb(fdb_key) = key {
            state.fdb_info.remove(fdb_key);
        }
        debug!("Removed {}", key);
        Ok(())
    }

    pub fn set_entry(&mut self, key: &ObjectKey, attr: &Attribute) -> SaiResult<()> {
        entry_key(key)?;
        self.set_on_key(key, attr, false)
    }

    pub fn get_entry(&mut self, key: &ObjectKey, attrs: &mut [Attribute]) -> SaiResult<()> {
        entry_key(key)?;
        self.get_on_key(key, attrs)
    }

    pub fn get_stats_ext(
        &mut self,
        object_type: ObjectType,
        oid: ObjectId,
        ids: &[StatId],
        mode: StatsMode,
    ) -> SaiResult<Vec<u64>> {
        let key = self.stats_key(object_type, oid, ids)?;
        let state = self.registry.get_mut(key.switch_id())?;
        let values = ids.iter().map(|id| state.counter(&key, *id)).collect();
        if mode == StatsMode::ReadAndClear {
            for id in ids {
                state.set_counter(&key, *id, 0);
            }
        }
        Ok(values)
    }

    pub fn clear_stats(&mut self, object_type: ObjectType, oid: ObjectId, ids: &[StatId]) -> SaiResult<()> {
        let key = self.stats_key(object_type, oid, ids)?;
        let state = self.registry.get_mut(key.switch_id())?;
        for id in ids {
            state.set_counter(&key, *id, 0);
        }
        Ok(())
    }

    /// Resolves the key of a stats call, checking every id up front.
    fn stats_key(&self, object_type: ObjectType, oid: ObjectId, ids: &[StatId]) -> SaiResult<ObjectKey> {
        let key = oid_key(object_type, oid)?;
        if let Some(id) = ids.iter().find(|id| id.object_type() != object_type) {
            return Err(SaiError::invalid_parameter(format!(
                "{} is not a stat of {}",
                id, object_type
            )));
        }
        if !self.registry.get(key.switch_id())?.contains(&key) {
            return Err(SaiError::not_found(key.to_string()));
        }
        Ok(key)
    }
}

pub(crate) fn fdb_entry_type(value: &AttrValue) -> SaiResult<FdbEntryType> {
    value
        .as_s32()
        .and_then(FdbEntryType::from_s32)
        .ok_or_else(|| SaiError::invalid_parameter(format!("invalid FDB entry type {:?}", value)))
}
