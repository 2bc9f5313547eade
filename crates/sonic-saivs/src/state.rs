//! Per-switch object database.
//!
//! A [`SwitchState`] owns every object of one virtual switch: the object
//! hash (type, then object key, then attributes), the stat counters,
//! the learned FDB index and the debug counter index pool.

use sonic_sai::{
    AttrId, AttrValue, FdbEntryKey, ObjectId, ObjectKey, ObjectType, SaiError, SaiResult, StatId,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Attributes of one object, ordered by id.
pub type AttributeMap = BTreeMap<AttrId, AttrValue>;

/// One stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub key: ObjectKey,
    pub attrs: AttributeMap,
}

impl ObjectRecord {
    pub fn get(&self, id: impl Into<AttrId>) -> Option<&AttrValue> {
        self.attrs.get(&id.into())
    }

    pub fn set(&mut self, id: impl Into<AttrId>, value: impl Into<AttrValue>) {
        self.attrs.insert(id.into(), value.into());
    }

    pub fn get_oid(&self, id: impl Into<AttrId>) -> Option<ObjectId> {
        self.get(id).and_then(AttrValue::as_oid)
    }
}

/// Learned-entry index record for a dynamic FDB entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdbInfo {
    pub bridge_port_id: ObjectId,
    pub vlan_id: u16,
    pub learned_at: u64,
}

/// Maximum number of debug counters per switch.
pub const MAX_DEBUG_COUNTERS: u32 = 32;

/// Bounded pool of debug counter indexes.
#[derive(Debug, Default)]
pub struct DebugCounterPool {
    used: BTreeSet<u32>,
}

impl DebugCounterPool {
    /// Takes the lowest free index.
    pub fn allocate(&mut self) -> SaiResult<u32> {
        let index = (0..MAX_DEBUG_COUNTERS)
            .find(|i| !self.used.contains(i))
            .ok_or_else(|| {
                SaiError::failure(format!(
                    "debug counter pool exhausted ({} in use)",
                    MAX_DEBUG_COUNTERS
                ))
            })?;
        self.used.insert(index);
        Ok(index)
    }

    pub fn release(&mut self, index: u32) {
        self.used.remove(&index);
    }

    pub fn in_use(&self) -> usize {
        self.used.len()
    }
}

/// State of one virtual switch.
#[derive(Debug)]
pub struct SwitchState {
    switch_id: ObjectId,
    object_hash: BTreeMap<ObjectType, BTreeMap<ObjectKey, ObjectRecord>>,
    counters: HashMap<ObjectKey, BTreeMap<StatId, u64>>,
    pub fdb_info: BTreeMap<FdbEntryKey, FdbInfo>,
    pub debug_counters: DebugCounterPool,
}

impl SwitchState {
    pub fn new(switch_id: ObjectId) -> Self {
        Self {
            switch_id,
            object_hash: BTreeMap::new(),
            counters: HashMap::new(),
            fdb_info: BTreeMap::new(),
            debug_counters: DebugCounterPool::default(),
        }
    }

    pub fn switch_id(&self) -> ObjectId {
        self.switch_id
    }

    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.object(key).is_some()
    }

    pub fn object(&self, key: &ObjectKey) -> Option<&ObjectRecord> {
        self.object_hash
            .get(&key.object_type())
            .and_then(|objects| objects.get(key))
    }

    pub fn object_mut(&mut self, key: &ObjectKey) -> Option<&mut ObjectRecord> {
        self.object_hash
            .get_mut(&key.object_type())
            .and_then(|objects| objects.get_mut(key))
    }

    /// Looks an id-addressed object up.
    pub fn by_oid(&self, oid: ObjectId) -> Option<&ObjectRecord> {
        ObjectKey::from_oid(oid).ok().and_then(|key| self.object(&key))
    }

    /// Inserts a new object; fails if the key is taken.
    pub fn insert(&mut self, key: ObjectKey, attrs: AttributeMap) -> SaiResult<()> {
        let objects = self.object_hash.entry(key.object_type()).or_default();
        if objects.contains_key(&key) {
            return Err(SaiError::already_exists(key.to_string()));
        }
        objects.insert(key, ObjectRecord { key, attrs });
        Ok(())
    }

    /// Removes an object together with its counters.
    pub fn remove(&mut self, key: &ObjectKey) -> Option<ObjectRecord> {
        let record = self
            .object_hash
            .get_mut(&key.object_type())
            .and_then(|objects| objects.remove(key))?;
        self.counters.remove(key);
        Some(record)
    }

    /// All objects of one type, in key order.
    pub fn objects(&self, object_type: ObjectType) -> impl Iterator<Item = &ObjectRecord> {
        self.object_hash
            .get(&object_type)
            .into_iter()
            .flat_map(|objects| objects.values())
    }

    /// Ids of the objects of `object_type` whose `attr` references `target`.
    pub fn referencing(&self, object_type: ObjectType, attr: AttrId, target: ObjectId) -> Vec<ObjectId> {
        self.objects(object_type)
            .filter(|r| r.attrs.get(&attr).and_then(AttrValue::as_oid) == Some(target))
            .filter_map(|r| r.key.oid())
            .collect()
    }

    pub fn object_count(&self) -> usize {
        self.object_hash.values().map(BTreeMap::len).sum()
    }

    pub fn counter(&self, key: &ObjectKey, id: StatId) -> u64 {
        self.counters
            .get(key)
            .and_then(|c| c.get(&id))
            .copied()
            .unwrap_or(0)
    }

    pub fn set_counter(&mut self, key: &ObjectKey, id: StatId, value: u64) {
        self.counters.entry(*key).or_default().insert(id, value);
    }
}
