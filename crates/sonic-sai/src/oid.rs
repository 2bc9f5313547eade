//! Object-id virtualization.
//!
//! Object ids are opaque to callers but carry enough structure to dispatch
//! without consulting any store:
//!
//! ```text
//!  63      56 55      48 47                                  0
//! +----------+----------+-------------------------------------+
//! | switch   | object   |              counter                |
//! | index    | type     |                                     |
//! +----------+----------+-------------------------------------+
//! ```
//!
//! The counter only increases; removing an object never returns its id to
//! the allocator.

use crate::error::{SaiError, SaiResult};
use crate::types::ObjectType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw SAI object ID type (matches sai_object_id_t in C).
pub type RawSaiObjectId = u64;

const SWITCH_INDEX_SHIFT: u32 = 56;
const OBJECT_TYPE_SHIFT: u32 = 48;
const COUNTER_MASK: u64 = (1 << OBJECT_TYPE_SHIFT) - 1;

/// Number of distinct switch indexes an id can carry.
pub const MAX_SWITCHES: usize = 256;

/// An encoded SAI object id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(RawSaiObjectId);

impl ObjectId {
    /// The null object ID (SAI_NULL_OBJECT_ID).
    pub const NULL: Self = ObjectId(0);

    /// Wraps a raw value without checking its structure.
    pub const fn from_raw(raw: RawSaiObjectId) -> Self {
        ObjectId(raw)
    }

    /// Encodes a switch index, object type and counter into an id.
    pub fn encode(switch_index: u8, object_type: ObjectType, counter: u64) -> SaiResult<Self> {
        if !object_type.is_oid_object() {
            return Err(SaiError::invalid_parameter(format!(
                "{} is not an object id type",
                object_type
            )));
        }
        if counter > COUNTER_MASK {
            return Err(SaiError::failure("object id counter space exhausted"));
        }

        Ok(ObjectId(
            (u64::from(switch_index) << SWITCH_INDEX_SHIFT)
                | (u64::from(object_type as u8) << OBJECT_TYPE_SHIFT)
                | counter,
        ))
    }

    /// Returns the id of the switch object for a switch index.
    ///
    /// Switch ids use the switch index as their counter so the owning switch
    /// of any object can be derived from the object's id alone.
    pub fn for_switch(switch_index: u8) -> Self {
        ObjectId(
            (u64::from(switch_index) << SWITCH_INDEX_SHIFT)
                | (u64::from(ObjectType::Switch as u8) << OBJECT_TYPE_SHIFT)
                | u64::from(switch_index),
        )
    }

    /// Returns the raw object ID value.
    pub const fn as_raw(&self) -> RawSaiObjectId {
        self.0
    }

    /// Returns true if this is a null object ID.
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Decodes the object type. Null ids decode as `ObjectType::Null`.
    ///
    /// Returns `None` when the type bits do not name a known type.
    pub fn object_type(&self) -> Option<ObjectType> {
        if self.is_null() {
            return Some(ObjectType::Null);
        }
        ObjectType::from_raw(((self.0 >> OBJECT_TYPE_SHIFT) & 0xff) as u8)
    }

    /// Decodes the switch index.
    pub const fn switch_index(&self) -> u8 {
        (self.0 >> SWITCH_INDEX_SHIFT) as u8
    }

    /// Returns the id of the switch owning this object.
    pub fn switch_id(&self) -> Self {
        Self::for_switch(self.switch_index())
    }

    /// Returns the counter part of the id.
    pub const fn counter(&self) -> u64 {
        self.0 & COUNTER_MASK
    }

    /// Checks that a non-null id encodes the expected type.
    pub fn expect_type(&self, expected: ObjectType) -> SaiResult<()> {
        if self.is_null() {
            return Err(SaiError::invalid_parameter(format!(
                "null object id used as {}",
                expected
            )));
        }
        match self.object_type() {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(SaiError::invalid_object_id(format!(
                "{} is {}, expected {}",
                self, actual, expected
            ))),
            None => Err(SaiError::invalid_object_id(format!(
                "{} carries an unknown object type",
                self
            ))),
        }
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.object_type() {
            Some(t) => write!(f, "{}({})", t.name(), self),
            None => write!(f, "ObjectId({})", self),
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "oid:0x{:x}", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = SaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix("oid:0x")
            .ok_or_else(|| SaiError::invalid_parameter(format!("invalid object id {}", s)))?;
        u64::from_str_radix(hex, 16)
            .map(ObjectId)
            .map_err(|_| SaiError::invalid_parameter(format!("invalid object id {}", s)))
    }
}

impl TryFrom<String> for ObjectId {
    type Error = SaiError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ObjectId> for String {
    fn from(oid: ObjectId) -> String {
        oid.to_string()
    }
}

/// Monotonic counter behind object id allocation.
///
/// One allocator lives per process lifecycle; it is only reset by building
/// a new one at reinitialization.
#[derive(Debug, Default)]
pub struct OidAllocator {
    next: u64,
}

impl OidAllocator {
    /// Creates an allocator that starts at counter 1.
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocates a fresh id for an object on the given switch.
    pub fn allocate(&mut self, switch_index: u8, object_type: ObjectType) -> SaiResult<ObjectId> {
        if object_type == ObjectType::Switch {
            return Ok(ObjectId::for_switch(switch_index));
        }
        let counter = self
            .next
            .checked_add(1)
            .ok_or_else(|| SaiError::failure("object id counter space exhausted"))?;
        let oid = ObjectId::encode(switch_index, object_type, counter)?;
        self.next = counter;
        Ok(oid)
    }

    /// Returns the last counter value handed out.
    pub fn last(&self) -> u64 {
        self.next
    }
}

/// Hands out switch indexes; an index is never reused within a lifecycle.
#[derive(Debug, Default)]
pub struct SwitchIndexPool {
    next: usize,
}

impl SwitchIndexPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocates the next switch index.
    pub fn allocate(&mut self) -> SaiResult<u8> {
        if self.next >= MAX_SWITCHES {
            return Err(SaiError::failure(format!(
                "switch index space exhausted ({} switches)",
                MAX_SWITCHES
            )));
        }
        let index = self.next as u8;
        self.next += 1;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_without_lookup() {
        let mut alloc = OidAllocator::new();
        for index in [0u8, 1, 7, 255] {
            for t in [ObjectType::Port, ObjectType::Vlan, ObjectType::DebugCounter] {
                let oid = alloc.allocate(index, t).unwrap();
                assert_eq!(oid.object_type(), Some(t));
                assert_eq!(oid.switch_index(), index);
                assert_eq!(oid.switch_id(), ObjectId::for_switch(index));
            }
        }
    }

    #[test]
    fn test_counter_only_increases() {
        let mut alloc = OidAllocator::new();
        let a = alloc.allocate(0, ObjectType::Port).unwrap();
        let b = alloc.allocate(0, ObjectType::Port).unwrap();
        assert!(b.counter() > a.counter());
        assert_ne!(a, b);
    }

    #[test]
    fn test_switch_id_layout() {
        let sw = ObjectId::for_switch(3);
        assert_eq!(sw.object_type(), Some(ObjectType::Switch));
        assert_eq!(sw.switch_index(), 3);
        assert_eq!(sw.as_raw(), 0x0321_0000_0000_0003);
    }

    #[test]
    fn test_entry_types_have_no_ids() {
        assert!(ObjectId::encode(0, ObjectType::FdbEntry, 1).is_err());
        assert!(ObjectId::encode(0, ObjectType::Null, 1).is_err());
    }

    #[test]
    fn test_expect_type() {
        let port = ObjectId::encode(0, ObjectType::Port, 5).unwrap();
        assert!(port.expect_type(ObjectType::Port).is_ok());
        let err = port.expect_type(ObjectType::Vlan).unwrap_err();
        assert!(matches!(err, SaiError::InvalidObjectId { .. }));
        let err = ObjectId::NULL.expect_type(ObjectType::Port).unwrap_err();
        assert!(matches!(err, SaiError::InvalidParameter { .. }));
    }

    #[test]
    fn test_string_form() {
        let oid = ObjectId::from_raw(0x1000000000001);
        assert_eq!(oid.to_string(), "oid:0x1000000000001");
        assert_eq!("oid:0x1000000000001".parse::<ObjectId>().unwrap(), oid);
        assert!("0x1".parse::<ObjectId>().is_err());
    }

    #[test]
    fn test_switch_index_pool_exhaustion() {
        let mut pool = SwitchIndexPool::new();
        for expected in 0..MAX_SWITCHES {
            assert_eq!(pool.allocate().unwrap() as usize, expected);
        }
        assert!(pool.allocate().is_err());
    }
}
