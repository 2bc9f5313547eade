mod common;

use common::{harness, init_logging, publish_notification, services, WAIT};
use pretty_assertions::assert_eq;
use sonic_sai::enums::FdbEventType;
use sonic_sai::{
    FdbEntryKey, FdbEventData, MacAddress, Notification, ObjectId, ObjectType, SaiApi, SaiStatus,
    ServiceMethodTable,
};
use sonic_sairedis::{InMemoryStore, RedisSai};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[test]
fn test_calls_before_initialize() {
    init_logging();
    let sai = RedisSai::new(Arc::new(InMemoryStore::new()));
    assert!(!sai.is_initialized());
    let err = sai.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap_err();
    assert_eq!(err.status(), SaiStatus::Uninitialized);
    assert_eq!(sai.shutdown().unwrap_err().status(), SaiStatus::Uninitialized);
}

#[test]
fn test_initialize_twice_fails() {
    let h = harness();
    assert!(h.sai.is_initialized());
    let err = h.sai.initialize(services(100), None).unwrap_err();
    assert_eq!(err.status(), SaiStatus::Failure);

    h.sai.shutdown().unwrap();
    assert!(!h.sai.is_initialized());
    h.sai.initialize(services(2_000), None).unwrap();
    assert!(h.sai.is_initialized());
}

#[test]
fn test_initialize_validates_services() {
    init_logging();
    let sai = RedisSai::new(Arc::new(InMemoryStore::new()));
    let mut table = ServiceMethodTable::from_profile(Default::default());
    table.profile_get_next_value = None;
    assert_eq!(
        sai.initialize(table, None).unwrap_err().status(),
        SaiStatus::InvalidParameter
    );
    assert!(!sai.is_initialized());
}

#[test]
fn test_switch_indexes_are_distinct() {
    let h = harness();
    let first = h.sai.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();
    let second = h.sai.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();
    assert_ne!(first.switch_index(), second.switch_index());
    assert_eq!(second.object_type(), Some(ObjectType::Switch));
}

#[test]
fn test_call_times_out_without_responder() {
    init_logging();
    let sai = RedisSai::new(Arc::new(InMemoryStore::new()));
    sai.initialize(services(200), None).unwrap();

    let started = Instant::now();
    let err = sai.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap_err();
    assert_eq!(err.status(), SaiStatus::Failure);
    assert!(started.elapsed() < WAIT);
}

#[test]
fn test_notification_reaches_handler() {
    let h = harness();
    let switch_id = ObjectId::for_switch(0);
    let event = FdbEventData {
        event_type: FdbEventType::Learned,
        fdb_entry: FdbEntryKey::new(
            switch_id,
            MacAddress::new([0x02, 0, 0, 0, 0, 0x01]),
            ObjectId::encode(0, ObjectType::Vlan, 5).unwrap(),
        ),
        attrs: vec![],
    };

    publish_notification(&h.store, &Notification::FdbEvent(vec![event.clone()]));
    assert_eq!(h.events.recv_timeout(WAIT).unwrap(), vec![event.clone()]);

    h.sai.shutdown().unwrap();
    publish_notification(&h.store, &Notification::FdbEvent(vec![event]));
    assert!(h.events.recv_timeout(Duration::from_millis(200)).is_err());
}
