mod common;

use common::harness;
use pretty_assertions::assert_eq;
use sonic_sai::attr::{FdbEntryAttr, FdbFlushAttr, PortAttr, SwitchAttr, VlanAttr};
use sonic_sai::enums::FdbEntryType;
use sonic_sai::stats::PortStat;
use sonic_sai::{
    AttrValue, Attribute, FdbEntryKey, MacAddress, ObjectId, ObjectKey, ObjectType, SaiApi,
    SaiStatus, StatId, StatsMode,
};
use sonic_sairedis::protocol::{OP_CREATE, OP_FLUSH_FDB, VIDCOUNTER};

#[test]
fn test_create_allocates_vid_from_counter() {
    let h = harness();
    let switch_id = h.sai.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();
    assert_eq!(switch_id, ObjectId::for_switch(0));
    // Switch ids come from the local index pool.
    assert_eq!(h.store.counter(VIDCOUNTER), 0);

    let vlan = h
        .sai
        .create(
            ObjectType::Vlan,
            switch_id,
            &[Attribute::new(VlanAttr::VlanId, AttrValue::U16(100))],
        )
        .unwrap();
    assert_eq!(h.store.counter(VIDCOUNTER), 1);
    assert_eq!(vlan.object_type(), Some(ObjectType::Vlan));
    assert_eq!(vlan.switch_id(), switch_id);

    let request = h.responder.last_request().unwrap();
    assert_eq!(request.op, OP_CREATE);
    assert_eq!(request.key, ObjectKey::from_oid(vlan).unwrap().to_string());

    let second = h.sai.create(ObjectType::Vlan, switch_id, &[]).unwrap();
    assert_ne!(second, vlan);
    assert_eq!(h.store.counter(VIDCOUNTER), 2);
}

#[test]
fn test_create_rejects_entry_types_and_bad_switch() {
    let h = harness();
    let err = h
        .sai
        .create(ObjectType::FdbEntry, ObjectId::for_switch(0), &[])
        .unwrap_err();
    assert_eq!(err.status(), SaiStatus::InvalidParameter);

    let err = h.sai.create(ObjectType::Port, ObjectId::NULL, &[]).unwrap_err();
    assert_eq!(err.status(), SaiStatus::InvalidParameter);
    let port = ObjectId::encode(0, ObjectType::Port, 9).unwrap();
    let err = h.sai.create(ObjectType::Vlan, port, &[]).unwrap_err();
    assert_eq!(err.status(), SaiStatus::InvalidObjectId);
    assert!(h.responder.last_request().is_none());
}

#[test]
fn test_set_then_get() {
    let h = harness();
    let switch_id = h.sai.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();
    let port = h
        .sai
        .create(
            ObjectType::Port,
            switch_id,
            &[Attribute::new(PortAttr::Mtu, 1500u32)],
        )
        .unwrap();

    h.sai
        .set(ObjectType::Port, port, &Attribute::new(PortAttr::Mtu, 9100u32))
        .unwrap();

    let mut attrs = [Attribute::request(PortAttr::Mtu, 0)];
    h.sai.get(ObjectType::Port, port, &mut attrs).unwrap();
    assert_eq!(attrs[0].value, AttrValue::U32(9100));

    let mut missing = [Attribute::request(PortAttr::Speed, 0)];
    let err = h.sai.get(ObjectType::Port, port, &mut missing).unwrap_err();
    assert_eq!(err.status(), SaiStatus::NotImplemented);
}

#[test]
fn test_get_overflow_reports_required_count() {
    let h = harness();
    let switch_id = h.sai.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();
    let ports: Vec<ObjectId> = (1..=4)
        .map(|i| ObjectId::encode(0, ObjectType::Port, i).unwrap())
        .collect();
    h.responder.side.lock().objects.insert(
        ObjectKey::from_oid(switch_id).unwrap().to_string(),
        vec![Attribute::new(SwitchAttr::PortList, ports.clone())],
    );

    let mut small = [Attribute::request(SwitchAttr::PortList, 2)];
    let err = h.sai.get(ObjectType::Switch, switch_id, &mut small).unwrap_err();
    assert_eq!(err.status(), SaiStatus::BufferOverflow);
    match &small[0].value {
        AttrValue::OidList(list) => {
            assert_eq!(list.count(), 4);
            assert!(list.is_empty());
        }
        other => panic!("unexpected value {:?}", other),
    }

    let mut large = [Attribute::request(SwitchAttr::PortList, 8)];
    h.sai.get(ObjectType::Switch, switch_id, &mut large).unwrap();
    assert_eq!(large[0].value.as_oid_list().unwrap(), ports.as_slice());
}

#[test]
fn test_remove_reports_switch_status() {
    let h = harness();
    let switch_id = h.sai.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();
    let vlan = h.sai.create(ObjectType::Vlan, switch_id, &[]).unwrap();

    h.sai.remove(ObjectType::Vlan, vlan).unwrap();
    let err = h.sai.remove(ObjectType::Vlan, vlan).unwrap_err();
    assert_eq!(err.status(), SaiStatus::ItemNotFound);

    let err = h.sai.remove(ObjectType::Port, vlan).unwrap_err();
    assert_eq!(err.status(), SaiStatus::InvalidObjectId);
}

#[test]
fn test_fdb_entry_round_trip() {
    let h = harness();
    let switch_id = h.sai.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();
    let bv_id = ObjectId::encode(0, ObjectType::Vlan, 77).unwrap();
    let key = ObjectKey::Fdb(FdbEntryKey::new(
        switch_id,
        MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
        bv_id,
    ));
    let entry_type = Attribute::new(
        FdbEntryAttr::Type,
        AttrValue::S32(FdbEntryType::Static.as_s32()),
    );

    h.sai.create_entry(&key, &[entry_type.clone()]).unwrap();
    let err = h.sai.create_entry(&key, &[entry_type.clone()]).unwrap_err();
    assert_eq!(err.status(), SaiStatus::ItemAlreadyExists);

    let mut attrs = [Attribute::request(FdbEntryAttr::Type, 0)];
    h.sai.get_entry(&key, &mut attrs).unwrap();
    assert_eq!(attrs[0], entry_type);

    h.sai.remove_entry(&key).unwrap();
    let err = h.sai.get_entry(&key, &mut attrs).unwrap_err();
    assert_eq!(err.status(), SaiStatus::ItemNotFound);
}

#[test]
fn test_stats_modes() {
    let h = harness();
    let switch_id = h.sai.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();
    let port = h.sai.create(ObjectType::Port, switch_id, &[]).unwrap();
    let key = ObjectKey::from_oid(port).unwrap().to_string();
    h.responder.set_counter(&key, "SAI_PORT_STAT_IF_IN_OCTETS", 10);
    h.responder.set_counter(&key, "SAI_PORT_STAT_IF_OUT_OCTETS", 20);

    let ids = [
        StatId::Port(PortStat::IfOutOctets),
        StatId::Port(PortStat::IfInOctets),
    ];
    assert_eq!(h.sai.get_stats(ObjectType::Port, port, &ids).unwrap(), vec![20, 10]);
    assert_eq!(
        h.sai
            .get_stats_ext(ObjectType::Port, port, &ids[..1], StatsMode::ReadAndClear)
            .unwrap(),
        vec![20]
    );
    assert_eq!(h.sai.get_stats(ObjectType::Port, port, &ids).unwrap(), vec![0, 10]);

    h.sai.clear_stats(ObjectType::Port, port, &ids[1..]).unwrap();
    assert_eq!(h.sai.get_stats(ObjectType::Port, port, &ids).unwrap(), vec![0, 0]);
}

#[test]
fn test_flush_is_sent_on_switch_key() {
    let h = harness();
    let switch_id = h.sai.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();
    h.sai
        .flush_fdb_entries(
            switch_id,
            &[Attribute::new(
                FdbFlushAttr::EntryType,
                AttrValue::S32(FdbEntryType::Dynamic.as_s32()),
            )],
        )
        .unwrap();

    let request = h.responder.last_request().unwrap();
    assert_eq!(request.op, OP_FLUSH_FDB);
    assert_eq!(request.key, ObjectKey::from_oid(switch_id).unwrap().to_string());
    assert_eq!(request.fvs[0].0, "SAI_FDB_FLUSH_ATTR_ENTRY_TYPE");

    let vlan = h.sai.create(ObjectType::Vlan, switch_id, &[]).unwrap();
    let err = h.sai.flush_fdb_entries(vlan, &[]).unwrap_err();
    assert_eq!(err.status(), SaiStatus::InvalidObjectId);
}
