//! initialize / shutdown behavior of the virtual switch.

mod common;

use common::init_logging;
use pretty_assertions::assert_eq;
use sonic_sai::attr::SwitchAttr;
use sonic_sai::{
    Attribute, ObjectId, ObjectType, ProfileMap, SaiApi, SaiError, SaiStatus, ServiceMethodTable,
};
use sonic_saivs::config::DEFAULT_PORT_COUNT;
use sonic_saivs::VirtualSwitch;

fn services() -> ServiceMethodTable {
    let profile: ProfileMap = [("SAI_VS_SWITCH_TYPE", "SAI_VS_SWITCH_TYPE_MLNX2700")]
        .into_iter()
        .collect();
    ServiceMethodTable::from_profile(profile)
}

#[test]
fn double_initialize_fails() {
    init_logging();
    let vs = VirtualSwitch::new();
    vs.initialize(services(), None).unwrap();
    let err = vs.initialize(services(), None).unwrap_err();
    assert_eq!(err.status(), SaiStatus::Failure);
    vs.shutdown().unwrap();
}

#[test]
fn shutdown_requires_initialize() {
    init_logging();
    let vs = VirtualSwitch::new();
    assert_eq!(vs.shutdown().unwrap_err().status(), SaiStatus::Uninitialized);

    vs.initialize(services(), None).unwrap();
    vs.shutdown().unwrap();
    assert_eq!(vs.shutdown().unwrap_err().status(), SaiStatus::Uninitialized);
}

#[test]
fn missing_service_accessor_is_invalid_parameter() {
    init_logging();
    let vs = VirtualSwitch::new();
    let mut table = services();
    table.profile_get_next_value = None;
    let err = vs.initialize(table, None).unwrap_err();
    assert_eq!(err.status(), SaiStatus::InvalidParameter);
    assert!(!vs.is_initialized());
}

#[test]
fn missing_switch_type_is_rejected() {
    init_logging();
    let vs = VirtualSwitch::new();
    let table = ServiceMethodTable::from_profile(ProfileMap::new());
    assert_eq!(
        vs.initialize(table, None).unwrap_err().status(),
        SaiStatus::InvalidParameter
    );
}

#[test]
fn calls_before_initialize_are_uninitialized() {
    init_logging();
    let vs = VirtualSwitch::new();
    assert!(matches!(
        vs.create(ObjectType::Switch, ObjectId::NULL, &[]),
        Err(SaiError::Uninitialized)
    ));
    assert!(vs.admin_channel().is_err());
    assert_eq!(vs.age_fdb_entries(), None);
}

#[test]
fn reinitialize_starts_from_scratch() {
    init_logging();
    let vs = VirtualSwitch::new();
    vs.initialize(services(), None).unwrap();
    let first = vs.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();
    let vlan = vs.create(ObjectType::Vlan, first, &[]).unwrap();
    vs.shutdown().unwrap();

    vs.initialize(services(), None).unwrap();
    assert!(matches!(
        vs.remove(ObjectType::Vlan, vlan),
        Err(SaiError::NotFound { .. })
    ));
    let second = vs.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();
    assert_eq!(second, first);
    assert_eq!(vs.create(ObjectType::Vlan, second, &[]).unwrap(), vlan);
    vs.shutdown().unwrap();
}

#[test]
fn switches_get_distinct_indexes() {
    init_logging();
    let vs = VirtualSwitch::new();
    vs.initialize(services(), None).unwrap();
    let a = vs.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();
    let b = vs.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();
    assert_ne!(a.switch_index(), b.switch_index());

    vs.remove(ObjectType::Switch, a).unwrap();
    let c = vs.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();
    assert_ne!(c.switch_index(), a.switch_index());

    let mut attrs = [Attribute::request(SwitchAttr::PortNumber, 0)];
    vs.get(ObjectType::Switch, b, &mut attrs).unwrap();
    assert_eq!(attrs[0].value.as_u32(), Some(DEFAULT_PORT_COUNT));
    vs.shutdown().unwrap();
}
