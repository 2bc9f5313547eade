//! Default object set of a freshly created switch.
//!
//! The switch is built detached from the registry and only handed back
//! once every default object exists.

use crate::config::VsConfig;
use crate::crud::{data_ports, to_attribute_map};
use crate::state::{AttributeMap, SwitchState};
use log::debug;
use sonic_sai::attr::{
    BridgeAttr, BridgePortAttr, HostifTrapGroupAttr, PortAttr, SwitchAttr, VirtualRouterAttr,
    VlanAttr, VlanMemberAttr,
};
use sonic_sai::enums::{
    BridgePortType, BridgeType, PortOperStatus, PortType, SwitchOperStatus, VlanTaggingMode,
};
use sonic_sai::{
    AttrId, AttrValue, Attribute, MacAddress, ObjectId, ObjectKey, ObjectType, OidAllocator,
    SaiList, SaiResult,
};

/// Source MAC used when the switch is created without one.
pub const DEFAULT_SRC_MAC: MacAddress = MacAddress::new([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]);

pub const DEFAULT_VLAN_ID: u16 = 1;

pub const DEFAULT_PORT_MTU: u32 = 9100;

/// FDB aging time in seconds; 0 disables aging.
pub const DEFAULT_FDB_AGING_TIME: u32 = 0;

/// Learning mode of the default bridge ports (hardware learning).
const FDB_LEARNING_MODE_HW: i32 = 2;

struct Builder<'a> {
    state: SwitchState,
    index: u8,
    oids: &'a mut OidAllocator,
}

impl Builder<'_> {
    fn add(&mut self, object_type: ObjectType, attrs: Vec<(AttrId, AttrValue)>) -> SaiResult<ObjectId> {
        let oid = self.oids.allocate(self.index, object_type)?;
        let attrs: AttributeMap = attrs.into_iter().collect();
        self.state.insert(ObjectKey::Object { object_type, oid }, attrs)?;
        Ok(oid)
    }

    fn set_switch(&mut self, attr: SwitchAttr, value: impl Into<AttrValue>) {
        let key = ObjectKey::Object {
            object_type: ObjectType::Switch,
            oid: self.state.switch_id(),
        };
        if let Some(record) = self.state.object_mut(&key) {
            record.set(attr, value);
        }
    }

    fn switch_attr(&self, attr: SwitchAttr) -> Option<&AttrValue> {
        self.state.by_oid(self.state.switch_id()).and_then(|r| r.get(attr))
    }
}

/// Builds switch `index` with its default objects.
pub(crate) fn build_switch(
    index: u8,
    attrs: &[Attribute],
    config: &VsConfig,
    oids: &mut OidAllocator,
) -> SaiResult<SwitchState> {
    let switch_id = ObjectId::for_switch(index);
    let mut b = Builder {
        state: SwitchState::new(switch_id),
        index,
        oids,
    };

    let mut switch_attrs = to_attribute_map(attrs);
    switch_attrs.insert(
        SwitchAttr::OperStatus.into(),
        AttrValue::S32(SwitchOperStatus::Up.as_s32()),
    );
    b.state.insert(
        ObjectKey::Object {
            object_type: ObjectType::Switch,
            oid: switch_id,
        },
        switch_attrs,
    )?;

    let src_mac = match b.switch_attr(SwitchAttr::SrcMacAddress).and_then(AttrValue::as_mac) {
        Some(mac) => mac,
        None => {
            b.set_switch(SwitchAttr::SrcMacAddress, DEFAULT_SRC_MAC);
            DEFAULT_SRC_MAC
        }
    };

    if b.switch_attr(SwitchAttr::FdbAgingTime).is_none() {
        b.set_switch(SwitchAttr::FdbAgingTime, DEFAULT_FDB_AGING_TIME);
    }

    let vlan = b.add(
        ObjectType::Vlan,
        vec![(VlanAttr::VlanId.into(), AttrValue::U16(DEFAULT_VLAN_ID))],
    )?;
    b.set_switch(SwitchAttr::DefaultVlanId, vlan);

    let cpu_port = b.add(
        ObjectType::Port,
        vec![
            (PortAttr::Type.into(), AttrValue::S32(PortType::Cpu.as_s32())),
            (PortAttr::OperStatus.into(), AttrValue::S32(PortOperStatus::Up.as_s32())),
        ],
    )?;
    b.set_switch(SwitchAttr::CpuPort, cpu_port);

    let speed = config.switch_type.default_port_speed();
    for entry in config.lane_map.entries() {
        let port = b.add(
            ObjectType::Port,
            vec![
                (PortAttr::Type.into(), AttrValue::S32(PortType::Logical.as_s32())),
                (
                    PortAttr::HwLaneList.into(),
                    AttrValue::U32List(SaiList::from(entry.lanes.clone())),
                ),
                (PortAttr::Speed.into(), AttrValue::U32(speed)),
                (PortAttr::AdminState.into(), AttrValue::Bool(false)),
                (PortAttr::Mtu.into(), AttrValue::U32(DEFAULT_PORT_MTU)),
                (PortAttr::OperStatus.into(), AttrValue::S32(PortOperStatus::Down.as_s32())),
                (PortAttr::PortVlanId.into(), AttrValue::U16(DEFAULT_VLAN_ID)),
            ],
        )?;
        debug!("Port {} is {} on lanes {:?}", port, entry.ifname, entry.lanes);
    }

    let ports = data_ports(&b.state);
    b.set_switch(SwitchAttr::PortNumber, ports.len() as u32);
    b.set_switch(SwitchAttr::PortList, ports.clone());

    let router = b.add(
        ObjectType::VirtualRouter,
        vec![
            (VirtualRouterAttr::AdminV4State.into(), AttrValue::Bool(true)),
            (VirtualRouterAttr::AdminV6State.into(), AttrValue::Bool(true)),
            (VirtualRouterAttr::SrcMacAddress.into(), AttrValue::Mac(src_mac)),
        ],
    )?;
    b.set_switch(SwitchAttr::DefaultVirtualRouterId, router);

    let bridge = b.add(
        ObjectType::Bridge,
        vec![(BridgeAttr::Type.into(), AttrValue::S32(BridgeType::OneQ.as_s32()))],
    )?;
    b.set_switch(SwitchAttr::Default1QBridgeId, bridge);

    for port in ports {
        let bridge_port = b.add(
            ObjectType::BridgePort,
            vec![
                (BridgePortAttr::Type.into(), AttrValue::S32(BridgePortType::Port.as_s32())),
                (BridgePortAttr::PortId.into(), AttrValue::Oid(port)),
                (BridgePortAttr::BridgeId.into(), AttrValue::Oid(bridge)),
                (BridgePortAttr::FdbLearningMode.into(), AttrValue::S32(FDB_LEARNING_MODE_HW)),
                (BridgePortAttr::AdminState.into(), AttrValue::Bool(true)),
            ],
        )?;
        b.add(
            ObjectType::VlanMember,
            vec![
                (VlanMemberAttr::VlanId.into(), AttrValue::Oid(vlan)),
                (VlanMemberAttr::BridgePortId.into(), AttrValue::Oid(bridge_port)),
                (
                    VlanMemberAttr::VlanTaggingMode.into(),
                    AttrValue::S32(VlanTaggingMode::Untagged.as_s32()),
                ),
            ],
        )?;
    }

    let trap_group = b.add(
        ObjectType::HostifTrapGroup,
        vec![
            (HostifTrapGroupAttr::AdminState.into(), AttrValue::Bool(true)),
            (HostifTrapGroupAttr::Queue.into(), AttrValue::U32(0)),
        ],
    )?;
    b.set_switch(SwitchAttr::DefaultTrapGroup, trap_group);

    Ok(b.state)
}
