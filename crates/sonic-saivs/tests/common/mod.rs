//! Shared fixtures for the virtual switch integration tests.

#![allow(dead_code)]

use crossbeam_channel::{unbounded, Receiver, Sender};
use sonic_sai::attr::{BridgeAttr, SwitchAttr};
use sonic_sai::{
    AttrValue, Attribute, FdbEventData, Notification, NotificationHandler, ObjectId, ObjectType,
    PortOperStatusData, ProfileMap, SaiApi, ServiceMethodTable,
};
use sonic_saivs::{ManualClock, VirtualSwitch};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

pub const WAIT: Duration = Duration::from_secs(3);

/// Forwards every notification to a channel the test can wait on.
pub struct Recorder {
    tx: Sender<Notification>,
}

impl NotificationHandler for Recorder {
    fn on_fdb_event(&self, events: &[FdbEventData]) {
        let _ = self.tx.send(Notification::FdbEvent(events.to_vec()));
    }

    fn on_port_state_change(&self, ports: &[PortOperStatusData]) {
        let _ = self.tx.send(Notification::PortStateChange(ports.to_vec()));
    }
}

pub struct Harness {
    pub vs: VirtualSwitch,
    pub clock: Arc<ManualClock>,
    pub events: Receiver<Notification>,
    pub switch_id: ObjectId,
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn profile(lane_map: &NamedTempFile) -> ProfileMap {
    [
        ("SAI_VS_SWITCH_TYPE", "SAI_VS_SWITCH_TYPE_BCM56850".to_string()),
        ("SAI_BOOT_TYPE", "cold".to_string()),
        (
            "SAI_VS_INTERFACE_LANE_MAP_FILE",
            lane_map.path().display().to_string(),
        ),
    ]
    .into_iter()
    .collect()
}

pub fn lane_map(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// An initialized virtual switch with one switch created on four ports.
pub fn harness() -> Harness {
    init_logging();
    let lanes = lane_map("Ethernet0:1,2\nEthernet4:3,4\nEthernet8:5,6\nEthernet12:7,8\n");
    let clock = Arc::new(ManualClock::new(1_000));
    let vs = VirtualSwitch::with_clock(clock.clone());
    let (tx, events) = unbounded();

    vs.initialize(
        ServiceMethodTable::from_profile(profile(&lanes)),
        Some(Arc::new(Recorder { tx })),
    )
    .unwrap();
    let switch_id = vs.create(ObjectType::Switch, ObjectId::NULL, &[]).unwrap();

    Harness {
        vs,
        clock,
        events,
        switch_id,
    }
}

impl Harness {
    pub fn switch_oid(&self, attr: SwitchAttr) -> ObjectId {
        let mut attrs = [Attribute::request(attr, 0)];
        self.vs
            .get(ObjectType::Switch, self.switch_id, &mut attrs)
            .unwrap();
        attrs[0].value.as_oid().unwrap()
    }

    pub fn bridge_ports(&self) -> Vec<ObjectId> {
        let bridge = self.switch_oid(SwitchAttr::Default1QBridgeId);
        let mut attrs = [Attribute::request(BridgeAttr::PortList, 64)];
        self.vs.get(ObjectType::Bridge, bridge, &mut attrs).unwrap();
        attrs[0].value.as_oid_list().unwrap().to_vec()
    }

    pub fn set_aging_time(&self, secs: u32) {
        self.vs
            .set(
                ObjectType::Switch,
                self.switch_id,
                &Attribute::new(SwitchAttr::FdbAgingTime, AttrValue::U32(secs)),
            )
            .unwrap();
    }

    /// Next FDB event batch, failing the test after [`WAIT`].
    pub fn next_fdb_events(&self) -> Vec<FdbEventData> {
        match self.events.recv_timeout(WAIT) {
            Ok(Notification::FdbEvent(events)) => events,
            other => panic!("expected an FDB event, got {:?}", other),
        }
    }

    pub fn drain(&self) -> Vec<Notification> {
        std::thread::sleep(Duration::from_millis(100));
        self.events.try_iter().collect()
    }
}
