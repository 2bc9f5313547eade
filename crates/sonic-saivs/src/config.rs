//! Virtual switch profile configuration.
//!
//! The profile is read once at `initialize` through the service method
//! table:
//!
//! | key                              | meaning                                  |
//! |----------------------------------|------------------------------------------|
//! | `SAI_VS_SWITCH_TYPE`             | emulated ASIC, required                  |
//! | `SAI_BOOT_TYPE`                  | `0`/`cold`, `1`/`warm`, `2`/`fast`       |
//! | `SAI_VS_INTERFACE_LANE_MAP_FILE` | optional `ifname:lane[,lane...]` file    |
//! | `SAI_VS_HOSTIF_USE_TAP_DEVICE`   | `true` to back host interfaces with TAPs |

use log::{info, warn};
use sonic_sai::{SaiError, ServiceMethodTable};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const KEY_SWITCH_TYPE: &str = "SAI_VS_SWITCH_TYPE";
pub const KEY_BOOT_TYPE: &str = "SAI_BOOT_TYPE";
pub const KEY_LANE_MAP_FILE: &str = "SAI_VS_INTERFACE_LANE_MAP_FILE";
pub const KEY_USE_TAP_DEVICE: &str = "SAI_VS_HOSTIF_USE_TAP_DEVICE";

/// Errors reading the virtual switch profile.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing profile key: {0}")]
    MissingKey(&'static str),

    #[error("Unknown switch type: {0}")]
    UnknownSwitchType(String),

    #[error("Invalid boot type: {0}")]
    InvalidBootType(String),

    #[error("Failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ConfigError> for SaiError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Io { .. } => SaiError::failure(e.to_string()),
            _ => SaiError::invalid_parameter(e.to_string()),
        }
    }
}

/// The emulated ASIC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchType {
    Bcm56850,
    Mlnx2700,
}

impl SwitchType {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "SAI_VS_SWITCH_TYPE_BCM56850" => Ok(SwitchType::Bcm56850),
            "SAI_VS_SWITCH_TYPE_MLNX2700" => Ok(SwitchType::Mlnx2700),
            other => Err(ConfigError::UnknownSwitchType(other.to_string())),
        }
    }

    /// Default speed of a data port, in Mbps.
    pub fn default_port_speed(&self) -> u32 {
        match self {
            SwitchType::Bcm56850 => 40_000,
            SwitchType::Mlnx2700 => 100_000,
        }
    }

    /// Lane numbering of the default port layout starts here.
    fn first_lane(&self) -> u32 {
        match self {
            SwitchType::Bcm56850 => 1,
            SwitchType::Mlnx2700 => 0,
        }
    }
}

impl fmt::Display for SwitchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchType::Bcm56850 => f.write_str("SAI_VS_SWITCH_TYPE_BCM56850"),
            SwitchType::Mlnx2700 => f.write_str("SAI_VS_SWITCH_TYPE_MLNX2700"),
        }
    }
}

/// Boot type. Only cold boot changes behavior; warm and fast are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BootType {
    #[default]
    Cold,
    Warm,
    Fast,
}

impl BootType {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "0" | "cold" => Ok(BootType::Cold),
            "1" | "warm" => Ok(BootType::Warm),
            "2" | "fast" => Ok(BootType::Fast),
            other => Err(ConfigError::InvalidBootType(other.to_string())),
        }
    }
}

/// A front panel interface and its hardware lanes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneMapEntry {
    pub ifname: String,
    pub lanes: Vec<u32>,
}

/// Interface to lane assignment; one data port is created per entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaneMap {
    entries: Vec<LaneMapEntry>,
}

/// Number of ports in the default layout.
pub const DEFAULT_PORT_COUNT: u32 = 32;

/// Lanes per port in the default layout.
pub const DEFAULT_LANES_PER_PORT: u32 = 4;

impl LaneMap {
    /// The default layout: 32 ports of 4 consecutive lanes each.
    pub fn default_for(switch_type: SwitchType) -> Self {
        let base = switch_type.first_lane();
        let entries = (0..DEFAULT_PORT_COUNT)
            .map(|i| LaneMapEntry {
                ifname: format!("Ethernet{}", i * DEFAULT_LANES_PER_PORT),
                lanes: (0..DEFAULT_LANES_PER_PORT)
                    .map(|l| base + i * DEFAULT_LANES_PER_PORT + l)
                    .collect(),
            })
            .collect();
        Self { entries }
    }

    /// Parses `ifname:lane[,lane...]` lines.
    ///
    /// Blank lines and lines starting with `#` or `;` are ignored. Malformed
    /// lines, and lines reusing an interface name or a lane, are logged and
    /// skipped.
    pub fn parse(content: &str) -> Self {
        let mut entries = Vec::new();
        let mut names = HashSet::new();
        let mut used_lanes = HashSet::new();

        for (lineno, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            let Some(entry) = parse_lane_line(line) else {
                warn!("Skipping malformed lane map line {}: {}", lineno + 1, line);
                continue;
            };

            if !names.insert(entry.ifname.clone()) {
                warn!("Skipping duplicate interface {} on line {}", entry.ifname, lineno + 1);
                continue;
            }
            if let Some(lane) = entry.lanes.iter().find(|l| used_lanes.contains(*l)) {
                warn!("Skipping {}: lane {} already assigned", entry.ifname, lane);
                continue;
            }
            used_lanes.extend(entry.lanes.iter().copied());
            entries.push(entry);
        }

        Self { entries }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    pub fn entries(&self) -> &[LaneMapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_lane_line(line: &str) -> Option<LaneMapEntry> {
    let (ifname, lanes) = line.split_once(':')?;
    let ifname = ifname.trim();
    if ifname.is_empty() {
        return None;
    }
    let lanes = lanes
        .split(',')
        .map(|l| l.trim().parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;
    if lanes.is_empty() {
        return None;
    }
    Some(LaneMapEntry {
        ifname: ifname.to_string(),
        lanes,
    })
}

/// Typed view of the virtual switch profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VsConfig {
    pub switch_type: SwitchType,
    pub boot_type: BootType,
    pub lane_map: LaneMap,
    pub use_tap_device: bool,
}

impl VsConfig {
    /// A cold-boot configuration with the default port layout.
    pub fn new(switch_type: SwitchType) -> Self {
        Self {
            switch_type,
            boot_type: BootType::Cold,
            lane_map: LaneMap::default_for(switch_type),
            use_tap_device: false,
        }
    }

    /// Reads the profile through the service method table.
    ///
    /// An unreadable or empty lane map file falls back to the default
    /// layout of the switch type.
    pub fn from_services(services: &ServiceMethodTable) -> Result<Self, ConfigError> {
        let switch_type = services
            .get_value(KEY_SWITCH_TYPE)
            .ok_or(ConfigError::MissingKey(KEY_SWITCH_TYPE))?;
        let mut config = Self::new(SwitchType::parse(&switch_type)?);

        if let Some(boot_type) = services.get_value(KEY_BOOT_TYPE) {
            config.boot_type = BootType::parse(&boot_type)?;
        }

        if let Some(path) = services.get_value(KEY_LANE_MAP_FILE) {
            match LaneMap::load(&path) {
                Ok(map) if !map.is_empty() => config.lane_map = map,
                Ok(_) => warn!("Lane map {} has no usable entries, using defaults", path),
                Err(e) => warn!("{}, using default lane map", e),
            }
        }

        config.use_tap_device = services
            .get_value(KEY_USE_TAP_DEVICE)
            .is_some_and(|v| v == "true");

        info!(
            "Virtual switch config: type {}, boot {:?}, {} ports, tap {}",
            config.switch_type,
            config.boot_type,
            config.lane_map.len(),
            config.use_tap_device
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sonic_sai::ProfileMap;
    use std::io::Write;

    fn services(pairs: &[(&str, &str)]) -> ServiceMethodTable {
        ServiceMethodTable::from_profile(pairs.iter().copied().collect::<ProfileMap>())
    }

    #[test]
    fn test_default_lane_map() {
        let map = LaneMap::default_for(SwitchType::Bcm56850);
        assert_eq!(map.len(), 32);
        assert_eq!(map.entries()[0].ifname, "Ethernet0");
        assert_eq!(map.entries()[0].lanes, vec![1, 2, 3, 4]);
        assert_eq!(map.entries()[31].ifname, "Ethernet124");
        assert_eq!(map.entries()[31].lanes, vec![125, 126, 127, 128]);

        let map = LaneMap::default_for(SwitchType::Mlnx2700);
        assert_eq!(map.entries()[1].lanes, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_parse_lane_map_skips_bad_lines() {
        let map = LaneMap::parse(
            "# comment\n; other comment\n\nEthernet0:1,2,3,4\nEthernet4:bad\nnocolon\nEthernet8:5\nEthernet0:9\nEthernet12:5\n",
        );
        assert_eq!(
            map.entries(),
            &[
                LaneMapEntry {
                    ifname: "Ethernet0".to_string(),
                    lanes: vec![1, 2, 3, 4],
                },
                LaneMapEntry {
                    ifname: "Ethernet8".to_string(),
                    lanes: vec![5],
                },
            ]
        );
    }

    #[test]
    fn test_from_services() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Ethernet0:0,1").unwrap();
        writeln!(file, "Ethernet2:2,3").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = VsConfig::from_services(&services(&[
            (KEY_SWITCH_TYPE, "SAI_VS_SWITCH_TYPE_MLNX2700"),
            (KEY_BOOT_TYPE, "1"),
            (KEY_LANE_MAP_FILE, path.as_str()),
            (KEY_USE_TAP_DEVICE, "true"),
        ]))
        .unwrap();

        assert_eq!(config.switch_type, SwitchType::Mlnx2700);
        assert_eq!(config.boot_type, BootType::Warm);
        assert_eq!(config.lane_map.len(), 2);
        assert!(config.use_tap_device);
    }

    #[test]
    fn test_missing_lane_map_falls_back() {
        let config = VsConfig::from_services(&services(&[
            (KEY_SWITCH_TYPE, "SAI_VS_SWITCH_TYPE_BCM56850"),
            (KEY_LANE_MAP_FILE, "/nonexistent/lanemap.ini"),
        ]))
        .unwrap();
        assert_eq!(config.lane_map, LaneMap::default_for(SwitchType::Bcm56850));
        assert_eq!(config.boot_type, BootType::Cold);
    }

    #[test]
    fn test_invalid_profile_values() {
        assert!(matches!(
            VsConfig::from_services(&services(&[])),
            Err(ConfigError::MissingKey(KEY_SWITCH_TYPE))
        ));
        assert!(matches!(
            VsConfig::from_services(&services(&[(KEY_SWITCH_TYPE, "SAI_VS_SWITCH_TYPE_NOPE")])),
            Err(ConfigError::UnknownSwitchType(_))
        ));
        let err = VsConfig::from_services(&services(&[
            (KEY_SWITCH_TYPE, "SAI_VS_SWITCH_TYPE_BCM56850"),
            (KEY_BOOT_TYPE, "7"),
        ]))
        .unwrap_err();
        assert!(matches!(SaiError::from(err), SaiError::InvalidParameter { .. }));
    }
}
