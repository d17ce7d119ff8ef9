//! Device model: the read-only lookup table that constrains compilation.

use crate::{ConfigType, DataStream, SlotIdentifier, StreamKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Describes the resource limits and id ranges of a target device.
///
/// The compiler validates every statement against this model; the execution
/// engine never consults it. Treated as an opaque, read-only lookup table
/// supplied by an external device-support component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceModel {
    /// Maximum number of compiled graph nodes the device supports.
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Maximum number of streamer declarations.
    #[serde(default = "default_max_streamers")]
    pub max_streamers: usize,

    /// Number of peripheral slots (`slot 1` .. `slot N`).
    #[serde(default = "default_slot_count")]
    pub slot_count: u8,

    /// Highest stream id a source file may reference directly. Ids above
    /// this are reserved for compiler-allocated internal streams.
    #[serde(default = "default_user_stream_limit")]
    pub user_stream_limit: u16,

    /// Known config keys and their required type tags. Keys not present here
    /// accept any type.
    #[serde(default)]
    pub config_types: BTreeMap<u16, ConfigType>,
}

fn default_max_nodes() -> usize {
    32
}

fn default_max_streamers() -> usize {
    8
}

fn default_slot_count() -> u8 {
    8
}

fn default_user_stream_limit() -> u16 {
    0xEFFF
}

impl Default for DeviceModel {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            max_streamers: default_max_streamers(),
            slot_count: default_slot_count(),
            user_stream_limit: default_user_stream_limit(),
            config_types: BTreeMap::new(),
        }
    }
}

impl DeviceModel {
    /// Whether a source file may reference `stream` directly.
    ///
    /// System streams are exempt from the user id limit because their ids are
    /// fixed by the firmware.
    pub fn validate_stream(&self, stream: &DataStream) -> bool {
        stream.kind == StreamKind::System || stream.id <= self.user_stream_limit
    }

    /// Whether `slot` exists on this device.
    pub fn validate_slot(&self, slot: &SlotIdentifier) -> bool {
        match slot {
            SlotIdentifier::Controller => true,
            SlotIdentifier::Slot(n) => *n >= 1 && *n <= self.slot_count,
        }
    }

    /// The required type tag for `key`, if the model constrains it.
    pub fn config_type(&self, key: u16) -> Option<ConfigType> {
        self.config_types.get(&key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let model = DeviceModel::default();
        assert!(model.validate_stream(&"counter 15".parse().unwrap()));
        assert!(model.validate_stream(&"system input 1025".parse().unwrap()));
        assert!(!model.validate_stream(&"unbuffered 0xF000".parse().unwrap()));
        assert!(model.validate_slot(&SlotIdentifier::Controller));
        assert!(model.validate_slot(&SlotIdentifier::Slot(8)));
        assert!(!model.validate_slot(&SlotIdentifier::Slot(9)));
    }

    #[test]
    fn config_type_lookup() {
        let mut model = DeviceModel::default();
        model.config_types.insert(0x2000, ConfigType::U32);
        assert_eq!(model.config_type(0x2000), Some(ConfigType::U32));
        assert_eq!(model.config_type(0x2001), None);
    }
}
