use crate::cluster::ZIGFRED_CLUSTER_ID;

use self::cluster_id::{BASIC, COLOR, GROUPS, IDENTIFY, LEVEL_CONTROL, ON_OFF, SCENES};

/// Zigbee Home Automation profile
pub const ZHA_PROFILE_ID: u16 = 0x0104;

/// Zigbee Green Power profile
pub const GREEN_POWER_PROFILE_ID: u16 = 0xA1E0;

pub mod cluster_id {
    pub const BASIC: u16 = 0x0000;
    pub const IDENTIFY: u16 = 0x0003;
    pub const GROUPS: u16 = 0x0004;
    pub const SCENES: u16 = 0x0005;
    pub const ON_OFF: u16 = 0x0006;
    pub const LEVEL_CONTROL: u16 = 0x0008;
    pub const GREEN_POWER_PROXY: u16 = 0x0021;
    pub const COLOR: u16 = 0x0300;
}

pub mod device_type {
    pub const ON_OFF_LIGHT: u16 = 0x0100;
    pub const DIMMABLE_LIGHT: u16 = 0x0101;
    pub const COLOR_DIMMABLE_LIGHT: u16 = 0x0102;
    pub const GREEN_POWER_PROXY: u16 = 0x0061;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub endpoint: u8,
    pub profile: u16,
    pub device_type: u16,
    pub input_clusters: &'static [u16],
    pub output_clusters: &'static [u16],
}

impl EndpointDescriptor {
    #[must_use]
    pub fn hosts(&self, cluster: u16) -> bool {
        self.input_clusters.contains(&cluster) || self.output_clusters.contains(&cluster)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSignature {
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub endpoints: &'static [EndpointDescriptor],
}

impl DeviceSignature {
    #[must_use]
    pub fn matches(&self, manufacturer: &str, model: &str) -> bool {
        self.manufacturer == manufacturer && self.model == model
    }

    #[must_use]
    pub fn endpoint(&self, endpoint: u8) -> Option<&EndpointDescriptor> {
        self.endpoints.iter().find(|ep| ep.endpoint == endpoint)
    }

    /// First endpoint hosting `cluster`, if any
    #[must_use]
    pub fn endpoint_for(&self, cluster: u16) -> Option<u8> {
        self.endpoints
            .iter()
            .find(|ep| ep.hosts(cluster))
            .map(|ep| ep.endpoint)
    }
}

/// Siglis zigfred uno: front module LED (5), relay (6), dimmer (7) and the
/// green power endpoint (242).
pub const ZIGFRED_UNO: DeviceSignature = DeviceSignature {
    manufacturer: "Siglis",
    model: "zigfred uno",
    endpoints: &[
        EndpointDescriptor {
            endpoint: 5,
            profile: ZHA_PROFILE_ID,
            device_type: device_type::COLOR_DIMMABLE_LIGHT,
            input_clusters: &[
                BASIC,
                IDENTIFY,
                GROUPS,
                SCENES,
                ON_OFF,
                LEVEL_CONTROL,
                COLOR,
                ZIGFRED_CLUSTER_ID,
            ],
            output_clusters: &[],
        },
        EndpointDescriptor {
            endpoint: 6,
            profile: ZHA_PROFILE_ID,
            device_type: device_type::ON_OFF_LIGHT,
            input_clusters: &[BASIC, IDENTIFY, GROUPS, SCENES, ON_OFF],
            output_clusters: &[],
        },
        EndpointDescriptor {
            endpoint: 7,
            profile: ZHA_PROFILE_ID,
            device_type: device_type::DIMMABLE_LIGHT,
            input_clusters: &[BASIC, IDENTIFY, GROUPS, SCENES, ON_OFF, LEVEL_CONTROL],
            output_clusters: &[],
        },
        EndpointDescriptor {
            endpoint: 242,
            profile: GREEN_POWER_PROFILE_ID,
            device_type: device_type::GREEN_POWER_PROXY,
            input_clusters: &[],
            output_clusters: &[cluster_id::GREEN_POWER_PROXY],
        },
    ],
};
