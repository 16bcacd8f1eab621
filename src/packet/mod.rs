pub mod header;
pub mod mac;
pub mod pixelpusher;

pub use header::DeviceHeader;
pub use mac::MacAddress;
pub use pixelpusher::PixelPusherConfig;

use crate::error::DiscoveryError;
use std::fmt;

pub const DISCOVERY_PORT: u16 = 7331;
pub const HEADER_LEN: usize = 24;
pub const PIXEL_PUSHER_CONFIG_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    EtherDream,
    LumiaBridge,
    PixelPusher,
}

struct DeviceTypeEntry {
    ordinal: u8,
    kind: DeviceType,
    name: &'static str,
}

/// Every known device type. New hardware families only need an entry here.
const DEVICE_TYPES: &[DeviceTypeEntry] = &[
    DeviceTypeEntry {
        ordinal: 0,
        kind: DeviceType::EtherDream,
        name: "EtherDream",
    },
    DeviceTypeEntry {
        ordinal: 1,
        kind: DeviceType::LumiaBridge,
        name: "LumiaBridge",
    },
    DeviceTypeEntry {
        ordinal: 2,
        kind: DeviceType::PixelPusher,
        name: "PixelPusher",
    },
];

impl DeviceType {
    fn entry(self) -> &'static DeviceTypeEntry {
        match DEVICE_TYPES.iter().find(|entry| entry.kind == self) {
            Some(entry) => entry,
            None => unreachable!("{:?} has no DEVICE_TYPES entry", self),
        }
    }

    pub fn ordinal(self) -> u8 {
        self.entry().ordinal
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }
}

impl TryFrom<u8> for DeviceType {
    type Error = DiscoveryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DEVICE_TYPES
            .iter()
            .find(|entry| entry.ordinal == value)
            .map(|entry| entry.kind)
            .ok_or(DiscoveryError::UnknownDeviceType(value))
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One decoded discovery datagram.
///
/// `pixel_pusher` is `Some` exactly when `header.device_type` is
/// [`DeviceType::PixelPusher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRecord {
    pub header: DeviceHeader,
    pub pixel_pusher: Option<PixelPusherConfig>,
}

impl DiscoveryRecord {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + PIXEL_PUSHER_CONFIG_LEN);
        bytes.extend_from_slice(&self.header.to_bytes());
        if let Some(config) = &self.pixel_pusher {
            bytes.extend_from_slice(&config.to_bytes());
        }
        bytes
    }
}

impl fmt::Display for DiscoveryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)?;
        if let Some(config) = &self.pixel_pusher {
            write!(f, " {}", config)?;
        }
        Ok(())
    }
}

/// Decode a full discovery datagram.
///
/// Bytes past the structures the device type calls for are ignored.
pub fn decode(bytes: &[u8]) -> Result<DiscoveryRecord, DiscoveryError> {
    let header = DeviceHeader::from_bytes(bytes)?;

    let pixel_pusher = match header.device_type {
        DeviceType::PixelPusher => Some(PixelPusherConfig::from_bytes(&bytes[HEADER_LEN..])?),
        DeviceType::EtherDream | DeviceType::LumiaBridge => None,
    };

    Ok(DiscoveryRecord {
        header,
        pixel_pusher,
    })
}
