use crate::error::DiscoveryError;
use crate::packet::PIXEL_PUSHER_CONFIG_LEN;
use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

/// PixelPusher configuration block, appended to the header.
/// Format (little-endian, packed):
/// 1B strips attached | 1B max strips per packet | 2B pixels per strip | 4B update period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPusherConfig {
    /// LED strips physically connected
    pub strips_attached: u8,
    pub max_strips_per_packet: u8,
    pub pixels_per_strip: u16,
    /// Microseconds
    pub update_period: u32,
}

impl PixelPusherConfig {
    pub fn to_bytes(&self) -> [u8; PIXEL_PUSHER_CONFIG_LEN] {
        let mut bytes = [0u8; PIXEL_PUSHER_CONFIG_LEN];
        bytes[0] = self.strips_attached;
        bytes[1] = self.max_strips_per_packet;
        LittleEndian::write_u16(&mut bytes[2..4], self.pixels_per_strip);
        LittleEndian::write_u32(&mut bytes[4..8], self.update_period);
        bytes
    }

    /// Decode from the bytes that follow the device header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DiscoveryError> {
        if bytes.len() < PIXEL_PUSHER_CONFIG_LEN {
            return Err(DiscoveryError::ShortPacket {
                needed: PIXEL_PUSHER_CONFIG_LEN,
                actual: bytes.len(),
            });
        }

        Ok(PixelPusherConfig {
            strips_attached: bytes[0],
            max_strips_per_packet: bytes[1],
            pixels_per_strip: LittleEndian::read_u16(&bytes[2..4]),
            update_period: LittleEndian::read_u32(&bytes[4..8]),
        })
    }
}

impl fmt::Display for PixelPusherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Strips({}) MaxStripsPerPacket({}) PixelsPerStrip({}) UpdatePeriod({}us)",
            self.strips_attached,
            self.max_strips_per_packet,
            self.pixels_per_strip,
            self.update_period
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let bytes = [0x05, 0x08, 0xE8, 0x03, 0x40, 0x0D, 0x03, 0x00];
        let config = PixelPusherConfig::from_bytes(&bytes).unwrap();

        assert_eq!(config.strips_attached, 5);
        assert_eq!(config.max_strips_per_packet, 8);
        assert_eq!(config.pixels_per_strip, 1000);
        assert_eq!(config.update_period, 200_000);
    }

    #[test]
    fn test_config_serialization() {
        let config = PixelPusherConfig {
            strips_attached: 2,
            max_strips_per_packet: 1,
            pixels_per_strip: 60,
            update_period: 0x0102_0304,
        };
        let bytes = config.to_bytes();

        assert_eq!(bytes[0], 2);
        assert_eq!(bytes[1], 1);
        assert_eq!(&bytes[2..4], &[60, 0]);
        assert_eq!(&bytes[4..8], &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_config_ignores_trailing_bytes() {
        let bytes = [1, 1, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF];
        let config = PixelPusherConfig::from_bytes(&bytes).unwrap();
        assert_eq!(config.pixels_per_strip, 16);
        assert_eq!(config.update_period, 0);
    }

    #[test]
    fn test_config_too_short() {
        for len in 0..PIXEL_PUSHER_CONFIG_LEN {
            let bytes = vec![0u8; len];
            match PixelPusherConfig::from_bytes(&bytes) {
                Err(DiscoveryError::ShortPacket { needed, actual }) => {
                    assert_eq!(needed, PIXEL_PUSHER_CONFIG_LEN);
                    assert_eq!(actual, len);
                }
                other => panic!("expected ShortPacket, got {:?}", other),
            }
        }
    }
}
