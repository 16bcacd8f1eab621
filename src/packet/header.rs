use crate::error::DiscoveryError;
use crate::packet::{DeviceType, MacAddress, HEADER_LEN};
use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use std::net::Ipv4Addr;

/// Common discovery header, sent by every device type.
/// Format (little-endian, packed):
/// 0           6        10    11    12     14      16     18     20         24
/// +-----------+--------+-----+-----+------+-------+------+------+----------+
/// | mac       | ip     |dtype| ver |vendor|product| hw   | sw   |link speed|
/// +-----------+--------+-----+-----+------+-------+------+------+----------+
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHeader {
    pub mac_address: MacAddress,
    pub ip_address: Ipv4Addr,
    pub device_type: DeviceType,
    /// Version of the device's own protocol, not of discovery.
    pub protocol_version: u8,
    pub vendor_id: u16,
    pub product_id: u16,
    pub hw_revision: u16,
    pub sw_revision: u16,
    /// Bits per second.
    pub link_speed: u32,
}

impl DeviceHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..6].copy_from_slice(self.mac_address.as_bytes());
        bytes[6..10].copy_from_slice(&self.ip_address.octets());
        bytes[10] = self.device_type.ordinal();
        bytes[11] = self.protocol_version;
        LittleEndian::write_u16(&mut bytes[12..14], self.vendor_id);
        LittleEndian::write_u16(&mut bytes[14..16], self.product_id);
        LittleEndian::write_u16(&mut bytes[16..18], self.hw_revision);
        LittleEndian::write_u16(&mut bytes[18..20], self.sw_revision);
        LittleEndian::write_u32(&mut bytes[20..24], self.link_speed);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DiscoveryError> {
        if bytes.len() < HEADER_LEN {
            return Err(DiscoveryError::ShortPacket {
                needed: HEADER_LEN,
                actual: bytes.len(),
            });
        }

        let mut mac = [0u8; 6];
        mac.copy_from_slice(&bytes[0..6]);

        Ok(DeviceHeader {
            mac_address: MacAddress::new(mac),
            ip_address: Ipv4Addr::new(bytes[6], bytes[7], bytes[8], bytes[9]),
            device_type: DeviceType::try_from(bytes[10])?,
            protocol_version: bytes[11],
            vendor_id: LittleEndian::read_u16(&bytes[12..14]),
            product_id: LittleEndian::read_u16(&bytes[14..16]),
            hw_revision: LittleEndian::read_u16(&bytes[16..18]),
            sw_revision: LittleEndian::read_u16(&bytes[18..20]),
            link_speed: LittleEndian::read_u32(&bytes[20..24]),
        })
    }
}

impl fmt::Display for DeviceHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mac({}) Ip({}) Type({}) Prot.Ver({}) Vend({}) Product({}) HW Rev({}) SW Rev({}) Link({})",
            self.mac_address,
            self.ip_address,
            self.device_type,
            self.protocol_version,
            self.vendor_id,
            self.product_id,
            self.hw_revision,
            self.sw_revision,
            self.link_speed
        )
    }
}
