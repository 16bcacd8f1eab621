use crate::packet::{DiscoveryRecord, MacAddress};
use std::collections::HashMap;
use std::time::Instant;

/// How a record relates to what was already known about its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sighting {
    New,
    Changed,
    Repeat,
}

#[derive(Debug, Clone)]
pub struct DeviceEntry {
    pub record: DiscoveryRecord,
    pub first_seen: Instant,
    pub last_seen: Instant,
    pub sightings: u64,
}

/// Devices seen during this run, keyed by MAC address.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<MacAddress, DeviceEntry>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        DeviceRegistry::default()
    }

    pub fn observe(&mut self, record: DiscoveryRecord) -> Sighting {
        self.observe_at(record, Instant::now())
    }

    pub fn observe_at(&mut self, record: DiscoveryRecord, now: Instant) -> Sighting {
        let mac = record.header.mac_address;
        match self.devices.get_mut(&mac) {
            Some(entry) => {
                entry.last_seen = now;
                entry.sightings += 1;
                if entry.record == record {
                    Sighting::Repeat
                } else {
                    entry.record = record;
                    Sighting::Changed
                }
            }
            None => {
                self.devices.insert(
                    mac,
                    DeviceEntry {
                        record,
                        first_seen: now,
                        last_seen: now,
                        sightings: 1,
                    },
                );
                Sighting::New
            }
        }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Entries ordered by MAC address.
    pub fn devices(&self) -> Vec<&DeviceEntry> {
        let mut entries: Vec<&DeviceEntry> = self.devices.values().collect();
        entries.sort_by_key(|entry| entry.record.header.mac_address);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{DeviceHeader, DeviceType, PixelPusherConfig};
    use std::net::Ipv4Addr;
    use std::time::Duration;

    fn create_test_record(mac_last: u8, strips: u8) -> DiscoveryRecord {
        DiscoveryRecord {
            header: DeviceHeader {
                mac_address: MacAddress::new([0xD8, 0x80, 0x39, 0x00, 0x00, mac_last]),
                ip_address: Ipv4Addr::new(192, 168, 1, mac_last),
                device_type: DeviceType::PixelPusher,
                protocol_version: 1,
                vendor_id: 2,
                product_id: 1,
                hw_revision: 1,
                sw_revision: 121,
                link_speed: 100_000_000,
            },
            pixel_pusher: Some(PixelPusherConfig {
                strips_attached: strips,
                max_strips_per_packet: 2,
                pixels_per_strip: 240,
                update_period: 1000,
            }),
        }
    }

    #[test]
    fn test_first_sighting_is_new() {
        let mut registry = DeviceRegistry::new();
        assert!(registry.is_empty());

        assert_eq!(registry.observe(create_test_record(1, 8)), Sighting::New);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_repeat_and_changed() {
        let mut registry = DeviceRegistry::new();
        let start = Instant::now();
        let later = start + Duration::from_secs(5);

        registry.observe_at(create_test_record(1, 8), start);
        assert_eq!(
            registry.observe_at(create_test_record(1, 8), start),
            Sighting::Repeat
        );
        assert_eq!(
            registry.observe_at(create_test_record(1, 4), later),
            Sighting::Changed
        );

        let devices = registry.devices();
        assert_eq!(devices.len(), 1);
        let entry = devices[0];
        assert_eq!(entry.sightings, 3);
        assert_eq!(entry.first_seen, start);
        assert_eq!(entry.last_seen, later);
        assert_eq!(entry.record.pixel_pusher.unwrap().strips_attached, 4);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_devices_sorted_by_mac() {
        let mut registry = DeviceRegistry::new();
        registry.observe(create_test_record(9, 1));
        registry.observe(create_test_record(3, 1));
        registry.observe(create_test_record(5, 1));

        let order: Vec<u8> = registry
            .devices()
            .iter()
            .map(|entry| entry.record.header.mac_address.as_bytes()[5])
            .collect();
        assert_eq!(order, vec![3, 5, 9]);
    }
}
