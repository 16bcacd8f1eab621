use crate::error::DiscoveryError;
use crate::network::Broadcaster;
use crate::packet::DiscoveryRecord;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AnnounceConfig {
    pub target: SocketAddr,
    pub record: DiscoveryRecord,
    pub count: u32,
    pub interval: Duration,
}

/// Broadcast `record` `count` times, `interval` apart. Returns the number of
/// packets sent.
pub async fn announce(config: &AnnounceConfig) -> Result<u32, DiscoveryError> {
    let broadcaster = Broadcaster::new().await?;
    let packet = config.record.to_bytes();

    for sent in 0..config.count {
        if sent > 0 {
            tokio::time::sleep(config.interval).await;
        }
        broadcaster.send_to(&packet, config.target).await?;
        info!(
            "Announced {} ({} bytes) to {}",
            config.record.header.mac_address,
            packet.len(),
            config.target
        );
    }

    Ok(config.count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Listener, ListenerConfig};
    use crate::packet::{self, DeviceHeader, DeviceType, MacAddress, PixelPusherConfig};
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn test_announce_reaches_listener() {
        let mut listener = Listener::bind(&ListenerConfig {
            bind_host: "127.0.0.1".to_string(),
            bind_port: 0,
            ..ListenerConfig::default()
        })
        .unwrap();

        let record = DiscoveryRecord {
            header: DeviceHeader {
                mac_address: MacAddress::new([0xD8, 0x80, 0x39, 0x66, 0x1A, 0x02]),
                ip_address: Ipv4Addr::new(10, 1, 2, 3),
                device_type: DeviceType::PixelPusher,
                protocol_version: 1,
                vendor_id: 2,
                product_id: 1,
                hw_revision: 1,
                sw_revision: 121,
                link_speed: 100_000_000,
            },
            pixel_pusher: Some(PixelPusherConfig {
                strips_attached: 8,
                max_strips_per_packet: 4,
                pixels_per_strip: 480,
                update_period: 2000,
            }),
        };
        let config = AnnounceConfig {
            target: listener.local_addr(),
            record: record.clone(),
            count: 2,
            interval: Duration::from_millis(10),
        };

        assert_eq!(announce(&config).await.unwrap(), 2);

        for _ in 0..2 {
            let bytes = listener.recv_one(4096).await.unwrap();
            assert_eq!(packet::decode(&bytes).unwrap(), record);
        }
    }
}
