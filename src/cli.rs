use crate::announce::AnnounceConfig;
use crate::monitor::MonitorOptions;
use crate::network::{ListenerConfig, DEFAULT_MAX_DATAGRAM_SIZE, MIN_DATAGRAM_SIZE};
use crate::packet::{
    DeviceHeader, DeviceType, DiscoveryRecord, MacAddress, PixelPusherConfig, DISCOVERY_PORT,
};
use clap::{Args as ClapArgs, Error, Parser, Subcommand, ValueEnum};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "pixelpusher-discovery")]
#[command(about = "Listen for PixelPusher discovery broadcasts")]
pub struct Args {
    /// Maximum log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode and log discovery packets
    Listen(ListenArgs),
    /// Broadcast a synthetic discovery packet
    Announce(AnnounceArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ListenArgs {
    /// Address to bind; every interface when omitted
    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long, default_value_t = DISCOVERY_PORT)]
    pub port: u16,

    /// Largest datagram read, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_DATAGRAM_SIZE, value_parser = parse_max_size)]
    pub max_size: usize,

    /// Decoded records buffered between the socket and the log
    #[arg(long, default_value_t = 64)]
    pub queue_depth: usize,

    /// Exit after the first decoded packet
    #[arg(long)]
    pub once: bool,
}

impl ListenArgs {
    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            bind_host: self.host.clone().unwrap_or_default(),
            bind_port: self.port,
            max_datagram_size: self.max_size,
        }
    }

    pub fn monitor_options(&self) -> MonitorOptions {
        MonitorOptions {
            queue_depth: self.queue_depth,
            once: self.once,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceTypeArg {
    EtherDream,
    LumiaBridge,
    PixelPusher,
}

impl From<DeviceTypeArg> for DeviceType {
    fn from(value: DeviceTypeArg) -> Self {
        match value {
            DeviceTypeArg::EtherDream => DeviceType::EtherDream,
            DeviceTypeArg::LumiaBridge => DeviceType::LumiaBridge,
            DeviceTypeArg::PixelPusher => DeviceType::PixelPusher,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct AnnounceArgs {
    /// Destination address
    #[arg(long, default_value_t = Ipv4Addr::BROADCAST)]
    pub target: Ipv4Addr,

    #[arg(short, long, default_value_t = DISCOVERY_PORT)]
    pub port: u16,

    /// Advertised MAC address (format xx:xx:xx:xx:xx:xx)
    #[arg(short, long)]
    pub mac: MacAddress,

    /// Advertised IPv4 address
    #[arg(long)]
    pub ip: Ipv4Addr,

    #[arg(long, value_enum, default_value_t = DeviceTypeArg::PixelPusher)]
    pub device_type: DeviceTypeArg,

    #[arg(long, default_value_t = 1)]
    pub protocol_version: u8,

    #[arg(long, default_value_t = 0)]
    pub vendor_id: u16,

    #[arg(long, default_value_t = 0)]
    pub product_id: u16,

    #[arg(long, default_value_t = 0)]
    pub hw_revision: u16,

    #[arg(long, default_value_t = 0)]
    pub sw_revision: u16,

    /// Bits per second
    #[arg(long, default_value_t = 100_000_000)]
    pub link_speed: u32,

    #[arg(long, default_value_t = 1)]
    pub strips: u8,

    #[arg(long, default_value_t = 1)]
    pub max_strips_per_packet: u8,

    #[arg(long, default_value_t = 60)]
    pub pixels_per_strip: u16,

    /// Microseconds
    #[arg(long, default_value_t = 1000)]
    pub update_period: u32,

    /// Number of packets to send
    #[arg(short, long, default_value_t = 1)]
    pub count: u32,

    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,
}

impl AnnounceArgs {
    pub fn announce_config(&self) -> AnnounceConfig {
        let device_type = DeviceType::from(self.device_type);
        let pixel_pusher = match device_type {
            DeviceType::PixelPusher => Some(PixelPusherConfig {
                strips_attached: self.strips,
                max_strips_per_packet: self.max_strips_per_packet,
                pixels_per_strip: self.pixels_per_strip,
                update_period: self.update_period,
            }),
            DeviceType::EtherDream | DeviceType::LumiaBridge => None,
        };

        AnnounceConfig {
            target: SocketAddr::from((self.target, self.port)),
            record: DiscoveryRecord {
                header: DeviceHeader {
                    mac_address: self.mac,
                    ip_address: self.ip,
                    device_type,
                    protocol_version: self.protocol_version,
                    vendor_id: self.vendor_id,
                    product_id: self.product_id,
                    hw_revision: self.hw_revision,
                    sw_revision: self.sw_revision,
                    link_speed: self.link_speed,
                },
                pixel_pusher,
            },
            count: self.count,
            interval: Duration::from_millis(self.interval_ms),
        }
    }
}

fn parse_max_size(s: &str) -> Result<usize, String> {
    let size: usize = s.parse().map_err(|e| format!("{}", e))?;
    if size < MIN_DATAGRAM_SIZE {
        return Err(format!(
            "must be at least {} bytes to hold a PixelPusher discovery packet",
            MIN_DATAGRAM_SIZE
        ));
    }
    Ok(size)
}

pub fn parse_args() -> Result<Args, Error> {
    Args::try_parse()
}
