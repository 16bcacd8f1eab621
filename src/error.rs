use std::io;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Socket closed")]
    SocketClosed,

    #[error("Receive error: {0}")]
    Recv(#[source] io::Error),

    #[error("Send error to {addr}: {source}")]
    Send {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Short packet: need {needed} bytes, got {actual}")]
    ShortPacket { needed: usize, actual: usize },

    #[error("Unknown device type: {0}")]
    UnknownDeviceType(u8),

    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),
}

impl DiscoveryError {
    /// Malformed datagram; the listener keeps going after one of these.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            DiscoveryError::ShortPacket { .. } | DiscoveryError::UnknownDeviceType(_)
        )
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            DiscoveryError::SocketClosed
                | DiscoveryError::Recv(_)
                | DiscoveryError::Send { .. }
        )
    }
}
