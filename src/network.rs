use crate::error::DiscoveryError;
use crate::packet::{DISCOVERY_PORT, HEADER_LEN, PIXEL_PUSHER_CONFIG_LEN};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, ToSocketAddrs};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::debug;

/// Larger than any known discovery packet.
pub const DEFAULT_MAX_DATAGRAM_SIZE: usize = 4096;

/// Smallest buffer that holds the longest known discovery packet.
pub const MIN_DATAGRAM_SIZE: usize = HEADER_LEN + PIXEL_PUSHER_CONFIG_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Empty means every IPv4 interface.
    pub bind_host: String,
    pub bind_port: u16,
    pub max_datagram_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        ListenerConfig {
            bind_host: String::new(),
            bind_port: DISCOVERY_PORT,
            max_datagram_size: DEFAULT_MAX_DATAGRAM_SIZE,
        }
    }
}

impl ListenerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, DiscoveryError> {
        if self.bind_host.is_empty() {
            return Ok(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, self.bind_port).into());
        }

        let bind_error = |source: io::Error| DiscoveryError::Bind {
            addr: format!("{}:{}", self.bind_host, self.bind_port),
            source,
        };

        (self.bind_host.as_str(), self.bind_port)
            .to_socket_addrs()
            .map_err(bind_error)?
            .find(SocketAddr::is_ipv4)
            .ok_or_else(|| {
                bind_error(io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    "host has no IPv4 address",
                ))
            })
    }
}

/// Closes a [`Listener`] from another task, waking a pending `recv_one`.
#[derive(Debug, Clone)]
pub struct ListenerCloser {
    closed: Arc<watch::Sender<bool>>,
}

impl ListenerCloser {
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

/// Owns the UDP socket that discovery broadcasts arrive on.
pub struct Listener {
    socket: Option<UdpSocket>,
    local_addr: SocketAddr,
    max_datagram_size: usize,
    closer: ListenerCloser,
    closed_rx: watch::Receiver<bool>,
}

impl Listener {
    /// Must be called from within a tokio runtime.
    pub fn bind(config: &ListenerConfig) -> Result<Self, DiscoveryError> {
        let addr = config.bind_addr()?;
        let bind_error = |source: io::Error| DiscoveryError::Bind {
            addr: addr.to_string(),
            source,
        };

        let socket = new_broadcast_socket().map_err(bind_error)?;
        socket.bind(&SockAddr::from(addr)).map_err(bind_error)?;

        let std_socket: std::net::UdpSocket = socket.into();
        let socket = UdpSocket::from_std(std_socket).map_err(bind_error)?;
        let local_addr = socket.local_addr().map_err(bind_error)?;
        debug!("Bound discovery socket to {}", local_addr);

        let (closed_tx, closed_rx) = watch::channel(false);
        Ok(Listener {
            socket: Some(socket),
            local_addr,
            max_datagram_size: config.max_datagram_size,
            closer: ListenerCloser {
                closed: Arc::new(closed_tx),
            },
            closed_rx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn max_datagram_size(&self) -> usize {
        self.max_datagram_size
    }

    pub fn closer(&self) -> ListenerCloser {
        self.closer.clone()
    }

    /// Wait for the next datagram and return at most `max_size` of its bytes.
    pub async fn recv_one(&mut self, max_size: usize) -> Result<Vec<u8>, DiscoveryError> {
        if self.closer.is_closed() {
            self.socket = None;
        }
        let socket = self.socket.as_ref().ok_or(DiscoveryError::SocketClosed)?;

        let mut buf = vec![0u8; max_size];
        let result = tokio::select! {
            received = socket.recv(&mut buf) => received.map_err(DiscoveryError::Recv),
            _ = wait_closed(self.closed_rx.clone()) => Err(DiscoveryError::SocketClosed),
        };

        match result {
            Ok(len) => {
                buf.truncate(len);
                Ok(buf)
            }
            Err(DiscoveryError::SocketClosed) => {
                self.socket = None;
                Err(DiscoveryError::SocketClosed)
            }
            Err(e) => Err(e),
        }
    }

    pub fn close(&mut self) {
        self.closer.close();
        if self.socket.take().is_some() {
            debug!("Closed discovery socket {}", self.local_addr);
        }
    }
}

async fn wait_closed(mut closed: watch::Receiver<bool>) {
    loop {
        if *closed.borrow_and_update() {
            return;
        }
        if closed.changed().await.is_err() {
            return;
        }
    }
}

fn new_broadcast_socket() -> io::Result<Socket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.set_broadcast(true)?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}

/// Unbound sender used to broadcast synthetic discovery packets.
pub struct Broadcaster {
    socket: UdpSocket,
}

impl Broadcaster {
    pub async fn new() -> Result<Self, DiscoveryError> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0));
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| DiscoveryError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        socket
            .set_broadcast(true)
            .map_err(|source| DiscoveryError::Bind {
                addr: addr.to_string(),
                source,
            })?;

        Ok(Broadcaster { socket })
    }

    pub async fn send_to(&self, data: &[u8], addr: SocketAddr) -> Result<usize, DiscoveryError> {
        self.socket
            .send_to(data, addr)
            .await
            .map_err(|source| DiscoveryError::Send { addr, source })
    }
}
