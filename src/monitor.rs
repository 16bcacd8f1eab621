use crate::error::DiscoveryError;
use crate::network::{Listener, ListenerCloser};
use crate::packet::{self, DiscoveryRecord};
use crate::registry::{DeviceRegistry, Sighting};
use std::io;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const DEFAULT_QUEUE_DEPTH: usize = 64;

/// Receives what the monitor decodes from the wire.
pub trait DiagnosticSink: Send {
    fn record(&mut self, record: &DiscoveryRecord, sighting: Sighting);

    fn decode_error(&mut self, error: &DiscoveryError, datagram_len: usize);
}

/// Reports records and decode failures as tracing events.
#[derive(Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&mut self, record: &DiscoveryRecord, sighting: Sighting) {
        let header = &record.header;
        match sighting {
            Sighting::New => info!(
                mac = %header.mac_address,
                ip = %header.ip_address,
                device_type = %header.device_type,
                "Discovered device: {}",
                record
            ),
            Sighting::Changed => info!(
                mac = %header.mac_address,
                "Device configuration changed: {}",
                record
            ),
            Sighting::Repeat => debug!(mac = %header.mac_address, "Device announced again"),
        }
    }

    fn decode_error(&mut self, error: &DiscoveryError, datagram_len: usize) {
        warn!(len = datagram_len, "Ignoring malformed discovery packet: {}", error);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    pub queue_depth: usize,
    /// Stop after the first successfully decoded record.
    pub once: bool,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        MonitorOptions {
            queue_depth: DEFAULT_QUEUE_DEPTH,
            once: false,
        }
    }
}

#[derive(Debug)]
pub struct MonitorReport {
    pub decoded: usize,
    pub malformed: usize,
    pub registry: DeviceRegistry,
}

enum Event {
    Decoded(DiscoveryRecord),
    Malformed {
        error: DiscoveryError,
        datagram_len: usize,
    },
}

/// Receive, decode and report discovery packets until the listener closes.
pub struct Monitor<S: DiagnosticSink> {
    listener: Listener,
    sink: S,
    options: MonitorOptions,
}

impl<S: DiagnosticSink> Monitor<S> {
    pub fn new(listener: Listener, sink: S, options: MonitorOptions) -> Self {
        Monitor {
            listener,
            sink,
            options,
        }
    }

    /// Closing through this handle is how a running monitor is stopped.
    pub fn closer(&self) -> ListenerCloser {
        self.listener.closer()
    }

    pub async fn run(self) -> Result<MonitorReport, DiscoveryError> {
        let Monitor {
            listener,
            mut sink,
            options,
        } = self;

        let closer = listener.closer();
        let (tx, mut rx) = mpsc::channel(options.queue_depth.max(1));
        let receiver = tokio::spawn(receive_loop(listener, tx));

        let mut report = MonitorReport {
            decoded: 0,
            malformed: 0,
            registry: DeviceRegistry::new(),
        };

        while let Some(event) = rx.recv().await {
            match event {
                Event::Decoded(record) => {
                    report.decoded += 1;
                    let sighting = report.registry.observe(record.clone());
                    sink.record(&record, sighting);

                    if options.once {
                        closer.close();
                        break;
                    }
                }
                Event::Malformed {
                    error,
                    datagram_len,
                } => {
                    report.malformed += 1;
                    sink.decode_error(&error, datagram_len);
                }
            }
        }
        drop(rx);

        receiver
            .await
            .map_err(|e| DiscoveryError::Recv(io::Error::new(io::ErrorKind::Other, e)))??;

        info!(
            decoded = report.decoded,
            malformed = report.malformed,
            devices = report.registry.len(),
            "Discovery monitor stopped"
        );
        Ok(report)
    }
}

async fn receive_loop(
    mut listener: Listener,
    tx: mpsc::Sender<Event>,
) -> Result<(), DiscoveryError> {
    let max_datagram_size = listener.max_datagram_size();
    let result = loop {
        let bytes = match listener.recv_one(max_datagram_size).await {
            Ok(bytes) => bytes,
            Err(DiscoveryError::SocketClosed) => break Ok(()),
            Err(e) => break Err(e),
        };
        debug!("Received {} byte datagram", bytes.len());

        let event = match packet::decode(&bytes) {
            Ok(record) => Event::Decoded(record),
            Err(error) if error.is_decode_error() => Event::Malformed {
                error,
                datagram_len: bytes.len(),
            },
            Err(error) => break Err(error),
        };

        if tx.send(event).await.is_err() {
            break Ok(());
        }
    };

    listener.close();
    result
}
