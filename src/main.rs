mod announce;
mod cli;
mod error;
mod monitor;
mod network;
mod packet;
mod registry;

use cli::{AnnounceArgs, Command, ListenArgs};
use error::DiscoveryError;
use monitor::{Monitor, TracingSink};
use network::Listener;
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    // Initialize logger
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_target(false)
        .without_time()
        .init();

    let result = match args.command {
        Command::Listen(listen) => listen_for_devices(listen).await,
        Command::Announce(announce) => announce_device(announce).await,
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(exit_code(&e));
    }
}

async fn listen_for_devices(args: ListenArgs) -> Result<(), DiscoveryError> {
    let listener = Listener::bind(&args.listener_config())?;
    info!("Waiting for discovery packets on {}", listener.local_addr());

    let monitor = Monitor::new(listener, TracingSink, args.monitor_options());

    // Closing the listener is the only way to stop the monitor
    let closer = monitor.closer();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, closing listener");
            closer.close();
        }
    });

    let report = monitor.run().await?;
    if report.registry.is_empty() {
        info!("No devices discovered");
    }
    for entry in report.registry.devices() {
        info!(
            "Seen {} time(s) over {:?}: {}",
            entry.sightings,
            entry.last_seen.duration_since(entry.first_seen),
            entry.record
        );
    }
    Ok(())
}

async fn announce_device(args: AnnounceArgs) -> Result<(), DiscoveryError> {
    let config = args.announce_config();
    let sent = announce::announce(&config).await?;
    info!("Sent {} discovery packet(s)", sent);
    Ok(())
}

fn exit_code(error: &DiscoveryError) -> i32 {
    match error {
        e if e.is_transport_error() => 3,
        e if e.is_decode_error() => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_exit_codes() {
        let bind = DiscoveryError::Bind {
            addr: "0.0.0.0:7331".to_string(),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert_eq!(exit_code(&bind), 1);
        assert_eq!(exit_code(&DiscoveryError::InvalidMac("zz".into())), 1);
        assert_eq!(exit_code(&DiscoveryError::UnknownDeviceType(3)), 2);
        assert_eq!(exit_code(&DiscoveryError::SocketClosed), 3);
        assert_eq!(
            exit_code(&DiscoveryError::Recv(io::Error::from(io::ErrorKind::Other))),
            3
        );
    }
}
