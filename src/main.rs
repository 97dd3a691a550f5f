//! `fanout` binary
//!
//! Reads lines from stdin and fans each one out to the configured number of
//! subscriber threads, which print one JSON record per received line.
//! Stops at end of input or on Ctrl-C.

use std::io;
use std::sync::{Arc, Mutex};
use std::thread;

use fanout::Broadcaster;
use fanout::config::load_config;
use fanout::relay::{self, message::Line};
use fanout::utils::logging;
use tokio::sync::oneshot;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    if let Err(e) = run().await {
        error!("Relay failed: {}", e);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            logging::init("info");
            return Err(e.into());
        }
    };
    logging::init(&config.log.level);

    let broadcaster: Broadcaster<Line> = Broadcaster::with_settings(&config.broadcaster);
    let sink = Arc::new(Mutex::new(io::stdout()));
    let handles = relay::spawn_subscribers(&broadcaster, config.relay.subscribers, sink)?;
    info!(subscribers = handles.len(), "relaying stdin");

    // A plain thread rather than spawn_blocking: a stdin read cannot be
    // cancelled and would hold up runtime shutdown after Ctrl-C.
    let (done_tx, done_rx) = oneshot::channel();
    let pumper = broadcaster.clone();
    thread::spawn(move || {
        let _ = done_tx.send(relay::pump(&pumper, io::stdin().lock()));
    });

    tokio::select! {
        res = done_rx => match res {
            Ok(Ok(lines)) => info!(lines, "input exhausted"),
            Ok(Err(e)) => error!("Input relay failed: {}", e),
            Err(_) => error!("Input relay exited without reporting"),
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    broadcaster.close();

    let joined = tokio::task::spawn_blocking(move || relay::join_subscribers(handles)).await?;
    info!(delivered = joined, "all subscribers finished");

    Ok(())
}
