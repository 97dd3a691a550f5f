//! Stdin relay
//!
//! The relay is the calling side of a [`Broadcaster`]: it feeds input lines
//! into the broadcaster and runs one draining thread per subscription.
//! Subscriber threads keep draining their queue even when their output
//! fails, since a subscriber that stops reading stalls every other one.

pub mod message;

use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, warn};

use crate::broadcast::{Broadcaster, Subscription};
use crate::relay::message::{Delivery, Line};
use crate::utils::error::{RelayError, Result};

/// Subscribes `count` handles and starts a draining thread for each.
///
/// Every received [`Line`] is written to `sink` as one JSON [`Delivery`]
/// record per output line. Each thread ends at end-of-stream and returns
/// the number of lines it received.
pub fn spawn_subscribers<W>(
    broadcaster: &Broadcaster<Line>,
    count: usize,
    sink: Arc<Mutex<W>>,
) -> Result<Vec<JoinHandle<u64>>>
where
    W: Write + Send + 'static,
{
    let subscriptions = (0..count)
        .map(|_| broadcaster.subscribe())
        .collect::<Result<Vec<_>>>()?;

    Ok(subscriptions
        .into_iter()
        .map(|subscription| {
            let sink = Arc::clone(&sink);
            thread::spawn(move || drain(subscription, &sink))
        })
        .collect())
}

fn drain<W: Write>(subscription: Subscription<Line>, sink: &Mutex<W>) -> u64 {
    let id = subscription.id();
    let mut received = 0;

    while let Some(line) = subscription.recv() {
        received += 1;
        let record = Delivery {
            subscriber: id,
            line,
        };
        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                warn!(subscriber = id, "Failed to serialize delivery: {e}");
                continue;
            }
        };

        let mut out = sink.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{json}").and_then(|_| out.flush()) {
            warn!(subscriber = id, "Failed to write delivery: {e}");
        }
    }

    debug!(subscriber = id, received, "subscriber reached end of stream");
    received
}

/// Waits for every subscriber thread and returns the total lines received.
///
/// A thread that panicked is logged and counted as zero.
pub fn join_subscribers(handles: Vec<JoinHandle<u64>>) -> u64 {
    handles
        .into_iter()
        .map(|handle| {
            handle.join().unwrap_or_else(|e| {
                error!("Subscriber thread panicked: {:?}", e);
                0
            })
        })
        .sum()
}

/// Broadcasts every line of `reader` and returns how many were sent.
///
/// Lines are numbered from 0. Trailing `\n` / `\r\n` is stripped.
pub fn pump<R: BufRead>(
    broadcaster: &Broadcaster<Line>,
    reader: R,
) -> std::result::Result<u64, RelayError> {
    let mut seq = 0;
    for line in reader.lines() {
        broadcaster.broadcast(Line::new(seq, line?))?;
        seq += 1;
    }
    Ok(seq)
}

#[cfg(test)]
mod tests;
