//! Broadcaster engine
//!
//! This module contains the registry of subscriptions and the fan-out loop:
//! - assigning monotonically increasing ids to new subscriptions
//! - delivering every broadcast message to each registered delivery queue
//! - removing (and closing) individual queues on unsubscribe
//! - closing every queue at once and disabling the broadcaster on close
//!
//! Concurrency and usage notes:
//! - One mutex guards the whole registry, and `broadcast` holds it for the
//!   full fan-out. Delivery queues are rendezvous channels, so a subscriber
//!   that stops reading stalls the broadcast in progress and every
//!   subscribe/unsubscribe/close waiting behind it.
//! - A subscriber must not unsubscribe from the thread that is supposed to
//!   drain its queue while a broadcast may be waiting on that same queue.
//!   Dropping the receiver instead is always safe: the pending send fails
//!   and the entry is pruned.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use tracing::{debug, info, warn};

use crate::broadcast::subscription::{SubscriberId, Subscription};
use crate::config::BroadcasterSettings;
use crate::utils::error::{BroadcastError, Result};

/// State guarded by the broadcaster lock.
pub(crate) struct Registry<T> {
    pub(crate) subscribers: HashMap<SubscriberId, Sender<T>>,
    pub(crate) next_id: SubscriberId,
    pub(crate) closed: bool,
}

impl<T> Registry<T> {
    fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
            next_id: 0,
            closed: false,
        }
    }
}

pub(crate) struct Shared<T> {
    registry: Mutex<Registry<T>>,
    stall_warn: Option<Duration>,
}

impl<T> Shared<T> {
    /// The registry is never left half-updated, so a poisoned lock is still usable.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Registry<T>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn unsubscribe(&self, id: SubscriberId) {
        let mut registry = self.lock();
        // Dropping the only sender closes the queue.
        if registry.subscribers.remove(&id).is_some() {
            debug!(subscriber = id, "unsubscribed");
        }
    }
}

/// In-process fan-out broadcaster.
///
/// Every message passed to [`Broadcaster::broadcast`] is handed to each
/// currently registered [`Subscription`] through its own unbuffered queue.
/// Cloning a `Broadcaster` yields another handle to the same registry.
/// When the last handle is dropped every queue reports end-of-stream.
pub struct Broadcaster<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Broadcaster<T> {
    /// Creates an open broadcaster with no subscribers and default settings.
    pub fn new() -> Self {
        Self::with_settings(&BroadcasterSettings::default())
    }

    /// Creates an open broadcaster, taking the stall-warning threshold from `settings`.
    pub fn with_settings(settings: &BroadcasterSettings) -> Self {
        let stall_warn = match settings.stall_warn_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry::new()),
                stall_warn,
            }),
        }
    }

    /// Registers a new subscriber and returns its handle.
    ///
    /// Ids start at 0 and are never reused by the same broadcaster, even
    /// after earlier subscriptions have been removed.
    ///
    /// # Errors
    /// Returns [`BroadcastError::Closed`] if [`Broadcaster::close`] has run.
    pub fn subscribe(&self) -> Result<Subscription<T>> {
        let mut registry = self.shared.lock();
        if registry.closed {
            return Err(BroadcastError::Closed);
        }

        let id = registry.next_id;
        registry.next_id += 1;

        let (tx, rx) = crossbeam_channel::bounded(0);
        registry.subscribers.insert(id, tx);
        debug!(subscriber = id, total = registry.subscribers.len(), "subscribed");

        Ok(Subscription::new(id, rx, Arc::downgrade(&self.shared)))
    }

    /// Removes the subscriber with `id` and closes its queue.
    ///
    /// Unknown ids, repeated calls and calls after close are no-ops.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.shared.unsubscribe(id);
    }

    /// Closes every delivery queue and permanently disables the broadcaster.
    ///
    /// Receivers blocked on their queue wake up with end-of-stream. Calling
    /// `close` again does nothing.
    pub fn close(&self) {
        let mut registry = self.shared.lock();
        if registry.closed {
            debug!("close called on an already closed broadcaster");
            return;
        }
        registry.closed = true;
        let dropped = registry.subscribers.len();
        registry.subscribers.clear();
        info!(subscribers = dropped, "broadcaster closed");
    }

    /// Number of subscriptions currently registered.
    pub fn subscriber_count(&self) -> usize {
        self.shared.lock().subscribers.len()
    }

    /// Whether [`Broadcaster::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

impl<T: Clone> Broadcaster<T> {
    /// Hands a copy of `msg` to every registered subscriber.
    ///
    /// Returns once each subscriber registered at the start of the call has
    /// taken its copy. Delivery order across subscribers is unspecified.
    /// With no subscribers the call returns immediately.
    ///
    /// Subscribers whose receiving side has been dropped are removed instead
    /// of failing the broadcast.
    ///
    /// # Errors
    /// Returns [`BroadcastError::Closed`] if [`Broadcaster::close`] has run.
    pub fn broadcast(&self, msg: T) -> Result<()> {
        let mut registry = self.shared.lock();
        if registry.closed {
            return Err(BroadcastError::Closed);
        }
        if registry.subscribers.is_empty() {
            return Ok(());
        }

        let started = Instant::now();
        let mut disconnected = Vec::new();
        for (id, tx) in &registry.subscribers {
            if tx.send(msg.clone()).is_err() {
                disconnected.push(*id);
            }
        }

        for id in disconnected {
            registry.subscribers.remove(&id);
            debug!(subscriber = id, "pruned subscriber with dropped queue");
        }

        if let Some(limit) = self.shared.stall_warn {
            let elapsed = started.elapsed();
            if elapsed >= limit {
                warn!(
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    subscribers = registry.subscribers.len(),
                    "broadcast stalled on slow subscriber"
                );
            }
        }

        Ok(())
    }
}

impl<T> Clone for Broadcaster<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Broadcaster<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.shared.lock();
        f.debug_struct("Broadcaster")
            .field("subscribers", &registry.subscribers.len())
            .field("next_id", &registry.next_id)
            .field("closed", &registry.closed)
            .finish()
    }
}

#[cfg(test)]
impl<T> Broadcaster<T> {
    pub(crate) fn registry(&self) -> MutexGuard<'_, Registry<T>> {
        self.shared.lock()
    }
}
