//! Subscription handle
//!
//! A `Subscription` owns the receiving side of one delivery queue. The
//! broadcaster owns the sending side and is the only party that closes it.

use std::fmt;
use std::sync::{Once, Weak};

use crossbeam_channel::Receiver;

use crate::broadcast::engine::Shared;

pub type SubscriberId = u64;

pub struct Subscription<T> {
    id: SubscriberId,
    queue: Receiver<T>,
    owner: Weak<Shared<T>>,
    unsubscribed: Once,
}

impl<T> Subscription<T> {
    pub(crate) fn new(id: SubscriberId, queue: Receiver<T>, owner: Weak<Shared<T>>) -> Self {
        Self {
            id,
            queue,
            owner,
            unsubscribed: Once::new(),
        }
    }

    /// The id assigned by the broadcaster.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Read side of the delivery queue.
    ///
    /// A receive fails with `RecvError` once the subscription has been
    /// removed or the broadcaster has been closed.
    pub fn queue(&self) -> &Receiver<T> {
        &self.queue
    }

    /// Blocks for the next message. `None` means end-of-stream.
    pub fn recv(&self) -> Option<T> {
        self.queue.recv().ok()
    }

    /// Removes this subscription from its broadcaster.
    ///
    /// Only the first call (across all threads) reaches the broadcaster.
    /// Concurrent callers wait until that removal has finished.
    /// Must not be called while this subscription's own queue is the one a
    /// broadcast is waiting on, or both sides wait forever.
    pub fn unsubscribe(&self) {
        self.unsubscribed.call_once(|| {
            if let Some(owner) = self.owner.upgrade() {
                owner.unsubscribe(self.id);
            }
        });
    }
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("unsubscribed", &self.unsubscribed.is_completed())
            .finish()
    }
}
