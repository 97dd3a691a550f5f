//! The `error` module defines custom error types used within the `fanout` crate.
//!
//! The broadcaster has a single failure mode: operating on it after it has
//! been closed. Unsubscribing an unknown id is a no-op and never an error.

use thiserror::Error;

/// Errors returned by [`Broadcaster`](crate::broadcast::Broadcaster) operations.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BroadcastError {
    /// `subscribe` or `broadcast` was called after `close`.
    #[error("broadcaster is closed")]
    Closed,
}

impl BroadcastError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use fanout::BroadcastError;
    ///
    /// assert_eq!(BroadcastError::Closed.as_label(), "broadcaster_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BroadcastError::Closed => "broadcaster_closed",
        }
    }
}

pub type Result<T> = std::result::Result<T, BroadcastError>;

/// Errors returned by the stdin relay.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RelayError {
    /// Reading the input stream failed.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The broadcaster was closed while input was still being relayed.
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),
}
