//! # Fanout
//!
//! `fanout` is an in-process fan-out broadcaster: one publisher pushes a
//! message and every currently registered subscriber receives a copy
//! through its own unbuffered delivery queue.
//!
//! ## Core Modules
//!
//! - `broadcast`: the `Broadcaster` registry and the `Subscription` handle.
//! - `config`: loading settings from `config/default.toml` and `FANOUT_*` variables.
//! - `relay`: feeds input lines into a broadcaster and drains subscriptions on threads.
//! - `utils`: error types and logging setup.
//!
//! ## Example
//!
//! ```
//! use fanout::Broadcaster;
//! use std::thread;
//!
//! let broadcaster = Broadcaster::new();
//! let sub = broadcaster.subscribe()?;
//!
//! let reader = thread::spawn(move || sub.recv());
//! broadcaster.broadcast("hello")?;
//! assert_eq!(reader.join().unwrap(), Some("hello"));
//!
//! broadcaster.close();
//! # Ok::<(), fanout::BroadcastError>(())
//! ```

pub mod broadcast;
pub mod config;
pub mod relay;
pub mod utils;

pub use broadcast::{Broadcaster, SubscriberId, Subscription};
pub use utils::error::{BroadcastError, RelayError, Result};
