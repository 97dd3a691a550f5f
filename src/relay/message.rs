use serde::{Deserialize, Serialize};

use crate::broadcast::SubscriberId;

/// One line of relayed input.
///
/// # Fields
///
/// - `seq` - Position of the line in the input, starting at 0.
/// - `payload` - The line content without its trailing newline.
/// - `timestamp` - Milliseconds since the UNIX epoch when the line was read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub seq: u64,
    pub payload: String,
    pub timestamp: i64,
}

impl Line {
    pub fn new(seq: u64, payload: String) -> Self {
        Self {
            seq,
            payload,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Output record written by a subscriber for each line it receives.
#[derive(Debug, Serialize, Deserialize)]
pub struct Delivery {
    pub subscriber: SubscriberId,
    pub line: Line,
}
