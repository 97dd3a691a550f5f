use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes logging, broadcaster and relay settings.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub log: LogSettings,
    pub broadcaster: BroadcasterSettings,
    pub relay: RelaySettings,
}

/// Configuration settings for logging.
#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Configuration settings for the broadcaster.
///
/// `stall_warn_ms` is the fan-out duration after which a broadcast logs a
/// warning about a slow subscriber. `0` disables the warning.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BroadcasterSettings {
    pub stall_warn_ms: u64,
}

/// Configuration settings for the stdin relay.
#[derive(Debug, Deserialize, Clone)]
pub struct RelaySettings {
    pub subscribers: usize,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub log: Option<PartialLogSettings>,
    pub broadcaster: Option<PartialBroadcasterSettings>,
    pub relay: Option<PartialRelaySettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialBroadcasterSettings {
    pub stall_warn_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialRelaySettings {
    pub subscribers: Option<usize>,
}

impl Default for BroadcasterSettings {
    fn default() -> Self {
        Self {
            stall_warn_ms: 1000,
        }
    }
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            log: LogSettings {
                level: "info".to_string(),
            },
            broadcaster: BroadcasterSettings::default(),
            relay: RelaySettings { subscribers: 2 },
        }
    }
}
