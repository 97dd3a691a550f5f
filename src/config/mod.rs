mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{BroadcasterSettings, LogSettings, RelaySettings, Settings};

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the log, broadcaster and relay configurations
///
/// Environment variables use the `FANOUT_` prefix and `__` between sections,
/// e.g. `FANOUT_RELAY__SUBSCRIBERS=4`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("FANOUT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        log: LogSettings {
            level: partial
                .log
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.log.level),
        },
        broadcaster: BroadcasterSettings {
            stall_warn_ms: partial
                .broadcaster
                .as_ref()
                .and_then(|b| b.stall_warn_ms)
                .unwrap_or(default.broadcaster.stall_warn_ms),
        },
        relay: RelaySettings {
            subscribers: partial
                .relay
                .as_ref()
                .and_then(|r| r.subscribers)
                .unwrap_or(default.relay.subscribers),
        },
    })
}
