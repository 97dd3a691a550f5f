//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `fanout` crate.
//!
//! - `error`: the crate error type and `Result` alias.
//! - `logging`: `tracing` subscriber setup for the binary.

pub mod error;
pub mod logging;

#[cfg(test)]
mod tests {
    use super::error::BroadcastError;
    use super::logging;

    #[test]
    fn logging_init_accepts_levels() {
        // Should not panic
        logging::init("info");
        logging::init("debug");
        logging::init("warn");
    }

    #[test]
    fn parse_level_falls_back_to_info() {
        assert_eq!(logging::parse_level("WARNING"), tracing::Level::WARN);
        assert_eq!(logging::parse_level("trace"), tracing::Level::TRACE);
        assert_eq!(logging::parse_level("verbose"), tracing::Level::INFO);
    }

    #[test]
    fn closed_error_display() {
        assert_eq!(BroadcastError::Closed.to_string(), "broadcaster is closed");
    }
}
