//! Engine configuration parsed from environment variables.

use crate::application::bus::BusConfig;

/// Default capacity for the order update channel.
const DEFAULT_ORDER_UPDATES_CAPACITY: usize = 1_000;

/// Default capacity for the connection status channel.
const DEFAULT_CONNECTION_STATUS_CAPACITY: usize = 64;

/// Default capacity for the simulated session event channel.
const DEFAULT_SESSION_EVENT_CAPACITY: usize = 256;

/// Which session adapter to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// No counterparty connection; submissions park locally.
    Offline,
    /// In-process simulated counterparty for development.
    Simulated,
}

/// Parsed configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Session adapter selection.
    pub session_mode: SessionMode,
    /// Capacity of the simulated session event channel.
    pub session_event_capacity: usize,
    /// Notification bus channel capacities.
    pub bus: BusConfig,
}

impl EngineConfig {
    /// Parse configuration from the process environment.
    ///
    /// - `SESSION_MODE`: OFFLINE | SIMULATED (default: OFFLINE)
    /// - `SESSION_EVENT_CAPACITY`: simulated session channel size
    /// - `ORDER_UPDATES_CAPACITY`: order update channel size
    /// - `CONNECTION_STATUS_CAPACITY`: connection status channel size
    ///
    /// Unparseable values fall back to defaults rather than failing
    /// startup.
    #[must_use]
    pub fn from_env() -> Self {
        let session_mode = match std::env::var("SESSION_MODE")
            .unwrap_or_default()
            .to_uppercase()
            .as_str()
        {
            "SIMULATED" => SessionMode::Simulated,
            _ => SessionMode::Offline,
        };

        Self {
            session_mode,
            session_event_capacity: env_usize(
                "SESSION_EVENT_CAPACITY",
                DEFAULT_SESSION_EVENT_CAPACITY,
            ),
            bus: BusConfig {
                order_updates_capacity: env_usize(
                    "ORDER_UPDATES_CAPACITY",
                    DEFAULT_ORDER_UPDATES_CAPACITY,
                ),
                connection_status_capacity: env_usize(
                    "CONNECTION_STATUS_CAPACITY",
                    DEFAULT_CONNECTION_STATUS_CAPACITY,
                ),
            },
        }
    }

    /// Session mode name for logging.
    #[must_use]
    pub const fn session_mode_name(&self) -> &'static str {
        match self.session_mode {
            SessionMode::Offline => "OFFLINE",
            SessionMode::Simulated => "SIMULATED",
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_mode: SessionMode::Offline,
            session_event_capacity: DEFAULT_SESSION_EVENT_CAPACITY,
            bus: BusConfig {
                order_updates_capacity: DEFAULT_ORDER_UPDATES_CAPACITY,
                connection_status_capacity: DEFAULT_CONNECTION_STATUS_CAPACITY,
            },
        }
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.session_mode, SessionMode::Offline);
        assert_eq!(config.session_event_capacity, 256);
        assert_eq!(config.bus.order_updates_capacity, 1_000);
    }

    #[test]
    fn session_mode_names() {
        assert_eq!(EngineConfig::default().session_mode_name(), "OFFLINE");
        let simulated = EngineConfig {
            session_mode: SessionMode::Simulated,
            ..EngineConfig::default()
        };
        assert_eq!(simulated.session_mode_name(), "SIMULATED");
    }
}
