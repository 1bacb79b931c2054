// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Herald broadcast engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Herald configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HeraldConfig {
    /// Dispatch loop pacing and readiness settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Transport event stream settings.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchConfig::default(),
            transport: TransportConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// Dispatch loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Lower bound of the jittered inter-message delay, in milliseconds.
    #[serde(default = "default_delay_min_ms")]
    pub delay_min_ms: u64,

    /// Upper bound of the jittered inter-message delay, in milliseconds.
    #[serde(default = "default_delay_max_ms")]
    pub delay_max_ms: u64,

    /// Interval between transport readiness polls while waiting, in milliseconds.
    #[serde(default = "default_ready_poll_interval_ms")]
    pub ready_poll_interval_ms: u64,

    /// Bounded wait for transport readiness before a campaign is marked
    /// failed with `TransportUnavailable`, in milliseconds.
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            delay_min_ms: default_delay_min_ms(),
            delay_max_ms: default_delay_max_ms(),
            ready_poll_interval_ms: default_ready_poll_interval_ms(),
            ready_timeout_ms: default_ready_timeout_ms(),
        }
    }
}

fn default_delay_min_ms() -> u64 {
    3000
}

fn default_delay_max_ms() -> u64 {
    5000
}

fn default_ready_poll_interval_ms() -> u64 {
    1000
}

fn default_ready_timeout_ms() -> u64 {
    60_000
}

/// Transport event stream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Buffer size of the acknowledgement event channel. The reconciler
    /// drains it without blocking I/O, so a modest buffer suffices.
    #[serde(default = "default_ack_buffer")]
    pub ack_buffer: usize,

    /// Buffer size of the registry change broadcast channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ack_buffer: default_ack_buffer(),
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_ack_buffer() -> usize {
    256
}

fn default_event_buffer() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_design_values() {
        let config = HeraldConfig::default();
        assert_eq!(config.dispatch.delay_min_ms, 3000);
        assert_eq!(config.dispatch.delay_max_ms, 5000);
        assert_eq!(config.dispatch.ready_poll_interval_ms, 1000);
        assert_eq!(config.dispatch.ready_timeout_ms, 60_000);
        assert_eq!(config.transport.ack_buffer, 256);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml_str = r#"
[dispatch]
delay_min_ms = 1000
burst_size = 10
"#;
        assert!(toml::from_str::<HeraldConfig>(toml_str).is_err());
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let toml_str = r#"
[dispatch]
delay_min_ms = 100
delay_max_ms = 200
"#;
        let config: HeraldConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.dispatch.delay_min_ms, 100);
        assert_eq!(config.dispatch.delay_max_ms, 200);
        assert_eq!(config.dispatch.ready_poll_interval_ms, 1000);
    }
}
