// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as delay window ordering and nonzero intervals.

use crate::diagnostic::{suggest, ConfigError};
use crate::model::HeraldConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &HeraldConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.dispatch.delay_min_ms > config.dispatch.delay_max_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "dispatch.delay_min_ms ({}) must not exceed dispatch.delay_max_ms ({})",
                config.dispatch.delay_min_ms, config.dispatch.delay_max_ms
            ),
        });
    }

    if config.dispatch.ready_poll_interval_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.ready_poll_interval_ms must be nonzero".to_string(),
        });
    }

    if config.dispatch.ready_timeout_ms < config.dispatch.ready_poll_interval_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "dispatch.ready_timeout_ms ({}) must be at least dispatch.ready_poll_interval_ms ({})",
                config.dispatch.ready_timeout_ms, config.dispatch.ready_poll_interval_ms
            ),
        });
    }

    if config.transport.ack_buffer == 0 {
        errors.push(ConfigError::Validation {
            message: "transport.ack_buffer must be nonzero".to_string(),
        });
    }

    if config.transport.event_buffer == 0 {
        errors.push(ConfigError::Validation {
            message: "transport.event_buffer must be nonzero".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        let message = match suggest(&config.log_level, LOG_LEVELS) {
            Some(candidate) => format!(
                "log_level `{}` is not recognized, did you mean `{candidate}`?",
                config.log_level
            ),
            None => format!(
                "log_level `{}` is not recognized (expected one of: {})",
                config.log_level,
                LOG_LEVELS.join(", ")
            ),
        };
        errors.push(ConfigError::Validation { message });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = HeraldConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn inverted_delay_window_fails() {
        let mut config = HeraldConfig::default();
        config.dispatch.delay_min_ms = 5000;
        config.dispatch.delay_max_ms = 3000;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("delay_min_ms"))
        ));
    }

    #[test]
    fn zero_poll_interval_fails() {
        let mut config = HeraldConfig::default();
        config.dispatch.ready_poll_interval_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("ready_poll_interval_ms"))
        ));
    }

    #[test]
    fn timeout_below_poll_interval_fails() {
        let mut config = HeraldConfig::default();
        config.dispatch.ready_timeout_ms = 500;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("ready_timeout_ms"))
        ));
    }

    #[test]
    fn typo_log_level_gets_suggestion() {
        let mut config = HeraldConfig::default();
        config.log_level = "inof".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("did you mean `info`"))
        ));
    }

    #[test]
    fn collects_multiple_errors() {
        let mut config = HeraldConfig::default();
        config.dispatch.ready_poll_interval_ms = 0;
        config.transport.ack_buffer = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 2);
    }
}
