// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./herald.toml` > `~/.config/herald/herald.toml` >
//! `/etc/herald/herald.toml` with environment variable overrides via the
//! `HERALD_` prefix.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::diagnostic::ConfigError;
use crate::model::HeraldConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/herald/herald.toml` (system-wide)
/// 3. `~/.config/herald/herald.toml` (user XDG config)
/// 4. `./herald.toml` (local directory)
/// 5. `HERALD_*` environment variables
pub fn load_config() -> Result<HeraldConfig, ConfigError> {
    let config: HeraldConfig = Figment::new()
        .merge(Serialized::defaults(HeraldConfig::default()))
        .merge(Toml::file("/etc/herald/herald.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("herald/herald.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("herald.toml"))
        .merge(env_provider())
        .extract()?;
    Ok(config)
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<HeraldConfig, ConfigError> {
    let config: HeraldConfig = Figment::new()
        .merge(Serialized::defaults(HeraldConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()?;
    Ok(config)
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HeraldConfig, ConfigError> {
    let config: HeraldConfig = Figment::new()
        .merge(Serialized::defaults(HeraldConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()?;
    Ok(config)
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `HERALD_DISPATCH_DELAY_MIN_MS` must map
/// to `dispatch.delay_min_ms`, not `dispatch.delay.min.ms`.
fn env_provider() -> Env {
    Env::prefixed("HERALD_").map(|key| {
        // Figment hands `map` the post-prefix key in its original case
        // (e.g. `DISPATCH_DELAY_MIN_MS`); lowercase it so the section
        // mapping below matches.
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = key_str
            .replacen("dispatch_", "dispatch.", 1)
            .replacen("transport_", "transport.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.dispatch.delay_min_ms, 3000);
        assert_eq!(config.dispatch.delay_max_ms, 5000);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
log_level = "debug"

[dispatch]
delay_min_ms = 10
delay_max_ms = 20
ready_timeout_ms = 1500
"#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.dispatch.delay_min_ms, 10);
        assert_eq!(config.dispatch.delay_max_ms, 20);
        assert_eq!(config.dispatch.ready_timeout_ms, 1500);
        // Untouched keys keep defaults.
        assert_eq!(config.transport.ack_buffer, 256);
    }

    #[test]
    fn malformed_toml_is_a_load_error() {
        let result = load_config_from_str("[dispatch\ndelay_min_ms = 1");
        assert!(matches!(result, Err(ConfigError::Load { .. })));
    }

    #[test]
    fn env_vars_map_to_section_keys_and_override_files() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "herald.toml",
                r#"
[dispatch]
delay_min_ms = 10
delay_max_ms = 20
"#,
            )?;
            // Underscore-containing key names must survive the mapping:
            // HERALD_DISPATCH_DELAY_MIN_MS -> dispatch.delay_min_ms.
            jail.set_env("HERALD_DISPATCH_DELAY_MIN_MS", "15");
            jail.set_env("HERALD_TRANSPORT_ACK_BUFFER", "32");
            jail.set_env("HERALD_LOG_LEVEL", "debug");

            let config = load_config_from_path(Path::new("herald.toml"))
                .expect("config loads under jail");
            assert_eq!(config.dispatch.delay_min_ms, 15);
            assert_eq!(config.dispatch.delay_max_ms, 20);
            assert_eq!(config.transport.ack_buffer, 32);
            assert_eq!(config.log_level, "debug");
            Ok(())
        });
    }
}
