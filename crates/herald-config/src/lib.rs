// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Herald broadcast engine.
//!
//! Layered TOML configuration with environment overrides, semantic
//! validation, and miette diagnostics for actionable error output.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::ConfigError;
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{DispatchConfig, HeraldConfig, TransportConfig};
pub use validation::validate_config;

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point: loads TOML files + env vars via
/// Figment, then runs post-deserialization validation. Values the engine
/// assumes to be coherent (the jittered delay window, nonzero intervals
/// and buffers) are only guaranteed by this path; callers handing a
/// hand-built `HeraldConfig` to the engine must validate it themselves.
pub fn load_and_validate() -> Result<HeraldConfig, Vec<ConfigError>> {
    let config = loader::load_config().map_err(|e| vec![e])?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<HeraldConfig, Vec<ConfigError>> {
    let config = loader::load_config_from_str(toml_content).map_err(|e| vec![e])?;
    validation::validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_toml_loads_and_validates() {
        let config = load_and_validate_str(
            r#"
[dispatch]
delay_min_ms = 100
delay_max_ms = 200
"#,
        )
        .unwrap();
        assert_eq!(config.dispatch.delay_min_ms, 100);
    }

    // An inverted delay window must never reach a running dispatcher:
    // `gen_range` on an empty range panics inside the dispatch task.
    #[test]
    fn inverted_delay_window_is_rejected_before_dispatch() {
        let errors = load_and_validate_str(
            r#"
[dispatch]
delay_min_ms = 5000
delay_max_ms = 3000
"#,
        )
        .unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("delay_min_ms"))
        ));
    }

    #[test]
    fn figment_errors_surface_as_load_errors() {
        let errors = load_and_validate_str("[dispatch\n").unwrap_err();
        assert!(matches!(errors[0], ConfigError::Load { .. }));
    }
}
