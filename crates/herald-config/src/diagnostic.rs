// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config error diagnostics with fuzzy match suggestions.
//!
//! Wraps Figment and validation failures in miette diagnostics, and offers
//! "did you mean?" suggestions for near-miss values using Jaro-Winkler
//! string similarity.

use miette::Diagnostic;
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
/// 0.75 catches common typos like `inof` -> `info` while filtering noise.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with diagnostic context.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Figment failed to load or deserialize the configuration.
    #[error("failed to load configuration: {source}")]
    #[diagnostic(
        code(herald::config::load),
        help("check herald.toml syntax and HERALD_* environment variables")
    )]
    Load {
        #[source]
        source: Box<figment::Error>,
    },

    /// A semantic validation failure on a loaded value.
    #[error("validation error: {message}")]
    #[diagnostic(code(herald::config::validation))]
    Validation { message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(source: figment::Error) -> Self {
        Self::Load {
            source: Box::new(source),
        }
    }
}

/// Find the closest valid candidate to `input`, if any is similar enough.
pub(crate) fn suggest<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, strsim::jaro_winkler(input, c)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_match() {
        assert_eq!(suggest("inof", &["trace", "debug", "info"]), Some("info"));
        assert_eq!(suggest("wran", &["warn", "error"]), Some("warn"));
    }

    #[test]
    fn no_suggestion_for_unrelated_input() {
        assert_eq!(suggest("xyzzy", &["trace", "debug", "info"]), None);
    }
}
