// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Herald broadcast engine.

use thiserror::Error;

use crate::types::{CampaignStatus, RecipientStatus};

/// The primary error type used across Herald trait seams and registry operations.
#[derive(Debug, Error)]
pub enum HeraldError {
    /// Campaign creation was attempted with zero recipients.
    #[error("campaign has no recipients")]
    EmptyAudience,

    /// The message template is structurally invalid (empty content).
    #[error("invalid message template: {0}")]
    InvalidTemplate(String),

    /// No campaign exists with the given identifier.
    #[error("campaign not found: {0}")]
    CampaignNotFound(String),

    /// A recipient index was outside the campaign's audience.
    #[error("recipient index {index} out of range (total {total})")]
    RecipientOutOfRange { index: usize, total: usize },

    /// An optimistic status transition lost a race; the caller must re-read.
    #[error("stale campaign transition: expected {expected}, found {actual}")]
    StaleTransition {
        expected: CampaignStatus,
        actual: CampaignStatus,
    },

    /// A recipient state change violated the monotonic lifecycle.
    #[error("invalid recipient transition: {from} -> {to}")]
    InvalidRecipientTransition {
        from: RecipientStatus,
        to: RecipientStatus,
    },

    /// Transport-level send or session errors.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The provider accepted the session but refused this message.
    ///
    /// Kept separate from [`Transport`](Self::Transport) so dashboards can
    /// tell "provider rejected" from "connection trouble".
    #[error("send rejected by provider: {0}")]
    SendRejected(String),

    /// Audience resolution errors from the recipient resolver.
    #[error("resolver error: {0}")]
    Resolver(String),

    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HeraldError {
    /// Shorthand for a transport error without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_transition_message_names_both_states() {
        let err = HeraldError::StaleTransition {
            expected: CampaignStatus::Running,
            actual: CampaignStatus::Cancelled,
        };
        let msg = err.to_string();
        assert!(msg.contains("Running"));
        assert!(msg.contains("Cancelled"));
    }

    #[test]
    fn transport_shorthand_has_no_source() {
        let err = HeraldError::transport("socket closed");
        match err {
            HeraldError::Transport { message, source } => {
                assert_eq!(message, "socket closed");
                assert!(source.is_none());
            }
            _ => panic!("expected transport error"),
        }
    }
}
