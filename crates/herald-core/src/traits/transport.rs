// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport capability trait for the single-session outbound connection.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::types::{ProviderMessageId, SessionState};

/// The abstracted outbound messaging session.
///
/// The provider session is a single logical connection: callers must
/// serialize `send` calls themselves (the engine does this through a
/// process-wide send gate). Pairing, authentication, and reconnect plumbing
/// live behind this trait and are handled by a supervisor outside the
/// engine.
///
/// `send` carries no engine-side timeout; adapters are expected to enforce
/// their own deadline and fail the call rather than hang indefinitely.
#[async_trait]
pub trait TransportCapability: Send + Sync + 'static {
    /// Whether the session can currently deliver messages.
    async fn is_ready(&self) -> bool;

    /// Current lifecycle state of the underlying session.
    fn session_state(&self) -> SessionState;

    /// Send one message to one address, returning the provider-assigned
    /// message identifier used to correlate later acknowledgements.
    async fn send(&self, address: &str, text: &str) -> Result<ProviderMessageId, HeraldError>;
}
