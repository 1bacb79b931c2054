// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide send serialization over the shared transport session.
//!
//! The provider session is a single logical connection: even though
//! campaigns dispatch independently, only one `send` may be in flight at a
//! time. The gate holds a tokio mutex across the whole send await so
//! concurrent dispatch loops queue up instead of interleaving.

use std::sync::Arc;

use tokio::sync::Mutex;

use herald_core::error::HeraldError;
use herald_core::traits::TransportCapability;
use herald_core::types::{ProviderMessageId, SessionState};

/// Serializing wrapper around the shared [`TransportCapability`].
pub struct SendGate {
    transport: Arc<dyn TransportCapability>,
    lock: Mutex<()>,
}

impl SendGate {
    pub fn new(transport: Arc<dyn TransportCapability>) -> Self {
        Self {
            transport,
            lock: Mutex::new(()),
        }
    }

    /// Send one message, holding the process-wide send slot for the
    /// duration of the call.
    pub async fn send(
        &self,
        address: &str,
        text: &str,
    ) -> Result<ProviderMessageId, HeraldError> {
        let _slot = self.lock.lock().await;
        self.transport.send(address, text).await
    }

    /// Readiness passthrough; not serialized, safe to poll while a send is
    /// in flight.
    pub async fn is_ready(&self) -> bool {
        self.transport.is_ready().await
    }

    pub fn session_state(&self) -> SessionState {
        self.transport.session_state()
    }
}
