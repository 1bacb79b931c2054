// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport capability for deterministic testing.
//!
//! `MockTransport` implements [`TransportCapability`] with scriptable
//! readiness, per-address send rejections, recorded send timing for
//! serialization assertions, and an injectable acknowledgement stream.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU8, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;

use herald_core::error::HeraldError;
use herald_core::traits::TransportCapability;
use herald_core::types::{AckEvent, AckLevel, ProviderMessageId, SessionState};

/// One observed `send` call, with enter/exit instants for overlap checks.
#[derive(Debug, Clone)]
pub struct SendRecord {
    pub address: String,
    pub text: String,
    pub provider_message_id: Option<ProviderMessageId>,
    pub started_at: Instant,
    pub finished_at: Instant,
}

/// A scriptable outbound session double.
pub struct MockTransport {
    session: AtomicU8,
    rejected: Mutex<HashSet<String>>,
    sends: Mutex<Vec<SendRecord>>,
    send_delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    counter: AtomicU64,
    ack_tx: Mutex<Option<mpsc::Sender<AckEvent>>>,
    auto_ack: Mutex<Option<AckLevel>>,
}

fn encode(state: SessionState) -> u8 {
    match state {
        SessionState::Disconnected => 0,
        SessionState::Pairing => 1,
        SessionState::Ready => 2,
    }
}

fn decode(raw: u8) -> SessionState {
    match raw {
        1 => SessionState::Pairing,
        2 => SessionState::Ready,
        _ => SessionState::Disconnected,
    }
}

impl MockTransport {
    /// A transport that starts ready and accepts every send.
    pub fn new() -> Self {
        Self {
            session: AtomicU8::new(encode(SessionState::Ready)),
            rejected: Mutex::new(HashSet::new()),
            sends: Mutex::new(Vec::new()),
            send_delay: Mutex::new(Duration::ZERO),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            counter: AtomicU64::new(0),
            ack_tx: Mutex::new(None),
            auto_ack: Mutex::new(None),
        }
    }

    pub fn set_session_state(&self, state: SessionState) {
        self.session.store(encode(state), Ordering::SeqCst);
    }

    pub fn set_ready(&self, ready: bool) {
        self.set_session_state(if ready {
            SessionState::Ready
        } else {
            SessionState::Disconnected
        });
    }

    /// Make sends to this normalized address fail with a provider rejection.
    pub async fn reject_address(&self, address: &str) {
        self.rejected.lock().await.insert(address.to_string());
    }

    /// Create the acknowledgement stream consumed by the reconciler.
    ///
    /// Acks injected via [`emit_ack`](Self::emit_ack) or generated by
    /// auto-ack flow through the returned receiver.
    pub async fn ack_stream(&self, capacity: usize) -> mpsc::Receiver<AckEvent> {
        let (tx, rx) = mpsc::channel(capacity);
        *self.ack_tx.lock().await = Some(tx);
        rx
    }

    /// Automatically emit acks up to `level` after every successful send.
    pub async fn set_auto_ack(&self, level: AckLevel) {
        *self.auto_ack.lock().await = Some(level);
    }

    /// Inject one acknowledgement event.
    pub async fn emit_ack(&self, message_id: ProviderMessageId, level: AckLevel) {
        if let Some(tx) = self.ack_tx.lock().await.as_ref() {
            let _ = tx.send(AckEvent { message_id, level }).await;
        }
    }

    /// Artificial latency inside `send`, to widen overlap windows in tests.
    pub async fn set_send_delay(&self, delay: Duration) {
        *self.send_delay.lock().await = delay;
    }

    /// All observed send attempts, in call order.
    pub async fn sent(&self) -> Vec<SendRecord> {
        self.sends.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sends.lock().await.len()
    }

    /// Highest number of concurrently in-flight sends ever observed.
    /// The engine's send gate keeps this at 1.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransportCapability for MockTransport {
    async fn is_ready(&self) -> bool {
        self.session_state() == SessionState::Ready
    }

    fn session_state(&self) -> SessionState {
        decode(self.session.load(Ordering::SeqCst))
    }

    async fn send(&self, address: &str, text: &str) -> Result<ProviderMessageId, HeraldError> {
        if self.session_state() != SessionState::Ready {
            return Err(HeraldError::transport("session not ready"));
        }

        let started_at = Instant::now();
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        let delay = *self.send_delay.lock().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let rejected = self.rejected.lock().await.contains(address);
        let result = if rejected {
            Err(HeraldError::SendRejected(format!(
                "message to {address} refused"
            )))
        } else {
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            Ok(ProviderMessageId(format!("mock-{n}")))
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.sends.lock().await.push(SendRecord {
            address: address.to_string(),
            text: text.to_string(),
            provider_message_id: result.as_ref().ok().cloned(),
            started_at,
            finished_at: Instant::now(),
        });

        // Auto-acks arrive a beat later, the way real provider receipts do.
        // The delay also lets the caller register the message id before the
        // first ack lands.
        if let Ok(ref message_id) = result
            && let Some(level) = *self.auto_ack.lock().await
            && let Some(tx) = self.ack_tx.lock().await.clone()
        {
            let message_id = message_id.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                for rank in 1..=3u8 {
                    let Some(step) = AckLevel::from_rank(rank) else {
                        break;
                    };
                    if step > level {
                        break;
                    }
                    let event = AckEvent {
                        message_id: message_id.clone(),
                        level: step,
                    };
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
            });
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_records_and_assigns_ids() {
        let transport = MockTransport::new();
        let id = transport.send("+4915112345678", "hi").await.unwrap();
        assert_eq!(id.0, "mock-0");
        let sent = transport.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].address, "+4915112345678");
        assert_eq!(sent[0].provider_message_id, Some(id));
    }

    #[tokio::test]
    async fn not_ready_send_fails() {
        let transport = MockTransport::new();
        transport.set_ready(false);
        assert!(transport.send("+4915112345678", "hi").await.is_err());
        assert_eq!(transport.sent_count().await, 0);
    }

    #[tokio::test]
    async fn rejected_address_fails_but_is_recorded() {
        let transport = MockTransport::new();
        transport.reject_address("+4915112345678").await;
        let err = transport.send("+4915112345678", "hi").await.unwrap_err();
        assert!(matches!(err, HeraldError::SendRejected(_)));
        let sent = transport.sent().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].provider_message_id.is_none());
    }

    #[tokio::test]
    async fn auto_ack_emits_up_to_level() {
        let transport = MockTransport::new();
        let mut acks = transport.ack_stream(16).await;
        transport.set_auto_ack(AckLevel::Read).await;
        let id = transport.send("+4915112345678", "hi").await.unwrap();

        for expected in [AckLevel::ServerAck, AckLevel::Delivered, AckLevel::Read] {
            let event = acks.recv().await.unwrap();
            assert_eq!(event.message_id, id);
            assert_eq!(event.level, expected);
        }
    }
}
