// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Acknowledgement reconciler.
//!
//! Consumes the transport's raw acknowledgement stream and turns it into
//! monotonic recipient transitions. The stream guarantees nothing about
//! ordering; the registry's no-regression guard is what makes out-of-order
//! and duplicate events safe, not any bookkeeping here. Handling is fast
//! and free of I/O so a slow consumer never backpressures the transport.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use herald_core::error::HeraldError;
use herald_core::types::AckEvent;

use crate::index::AckIndex;
use crate::registry::CampaignRegistry;

/// Maps provider acknowledgements back to recipients and applies them.
pub struct Reconciler {
    registry: Arc<CampaignRegistry>,
    index: Arc<AckIndex>,
}

impl Reconciler {
    pub fn new(registry: Arc<CampaignRegistry>, index: Arc<AckIndex>) -> Self {
        Self { registry, index }
    }

    /// Consume acknowledgement events until the channel closes.
    pub async fn run(self, mut events: mpsc::Receiver<AckEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        info!("acknowledgement stream closed, reconciler stopping");
    }

    /// Apply a single acknowledgement.
    ///
    /// Unknown message ids are dropped silently: they legitimately arrive
    /// for messages whose index entry was already cleaned up.
    pub fn handle(&self, event: AckEvent) {
        let Some(target) = self.index.lookup(&event.message_id) else {
            debug!(message_id = %event.message_id, "ack for untracked message, dropping");
            return;
        };

        let status = event.level.as_recipient_status();
        match self
            .registry
            .apply_ack(&target.campaign_id, target.recipient_index, status)
        {
            Ok(outcome) => {
                if outcome.applied {
                    debug!(
                        campaign_id = %target.campaign_id,
                        index = target.recipient_index,
                        status = %outcome.status_now,
                        "ack applied"
                    );
                }
                if outcome.status_now.is_terminal() {
                    self.index.remove(&event.message_id);
                }
            }
            Err(HeraldError::CampaignNotFound(_)) => {
                // Campaign evicted after completion; drop the stale entry.
                debug!(message_id = %event.message_id, "ack for removed campaign");
                self.index.remove(&event.message_id);
            }
            Err(e) => {
                warn!(
                    campaign_id = %target.campaign_id,
                    index = target.recipient_index,
                    error = %e,
                    "ack reconciliation rejected"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::types::{
        AckLevel, ProviderMessageId, RecipientSpec, RecipientStatus,
    };

    fn setup() -> (Arc<CampaignRegistry>, Arc<AckIndex>, Reconciler) {
        let registry = Arc::new(CampaignRegistry::new(64));
        let index = Arc::new(AckIndex::new());
        let reconciler = Reconciler::new(registry.clone(), index.clone());
        (registry, index, reconciler)
    }

    fn spec() -> RecipientSpec {
        RecipientSpec {
            display_name: "Ada".into(),
            address: "+4915112345678".into(),
            template_fields: Default::default(),
        }
    }

    #[test]
    fn unknown_message_id_is_a_silent_noop() {
        let (registry, _, reconciler) = setup();
        let snapshot = registry
            .create_campaign("launch", "hi", vec![spec()])
            .unwrap();
        reconciler.handle(AckEvent {
            message_id: ProviderMessageId("ghost".into()),
            level: AckLevel::Read,
        });
        let after = registry.snapshot(&snapshot.id).unwrap();
        assert_eq!(after, registry.snapshot(&snapshot.id).unwrap());
        assert_eq!(after.recipients[0].status, RecipientStatus::Pending);
    }

    #[test]
    fn read_ack_before_delivered_sticks_at_read() {
        let (registry, index, reconciler) = setup();
        let snapshot = registry
            .create_campaign("launch", "hi", vec![spec()])
            .unwrap();
        let id = snapshot.id;
        let pmid = ProviderMessageId("m1".into());
        registry.mark_recipient_sent(&id, 0, pmid.clone()).unwrap();
        index.insert(pmid.clone(), id.clone(), 0);

        reconciler.handle(AckEvent {
            message_id: pmid.clone(),
            level: AckLevel::Read,
        });
        reconciler.handle(AckEvent {
            message_id: pmid.clone(),
            level: AckLevel::Delivered,
        });

        let after = registry.snapshot(&id).unwrap();
        assert_eq!(after.recipients[0].status, RecipientStatus::Read);
    }

    #[test]
    fn terminal_ack_cleans_up_index() {
        let (registry, index, reconciler) = setup();
        let snapshot = registry
            .create_campaign("launch", "hi", vec![spec()])
            .unwrap();
        let id = snapshot.id;
        let pmid = ProviderMessageId("m1".into());
        registry.mark_recipient_sent(&id, 0, pmid.clone()).unwrap();
        index.insert(pmid.clone(), id, 0);

        reconciler.handle(AckEvent {
            message_id: pmid.clone(),
            level: AckLevel::Read,
        });
        assert!(index.is_empty());

        // A duplicate after cleanup is the untracked case: still a no-op.
        reconciler.handle(AckEvent {
            message_id: pmid,
            level: AckLevel::Read,
        });
    }

    #[test]
    fn server_ack_does_not_advance_sent_recipient() {
        let (registry, index, reconciler) = setup();
        let snapshot = registry
            .create_campaign("launch", "hi", vec![spec()])
            .unwrap();
        let id = snapshot.id;
        let pmid = ProviderMessageId("m1".into());
        registry.mark_recipient_sent(&id, 0, pmid.clone()).unwrap();
        index.insert(pmid.clone(), id.clone(), 0);

        reconciler.handle(AckEvent {
            message_id: pmid,
            level: AckLevel::ServerAck,
        });
        let after = registry.snapshot(&id).unwrap();
        assert_eq!(after.recipients[0].status, RecipientStatus::Sent);
        // Not terminal, so the index entry stays for later acks.
        assert_eq!(index.len(), 1);
    }
}
