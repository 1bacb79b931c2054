// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconciliation index: provider message id -> (campaign, recipient).
//!
//! The dispatch loop inserts an entry after each successful send; the
//! reconciler reads it to correlate acknowledgements and removes it once
//! the recipient reaches a terminal state, bounding memory growth.

use dashmap::DashMap;

use herald_core::types::{CampaignId, ProviderMessageId};

/// Where an acknowledgement belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckTarget {
    pub campaign_id: CampaignId,
    pub recipient_index: usize,
}

/// Concurrency-safe provider-message-id lookup table.
#[derive(Debug, Default)]
pub struct AckIndex {
    entries: DashMap<ProviderMessageId, AckTarget>,
}

impl AckIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        message_id: ProviderMessageId,
        campaign_id: CampaignId,
        recipient_index: usize,
    ) {
        self.entries.insert(
            message_id,
            AckTarget {
                campaign_id,
                recipient_index,
            },
        );
    }

    pub fn lookup(&self, message_id: &ProviderMessageId) -> Option<AckTarget> {
        self.entries.get(message_id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, message_id: &ProviderMessageId) {
        self.entries.remove(message_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
