// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Progress observer that captures snapshots for assertions.

use async_trait::async_trait;
use tokio::sync::Mutex;

use herald_core::traits::ProgressObserver;
use herald_core::types::{CampaignId, CampaignSnapshot};

/// Collects every published snapshot in arrival order.
#[derive(Default)]
pub struct CollectingObserver {
    received: Mutex<Vec<(CampaignId, CampaignSnapshot)>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn received(&self) -> Vec<(CampaignId, CampaignSnapshot)> {
        self.received.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.received.lock().await.len()
    }

    pub async fn last(&self) -> Option<CampaignSnapshot> {
        self.received
            .lock()
            .await
            .last()
            .map(|(_, snapshot)| snapshot.clone())
    }
}

#[async_trait]
impl ProgressObserver for CollectingObserver {
    async fn on_campaign_change(&self, campaign_id: &CampaignId, snapshot: CampaignSnapshot) {
        self.received
            .lock()
            .await
            .push((campaign_id.clone(), snapshot));
    }
}
