// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Progress observer trait for dashboards and logs.

use async_trait::async_trait;

use crate::types::{CampaignId, CampaignSnapshot};

/// Receives a full campaign snapshot after every registry mutation.
///
/// Delivery is at-least-once and each snapshot is internally consistent,
/// so an observer that misses an intermediate event converges on the next.
#[async_trait]
pub trait ProgressObserver: Send + Sync + 'static {
    async fn on_campaign_change(&self, campaign_id: &CampaignId, snapshot: CampaignSnapshot);
}
