// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Progress publisher glue.
//!
//! Forwards registry change events to a [`ProgressObserver`]. Every event
//! carries a full snapshot, so a subscriber that lags and drops
//! intermediate events still converges on the next one it receives.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::warn;

use herald_core::traits::ProgressObserver;
use herald_core::types::CampaignEvent;

/// Forward registry events to an observer until the registry is dropped.
pub async fn forward_events(
    mut events: broadcast::Receiver<CampaignEvent>,
    observer: Arc<dyn ProgressObserver>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                observer
                    .on_campaign_change(&event.campaign_id, event.snapshot)
                    .await;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "observer lagged behind registry events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
