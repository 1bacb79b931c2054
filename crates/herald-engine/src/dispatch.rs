// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-campaign dispatch loop.
//!
//! Drains a campaign's recipients in index order, one send at a time,
//! pacing sends with a jittered delay to respect the outbound session's
//! rate limits. Per-recipient failures stay local: a bad address or a
//! rejected send marks that recipient failed and the loop moves on. Only
//! transport loss beyond the bounded readiness wait fails the whole
//! campaign, and then without touching individual recipient statuses.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use herald_config::DispatchConfig;
use herald_core::error::HeraldError;
use herald_core::traits::TemplateRenderer;
use herald_core::types::{
    CampaignId, CampaignStatus, FailureReason, PauseKind, RecipientStatus,
};

use crate::address;
use crate::gate::SendGate;
use crate::index::AckIndex;
use crate::registry::CampaignRegistry;

/// Runs campaigns against the shared transport.
///
/// One `run_campaign` call owns a campaign's send order; multiple calls for
/// different campaigns may run concurrently and serialize on the
/// [`SendGate`].
pub struct Dispatcher {
    registry: Arc<CampaignRegistry>,
    index: Arc<AckIndex>,
    gate: Arc<SendGate>,
    renderer: Arc<dyn TemplateRenderer>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CampaignRegistry>,
        index: Arc<AckIndex>,
        gate: Arc<SendGate>,
        renderer: Arc<dyn TemplateRenderer>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            index,
            gate,
            renderer,
            config,
        }
    }

    /// Claim a queued campaign and dispatch it to completion.
    ///
    /// Returns `Ok(())` whenever the loop ends in a coherent state
    /// (completed, cancelled, paused by the operator, or failed on
    /// transport loss); an error means the campaign could not be claimed or
    /// vanished mid-run.
    pub async fn run_campaign(
        &self,
        id: CampaignId,
        cancel: CancellationToken,
    ) -> Result<(), HeraldError> {
        self.registry
            .transition_status(&id, CampaignStatus::Queued, CampaignStatus::Running)?;

        let snapshot = self.registry.snapshot(&id)?;
        let total = snapshot.progress.total;
        let template = snapshot.message_template;
        info!(campaign_id = %id, total, "campaign dispatch started");

        for index in 0..total {
            if !self.should_continue(&id, &cancel)? {
                return Ok(());
            }

            let recipient = self.registry.recipient_snapshot(&id, index)?;
            if recipient.status != RecipientStatus::Pending {
                continue;
            }

            if !self.gate.is_ready().await && !self.hold_for_transport(&id, &cancel).await? {
                return Ok(());
            }

            // Address problems fail this recipient only and skip the
            // pacing delay: nothing went out over the wire.
            let handle = match address::normalize(&recipient.address) {
                Ok(handle) => handle,
                Err(reason) => {
                    debug!(campaign_id = %id, index, %reason, "recipient address rejected");
                    self.mark_failed(&id, index, reason);
                    continue;
                }
            };

            let rendered = self.renderer.render(&template, &recipient.template_fields);
            if !rendered.missing_fields.is_empty() {
                warn!(
                    campaign_id = %id,
                    index,
                    missing = ?rendered.missing_fields,
                    "template placeholders unresolved, sending anyway"
                );
                if let Err(e) =
                    self.registry
                        .flag_missing_fields(&id, index, rendered.missing_fields)
                {
                    warn!(campaign_id = %id, index, error = %e, "failed to record missing fields");
                }
            }

            match self.gate.send(&handle, &rendered.text).await {
                Ok(provider_id) => {
                    debug!(
                        campaign_id = %id,
                        index,
                        provider_id = %provider_id,
                        "message handed to transport"
                    );
                    match self
                        .registry
                        .mark_recipient_sent(&id, index, provider_id.clone())
                    {
                        Ok(()) => self.index.insert(provider_id, id.clone(), index),
                        Err(e) => {
                            // Race-guard class: expected under concurrent
                            // duplicate delivery, log and move on.
                            warn!(campaign_id = %id, index, error = %e, "sent mark rejected");
                        }
                    }
                }
                Err(e) => {
                    warn!(campaign_id = %id, index, error = %e, "send failed");
                    let reason = match e {
                        HeraldError::SendRejected(detail) => {
                            FailureReason::ProviderRejected(detail)
                        }
                        other => FailureReason::TransportError(other.to_string()),
                    };
                    self.mark_failed(&id, index, reason);
                }
            }

            if index + 1 < total && self.registry.has_pending(&id)? {
                tokio::select! {
                    _ = cancel.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(self.pacing_delay()) => {}
                }
            }
        }

        self.finalize(&id)
    }

    /// Cooperative control check between recipients.
    fn should_continue(
        &self,
        id: &CampaignId,
        cancel: &CancellationToken,
    ) -> Result<bool, HeraldError> {
        if cancel.is_cancelled() {
            info!(campaign_id = %id, "dispatch stopped by shutdown");
            return Ok(false);
        }
        match self.registry.control_state(id)? {
            (CampaignStatus::Running, _) => Ok(true),
            (CampaignStatus::Cancelled, _) => {
                info!(campaign_id = %id, "campaign cancelled, stopping dispatch");
                Ok(false)
            }
            (CampaignStatus::Paused, kind) => {
                info!(campaign_id = %id, pause_kind = ?kind, "campaign paused, stopping dispatch");
                Ok(false)
            }
            (status, _) => {
                debug!(campaign_id = %id, %status, "campaign left running state");
                Ok(false)
            }
        }
    }

    /// System-pause the campaign and wait for transport readiness.
    ///
    /// Returns `Ok(true)` when the transport recovered and the campaign is
    /// running again; `Ok(false)` when the loop must stop (bounded wait
    /// elapsed and the campaign is now failed, or control changed hands).
    async fn hold_for_transport(
        &self,
        id: &CampaignId,
        cancel: &CancellationToken,
    ) -> Result<bool, HeraldError> {
        if self.registry.pause(id, PauseKind::System).is_err() {
            // Someone else changed the status under us; let the next
            // control check sort it out.
            return Ok(false);
        }
        info!(campaign_id = %id, "transport not ready, campaign paused");

        let recovered = self.wait_for_ready(cancel).await;

        // An operator may have cancelled while we waited.
        if let (CampaignStatus::Cancelled, _) = self.registry.control_state(id)? {
            return Ok(false);
        }

        if recovered {
            if self.registry.resume_system(id).is_err() {
                return Ok(false);
            }
            info!(campaign_id = %id, "transport recovered, campaign resumed");
            Ok(true)
        } else {
            warn!(campaign_id = %id, "transport unavailable past bounded wait, failing campaign");
            if let Err(e) = self
                .registry
                .fail_campaign(id, FailureReason::TransportUnavailable)
            {
                debug!(campaign_id = %id, error = %e, "campaign already finalized");
            }
            Ok(false)
        }
    }

    async fn wait_for_ready(&self, cancel: &CancellationToken) -> bool {
        let deadline = Instant::now() + Duration::from_millis(self.config.ready_timeout_ms);
        let poll = Duration::from_millis(self.config.ready_poll_interval_ms);
        loop {
            if self.gate.is_ready().await {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::select! {
                _ = cancel.cancelled() => return false,
                _ = tokio::time::sleep(poll) => {}
            }
        }
    }

    fn mark_failed(&self, id: &CampaignId, index: usize, reason: FailureReason) {
        if let Err(e) = self.registry.mark_recipient_failed(id, index, reason) {
            warn!(campaign_id = %id, index, error = %e, "failure mark rejected");
        }
    }

    fn finalize(&self, id: &CampaignId) -> Result<(), HeraldError> {
        if self.registry.has_pending(id)? {
            // Cancelled, paused, or failed mid-run; leave as is.
            return Ok(());
        }
        match self
            .registry
            .transition_status(id, CampaignStatus::Running, CampaignStatus::Completed)
        {
            Ok(()) => {
                info!(campaign_id = %id, "campaign completed");
                Ok(())
            }
            Err(HeraldError::StaleTransition { .. }) => {
                // Concurrent finalization; nothing to do.
                debug!(campaign_id = %id, "campaign already finalized");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn pacing_delay(&self) -> Duration {
        let millis = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.config.delay_min_ms..=self.config.delay_max_ms)
        };
        Duration::from_millis(millis)
    }
}
