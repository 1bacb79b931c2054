// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authoritative in-memory campaign store.
//!
//! All mutation goes through narrow, atomic operations; the dispatch loop
//! and the reconciler both mutate the same campaign concurrently, so every
//! operation here holds the campaign's DashMap entry exclusively for its
//! full duration and never awaits while doing so. The invariant
//! `sent + failed + pending == total` therefore holds at every observable
//! point, and every successful mutation broadcasts a full consistent
//! snapshot.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use herald_core::error::HeraldError;
use herald_core::types::{
    CampaignEvent, CampaignId, CampaignSnapshot, CampaignStatus, ChangeKind, FailureReason,
    PauseKind, Progress, ProviderMessageId, RecipientSnapshot, RecipientSpec, RecipientStatus,
};

/// Result of applying an acknowledgement-driven transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckOutcome {
    /// Whether the transition actually advanced the recipient.
    pub applied: bool,
    /// The recipient's status after the call (unchanged when ignored).
    pub status_now: RecipientStatus,
}

#[derive(Debug, Clone)]
struct RecipientState {
    display_name: String,
    address: String,
    template_fields: std::collections::BTreeMap<String, String>,
    status: RecipientStatus,
    provider_message_id: Option<ProviderMessageId>,
    missing_fields: Vec<String>,
    last_error: Option<FailureReason>,
    last_updated_at: DateTime<Utc>,
}

impl RecipientState {
    fn from_spec(spec: RecipientSpec, now: DateTime<Utc>) -> Self {
        Self {
            display_name: spec.display_name,
            address: spec.address,
            template_fields: spec.template_fields,
            status: RecipientStatus::Pending,
            provider_message_id: None,
            missing_fields: Vec::new(),
            last_error: None,
            last_updated_at: now,
        }
    }

    fn snapshot(&self) -> RecipientSnapshot {
        RecipientSnapshot {
            display_name: self.display_name.clone(),
            address: self.address.clone(),
            template_fields: self.template_fields.clone(),
            status: self.status,
            provider_message_id: self.provider_message_id.clone(),
            missing_fields: self.missing_fields.clone(),
            last_error: self.last_error.clone(),
            last_updated_at: self.last_updated_at,
        }
    }
}

#[derive(Debug)]
struct CampaignState {
    name: String,
    message_template: String,
    status: CampaignStatus,
    pause_kind: Option<PauseKind>,
    failure_reason: Option<FailureReason>,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    recipients: Vec<RecipientState>,
}

impl CampaignState {
    fn progress(&self) -> Progress {
        let mut progress = Progress {
            total: self.recipients.len(),
            ..Progress::default()
        };
        for recipient in &self.recipients {
            match recipient.status {
                RecipientStatus::Pending => progress.pending += 1,
                RecipientStatus::Failed => progress.failed += 1,
                RecipientStatus::Sent | RecipientStatus::Delivered | RecipientStatus::Read => {
                    progress.sent += 1
                }
            }
        }
        progress
    }

    fn snapshot(&self, id: &CampaignId) -> CampaignSnapshot {
        CampaignSnapshot {
            id: id.clone(),
            name: self.name.clone(),
            message_template: self.message_template.clone(),
            status: self.status,
            pause_kind: self.pause_kind,
            failure_reason: self.failure_reason.clone(),
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            progress: self.progress(),
            recipients: self.recipients.iter().map(RecipientState::snapshot).collect(),
        }
    }
}

/// The single source of truth for campaign and recipient state.
pub struct CampaignRegistry {
    campaigns: DashMap<CampaignId, CampaignState>,
    events: broadcast::Sender<CampaignEvent>,
}

impl CampaignRegistry {
    /// Create an empty registry whose change events are buffered up to
    /// `event_buffer` entries per subscriber.
    pub fn new(event_buffer: usize) -> Self {
        let (events, _) = broadcast::channel(event_buffer);
        Self {
            campaigns: DashMap::new(),
            events,
        }
    }

    /// Subscribe to change events. Every event carries a full snapshot.
    pub fn subscribe(&self) -> broadcast::Receiver<CampaignEvent> {
        self.events.subscribe()
    }

    /// Create a campaign in `Queued` state with all recipients `Pending`.
    ///
    /// The audience is fixed here: `total` never changes afterwards.
    pub fn create_campaign(
        &self,
        name: &str,
        template: &str,
        specs: Vec<RecipientSpec>,
    ) -> Result<CampaignSnapshot, HeraldError> {
        if specs.is_empty() {
            return Err(HeraldError::EmptyAudience);
        }
        if template.trim().is_empty() {
            return Err(HeraldError::InvalidTemplate("template is empty".into()));
        }

        let id = CampaignId::new();
        let now = Utc::now();
        let state = CampaignState {
            name: name.to_string(),
            message_template: template.to_string(),
            status: CampaignStatus::Queued,
            pause_kind: None,
            failure_reason: None,
            created_at: now,
            started_at: None,
            completed_at: None,
            recipients: specs
                .into_iter()
                .map(|spec| RecipientState::from_spec(spec, now))
                .collect(),
        };
        let snapshot = state.snapshot(&id);
        self.campaigns.insert(id.clone(), state);
        self.publish(&id, ChangeKind::Created, snapshot.clone());
        Ok(snapshot)
    }

    /// Optimistically transition a campaign's status.
    ///
    /// Succeeds only if the current status equals `from`; otherwise returns
    /// `StaleTransition` and the caller must re-read and decide. Duplicate
    /// concurrent completions land here and are expected to be ignored by
    /// callers.
    pub fn transition_status(
        &self,
        id: &CampaignId,
        from: CampaignStatus,
        to: CampaignStatus,
    ) -> Result<(), HeraldError> {
        let mut entry = self.entry(id)?;
        let state = entry.value_mut();
        if state.status != from {
            return Err(HeraldError::StaleTransition {
                expected: from,
                actual: state.status,
            });
        }
        state.status = to;
        if to != CampaignStatus::Paused {
            state.pause_kind = None;
        }
        if to == CampaignStatus::Running && state.started_at.is_none() {
            state.started_at = Some(Utc::now());
        }
        if to.is_terminal() {
            state.completed_at = Some(Utc::now());
        }
        let snapshot = state.snapshot(id);
        drop(entry);
        self.publish(id, ChangeKind::StatusChanged, snapshot);
        Ok(())
    }

    /// Pause a running campaign, recording who paused it.
    pub fn pause(&self, id: &CampaignId, kind: PauseKind) -> Result<(), HeraldError> {
        let mut entry = self.entry(id)?;
        let state = entry.value_mut();
        if state.status != CampaignStatus::Running {
            return Err(HeraldError::StaleTransition {
                expected: CampaignStatus::Running,
                actual: state.status,
            });
        }
        state.status = CampaignStatus::Paused;
        state.pause_kind = Some(kind);
        let snapshot = state.snapshot(id);
        drop(entry);
        self.publish(id, ChangeKind::StatusChanged, snapshot);
        Ok(())
    }

    /// Resume a system-paused campaign back to `Running`.
    ///
    /// Used by the dispatch loop after transport readiness returns; refuses
    /// operator pauses so an operator decision is never overridden.
    pub fn resume_system(&self, id: &CampaignId) -> Result<(), HeraldError> {
        let mut entry = self.entry(id)?;
        let state = entry.value_mut();
        if state.status != CampaignStatus::Paused || state.pause_kind != Some(PauseKind::System) {
            return Err(HeraldError::StaleTransition {
                expected: CampaignStatus::Paused,
                actual: state.status,
            });
        }
        state.status = CampaignStatus::Running;
        state.pause_kind = None;
        let snapshot = state.snapshot(id);
        drop(entry);
        self.publish(id, ChangeKind::StatusChanged, snapshot);
        Ok(())
    }

    /// Return an operator-paused campaign to `Queued` so dispatch can
    /// reclaim it.
    pub fn resume_operator(&self, id: &CampaignId) -> Result<(), HeraldError> {
        let mut entry = self.entry(id)?;
        let state = entry.value_mut();
        if state.status != CampaignStatus::Paused || state.pause_kind != Some(PauseKind::Operator)
        {
            return Err(HeraldError::StaleTransition {
                expected: CampaignStatus::Paused,
                actual: state.status,
            });
        }
        state.status = CampaignStatus::Queued;
        state.pause_kind = None;
        let snapshot = state.snapshot(id);
        drop(entry);
        self.publish(id, ChangeKind::StatusChanged, snapshot);
        Ok(())
    }

    /// Cancel a campaign from any non-terminal state.
    ///
    /// Idempotent if already cancelled. Recipients keep whatever status
    /// acknowledgements have driven them to; remaining `Pending` recipients
    /// stay `Pending` permanently.
    pub fn cancel(&self, id: &CampaignId) -> Result<(), HeraldError> {
        let mut entry = self.entry(id)?;
        let state = entry.value_mut();
        match state.status {
            CampaignStatus::Cancelled => return Ok(()),
            CampaignStatus::Completed | CampaignStatus::Failed => {
                return Err(HeraldError::StaleTransition {
                    expected: CampaignStatus::Running,
                    actual: state.status,
                });
            }
            CampaignStatus::Queued | CampaignStatus::Running | CampaignStatus::Paused => {}
        }
        state.status = CampaignStatus::Cancelled;
        state.pause_kind = None;
        state.completed_at = Some(Utc::now());
        let snapshot = state.snapshot(id);
        drop(entry);
        self.publish(id, ChangeKind::StatusChanged, snapshot);
        Ok(())
    }

    /// Mark a whole campaign failed (transport gone beyond the bounded
    /// wait). Individual recipient statuses are left untouched so `Pending`
    /// remains distinguishable from `Failed`.
    pub fn fail_campaign(
        &self,
        id: &CampaignId,
        reason: FailureReason,
    ) -> Result<(), HeraldError> {
        let mut entry = self.entry(id)?;
        let state = entry.value_mut();
        if !matches!(
            state.status,
            CampaignStatus::Running | CampaignStatus::Paused
        ) {
            return Err(HeraldError::StaleTransition {
                expected: CampaignStatus::Running,
                actual: state.status,
            });
        }
        state.status = CampaignStatus::Failed;
        state.pause_kind = None;
        state.failure_reason = Some(reason);
        state.completed_at = Some(Utc::now());
        let snapshot = state.snapshot(id);
        drop(entry);
        self.publish(id, ChangeKind::StatusChanged, snapshot);
        Ok(())
    }

    /// Record a successful send: `Pending -> Sent` plus the provider id
    /// used as the reconciliation key.
    pub fn mark_recipient_sent(
        &self,
        id: &CampaignId,
        index: usize,
        provider_message_id: ProviderMessageId,
    ) -> Result<(), HeraldError> {
        let mut entry = self.entry(id)?;
        let state = entry.value_mut();
        let recipient = Self::recipient_mut(state, index)?;
        if recipient.status != RecipientStatus::Pending {
            return Err(HeraldError::InvalidRecipientTransition {
                from: recipient.status,
                to: RecipientStatus::Sent,
            });
        }
        recipient.status = RecipientStatus::Sent;
        recipient.provider_message_id = Some(provider_message_id);
        recipient.last_updated_at = Utc::now();
        let snapshot = state.snapshot(id);
        drop(entry);
        self.publish(id, ChangeKind::RecipientUpdated, snapshot);
        Ok(())
    }

    /// Record a recipient failure. Allowed from `Pending` or `Sent` (late
    /// provider failure); idempotent if already `Failed`.
    pub fn mark_recipient_failed(
        &self,
        id: &CampaignId,
        index: usize,
        reason: FailureReason,
    ) -> Result<(), HeraldError> {
        let mut entry = self.entry(id)?;
        let state = entry.value_mut();
        let recipient = Self::recipient_mut(state, index)?;
        match recipient.status {
            RecipientStatus::Failed => return Ok(()),
            RecipientStatus::Pending | RecipientStatus::Sent => {}
            from @ (RecipientStatus::Delivered | RecipientStatus::Read) => {
                return Err(HeraldError::InvalidRecipientTransition {
                    from,
                    to: RecipientStatus::Failed,
                });
            }
        }
        recipient.status = RecipientStatus::Failed;
        recipient.last_error = Some(reason);
        recipient.last_updated_at = Utc::now();
        let snapshot = state.snapshot(id);
        drop(entry);
        self.publish(id, ChangeKind::RecipientUpdated, snapshot);
        Ok(())
    }

    /// Record which placeholders were unresolved when the message was
    /// rendered. Non-fatal bookkeeping; the send proceeds regardless.
    pub fn flag_missing_fields(
        &self,
        id: &CampaignId,
        index: usize,
        missing: Vec<String>,
    ) -> Result<(), HeraldError> {
        let mut entry = self.entry(id)?;
        let state = entry.value_mut();
        let recipient = Self::recipient_mut(state, index)?;
        recipient.missing_fields = missing;
        recipient.last_updated_at = Utc::now();
        let snapshot = state.snapshot(id);
        drop(entry);
        self.publish(id, ChangeKind::RecipientUpdated, snapshot);
        Ok(())
    }

    /// Apply an acknowledgement-driven transition with the no-regression
    /// guard.
    ///
    /// Out-of-order and duplicate acknowledgements are no-ops, not errors:
    /// the target status only lands if it outranks the current one, and
    /// `Failed` recipients are never revived.
    pub fn apply_ack(
        &self,
        id: &CampaignId,
        index: usize,
        target: RecipientStatus,
    ) -> Result<AckOutcome, HeraldError> {
        let mut entry = self.entry(id)?;
        let state = entry.value_mut();
        let recipient = Self::recipient_mut(state, index)?;

        let (Some(target_rank), Some(current_rank)) = (target.rank(), recipient.status.rank())
        else {
            // Failed on either side: terminal, nothing to apply.
            return Ok(AckOutcome {
                applied: false,
                status_now: recipient.status,
            });
        };
        if target_rank <= current_rank {
            return Ok(AckOutcome {
                applied: false,
                status_now: recipient.status,
            });
        }

        recipient.status = target;
        recipient.last_updated_at = Utc::now();
        let snapshot = state.snapshot(id);
        drop(entry);
        self.publish(id, ChangeKind::RecipientUpdated, snapshot);
        Ok(AckOutcome {
            applied: true,
            status_now: target,
        })
    }

    /// Copy-on-read snapshot of a campaign. Never hands out live references.
    pub fn snapshot(&self, id: &CampaignId) -> Result<CampaignSnapshot, HeraldError> {
        let entry = self.entry(id)?;
        Ok(entry.value().snapshot(id))
    }

    /// Copy-on-read snapshot of a single recipient.
    pub fn recipient_snapshot(
        &self,
        id: &CampaignId,
        index: usize,
    ) -> Result<RecipientSnapshot, HeraldError> {
        let mut entry = self.entry(id)?;
        let state = entry.value_mut();
        Ok(Self::recipient_mut(state, index)?.snapshot())
    }

    /// Current status plus pause bookkeeping, for dispatch control checks.
    pub fn control_state(
        &self,
        id: &CampaignId,
    ) -> Result<(CampaignStatus, Option<PauseKind>), HeraldError> {
        let entry = self.entry(id)?;
        Ok((entry.value().status, entry.value().pause_kind))
    }

    /// Whether any recipient is still `Pending`.
    pub fn has_pending(&self, id: &CampaignId) -> Result<bool, HeraldError> {
        let entry = self.entry(id)?;
        Ok(entry
            .value()
            .recipients
            .iter()
            .any(|r| r.status == RecipientStatus::Pending))
    }

    /// Snapshots of all campaigns, oldest first.
    pub fn list(&self) -> Vec<CampaignSnapshot> {
        let mut snapshots: Vec<CampaignSnapshot> = self
            .campaigns
            .iter()
            .map(|entry| entry.value().snapshot(entry.key()))
            .collect();
        snapshots.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        snapshots
    }

    fn entry(
        &self,
        id: &CampaignId,
    ) -> Result<dashmap::mapref::one::RefMut<'_, CampaignId, CampaignState>, HeraldError> {
        self.campaigns
            .get_mut(id)
            .ok_or_else(|| HeraldError::CampaignNotFound(id.to_string()))
    }

    fn recipient_mut<'a>(
        state: &'a mut CampaignState,
        index: usize,
    ) -> Result<&'a mut RecipientState, HeraldError> {
        let total = state.recipients.len();
        state
            .recipients
            .get_mut(index)
            .ok_or(HeraldError::RecipientOutOfRange { index, total })
    }

    fn publish(&self, id: &CampaignId, kind: ChangeKind, snapshot: CampaignSnapshot) {
        // No subscribers is fine; events are best-effort fan-out of
        // snapshots that are each independently complete.
        if self
            .events
            .send(CampaignEvent {
                campaign_id: id.clone(),
                kind,
                snapshot,
            })
            .is_err()
        {
            debug!(campaign_id = %id, kind = %kind, "no event subscribers");
        }
    }
}
