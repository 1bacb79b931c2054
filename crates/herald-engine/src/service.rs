// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-facing service facade.
//!
//! Wires the registry, ack index, dispatcher, reconciler, and publisher
//! together and exposes the operator command surface an API or CLI layer
//! builds on: create, start, cancel, pause, resume, get, list.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use herald_config::HeraldConfig;
use herald_core::error::HeraldError;
use herald_core::traits::{
    ProgressObserver, RecipientResolver, TemplateRenderer, TransportCapability,
};
use herald_core::types::{
    AckEvent, AudienceFilter, CampaignId, CampaignSnapshot, PauseKind,
};

use crate::dispatch::Dispatcher;
use crate::gate::SendGate;
use crate::index::AckIndex;
use crate::publisher::forward_events;
use crate::reconciler::Reconciler;
use crate::registry::CampaignRegistry;

/// The assembled broadcast engine.
pub struct HeraldService {
    registry: Arc<CampaignRegistry>,
    index: Arc<AckIndex>,
    dispatcher: Arc<Dispatcher>,
    resolver: Arc<dyn RecipientResolver>,
    shutdown: CancellationToken,
}

impl HeraldService {
    pub fn new(
        transport: Arc<dyn TransportCapability>,
        resolver: Arc<dyn RecipientResolver>,
        renderer: Arc<dyn TemplateRenderer>,
        config: &HeraldConfig,
    ) -> Self {
        let registry = Arc::new(CampaignRegistry::new(config.transport.event_buffer));
        let index = Arc::new(AckIndex::new());
        let gate = Arc::new(SendGate::new(transport));
        let dispatcher = Arc::new(Dispatcher::new(
            registry.clone(),
            index.clone(),
            gate,
            renderer,
            config.dispatch.clone(),
        ));
        Self {
            registry,
            index,
            dispatcher,
            resolver,
            shutdown: CancellationToken::new(),
        }
    }

    /// The authoritative registry, for observers that want to subscribe
    /// directly.
    pub fn registry(&self) -> &Arc<CampaignRegistry> {
        &self.registry
    }

    /// Spawn the reconciler over a transport acknowledgement stream.
    pub fn spawn_reconciler(&self, events: mpsc::Receiver<AckEvent>) -> JoinHandle<()> {
        let reconciler = Reconciler::new(self.registry.clone(), self.index.clone());
        tokio::spawn(reconciler.run(events))
    }

    /// Spawn a forwarding task pushing registry snapshots to an observer.
    pub fn spawn_publisher(&self, observer: Arc<dyn ProgressObserver>) -> JoinHandle<()> {
        tokio::spawn(forward_events(self.registry.subscribe(), observer))
    }

    /// Resolve the audience and create a queued campaign.
    pub async fn create_campaign(
        &self,
        name: &str,
        template: &str,
        filter: &AudienceFilter,
    ) -> Result<CampaignSnapshot, HeraldError> {
        let recipients = self.resolver.resolve(filter).await?;
        let snapshot = self.registry.create_campaign(name, template, recipients)?;
        info!(
            campaign_id = %snapshot.id,
            total = snapshot.progress.total,
            "campaign created"
        );
        Ok(snapshot)
    }

    /// Start dispatching a queued campaign on a background task.
    pub fn start_campaign(&self, id: &CampaignId) -> Result<JoinHandle<()>, HeraldError> {
        // Surface a missing campaign synchronously instead of inside the task.
        self.registry.control_state(id)?;
        let dispatcher = self.dispatcher.clone();
        let campaign_id = id.clone();
        let cancel = self.shutdown.child_token();
        Ok(tokio::spawn(async move {
            if let Err(e) = dispatcher.run_campaign(campaign_id.clone(), cancel).await {
                error!(campaign_id = %campaign_id, error = %e, "campaign dispatch failed");
            }
        }))
    }

    /// Cooperatively cancel a campaign. Takes effect before the next send.
    pub fn cancel_campaign(&self, id: &CampaignId) -> Result<(), HeraldError> {
        self.registry.cancel(id)
    }

    /// Operator pause; the dispatch loop stops before the next send.
    pub fn pause_campaign(&self, id: &CampaignId) -> Result<(), HeraldError> {
        self.registry.pause(id, PauseKind::Operator)
    }

    /// Resume an operator-paused campaign and restart its dispatch loop.
    pub fn resume_campaign(&self, id: &CampaignId) -> Result<JoinHandle<()>, HeraldError> {
        self.registry.resume_operator(id)?;
        self.start_campaign(id)
    }

    pub fn get_campaign(&self, id: &CampaignId) -> Result<CampaignSnapshot, HeraldError> {
        self.registry.snapshot(id)
    }

    pub fn list_campaigns(&self) -> Vec<CampaignSnapshot> {
        self.registry.list()
    }

    /// Stop all dispatch loops at their next cooperative check.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
