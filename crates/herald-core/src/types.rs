// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Herald broadcast engine.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a campaign, assigned at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub String);

impl CampaignId {
    /// Generate a fresh random campaign id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for CampaignId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CampaignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Provider-assigned identifier for one sent message.
///
/// This is the reconciliation key: acknowledgement events arriving from the
/// transport carry it, and the ack index maps it back to a recipient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderMessageId(pub String);

impl std::fmt::Display for ProviderMessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of a campaign.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum CampaignStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Paused,
    Cancelled,
}

impl CampaignStatus {
    /// Terminal statuses admit no further transitions or sends.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Who paused a campaign.
///
/// The dispatch loop pauses a campaign itself while waiting for transport
/// readiness; only operator pauses are resumable through the service API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum PauseKind {
    Operator,
    System,
}

/// Delivery lifecycle status of one recipient.
///
/// Transitions are strictly monotonic in rank order; `Failed` is terminal
/// and reachable from `Pending` or `Sent` only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum RecipientStatus {
    Pending,
    Sent,
    Delivered,
    Read,
    Failed,
}

impl RecipientStatus {
    /// Monotonic rank used by the no-regression guard. `Failed` has no rank.
    pub fn rank(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Sent => Some(1),
            Self::Delivered => Some(2),
            Self::Read => Some(3),
            Self::Failed => None,
        }
    }

    /// Terminal recipient states; the ack index entry can be dropped here.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Read | Self::Failed)
    }
}

/// Delivery acknowledgement rank reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AckLevel {
    /// Message accepted by the provider's server.
    ServerAck,
    /// Message delivered to the recipient's device.
    Delivered,
    /// Message read by the recipient.
    Read,
}

impl AckLevel {
    /// Parse the provider's numeric ack rank (1..=3).
    pub fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(Self::ServerAck),
            2 => Some(Self::Delivered),
            3 => Some(Self::Read),
            _ => None,
        }
    }

    /// The recipient status this ack level drives toward.
    pub fn as_recipient_status(self) -> RecipientStatus {
        match self {
            Self::ServerAck => RecipientStatus::Sent,
            Self::Delivered => RecipientStatus::Delivered,
            Self::Read => RecipientStatus::Read,
        }
    }
}

/// Connection state of the outbound transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum SessionState {
    Disconnected,
    Pairing,
    Ready,
}

/// One asynchronous delivery acknowledgement from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckEvent {
    pub message_id: ProviderMessageId,
    pub level: AckLevel,
}

/// Why a recipient send failed, or why a campaign was abandoned.
///
/// The classes are kept distinct so observers can tell "no address" from
/// "bad address" from "provider rejected" from "never attempted".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The recipient record has no contact address at all.
    MissingAddress,
    /// The address does not normalize to a routable handle.
    InvalidAddress,
    /// The provider accepted the session but rejected this message.
    ProviderRejected(String),
    /// The send call itself failed at the transport layer.
    TransportError(String),
    /// Campaign-level: the transport stayed unavailable past the bounded wait.
    TransportUnavailable,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAddress => write!(f, "recipient has no address"),
            Self::InvalidAddress => write!(f, "address is not routable"),
            Self::ProviderRejected(detail) => write!(f, "provider rejected message: {detail}"),
            Self::TransportError(detail) => write!(f, "transport send failed: {detail}"),
            Self::TransportUnavailable => write!(f, "transport unavailable"),
        }
    }
}

/// Audience selection criteria handed to the recipient resolver.
///
/// The filter language itself lives behind the resolver seam; the engine
/// treats criteria as an opaque key/value set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceFilter {
    pub criteria: BTreeMap<String, String>,
}

impl AudienceFilter {
    /// A filter that selects the whole contact list.
    pub fn all() -> Self {
        Self::default()
    }
}

/// One resolved audience member, as produced by the recipient resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientSpec {
    pub display_name: String,
    pub address: String,
    /// Open string-keyed personalization fields for the template renderer.
    #[serde(default)]
    pub template_fields: BTreeMap<String, String>,
}

/// A personalized message produced by the template renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub text: String,
    /// Placeholder names the renderer could not resolve. Non-fatal: the
    /// message is still sent with the placeholder visibly marked.
    pub missing_fields: Vec<String>,
}

/// Aggregate delivery counts for a campaign.
///
/// `sent + failed + pending == total` holds at all times; `sent` counts
/// every recipient that left `Pending` successfully (Sent, Delivered, Read).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub pending: usize,
}

/// Copy-on-read view of one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientSnapshot {
    pub display_name: String,
    pub address: String,
    pub template_fields: BTreeMap<String, String>,
    pub status: RecipientStatus,
    pub provider_message_id: Option<ProviderMessageId>,
    /// Placeholders that were unresolved when the message was rendered.
    pub missing_fields: Vec<String>,
    pub last_error: Option<FailureReason>,
    pub last_updated_at: DateTime<Utc>,
}

/// Copy-on-read view of one campaign.
///
/// Snapshots are detached copies; mutating a snapshot never affects the
/// registry, and every snapshot is internally consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSnapshot {
    pub id: CampaignId,
    pub name: String,
    pub message_template: String,
    pub status: CampaignStatus,
    pub pause_kind: Option<PauseKind>,
    pub failure_reason: Option<FailureReason>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress: Progress,
    pub recipients: Vec<RecipientSnapshot>,
}

/// What kind of registry mutation produced a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ChangeKind {
    Created,
    StatusChanged,
    RecipientUpdated,
}

/// A registry change notification carrying a full consistent snapshot.
#[derive(Debug, Clone)]
pub struct CampaignEvent {
    pub campaign_id: CampaignId,
    pub kind: ChangeKind,
    pub snapshot: CampaignSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn campaign_ids_are_unique() {
        assert_ne!(CampaignId::new(), CampaignId::new());
    }

    #[test]
    fn recipient_status_ranks_are_monotonic() {
        assert!(RecipientStatus::Pending.rank() < RecipientStatus::Sent.rank());
        assert!(RecipientStatus::Sent.rank() < RecipientStatus::Delivered.rank());
        assert!(RecipientStatus::Delivered.rank() < RecipientStatus::Read.rank());
        assert!(RecipientStatus::Failed.rank().is_none());
    }

    #[test]
    fn terminal_states() {
        assert!(RecipientStatus::Read.is_terminal());
        assert!(RecipientStatus::Failed.is_terminal());
        assert!(!RecipientStatus::Delivered.is_terminal());
        assert!(CampaignStatus::Cancelled.is_terminal());
        assert!(!CampaignStatus::Paused.is_terminal());
    }

    #[test]
    fn ack_level_from_rank() {
        assert_eq!(AckLevel::from_rank(1), Some(AckLevel::ServerAck));
        assert_eq!(AckLevel::from_rank(2), Some(AckLevel::Delivered));
        assert_eq!(AckLevel::from_rank(3), Some(AckLevel::Read));
        assert_eq!(AckLevel::from_rank(0), None);
        assert_eq!(AckLevel::from_rank(4), None);
    }

    #[test]
    fn ack_level_maps_to_recipient_status() {
        assert_eq!(
            AckLevel::Read.as_recipient_status(),
            RecipientStatus::Read
        );
        assert_eq!(
            AckLevel::Delivered.as_recipient_status(),
            RecipientStatus::Delivered
        );
    }

    #[test]
    fn campaign_status_round_trips_through_strings() {
        for status in [
            CampaignStatus::Queued,
            CampaignStatus::Running,
            CampaignStatus::Completed,
            CampaignStatus::Failed,
            CampaignStatus::Paused,
            CampaignStatus::Cancelled,
        ] {
            let parsed = CampaignStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn failure_reasons_stay_distinguishable() {
        let reasons = [
            FailureReason::MissingAddress,
            FailureReason::InvalidAddress,
            FailureReason::ProviderRejected("spam".into()),
            FailureReason::TransportError("timeout".into()),
            FailureReason::TransportUnavailable,
        ];
        let rendered: Vec<String> = reasons.iter().map(|r| r.to_string()).collect();
        for (i, a) in rendered.iter().enumerate() {
            for b in rendered.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
