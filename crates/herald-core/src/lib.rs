// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Herald broadcast engine.
//!
//! This crate provides the trait seams, error types, and common types used
//! throughout the Herald workspace: the transport capability consumed by the
//! dispatch loop, the resolver and renderer collaborators, and the snapshot
//! types observers receive.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HeraldError;
pub use traits::{ProgressObserver, RecipientResolver, TemplateRenderer, TransportCapability};
pub use types::{
    AckEvent, AckLevel, CampaignId, CampaignSnapshot, CampaignStatus, ProviderMessageId,
    RecipientStatus,
};
