// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recipient resolver trait for audience selection.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::types::{AudienceFilter, RecipientSpec};

/// Resolves audience filter criteria into an ordered recipient list.
///
/// The order of the returned list is the send order for the campaign and
/// stays index-stable for the campaign's lifetime.
#[async_trait]
pub trait RecipientResolver: Send + Sync + 'static {
    async fn resolve(&self, filter: &AudienceFilter) -> Result<Vec<RecipientSpec>, HeraldError>;
}
