// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-audience recipient resolver for tests.

use async_trait::async_trait;

use herald_core::error::HeraldError;
use herald_core::traits::RecipientResolver;
use herald_core::types::{AudienceFilter, RecipientSpec};

/// Resolves every filter to the same fixed recipient list.
pub struct StaticResolver {
    specs: Vec<RecipientSpec>,
}

impl StaticResolver {
    pub fn new(specs: Vec<RecipientSpec>) -> Self {
        Self { specs }
    }

    /// A resolver with an empty audience, for creation-guard tests.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl RecipientResolver for StaticResolver {
    async fn resolve(&self, _filter: &AudienceFilter) -> Result<Vec<RecipientSpec>, HeraldError> {
        Ok(self.specs.clone())
    }
}
