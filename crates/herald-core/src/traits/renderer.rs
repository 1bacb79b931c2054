// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template renderer trait for message personalization.

use std::collections::BTreeMap;

use crate::types::RenderedMessage;

/// Renders a message template against one recipient's fields.
///
/// Unresolved placeholders are reported, not fatal: the returned text keeps
/// a visible marker where the value was missing and the dispatch loop sends
/// it anyway.
pub trait TemplateRenderer: Send + Sync + 'static {
    fn render(&self, template: &str, fields: &BTreeMap<String, String>) -> RenderedMessage;
}
