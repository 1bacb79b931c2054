// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign dispatch and delivery-tracking engine.
//!
//! Turns a (message, audience) pair into an ordered sequence of
//! per-recipient sends over a single shared outbound session, tracks each
//! recipient's delivery lifecycle, and reconciles out-of-order provider
//! acknowledgements back onto the right recipient. The
//! [`registry::CampaignRegistry`] is the single source of truth; the
//! dispatch loop and the reconciler hold no private recipient state.

pub mod address;
pub mod dispatch;
pub mod gate;
pub mod index;
pub mod publisher;
pub mod reconciler;
pub mod registry;
pub mod service;

pub use dispatch::Dispatcher;
pub use gate::SendGate;
pub use index::AckIndex;
pub use reconciler::Reconciler;
pub use registry::{AckOutcome, CampaignRegistry};
pub use service::HeraldService;
