// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock collaborators for Herald integration tests.
//!
//! Provides deterministic doubles for the engine's trait seams: a
//! scriptable transport, a fixed-audience resolver, a `{{field}}`
//! renderer, and a snapshot-collecting observer.

pub mod braces_renderer;
pub mod collecting_observer;
pub mod mock_transport;
pub mod static_resolver;

pub use braces_renderer::BracesRenderer;
pub use collecting_observer::CollectingObserver;
pub use mock_transport::{MockTransport, SendRecord};
pub use static_resolver::StaticResolver;
