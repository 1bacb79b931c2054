// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams for Herald's external collaborators.
//!
//! The engine never talks to a concrete messaging client, contact store, or
//! dashboard; it consumes these capability-shaped traits instead.

pub mod observer;
pub mod renderer;
pub mod resolver;
pub mod transport;

pub use observer::ProgressObserver;
pub use renderer::TemplateRenderer;
pub use resolver::RecipientResolver;
pub use transport::TransportCapability;
