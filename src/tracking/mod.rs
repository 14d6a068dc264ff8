//! Tracking snippet generation
//!
//! Turns an [`AnalyticsConfig`](crate::models::AnalyticsConfig) and a
//! [`RequestContext`](crate::models::RequestContext) into the HTML fragment
//! that loads a vendor tracker:
//!
//! - [`resolver`] maps configured dimension bindings onto plugin values
//! - [`render`] formats resolved values as vendor push-queue calls
//! - [`track_url`] builds the readable page path used as URL and title
//! - [`engine`] assembles the full snippet per vendor

pub mod engine;
pub mod render;
pub mod resolver;
pub mod track_url;

pub use engine::{engine_for, should_track, user_full_name, TrackingEngine};
pub use resolver::{resolve_one, resolve_scope, ResolvedDimension};
pub use track_url::track_url;

use serde::Serialize;
use tracing::warn;

/// Developer-facing, non-fatal messages produced while building snippets.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    messages: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}
