//! Composite plugin for combining multiple plugins.
//!
//! This module provides [`MultiPlugin`], which forwards both extension points to an
//! arbitrary number of [`Plugin`] implementations, in the order they were added.
//!
//! # Example
//!
//! ```rust
//! use netlogger::{MultiPlugin, NetworkLoggerPlugin, TracingOutput};
//!
//! let plugin = MultiPlugin::new()
//!     .with(NetworkLoggerPlugin::default())
//!     .with(NetworkLoggerPlugin::verbose().with_output(TracingOutput));
//!
//! assert_eq!(plugin.len(), 2);
//! ```

use crate::error::NetworkError;
use crate::types::{RequestView, ResponseView, Target};
use crate::Plugin;
use std::sync::Arc;

/// A plugin that delegates to multiple inner plugins.
///
/// `MultiPlugin` is `Send + Sync` and cheap to clone; inner plugins are shared.
#[derive(Clone, Default)]
pub struct MultiPlugin {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl MultiPlugin {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Add a plugin to the chain. Returns self for builder pattern.
    pub fn with<P: Plugin>(mut self, plugin: P) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }
}

impl Plugin for MultiPlugin {
    fn on_request_will_send(&self, request: Option<&dyn RequestView>, target: &dyn Target) {
        for plugin in &self.plugins {
            plugin.on_request_will_send(request, target);
        }
    }

    fn on_response_received(
        &self,
        result: Result<&dyn ResponseView, &NetworkError>,
        target: &dyn Target,
    ) {
        for plugin in &self.plugins {
            plugin.on_response_received(result, target);
        }
    }
}
