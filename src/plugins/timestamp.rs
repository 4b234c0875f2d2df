//! Timestamp enrichment plugin
//!
//! The canonical set-if-absent enricher: installation turns on automatic
//! time stamping unless the tree was explicitly configured otherwise. The
//! actual stamp is applied by the logger at entry assembly time, reading
//! the shared context flag this plugin sets.

use crate::core::{Plugin, PluginKernel, TIMESTAMP_KEY};
use async_trait::async_trait;

pub struct TimestampPlugin {
    name: String,
}

impl TimestampPlugin {
    pub fn new() -> Self {
        Self::named("timestamp")
    }

    /// A second instance under a different name, for kernels that forbid
    /// duplicate registrations
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for TimestampPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for TimestampPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn install(&self, kernel: &PluginKernel) {
        // Explicit construction-time configuration wins; among competing
        // plugins, installation order decides.
        kernel.context().set_if_absent(TIMESTAMP_KEY, true);
    }
}
