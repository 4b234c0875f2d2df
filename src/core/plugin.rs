//! Plugin contract and lifecycle kernel
//!
//! Plugins install synchronously at registration time and may carry
//! asynchronous `on_init`/`on_destroy` hooks that the kernel runs in bulk:
//! init strictly in registration order and fail-fast, destroy strictly in
//! reverse registration order with failures collected.

use super::context::TreeContext;
use super::error::{LoggerError, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

/// Named extension with a synchronous install hook and optional
/// asynchronous init/destroy hooks.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique name within one kernel
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Runs synchronously while `register` executes, before it returns.
    /// This is the place to mutate the shared context deterministically,
    /// typically via `kernel.context().set_if_absent(..)`.
    fn install(&self, kernel: &PluginKernel);

    /// Runs during `init()`, in registration order
    async fn on_init(&self) -> Result<()> {
        Ok(())
    }

    /// Runs during `destroy()`, in reverse registration order
    async fn on_destroy(&self) -> Result<()> {
        Ok(())
    }
}

/// Registry managing plugin registration and lifecycle ordering
pub struct PluginKernel {
    plugins: RwLock<Vec<Arc<dyn Plugin>>>,
    context: TreeContext,
}

impl PluginKernel {
    pub fn new(context: TreeContext) -> Self {
        Self {
            plugins: RwLock::new(Vec::new()),
            context,
        }
    }

    /// The shared context of the logger tree this kernel belongs to
    pub fn context(&self) -> &TreeContext {
        &self.context
    }

    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.read().iter().any(|p| p.name() == name)
    }

    /// Register a plugin and run its `install` hook synchronously.
    ///
    /// Registering a name that already exists fails with a configuration
    /// error rather than silently replacing the previous registration.
    pub fn register(&self, plugin: Arc<dyn Plugin>) -> Result<()> {
        {
            let plugins = self.plugins.read();
            if plugins.iter().any(|p| p.name() == plugin.name()) {
                return Err(LoggerError::config(
                    "plugin",
                    format!("duplicate plugin name '{}'", plugin.name()),
                ));
            }
        }

        plugin.install(self);
        self.plugins.write().push(plugin);
        Ok(())
    }

    /// Remove a plugin by name, awaiting its `on_destroy` hook.
    ///
    /// Returns `Ok(false)` when no plugin with that name is registered.
    pub async fn unregister(&self, name: &str) -> Result<bool> {
        let removed = {
            let mut plugins = self.plugins.write();
            match plugins.iter().position(|p| p.name() == name) {
                Some(index) => Some(plugins.remove(index)),
                None => None,
            }
        };

        match removed {
            Some(plugin) => {
                plugin
                    .on_destroy()
                    .await
                    .map_err(|e| LoggerError::plugin(name, "on_destroy", e.to_string()))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run every plugin's `on_init` in registration order, each awaited to
    /// completion before the next begins.
    ///
    /// Fail-fast: the first failure aborts initialization and propagates;
    /// remaining plugins do not run. A half-initialized tree is a fatal
    /// construction error for the caller.
    pub async fn init(&self) -> Result<()> {
        let snapshot: Vec<Arc<dyn Plugin>> = self.plugins.read().clone();
        for plugin in snapshot {
            plugin
                .on_init()
                .await
                .map_err(|e| LoggerError::plugin(plugin.name(), "on_init", e.to_string()))?;
        }
        Ok(())
    }

    /// Run every plugin's `on_destroy` in exact reverse registration order,
    /// each awaited before the next begins, then clear the registry.
    ///
    /// Never fail-fast: every plugin gets its teardown call; failures are
    /// collected and surfaced once as an aggregate error.
    pub async fn destroy(&self) -> Result<()> {
        let drained: Vec<Arc<dyn Plugin>> = {
            let mut plugins = self.plugins.write();
            plugins.drain(..).collect()
        };

        let mut failures = Vec::new();
        for plugin in drained.iter().rev() {
            if let Err(e) = plugin.on_destroy().await {
                failures.push(format!("{}: {}", plugin.name(), e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(LoggerError::PluginTeardown { failures })
        }
    }
}
