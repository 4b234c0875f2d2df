//! Logger tree implementation
//!
//! A root logger owns the tree's shared pieces: one `TreeContext`, one
//! `TransportRegistry`, and one `PluginKernel`. Child loggers share all
//! three by reference, carry merged bindings, and snapshot the parent's
//! minimum level at creation time.

use super::context::TreeContext;
use super::dispatch::{stderr_error_hook, ErrorHook, TransportRegistry};
use super::entry::LogEntry;
use super::error::Result;
use super::fields::Fields;
use super::level::LogLevel;
use super::plugin::{Plugin, PluginKernel};
use super::transport::{ExecutionContext, Transport};
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;

pub struct Logger {
    /// This logger's own minimum; children snapshot it, they do not track it
    min_level: RwLock<LogLevel>,
    /// Ancestor bindings merged with this logger's own, nearest wins.
    /// Immutable after creation.
    bindings: Fields,
    context: TreeContext,
    transports: Arc<TransportRegistry>,
    kernel: Arc<PluginKernel>,
}

impl Logger {
    /// Create a builder for a root logger
    ///
    /// # Example
    /// ```no_run
    /// use fanlog::prelude::*;
    ///
    /// # fn main() -> fanlog::core::Result<()> {
    /// # let rt = tokio::runtime::Runtime::new().unwrap();
    /// # rt.block_on(async {
    /// let logger = Logger::builder()
    ///     .min_level(LogLevel::Debug)
    ///     .binding("service", "api-gateway")
    ///     .build()?;
    /// logger.info("ready");
    /// # Ok(())
    /// # })
    /// # }
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Shared context of this logger tree
    pub fn context(&self) -> &TreeContext {
        &self.context
    }

    /// Plugin kernel of this logger tree
    pub fn kernel(&self) -> &PluginKernel {
        &self.kernel
    }

    /// Transport registry of this logger tree
    pub fn transports(&self) -> &TransportRegistry {
        &self.transports
    }

    /// Bindings merged into every entry this logger produces
    pub fn bindings(&self) -> &Fields {
        &self.bindings
    }

    pub fn level(&self) -> LogLevel {
        *self.min_level.read()
    }

    /// Change this logger's minimum level. Does not affect ancestors or
    /// already-created children.
    pub fn set_level(&self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    pub fn is_level_enabled(&self, level: LogLevel) -> bool {
        level >= *self.min_level.read()
    }

    /// Run every registered plugin's `on_init`, in registration order.
    /// Fail-fast; treat a failure as a fatal construction error.
    pub async fn init(&self) -> Result<()> {
        self.kernel.init().await
    }

    /// Create a child logger.
    ///
    /// The child shares the context, transport registry, and kernel by
    /// reference, merges the given bindings over this logger's (child keys
    /// win on collision), and snapshots the current minimum level as its
    /// own independent minimum.
    pub fn child(&self, bindings: Fields) -> Logger {
        Logger {
            min_level: RwLock::new(self.level()),
            bindings: bindings.merge_over(&self.bindings),
            context: self.context.clone(),
            transports: Arc::clone(&self.transports),
            kernel: Arc::clone(&self.kernel),
        }
    }

    /// Log a message at the given level.
    ///
    /// Synchronous: returns before any transport I/O completes, and is a
    /// complete no-op when the level is below this logger's minimum.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.log_with_fields(level, message, Fields::new());
    }

    /// Log a message with call-site fields. On key collision the call-site
    /// value wins over any binding.
    pub fn log_with_fields(&self, level: LogLevel, message: impl Into<String>, fields: Fields) {
        if !self.is_level_enabled(level) {
            return;
        }

        let merged = fields.merge_over(&self.bindings);
        let mut entry = LogEntry::new(level, message.into()).with_fields(merged);
        if entry.time.is_none() && self.context.timestamp_enabled() {
            entry.time = Some(Utc::now().timestamp_millis());
        }

        self.transports.dispatch(entry);
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    /// Helper for structured info logging
    pub fn info_with_fields(&self, message: impl Into<String>, fields: Fields) {
        self.log_with_fields(LogLevel::Info, message, fields);
    }

    /// Helper for structured error logging
    pub fn error_with_fields(&self, message: impl Into<String>, fields: Fields) {
        self.log_with_fields(LogLevel::Error, message, fields);
    }

    /// Flush every transport and await completion. Queued writes drain
    /// before the flush resolves, so this is an explicit synchronization
    /// point.
    pub async fn flush(&self) -> Result<()> {
        self.transports.flush().await
    }

    /// Close every transport. Idempotent; a second call is a no-op.
    pub async fn close(&self) -> Result<()> {
        self.transports.close().await
    }

    /// Full teardown: flush transports, destroy plugins in reverse
    /// registration order, then close transports. Continues through
    /// failures and returns the first one encountered.
    pub async fn shutdown(&self) -> Result<()> {
        let flushed = self.transports.flush().await;
        let destroyed = self.kernel.destroy().await;
        let closed = self.transports.close().await;
        flushed.and(destroyed).and(closed)
    }
}

/// Builder for constructing a root logger with a fluent API
///
/// # Example
/// ```no_run
/// use fanlog::prelude::*;
/// use fanlog::transports::ConsoleTransport;
///
/// # fn main() -> fanlog::core::Result<()> {
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # rt.block_on(async {
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .timestamp(true)
///     .transport(ConsoleTransport::new())
///     .build()?;
/// # Ok(())
/// # })
/// # }
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    execution_context: ExecutionContext,
    timestamp: Option<bool>,
    bindings: Fields,
    transports: Vec<Box<dyn Transport>>,
    plugins: Vec<Arc<dyn Plugin>>,
    error_hook: ErrorHook,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            execution_context: ExecutionContext::default(),
            timestamp: None,
            bindings: Fields::new(),
            transports: Vec::new(),
            plugins: Vec::new(),
            error_hook: stderr_error_hook(),
        }
    }

    /// Set the minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Declare the execution environment. Transports that do not support
    /// it are rejected at build time.
    #[must_use = "builder methods return a new value"]
    pub fn execution_context(mut self, context: ExecutionContext) -> Self {
        self.execution_context = context;
        self
    }

    /// Explicitly enable or disable time stamping.
    ///
    /// An explicit value here always wins over plugin defaults: plugins use
    /// set-if-absent, and this value is written to the context before any
    /// plugin installs.
    #[must_use = "builder methods return a new value"]
    pub fn timestamp(mut self, enabled: bool) -> Self {
        self.timestamp = Some(enabled);
        self
    }

    /// Add a root binding merged into every entry
    #[must_use = "builder methods return a new value"]
    pub fn binding<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<super::fields::FieldValue>,
    {
        self.bindings.add_field(key, value);
        self
    }

    /// Set all root bindings at once
    #[must_use = "builder methods return a new value"]
    pub fn bindings(mut self, bindings: Fields) -> Self {
        self.bindings = bindings;
        self
    }

    /// Add a transport
    #[must_use = "builder methods return a new value"]
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transports.push(Box::new(transport));
        self
    }

    /// Register a plugin. Install hooks run during `build`, in the order
    /// the plugins were added.
    #[must_use = "builder methods return a new value"]
    pub fn plugin<P: Plugin + 'static>(mut self, plugin: P) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Replace the side channel for transport failures
    #[must_use = "builder methods return a new value"]
    pub fn error_hook(mut self, hook: ErrorHook) -> Self {
        self.error_hook = hook;
        self
    }

    /// Build the root logger.
    ///
    /// Must run inside a tokio runtime; transport workers are spawned here.
    /// Fails loudly on configuration errors only (duplicate names,
    /// unsupported transports).
    pub fn build(self) -> Result<Logger> {
        let context = TreeContext::new();
        if let Some(enabled) = self.timestamp {
            context.set_timestamp(enabled);
        }

        let kernel = Arc::new(PluginKernel::new(context.clone()));
        for plugin in self.plugins {
            kernel.register(plugin)?;
        }

        let transports = Arc::new(TransportRegistry::new(
            self.execution_context,
            self.error_hook,
        ));
        for transport in self.transports {
            transports.add_transport(transport)?;
        }

        Ok(Logger {
            min_level: RwLock::new(self.min_level),
            bindings: self.bindings,
            context,
            transports,
            kernel,
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
