//! Transport registry and fan-out dispatcher
//!
//! Every registered transport gets a dedicated worker task that owns the
//! transport exclusively and drains a per-transport command queue. Fan-out
//! therefore never serializes transports against each other, while each
//! transport's own writes happen strictly in arrival order. A failing
//! transport is reported through the error hook side channel and never
//! reaches the `log()` caller.

use super::entry::LogEntry;
use super::error::{LoggerError, Result};
use super::transport::{ExecutionContext, Transport};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Side channel for transport failures.
///
/// The hook must not log through the registry's own transport set, or a
/// broken transport turns into an unbounded failure loop.
pub type ErrorHook = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// Default side channel: report to stderr
pub fn stderr_error_hook() -> ErrorHook {
    Arc::new(|err| eprintln!("[fanlog] {}", err))
}

enum Command {
    Write(Arc<LogEntry>),
    Flush(oneshot::Sender<Result<()>>),
    Close(oneshot::Sender<Result<()>>),
}

struct TransportHandle {
    name: String,
    sender: mpsc::UnboundedSender<Command>,
}

/// Ordered, name-keyed set of transports with per-transport failure
/// isolation.
///
/// Must be created inside a tokio runtime; worker tasks are spawned as
/// transports are added.
pub struct TransportRegistry {
    handles: RwLock<Vec<TransportHandle>>,
    environment: ExecutionContext,
    error_hook: ErrorHook,
    closed: AtomicBool,
}

impl TransportRegistry {
    pub fn new(environment: ExecutionContext, error_hook: ErrorHook) -> Self {
        Self {
            handles: RwLock::new(Vec::new()),
            environment,
            error_hook,
            closed: AtomicBool::new(false),
        }
    }

    pub fn environment(&self) -> ExecutionContext {
        self.environment
    }

    pub fn len(&self) -> usize {
        self.handles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.read().is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handles.read().iter().any(|h| h.name == name)
    }

    /// Add a transport and spawn its worker.
    ///
    /// Rejects duplicate names and transports that do not support the
    /// registry's execution context.
    pub fn add_transport(&self, transport: Box<dyn Transport>) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(LoggerError::config(
                "transport",
                "registry is closed".to_string(),
            ));
        }
        if !transport.supports(self.environment) {
            return Err(LoggerError::config(
                "transport",
                format!(
                    "transport '{}' does not support the {} execution context",
                    transport.name(),
                    self.environment
                ),
            ));
        }

        let name = transport.name().to_string();
        let mut handles = self.handles.write();
        if handles.iter().any(|h| h.name == name) {
            return Err(LoggerError::config(
                "transport",
                format!("duplicate transport name '{}'", name),
            ));
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(transport, receiver, Arc::clone(&self.error_hook)));
        handles.push(TransportHandle { name, sender });
        Ok(())
    }

    /// Detach and close a transport by name.
    ///
    /// Safe concurrent with in-flight dispatches: those iterate a snapshot
    /// taken at dispatch start. Close failures go to the error hook.
    pub async fn remove_transport(&self, name: &str) -> bool {
        let handle = {
            let mut handles = self.handles.write();
            match handles.iter().position(|h| h.name == name) {
                Some(index) => handles.remove(index),
                None => return false,
            }
        };

        if let Err(err) = close_handle(&handle).await {
            (self.error_hook)(&err);
        }
        true
    }

    /// Fan one entry out to every transport in registration order.
    ///
    /// Synchronous and non-blocking: entries are enqueued to each worker
    /// and this returns before any transport I/O completes. After `close`
    /// this is a silent no-op.
    pub fn dispatch(&self, entry: LogEntry) {
        let senders: Vec<mpsc::UnboundedSender<Command>> = self
            .handles
            .read()
            .iter()
            .map(|h| h.sender.clone())
            .collect();
        if senders.is_empty() {
            return;
        }

        let entry = Arc::new(entry);
        for sender in senders {
            // A send error means the worker already exited; nothing to report
            let _ = sender.send(Command::Write(Arc::clone(&entry)));
        }
    }

    /// Flush every transport and await all of them.
    ///
    /// The flush marker queues behind previously dispatched writes, so this
    /// is an explicit synchronization point. Per-transport failures are
    /// aggregated; a failing transport never stops the others from flushing.
    pub async fn flush(&self) -> Result<()> {
        let targets = self.snapshot();
        let mut pending = Vec::with_capacity(targets.len());
        for (name, sender) in targets {
            let (ack, response) = oneshot::channel();
            if sender.send(Command::Flush(ack)).is_ok() {
                pending.push((name, response));
            }
        }

        self.collect("flush", pending).await
    }

    /// Close every transport and await all of them.
    ///
    /// Idempotent at the registry boundary: workers are taken out of the
    /// registry on the first call and a second call is a no-op.
    pub async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        let taken: Vec<TransportHandle> = {
            let mut handles = self.handles.write();
            handles.drain(..).collect()
        };
        if taken.is_empty() {
            return Ok(());
        }

        let mut pending = Vec::with_capacity(taken.len());
        for handle in taken {
            let (ack, response) = oneshot::channel();
            if handle.sender.send(Command::Close(ack)).is_ok() {
                pending.push((handle.name, response));
            }
        }

        self.collect("close", pending).await
    }

    fn snapshot(&self) -> Vec<(String, mpsc::UnboundedSender<Command>)> {
        self.handles
            .read()
            .iter()
            .map(|h| (h.name.clone(), h.sender.clone()))
            .collect()
    }

    async fn collect(
        &self,
        operation: &'static str,
        pending: Vec<(String, oneshot::Receiver<Result<()>>)>,
    ) -> Result<()> {
        let mut failures = Vec::new();
        for (name, response) in pending {
            match response.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => failures.push(format!("{}: {}", name, err)),
                // Worker dropped the ack; it exited through another path
                Err(_) => {}
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            let err = LoggerError::TransportAggregate {
                operation,
                failures,
            };
            (self.error_hook)(&err);
            Err(err)
        }
    }
}

async fn close_handle(handle: &TransportHandle) -> Result<()> {
    let (ack, response) = oneshot::channel();
    if handle.sender.send(Command::Close(ack)).is_err() {
        return Ok(());
    }
    match response.await {
        Ok(result) => result,
        Err(_) => Ok(()),
    }
}

/// Per-transport worker loop. Owns the transport exclusively, so successive
/// writes can never interleave or reorder.
async fn run_worker(
    mut transport: Box<dyn Transport>,
    mut receiver: mpsc::UnboundedReceiver<Command>,
    error_hook: ErrorHook,
) {
    while let Some(command) = receiver.recv().await {
        match command {
            Command::Write(entry) => {
                if let Err(e) = transport.write(&entry).await {
                    error_hook(&LoggerError::transport(
                        transport.name(),
                        "write",
                        e.to_string(),
                    ));
                }
            }
            Command::Flush(ack) => {
                let result = transport
                    .flush()
                    .await
                    .map_err(|e| LoggerError::transport(transport.name(), "flush", e.to_string()));
                let _ = ack.send(result);
            }
            Command::Close(ack) => {
                let result = transport
                    .close()
                    .await
                    .map_err(|e| LoggerError::transport(transport.name(), "close", e.to_string()));
                let _ = ack.send(result);
                return;
            }
        }
    }

    // All senders dropped without an explicit close; release the
    // destination best-effort.
    if let Err(e) = transport.close().await {
        error_hook(&LoggerError::transport(
            transport.name(),
            "close",
            e.to_string(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::LogLevel;
    use crate::transports::MemoryTransport;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct FailingTransport {
        name: String,
    }

    #[async_trait]
    impl Transport for FailingTransport {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(&mut self, _entry: &LogEntry) -> Result<()> {
            Err(LoggerError::other("simulated write failure"))
        }

        async fn flush(&mut self) -> Result<()> {
            Err(LoggerError::other("simulated flush failure"))
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct ServerOnlyTransport;

    #[async_trait]
    impl Transport for ServerOnlyTransport {
        fn name(&self) -> &str {
            "server-only"
        }

        async fn write(&mut self, _entry: &LogEntry) -> Result<()> {
            Ok(())
        }

        async fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn supports(&self, context: ExecutionContext) -> bool {
            context == ExecutionContext::Server
        }
    }

    fn entry(message: &str) -> LogEntry {
        LogEntry::new(LogLevel::Info, message.to_string())
    }

    fn quiet_hook() -> (ErrorHook, Arc<Mutex<Vec<String>>>) {
        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reported);
        let hook: ErrorHook = Arc::new(move |err| sink.lock().push(err.to_string()));
        (hook, reported)
    }

    #[tokio::test]
    async fn test_fan_out_reaches_all_transports() {
        let (hook, _) = quiet_hook();
        let registry = TransportRegistry::new(ExecutionContext::Server, hook);

        let a = MemoryTransport::new("a");
        let b = MemoryTransport::new("b");
        let (entries_a, entries_b) = (a.entries(), b.entries());
        registry.add_transport(Box::new(a)).unwrap();
        registry.add_transport(Box::new(b)).unwrap();

        registry.dispatch(entry("hello"));
        registry.flush().await.unwrap();

        assert_eq!(entries_a.lock().len(), 1);
        assert_eq!(entries_b.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_transport_is_isolated() {
        let (hook, reported) = quiet_hook();
        let registry = TransportRegistry::new(ExecutionContext::Server, hook);

        let a = MemoryTransport::new("a");
        let c = MemoryTransport::new("c");
        let (entries_a, entries_c) = (a.entries(), c.entries());
        registry.add_transport(Box::new(a)).unwrap();
        registry
            .add_transport(Box::new(FailingTransport { name: "b".into() }))
            .unwrap();
        registry.add_transport(Box::new(c)).unwrap();

        registry.dispatch(entry("one"));
        let _ = registry.flush().await;

        // Exactly one entry at A and C, the failure only reached the hook
        assert_eq!(entries_a.lock().len(), 1);
        assert_eq!(entries_c.lock().len(), 1);
        assert!(reported
            .lock()
            .iter()
            .any(|msg| msg.contains("simulated write failure")));
    }

    #[tokio::test]
    async fn test_per_transport_write_order() {
        let (hook, _) = quiet_hook();
        let registry = TransportRegistry::new(ExecutionContext::Server, hook);

        let memory = MemoryTransport::new("ordered");
        let entries = memory.entries();
        registry.add_transport(Box::new(memory)).unwrap();

        for i in 0..100 {
            registry.dispatch(entry(&format!("message {}", i)));
        }
        registry.flush().await.unwrap();

        let recorded = entries.lock();
        assert_eq!(recorded.len(), 100);
        for (i, recorded_entry) in recorded.iter().enumerate() {
            assert_eq!(recorded_entry.message, format!("message {}", i));
        }
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let (hook, _) = quiet_hook();
        let registry = TransportRegistry::new(ExecutionContext::Server, hook);

        registry
            .add_transport(Box::new(MemoryTransport::new("same")))
            .unwrap();
        let err = registry
            .add_transport(Box::new(MemoryTransport::new("same")))
            .unwrap_err();

        assert!(matches!(err, LoggerError::Configuration { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_transport_rejected() {
        let (hook, _) = quiet_hook();
        let registry = TransportRegistry::new(ExecutionContext::Client, hook);

        let err = registry.add_transport(Box::new(ServerOnlyTransport)).unwrap_err();
        assert!(matches!(err, LoggerError::Configuration { .. }));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_flush_aggregates_failures_without_stopping_short() {
        let (hook, _) = quiet_hook();
        let registry = TransportRegistry::new(ExecutionContext::Server, hook);

        let memory = MemoryTransport::new("healthy");
        let entries = memory.entries();
        registry.add_transport(Box::new(memory)).unwrap();
        registry
            .add_transport(Box::new(FailingTransport { name: "broken".into() }))
            .unwrap();

        registry.dispatch(entry("payload"));
        let err = registry.flush().await.unwrap_err();

        match err {
            LoggerError::TransportAggregate { operation, failures } => {
                assert_eq!(operation, "flush");
                assert_eq!(failures.len(), 1);
                assert!(failures[0].contains("broken"));
            }
            other => panic!("expected aggregate, got {other}"),
        }
        // The healthy transport still flushed its write
        assert_eq!(entries.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (hook, _) = quiet_hook();
        let registry = TransportRegistry::new(ExecutionContext::Server, hook);
        registry
            .add_transport(Box::new(MemoryTransport::new("m")))
            .unwrap();

        registry.close().await.unwrap();
        registry.close().await.unwrap();

        // Adding after close is a configuration error
        let err = registry
            .add_transport(Box::new(MemoryTransport::new("late")))
            .unwrap_err();
        assert!(matches!(err, LoggerError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_dispatch_after_close_is_noop() {
        let (hook, reported) = quiet_hook();
        let registry = TransportRegistry::new(ExecutionContext::Server, hook);

        let memory = MemoryTransport::new("m");
        let entries = memory.entries();
        registry.add_transport(Box::new(memory)).unwrap();

        registry.close().await.unwrap();
        registry.dispatch(entry("too late"));
        registry.flush().await.unwrap();

        assert_eq!(entries.lock().len(), 0);
        assert!(reported.lock().is_empty());
    }

    #[tokio::test]
    async fn test_remove_transport() {
        let (hook, _) = quiet_hook();
        let registry = TransportRegistry::new(ExecutionContext::Server, hook);

        let memory = MemoryTransport::new("m");
        let entries = memory.entries();
        registry.add_transport(Box::new(memory)).unwrap();

        registry.dispatch(entry("before removal"));
        assert!(registry.remove_transport("m").await);
        assert!(!registry.remove_transport("m").await);

        registry.dispatch(entry("after removal"));
        registry.flush().await.unwrap();

        // The queued write drained before close; the later one never arrived
        let recorded = entries.lock();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].message, "before removal");
    }
}
