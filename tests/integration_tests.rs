//! Integration tests for the fan-out logging engine
//!
//! These tests verify:
//! - Level filtering across a logger tree
//! - Binding inheritance and field collision resolution
//! - Plugin lifecycle ordering and set-if-absent enrichment
//! - Transport fan-out, fault isolation, and per-transport ordering
//! - Log injection prevention
//! - Graceful shutdown

use fanlog::prelude::*;
use fanlog::transports::FileTransport;
use fanlog::{info, warn};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    fn name(&self) -> &str {
        "failing"
    }

    async fn write(&mut self, _entry: &LogEntry) -> Result<()> {
        Err(LoggerError::other("simulated failure"))
    }

    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

fn silent_hook() -> ErrorHook {
    Arc::new(|_| {})
}

#[tokio::test]
async fn test_level_filtering_end_to_end() {
    let memory = MemoryTransport::new("memory");
    let entries = memory.entries();

    let logger = Logger::builder()
        .min_level(LogLevel::Warn)
        .transport(memory)
        .build()
        .expect("Failed to build logger");

    logger.trace("Trace message");
    logger.debug("Debug message");
    logger.info("Info message");
    logger.warn("Warn message");
    logger.error("Error message");
    logger.fatal("Fatal message");

    logger.flush().await.expect("Failed to flush");

    let recorded = entries.lock();
    let messages: Vec<&str> = recorded.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["Warn message", "Error message", "Fatal message"]);
}

#[tokio::test]
async fn test_file_transport_end_to_end() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.jsonl");

    let logger = Logger::builder()
        .binding("service", "api")
        .transport(
            FileTransport::new(&log_file)
                .await
                .expect("Failed to create transport"),
        )
        .build()
        .expect("Failed to build logger");

    for i in 0..50 {
        logger.info_with_fields(
            format!("Message {}", i),
            Fields::new().with_field("seq", i),
        );
    }
    logger.flush().await.expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 50, "Should have 50 log entries");

    // Entries arrive in issue order and carry both bindings and fields
    for (i, line) in lines.iter().enumerate() {
        let json: serde_json::Value = serde_json::from_str(line).expect("Invalid JSON");
        assert_eq!(json["message"], format!("Message {}", i));
        assert_eq!(json["seq"], i);
        assert_eq!(json["service"], "api");
        assert_eq!(json["level"], "info");
    }
}

#[tokio::test]
async fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("injection.jsonl");

    let logger = Logger::builder()
        .transport(
            FileTransport::new(&log_file)
                .await
                .expect("Failed to create transport"),
        )
        .build()
        .expect("Failed to build logger");

    let malicious = "User login\n{\"level\":\"error\",\"message\":\"Fake entry\"}";
    logger.info(malicious);
    logger.flush().await.expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1, "Log should be a single line, not multiple");
    assert!(lines[0].contains("\\\\n"), "Newline should be escaped");
}

#[tokio::test]
async fn test_transport_isolation() {
    let a = MemoryTransport::new("a");
    let c = MemoryTransport::new("c");
    let (entries_a, entries_c) = (a.entries(), c.entries());

    let logger = Logger::builder()
        .transport(a)
        .transport(FailingTransport)
        .transport(c)
        .error_hook(silent_hook())
        .build()
        .expect("Failed to build logger");

    // One log call; the caller never observes the broken transport
    logger.info("survives");
    let _ = logger.flush().await;

    assert_eq!(entries_a.lock().len(), 1);
    assert_eq!(entries_c.lock().len(), 1);
}

#[tokio::test]
async fn test_child_tree_inheritance() {
    let memory = MemoryTransport::new("memory");
    let entries = memory.entries();

    let root = Logger::builder()
        .binding("service", "gateway")
        .transport(memory)
        .build()
        .expect("Failed to build logger");

    let request = root.child(Fields::new().with_field("request_id", "abc-123"));
    let handler = request.child(Fields::new().with_field("component", "auth"));

    handler.info("checked credentials");
    root.flush().await.expect("Failed to flush");

    let recorded = entries.lock();
    let entry = &recorded[0];
    assert_eq!(entry.fields.get("service"), Some(&FieldValue::String("gateway".into())));
    assert_eq!(entry.fields.get("request_id"), Some(&FieldValue::String("abc-123".into())));
    assert_eq!(entry.fields.get("component"), Some(&FieldValue::String("auth".into())));
}

#[tokio::test]
async fn test_transport_added_later_reaches_descendants() {
    let root = Logger::builder().build().expect("Failed to build logger");
    let child = root.child(Fields::new());

    // The registry is shared by reference: transports added after the
    // child exists still receive the child's entries
    let memory = MemoryTransport::new("late");
    let entries = memory.entries();
    root.transports()
        .add_transport(Box::new(memory))
        .expect("Failed to add transport");

    child.info("seen by late transport");
    root.flush().await.expect("Failed to flush");

    assert_eq!(entries.lock().len(), 1);
}

#[tokio::test]
async fn test_plugin_lifecycle_through_logger() {
    struct JournalPlugin {
        name: String,
        journal: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Plugin for JournalPlugin {
        fn name(&self) -> &str {
            &self.name
        }

        fn version(&self) -> &str {
            "1.0.0"
        }

        fn install(&self, _kernel: &PluginKernel) {}

        async fn on_init(&self) -> Result<()> {
            self.journal.lock().push(format!("init:{}", self.name));
            Ok(())
        }

        async fn on_destroy(&self) -> Result<()> {
            self.journal.lock().push(format!("destroy:{}", self.name));
            Ok(())
        }
    }

    let journal = Arc::new(Mutex::new(Vec::new()));
    let logger = Logger::builder()
        .plugin(JournalPlugin {
            name: "first".into(),
            journal: Arc::clone(&journal),
        })
        .plugin(JournalPlugin {
            name: "second".into(),
            journal: Arc::clone(&journal),
        })
        .build()
        .expect("Failed to build logger");

    logger.init().await.expect("Failed to init");
    logger.shutdown().await.expect("Failed to shutdown");

    assert_eq!(
        *journal.lock(),
        vec!["init:first", "init:second", "destroy:second", "destroy:first"]
    );
}

#[tokio::test]
async fn test_timestamp_plugin_stamps_entries() {
    let memory = MemoryTransport::new("memory");
    let entries = memory.entries();

    let logger = Logger::builder()
        .plugin(TimestampPlugin::new())
        .transport(memory)
        .build()
        .expect("Failed to build logger");

    let now = chrono::Utc::now().timestamp_millis();
    logger.info("hello");
    logger.flush().await.expect("Failed to flush");

    let recorded = entries.lock();
    assert_eq!(recorded[0].message, "hello");
    assert_eq!(recorded[0].level, LogLevel::Info);
    let time = recorded[0].time.expect("entry should carry a timestamp");
    assert!((time - now).abs() < 5000, "timestamp {} too far from {}", time, now);
}

#[tokio::test]
async fn test_explicit_config_beats_plugin_default() {
    let memory = MemoryTransport::new("memory");
    let entries = memory.entries();

    let logger = Logger::builder()
        .timestamp(false)
        .plugin(TimestampPlugin::new())
        .transport(memory)
        .build()
        .expect("Failed to build logger");

    logger.info("unstamped");
    logger.flush().await.expect("Failed to flush");

    assert_eq!(entries.lock()[0].time, None);
}

#[tokio::test]
async fn test_concurrent_logging_from_tasks() {
    let memory = MemoryTransport::new("memory");
    let entries = memory.entries();

    let logger = Arc::new(
        Logger::builder()
            .transport(memory)
            .build()
            .expect("Failed to build logger"),
    );

    let mut handles = vec![];
    for task_id in 0..5 {
        let logger = Arc::clone(&logger);
        handles.push(tokio::spawn(async move {
            for i in 0..10 {
                logger.info_with_fields(
                    format!("Task {} - Message {}", task_id, i),
                    Fields::new().with_field("task", task_id),
                );
            }
        }));
    }
    for handle in handles {
        handle.await.expect("Task panicked");
    }

    logger.flush().await.expect("Failed to flush");
    assert_eq!(entries.lock().len(), 50, "Should have 50 entries from 5 tasks * 10 messages");
}

#[tokio::test]
async fn test_close_twice_does_not_error() {
    let logger = Logger::builder()
        .transport(MemoryTransport::new("memory"))
        .build()
        .expect("Failed to build logger");

    logger.close().await.expect("First close failed");
    logger.close().await.expect("Second close should be a no-op");
}

#[tokio::test]
async fn test_client_context_rejects_file_transport() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let transport = FileTransport::new(temp_dir.path().join("client.log"))
        .await
        .expect("Failed to create transport");

    let result = Logger::builder()
        .execution_context(ExecutionContext::Client)
        .transport(transport)
        .build();

    assert!(matches!(result, Err(LoggerError::Configuration { .. })));
}

#[tokio::test]
async fn test_macros() {
    let memory = MemoryTransport::new("memory");
    let entries = memory.entries();
    let logger = Logger::builder().transport(memory).build().expect("Failed to build logger");

    info!(logger, "Server listening on port {}", 8080);
    warn!(logger, "Retry {} of {}", 2, 3);

    logger.flush().await.expect("Failed to flush");

    let recorded = entries.lock();
    assert_eq!(recorded[0].message, "Server listening on port 8080");
    assert_eq!(recorded[1].message, "Retry 2 of 3");
}
