//! In-memory transport
//!
//! Records entries into a shared buffer. Doubles as a client-side storage
//! stand-in and as the canonical sink for tests.

use crate::core::{LogEntry, Result, Transport};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct MemoryTransport {
    name: String,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryTransport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the recorded entries. Keep a clone before handing
    /// the transport to a registry; the registry takes ownership.
    pub fn entries(&self) -> Arc<Mutex<Vec<LogEntry>>> {
        Arc::clone(&self.entries)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, entry: &LogEntry) -> Result<()> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
