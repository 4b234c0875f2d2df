//! Transport trait for log output destinations

use super::entry::LogEntry;
use super::error::{LoggerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Execution environment a transport may or may not support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionContext {
    #[default]
    Server,
    Client,
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionContext::Server => write!(f, "server"),
            ExecutionContext::Client => write!(f, "client"),
        }
    }
}

impl FromStr for ExecutionContext {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "server" => Ok(ExecutionContext::Server),
            "client" => Ok(ExecutionContext::Client),
            _ => Err(LoggerError::config(
                "execution_context",
                format!("unknown execution context '{}'", s),
            )),
        }
    }
}

/// Output destination for log entries.
///
/// Each transport is owned exclusively by one dispatch worker, which calls
/// `write` for successive entries strictly in arrival order; implementations
/// never see overlapping calls and need no internal locking.
///
/// # Example
///
/// ```no_run
/// use fanlog::core::{LogEntry, Result, Transport};
/// use async_trait::async_trait;
///
/// struct StdoutTransport;
///
/// #[async_trait]
/// impl Transport for StdoutTransport {
///     fn name(&self) -> &str {
///         "stdout"
///     }
///
///     async fn write(&mut self, entry: &LogEntry) -> Result<()> {
///         println!("{}", entry.to_json()?);
///         Ok(())
///     }
///
///     async fn flush(&mut self) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send {
    /// Unique name within one registry
    fn name(&self) -> &str;

    /// Write one entry to the destination
    async fn write(&mut self, entry: &LogEntry) -> Result<()>;

    /// Flush buffered entries to the destination
    async fn flush(&mut self) -> Result<()>;

    /// Release the destination. Must tolerate being called after the
    /// transport has already closed.
    async fn close(&mut self) -> Result<()> {
        self.flush().await
    }

    /// Whether this transport can operate in the given environment.
    /// Incompatible transports are rejected at registration time instead
    /// of failing on every write.
    fn supports(&self, _context: ExecutionContext) -> bool {
        true
    }
}
