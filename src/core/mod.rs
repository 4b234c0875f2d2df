//! Core engine types and traits

pub mod context;
pub mod dispatch;
pub mod entry;
pub mod error;
pub mod fields;
pub mod level;
pub mod logger;
pub mod plugin;
pub mod transport;

pub use context::{TreeContext, TIMESTAMP_KEY};
pub use dispatch::{stderr_error_hook, ErrorHook, TransportRegistry};
pub use entry::LogEntry;
pub use error::{LoggerError, Result};
pub use fields::{FieldValue, Fields};
pub use level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use plugin::{Plugin, PluginKernel};
pub use transport::{ExecutionContext, Transport};
