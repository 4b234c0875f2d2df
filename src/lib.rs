//! # Fanlog
//!
//! A structured fan-out logging engine with leveled loggers, a plugin
//! lifecycle kernel, and fault-isolated asynchronous transports.
//!
//! ## Features
//!
//! - **Non-blocking**: `log()` never suspends and never observes transport I/O
//! - **Fault isolated**: a broken transport or plugin never disables the rest
//! - **Ordered**: per-transport write order always matches call order
//! - **Composable**: logger trees with inherited bindings and one shared context

pub mod core;
pub mod macros;
pub mod plugins;
pub mod transports;

pub mod prelude {
    pub use crate::core::{
        ErrorHook, ExecutionContext, FieldValue, Fields, LogEntry, LogLevel, Logger,
        LoggerBuilder, LoggerError, Plugin, PluginKernel, Result, Transport, TransportRegistry,
        TreeContext,
    };
    pub use crate::plugins::TimestampPlugin;
    pub use crate::transports::MemoryTransport;
}

pub use crate::core::{
    stderr_error_hook, ErrorHook, ExecutionContext, FieldValue, Fields, LogEntry, LogLevel,
    Logger, LoggerBuilder, LoggerError, Plugin, PluginKernel, Result, Transport,
    TransportRegistry, TreeContext, TIMESTAMP_KEY,
};
pub use crate::plugins::TimestampPlugin;
#[cfg(feature = "console")]
pub use crate::transports::ConsoleTransport;
#[cfg(feature = "file")]
pub use crate::transports::FileTransport;
pub use crate::transports::MemoryTransport;
