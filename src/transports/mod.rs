//! Transport implementations

#[cfg(feature = "console")]
pub mod console;
#[cfg(feature = "file")]
pub mod file;
pub mod memory;

#[cfg(feature = "console")]
pub use console::ConsoleTransport;
#[cfg(feature = "file")]
pub use file::FileTransport;
pub use memory::MemoryTransport;

// Re-export the trait for convenience
pub use crate::core::Transport;
