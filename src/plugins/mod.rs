//! Plugin implementations

pub mod timestamp;

pub use timestamp::TimestampPlugin;

// Re-export the trait for convenience
pub use crate::core::Plugin;
