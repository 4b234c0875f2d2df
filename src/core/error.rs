//! Error types for the logging engine

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Invalid construction options, unknown level names, duplicate
    /// plugin/transport registrations
    #[error("Invalid configuration for {component}: {message}")]
    Configuration { component: String, message: String },

    /// An `on_init` or `on_destroy` hook failed
    #[error("Plugin '{plugin}' failed during {hook}: {message}")]
    PluginLifecycle {
        plugin: String,
        hook: &'static str,
        message: String,
    },

    /// One or more `on_destroy` hooks failed during kernel teardown.
    /// Collected after every plugin has been given a chance to tear down.
    #[error("Plugin teardown failed: {}", .failures.join("; "))]
    PluginTeardown { failures: Vec<String> },

    /// A transport's write/flush/close failed
    #[error("Transport '{transport}' failed during {operation}: {message}")]
    Transport {
        transport: String,
        operation: &'static str,
        message: String,
    },

    /// Summary of per-transport failures from a flush or close fan-out
    #[error("{operation} failed for {} transport(s): {}", .failures.len(), .failures.join("; "))]
    TransportAggregate {
        operation: &'static str,
        failures: Vec<String>,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Configuration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a plugin lifecycle error for a named hook
    pub fn plugin(plugin: impl Into<String>, hook: &'static str, message: impl Into<String>) -> Self {
        LoggerError::PluginLifecycle {
            plugin: plugin.into(),
            hook,
            message: message.into(),
        }
    }

    /// Create a transport error for a named operation
    pub fn transport(
        transport: impl Into<String>,
        operation: &'static str,
        message: impl Into<String>,
    ) -> Self {
        LoggerError::Transport {
            transport: transport.into(),
            operation,
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
