//! Console transport

use crate::core::{LogEntry, LogLevel, Result, Transport};
use async_trait::async_trait;
use colored::Colorize;

/// Writes colored text lines to the terminal, routing `Error` and `Fatal`
/// entries to stderr and everything else to stdout.
pub struct ConsoleTransport {
    use_colors: bool,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn format_text(&self, entry: &LogEntry) -> String {
        let level_str = if self.use_colors {
            format!("{:5}", entry.level.as_str())
                .color(entry.level.color_code())
                .to_string()
        } else {
            format!("{:5}", entry.level.as_str())
        };

        let mut line = match entry.time {
            Some(ms) => format!("[{}] [{}] {}", ms, level_str, entry.message),
            None => format!("[{}] {}", level_str, entry.message),
        };

        if !entry.fields.is_empty() {
            line.push(' ');
            line.push_str(&entry.fields.format_pairs());
        }

        line
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    fn name(&self) -> &str {
        "console"
    }

    async fn write(&mut self, entry: &LogEntry) -> Result<()> {
        let output = self.format_text(entry);
        match entry.level {
            LogLevel::Error | LogLevel::Fatal => eprintln!("{}", output),
            _ => println!("{}", output),
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        // Flush both streams since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }
}
