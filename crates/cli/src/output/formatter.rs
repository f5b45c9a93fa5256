//! Formatter for status lines
//!
//! Every user-visible message is one line on stdout with a level prefix.

use console::style;

use super::{Level, Line, OutputConfig};

/// Formatter for CLI output
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    /// Create a new formatter with the given configuration
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Check if colors are enabled
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && console::colors_enabled()
    }

    /// Render a line, coloring the prefix when enabled
    pub fn render(&self, line: &Line) -> String {
        if !self.colors_enabled() {
            return line.to_string();
        }

        let prefix = match line.level {
            Level::Info => style(line.level.prefix()).green(),
            Level::Warning => style(line.level.prefix()).yellow(),
            Level::Error => style(line.level.prefix()).red().bold(),
        };
        format!("{prefix}: {}", line.text)
    }

    /// Print a line to stdout
    pub fn line(&self, line: &Line) {
        println!("{}", self.render(line));
    }

    /// Errors go to stdout too, like every other status line
    pub fn error(&self, message: &str) {
        self.line(&Line::error(message));
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
