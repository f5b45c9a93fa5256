//! Output formatting utilities
//!
//! Status lines go to stdout prefixed with `INFO:`, `WARNING:` or `ERROR:`.
//! The inventory spinner draws on stderr.

mod formatter;
mod progress;
pub mod report;

pub use formatter::Formatter;
pub use progress::ProgressBar;
pub use report::{Level, Line};

/// Output configuration derived from CLI flags
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Disable colored prefixes
    pub no_color: bool,
    /// Disable the inventory spinner
    pub no_progress: bool,
}
