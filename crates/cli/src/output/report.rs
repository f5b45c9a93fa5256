//! Status line rendering
//!
//! Turns sync events and the final outcome into the line-oriented report
//! printed by the deploy command.

use std::fmt;

use s3deploy_core::{RunConfig, SyncEvent, SyncOutcome};

/// Severity prefix of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl Level {
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// One status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub level: Level,
    pub text: String,
}

impl Line {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level.prefix(), self.text)
    }
}

/// Lines printed before any work starts
pub fn start_lines(config: &RunConfig) -> Vec<Line> {
    let mut lines = vec![Line::info(format!(
        "copying from '{}' to '{}' on '{}'",
        config.source(),
        config.destination(),
        config.bucket()
    ))];
    if !config.apply_changes() {
        lines.push(Line::info("dry-run!  no files will be copied"));
    }
    lines
}

/// Line for a single sync event
pub fn event_line(event: &SyncEvent<'_>) -> Line {
    match *event {
        SyncEvent::InventoryLoading { .. } => Line::info("loading existing file info"),
        SyncEvent::InventoryLoaded { count } => Line::info(format!("{count} existing files")),
        SyncEvent::Processing { path, key } => {
            Line::info(format!("processing {} {key}", path.display()))
        }
        SyncEvent::Fingerprinted { fingerprint, .. } => Line::info(format!(
            "md5sum is {} ({})",
            fingerprint.hex(),
            fingerprint.base64()
        )),
        SyncEvent::Skipped {
            key,
            fingerprint,
            remote_etag,
        } => Line::info(format!(
            "skipping {key}: md5sum unchanged ({} vs {remote_etag})",
            fingerprint.hex()
        )),
        SyncEvent::Uploading {
            key,
            size_bytes,
            reason,
        } => Line::info(format!(
            "uploading {key} ({}, {})",
            humansize::format_size(size_bytes, humansize::BINARY),
            reason.as_str()
        )),
        SyncEvent::MissingMetadata { extension, .. } => {
            Line::warning(format!("no metadata for '{extension}'"))
        }
    }
}

/// Orphan warnings, dry-run notice and the final counters
pub fn summary_lines(outcome: &SyncOutcome, config: &RunConfig) -> Vec<Line> {
    let mut lines = Vec::new();

    if config.check_existing() && !outcome.orphans.is_empty() {
        lines.push(Line::warning(format!(
            "{} files deployed but not present locally:",
            outcome.orphans.len()
        )));
        for orphan in &outcome.orphans {
            let text = match orphan.last_modified {
                Some(modified) if config.verbose() => {
                    format!("file {} not found locally (last modified {modified})", orphan.key)
                }
                _ => format!("file {} not found locally", orphan.key),
            };
            lines.push(Line::warning(text));
        }
    }

    if !config.apply_changes() {
        lines.push(Line::info("dry-run!  no files copied"));
    }

    lines.push(Line::info(format!(
        "complete ({} uploads, {} existing)",
        outcome.stats.uploaded, outcome.stats.skipped
    )));
    lines
}
