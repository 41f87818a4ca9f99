//! End-of-run report.
//!
//! Recoverable problems never abort a run. They are collected here, one log
//! per kind, and announced together once every phase has finished.

use std::path::{Path, PathBuf};

use colored::Colorize;

/// How a log is announced on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Highlight,
    Success,
    Warning,
    Error,
}

impl Style {
    /// Colours `text` for the console.
    pub fn paint(self, text: &str) -> colored::ColoredString {
        match self {
            Style::Highlight => text.bold(),
            Style::Success => text.green(),
            Style::Warning => text.yellow(),
            Style::Error => text.red().bold(),
        }
    }
}

/// The kinds of entries a run can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// Malformed override records, missing sidecar files and similar.
    Warning,
    /// Generated topics that still contain placeholder text.
    Placeholder,
    /// Legacy files deleted during commit.
    Deleted,
    /// Legacy files that could not be deleted.
    DeleteFailed,
    /// Legacy files left behind that an operator should remove by hand.
    ManualDeletion,
}

impl LogKind {
    const ALL: [LogKind; 5] = [
        LogKind::Warning,
        LogKind::Placeholder,
        LogKind::Deleted,
        LogKind::DeleteFailed,
        LogKind::ManualDeletion,
    ];

    fn label(self) -> &'static str {
        match self {
            LogKind::Warning => "Warnings.",
            LogKind::Placeholder => "Topics containing TBD placeholders.",
            LogKind::Deleted => "Deleted legacy topics.",
            LogKind::DeleteFailed => "Legacy topics that could not be deleted.",
            LogKind::ManualDeletion => "Legacy topics to delete manually.",
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            LogKind::Warning => "Warnings_Log.txt",
            LogKind::Placeholder => "Placeholders_Log.txt",
            LogKind::Deleted => "Deleted_Log.txt",
            LogKind::DeleteFailed => "DeleteFailed_Log.txt",
            LogKind::ManualDeletion => "ManualDeletion_Log.txt",
        }
    }

    fn style(self) -> Style {
        match self {
            LogKind::Warning => Style::Warning,
            LogKind::Placeholder => Style::Highlight,
            LogKind::Deleted => Style::Success,
            LogKind::DeleteFailed | LogKind::ManualDeletion => Style::Error,
        }
    }
}

#[derive(Debug, Clone)]
struct Log {
    kind: LogKind,
    entries: Vec<String>,
}

/// Accumulated logs of one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    logs: Vec<Log>,
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            logs: LogKind::ALL
                .into_iter()
                .map(|kind| Log {
                    kind,
                    entries: Vec::new(),
                })
                .collect(),
        }
    }

    fn log_mut(&mut self, kind: LogKind) -> &mut Log {
        let ix = LogKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        &mut self.logs[ix]
    }

    /// Adds an entry to the `kind` log.
    pub fn add(&mut self, kind: LogKind, entry: impl Into<String>) {
        let entry = entry.into();
        if kind == LogKind::Warning {
            warn!("{entry}");
        }
        self.log_mut(kind).entries.push(entry);
    }

    /// Adds a warning.
    pub fn warn(&mut self, entry: impl Into<String>) {
        self.add(LogKind::Warning, entry);
    }

    pub fn entries(&self, kind: LogKind) -> &[String] {
        self.logs
            .iter()
            .find(|log| log.kind == kind)
            .map(|log| log.entries.as_slice())
            .unwrap_or_default()
    }

    /// Whether nothing needs an operator's attention.
    pub fn is_clean(&self) -> bool {
        [
            LogKind::Warning,
            LogKind::DeleteFailed,
            LogKind::ManualDeletion,
        ]
        .into_iter()
        .all(|kind| self.entries(kind).is_empty())
    }

    /// Prints every non-empty log.
    pub fn print(&self) {
        for log in self.logs.iter().filter(|log| !log.entries.is_empty()) {
            println!();
            println!(
                "{}",
                log.kind
                    .style()
                    .paint(&format!("{} ({})", log.kind.label(), log.entries.len()))
            );
            for entry in &log.entries {
                println!("  {entry}");
            }
        }
    }

    /// Writes every non-empty log to its own file in `dir`.
    pub fn write_logs(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        for log in self.logs.iter().filter(|log| !log.entries.is_empty()) {
            let path = dir.join(log.kind.file_name());
            let mut content = format!("{}\n", log.kind.label());
            for entry in &log.entries {
                content.push_str(entry);
                content.push('\n');
            }
            std::fs::write(&path, content)?;
            written.push(path);
        }
        Ok(written)
    }
}
