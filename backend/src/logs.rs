//! Run progress logging.
//!
//! Every entry is printed to stdout and fanned out on a broadcast channel.
//! [`capture`] subscribes for the length of a call and hands the entries
//! back, which is how `bankmark run --json-log` keeps a copy of the run log.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Entries kept for a slow subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn prefix(self) -> &'static str {
        match self {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️  WARNING:",
            LogLevel::Error => "   ❌",
        }
    }
}

/// One line of run progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth (table-level steps are indented under the run)
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>, indent: u8) -> Self {
        Self {
            level,
            message: message.into(),
            indent,
        }
    }

    /// The entry as printed on stdout.
    pub fn render(&self) -> String {
        format!(
            "{}{} {}",
            "   ".repeat(self.indent as usize),
            self.level.prefix(),
            self.message
        )
    }
}

static RUN_LOG: Lazy<RunLog> = Lazy::new(|| RunLog::new(CHANNEL_CAPACITY));

struct RunLog {
    sender: broadcast::Sender<LogEntry>,
}

impl RunLog {
    fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    fn emit(&self, entry: LogEntry) {
        println!("{}", entry.render());
        // No subscribers is fine
        let _ = self.sender.send(entry);
    }

    fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

pub fn log_info(msg: impl Into<String>) {
    RUN_LOG.emit(LogEntry::new(LogLevel::Info, msg, 0));
}

pub fn log_success(msg: impl Into<String>) {
    RUN_LOG.emit(LogEntry::new(LogLevel::Success, msg, 0));
}

pub fn log_warning(msg: impl Into<String>) {
    RUN_LOG.emit(LogEntry::new(LogLevel::Warning, msg, 0));
}

pub fn log_error(msg: impl Into<String>) {
    RUN_LOG.emit(LogEntry::new(LogLevel::Error, msg, 0));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    RUN_LOG.emit(LogEntry::new(LogLevel::Info, msg, indent));
}

pub fn log_success_indent(msg: impl Into<String>, indent: u8) {
    RUN_LOG.emit(LogEntry::new(LogLevel::Success, msg, indent));
}

pub fn log_warning_indent(msg: impl Into<String>, indent: u8) {
    RUN_LOG.emit(LogEntry::new(LogLevel::Warning, msg, indent));
}

/// Run `f` and return its result with every entry logged meanwhile.
///
/// Entries logged by other threads during the call are included too. Past
/// the channel capacity the oldest entries are dropped.
pub fn capture<T>(f: impl FnOnce() -> T) -> (T, Vec<LogEntry>) {
    let mut receiver = RUN_LOG.subscribe();
    let result = f();
    (result, drain(&mut receiver))
}

fn drain(receiver: &mut broadcast::Receiver<LogEntry>) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(entry) => entries.push(entry),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    entries
}
