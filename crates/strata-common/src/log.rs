// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Logging infrastructure for Qbitel Strata
//!
//! A lightweight, `no_std` logging layer. Components log through the
//! [`LogSink`] trait; boards may forward to a UART, tests use the circular
//! [`LogBuffer`], and [`NullLog`] discards everything.
//!
//! # Security
//!
//! - The hardware secret, CDIs and private keys must NEVER be logged
//! - Only lengths, states and error codes are safe to format

use core::fmt::{self, Write};
use heapless::String;

use crate::constants::{LOG_BUFFER_SIZE, MAX_LOG_MESSAGE_LEN};

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    /// Errors that abort the current build
    Error = 0,
    /// Degraded operation, e.g. the fail-open fallback
    Warn = 1,
    /// Informational messages
    Info = 2,
    /// Debug messages (development only)
    Debug = 3,
    /// Trace messages (very verbose, development only)
    Trace = 4,
}

impl LogLevel {
    /// Get the log level name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    /// Get a short prefix for the log level
    #[must_use]
    pub const fn prefix(&self) -> char {
        match self {
            Self::Error => 'E',
            Self::Warn => 'W',
            Self::Info => 'I',
            Self::Debug => 'D',
            Self::Trace => 'T',
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for log records
pub trait LogSink {
    /// Record a formatted message
    fn log(&mut self, level: LogLevel, module: &'static str, args: fmt::Arguments<'_>);
}

impl<S: LogSink + ?Sized> LogSink for &mut S {
    fn log(&mut self, level: LogLevel, module: &'static str, args: fmt::Arguments<'_>) {
        (**self).log(level, module, args);
    }
}

/// Sink that discards every record
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl LogSink for NullLog {
    fn log(&mut self, _level: LogLevel, _module: &'static str, _args: fmt::Arguments<'_>) {}
}

/// Log entry structure
#[derive(Clone)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Sequence number since the buffer was created
    pub seq: u32,
    /// Module/component name
    pub module: &'static str,
    /// Log message (truncated to capacity)
    pub message: String<MAX_LOG_MESSAGE_LEN>,
}

impl fmt::Debug for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:04}] {} [{}] {}",
            self.seq,
            self.level.prefix(),
            self.module,
            self.message
        )
    }
}

/// Circular log buffer
pub struct LogBuffer {
    entries: [Option<LogEntry>; LOG_BUFFER_SIZE],
    write_index: usize,
    count: usize,
    seq: u32,
    min_level: LogLevel,
}

impl LogBuffer {
    /// Create a new empty log buffer
    #[must_use]
    pub const fn new() -> Self {
        const NONE: Option<LogEntry> = None;
        Self {
            entries: [NONE; LOG_BUFFER_SIZE],
            write_index: 0,
            count: 0,
            seq: 0,
            min_level: LogLevel::Info,
        }
    }

    /// Set the minimum log level
    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Check if a log level should be recorded
    #[must_use]
    pub const fn should_log(&self, level: LogLevel) -> bool {
        (level as u8) <= (self.min_level as u8)
    }

    /// Get the number of entries
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Check if buffer is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            *entry = None;
        }
        self.write_index = 0;
        self.count = 0;
    }

    /// Iterate over entries (oldest first)
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        let start = if self.count < LOG_BUFFER_SIZE {
            0
        } else {
            self.write_index
        };
        (0..self.count).filter_map(move |i| self.entries[(start + i) % LOG_BUFFER_SIZE].as_ref())
    }

    /// Check whether any entry at `level` contains `needle`
    #[must_use]
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.iter()
            .any(|e| e.level == level && e.message.as_str().contains(needle))
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for LogBuffer {
    fn log(&mut self, level: LogLevel, module: &'static str, args: fmt::Arguments<'_>) {
        if !self.should_log(level) {
            return;
        }

        let mut message = String::<MAX_LOG_MESSAGE_LEN>::new();
        // Overlong messages are truncated
        let _ = message.write_fmt(args);

        self.entries[self.write_index] = Some(LogEntry {
            level,
            seq: self.seq,
            module,
            message,
        });
        self.seq = self.seq.wrapping_add(1);
        self.write_index = (self.write_index + 1) % LOG_BUFFER_SIZE;
        if self.count < LOG_BUFFER_SIZE {
            self.count += 1;
        }
    }
}

/// Log an error message
#[macro_export]
macro_rules! log_error {
    ($sink:expr, $module:expr, $($arg:tt)*) => {{
        use $crate::log::LogSink as _;
        $sink.log($crate::log::LogLevel::Error, $module, format_args!($($arg)*))
    }};
}

/// Log a warning message
#[macro_export]
macro_rules! log_warn {
    ($sink:expr, $module:expr, $($arg:tt)*) => {{
        use $crate::log::LogSink as _;
        $sink.log($crate::log::LogLevel::Warn, $module, format_args!($($arg)*))
    }};
}

/// Log an informational message
#[macro_export]
macro_rules! log_info {
    ($sink:expr, $module:expr, $($arg:tt)*) => {{
        use $crate::log::LogSink as _;
        $sink.log($crate::log::LogLevel::Info, $module, format_args!($($arg)*))
    }};
}

/// Log a debug message
#[macro_export]
macro_rules! log_debug {
    ($sink:expr, $module:expr, $($arg:tt)*) => {{
        use $crate::log::LogSink as _;
        $sink.log($crate::log::LogLevel::Debug, $module, format_args!($($arg)*))
    }};
}

/// Log a trace-level message
#[macro_export]
macro_rules! log_trace {
    ($sink:expr, $module:expr, $($arg:tt)*) => {{
        use $crate::log::LogSink as _;
        $sink.log($crate::log::LogLevel::Trace, $module, format_args!($($arg)*))
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filtering() {
        let mut buf = LogBuffer::new();
        crate::log_debug!(buf, "test", "hidden {}", 1);
        crate::log_warn!(buf, "test", "visible {}", 2);
        assert_eq!(buf.len(), 1);
        assert!(buf.contains(LogLevel::Warn, "visible 2"));
    }

    #[test]
    fn test_wraparound_keeps_newest() {
        let mut buf = LogBuffer::new();
        for i in 0..(LOG_BUFFER_SIZE + 3) {
            crate::log_info!(buf, "test", "entry {}", i);
        }
        assert_eq!(buf.len(), LOG_BUFFER_SIZE);
        let first = buf.iter().next().map(|e| e.seq);
        assert_eq!(first, Some(3));
    }

    #[test]
    fn test_sink_through_reference() {
        let mut buf = LogBuffer::new();
        {
            let sink: &mut dyn LogSink = &mut buf;
            crate::log_error!(sink, "test", "boom");
        }
        assert!(buf.contains(LogLevel::Error, "boom"));
    }
}
