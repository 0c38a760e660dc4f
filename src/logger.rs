//! Named, leveled entry point that producers call into (spec §4, ambient).
//!
//! Not one of the six core components named in the system overview, but the
//! thing a caller actually holds: a name, a per-logger level threshold, and
//! a sink to forward accepted records to. Usually that sink is an
//! [`crate::AsyncSink`], but nothing here assumes that — any `Sink` works,
//! which is what lets tests wire a `Logger` straight to a synchronous
//! `DistributorSinkLocal` without spinning up a worker thread.

use std::sync::Arc;

use crate::env_filter::EnvFilter;
use crate::level::{AtomicLevel, Level};
use crate::message::{LogMessage, SourceLocation};
use crate::sink::Sink;

/// A named logger with its own level threshold, forwarding accepted records
/// to a single sink (commonly a fan-out [`crate::DistributorSink`] or an
/// [`crate::AsyncSink`]).
pub struct Logger {
    name: Arc<str>,
    level: AtomicLevel,
    sink: Arc<dyn Sink>,
}

impl Logger {
    /// Builds a logger whose initial level comes from `KATA_LOG` (see
    /// [`crate::env_filter`]), the way the source picks up `SPDLOG_LEVEL` at
    /// construction time. Use [`Logger::with_level`] to bypass the
    /// environment and set an explicit threshold instead.
    pub fn new(name: impl Into<Arc<str>>, sink: Arc<dyn Sink>) -> Self {
        let name = name.into();
        let level = EnvFilter::from_env().level_for(&name);
        Logger {
            name,
            level: AtomicLevel::new(level),
            sink,
        }
    }

    pub fn with_level(name: impl Into<Arc<str>>, sink: Arc<dyn Sink>, level: Level) -> Self {
        Logger {
            name: name.into(),
            level: AtomicLevel::new(level),
            sink,
        }
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level.load()
    }

    pub fn set_level(&self, level: Level) {
        self.level.store(level);
    }

    /// `true` if a record at `level` would be accepted, without paying for
    /// building the payload. Callers (and the logging macros) should check
    /// this before formatting arguments.
    pub fn should_log(&self, level: Level) -> bool {
        level >= self.level.load() && level != Level::Off
    }

    /// Formats and forwards a record if `level` clears this logger's
    /// threshold; a silent no-op otherwise. Sink failures are never
    /// returned to the caller (see [`crate::error_handler`]).
    pub fn log(&self, level: Level, source_location: Option<SourceLocation>, payload: Vec<u8>) {
        if !self.should_log(level) {
            return;
        }
        let msg = LogMessage::new(level, self.name.clone(), source_location, payload);
        let _ = self.sink.sink_it(&msg);
    }

    pub fn flush(&self) {
        let _ = self.sink.flush();
    }

    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }
}
