//! The `Sink` capability consumed by the async core (spec §6).

use crate::error::SinkError;
use crate::level::{AtomicLevel, Level};
use crate::message::LogMessage;

/// A formatter turns a [`LogMessage`] into bytes. Each [`Sink`] owns its own
/// formatter instance; `DistributorSink::set_formatter` calls a factory once
/// per child so no formatter is shared across sinks (spec §4.B).
pub trait Formatter: Send + Sync {
    fn format(&self, msg: &LogMessage, out: &mut Vec<u8>);
}

/// Default formatter: `[level] logger_name: payload\n`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn format(&self, msg: &LogMessage, out: &mut Vec<u8>) {
        out.extend_from_slice(b"[");
        out.extend_from_slice(msg.level.as_str().as_bytes());
        out.extend_from_slice(b"] ");
        out.extend_from_slice(msg.logger_name.as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(&msg.payload);
        out.extend_from_slice(b"\n");
    }
}

/// Terminal writer of formatted log records.
///
/// Implementations are treated as opaque by the async core: only this
/// interface is relied upon. Concrete sinks (file, rotating file, console)
/// are out of scope for the core; this crate ships only the minimal ones
/// needed to exercise it (see [`crate::sinks`]).
pub trait Sink: Send + Sync {
    /// Writes one message. Implementations that fail should return
    /// `Err(SinkError::Write { .. })`; the caller (worker thread or
    /// `DistributorSink`) never propagates it, only routes it to the error
    /// handler.
    fn sink_it(&self, msg: &LogMessage) -> Result<(), SinkError>;

    /// Flushes any buffered output.
    fn flush(&self) -> Result<(), SinkError>;

    /// Reconfigures the sink's pattern string. Sinks that don't support
    /// pattern strings may no-op.
    fn set_pattern(&self, pattern: &str) -> Result<(), SinkError>;

    /// Installs a new formatter instance for this sink.
    fn set_formatter(&self, formatter: Box<dyn Formatter>);

    fn set_level(&self, level: Level);

    fn level(&self) -> Level;
}

/// Base fields most concrete `Sink`s share: a level threshold and a
/// formatter. Embed this and delegate the trait's level/formatter methods
/// to it, the way the pack's sink implementations do.
pub struct SinkBase {
    level: AtomicLevel,
    formatter: parking_lot::Mutex<Box<dyn Formatter>>,
}

impl SinkBase {
    pub fn new(level: Level) -> Self {
        SinkBase {
            level: AtomicLevel::new(level),
            formatter: parking_lot::Mutex::new(Box::new(PlainFormatter)),
        }
    }

    pub fn level(&self) -> Level {
        self.level.load()
    }

    pub fn set_level(&self, level: Level) {
        self.level.store(level);
    }

    pub fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        *self.formatter.lock() = formatter;
    }

    pub fn format(&self, msg: &LogMessage, out: &mut Vec<u8>) {
        self.formatter.lock().format(msg, out);
    }
}

impl Default for SinkBase {
    fn default() -> Self {
        SinkBase::new(Level::Trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn plain_formatter_includes_fields() {
        let msg = LogMessage::new(Level::Info, Arc::from("svc"), None, b"hi".to_vec());
        let mut out = Vec::new();
        PlainFormatter.format(&msg, &mut out);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "[info] svc: hi\n");
    }

    #[test]
    fn sink_base_level_round_trips() {
        let base = SinkBase::new(Level::Warn);
        assert_eq!(base.level(), Level::Warn);
        base.set_level(Level::Critical);
        assert_eq!(base.level(), Level::Critical);
    }
}
