//! The self-contained log record carried across the bounded queue.

use std::fmt;
use std::sync::Arc;
use std::thread::ThreadId;
use std::time::SystemTime;

use crate::level::Level;

/// File/line/function of the call site that produced a [`LogMessage`].
///
/// All three fields travel together: a message either carries a full
/// location or none at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
    pub function: &'static str,
}

/// A fully materialised log record.
///
/// Cheap to move and free of any reference to caller-owned buffers: the
/// `payload` is already-formatted bytes, produced on the caller's thread
/// before the message is handed to a [`crate::Sink`]. This is what lets a
/// `LogMessage` outlive the `log()` call that created it and cross into a
/// worker thread.
#[derive(Debug, Clone)]
pub struct LogMessage {
    pub level: Level,
    pub logger_name: Arc<str>,
    pub source_location: Option<SourceLocation>,
    pub timestamp: SystemTime,
    pub payload: Vec<u8>,
    pub thread_id: ThreadId,
}

impl LogMessage {
    /// Builds a message stamped with the current time and thread, as a
    /// producer thread does at the moment `Logger::log` is called.
    pub fn new(
        level: Level,
        logger_name: Arc<str>,
        source_location: Option<SourceLocation>,
        payload: Vec<u8>,
    ) -> Self {
        LogMessage {
            level,
            logger_name,
            source_location,
            timestamp: SystemTime::now(),
            payload,
            thread_id: std::thread::current().id(),
        }
    }

    /// The payload interpreted as UTF-8, replacing invalid sequences.
    ///
    /// Sinks are free to deal with raw bytes directly; this is a convenience
    /// for the common case of text formatters.
    pub fn payload_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.level,
            self.logger_name,
            self.payload_str()
        )
    }
}

/// Tagged carrier travelling across the [`crate::BoundedQueue`].
///
/// `Flush` and `Terminate` are control messages that ride the same FIFO as
/// user records so they stay totally ordered with respect to the logs a
/// producer enqueued before them.
pub enum AsyncLogMessage {
    Log(LogMessage),
    Flush,
    /// Sentinel enqueued exactly once, by the owning `AsyncSink`'s
    /// destructor, to stop the worker thread.
    Terminate,
}

impl fmt::Debug for AsyncLogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsyncLogMessage::Log(msg) => f.debug_tuple("Log").field(msg).finish(),
            AsyncLogMessage::Flush => f.write_str("Flush"),
            AsyncLogMessage::Terminate => f.write_str("Terminate"),
        }
    }
}
