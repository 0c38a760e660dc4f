//! Crate error taxonomy (see spec §7).

use crate::queue::MAX_CAPACITY;

/// Errors raised by constructors. Runtime operations on an already-built
/// queue, sink, or distributor never fail: downstream I/O errors are routed
/// to the error handler instead (see [`crate::error_handler`]).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid queue capacity {0} (must be in 1..={MAX_CAPACITY})")]
    InvalidCapacity(usize),
}

/// Error raised by a downstream [`crate::Sink`]'s `sink_it`/`flush`/
/// `set_pattern`. Never propagated to a producer: the worker thread and
/// `DistributorSink::sink_it` both catch it and hand it to the configured
/// error handler.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink '{sink}' failed to write: {message}")]
    Write { sink: String, message: String },
    #[error("sink '{sink}' failed to flush: {message}")]
    Flush { sink: String, message: String },
    #[error("sink '{sink}' rejected pattern {pattern:?}: {message}")]
    Pattern {
        sink: String,
        pattern: String,
        message: String,
    },
}
