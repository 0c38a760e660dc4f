//! A bounded, async logging core: a fixed-capacity MPMC queue, a fan-out
//! distributor sink, and a worker-thread-backed `AsyncSink` built on top of
//! both.
//!
//! ```
//! use std::sync::Arc;
//! use async_log_core::{AsyncSink, Level, LogMessage, Sink};
//! use async_log_core::sinks::ColorConsoleSink;
//!
//! let sink = AsyncSink::new();
//! sink.add_sink(Arc::new(ColorConsoleSink::new()));
//! sink.sink_it(&LogMessage::new(Level::Info, Arc::from("demo"), None, b"hello".to_vec())).unwrap();
//! ```
//!
//! A process-wide [`Context`] holds a swappable default logger so callers
//! that don't want to thread an `Arc<Logger>` everywhere can reach for the
//! [`info!`]/[`warn!`]/[`error!`] macros instead.

#![warn(missing_docs)]

pub mod api;
pub mod context;
pub mod distributor;
pub mod env_filter;
pub mod error;
pub mod error_handler;
pub mod level;
pub mod logger;
pub mod message;
pub mod queue;
pub mod sink;
pub mod sinks;

mod async_sink;

pub use api::{default_logger, flush, set_default_logger, shutdown};
pub use async_sink::{AsyncSink, AsyncSinkBuilder, OverflowPolicy, StartStopCallback};
pub use context::Context;
pub use distributor::{ChildLock, DistributorSink, DistributorSinkLocal, NullLock, RealLock};
pub use env_filter::EnvFilter;
pub use error::{Error, SinkError};
pub use error_handler::{default_error_handler, ErrorHandler};
pub use level::{AtomicLevel, Level};
pub use logger::Logger;
pub use message::{AsyncLogMessage, LogMessage, SourceLocation};
pub use queue::{BoundedQueue, TryEnqueueResult, MAX_CAPACITY};
pub use sink::{Formatter, PlainFormatter, Sink, SinkBase};
