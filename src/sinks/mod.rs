//! Concrete `Sink` implementations shipped alongside the async core.
//!
//! The core (`BoundedQueue`, `DistributorSink`, `AsyncSink`, `Context`)
//! treats `Sink` as opaque; real downstream sinks — files, rotating files,
//! syslog — are explicitly out of scope. What's here is the minimum needed
//! to exercise and demonstrate the core end to end: a sink to nowhere, a
//! color console sink, and (behind `test-util`) a capturing sink for
//! integration tests.

mod console;
mod null;

pub use console::ColorConsoleSink;
pub use null::NullSink;

#[cfg(feature = "test-util")]
mod test_sink;
#[cfg(feature = "test-util")]
pub use test_sink::TestSink;
