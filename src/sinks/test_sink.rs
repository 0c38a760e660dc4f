//! Capturing sink for this crate's own integration tests and for downstream
//! crates exercising their own sink wiring. Gated behind the `test-util`
//! feature so it never ships in a default build.

use parking_lot::Mutex;

use crate::error::SinkError;
use crate::level::Level;
use crate::message::LogMessage;
use crate::sink::{Formatter, Sink, SinkBase};

/// Records every message it receives, in order, instead of writing anywhere.
pub struct TestSink {
    base: SinkBase,
    received: Mutex<Vec<LogMessage>>,
    flush_count: Mutex<usize>,
}

impl TestSink {
    pub fn new() -> Self {
        TestSink {
            base: SinkBase::default(),
            received: Mutex::new(Vec::new()),
            flush_count: Mutex::new(0),
        }
    }

    pub fn messages(&self) -> Vec<LogMessage> {
        self.received.lock().clone()
    }

    pub fn message_count(&self) -> usize {
        self.received.lock().len()
    }

    pub fn flush_count(&self) -> usize {
        *self.flush_count.lock()
    }
}

impl Default for TestSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for TestSink {
    fn sink_it(&self, msg: &LogMessage) -> Result<(), SinkError> {
        self.received.lock().push(msg.clone());
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        *self.flush_count.lock() += 1;
        Ok(())
    }

    fn set_pattern(&self, _pattern: &str) -> Result<(), SinkError> {
        Ok(())
    }

    fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        self.base.set_formatter(formatter);
    }

    fn set_level(&self, level: Level) {
        self.base.set_level(level);
    }

    fn level(&self) -> Level {
        self.base.level()
    }
}
