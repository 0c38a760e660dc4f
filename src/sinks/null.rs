//! A sink that discards everything. Useful as a default/placeholder child
//! and in benchmarks that want to measure the core without downstream I/O
//! cost (the benchmark harness itself is out of scope here).

use crate::error::SinkError;
use crate::level::Level;
use crate::message::LogMessage;
use crate::sink::{Formatter, Sink, SinkBase};

pub struct NullSink {
    base: SinkBase,
}

impl NullSink {
    pub fn new() -> Self {
        NullSink {
            base: SinkBase::default(),
        }
    }
}

impl Default for NullSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for NullSink {
    fn sink_it(&self, _msg: &LogMessage) -> Result<(), SinkError> {
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
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
