//! A minimal color console sink, grounded on the pack's `multi_logger`-style
//! terminal sinks: level determines color, everything else is delegated to
//! a `Formatter`.

use std::io::{self, Write};

use colored::Colorize;
use parking_lot::Mutex;

use crate::error::SinkError;
use crate::level::Level;
use crate::message::LogMessage;
use crate::sink::{Formatter, Sink, SinkBase};

/// Writes formatted records to stdout, coloring the line by level.
///
/// Pattern strings are not supported (that's the pattern-formatting layer,
/// out of scope for this crate); `set_pattern` always fails with
/// `SinkError::Pattern`.
pub struct ColorConsoleSink {
    base: SinkBase,
    stdout: Mutex<io::Stdout>,
}

impl ColorConsoleSink {
    pub fn new() -> Self {
        ColorConsoleSink {
            base: SinkBase::default(),
            stdout: Mutex::new(io::stdout()),
        }
    }

    fn colorize(level: Level, line: &str) -> String {
        match level {
            Level::Trace => line.dimmed().to_string(),
            Level::Debug => line.normal().to_string(),
            Level::Info => line.green().to_string(),
            Level::Warn => line.yellow().to_string(),
            Level::Err => line.red().to_string(),
            Level::Critical => line.red().bold().to_string(),
            Level::Off => line.to_string(),
        }
    }
}

impl Default for ColorConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ColorConsoleSink {
    fn sink_it(&self, msg: &LogMessage) -> Result<(), SinkError> {
        let mut buf = Vec::new();
        self.base.format(msg, &mut buf);
        let line = String::from_utf8_lossy(&buf);
        let colored = Self::colorize(msg.level, line.trim_end_matches('\n'));

        let mut stdout = self.stdout.lock();
        writeln!(stdout, "{colored}").map_err(|e| SinkError::Write {
            sink: "color_console".to_owned(),
            message: e.to_string(),
        })
    }

    fn flush(&self) -> Result<(), SinkError> {
        self.stdout.lock().flush().map_err(|e| SinkError::Flush {
            sink: "color_console".to_owned(),
            message: e.to_string(),
        })
    }

    fn set_pattern(&self, pattern: &str) -> Result<(), SinkError> {
        Err(SinkError::Pattern {
            sink: "color_console".to_owned(),
            pattern: pattern.to_owned(),
            message: "pattern formatting is not implemented by this sink".to_owned(),
        })
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn writes_without_error() {
        let sink = ColorConsoleSink::new();
        let msg = LogMessage::new(Level::Warn, Arc::from("svc"), None, b"low disk".to_vec());
        assert!(sink.sink_it(&msg).is_ok());
        assert!(sink.flush().is_ok());
    }

    #[test]
    fn set_pattern_is_unsupported() {
        let sink = ColorConsoleSink::new();
        assert!(sink.set_pattern("%v").is_err());
    }
}
