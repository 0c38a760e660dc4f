//! Log level enum, ordered from most to least verbose.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Severity of a [`crate::LogMessage`].
///
/// Ordered so that `Level::Trace < Level::Off`; a logger or sink admits a
/// message when `message.level >= threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(usize)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Err = 4,
    Critical = 5,
    /// Admits nothing; used to silence a logger or sink entirely.
    Off = 6,
}

impl Level {
    const VARIANTS: [Level; 7] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Err,
        Level::Critical,
        Level::Off,
    ];

    fn from_usize(v: usize) -> Level {
        Self::VARIANTS[v.min(Self::VARIANTS.len() - 1)]
    }

    /// Short, lowercase name as used in env-filter patterns and default
    /// formatters (`trace`, `debug`, `info`, `warn`, `err`, `critical`, `off`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Err => "err",
            Level::Critical => "critical",
            Level::Off => "off",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognised level name.
#[derive(Debug, thiserror::Error)]
#[error("unrecognised log level: {0:?}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "err" | "error" => Ok(Level::Err),
            "crit" | "critical" => Ok(Level::Critical),
            "off" => Ok(Level::Off),
            other => Err(ParseLevelError(other.to_owned())),
        }
    }
}

/// An atomic cell holding a [`Level`], used by `Logger` and `Sink`
/// implementations so the threshold can change from any thread without a
/// lock.
pub struct AtomicLevel(AtomicUsize);

impl AtomicLevel {
    pub fn new(level: Level) -> Self {
        AtomicLevel(AtomicUsize::new(level as usize))
    }

    pub fn load(&self) -> Level {
        Level::from_usize(self.0.load(Ordering::Relaxed))
    }

    pub fn store(&self, level: Level) {
        self.0.store(level as usize, Ordering::Relaxed);
    }
}

impl fmt::Debug for AtomicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicLevel").field(&self.load()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_severity() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Err < Level::Critical);
        assert!(Level::Critical < Level::Off);
    }

    #[test]
    fn round_trips_through_str() {
        for level in Level::VARIANTS {
            let parsed: Level = level.as_str().parse().unwrap();
            assert_eq!(parsed, level);
        }
    }

    #[test]
    fn rejects_unknown_name() {
        assert!("bogus".parse::<Level>().is_err());
    }

    #[test]
    fn atomic_level_round_trips() {
        let cell = AtomicLevel::new(Level::Info);
        assert_eq!(cell.load(), Level::Info);
        cell.store(Level::Critical);
        assert_eq!(cell.load(), Level::Critical);
    }
}
