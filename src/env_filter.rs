//! Per-logger level filtering driven by an environment variable, in the
//! style of `RUST_LOG`: a comma-separated list of `pattern=level` pairs plus
//! an optional bare `level` setting the default.
//!
//! This lives entirely outside the six core async components; `Context`
//! calls it once at startup to decide each newly-created logger's initial
//! threshold. Nothing here touches the queue, the distributor, or the
//! worker thread.

use std::env;

use regex::Regex;

use crate::level::Level;

const ENV_VAR: &str = "KATA_LOG";

struct Directive {
    pattern: Regex,
    level: Level,
}

/// A parsed `KATA_LOG` filter: an ordered list of name-pattern directives
/// plus a default level for names none of them match.
pub struct EnvFilter {
    directives: Vec<Directive>,
    default_level: Level,
}

impl EnvFilter {
    /// Parses `spec`, a string of the form `pattern=level,pattern=level,level`.
    /// A bare `level` with no `=` sets the default; later bare levels
    /// override earlier ones. Unparseable entries are skipped.
    pub fn parse(spec: &str) -> Self {
        let mut directives = Vec::new();
        let mut default_level = Level::Info;

        for entry in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match entry.split_once('=') {
                Some((pattern, level)) => {
                    let (Ok(level), Ok(pattern)) = (level.trim().parse(), Regex::new(pattern.trim()))
                    else {
                        continue;
                    };
                    directives.push(Directive { pattern, level });
                }
                None => {
                    if let Ok(level) = entry.parse() {
                        default_level = level;
                    }
                }
            }
        }

        EnvFilter {
            directives,
            default_level,
        }
    }

    /// Reads `KATA_LOG` from the environment; an absent or empty variable
    /// yields a filter with no directives and the default level `Info`.
    pub fn from_env() -> Self {
        match env::var(ENV_VAR) {
            Ok(value) if !value.is_empty() => Self::parse(&value),
            _ => EnvFilter {
                directives: Vec::new(),
                default_level: Level::Info,
            },
        }
    }

    /// The level a logger named `logger_name` should start at: the level of
    /// the first directive whose pattern matches, or the default.
    pub fn level_for(&self, logger_name: &str) -> Level {
        self.directives
            .iter()
            .find(|d| d.pattern.is_match(logger_name))
            .map(|d| d.level)
            .unwrap_or(self.default_level)
    }
}
