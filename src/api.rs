//! Global convenience entry points, analogous to `spdlog::info`/`spdlog::set_default_logger`:
//! free functions and macros that log through the process-wide default
//! logger without the caller holding an `Arc<Logger>` themselves.

use std::sync::Arc;

use crate::context::Context;
use crate::logger::Logger;

/// The current default logger.
pub fn default_logger() -> Arc<Logger> {
    Context::instance().default_logger()
}

/// Replaces the default logger. Returns the previous one.
pub fn set_default_logger(logger: Arc<Logger>) -> Arc<Logger> {
    let ctx = Context::instance();
    let previous = ctx.default_logger();
    ctx.set_default_logger(logger);
    previous
}

/// Flushes the default logger.
pub fn flush() {
    default_logger().flush();
}

/// Releases the process-wide shared worker-pool slot (spec §4.F). Does not
/// touch any individual `AsyncSink`, which joins its own worker thread on
/// drop regardless of this call.
pub fn shutdown() {
    Context::instance().shutdown();
}

/// Logs a record through the default logger at `level`, with a source
/// location. Prefer the level-specific macros ([`trace!`], [`debug!`],
/// [`info!`], [`warn!`], [`error!`], [`critical!`]) over calling this
/// directly.
#[macro_export]
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {{
        let logger = $crate::default_logger();
        if logger.should_log($level) {
            logger.log(
                $level,
                Some($crate::SourceLocation {
                    file: file!(),
                    line: line!(),
                    function: module_path!(),
                }),
                format!($($arg)+).into_bytes(),
            );
        }
    }};
}

#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Trace, $($arg)+) };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Err, $($arg)+) };
}

#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Critical, $($arg)+) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributor::DistributorSink;

    #[test]
    fn set_default_logger_returns_previous() {
        let original = default_logger();
        let sink: Arc<dyn crate::sink::Sink> = Arc::new(DistributorSink::new());
        let replacement = Arc::new(Logger::new("swap-test", sink));
        let previous = set_default_logger(replacement.clone());
        assert_eq!(previous.name(), original.name());
        assert_eq!(default_logger().name().as_ref(), "swap-test");
        set_default_logger(original);
    }

    #[cfg(feature = "test-util")]
    #[test]
    fn macro_logs_through_default_logger() {
        use crate::sinks::TestSink;

        let capture = Arc::new(TestSink::new());
        let dist = Arc::new(DistributorSink::new());
        dist.add_sink(capture.clone());
        let original = set_default_logger(Arc::new(Logger::new("macro-test", dist)));

        info!("hello {}", 42);

        assert_eq!(capture.message_count(), 1);
        assert_eq!(
            String::from_utf8(capture.messages()[0].payload.clone()).unwrap(),
            "hello 42"
        );
        set_default_logger(original);
    }
}
