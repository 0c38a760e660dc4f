//! Process-wide hook invoked when a sink operation fails (spec §6/§7).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Shape of the error handler: a plain string message, no return value.
pub type ErrorHandler = Arc<dyn Fn(&str) + Send + Sync>;

const RATE_LIMIT: Duration = Duration::from_secs(1);

/// Builds the default error handler: writes to stderr, but at most once per
/// second per distinct logger name, matching spec §6 ("Default: write to
/// standard error once per second per logger").
///
/// The rate-limit key is whatever the caller passes as the first word of
/// the message; callers that want per-logger limiting should prefix their
/// message with the logger name (the worker loop in `AsyncSink` does this).
pub fn default_error_handler() -> ErrorHandler {
    let last_emitted: Mutex<HashMap<String, Instant>> = Mutex::new(HashMap::new());
    Arc::new(move |message: &str| {
        let key = message.split(':').next().unwrap_or(message).to_owned();
        let now = Instant::now();
        let mut last_emitted = last_emitted.lock();
        let should_emit = match last_emitted.get(&key) {
            Some(last) => now.duration_since(*last) >= RATE_LIMIT,
            None => true,
        };
        if should_emit {
            eprintln!("{message}");
            last_emitted.insert(key, now);
        }
    })
}
