//! Process-wide context: the default logger and a shared worker-pool slot,
//! both behind lazy static initialization (spec §4.F).
//!
//! Grounded directly on spdlog's `details::context` singleton: a
//! recursive-mutex-guarded optional pool handle plus a swappable default
//! logger, reachable from anywhere in the process without threading a
//! handle through every call site.

use std::any::Any;
use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};

use crate::logger::Logger;
use crate::sink::Sink;
use crate::sinks::ColorConsoleSink;

/// Opaque handle to a shared worker pool. `AsyncSink` in this crate always
/// owns its own dedicated thread and never reads this slot — it exists so a
/// future multi-logger thread-pool drain mode has somewhere to live without
/// changing the `Context` API (spec §4.F, "preserved for forward
/// compatibility").
pub type SharedWorkerPool = Arc<dyn Any + Send + Sync>;

/// The process-wide singleton. Always accessed through [`Context::instance`];
/// never constructed directly outside this module.
pub struct Context {
    default_logger: RwLock<Arc<Logger>>,
    tp_mutex: ReentrantMutex<RefCell<Option<SharedWorkerPool>>>,
}

impl Context {
    fn new() -> Self {
        let color_sink: Arc<dyn Sink> = Arc::new(ColorConsoleSink::new());
        let default_logger = Arc::new(Logger::new("", color_sink));
        Context {
            default_logger: RwLock::new(default_logger),
            tp_mutex: ReentrantMutex::new(RefCell::new(None)),
        }
    }

    /// The single process-wide context. Lazily built on first access.
    pub fn instance() -> &'static Context {
        &CONTEXT
    }

    /// The current default logger, shared by reference.
    pub fn default_logger(&self) -> Arc<Logger> {
        self.default_logger.read().clone()
    }

    /// A raw pointer to the default logger, for the free-function API
    /// (`crate::api`) to log through without an `Arc` clone on every call.
    ///
    /// Matches the source's documented caveat: do not call this
    /// concurrently with [`Context::set_default_logger`] from another
    /// thread — the pointer is only valid while no swap is in flight.
    pub fn default_logger_raw(&self) -> *const Logger {
        Arc::as_ptr(&self.default_logger.read())
    }

    pub fn set_default_logger(&self, logger: Arc<Logger>) {
        *self.default_logger.write() = logger;
    }

    /// Installs a shared worker-pool handle. Reentrant: safe to call from
    /// code that is itself running inside a callback invoked while holding
    /// this same lock, as long as it doesn't also try to read the slot at
    /// the same time (that would double-borrow the inner `RefCell` and
    /// panic, mirroring a C++ recursive-mutex caller who reenters
    /// incorrectly).
    pub fn set_shared_worker_pool(&self, pool: Option<SharedWorkerPool>) {
        let guard = self.tp_mutex.lock();
        *guard.borrow_mut() = pool;
    }

    pub fn shared_worker_pool(&self) -> Option<SharedWorkerPool> {
        let guard = self.tp_mutex.lock();
        guard.borrow().clone()
    }

    /// Releases the shared worker-pool handle. Does not touch the default
    /// logger or join any `AsyncSink` worker threads — those are owned and
    /// joined independently by each `AsyncSink`'s own destructor.
    pub fn shutdown(&self) {
        self.set_shared_worker_pool(None);
    }
}

lazy_static::lazy_static! {
    static ref CONTEXT: Context = Context::new();
}
